//! Article page download and generic content extraction, plus the small
//! HTML query helpers the per-source extractors share.

use crate::config::Language;
use crate::http::Http;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"], meta[name="twitter:image"]"#).unwrap());
static ARTICLE_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("article p").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// What the generic article reader pulls out of a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArticle {
    pub text: String,
    pub top_image: Option<String>,
    pub html: String,
}

/// Download an article page and extract its main text and lead image.
///
/// Never fails: an unreachable page yields empty fields.
#[instrument(level = "info", skip(http), fields(language = language.as_str()))]
pub async fn fetch_and_parse<H: Http>(http: &H, url: &str, language: Language) -> ParsedArticle {
    match http.get_text(url).await {
        Ok(html) => parse_article(url, html),
        Err(e) => {
            info!(error = %e, "Failed to download article page");
            ParsedArticle::default()
        }
    }
}

pub fn parse_article(url: &str, html: String) -> ParsedArticle {
    let document = Html::parse_document(&html);

    let mut paragraphs = paragraphs_of(document.select(&ARTICLE_PARAGRAPHS));
    if paragraphs.is_empty() {
        paragraphs = paragraphs_of(document.select(&PARAGRAPHS));
    }
    let text = paragraphs.iter().join("\n\n");

    let top_image = document
        .select(&OG_IMAGE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .and_then(|src| absolutize(url, src));

    debug!(chars = text.len(), image = ?top_image, "Parsed article page");
    ParsedArticle {
        text,
        top_image,
        html,
    }
}

fn paragraphs_of<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn absolutize(base: &str, src: &str) -> Option<String> {
    match Url::parse(src) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(base).ok()?.join(src).ok().map(|u| u.to_string()),
    }
}

/// Collapse runs of whitespace into single spaces and trim.
///
/// The ideographic space is kept: Japanese datelines use it as a separator.
pub fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() && c != '\u{3000}')
        .filter(|w| !w.is_empty())
        .join(" ")
}

/// Text of the first element matching `selector`, trimmed, if non-empty.
pub fn first_text(scope: &Html, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Text of the first `inner` match inside the first `outer` match.
pub fn nested_text(scope: &Html, outer: &Selector, inner: &Selector) -> Option<String> {
    scope
        .select(outer)
        .next()?
        .select(inner)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Paragraph text of the first `container` match, one blank line between
/// paragraphs. Paragraphs inside an element matching `skip` are left out.
pub fn container_paragraphs(scope: &Html, container: &Selector, skip: Option<&Selector>) -> Option<String> {
    let root = scope.select(container).next()?;
    let skipped: Vec<ElementRef> = match skip {
        Some(sel) => root.select(sel).collect(),
        None => Vec::new(),
    };

    let paragraphs: Vec<String> = root
        .select(&PARAGRAPHS)
        .filter(|p| {
            !p.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| skipped.iter().any(|s| s.id() == a.id()))
        })
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect();

    if paragraphs.is_empty() {
        let text = root.text().collect::<String>().trim().to_string();
        return (!text.is_empty()).then_some(text);
    }
    Some(paragraphs.join("\n\n"))
}
