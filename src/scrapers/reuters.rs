//! Reuters (English) and Reuters Japanese article pages.

use super::{Verdict, document_of};
use crate::article::{container_paragraphs, first_text};
use crate::models::{ArticleDraft, LocationHint};
use crate::utils::wrap_columns;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("span.caption_KoNH1").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("div.body_1gnLA").unwrap());
static BODY_NOISE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.trustBadgeContainer_1gqgJ, div.caption_KoNH1").unwrap());
static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.headline_2zdFM").unwrap());
static SHORT_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"http://bit\.ly/[A-Za-z0-9]{7}").unwrap());

const MARKER: &str = " (Reuters)";
const JAPANESE_COLUMNS: usize = 25;

pub fn extract(draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    let mut draft = common(draft, &document);

    if let Some((location, body)) = draft.article.as_deref().and_then(reuters_dateline) {
        draft.location = LocationHint::Found(location);
        draft.article = Some(body);
    }
    Ok(draft)
}

pub fn extract_japanese(draft: ArticleDraft) -> Verdict<ArticleDraft> {
    let document = document_of(&draft);
    let headline = first_text(&document, &HEADLINE);
    let mut draft = common(draft, &document);
    // Without the page headline the feed title stands.
    if headline.is_some() {
        draft.headline = headline;
    }

    if let Some(body) = draft.article.take() {
        if let Some(location) = japanese_dateline(&body) {
            draft.location = LocationHint::Found(location);
        }
        draft.article = Some(wrap_columns(&body, JAPANESE_COLUMNS).join("\n"));
    }
    Ok(draft)
}

/// Caption, body and picture rules shared by both editions.
fn common(mut draft: ArticleDraft, document: &Html) -> ArticleDraft {
    draft.caption = first_text(document, &CAPTION).map(|c| c.replace("  REUTERS/", " REUTERS/"));
    if let Some(body) = container_paragraphs(document, &BODY, Some(&BODY_NOISE)) {
        draft.article = Some(body);
    }
    draft.resize = false;
    draft.picture = draft
        .picture
        .take()
        .filter(|p| !p.contains("rcom-default.png"))
        .map(|p| format!("{p}&w=200"));
    draft
}

/// `"<Place> (Reuters) - text"` in the first paragraph.
///
/// Returns the place and the body with the dateline removed. Bodies opening
/// directly with `"(Reuters)"` carry no place.
pub fn reuters_dateline(text: &str) -> Option<(String, String)> {
    if text.trim_start().starts_with("(Reuters)") {
        return None;
    }
    let (first, rest) = match text.split_once("\n\n") {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };
    let (place, after) = first.split_once(MARKER)?;
    let place = place.trim();
    if place.is_empty() {
        return None;
    }

    let lead = after.trim_start_matches(|c: char| c == '-' || c == '–' || c == '—' || c.is_whitespace());
    let body = match rest {
        Some(rest) if lead.is_empty() => rest.to_string(),
        Some(rest) => format!("{lead}\n\n{rest}"),
        None => lead.to_string(),
    };
    Some((place.to_string(), body))
}

/// `"[東京　２６日　ロイター] …"` → `"東京"`.
pub fn japanese_dateline(text: &str) -> Option<String> {
    let (_, after) = text.split_once('[')?;
    let (place, _) = after.split_once('\u{3000}')?;
    let place = place.trim();
    (!place.is_empty()).then(|| place.to_string())
}

/// First `http://bit.ly/XXXXXXX` link in a feed description.
pub fn short_link(description: &str) -> Option<String> {
    SHORT_LINK.find(description).map(|m| m.as_str().to_string())
}

/// Feed titles end with `"  http://bit.ly/…"`.
pub fn strip_short_link(title: &str) -> String {
    match title.split_once("  http://bit.ly/") {
        Some((headline, _)) => headline.trim().to_string(),
        None => title.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribution;

    fn draft(html: &str, generic_text: &str, picture: Option<&str>) -> ArticleDraft {
        let mut d = ArticleDraft::new("https://www.reuters.com/article/x", Attribution::new("Reuters", ""), 1);
        d.headline = Some("Markets rally".into());
        d.article = Some(generic_text.to_string());
        d.picture = picture.map(String::from);
        d.html = Some(html.to_string());
        d
    }

    const PAGE: &str = r#"<html><body>
        <h1 class="headline_2zdFM">市場が反発</h1>
        <div class="body_1gnLA">
          <div class="trustBadgeContainer_1gqgJ"><p>Our Standards</p></div>
          <div class="caption_KoNH1"><p>Traders work.</p></div>
          <p>City Name (Reuters) — rest of text,</p>
          <p>Second paragraph.</p>
        </div>
        <span class="caption_KoNH1">Traders work.  REUTERS/Brendan McDermid</span>
        </body></html>"#;

    #[test]
    fn test_dateline_sets_location_and_strips_marker() {
        let d = extract(draft(PAGE, "ignored", Some("https://s1.reutersmedia.net/img?id=1"))).unwrap();
        assert_eq!(d.location, LocationHint::Found("City Name".into()));
        assert_eq!(d.article.as_deref(), Some("rest of text,\n\nSecond paragraph."));
        assert_eq!(d.caption.as_deref(), Some("Traders work. REUTERS/Brendan McDermid"));
        assert_eq!(d.picture.as_deref(), Some("https://s1.reutersmedia.net/img?id=1&w=200"));
        assert!(!d.resize);
    }

    #[test]
    fn test_default_picture_is_dropped() {
        let d = extract(draft(PAGE, "", Some("https://www.reuters.com/rcom-default.png"))).unwrap();
        assert_eq!(d.picture, None);
    }

    #[test]
    fn test_generic_body_is_kept_without_container() {
        let d = extract(draft("<p>x</p>", "LONDON (Reuters) - Shares rose.", None)).unwrap();
        assert_eq!(d.article.as_deref(), Some("Shares rose."));
        assert_eq!(d.location, LocationHint::Found("LONDON".into()));
    }

    #[test]
    fn test_reuters_dateline_rules() {
        assert_eq!(reuters_dateline("(Reuters) - No place here."), None);
        assert_eq!(reuters_dateline("No marker at all.\n\nLONDON (Reuters) - late"), None);
        assert_eq!(
            reuters_dateline("NEW YORK (Reuters) – Stocks fell."),
            Some(("NEW YORK".into(), "Stocks fell.".into()))
        );
        assert_eq!(
            reuters_dateline("PARIS (Reuters) -\n\nBody."),
            Some(("PARIS".into(), "Body.".into()))
        );
    }

    #[test]
    fn test_japanese_extraction() {
        let mut d = draft(PAGE, "", None);
        d.html = Some(PAGE.replace("City Name (Reuters) — rest of text,", "[東京　２６日　ロイター] 日経平均は反発した。"));
        let d = extract_japanese(d).unwrap();
        assert_eq!(d.headline.as_deref(), Some("市場が反発"));
        assert_eq!(d.location, LocationHint::Found("東京".into()));
        let body = d.article.unwrap();
        assert!(body.lines().all(|line| line.chars().count() <= 25));
        assert!(body.starts_with("[東京"));
    }

    #[test]
    fn test_japanese_without_page_headline_keeps_feed_title() {
        let d = draft("<div class=\"body_1gnLA\"><p>本文</p></div>", "", None);
        let d = extract_japanese(d).unwrap();
        assert_eq!(d.headline.as_deref(), Some("Markets rally"));
        assert_eq!(d.article.as_deref(), Some("本文"));
        assert!(d.into_record(None, None).is_ok());
    }

    #[test]
    fn test_short_link_helpers() {
        assert_eq!(
            short_link("見出し http://bit.ly/2abcXYZ more").as_deref(),
            Some("http://bit.ly/2abcXYZ")
        );
        assert_eq!(short_link("http://bit.ly/abc"), None);
        assert_eq!(strip_short_link("見出し  http://bit.ly/2abcXYZ"), "見出し");
        assert_eq!(strip_short_link("見出し"), "見出し");
    }

    #[test]
    fn test_japanese_dateline() {
        assert_eq!(japanese_dateline("[ワシントン　２５日　ロイター] 米国"), Some("ワシントン".into()));
        assert_eq!(japanese_dateline("括弧なし"), None);
    }
}
