//! Per-source extraction strategies.
//!
//! Every source converges on the same [`ArticleDraft`], but each one finds
//! headline, body, picture, caption, credits and dateline differently. The
//! set of sources is closed: [`SourceKind`] is the dispatch point and each
//! variant routes to its own module.
//!
//! # Supported Sources
//!
//! | Kind | Module | Feed | Location from |
//! |------|--------|------|---------------|
//! | `AP` | [`ap`] | JSON cards | story `dateline` field |
//! | `Reuters` | [`reuters`] | RSS | `"<Place> (Reuters) -"` lead |
//! | `AFP_French` | [`afp`] | RSS | trailing `"… - <Place> (AFP) - © … AFP"` line |
//! | `AFP` | [`donaukurier`] | RSS | `<em>` dateline, or `"(dpa)"` lead for dpa copy |
//! | `SID` | [`sid`] | RSS | geoparser |
//! | `ANSA` | [`ansa`] | RSS | `span[itemprop=dateline]` |
//! | `NU.nl` | [`nu`] | RSS | geoparser |
//! | `Reuters_Japanese` | [`reuters`] | RSS | `"[<Place>\u{3000}…"` lead |
//!
//! # Phases
//!
//! 1. [`SourceKind::prepare`]: pre-filters and per-entry overrides on the raw
//!    feed entry (no article download yet).
//! 2. [`SourceKind::fetch_page`]: download the story JSON (AP) or the article
//!    page (everyone else).
//! 3. [`SourceKind::extract`]: pure, synchronous field extraction.

pub mod afp;
pub mod ansa;
pub mod ap;
pub mod donaukurier;
pub mod nu;
pub mod reuters;
pub mod sid;

use crate::article::{ParsedArticle, fetch_and_parse};
use crate::config::{Category, SourceConfig};
use crate::error::Result;
use crate::feed::{FeedEntry, FeedFormat};
use crate::http::Http;
use crate::models::{ArticleDraft, Attribution};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "AP")]
    Ap,
    #[serde(rename = "Reuters")]
    Reuters,
    #[serde(rename = "AFP_French")]
    AfpFrench,
    #[serde(rename = "AFP")]
    Afp,
    #[serde(rename = "SID")]
    Sid,
    #[serde(rename = "ANSA")]
    Ansa,
    #[serde(rename = "NU.nl")]
    Nu,
    #[serde(rename = "Reuters_Japanese")]
    ReutersJapanese,
}

/// Expected filtering, not a fault. Logged at debug level only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// AP story carried by a member paper, or linked outside apnews.
    SyndicationRestricted,
    /// Entry link does not belong to the category being read.
    ForeignLink,
    /// Headline marks content the console cannot show (video, live blogs).
    ExcludedHeadline,
    MissingShortLink,
    MalformedPayload,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::SyndicationRestricted => "syndication restricted",
            Rejection::ForeignLink => "link outside category",
            Rejection::ExcludedHeadline => "excluded headline",
            Rejection::MissingShortLink => "missing short link",
            Rejection::MalformedPayload => "malformed payload",
        };
        f.write_str(reason)
    }
}

pub type Verdict<T> = std::result::Result<T, Rejection>;

/// Feed entry after pre-filtering: where to read the story and how to credit it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEntry {
    pub url: String,
    pub headline: String,
    pub attribution: Attribution,
    pub updated_minutes: u32,
}

/// Downloaded story material handed to the extractor.
#[derive(Debug, Clone)]
pub enum Page {
    /// Raw AP story JSON.
    ApStory(String),
    Article(ParsedArticle),
}

pub const DPA_COPYRIGHT: &str =
    "Alle Rechte für die Wiedergabe, Verwertung und Darstellung reserviert. © {year} dpa";
pub const ANP_COPYRIGHT: &str =
    "All reproduction and representation rights reserved. © {year} B.V. Algemeen Nederlands Persbureau ANP";

impl SourceKind {
    pub fn id(&self) -> &'static str {
        match self {
            SourceKind::Ap => "AP",
            SourceKind::Reuters => "Reuters",
            SourceKind::AfpFrench => "AFP_French",
            SourceKind::Afp => "AFP",
            SourceKind::Sid => "SID",
            SourceKind::Ansa => "ANSA",
            SourceKind::Nu => "NU.nl",
            SourceKind::ReutersJapanese => "Reuters_Japanese",
        }
    }

    pub fn feed_format(&self) -> FeedFormat {
        match self {
            SourceKind::Ap => FeedFormat::ApCards,
            _ => FeedFormat::Xml,
        }
    }

    /// Apply the source's pre-filters and per-entry overrides.
    pub async fn prepare<H: Http>(
        &self,
        http: &H,
        source: &SourceConfig,
        category: &Category,
        entry: &FeedEntry,
        updated_minutes: u32,
    ) -> Result<Verdict<PreparedEntry>> {
        let mut prepared = PreparedEntry {
            url: entry.link.clone(),
            headline: entry.title.trim().to_string(),
            attribution: Attribution::new(self.id(), source.copyright.clone()),
            updated_minutes,
        };

        match self {
            SourceKind::AfpFrench => {
                if !entry.link.contains(&category.key) {
                    return Ok(Err(Rejection::ForeignLink));
                }
            }
            SourceKind::Afp => {
                if let Some(attribution) = donaukurier::attribution_override(entry) {
                    debug!(url = %entry.link, "dpa copy in AFP feed");
                    prepared.attribution = attribution;
                }
            }
            SourceKind::Nu => {
                if nu::is_excluded_headline(&prepared.headline) {
                    return Ok(Err(Rejection::ExcludedHeadline));
                }
                if let Some(attribution) = nu::attribution_override(entry) {
                    prepared.attribution = attribution;
                }
            }
            SourceKind::ReutersJapanese => {
                let Some(short_url) = reuters::short_link(&entry.description) else {
                    return Ok(Err(Rejection::MissingShortLink));
                };
                prepared.url = http.resolve_redirect(&short_url).await?;
                prepared.headline = reuters::strip_short_link(&entry.title);
            }
            SourceKind::Ap | SourceKind::Reuters | SourceKind::Sid | SourceKind::Ansa => {}
        }

        Ok(Ok(prepared))
    }

    /// Download what the extractor needs.
    pub async fn fetch_page<H: Http>(&self, http: &H, url: &str, source: &SourceConfig) -> Result<Page> {
        match self {
            SourceKind::Ap => Ok(Page::ApStory(http.get_text(url).await?)),
            _ => Ok(Page::Article(fetch_and_parse(http, url, source.lang).await)),
        }
    }

    /// Build the draft from the downloaded material.
    pub fn extract(&self, prepared: PreparedEntry, page: Page) -> Verdict<ArticleDraft> {
        let mut draft = ArticleDraft::new(prepared.url, prepared.attribution, prepared.updated_minutes);
        draft.headline = Some(prepared.headline).filter(|h| !h.is_empty());

        let parsed = match (self, page) {
            (SourceKind::Ap, Page::ApStory(json)) => return ap::extract(draft, &json),
            (SourceKind::Ap, Page::Article(_)) | (_, Page::ApStory(_)) => {
                return Err(Rejection::MalformedPayload);
            }
            (_, Page::Article(parsed)) => parsed,
        };

        draft.article = Some(parsed.text).filter(|t| !t.is_empty());
        draft.picture = parsed.top_image;
        draft.html = Some(parsed.html);

        match self {
            SourceKind::Reuters => reuters::extract(draft),
            SourceKind::ReutersJapanese => reuters::extract_japanese(draft),
            SourceKind::AfpFrench => afp::extract(draft),
            SourceKind::Afp => donaukurier::extract(draft),
            SourceKind::Sid => sid::extract(draft),
            SourceKind::Ansa => ansa::extract(draft),
            SourceKind::Nu => nu::extract(draft),
            SourceKind::Ap => Err(Rejection::MalformedPayload),
        }
    }
}

/// Parse the raw page kept on the draft.
pub(crate) fn document_of(draft: &ArticleDraft) -> scraper::Html {
    scraper::Html::parse_document(draft.html.as_deref().unwrap_or_default())
}
