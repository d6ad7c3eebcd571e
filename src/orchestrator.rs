//! One pass over the configured sources.
//!
//! For each source: categories → feed entries → recency filter → source
//! pre-filters → page download → extraction → record, stored under the
//! category code and a 1-based slot. Every entry inside the recency window
//! takes the next slot in feed order, so an entry that is filtered out or
//! comes back incomplete leaves a gap.
//!
//! Nothing in here is fatal. A broken feed skips its category, a broken entry
//! skips itself, and expected filtering is logged at debug level only.

use crate::config::{Category, Language, SourceConfig};
use crate::codec::minutes_since_2000;
use crate::error::Result;
use crate::feed::{FeedEntry, parse_entries};
use crate::geoparser::Geoparser;
use crate::http::Http;
use crate::imaging::shrink_image;
use crate::location::{Geocoder, LocationRecords, resolve_locations};
use crate::models::{ArticleCollection, ArticleKey, ArticleRecord, LocationHint};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Entries older than this many minutes are left for the next run.
pub const RECENCY_WINDOW_MINUTES: u32 = 60;

/// Everything one source produced in this run.
#[derive(Debug, Clone)]
pub struct SourceOutput {
    pub name: String,
    pub language: Language,
    pub collection: ArticleCollection,
    pub locations: LocationRecords,
}

pub fn is_recent(now_minutes: u32, updated_minutes: u32) -> bool {
    now_minutes.saturating_sub(updated_minutes) < RECENCY_WINDOW_MINUTES
}

/// Run every source in order, then resolve each collection's places in the
/// source's language.
///
/// # Arguments
///
/// * `http` - Client for feeds, pages and pictures
/// * `geocoder` - Fallback for places the gazetteer does not know
/// * `geoparser` - Place finder for sources whose pages carry no dateline
/// * `sources` - Configured sources, already filtered by `--source`
/// * `now` - Reference time for the recency window and timestamps
///
/// # Returns
///
/// One [`SourceOutput`] per source, in configuration order. Failures inside a
/// source only shrink its collection.
///
/// # Examples
///
/// ```ignore
/// let outputs = orchestrator::run_all(&http, &geocoder, &geoparser, &config.sources, Utc::now()).await;
/// for output in &outputs {
///     json::write_source(output, "./out", now).await?;
/// }
/// ```
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn run_all<H, G, P>(
    http: &H,
    geocoder: &G,
    geoparser: &P,
    sources: &[SourceConfig],
    now: DateTime<Utc>,
) -> Vec<SourceOutput>
where
    H: Http,
    G: Geocoder,
    P: Geoparser,
{
    let mut outputs = Vec::with_capacity(sources.len());
    for source in sources {
        let collection = run_source(http, geoparser, source, now).await;
        let locations = resolve_locations(geocoder, &collection.places(), source.lang).await;
        outputs.push(SourceOutput {
            name: source.name.clone(),
            language: source.lang,
            collection,
            locations,
        });
    }
    outputs
}

/// Read every category feed of one source and turn its recent entries into
/// records.
///
/// # Arguments
///
/// * `http` - Client for feeds, pages and pictures
/// * `geoparser` - Used when a source extracts no dateline of its own
/// * `source` - The source's configuration and extraction rules
/// * `now` - Entries updated [`RECENCY_WINDOW_MINUTES`] or more before this are skipped
///
/// # Returns
///
/// The source's [`ArticleCollection`], keyed by category code and slot.
///
/// # Examples
///
/// ```ignore
/// let collection = run_source(&http, &geoparser, &config.sources[0], Utc::now()).await;
/// let places = collection.places();
/// ```
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn run_source<H: Http, P: Geoparser>(
    http: &H,
    geoparser: &P,
    source: &SourceConfig,
    now: DateTime<Utc>,
) -> ArticleCollection {
    let now_minutes = minutes_since_2000(now);
    let mut collection = ArticleCollection::new(source.name.clone());

    for category in &source.categories {
        let entries = match fetch_entries(http, source, category).await {
            Ok(entries) => entries,
            Err(e) => {
                info!(category = %category.key, error = %e, "Failed to read feed; skipping category");
                continue;
            }
        };

        let mut slot = 0u32;
        let mut kept = 0usize;
        for entry in &entries {
            let Some(updated) = entry.updated else {
                debug!(url = %entry.link, "Entry has no usable timestamp");
                continue;
            };
            let updated_minutes = minutes_since_2000(updated);
            if !is_recent(now_minutes, updated_minutes) {
                continue;
            }
            slot += 1;

            match process_entry(http, geoparser, source, category, entry, updated_minutes).await {
                Ok(Some(record)) => {
                    kept += 1;
                    collection
                        .records
                        .insert(ArticleKey::new(category.code.clone(), slot), record);
                }
                Ok(None) => {}
                Err(e) => info!(url = %entry.link, error = %e, "Failed to process entry"),
            }
        }
        debug!(category = %category.key, slots = slot, records = kept, "Category done");
    }

    info!(collection = %collection.source, records = collection.len(), "Source done");
    collection
}

async fn fetch_entries<H: Http>(http: &H, source: &SourceConfig, category: &Category) -> Result<Vec<FeedEntry>> {
    let body = http.get_text(&source.feed_url_for(category)).await?;
    parse_entries(source.kind.feed_format(), &body)
}

/// `Ok(None)` is an entry that was filtered out or came back incomplete.
async fn process_entry<H: Http, P: Geoparser>(
    http: &H,
    geoparser: &P,
    source: &SourceConfig,
    category: &Category,
    entry: &FeedEntry,
    updated_minutes: u32,
) -> Result<Option<ArticleRecord>> {
    let kind = source.kind;

    let prepared = match kind.prepare(http, source, category, entry, updated_minutes).await? {
        Ok(prepared) => prepared,
        Err(rejection) => {
            debug!(url = %entry.link, %rejection, "Entry rejected");
            return Ok(None);
        }
    };

    let page = kind.fetch_page(http, &prepared.url, source).await?;
    let draft = match kind.extract(prepared, page) {
        Ok(draft) => draft,
        Err(rejection) => {
            debug!(url = %entry.link, %rejection, "Entry rejected");
            return Ok(None);
        }
    };
    if let Err(incomplete) = draft.check_complete() {
        debug!(url = %draft.url, %incomplete, "Draft incomplete");
        return Ok(None);
    }
    debug!(
        url = %draft.url,
        headline = %truncate_for_log(draft.headline.as_deref().unwrap_or_default(), 80),
        html_bytes = draft.html.as_ref().map_or(0, String::len),
        "Extracted draft"
    );

    let location = match &draft.location {
        LocationHint::Found(place) => Some(place.clone()),
        LocationHint::Geoparse => {
            geoparser
                .extract_place(draft.article.as_deref().unwrap_or_default())
                .await
        }
        LocationHint::Absent => None,
    };
    let image = shrink_image(http, draft.picture.as_deref(), draft.resize).await;

    match draft.into_record(location, image) {
        Ok(record) => Ok(Some(record)),
        Err(incomplete) => {
            debug!(%incomplete, "Draft incomplete");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_text;
    use crate::scrapers::SourceKind;
    use crate::test_support::{FakeGeocoder, FakeGeoparser, FakeHttp};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 3, 12, 15, 0, 0).unwrap()
    }

    fn ago(minutes: i64) -> String {
        (now() - Duration::minutes(minutes)).to_rfc2822()
    }

    fn rss(items: &[(&str, &str, String)]) -> String {
        let items: String = items
            .iter()
            .map(|(link, title, date)| {
                format!("<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate></item>")
            })
            .collect();
        format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>{items}</channel></rss>"#)
    }

    fn source(kind: SourceKind, categories: &[(&str, &str)]) -> SourceConfig {
        SourceConfig {
            kind,
            name: kind.id().to_string(),
            lang: Language::English,
            feed_url: "https://feeds.example/{category}.xml".into(),
            copyright: "© {year} Agency".into(),
            categories: categories
                .iter()
                .map(|(key, code)| Category {
                    key: key.to_string(),
                    code: code.to_string(),
                })
                .collect(),
        }
    }

    const ANSA_PAGE: &str = r#"<html><body><p>Testo della notizia.</p>
        <span itemprop="dateline" class="location">ROMA</span></body></html>"#;

    #[test]
    fn test_recency_window() {
        assert!(is_recent(1_000, 941));
        assert!(!is_recent(1_000, 940));
        assert!(is_recent(1_000, 1_005));
    }

    #[tokio::test]
    async fn test_sixty_minute_boundary() {
        let http = FakeHttp::default()
            .with_text(
                "https://feeds.example/mondo.xml",
                rss(&[
                    ("https://www.ansa.it/59", "Recente", ago(59)),
                    ("https://www.ansa.it/60", "Vecchia", ago(60)),
                ]),
            )
            .with_text("https://www.ansa.it/59", ANSA_PAGE)
            .with_text("https://www.ansa.it/60", ANSA_PAGE);
        let src = source(SourceKind::Ansa, &[("mondo", "w")]);

        let collection = run_source(&http, &FakeGeoparser::default(), &src, now()).await;

        assert_eq!(collection.len(), 1);
        let record = &collection.records[&ArticleKey::new("w", 1)];
        assert_eq!(record.url, "https://www.ansa.it/59");
        assert_eq!(record.location.as_deref(), Some("ROMA"));
        assert!(!http.requests().contains(&"https://www.ansa.it/60".to_string()));
    }

    #[tokio::test]
    async fn test_reuters_dateline_scenario() {
        let page = r#"<html><head><meta property="og:image" content="https://img.example/p.jpg?id=1"></head>
            <body><div class="body_1gnLA"><p>City Name (Reuters) — rest of text,</p></div></body></html>"#;
        let http = FakeHttp::default()
            .with_text(
                "https://feeds.example/worldNews.xml",
                rss(&[("https://www.reuters.com/article/1", "Markets rally", ago(10))]),
            )
            .with_text("https://www.reuters.com/article/1", page);
        let src = source(SourceKind::Reuters, &[("worldNews", "world")]);

        let collection = run_source(&http, &FakeGeoparser::default(), &src, now()).await;

        let record = &collection.records[&ArticleKey::new("world", 1)];
        assert_eq!(record.location.as_deref(), Some("City Name"));
        assert_eq!(decode_text(&record.article), "rest of text,");
        assert_eq!(decode_text(&record.headline), "Markets rally");
        assert_eq!(record.image, None);
        assert!(http.requests().contains(&"https://img.example/p.jpg?id=1&w=200".to_string()));
    }

    #[tokio::test]
    async fn test_afp_french_foreign_link_is_dropped() {
        let http = FakeHttp::default()
            .with_text(
                "https://feeds.example/monde.xml",
                rss(&[("https://www.afp.com/fr/actus/sport/1", "But!", ago(5))]),
            )
            .with_text("https://www.afp.com/fr/actus/sport/1", "<p>Texte</p>");
        let src = source(SourceKind::AfpFrench, &[("monde", "w")]);

        let collection = run_source(&http, &FakeGeoparser::default(), &src, now()).await;

        assert!(collection.is_empty());
        assert_eq!(http.requests(), vec!["https://feeds.example/monde.xml".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_category_does_not_abort_source() {
        let http = FakeHttp::default()
            .with_text(
                "https://feeds.example/sport.xml",
                rss(&[("https://www.ansa.it/1", "Gol", ago(1))]),
            )
            .with_text("https://www.ansa.it/1", ANSA_PAGE);
        let src = source(SourceKind::Ansa, &[("mondo", "w"), ("sport", "s")]);

        let collection = run_source(&http, &FakeGeoparser::default(), &src, now()).await;

        assert_eq!(
            collection.records.keys().cloned().collect::<Vec<_>>(),
            vec![ArticleKey::new("s", 1)]
        );
    }

    #[tokio::test]
    async fn test_slots_follow_recent_entries_in_feed_order() {
        let http = FakeHttp::default()
            .with_text(
                "https://feeds.example/mondo.xml",
                rss(&[
                    ("https://www.ansa.it/1", "Prima", ago(1)),
                    ("https://www.ansa.it/old", "Vecchia", ago(90)),
                    ("https://www.ansa.it/2", "", ago(2)),
                    ("https://www.ansa.it/3", "Senza testo", ago(3)),
                    ("https://www.ansa.it/4", "Quarta", ago(4)),
                ]),
            )
            .with_text("https://www.ansa.it/1", ANSA_PAGE)
            .with_text("https://www.ansa.it/2", ANSA_PAGE)
            .with_text("https://www.ansa.it/3", "<html><body></body></html>")
            .with_text("https://www.ansa.it/4", ANSA_PAGE);
        let src = source(SourceKind::Ansa, &[("mondo", "w")]);

        let collection = run_source(&http, &FakeGeoparser::default(), &src, now()).await;

        assert_eq!(
            collection.records.keys().cloned().collect::<Vec<_>>(),
            vec![ArticleKey::new("w", 1), ArticleKey::new("w", 4)]
        );
        assert_eq!(collection.records[&ArticleKey::new("w", 4)].url, "https://www.ansa.it/4");
    }

    #[tokio::test]
    async fn test_geoparsed_location() {
        let http = FakeHttp::default()
            .with_text(
                "https://feeds.example/fussball.xml",
                rss(&[("https://www.sid.de/1", "Bayern siegt", ago(3))]),
            )
            .with_text("https://www.sid.de/1", "<p>Bayern gewinnt in München.</p>");
        let geoparser = FakeGeoparser::answering("Munich, Germany");
        let src = source(SourceKind::Sid, &[("fussball", "f")]);

        let collection = run_source(&http, &geoparser, &src, now()).await;

        let record = &collection.records[&ArticleKey::new("f", 1)];
        assert_eq!(record.location.as_deref(), Some("Munich, Germany"));
        assert_eq!(geoparser.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_all_resolves_locations_per_source() {
        let story = r#"{"localMemberName":null,"localLinkUrl":"https://apnews.com/1",
            "storyHTML":"<p>LONDON (AP) — Rain.</p>","dateline":"LONDON","mediaCount":0}"#;
        let cards = format!(
            r#"{{"cards":[{{"contents":[{{"headline":"Rain in London","gcsUrl":"https://storage.example/ap/1.json","updated":"{}"}}]}}]}}"#,
            (now() - Duration::minutes(2)).format("%Y-%m-%d %H:%M:%S")
        );
        let http = FakeHttp::default()
            .with_text("https://feeds.example/world.xml", cards)
            .with_text("https://storage.example/ap/1.json", story);
        let geocoder = FakeGeocoder::default();
        let src = source(SourceKind::Ap, &[("world", "world")]);

        let outputs = run_all(&http, &geocoder, &FakeGeoparser::default(), &[src], now()).await;

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, "AP");
        assert_eq!(outputs[0].collection.len(), 1);
        let location = outputs[0].locations.values().next().unwrap();
        assert_eq!(location.display_name, "London");
        assert_eq!(location.article_keys, vec![ArticleKey::new("world", 1)]);
        assert_eq!(geocoder.calls(), 0);
    }
}
