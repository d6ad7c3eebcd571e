//! Feed documents → flat list of entries.
//!
//! Two wire shapes are understood:
//!
//! - RSS or Atom XML (every source except AP)
//! - AP's JSON "cards" feed, where the usable entry is the first element of
//!   each card's `contents` array. Cards without contents are skipped.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Xml,
    ApCards,
}

/// One raw item from a feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
    pub updated: Option<DateTime<Utc>>,
    pub description: String,
    pub author: String,
}

/// Parse a feed document into entries, in document order.
///
/// # Arguments
///
/// * `format` - [`FeedFormat::Xml`] for RSS or Atom, [`FeedFormat::ApCards`] for AP
/// * `body` - The raw document
///
/// # Returns
///
/// The entries, or [`Error::Feed`] / [`Error::Json`] when the document is not
/// a feed of that format.
///
/// # Examples
///
/// ```ignore
/// let entries = parse_entries(FeedFormat::Xml, &body)?;
/// let recent: Vec<_> = entries.iter().filter(|e| e.updated.is_some()).collect();
/// ```
pub fn parse_entries(format: FeedFormat, body: &str) -> Result<Vec<FeedEntry>> {
    match format {
        FeedFormat::Xml => parse_xml(body),
        FeedFormat::ApCards => parse_ap_cards(body),
    }
}

/// RSS (0.9x, 1.0 and 2.0) first, then Atom. A document neither parser
/// accepts is an error, never an empty feed.
fn parse_xml(body: &str) -> Result<Vec<FeedEntry>> {
    let bytes = body.trim_start_matches('\u{feff}').as_bytes();
    let rss_err = match rss::Channel::read_from(bytes) {
        Ok(channel) => return Ok(channel.items().iter().map(rss_entry).collect()),
        Err(e) => e,
    };
    match atom_syndication::Feed::read_from(bytes) {
        Ok(feed) => Ok(feed.entries().iter().map(atom_entry).collect()),
        Err(atom_err) => Err(Error::Feed(format!(
            "not an RSS or Atom document (rss: {rss_err}; atom: {atom_err})"
        ))),
    }
}

fn rss_entry(item: &rss::Item) -> FeedEntry {
    let dublin_core = item.dublin_core_ext();
    let stamp = item
        .pub_date()
        .or_else(|| dublin_core.and_then(|dc| dc.dates().first()).map(String::as_str));
    let author = dublin_core
        .and_then(|dc| dc.creators().first())
        .map(String::as_str)
        .or(item.author())
        .unwrap_or_default();
    FeedEntry {
        link: item.link().unwrap_or_default().trim().to_string(),
        title: item.title().unwrap_or_default().trim().to_string(),
        updated: stamp.and_then(parse_timestamp),
        description: item.description().unwrap_or_default().to_string(),
        author: author.trim().to_string(),
    }
}

fn atom_entry(entry: &atom_syndication::Entry) -> FeedEntry {
    let links = entry.links();
    let link = links
        .iter()
        .find(|l| l.rel() == "alternate")
        .or(links.first())
        .map(|l| l.href().to_string())
        .unwrap_or_default();
    // A missing <updated> is read as the Unix epoch.
    let updated = Some(*entry.updated())
        .filter(|dt| dt.timestamp() != 0)
        .or(entry.published().copied())
        .map(|dt| dt.with_timezone(&Utc));
    FeedEntry {
        link,
        title: entry.title().value.trim().to_string(),
        updated,
        description: entry.summary().map(|s| s.value.clone()).unwrap_or_default(),
        author: entry.authors().first().map(|a| a.name().to_string()).unwrap_or_default(),
    }
}

/// RFC 2822, RFC 3339, or AP's naive `%Y-%m-%d %H:%M:%S` (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_ap_cards(body: &str) -> Result<Vec<FeedEntry>> {
    let doc: Value = serde_json::from_str(body)?;
    let cards = doc
        .get("cards")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Feed("AP feed has no cards".into()))?;

    let text = |v: &Value, field: &str| -> String {
        v.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
    };

    let mut entries = Vec::with_capacity(cards.len());
    for card in cards {
        let Some(contents) = card.get("contents").and_then(|c| c.get(0)) else {
            debug!("AP card without contents; skipping");
            continue;
        };
        entries.push(FeedEntry {
            link: text(contents, "gcsUrl"),
            title: text(contents, "headline"),
            updated: parse_timestamp(&text(contents, "updated")),
            description: text(contents, "flattenedFirstWords"),
            author: text(contents, "bylines"),
        });
    }
    Ok(entries)
}
