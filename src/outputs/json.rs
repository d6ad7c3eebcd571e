//! JSON manifest for the downstream packager.
//!
//! One file per source, `{output_dir}/{source}.json`. Binary fields (encoded
//! text, timestamps, pictures, coordinate blocks) are hex strings so the
//! packager can copy them into the container byte for byte.
//!
//! ```text
//! output_dir/
//! ├── AP.json
//! ├── Reuters.json
//! └── NU.nl.json
//! ```

use crate::codec::{decode_text, from_minutes_since_2000, minutes_since_2000};
use crate::orchestrator::SourceOutput;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub source: String,
    pub language: &'static str,
    pub language_code: u8,
    pub generated: String,
    pub articles: Vec<ManifestArticle>,
    pub locations: Vec<ManifestLocation>,
}

#[derive(Debug, Serialize)]
pub struct ManifestArticle {
    pub key: String,
    pub url: String,
    pub source_id: String,
    pub copyright: String,
    pub created: String,
    pub updated: String,
    /// Human-readable copy of `updated`.
    pub updated_at: String,
    /// Human-readable copy of `headline`.
    pub title: String,
    pub headline: String,
    pub article: String,
    pub credits: String,
    pub caption: String,
    pub image: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManifestLocation {
    pub name: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates: String,
    pub articles: Vec<String>,
}

pub fn build_manifest(output: &SourceOutput, now: DateTime<Utc>) -> Manifest {
    let year = now.year();

    let articles = output
        .collection
        .records
        .iter()
        .map(|(key, record)| ManifestArticle {
            key: key.to_string(),
            url: record.url.clone(),
            source_id: record.attribution.source_id.clone(),
            copyright: record.attribution.copyright_notice(year),
            created: hex::encode(record.created_bytes()),
            updated: hex::encode(record.updated_bytes()),
            updated_at: from_minutes_since_2000(record.updated_minutes).to_rfc3339(),
            title: decode_text(&record.headline),
            headline: hex::encode(&record.headline),
            article: hex::encode(&record.article),
            credits: hex::encode(&record.credits),
            caption: hex::encode(&record.caption),
            image: record.image.as_ref().map(hex::encode),
            location: record.location.clone(),
        })
        .collect();

    let locations = output
        .locations
        .iter()
        .map(|(name, location)| {
            let (latitude, longitude) = location.coordinates.degrees();
            ManifestLocation {
                name: hex::encode(name),
                display_name: location.display_name.clone(),
                latitude,
                longitude,
                coordinates: hex::encode(location.coordinates.to_bytes()),
                articles: location.article_keys.iter().map(ToString::to_string).collect(),
            }
        })
        .collect();

    Manifest {
        source: output.name.clone(),
        language: output.language.as_str(),
        language_code: output.language.code(),
        generated: hex::encode(crate::codec::u32(minutes_since_2000(now))),
        articles,
        locations,
    }
}

/// Write one source's manifest to `{output_dir}/{source}.json`.
///
/// # Arguments
///
/// * `output` - Records and locations of one source
/// * `output_dir` - Created if missing
/// * `now` - Generation time and copyright year
///
/// # Returns
///
/// The path written, or an error if serialization, directory creation or the
/// write fails.
///
/// # Examples
///
/// ```ignore
/// let path = write_source(&output, "./out", Utc::now()).await?;
/// assert!(path.ends_with("/AP.json"));
/// ```
#[instrument(level = "info", skip_all, fields(source = %output.name, output_dir = %output_dir))]
pub async fn write_source(
    output: &SourceOutput,
    output_dir: &str,
    now: DateTime<Utc>,
) -> Result<String, Box<dyn Error>> {
    let manifest = build_manifest(output, now);
    let json = serde_json::to_string_pretty(&manifest)?;

    fs::create_dir_all(output_dir).await?;
    let path = format!("{}/{}.json", output_dir.trim_end_matches('/'), output.name);

    info!(path = %path, articles = manifest.articles.len(), "Writing JSON");
    fs::write(&path, json).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::location::{CoordinateBlock, LocationRecord, LocationRecords};
    use crate::codec::enc;
    use crate::models::{ArticleCollection, ArticleDraft, ArticleKey, Attribution};
    use chrono::TimeZone;

    fn output() -> SourceOutput {
        let mut draft = ArticleDraft::new(
            "https://apnews.com/1",
            Attribution::new("AP", "© {year} The Associated Press"),
            10_000,
        );
        draft.headline = Some("Hi".into());
        draft.article = Some("Body".into());
        let record = draft.into_record(Some("London".into()), Some(vec![0xff, 0xd8])).unwrap();

        let mut collection = ArticleCollection::new("AP");
        collection.records.insert(ArticleKey::new("world", 1), record);

        let mut locations = LocationRecords::new();
        locations.insert(
            enc(Some("London")),
            LocationRecord {
                display_name: "London".into(),
                coordinates: CoordinateBlock::from_raw(0x24a0, 0xffeb),
                article_keys: vec![ArticleKey::new("world", 1)],
            },
        );

        SourceOutput {
            name: "AP".into(),
            language: Language::English,
            collection,
            locations,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 3, 12, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_build_manifest() {
        let manifest = build_manifest(&output(), now());

        assert_eq!(manifest.source, "AP");
        assert_eq!(manifest.language, "en");
        let article = &manifest.articles[0];
        assert_eq!(article.key, "world1");
        assert_eq!(article.copyright, "© 2019 The Associated Press");
        assert_eq!(article.created, "00002710");
        assert_eq!(article.headline, "00480069");
        assert_eq!(article.title, "Hi");
        assert_eq!(article.updated_at, "2000-01-07T22:40:00+00:00");
        assert_eq!(article.credits, "");
        assert_eq!(article.image.as_deref(), Some("ffd8"));

        let location = &manifest.locations[0];
        assert_eq!(location.name, "004c006f006e0064006f006e");
        assert_eq!(location.coordinates, "24a0ffeb0000000006000000");
        assert!((location.latitude - 51.50390625).abs() < 1e-9);
        assert_eq!(location.articles, vec!["world1"]);
    }

    #[tokio::test]
    async fn test_write_source() {
        let dir = std::env::temp_dir().join(format!("news_channel_json_{}", std::process::id()));
        let dir = dir.to_string_lossy().to_string();

        let path = write_source(&output(), &dir, now()).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["articles"][0]["key"], "world1");
        assert!(path.ends_with("/AP.json"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
