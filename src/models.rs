//! Data models for drafts, finished records and the per-source collection.
//!
//! - [`ArticleDraft`]: mutable builder owned by one extraction call
//! - [`ArticleRecord`]: immutable, binary-ready output unit
//! - [`ArticleKey`] / [`ArticleCollection`]: slot-keyed output of one source pass
//! - [`Attribution`]: source id and copyright template attached to a record

use crate::codec::{enc, u32};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Who a record is credited to. Normally the configured source, but a single
/// entry may carry an override (e.g. dpa copy syndicated through an AFP feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub source_id: String,
    pub copyright: String,
}

impl Attribution {
    pub fn new(source_id: impl Into<String>, copyright: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            copyright: copyright.into(),
        }
    }

    /// Fill the `{year}` placeholder of the copyright template.
    pub fn copyright_notice(&self, year: i32) -> String {
        self.copyright.replace("{year}", &year.to_string())
    }
}

/// Where the location of a draft comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocationHint {
    /// Read straight from metadata or a dateline.
    Found(String),
    /// Needs the geoparsing service run over the body text.
    Geoparse,
    #[default]
    Absent,
}

/// In-progress article for one feed entry.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub url: String,
    pub attribution: Option<Attribution>,
    pub updated_minutes: u32,
    pub headline: Option<String>,
    pub article: Option<String>,
    pub picture: Option<String>,
    pub resize: bool,
    pub credits: Option<String>,
    pub caption: Option<String>,
    pub html: Option<String>,
    pub location: LocationHint,
}

/// Why a draft could not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incomplete {
    MissingHeadline,
    MissingBody,
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incomplete::MissingHeadline => f.write_str("missing headline"),
            Incomplete::MissingBody => f.write_str("missing body text"),
        }
    }
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl ArticleDraft {
    pub fn new(url: impl Into<String>, attribution: Attribution, updated_minutes: u32) -> Self {
        Self {
            url: url.into(),
            attribution: Some(attribution),
            updated_minutes,
            ..Default::default()
        }
    }

    pub fn check_complete(&self) -> Result<(), Incomplete> {
        if !non_empty(&self.headline) {
            return Err(Incomplete::MissingHeadline);
        }
        if !non_empty(&self.article) {
            return Err(Incomplete::MissingBody);
        }
        Ok(())
    }

    /// Freeze the draft. `location` is the final place name (after any
    /// geoparsing) and `image` the already-normalized picture bytes.
    pub fn into_record(
        self,
        location: Option<String>,
        image: Option<Vec<u8>>,
    ) -> Result<ArticleRecord, Incomplete> {
        self.check_complete()?;
        let attribution = self.attribution.unwrap_or_else(|| Attribution::new("", ""));
        Ok(ArticleRecord {
            url: self.url,
            created_minutes: self.updated_minutes,
            updated_minutes: self.updated_minutes,
            article: enc(self.article.as_deref()),
            headline: enc(self.headline.as_deref()),
            image,
            credits: enc(self.credits.as_deref()),
            caption: enc(self.caption.as_deref()),
            location: location.filter(|l| !l.trim().is_empty()),
            attribution,
        })
    }
}

/// Finished article. Text fields are already in display encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub url: String,
    pub created_minutes: u32,
    pub updated_minutes: u32,
    pub article: Vec<u8>,
    pub headline: Vec<u8>,
    pub image: Option<Vec<u8>>,
    pub credits: Vec<u8>,
    pub caption: Vec<u8>,
    pub location: Option<String>,
    pub attribution: Attribution,
}

impl ArticleRecord {
    pub fn created_bytes(&self) -> [u8; 4] {
        u32(self.created_minutes)
    }

    pub fn updated_bytes(&self) -> [u8; 4] {
        u32(self.updated_minutes)
    }
}

/// Category code plus 1-based slot, rendered as e.g. `"world3"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArticleKey {
    pub category: String,
    pub slot: u32,
}

impl ArticleKey {
    pub fn new(category: impl Into<String>, slot: u32) -> Self {
        Self {
            category: category.into(),
            slot,
        }
    }
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.category, self.slot)
    }
}

/// All records produced by one pass over one source.
#[derive(Debug, Clone, Default)]
pub struct ArticleCollection {
    pub source: String,
    pub records: BTreeMap<ArticleKey, ArticleRecord>,
}

impl ArticleCollection {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct location strings and the keys of the articles using them.
    pub fn places(&self) -> BTreeMap<String, Vec<ArticleKey>> {
        let mut places: BTreeMap<String, Vec<ArticleKey>> = BTreeMap::new();
        for (key, record) in &self.records {
            if let Some(location) = &record.location {
                places.entry(location.clone()).or_default().push(key.clone());
            }
        }
        places
    }
}
