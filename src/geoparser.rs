//! Place-name extraction from free text via geoparser.io.
//!
//! Each API key has a monthly quota. A `402 Payment Required` answer means
//! the key is spent and the next one is tried. Once every key is spent the
//! client logs a single warning and stays disabled for the rest of the run.

use crate::error::Result;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};

pub trait Geoparser {
    /// Best place mentioned in `text`, formatted as `"name, country"`.
    async fn extract_place(&self, text: &str) -> Option<String>;
}

/// One attempt against one key.
#[derive(Debug)]
pub enum KeyOutcome {
    Place(Option<String>),
    QuotaExhausted,
}

#[derive(Debug, Deserialize)]
struct GeoparserResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    name: String,
    #[serde(default)]
    country: Option<String>,
}

/// Format the first feature of a geoparser.io response body.
pub fn place_from_response(body: &str) -> Option<String> {
    let response: GeoparserResponse = serde_json::from_str(body).ok()?;
    let first = response.features.into_iter().next()?.properties;
    Some(match first.country {
        Some(country) if !country.is_empty() => format!("{}, {}", first.name, country),
        _ => first.name,
    })
}

/// Try `attempt` with each key in order until one is not out of quota.
///
/// Returns `None` and flips `exhausted` when every key reports quota
/// exhaustion; request errors count as "no place" for that text.
pub async fn rotate_keys<F, Fut>(keys: &[String], exhausted: &AtomicBool, mut attempt: F) -> Option<String>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<KeyOutcome>>,
{
    if exhausted.load(Ordering::Relaxed) {
        return None;
    }

    for (index, key) in keys.iter().enumerate() {
        match attempt(key.clone()).await {
            Ok(KeyOutcome::QuotaExhausted) => {
                debug!(key_index = index, "Geoparser key out of quota; trying next");
                continue;
            }
            Ok(KeyOutcome::Place(place)) => return place,
            Err(e) => {
                info!(error = %e, "Geoparser request failed");
                return None;
            }
        }
    }

    if !exhausted.swap(true, Ordering::Relaxed) {
        warn!("Out of Geoparser requests.");
    }
    None
}

#[derive(Debug)]
pub struct GeoparserIo {
    client: reqwest::Client,
    keys: Vec<String>,
    exhausted: AtomicBool,
}

impl GeoparserIo {
    const ENDPOINT: &'static str = "https://geoparser.io/api/geoparser";

    pub fn new(client: reqwest::Client, keys: Vec<String>) -> Self {
        Self {
            client,
            keys,
            exhausted: AtomicBool::new(false),
        }
    }

    async fn attempt(&self, key: String, text: &str) -> Result<KeyOutcome> {
        let body = format!("inputText={}", urlencoding::encode(text));
        let response = self
            .client
            .post(Self::ENDPOINT)
            .header("Authorization", format!("apiKey {key}"))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        if response.status().as_u16() == 402 {
            return Ok(KeyOutcome::QuotaExhausted);
        }
        let body = response.text().await?;
        Ok(KeyOutcome::Place(place_from_response(&body)))
    }
}

impl Geoparser for GeoparserIo {
    #[instrument(level = "debug", skip_all, fields(chars = text.len()))]
    async fn extract_place(&self, text: &str) -> Option<String> {
        rotate_keys(&self.keys, &self.exhausted, |key| self.attempt(key, text)).await
    }
}
