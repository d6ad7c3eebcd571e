//! Place name → console coordinate block.
//!
//! The console places a story on its globe using a 12-byte block:
//!
//! ```text
//! lat u16 BE | lng u16 BE | country u8 | region u8 | location u16 BE | zoom u32 LE
//! ```
//!
//! Latitude and longitude are signed fixed-point values in units of
//! 1/182 degree (0.0054931640625°), stored as their low 16 bits. Country,
//! region and location type are reserved and always zero; the zoom factor is
//! always 6.
//!
//! Names are resolved against the [gazetteer](crate::gazetteer) first and only
//! fall back to a [`Geocoder`] when the city is unknown. A name that cannot be
//! resolved is dropped from the output; its articles simply carry no location.

use crate::codec::{enc, u8, u16, u32_le};
use crate::config::Language;
use crate::error::{Error, Result};
use crate::gazetteer;
use crate::models::ArticleKey;
use crate::utils::ascii_fold;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Degrees per fixed-point unit.
pub const DEGREES_PER_UNIT: f64 = 0.0054931640625;
pub const ZOOM_FACTOR: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateBlock {
    pub latitude: u16,
    pub longitude: u16,
    pub country: u8,
    pub region: u8,
    pub location_type: u16,
    pub zoom: u32,
}

impl CoordinateBlock {
    pub fn from_raw(latitude: u16, longitude: u16) -> Self {
        Self {
            latitude,
            longitude,
            country: 0,
            region: 0,
            location_type: 0,
            zoom: ZOOM_FACTOR,
        }
    }

    /// Truncates toward zero, then keeps the low 16 bits.
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self::from_raw(to_fixed(lat), to_fixed(lng))
    }

    pub fn degrees(&self) -> (f64, f64) {
        (
            self.latitude as i16 as f64 * DEGREES_PER_UNIT,
            self.longitude as i16 as f64 * DEGREES_PER_UNIT,
        )
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..2].copy_from_slice(&u16(self.latitude));
        out[2..4].copy_from_slice(&u16(self.longitude));
        out[4..5].copy_from_slice(&u8(self.country));
        out[5..6].copy_from_slice(&u8(self.region));
        out[6..8].copy_from_slice(&u16(self.location_type));
        out[8..12].copy_from_slice(&u32_le(self.zoom));
        out
    }
}

fn to_fixed(degrees: f64) -> u16 {
    ((degrees / DEGREES_PER_UNIT) as i64 & 0xFFFF) as u16
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// One geocoder hit, shaped after the Google Geocoding API result object.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub geometry: Geometry,
}

pub trait Geocoder {
    /// Resolve a free-text place name. An empty vector means no match.
    async fn geocode(&self, query: &str, language: Language) -> Result<Vec<GeocodeResult>>;
}

/// [`Geocoder`] backed by the Google Geocoding REST API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleGeocoder {
    const ENDPOINT: &'static str = "https://maps.googleapis.com/maps/api/geocode/json";

    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: Self::ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// Interpret a Geocoding API response body.
///
/// `OK` yields the results and `ZERO_RESULTS` an empty list. Quota and key
/// refusals map to [`Error::RateLimited`]; any other status is an error.
pub fn parse_geocode_response(body: &str) -> Result<Vec<GeocodeResult>> {
    let response: GeocodeResponse = serde_json::from_str(body)?;
    match response.status.as_str() {
        "OK" => Ok(response.results),
        "ZERO_RESULTS" => Ok(Vec::new()),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" | "REQUEST_DENIED" => {
            Err(Error::RateLimited { service: "geocoding" })
        }
        other => Err(Error::Feed(format!("geocoder status {other}"))),
    }
}

/// The request URL carries the API key, so it is stripped from transport errors.
fn redacted(e: reqwest::Error) -> Error {
    Error::Http(e.without_url())
}

impl Geocoder for GoogleGeocoder {
    #[instrument(level = "debug", skip(self))]
    async fn geocode(&self, query: &str, language: Language) -> Result<Vec<GeocodeResult>> {
        let url = format!(
            "{}?address={}&language={}&key={}",
            self.endpoint,
            urlencoding::encode(query),
            language.as_str(),
            urlencoding::encode(&self.api_key)
        );
        let response = self.client.get(&url).send().await.map_err(redacted)?;
        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }
        let body = response.text().await.map_err(redacted)?;
        parse_geocode_response(&body)
    }
}

/// A resolved place and the articles that mention it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub display_name: String,
    pub coordinates: CoordinateBlock,
    pub article_keys: Vec<ArticleKey>,
}

/// Resolved places keyed by their encoded display name.
pub type LocationRecords = BTreeMap<Vec<u8>, LocationRecord>;

/// Resolve every distinct place name to a coordinate block.
///
/// Unresolvable names are logged and left out; nothing here fails the batch.
///
/// # Arguments
///
/// * `geocoder` - Queried only for names missing from the gazetteer
/// * `places` - Place name → keys of the articles that mention it
/// * `language` - Result language requested from the geocoder
///
/// # Returns
///
/// Records keyed by the encoded display name. Names that resolve to the same
/// display name share one record.
///
/// # Examples
///
/// ```ignore
/// let locations = resolve_locations(&geocoder, &collection.places(), Language::English).await;
/// let london = &locations[&enc(Some("London"))];
/// assert_eq!(london.coordinates.zoom, 6);
/// ```
#[instrument(level = "info", skip_all, fields(names = places.len(), language = language.as_str()))]
pub async fn resolve_locations<G: Geocoder>(
    geocoder: &G,
    places: &BTreeMap<String, Vec<ArticleKey>>,
    language: Language,
) -> LocationRecords {
    let mut records = LocationRecords::new();

    for (name, keys) in places {
        if name.trim().is_empty() {
            continue;
        }

        let Some((display_name, coordinates)) = resolve_one(geocoder, name, language).await else {
            continue;
        };

        let record = records
            .entry(enc(Some(&display_name)))
            .or_insert_with(|| LocationRecord {
                display_name,
                coordinates,
                article_keys: Vec::new(),
            });
        record.article_keys.extend(keys.iter().cloned());
    }

    info!(resolved = records.len(), "Resolved article locations");
    records
}

async fn resolve_one<G: Geocoder>(
    geocoder: &G,
    name: &str,
    language: Language,
) -> Option<(String, CoordinateBlock)> {
    if let Some(entry) = gazetteer::lookup(name) {
        debug!(%name, city = entry.key, "Gazetteer hit");
        return entry
            .coordinates()
            .map(|block| (entry.display_name.to_string(), block));
    }

    let query = ascii_fold(name);
    if query.is_empty() {
        debug!(%name, "Place name has no ASCII transliteration; dropping location");
        return None;
    }
    match geocoder.geocode(&query, language).await {
        Ok(results) => {
            let Some(first) = results.first() else {
                warn!(%name, "Geocoder returned no results; dropping location");
                return None;
            };
            let Some(component) = first.address_components.first() else {
                warn!(%name, "Geocoder result has no address components; dropping location");
                return None;
            };
            let LatLng { lat, lng } = first.geometry.location;
            Some((
                component.long_name.clone(),
                CoordinateBlock::from_degrees(lat, lng),
            ))
        }
        Err(e) => {
            warn!(%name, error = %e, "There was an error downloading the location data");
            None
        }
    }
}
