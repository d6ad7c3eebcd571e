//! In-memory stand-ins for the network-facing traits.

use crate::config::Language;
use crate::error::{Error, Result};
use crate::geoparser::Geoparser;
use crate::http::Http;
use crate::location::{AddressComponent, GeocodeResult, Geocoder, Geometry, LatLng};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct FakeHttp {
    texts: HashMap<String, String>,
    bytes: HashMap<String, Vec<u8>>,
    redirects: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FakeHttp {
    pub fn with_text(mut self, url: &str, body: impl Into<String>) -> Self {
        self.texts.insert(url.to_string(), body.into());
        self
    }

    pub fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bytes.insert(url.to_string(), body);
        self
    }

    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn missing(url: &str) -> Error {
        Error::Status {
            status: 404,
            url: url.to_string(),
        }
    }
}

impl Http for FakeHttp {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.texts.get(url).cloned().ok_or_else(|| Self::missing(url))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.bytes.get(url).cloned().ok_or_else(|| Self::missing(url))
    }

    async fn resolve_redirect(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.redirects.get(url).cloned().ok_or_else(|| Self::missing(url))
    }
}

enum Canned {
    Hit(GeocodeResult),
    Fail,
}

/// Answers from a fixed table; unknown queries return no results.
#[derive(Default)]
pub struct FakeGeocoder {
    answers: HashMap<String, Canned>,
    queries: RefCell<Vec<(String, Language)>>,
}

impl FakeGeocoder {
    pub fn with_result(mut self, query: &str, name: &str, lat: f64, lng: f64) -> Self {
        let result = GeocodeResult {
            address_components: vec![AddressComponent {
                long_name: name.to_string(),
            }],
            geometry: Geometry {
                location: LatLng { lat, lng },
            },
        };
        self.answers.insert(query.to_string(), Canned::Hit(result));
        self
    }

    pub fn with_error(mut self, query: &str) -> Self {
        self.answers.insert(query.to_string(), Canned::Fail);
        self
    }

    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn languages(&self) -> Vec<Language> {
        self.queries.borrow().iter().map(|(_, l)| *l).collect()
    }
}

impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str, language: Language) -> Result<Vec<GeocodeResult>> {
        self.queries.borrow_mut().push((query.to_string(), language));
        match self.answers.get(query) {
            Some(Canned::Hit(result)) => Ok(vec![result.clone()]),
            Some(Canned::Fail) => Err(Error::RateLimited { service: "geocoding" }),
            None => Ok(Vec::new()),
        }
    }
}

/// Returns the same place for every text.
#[derive(Debug, Default)]
pub struct FakeGeoparser {
    place: Option<String>,
    texts: RefCell<Vec<String>>,
}

impl FakeGeoparser {
    pub fn answering(place: &str) -> Self {
        Self {
            place: Some(place.to_string()),
            texts: RefCell::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.texts.borrow().len()
    }
}

impl Geoparser for FakeGeoparser {
    async fn extract_place(&self, text: &str) -> Option<String> {
        self.texts.borrow_mut().push(text.to_string());
        self.place.clone()
    }
}
