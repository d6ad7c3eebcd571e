//! Error type shared by the fetch, parse and resolve layers.
//!
//! Structural rejections (syndication restrictions, excluded headlines and so
//! on) are *not* errors; see [`crate::scrapers::Rejection`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed error: {0}")]
    Feed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rate limited by {service}")]
    RateLimited { service: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
