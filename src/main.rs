//! # News Channel
//!
//! Pulls wire-service news feeds (AP, Reuters, AFP, SID, ANSA, NU.nl and
//! Reuters Japanese), normalizes every recent article into a fixed-field
//! record and writes the records, with their resolved places, as JSON
//! manifests for the console packager.
//!
//! ## Usage
//!
//! ```sh
//! news_channel -c config.yaml -o ./out
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Feeds**: read every category feed of every configured source
//! 2. **Extraction**: per-source rules turn recent entries into records
//! 3. **Locations**: datelines are resolved to coordinate blocks (gazetteer
//!    first, geocoder fallback)
//! 4. **Output**: one JSON manifest per source

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod article;
mod cli;
mod codec;
mod config;
mod error;
mod feed;
mod gazetteer;
mod geoparser;
mod http;
mod imaging;
mod location;
mod models;
mod orchestrator;
mod outputs;
mod scrapers;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use config::Config;
use geoparser::GeoparserIo;
use http::ReqwestHttp;
use location::GoogleGeocoder;
use outputs::json;
use utils::ensure_writable_dir;

fn init_tracing(production: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());
    if production {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // Logging format depends on the config, so the config is read first.
    let mut config = Config::load(&args.config).await?;
    init_tracing(config.production);

    let start_time = std::time::Instant::now();
    info!(config = %args.config, production = config.production, "news_channel starting up");
    info!(cities = gazetteer::len(), "Gazetteer loaded");
    debug!(?args.output_dir, ?args.sources, "Parsed CLI arguments");

    if let Some(key) = args.google_maps_api_key.clone() {
        config.google_maps_api_key = Some(key);
    }
    if !args.sources.is_empty() {
        config
            .sources
            .retain(|s| args.sources.iter().any(|wanted| *wanted == s.name || wanted == s.kind.id()));
        if config.sources.is_empty() {
            warn!(requested = ?args.sources, "No configured source matches the requested names");
        }
    }

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let http = ReqwestHttp::new(&config.user_agent)?;
    let api_key = match config.google_maps_api_key.clone() {
        Some(key) => key,
        None => {
            warn!("No Google Maps API key configured; places outside the gazetteer will not resolve");
            String::new()
        }
    };
    let geocoder = GoogleGeocoder::new(http.client().clone(), api_key);
    if config.geoparser_keys.is_empty() {
        warn!("No geoparser keys configured; SID and NU.nl articles will carry no location");
    }
    let geoparser = GeoparserIo::new(http.client().clone(), config.geoparser_keys.clone());

    let now = Utc::now();
    let outputs = orchestrator::run_all(&http, &geocoder, &geoparser, &config.sources, now).await;

    let mut written = 0usize;
    for output in &outputs {
        match json::write_source(output, &args.output_dir, now).await {
            Ok(path) => {
                written += 1;
                info!(
                    path = %path,
                    articles = output.collection.len(),
                    locations = output.locations.len(),
                    "Wrote source manifest"
                );
            }
            Err(e) => error!(source = %output.name, error = %e, "Failed to write source manifest"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        sources = outputs.len(),
        written,
        "Execution complete"
    );

    Ok(())
}
