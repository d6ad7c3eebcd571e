//! Command-line interface definitions for the News Channel feed builder.
//!
//! Every option can also come from the configuration file; flags given here
//! win over the file.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Every configured source
/// news_channel -c config.yaml -o ./out
///
/// # Only two sources, geocoder key from the environment
/// GOOGLE_MAPS_API_KEY=... news_channel -o ./out -s AP -s Reuters
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Output directory for the per-source JSON manifests
    #[arg(short, long)]
    pub output_dir: String,

    /// Only run the named sources (repeatable)
    #[arg(short, long = "source")]
    pub sources: Vec<String>,

    /// Google Maps Geocoding API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY")]
    pub google_maps_api_key: Option<String>,
}
