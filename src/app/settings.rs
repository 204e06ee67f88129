use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Trail Map Viewer - An interactive map of hiking trails with clustered markers
pub struct Settings {
    /// Trail dataset files (JSON) to load on startup
    #[clap(short, long, value_name = "FILE")]
    pub trails: Vec<PathBuf>,

    /// Access credential passed to the tile provider
    /// (falls back to the TRAIL_MAP_ACCESS_TOKEN environment variable)
    #[clap(long, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Base map style as a tile URL template with {z}/{x}/{y} placeholders
    /// (falls back to the TRAIL_MAP_STYLE environment variable)
    #[clap(long, value_name = "URL")]
    pub map_style: Option<String>,

    /// Maximum zoom level at which trails are still clustered
    #[clap(long, default_value = "14")]
    pub cluster_max_zoom: u8,

    /// Clustering radius in pixels
    #[clap(long, default_value = "50.0")]
    pub cluster_radius: f32,

    /// Initial camera latitude
    #[clap(long, default_value = "44.0")]
    pub latitude: f64,

    /// Initial camera longitude
    #[clap(long, default_value = "-120.0")]
    pub longitude: f64,

    /// Initial camera zoom level
    #[clap(long, default_value = "6.5")]
    pub zoom: f64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse settings from the command line, with environment fallbacks for
    /// the opaque tile-provider configuration.
    pub fn from_cli() -> Self {
        let mut settings = match Self::try_parse() {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        };
        if settings.access_token.is_none() {
            settings.access_token = std::env::var("TRAIL_MAP_ACCESS_TOKEN").ok();
        }
        if settings.map_style.is_none() {
            settings.map_style = std::env::var("TRAIL_MAP_STYLE").ok();
        }
        settings
    }
}
