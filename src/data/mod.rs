//! Trail Dataset Module
//!
//! This module loads the static trail dataset and converts it into the
//! geographic feature collection consumed by the map layers.
//!
//! # Overview
//!
//! - [`TrailRecord`]: one flat record per trail, deserialized leniently so
//!   that missing or malformed fields never fail a load
//! - [`features::feature_collection`]: pure, order-preserving conversion of
//!   records into a GeoJSON [`geojson::FeatureCollection`], built once at
//!   startup and never mutated afterwards

pub mod features;
mod record;

// Public API exports
pub use record::{TrailRecord, load_records, load_records_parallel};

/// Error types for the data module
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;
