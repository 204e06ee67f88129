//! Trail Map Viewer - Application Library
//!
//! An interactive map of hiking trails: a static trail dataset is turned
//! into a GeoJSON feature collection once at startup, rendered as clustered
//! markers over slippy-map tiles, and clicks either zoom into a cluster or
//! open a detail popup for a single trail.

pub mod app;
pub mod data;
pub mod map;

pub use app::TrailMapViewerApp;
