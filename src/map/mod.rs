//! Map Layer Module
//!
//! Everything the map widget needs beyond tiles: the clustered trail
//! source, the three marker layers (cluster circles, cluster-count labels,
//! unclustered points), hit-testing, and the anchored trail popup.
//!
//! The [`TrailSource`] owns an immutable cluster index derived from the
//! feature collection at startup; the [`TrailLayerPlugin`] projects and
//! paints it every frame and reports click hits back to the application.

mod clustering;
pub mod layers;
mod plugin;
mod source;
pub mod tiles;

// Public API exports
pub use clustering::{ClusterIndex, ClusterItem, ClusterParams};
pub use layers::LayerId;
pub use plugin::{InteractionSignals, TrailLayerPlugin};
pub use source::{HitFeature, RenderedMarker, TrailSource, hit_test};

/// Error types for the map module
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unknown cluster id: {0}")]
    UnknownCluster(u64),
}
