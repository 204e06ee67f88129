//! Marker layer identifiers and styling
//!
//! Three layers are drawn over the base tiles: filled circles for clusters,
//! a count label on top of each cluster, and smaller outlined circles for
//! unclustered trails. Click hits are tagged with the layer they came from
//! and the application dispatches on that tag.

use egui::Color32;

pub const CLUSTER_LAYER: &str = "clusters";
pub const CLUSTER_COUNT_LAYER: &str = "cluster-count";
pub const UNCLUSTERED_LAYER: &str = "unclustered-point";

/// Identifier of the layer a rendered feature originates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerId {
    /// Clustered circle markers
    Clusters,
    /// Count labels drawn over cluster circles (render-only, never hit)
    ClusterCount,
    /// Individual trail markers
    UnclusteredPoint,
    /// Any layer outside this set; dispatches to a no-op
    Other(String),
}

impl LayerId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clusters => CLUSTER_LAYER,
            Self::ClusterCount => CLUSTER_COUNT_LAYER,
            Self::UnclusteredPoint => UNCLUSTERED_LAYER,
            Self::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            CLUSTER_LAYER => Self::Clusters,
            CLUSTER_COUNT_LAYER => Self::ClusterCount,
            UNCLUSTERED_LAYER => Self::UnclusteredPoint,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Fill color shared by cluster and point markers
pub const MARKER_FILL: Color32 = Color32::from_rgb(0x2b, 0x2b, 0x2b);

/// Stroke color around unclustered points
pub const MARKER_STROKE: Color32 = Color32::WHITE;
pub const MARKER_STROKE_WIDTH: f32 = 1.0;

/// Radius of an unclustered point marker in pixels
pub const POINT_RADIUS: f32 = 8.0;

/// Cluster count label styling
pub const COUNT_TEXT_SIZE: f32 = 12.0;
pub const COUNT_TEXT_COLOR: Color32 = Color32::WHITE;

/// Cluster circle radius in pixels, stepped by point count.
pub fn cluster_radius(count: usize) -> f32 {
    if count >= 50 {
        25.0
    } else if count >= 20 {
        20.0
    } else {
        15.0
    }
}

/// Abbreviate a cluster count for its label, e.g. `1200` becomes `1.2k`.
pub fn abbreviate_count(count: usize) -> String {
    if count < 1000 {
        count.to_string()
    } else if count < 10_000 {
        let thousands = count as f64 / 1000.0;
        let rounded = (thousands * 10.0).round() / 10.0;
        if rounded.fract() == 0.0 {
            format!("{}k", rounded as usize)
        } else {
            format!("{rounded:.1}k")
        }
    } else {
        format!("{}k", count / 1000)
    }
}
