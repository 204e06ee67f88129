//! Zoom-level cluster index for point markers
//!
//! Nearby trails collapse into a single cluster marker at low zoom levels
//! and separate as the user zooms in. The index is built once per dataset:
//! level `max_zoom + 1` holds every point unclustered, and each lower level
//! is formed by greedily merging the level above it within a pixel radius
//! measured in world coordinates at that zoom. A cluster keeps its identity
//! across the levels where its membership does not change, so the zoom at
//! which it splits is well-defined.

use crate::map::SourceError;
use geo::Point;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Pixel size of a world tile at zoom 0
const WORLD_TILE_PX: f64 = 256.0;

/// Cluster ids live above this offset so they never collide with the ids of
/// single points, which are their index into the feature collection.
const CLUSTER_ID_BASE: u64 = 1 << 32;

/// Clustering parameters, mirroring the source configuration of the map
/// engine the layers were designed for.
#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    /// Maximum zoom level at which points are still clustered
    pub max_zoom: u8,
    /// Grouping radius in screen pixels
    pub radius_px: f32,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            max_zoom: 14,
            radius_px: 50.0,
        }
    }
}

/// One marker at a given zoom level: either a single trail or a cluster.
#[derive(Debug, Clone)]
pub struct ClusterItem {
    /// Stable identifier; for single points this is the feature index
    pub id: u64,
    /// Marker position, `x` = longitude, `y` = latitude.
    /// Clusters sit at the mean position of their member points.
    pub position: Point<f64>,
    /// Indices of the member features, in order of first appearance
    pub members: Vec<usize>,
}

impl ClusterItem {
    /// Number of source points behind this marker
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Whether this marker represents more than one point
    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }
}

/// Immutable per-zoom cluster index over a fixed set of points.
pub struct ClusterIndex {
    /// Marker sets indexed by integer zoom, `0..=max_zoom + 1`
    levels: Vec<Vec<ClusterItem>>,
    /// Zoom level at which each cluster id separates into its constituents
    expansion: HashMap<u64, u8>,
    params: ClusterParams,
}

impl ClusterIndex {
    /// Build the index for a point set. `None` entries (features without a
    /// geometry) are carried in the collection but never rendered, so they
    /// simply do not appear in any level.
    pub fn build(points: &[Option<Point<f64>>], params: ClusterParams) -> Self {
        profiling::scope!("ClusterIndex::build");

        let leaves: Vec<ClusterItem> = points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                point.map(|position| ClusterItem {
                    id: index as u64,
                    position,
                    members: vec![index],
                })
            })
            .collect();

        let level_count = params.max_zoom as usize + 2;
        let mut levels = vec![Vec::new(); level_count];
        let mut expansion = HashMap::new();
        let mut next_cluster_id = CLUSTER_ID_BASE;

        levels[level_count - 1] = leaves;
        for zoom in (0..=params.max_zoom).rev() {
            levels[zoom as usize] = merge_level(
                &levels[zoom as usize + 1],
                zoom,
                params.radius_px,
                &mut next_cluster_id,
                &mut expansion,
            );
        }

        tracing::debug!(
            points = points.len(),
            clusters = expansion.len(),
            max_zoom = params.max_zoom,
            "built cluster index"
        );

        Self {
            levels,
            expansion,
            params,
        }
    }

    /// Markers to render at a (fractional) map zoom level.
    pub fn items_at(&self, zoom: f64) -> &[ClusterItem] {
        let level = zoom
            .floor()
            .clamp(0.0, (self.levels.len() - 1) as f64) as usize;
        &self.levels[level]
    }

    /// The minimum zoom at which the given cluster separates.
    ///
    /// Fails for ids that do not name a cluster, including the ids of single
    /// points and ids from a previous dataset generation.
    pub fn expansion_zoom(&self, cluster_id: u64) -> Result<f64, SourceError> {
        self.expansion
            .get(&cluster_id)
            .map(|zoom| f64::from(*zoom))
            .ok_or(SourceError::UnknownCluster(cluster_id))
    }

    pub fn params(&self) -> ClusterParams {
        self.params
    }
}

/// Merge the items of `zoom + 1` into the items of `zoom`.
fn merge_level(
    finer: &[ClusterItem],
    zoom: u8,
    radius_px: f32,
    next_cluster_id: &mut u64,
    expansion: &mut HashMap<u64, u8>,
) -> Vec<ClusterItem> {
    // Greedy grouping: each item joins the first group seeded within the
    // radius, otherwise seeds a new group at its own projected position.
    let mut seeds: Vec<Point<f64>> = Vec::new();
    let mut groups: Vec<Vec<&ClusterItem>> = Vec::new();

    for item in finer {
        let projected = world_px(item.position, zoom);
        let joined = seeds
            .iter()
            .position(|seed| distance_px(*seed, projected) <= f64::from(radius_px));
        match joined {
            Some(group) => groups[group].push(item),
            None => {
                seeds.push(projected);
                groups.push(vec![item]);
            }
        }
    }

    groups
        .into_iter()
        .map(|group| {
            if group.len() == 1 {
                // Unmerged items carry over, keeping their identity.
                return group[0].clone();
            }

            let total: usize = group.iter().map(|item| item.count()).sum();
            let lon = group
                .iter()
                .map(|item| item.position.x() * item.count() as f64)
                .sum::<f64>()
                / total as f64;
            let lat = group
                .iter()
                .map(|item| item.position.y() * item.count() as f64)
                .sum::<f64>()
                / total as f64;
            let members = group
                .iter()
                .flat_map(|item| item.members.iter().copied())
                .collect();

            let id = *next_cluster_id;
            *next_cluster_id += 1;
            // The constituents were separate one level up.
            expansion.insert(id, zoom + 1);

            ClusterItem {
                id,
                position: Point::new(lon, lat),
                members,
            }
        })
        .collect()
}

/// Project a longitude/latitude position to world pixels at a zoom level.
fn world_px(position: Point<f64>, zoom: u8) -> Point<f64> {
    let scale = WORLD_TILE_PX * 2f64.powi(i32::from(zoom));
    let x = (position.x() + 180.0) / 360.0;
    let lat = position.y().to_radians();
    let y = 0.5 - (lat.tan() + 1.0 / lat.cos()).ln() / (2.0 * PI);
    Point::new(x * scale, y * scale)
}

fn distance_px(a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = a.x() - b.x();
    let dy = a.y() - b.y();
    (dx * dx + dy * dy).sqrt()
}
