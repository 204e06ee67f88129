//! Clustered trail source: the feature collection plus its cluster index
//!
//! Plays the part a clustering vector source plays in a full map engine:
//! it owns the immutable feature collection, groups nearby points per zoom
//! level, resolves screen-space hit-tests into layer-tagged features, and
//! answers expansion-zoom queries for cluster markers.

use crate::data::TrailRecord;
use crate::data::features::{self, point_coordinates};
use crate::map::SourceError;
use crate::map::clustering::{ClusterIndex, ClusterItem, ClusterParams};
use crate::map::layers::{self, LayerId};
use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

/// The immutable trail source built once at startup.
pub struct TrailSource {
    collection: FeatureCollection,
    index: ClusterIndex,
}

impl TrailSource {
    /// Build the source from the raw dataset.
    pub fn new(records: &[TrailRecord], params: ClusterParams) -> Self {
        Self::from_collection(features::feature_collection(records), params)
    }

    /// Build the source from an already-built feature collection.
    pub fn from_collection(collection: FeatureCollection, params: ClusterParams) -> Self {
        profiling::scope!("TrailSource::from_collection");

        let points: Vec<Option<Point<f64>>> = collection
            .features
            .iter()
            .map(|feature| point_coordinates(feature).map(|(lon, lat)| Point::new(lon, lat)))
            .collect();
        let index = ClusterIndex::build(&points, params);

        Self { collection, index }
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn feature_count(&self) -> usize {
        self.collection.features.len()
    }

    /// Markers to render at the given map zoom.
    pub fn items_at(&self, zoom: f64) -> &[ClusterItem] {
        self.index.items_at(zoom)
    }

    pub fn params(&self) -> ClusterParams {
        self.index.params()
    }

    /// The source feature behind an unclustered marker.
    pub fn point_feature(&self, item: &ClusterItem) -> Option<&Feature> {
        self.collection.features.get(*item.members.first()?)
    }

    /// Synthesize the feature a cluster marker exposes to hit-testing,
    /// carrying the cluster bookkeeping as properties.
    pub fn cluster_feature(&self, item: &ClusterItem) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("cluster".to_string(), JsonValue::from(true));
        properties.insert("cluster_id".to_string(), JsonValue::from(item.id));
        properties.insert("point_count".to_string(), JsonValue::from(item.count()));
        properties.insert(
            "point_count_abbreviated".to_string(),
            JsonValue::from(layers::abbreviate_count(item.count())),
        );

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                item.position.x(),
                item.position.y(),
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// The minimum zoom at which a cluster separates into its constituents.
    ///
    /// Fails for ids that do not name a live cluster, including ids from a
    /// previous dataset generation.
    pub fn cluster_expansion_zoom(&self, cluster_id: u64) -> Result<f64, SourceError> {
        self.index.expansion_zoom(cluster_id)
    }
}

/// A marker the layer plugin painted this frame, in paint order.
#[derive(Debug, Clone)]
pub struct RenderedMarker {
    pub layer: LayerId,
    pub screen: egui::Pos2,
    pub radius: f32,
    /// Index into the zoom level's marker set
    pub item: usize,
}

/// A feature under a click, tagged with its originating layer.
#[derive(Debug, Clone)]
pub struct HitFeature {
    pub layer: LayerId,
    pub feature: Feature,
}

/// Resolve the rendered features under a screen point, topmost first
/// (reverse paint order).
pub fn hit_test(
    screen: egui::Pos2,
    rendered: &[RenderedMarker],
    source: &TrailSource,
    zoom: f64,
) -> Vec<HitFeature> {
    let items = source.items_at(zoom);
    rendered
        .iter()
        .rev()
        .filter(|marker| marker.screen.distance(screen) <= marker.radius)
        .filter_map(|marker| {
            let item = items.get(marker.item)?;
            let feature = match marker.layer {
                LayerId::Clusters => source.cluster_feature(item),
                LayerId::UnclusteredPoint => source.point_feature(item)?.clone(),
                _ => return None,
            };
            Some(HitFeature {
                layer: marker.layer.clone(),
                feature,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::features::{property_str, property_u64};

    fn record(id: i64, name: &str, lat: f64, lon: f64) -> TrailRecord {
        TrailRecord {
            id: Some(id),
            name: Some(name.to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
            ..TrailRecord::default()
        }
    }

    /// Two coincident trails (a cluster at low zoom) plus one far away.
    fn test_source() -> TrailSource {
        TrailSource::new(
            &[
                record(1, "Misery Ridge", 44.37, -121.14),
                record(2, "River Trail", 44.37, -121.14),
                record(7, "Smith Rock", 50.0, 10.0),
            ],
            ClusterParams::default(),
        )
    }

    #[test]
    fn cluster_feature_carries_bookkeeping_properties() {
        let source = test_source();
        let items = source.items_at(0.0);
        let cluster = items.iter().find(|item| item.is_cluster()).unwrap();

        let feature = source.cluster_feature(cluster);
        assert_eq!(property_u64(&feature, "cluster_id"), Some(cluster.id));
        assert_eq!(property_u64(&feature, "point_count"), Some(2));
        assert_eq!(
            property_str(&feature, "point_count_abbreviated"),
            Some("2")
        );
        assert_eq!(
            point_coordinates(&feature),
            Some((cluster.position.x(), cluster.position.y()))
        );
    }

    #[test]
    fn hit_inside_cluster_circle_resolves_to_cluster() {
        let source = test_source();
        let items = source.items_at(0.0);
        let cluster_index = items.iter().position(|item| item.is_cluster()).unwrap();

        let rendered = vec![RenderedMarker {
            layer: LayerId::Clusters,
            screen: egui::pos2(100.0, 100.0),
            radius: 15.0,
            item: cluster_index,
        }];

        let hits = hit_test(egui::pos2(108.0, 104.0), &rendered, &source, 0.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer, LayerId::Clusters);
        assert!(property_u64(&hits[0].feature, "cluster_id").is_some());
    }

    #[test]
    fn hit_inside_point_marker_resolves_to_the_trail() {
        let source = test_source();
        let items = source.items_at(0.0);
        let point_index = items.iter().position(|item| !item.is_cluster()).unwrap();

        let rendered = vec![RenderedMarker {
            layer: LayerId::UnclusteredPoint,
            screen: egui::pos2(300.0, 40.0),
            radius: 8.0,
            item: point_index,
        }];

        let hits = hit_test(egui::pos2(303.0, 42.0), &rendered, &source, 0.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer, LayerId::UnclusteredPoint);
        assert_eq!(property_str(&hits[0].feature, "name"), Some("Smith Rock"));
        assert_eq!(property_u64(&hits[0].feature, "id"), Some(7));
    }

    #[test]
    fn miss_returns_empty_list() {
        let source = test_source();
        let rendered = vec![RenderedMarker {
            layer: LayerId::Clusters,
            screen: egui::pos2(100.0, 100.0),
            radius: 15.0,
            item: 0,
        }];

        let hits = hit_test(egui::pos2(200.0, 200.0), &rendered, &source, 0.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn overlapping_markers_hit_topmost_first() {
        let source = test_source();
        let items = source.items_at(0.0);
        let cluster_index = items.iter().position(|item| item.is_cluster()).unwrap();
        let point_index = items.iter().position(|item| !item.is_cluster()).unwrap();

        // The point is painted after (over) the cluster at the same spot.
        let rendered = vec![
            RenderedMarker {
                layer: LayerId::Clusters,
                screen: egui::pos2(100.0, 100.0),
                radius: 15.0,
                item: cluster_index,
            },
            RenderedMarker {
                layer: LayerId::UnclusteredPoint,
                screen: egui::pos2(100.0, 100.0),
                radius: 8.0,
                item: point_index,
            },
        ];

        let hits = hit_test(egui::pos2(100.0, 100.0), &rendered, &source, 0.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].layer, LayerId::UnclusteredPoint);
        assert_eq!(hits[1].layer, LayerId::Clusters);
    }

    #[test]
    fn expansion_zoom_resolves_for_known_clusters_only() {
        let source = test_source();
        let items = source.items_at(0.0);
        let cluster = items.iter().find(|item| item.is_cluster()).unwrap();

        let zoom = source.cluster_expansion_zoom(cluster.id).unwrap();
        assert!(zoom > 0.0);
        assert!(source.cluster_expansion_zoom(123_456_789).is_err());
    }
}
