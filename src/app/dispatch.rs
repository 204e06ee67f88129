//! Interaction dispatcher: routes map clicks to a zoom or a selection
//!
//! Given the hit list resolved for a click, the dispatcher either requests
//! a zoom that expands a cluster or selects a single trail for the detail
//! popup. It owns the only mutable state in the core logic: the currently
//! selected trail.
//!
//! Only the first element of a hit list is ever considered; overlapping
//! features behind it are ignored. The cluster expansion-zoom lookup is
//! asynchronous: the dispatcher issues it and keeps handling events, and
//! the camera request is emitted on the channel when the lookup resolves.
//! A failed lookup emits nothing and the camera stays put.

use crate::app::camera::CameraRequest;
use crate::data::features::{point_coordinates, property_u64};
use crate::map::{HitFeature, LayerId, SourceError};
use geojson::Feature;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// The collaborator-side cluster query the dispatcher depends on.
pub trait ExpansionZoomProvider: Send + Sync + 'static {
    /// The minimum zoom at which the given cluster separates, or an error
    /// for unknown/stale cluster ids.
    fn expansion_zoom(
        &self,
        cluster_id: u64,
    ) -> impl Future<Output = Result<f64, SourceError>> + Send;
}

impl ExpansionZoomProvider for crate::map::TrailSource {
    async fn expansion_zoom(&self, cluster_id: u64) -> Result<f64, SourceError> {
        self.cluster_expansion_zoom(cluster_id)
    }
}

/// Click router and owner of the selection state.
pub struct Dispatcher<P> {
    provider: Arc<P>,
    camera_tx: UnboundedSender<CameraRequest>,
    selection: Option<Feature>,
}

impl<P: ExpansionZoomProvider> Dispatcher<P> {
    pub fn new(provider: Arc<P>, camera_tx: UnboundedSender<CameraRequest>) -> Self {
        Self {
            provider,
            camera_tx,
            selection: None,
        }
    }

    /// The currently selected trail, if any.
    pub fn selection(&self) -> Option<&Feature> {
        self.selection.as_ref()
    }

    /// Route a click given the features resolved under it.
    pub fn handle_click(&mut self, hits: &[HitFeature]) {
        let Some(first) = hits.first() else {
            return;
        };

        match &first.layer {
            LayerId::Clusters => {
                let Some(cluster_id) = property_u64(&first.feature, "cluster_id") else {
                    return;
                };
                let Some((lon, lat)) = point_coordinates(&first.feature) else {
                    return;
                };
                tokio::spawn(Self::zoom_to_cluster(
                    self.provider.clone(),
                    self.camera_tx.clone(),
                    cluster_id,
                    lat,
                    lon,
                ));
            }
            LayerId::UnclusteredPoint => {
                self.selection = Some(first.feature.clone());
            }
            // Count labels and any future layers are not interactive.
            _ => {}
        }
    }

    /// Clear the selection; closing the detail popup always lands here.
    pub fn dismiss(&mut self) {
        self.selection = None;
    }

    /// Look up the cluster's expansion zoom and emit the camera request.
    /// Runs detached from event handling; a failed lookup emits nothing.
    pub(crate) async fn zoom_to_cluster(
        provider: Arc<P>,
        camera_tx: UnboundedSender<CameraRequest>,
        cluster_id: u64,
        lat: f64,
        lon: f64,
    ) {
        match provider.expansion_zoom(cluster_id).await {
            Ok(zoom) => {
                let _ = camera_tx.send(CameraRequest { lat, lon, zoom });
            }
            Err(err) => {
                tracing::trace!(cluster_id, %err, "expansion zoom lookup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, JsonObject, JsonValue, Value};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    /// Provider scripted to answer zoom 9 for cluster 3 and fail otherwise.
    struct ScriptedProvider;

    impl ExpansionZoomProvider for ScriptedProvider {
        async fn expansion_zoom(&self, cluster_id: u64) -> Result<f64, SourceError> {
            if cluster_id == 3 {
                Ok(9.0)
            } else {
                Err(SourceError::UnknownCluster(cluster_id))
            }
        }
    }

    fn dispatcher() -> (Dispatcher<ScriptedProvider>, UnboundedReceiver<CameraRequest>) {
        let (camera_tx, camera_rx) = unbounded_channel();
        (Dispatcher::new(Arc::new(ScriptedProvider), camera_tx), camera_rx)
    }

    fn point_hit(id: i64, name: &str) -> HitFeature {
        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), JsonValue::from(id));
        properties.insert("name".to_string(), JsonValue::from(name));
        HitFeature {
            layer: LayerId::UnclusteredPoint,
            feature: Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![-121.14, 44.37]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            },
        }
    }

    fn cluster_hit(cluster_id: u64, lon: f64, lat: f64) -> HitFeature {
        let mut properties = JsonObject::new();
        properties.insert("cluster".to_string(), JsonValue::from(true));
        properties.insert("cluster_id".to_string(), JsonValue::from(cluster_id));
        properties.insert("point_count".to_string(), JsonValue::from(4));
        HitFeature {
            layer: LayerId::Clusters,
            feature: Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            },
        }
    }

    #[test]
    fn point_click_selects_and_dismissal_clears() {
        let (mut dispatcher, _camera_rx) = dispatcher();

        dispatcher.handle_click(&[point_hit(7, "Smith Rock")]);
        let selected = dispatcher.selection().unwrap();
        assert_eq!(property_u64(selected, "id"), Some(7));

        dispatcher.dismiss();
        assert!(dispatcher.selection().is_none());
    }

    #[test]
    fn point_click_replaces_previous_selection() {
        let (mut dispatcher, _camera_rx) = dispatcher();

        dispatcher.handle_click(&[point_hit(7, "Smith Rock")]);
        dispatcher.handle_click(&[point_hit(9, "Misery Ridge")]);

        let selected = dispatcher.selection().unwrap();
        assert_eq!(property_u64(selected, "id"), Some(9));
    }

    #[test]
    fn empty_hit_list_is_a_noop() {
        let (mut dispatcher, mut camera_rx) = dispatcher();
        dispatcher.handle_click(&[]);
        assert!(dispatcher.selection().is_none());
        assert!(camera_rx.try_recv().is_err());
    }

    #[test]
    fn unrecognized_first_layer_ignores_the_whole_list() {
        let (mut dispatcher, mut camera_rx) = dispatcher();

        let mut water = point_hit(7, "Smith Rock");
        water.layer = LayerId::Other("water".to_string());
        // First wins: the point hit behind it must be ignored.
        dispatcher.handle_click(&[water, point_hit(7, "Smith Rock")]);

        assert!(dispatcher.selection().is_none());
        assert!(camera_rx.try_recv().is_err());
    }

    #[test]
    fn cluster_hit_without_cluster_id_is_a_noop() {
        let (mut dispatcher, mut camera_rx) = dispatcher();

        let mut hit = cluster_hit(3, -121.5, 44.2);
        hit.feature
            .properties
            .as_mut()
            .unwrap()
            .remove("cluster_id");
        dispatcher.handle_click(&[hit]);

        assert!(dispatcher.selection().is_none());
        assert!(camera_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cluster_click_requests_the_expansion_camera_move() {
        let (mut dispatcher, mut camera_rx) = dispatcher();

        dispatcher.handle_click(&[cluster_hit(3, -121.5, 44.2)]);

        let request = camera_rx.recv().await.unwrap();
        assert_eq!(
            request,
            CameraRequest {
                lat: 44.2,
                lon: -121.5,
                zoom: 9.0
            }
        );
        // Selecting is the point layer's business; a cluster click never
        // touches the selection.
        assert!(dispatcher.selection().is_none());
        // Exactly one request per click.
        assert!(camera_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_lookup_emits_nothing() {
        let (dispatcher, mut camera_rx) = dispatcher();

        Dispatcher::zoom_to_cluster(
            dispatcher.provider.clone(),
            dispatcher.camera_tx.clone(),
            42,
            44.2,
            -121.5,
        )
        .await;

        assert!(camera_rx.try_recv().is_err());
        assert!(dispatcher.selection().is_none());
    }

    #[tokio::test]
    async fn pending_zoom_still_applies_after_interim_dismissal() {
        let (mut dispatcher, mut camera_rx) = dispatcher();

        dispatcher.handle_click(&[cluster_hit(3, -121.5, 44.2)]);
        // The user selects and dismisses while the lookup is in flight.
        dispatcher.handle_click(&[point_hit(7, "Smith Rock")]);
        dispatcher.dismiss();

        let request = camera_rx.recv().await.unwrap();
        assert_eq!(request.zoom, 9.0);
    }
}
