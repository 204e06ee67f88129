//! Walkers plugin for the trail marker layers and the selection popup
//!
//! Projects the cluster index onto the screen each frame, paints the three
//! marker layers, hit-tests clicks against what was actually painted, and
//! draws the dismissible popup anchored to the selected trail. Click hits
//! and popup dismissal are reported back to the application through shared
//! signals, since the plugin itself is consumed by the map widget per frame.

use crate::data::features::{point_coordinates, property_f64, property_str, property_u64};
use crate::map::layers::{self, LayerId};
use crate::map::source::{HitFeature, RenderedMarker, TrailSource, hit_test};
use egui::{Align2, Color32, FontId, Stroke};
use geojson::Feature;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Signals flowing from the per-frame plugin back to the application.
#[derive(Default)]
pub struct InteractionSignals {
    /// One hit list per click event, in event order
    clicks: Mutex<Vec<Vec<HitFeature>>>,
    /// Set when the popup's close control was activated
    dismissed: AtomicBool,
}

impl InteractionSignals {
    /// Drain the hit lists collected since the last call.
    pub fn take_clicks(&self) -> Vec<Vec<HitFeature>> {
        match self.clicks.lock() {
            Ok(mut clicks) => std::mem::take(&mut *clicks),
            Err(_) => Vec::new(),
        }
    }

    /// Whether the popup was dismissed since the last call.
    pub fn take_dismissed(&self) -> bool {
        self.dismissed.swap(false, Ordering::Relaxed)
    }

    fn push_click(&self, hits: Vec<HitFeature>) {
        if let Ok(mut clicks) = self.clicks.lock() {
            clicks.push(hits);
        }
    }
}

/// Plugin painting the trail layers on the map
pub struct TrailLayerPlugin {
    source: Arc<TrailSource>,
    /// Snapshot of the current selection for popup drawing
    selection: Option<Feature>,
    signals: Arc<InteractionSignals>,
}

impl TrailLayerPlugin {
    pub fn new(
        source: Arc<TrailSource>,
        selection: Option<Feature>,
        signals: Arc<InteractionSignals>,
    ) -> Self {
        Self {
            source,
            selection,
            signals,
        }
    }
}

impl Plugin for TrailLayerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("TrailLayerPlugin::run");

        let painter = ui.painter();
        let zoom = map_memory.zoom();
        let items = self.source.items_at(zoom);
        let viewport = response.rect;

        // Paint order follows the layer stack: cluster circles, count
        // labels, then unclustered points.
        let mut rendered: Vec<RenderedMarker> = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if !item.is_cluster() {
                continue;
            }
            let position = walkers::lat_lon(item.position.y(), item.position.x());
            let screen_vec = projector.project(position);
            let screen = egui::pos2(screen_vec.x, screen_vec.y);
            let radius = layers::cluster_radius(item.count());
            if !viewport.expand(radius).contains(screen) {
                continue;
            }

            painter.circle_filled(screen, radius, layers::MARKER_FILL);
            rendered.push(RenderedMarker {
                layer: LayerId::Clusters,
                screen,
                radius,
                item: index,
            });
        }

        for marker in &rendered {
            let count = items[marker.item].count();
            painter.text(
                marker.screen,
                Align2::CENTER_CENTER,
                layers::abbreviate_count(count),
                FontId::proportional(layers::COUNT_TEXT_SIZE),
                layers::COUNT_TEXT_COLOR,
            );
        }

        for (index, item) in items.iter().enumerate() {
            if item.is_cluster() {
                continue;
            }
            let position = walkers::lat_lon(item.position.y(), item.position.x());
            let screen_vec = projector.project(position);
            let screen = egui::pos2(screen_vec.x, screen_vec.y);
            if !viewport.expand(layers::POINT_RADIUS).contains(screen) {
                continue;
            }

            painter.circle(
                screen,
                layers::POINT_RADIUS,
                layers::MARKER_FILL,
                Stroke::new(layers::MARKER_STROKE_WIDTH, layers::MARKER_STROKE),
            );
            rendered.push(RenderedMarker {
                layer: LayerId::UnclusteredPoint,
                screen,
                radius: layers::POINT_RADIUS,
                item: index,
            });
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let hits = hit_test(pointer, &rendered, &self.source, zoom);
            tracing::trace!(hits = hits.len(), "map click");
            self.signals.push_click(hits);
        }

        if let Some(feature) = &self.selection {
            trail_popup(ui, projector, feature, &self.signals);
        }
    }
}

/// Draw the info popup anchored below the selected trail's position.
fn trail_popup(
    ui: &egui::Ui,
    projector: &Projector,
    feature: &Feature,
    signals: &InteractionSignals,
) {
    let Some((lon, lat)) = point_coordinates(feature) else {
        return;
    };
    let screen_vec = projector.project(walkers::lat_lon(lat, lon));
    let anchor = egui::pos2(screen_vec.x, screen_vec.y + layers::POINT_RADIUS + 4.0);

    egui::Area::new(egui::Id::new("trail_popup"))
        .pivot(Align2::CENTER_TOP)
        .fixed_pos(anchor)
        .order(egui::Order::Foreground)
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(240.0);

                ui.horizontal(|ui| {
                    ui.heading(property_str(feature, "name").unwrap_or("Unnamed trail"));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            signals.dismissed.store(true, Ordering::Relaxed);
                        }
                    });
                });
                ui.separator();

                if let Some(distance) = property_f64(feature, "distance") {
                    ui.label(format!("Distance: {distance} miles"));
                }
                if let Some(gain) = property_f64(feature, "elevationGain") {
                    ui.label(format!("Elevation gain: {gain} ft"));
                }
                if let Some(difficulty) = property_str(feature, "difficulty") {
                    ui.label(format!("Difficulty: {difficulty}"));
                }
                if let Some(rating) = property_f64(feature, "rating") {
                    let reviews = property_u64(feature, "reviews").unwrap_or(0);
                    ui.label(format!("Rating: {rating} / 5 ({reviews} reviews)"));
                }

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if let Some(url) = property_str(feature, "url") {
                        ui.hyperlink_to("View more", url);
                    }
                    if let Some(image) = property_str(feature, "image") {
                        ui.hyperlink_to(
                            egui::RichText::new("Photo").small().color(Color32::GRAY),
                            image,
                        );
                    }
                });
            });
        });
}
