//! Application module
//!
//! The main application structure:
//! - Full-screen map view with clustered trail markers
//! - Click dispatch: cluster clicks zoom in, trail clicks open a popup
//! - Toggleable sidebar with tabs (Trails and Settings)
//! - Persisted UI settings and dataset paths across sessions

mod camera;
mod dispatch;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::camera::{CameraRequest, CameraTransition};
use crate::app::dispatch::Dispatcher;
use crate::app::settings::Settings;
use crate::app::state::{AppState, SidebarTab};
use crate::map::tiles::{OpenTopoMap, StyleTileSource, TilesProvider};
use crate::map::{InteractionSignals, TrailLayerPlugin, TrailSource};
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use walkers::sources::OpenStreetMap;
use walkers::{HttpTiles, Map, MapMemory};

/// Persisted settings (lightweight, no trail data)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    sidebar_open: bool,
    active_tab: String,
    tiles_provider: String,
    /// Dataset paths that were loaded (will be reloaded)
    loaded_file_paths: Vec<String>,
}

/// Main application structure
pub struct TrailMapViewerApp {
    /// Application state (records, source, UI settings, etc.)
    state: AppState,

    /// Click router owning the selection state
    dispatcher: Dispatcher<TrailSource>,

    /// Signals flowing back from the map plugin each frame
    signals: Arc<InteractionSignals>,

    /// Camera requests resolved from cluster expansion-zoom lookups
    camera_rx: UnboundedReceiver<CameraRequest>,
    camera_tx: UnboundedSender<CameraRequest>,

    /// Camera transition currently animating, if any
    transition: Option<CameraTransition>,

    /// Map tiles providers
    tiles_osm: HttpTiles,
    tiles_otm: HttpTiles,
    tiles_custom: Option<HttpTiles>,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Fallback camera center before the first gesture
    home: CameraRequest,

    /// Show help overlay
    show_help: bool,
}

impl TrailMapViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();

        // Restore persisted UI settings and dataset paths unless told not to
        let persisted = if settings.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            None
        } else {
            cc.storage.and_then(Self::load_persisted_settings)
        };

        let dataset_paths = Self::dataset_paths(&settings, persisted.as_ref());
        let mut state = AppState::new(&settings, dataset_paths);
        state.ui_settings.custom_style_available = settings.map_style.is_some();
        if let Some(persisted) = &persisted {
            Self::apply_persisted_settings(&mut state, persisted);
        }

        let (camera_tx, camera_rx) = unbounded_channel();
        let dispatcher = Dispatcher::new(state.source.clone(), camera_tx.clone());

        // Create tiles providers
        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());
        let tiles_custom = settings.map_style.clone().map(|template| {
            HttpTiles::new(
                StyleTileSource::new(template, settings.access_token.clone()),
                cc.egui_ctx.clone(),
            )
        });

        // Start the camera at the configured view
        let mut map_memory = MapMemory::default();
        map_memory.center_at(walkers::lat_lon(settings.latitude, settings.longitude));
        if let Err(e) = map_memory.set_zoom(settings.zoom) {
            tracing::warn!(zoom = settings.zoom, error = ?e, "invalid initial zoom");
        }

        tracing::info!(
            trails = state.stats.trail_count,
            files = state.loader.loaded_files.len(),
            "initialized"
        );

        Self {
            state,
            dispatcher,
            signals: Arc::new(InteractionSignals::default()),
            camera_rx,
            camera_tx,
            transition: None,
            tiles_osm,
            tiles_otm,
            tiles_custom,
            map_memory,
            home: CameraRequest {
                lat: settings.latitude,
                lon: settings.longitude,
                zoom: settings.zoom,
            },
            show_help: false,
        }
    }

    /// Load persisted settings from storage (fast, no trail data)
    fn load_persisted_settings(storage: &dyn eframe::Storage) -> Option<PersistedSettings> {
        let json = storage.get_string("persisted_settings")?;
        match serde_json::from_str::<PersistedSettings>(&json) {
            Ok(persisted) => {
                tracing::info!("Restored settings, will reload datasets");
                Some(persisted)
            }
            Err(_) => {
                tracing::info!("No usable persisted settings found, starting fresh");
                None
            }
        }
    }

    /// Merge CLI and persisted dataset paths, deduplicating by canonical
    /// path so relative/absolute spellings of the same file load once.
    fn dataset_paths(settings: &Settings, persisted: Option<&PersistedSettings>) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut seen: std::collections::HashSet<PathBuf> = std::collections::HashSet::new();

        let mut add_file = |path: PathBuf| {
            if path.exists() {
                let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                if seen.insert(canonical) {
                    paths.push(path);
                }
            }
        };

        // CLI files take priority
        for path in &settings.trails {
            add_file(path.clone());
        }
        if let Some(persisted) = persisted {
            for path in &persisted.loaded_file_paths {
                add_file(PathBuf::from(path));
            }
        }

        paths
    }

    fn apply_persisted_settings(state: &mut AppState, persisted: &PersistedSettings) {
        state.ui_settings.sidebar_open = persisted.sidebar_open;
        state.ui_settings.active_tab = match persisted.active_tab.as_str() {
            "Settings" => SidebarTab::Settings,
            _ => SidebarTab::Trails,
        };
        state.ui_settings.tiles_provider = match persisted.tiles_provider.as_str() {
            "OpenTopoMap" => TilesProvider::OpenTopoMap,
            "CustomStyle" if state.ui_settings.custom_style_available => {
                TilesProvider::CustomStyle
            }
            _ => TilesProvider::OpenStreetMap,
        };
    }

    /// The camera placement the map currently shows.
    fn current_camera(&self) -> CameraRequest {
        let position = self
            .map_memory
            .detached()
            .unwrap_or_else(|| walkers::lat_lon(self.home.lat, self.home.lon));
        CameraRequest {
            lat: position.y(),
            lon: position.x(),
            zoom: self.map_memory.zoom(),
        }
    }

    /// Drain resolved expansion zooms and keep any transition animating.
    fn advance_camera(&mut self, ctx: &egui::Context) {
        // Last resolved wins: later requests replace the in-flight one.
        let mut target = None;
        while let Ok(request) = self.camera_rx.try_recv() {
            target = Some(request);
        }
        if let Some(target) = target {
            self.transition = Some(CameraTransition::new(self.current_camera(), target));
        }

        if let Some(transition) = &self.transition {
            let (placement, done) = transition.sample(instant::Instant::now());
            self.map_memory
                .center_at(walkers::lat_lon(placement.lat, placement.lon));
            if let Err(e) = self.map_memory.set_zoom(placement.zoom) {
                tracing::warn!(zoom = placement.zoom, error = ?e, "invalid transition zoom");
                self.transition = None;
            } else if done {
                self.transition = None;
            } else {
                ctx.request_repaint();
            }
        }
    }

    /// Replace the dispatcher after a dataset change; hit features and
    /// cluster ids from the previous source generation are stale.
    fn rebind_source(&mut self) {
        self.dispatcher = Dispatcher::new(self.state.source.clone(), self.camera_tx.clone());
    }
}

#[profiling::all_functions]
impl eframe::App for TrailMapViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
        });

        self.advance_camera(ctx);

        // Show help overlay if enabled
        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        // Render the sidebar; a dataset change invalidates the selection
        if ui_panels::render_sidebar(ctx, &mut self.state) {
            self.rebind_source();
        }
        if ui_panels::show_file_picker(&mut self.state) {
            self.rebind_source();
        }

        let source = self.state.source.clone();
        let selection = self.dispatcher.selection().cloned();
        let signals = self.signals.clone();
        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let plugin = TrailLayerPlugin::new(source, selection, signals);

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                    TilesProvider::CustomStyle => {
                        self.tiles_custom.as_mut().unwrap_or(&mut self.tiles_osm)
                    }
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(self.home.lat, self.home.lon),
                )
                .with_plugin(plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // Route the interactions the plugin reported this frame
        if self.signals.take_dismissed() {
            self.dispatcher.dismiss();
        }
        let clicks = self.signals.take_clicks();
        if !clicks.is_empty() {
            // A cluster click resolves off-thread; wake up shortly after to
            // pick the camera request off the channel.
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
        for hits in clicks {
            self.dispatcher.handle_click(&hits);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        // Save settings only (no trail data - fast)
        let settings = PersistedSettings {
            sidebar_open: self.state.ui_settings.sidebar_open,
            active_tab: format!("{:?}", self.state.ui_settings.active_tab),
            tiles_provider: format!("{:?}", self.state.ui_settings.tiles_provider),
            loaded_file_paths: self
                .state
                .loader
                .loaded_files
                .iter()
                .map(|(path, _)| path.to_string_lossy().to_string())
                .collect(),
        };

        if let Ok(json) = serde_json::to_string(&settings) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
