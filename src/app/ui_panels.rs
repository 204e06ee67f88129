//! UI panels for the application
//!
//! Sidebar with trail statistics and settings, the help overlay, and the
//! dataset file picker.

use crate::app::state::{AppState, SidebarTab};
use crate::map::tiles::TilesProvider;
use egui::{Color32, RichText, Ui};

/// Render the sidebar with its tabs. Returns true when the dataset
/// changed and selection state derived from it must be dropped.
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) -> bool {
    let mut dataset_changed = false;

    egui::SidePanel::left("sidebar")
        .resizable(false)
        .default_width(260.0)
        .show_animated(ctx, state.ui_settings.sidebar_open, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (SidebarTab::Trails, "Trails"),
                    (SidebarTab::Settings, "Settings"),
                ] {
                    let selected = state.ui_settings.active_tab == tab;
                    if ui.selectable_label(selected, label).clicked() {
                        state.ui_settings.active_tab = tab;
                    }
                }
            });
            ui.separator();

            match state.ui_settings.active_tab {
                SidebarTab::Trails => dataset_changed = trails_panel(ui, state),
                SidebarTab::Settings => settings_panel(ui, state),
            }
        });

    dataset_changed
}

/// Render the trails tab: statistics, loaded files and load errors.
fn trails_panel(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut dataset_changed = false;

    ui.heading("Trails");
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Trails:");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(format!("{}", state.stats.trail_count)).strong());
        });
    });
    ui.horizontal(|ui| {
        ui.label("Mean Rating:");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(state.stats.format_rating()).strong());
        });
    });
    ui.horizontal(|ui| {
        ui.label("Total Length:");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(state.stats.format_distance()).strong());
        });
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("📂 Load Trail Data...").clicked() {
            state.loader.show_picker = true;
        }
        if ui.button("🗑 Clear All").clicked() {
            state.clear_datasets();
            dataset_changed = true;
        }
    });

    if !state.loader.loaded_files.is_empty() {
        ui.separator();
        ui.label(
            RichText::new(format!("✓ Loaded ({} files)", state.loader.loaded_files.len()))
                .strong()
                .color(Color32::GREEN),
        );
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .max_height(150.0)
            .show(ui, |ui| {
                for (file, count) in &state.loader.loaded_files {
                    ui.label(
                        RichText::new(format!(
                            "• {} ({} trails)",
                            file.file_name().unwrap_or_default().to_string_lossy(),
                            count
                        ))
                        .small(),
                    );
                }
            });
    }

    if !state.loader.errors.is_empty() {
        ui.separator();
        ui.label(
            RichText::new(format!("⚠ Errors ({} files)", state.loader.errors.len()))
                .strong()
                .color(Color32::RED),
        );
        ui.add_space(4.0);

        for (file, error) in &state.loader.errors {
            ui.label(
                RichText::new(format!(
                    "• {}: {}",
                    file.file_name().unwrap_or_default().to_string_lossy(),
                    error
                ))
                .small()
                .color(Color32::RED),
            );
        }

        ui.add_space(4.0);
        if ui.button("Clear Errors").clicked() {
            state.loader.errors.clear();
        }
    }

    dataset_changed
}

/// Render the settings tab
fn settings_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    ui.collapsing("Map Tiles", |ui| {
        ui.label("Select Tile Provider");
        ui.add_space(4.0);

        let custom_available = state.ui_settings.custom_style_available;
        for provider in TilesProvider::all(custom_available) {
            let selected = state.ui_settings.tiles_provider == *provider;
            if ui.selectable_label(selected, provider.name()).clicked() {
                state.ui_settings.tiles_provider = *provider;
            }
        }

        ui.add_space(4.0);
        ui.label(
            RichText::new(state.ui_settings.tiles_provider.attribution())
                .small()
                .italics(),
        );
    });

    ui.collapsing("Clustering", |ui| {
        let params = state.source.params();
        ui.label(format!("Radius: {} px", params.radius_px));
        ui.label(format!("Clustered up to zoom {}", params.max_zoom));
        ui.add_space(4.0);
        ui.label(
            RichText::new("Set via --cluster-radius / --cluster-max-zoom")
                .small()
                .weak(),
        );
    });
}

/// Toggle button for the sidebar, drawn over the map.
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let label = if state.ui_settings.sidebar_open {
        "◀"
    } else {
        "☰"
    };
    let rect = egui::Rect::from_min_size(
        ui.max_rect().min + egui::vec2(8.0, 8.0),
        egui::vec2(28.0, 28.0),
    );
    if ui.put(rect, egui::Button::new(label)).clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }
}

/// Render a simple file picker (native only)
#[cfg(not(target_arch = "wasm32"))]
pub fn show_file_picker(state: &mut AppState) -> bool {
    if !state.loader.show_picker {
        return false;
    }
    state.loader.show_picker = false;

    if let Some(path) = rfd::FileDialog::new()
        .add_filter("JSON Files", &["json"])
        .add_filter("All Files", &["*"])
        .pick_file()
    {
        return state.add_dataset(path);
    }
    false
}

/// Render the help overlay
pub fn help_overlay(ctx: &egui::Context, show: &mut bool) {
    egui::Window::new("Help")
        .open(show)
        .collapsible(false)
        .resizable(true)
        .default_width(400.0)
        .show(ctx, |ui| {
            ui.heading("Trail Map Viewer");
            ui.separator();

            ui.label("An interactive map of hiking trails with clustered markers.");
            ui.add_space(8.0);

            ui.label(RichText::new("🖱 Map Controls").strong());
            ui.label("• Left drag: Pan the map");
            ui.label("• Mouse wheel: Zoom in/out");
            ui.label("• Click a cluster: Zoom in until it splits");
            ui.label("• Click a trail marker: Show trail details");
            ui.add_space(8.0);

            ui.label(RichText::new("📂 Loading Trails").strong());
            ui.label("• Click 'Load Trail Data' to add a dataset");
            ui.label("• Multiple files can be loaded");
            ui.add_space(8.0);

            ui.separator();
            ui.label(RichText::new("Press F1 to toggle this help").small().italics());
        });
}
