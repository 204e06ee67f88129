#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use trail_map_viewer::TrailMapViewerApp;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // Setup logging
    tracing_subscriber::fmt::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Trail Map Viewer"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "Trail Map Viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(TrailMapViewerApp::new(cc)))),
    );
}
