//! Application state management
//!
//! Owns the loaded trail records, the immutable trail source derived from
//! them, dataset-loading bookkeeping, and the runtime UI settings.

use crate::app::settings::Settings;
use crate::data::{self, TrailRecord};
use crate::map::{ClusterParams, TrailSource, tiles::TilesProvider};
use std::path::PathBuf;
use std::sync::Arc;

/// Main application state
pub struct AppState {
    /// All loaded trail records, in load order
    pub records: Vec<TrailRecord>,

    /// Clustered source built from the records; replaced wholesale when
    /// the dataset changes
    pub source: Arc<TrailSource>,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Dataset loading state
    pub loader: DatasetLoader,

    /// Statistics about loaded data
    pub stats: Stats,

    cluster_params: ClusterParams,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,

    /// Whether a custom style source was configured
    pub custom_style_available: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Trails,
            custom_style_available: false,
        }
    }
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarTab {
    Trails,
    Settings,
}

/// Dataset loading state and operations
#[derive(Default)]
pub struct DatasetLoader {
    /// Successfully loaded files with their record counts
    pub loaded_files: Vec<(PathBuf, usize)>,

    /// Load errors
    pub errors: Vec<(PathBuf, String)>,

    /// Show file picker dialog
    pub show_picker: bool,
}

/// Statistics about loaded data
#[derive(Default)]
pub struct Stats {
    /// Total number of trails
    pub trail_count: usize,

    /// Mean rating across trails that have one
    pub mean_rating: Option<f64>,

    /// Total trail length in miles, over trails that carry a distance
    pub total_distance_miles: f64,
}

impl AppState {
    /// Create new application state from CLI settings, loading all
    /// requested dataset files in parallel.
    pub fn new(settings: &Settings, dataset_paths: Vec<PathBuf>) -> Self {
        let cluster_params = ClusterParams {
            max_zoom: settings.cluster_max_zoom,
            radius_px: settings.cluster_radius,
        };

        let mut state = Self {
            records: Vec::new(),
            source: Arc::new(TrailSource::new(&[], cluster_params)),
            ui_settings: UiSettings::default(),
            loader: DatasetLoader::default(),
            stats: Stats::default(),
            cluster_params,
        };

        for (path, result) in data::load_records_parallel(&dataset_paths) {
            match result {
                Ok(records) => {
                    tracing::info!(path = %path.display(), trails = records.len(), "loaded dataset");
                    state.loader.loaded_files.push((path.clone(), records.len()));
                    state.records.extend(records);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load dataset");
                    state.loader.errors.push((path.clone(), e.to_string()));
                }
            }
        }

        state.rebuild_source();
        state
    }

    /// Load one more dataset file and rebuild the source.
    ///
    /// Returns whether the source changed, so the caller can drop state
    /// derived from the previous dataset generation.
    pub fn add_dataset(&mut self, path: PathBuf) -> bool {
        if self.loader.loaded_files.iter().any(|(p, _)| p == &path) {
            return false;
        }

        match data::load_records(&path) {
            Ok(records) => {
                tracing::info!(path = %path.display(), trails = records.len(), "loaded dataset");
                self.loader.loaded_files.push((path, records.len()));
                self.records.extend(records);
                self.rebuild_source();
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load dataset");
                self.loader.errors.push((path, e.to_string()));
                false
            }
        }
    }

    /// Drop all loaded trails.
    pub fn clear_datasets(&mut self) {
        self.records.clear();
        self.loader.loaded_files.clear();
        self.loader.errors.clear();
        self.rebuild_source();
    }

    fn rebuild_source(&mut self) {
        profiling::scope!("AppState::rebuild_source");
        self.source = Arc::new(TrailSource::new(&self.records, self.cluster_params));
        self.stats = Stats::from_records(&self.records);
    }
}

impl Stats {
    pub fn from_records(records: &[TrailRecord]) -> Self {
        let ratings: Vec<f64> = records.iter().filter_map(|record| record.rating).collect();
        let mean_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        Self {
            trail_count: records.len(),
            mean_rating,
            total_distance_miles: records.iter().filter_map(|record| record.distance).sum(),
        }
    }

    /// Format total length as a human-readable string
    pub fn format_distance(&self) -> String {
        if self.total_distance_miles < 100.0 {
            format!("{:.1} mi", self.total_distance_miles)
        } else {
            format!("{:.0} mi", self.total_distance_miles)
        }
    }

    pub fn format_rating(&self) -> String {
        match self.mean_rating {
            Some(rating) => format!("{rating:.1} / 5"),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rating: Option<f64>, distance: Option<f64>) -> TrailRecord {
        TrailRecord {
            rating,
            distance,
            ..TrailRecord::default()
        }
    }

    #[test]
    fn stats_aggregate_over_present_fields_only() {
        let stats = Stats::from_records(&[
            record(Some(4.0), Some(3.0)),
            record(None, Some(2.5)),
            record(Some(5.0), None),
        ]);

        assert_eq!(stats.trail_count, 3);
        assert_eq!(stats.mean_rating, Some(4.5));
        assert_eq!(stats.total_distance_miles, 5.5);
    }

    #[test]
    fn stats_of_empty_dataset() {
        let stats = Stats::from_records(&[]);
        assert_eq!(stats.trail_count, 0);
        assert_eq!(stats.mean_rating, None);
        assert_eq!(stats.format_rating(), "-");
    }
}
