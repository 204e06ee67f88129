//! Base map tile sources
//!
//! Built-in providers plus an optional custom source configured from an
//! opaque style URL template and access credential. Both configuration
//! values are consumed here only; nothing else in the application
//! interprets them.

use walkers::TileId;
use walkers::sources::{Attribution, TileSource};

/// Available base map providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
    /// The source configured via `--map-style` / `TRAIL_MAP_STYLE`
    CustomStyle,
}

impl TilesProvider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
            Self::CustomStyle => "Custom style",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
            Self::CustomStyle => "© Configured tile provider",
        }
    }

    /// Providers to offer in the settings panel.
    pub fn all(custom_available: bool) -> &'static [Self] {
        if custom_available {
            &[Self::OpenStreetMap, Self::OpenTopoMap, Self::CustomStyle]
        } else {
            &[Self::OpenStreetMap, Self::OpenTopoMap]
        }
    }
}

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

/// Tile source built from a configured style template, e.g.
/// `https://tiles.example.com/styles/outdoor/{z}/{x}/{y}.png`. The access
/// credential, when set, is appended as an `access_token` query parameter.
pub struct StyleTileSource {
    template: String,
    access_token: Option<String>,
}

impl StyleTileSource {
    pub fn new(template: String, access_token: Option<String>) -> Self {
        Self {
            template,
            access_token,
        }
    }
}

impl TileSource for StyleTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        let url = self
            .template
            .replace("{z}", &tile_id.zoom.to_string())
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string());
        match &self.access_token {
            Some(token) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{url}{separator}access_token={token}")
            }
            None => url,
        }
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© Configured tile provider",
            url: "",
            logo_light: None,
            logo_dark: None,
        }
    }
}
