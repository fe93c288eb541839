use serde::Serialize;

use crate::geo::TileCoord;

/// An XYZ raster tile endpoint.
///
/// `url_template` understands `{s}` (subdomain), `{z}`, `{x}`, `{y}` and `{r}`
/// (`@2x` on high-density displays, empty otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSource {
    pub url_template: &'static str,
    pub subdomains: &'static [&'static str],
    pub attribution: &'static str,
    pub max_zoom: u8,
}

impl TileSource {
    pub const GOOGLE_HYBRID: Self = Self {
        url_template: "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}",
        subdomains: &[],
        attribution: "\u{a9} Google Maps",
        max_zoom: 20,
    };

    pub const CARTO_DARK: Self = Self {
        url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        subdomains: &["a", "b", "c", "d"],
        attribution: "\u{a9} OpenStreetMap contributors \u{a9} CARTO",
        max_zoom: 20,
    };

    pub fn url(&self, tile: TileCoord, retina: bool) -> String {
        let subdomain = self.subdomain_for(tile);
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{r}", if retina { "@2x" } else { "" })
    }

    /// Round-robin over subdomains by tile position so neighbours spread across hosts.
    fn subdomain_for(&self, tile: TileCoord) -> &'static str {
        if self.subdomains.is_empty() {
            return "";
        }
        let idx = (tile.x as usize + tile.y as usize) % self.subdomains.len();
        self.subdomains[idx]
    }
}
