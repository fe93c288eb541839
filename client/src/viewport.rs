use weatherguard_shared::geo::{self, LatLngBounds, MAX_LATITUDE, TILE_SIZE, TileCoord};

/// Slippy-map camera: which lat/lng sits at the canvas center, at what zoom,
/// on a canvas of what CSS size. All screen coordinates are CSS pixels from
/// the canvas top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 18.0;
/// Zoom levels per wheel delta unit (a 100-unit notch zooms by 0.25).
const ZOOM_SENSITIVITY: f64 = 0.0025;
const FIT_PADDING_PX: f64 = 48.0;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_lat: 34.5,
            center_lng: 9.5,
            zoom: 7.0,
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    pub fn new(center: (f64, f64), zoom: f64) -> Self {
        Self {
            center_lat: center.0.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            center_lng: wrap_lng(center.1),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..Self::default()
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn center_world(&self) -> (f64, f64) {
        geo::project(self.center_lat, self.center_lng, self.zoom)
    }

    pub fn latlng_to_screen(&self, lat: f64, lng: f64) -> (f64, f64) {
        let (cx, cy) = self.center_world();
        let (wx, wy) = geo::project(lat, lng, self.zoom);
        (wx - cx + self.width / 2.0, wy - cy + self.height / 2.0)
    }

    pub fn screen_to_latlng(&self, sx: f64, sy: f64) -> (f64, f64) {
        let (cx, cy) = self.center_world();
        geo::unproject(
            cx + sx - self.width / 2.0,
            cy + sy - self.height / 2.0,
            self.zoom,
        )
    }

    /// Move the map content by a screen-space delta (drag direction).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.center_world();
        let world = geo::world_size(self.zoom);
        let ny = (cy - dy).clamp(0.0, world);
        let (lat, lng) = geo::unproject(cx - dx, ny, self.zoom);
        self.center_lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        self.center_lng = wrap_lng(lng);
    }

    /// Wheel-style zoom toward a focus point. Positive `delta` zooms out.
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        self.zoom_to(self.zoom - delta * ZOOM_SENSITIVITY, screen_x, screen_y);
    }

    /// Set the zoom while keeping the lat/lng under the focus point fixed.
    pub fn zoom_to(&mut self, zoom: f64, screen_x: f64, screen_y: f64) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let (lat, lng) = self.screen_to_latlng(screen_x, screen_y);
        self.zoom = zoom;
        let (sx, sy) = self.latlng_to_screen(lat, lng);
        self.pan(screen_x - sx, screen_y - sy);
    }

    /// Frame `bounds` inside the canvas with a fixed padding, never past `max_zoom`.
    /// A degenerate box (single point) keeps the current zoom and only recenters.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, max_zoom: f64) {
        let (x0, y0) = geo::project(bounds.north, bounds.west, 0.0);
        let (x1, y1) = geo::project(bounds.south, bounds.east, 0.0);
        let center = geo::unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0.0);

        let span_x = (x1 - x0).abs();
        let span_y = (y1 - y0).abs();
        let avail_w = (self.width - FIT_PADDING_PX * 2.0).max(1.0);
        let avail_h = (self.height - FIT_PADDING_PX * 2.0).max(1.0);

        if span_x > 0.0 || span_y > 0.0 {
            let scale_x = if span_x > 0.0 { avail_w / span_x } else { f64::INFINITY };
            let scale_y = if span_y > 0.0 { avail_h / span_y } else { f64::INFINITY };
            let zoom = scale_x.min(scale_y).log2();
            self.zoom = zoom.clamp(MIN_ZOOM, max_zoom.clamp(MIN_ZOOM, MAX_ZOOM));
        }
        self.center_lat = center.0;
        self.center_lng = wrap_lng(center.1);
    }

    /// Integer tile zoom used to draw the current fractional zoom.
    pub fn tile_zoom(&self, max_tile_zoom: u8) -> u8 {
        (self.zoom.round() as u8).min(max_tile_zoom)
    }

    /// Tiles covering the canvas, nearest the center first.
    pub fn visible_tiles(&self, max_tile_zoom: u8) -> Vec<(i64, TileCoord)> {
        let z = self.tile_zoom(max_tile_zoom);
        let scale = self.tile_scale(z);
        let (cx, cy) = geo::project(self.center_lat, self.center_lng, z as f64);
        let half_w = self.width / 2.0 / scale;
        let half_h = self.height / 2.0 / scale;
        let mut tiles = geo::tiles_covering(cx - half_w, cy - half_h, cx + half_w, cy + half_h, z);

        let dist_sq = |col: i64, row: u32| {
            let dx = (col as f64 + 0.5) * TILE_SIZE - cx;
            let dy = (row as f64 + 0.5) * TILE_SIZE - cy;
            dx * dx + dy * dy
        };
        tiles.sort_by(|a, b| dist_sq(a.0, a.1.y).total_cmp(&dist_sq(b.0, b.1.y)));
        tiles
    }

    /// On-screen size of one tile of zoom `z` at the current fractional zoom.
    pub fn tile_scale(&self, z: u8) -> f64 {
        (self.zoom - z as f64).exp2()
    }

    /// Screen rectangle `(x, y, size)` of the tile at unwrapped column `col`.
    pub fn tile_screen_rect(&self, col: i64, tile: TileCoord) -> (f64, f64, f64) {
        let scale = self.tile_scale(tile.z);
        let size = TILE_SIZE * scale;
        let (cx, cy) = geo::project(self.center_lat, self.center_lng, tile.z as f64);
        let x = (col as f64 * TILE_SIZE - cx) * scale + self.width / 2.0;
        let y = (tile.y as f64 * TILE_SIZE - cy) * scale + self.height / 2.0;
        (x, y, size)
    }
}

/// Normalize a longitude into [-180, 180).
fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < tolerance,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn tunisia_view() -> Viewport {
        let mut vp = Viewport::new((34.5, 9.5), 7.0);
        vp.set_size(1000.0, 800.0);
        vp
    }

    #[test]
    fn center_maps_to_canvas_middle() {
        let vp = tunisia_view();
        let (sx, sy) = vp.latlng_to_screen(34.5, 9.5);
        assert_close(sx, 500.0, 1e-6);
        assert_close(sy, 400.0, 1e-6);
    }

    #[test]
    fn screen_and_latlng_round_trip() {
        let vp = tunisia_view();
        let (sx, sy) = vp.latlng_to_screen(36.8065, 10.1815);
        let (lat, lng) = vp.screen_to_latlng(sx, sy);
        assert_close(lat, 36.8065, 1e-9);
        assert_close(lng, 10.1815, 1e-9);
    }

    #[test]
    fn pan_moves_content_with_the_pointer() {
        let mut vp = tunisia_view();
        let before = vp.latlng_to_screen(36.8, 10.1);
        vp.pan(40.0, -25.0);
        let after = vp.latlng_to_screen(36.8, 10.1);
        assert_close(after.0 - before.0, 40.0, 1e-6);
        assert_close(after.1 - before.1, -25.0, 1e-6);
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = tunisia_view();
        let focus = (700.0, 250.0);
        let (lat, lng) = vp.screen_to_latlng(focus.0, focus.1);
        vp.zoom_at(-200.0, focus.0, focus.1);
        assert_close(vp.zoom, 7.5, 1e-9);
        let (sx, sy) = vp.latlng_to_screen(lat, lng);
        assert_close(sx, focus.0, 1e-6);
        assert_close(sy, focus.1, 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = tunisia_view();
        vp.zoom_to(40.0, 500.0, 400.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.zoom_at(1e9, 500.0, 400.0);
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn fit_bounds_frames_all_points() {
        let mut vp = tunisia_view();
        let bounds = LatLngBounds {
            south: 33.9197,
            west: 8.1335,
            north: 37.2744,
            east: 10.6369,
        };
        vp.fit_bounds(&bounds, 18.0);
        for (lat, lng) in [(33.9197, 8.1335), (37.2744, 10.6369)] {
            let (sx, sy) = vp.latlng_to_screen(lat, lng);
            assert!((FIT_PADDING_PX - 1e-6..=vp.width - FIT_PADDING_PX + 1e-6).contains(&sx));
            assert!((FIT_PADDING_PX - 1e-6..=vp.height - FIT_PADDING_PX + 1e-6).contains(&sy));
        }
    }

    #[test]
    fn fit_bounds_on_single_point_keeps_zoom() {
        let mut vp = tunisia_view();
        let bounds = LatLngBounds {
            south: 36.8,
            west: 10.1,
            north: 36.8,
            east: 10.1,
        };
        vp.fit_bounds(&bounds, 18.0);
        assert_eq!(vp.zoom, 7.0);
        assert_close(vp.center_lat, 36.8, 1e-9);
        assert_close(vp.center_lng, 10.1, 1e-9);
    }

    #[test]
    fn visible_tiles_start_at_center_and_cover_canvas() {
        let vp = tunisia_view();
        let tiles = vp.visible_tiles(20);
        assert!(!tiles.is_empty());
        let (col, first) = tiles[0];
        let (x, y, size) = vp.tile_screen_rect(col, first);
        assert!(x <= 500.0 && x + size >= 500.0);
        assert!(y <= 400.0 && y + size >= 400.0);
        // A 1000x800 canvas at an integer zoom needs at most 5x5 tiles.
        assert!(tiles.len() <= 25);
        assert!(tiles.iter().all(|(_, t)| t.z == 7));
    }

    #[test]
    fn fractional_zoom_scales_tiles() {
        let mut vp = tunisia_view();
        vp.zoom = 6.5;
        assert_eq!(vp.tile_zoom(20), 7);
        assert_close(vp.tile_scale(7), 0.5f64.exp2() / 2.0, 1e-12);
        assert_eq!(vp.tile_zoom(5), 5);
    }

    #[test]
    fn longitudes_wrap() {
        assert_close(wrap_lng(190.0), -170.0, 1e-9);
        assert_close(wrap_lng(-180.0), -180.0, 1e-9);
        assert_close(wrap_lng(9.5), 9.5, 1e-9);
    }
}
