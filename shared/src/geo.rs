//! Spherical Web Mercator on 256 px tiles, the projection slippy-map tile
//! servers use. World pixel coordinates grow east and south from the
//! antimeridian/north-edge corner.

use std::f64::consts::PI;

use serde::Serialize;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Side length of the whole world in pixels at `zoom`.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Latitude/longitude in degrees to world pixels at `zoom`.
pub fn project(lat: f64, lng: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = lat.to_radians().sin();
    let x = (lng + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size;
    (x, y)
}

/// World pixels at `zoom` back to latitude/longitude in degrees.
pub fn unproject(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    (lat, lng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Number of tiles along one axis at integer zoom `z`.
pub fn tiles_per_axis(z: u8) -> i64 {
    1i64 << z.min(30)
}

/// Wrap an unbounded tile column into `0..2^z`.
pub fn wrap_tile_x(x: i64, z: u8) -> u32 {
    x.rem_euclid(tiles_per_axis(z)) as u32
}

/// Tiles at integer zoom `z` overlapping the world-pixel rectangle.
///
/// Columns are returned unwrapped (they may be negative or past the edge when
/// the view crosses the antimeridian) together with the wrapped coordinate to
/// fetch; rows outside the world are dropped.
pub fn tiles_covering(
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    z: u8,
) -> Vec<(i64, TileCoord)> {
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return Vec::new();
    }
    let n = tiles_per_axis(z);
    let col_start = (min_x / TILE_SIZE).floor() as i64;
    let col_end = (max_x / TILE_SIZE).floor() as i64;
    let row_start = ((min_y / TILE_SIZE).floor() as i64).max(0);
    let row_end = ((max_y / TILE_SIZE).floor() as i64).min(n - 1);

    let mut out = Vec::new();
    for row in row_start..=row_end {
        for col in col_start..=col_end {
            out.push((
                col,
                TileCoord {
                    z,
                    x: wrap_tile_x(col, z),
                    y: row as u32,
                },
            ));
        }
    }
    out
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (lat, lng) = iter.next()?;
        let mut bounds = Self {
            south: lat,
            west: lng,
            north: lat,
            east: lng,
        };
        for (lat, lng) in iter {
            bounds.extend(lat, lng);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, lat: f64, lng: f64) {
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
        self.west = self.west.min(lng);
        self.east = self.east.max(lng);
    }
}
