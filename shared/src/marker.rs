use serde::Serialize;

use crate::city::{CityId, CityRecord};
use crate::colors::{Rgb, WHITE};
use crate::danger::DangerClass;

/// Markers never shrink below this, so a zero score stays hoverable.
pub const MIN_MARKER_RADIUS: f64 = 2.0;

/// How a marker's on-screen radius (CSS pixels) is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MarkerSizing {
    Fixed { radius: f64 },
    /// `score / divisor` pixels.
    Proportional { divisor: f64 },
}

impl MarkerSizing {
    pub fn radius(self, danger_score: u8) -> f64 {
        let raw = match self {
            Self::Fixed { radius } => radius,
            Self::Proportional { divisor } if divisor > 0.0 => danger_score as f64 / divisor,
            Self::Proportional { .. } => MIN_MARKER_RADIUS,
        };
        raw.max(MIN_MARKER_RADIUS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerOutline {
    White,
    /// Lighter shade of the class color.
    ClassTint,
}

/// Per-screen marker look, normal and hovered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerAppearance {
    pub sizing: MarkerSizing,
    pub outline: MarkerOutline,
    pub fill_opacity: f64,
    pub stroke_width: f64,
    pub hover_fill_opacity: f64,
    pub hover_stroke_width: f64,
}

impl MarkerAppearance {
    /// Large uniform dots with a white ring.
    pub const MONITOR: Self = Self {
        sizing: MarkerSizing::Fixed { radius: 15.0 },
        outline: MarkerOutline::White,
        fill_opacity: 0.8,
        stroke_width: 2.0,
        hover_fill_opacity: 0.8,
        hover_stroke_width: 2.0,
    };

    /// Score-sized dots that brighten and thicken on hover.
    pub const REGIONS: Self = Self {
        sizing: MarkerSizing::Proportional { divisor: 5.0 },
        outline: MarkerOutline::ClassTint,
        fill_opacity: 0.6,
        stroke_width: 2.0,
        hover_fill_opacity: 0.9,
        hover_stroke_width: 4.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub fill_rgb: Rgb,
    pub fill_opacity: f64,
    pub stroke_rgb: Rgb,
    pub stroke_width: f64,
}

/// One marker to draw: where, how big, which class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpec {
    pub city_id: CityId,
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
    pub class: DangerClass,
}

impl MarkerSpec {
    pub fn style(&self, appearance: &MarkerAppearance, hovered: bool) -> MarkerStyle {
        let stroke_rgb = match appearance.outline {
            MarkerOutline::White => WHITE,
            MarkerOutline::ClassTint => self.class.stroke_rgb(),
        };
        let (fill_opacity, stroke_width) = if hovered {
            (appearance.hover_fill_opacity, appearance.hover_stroke_width)
        } else {
            (appearance.fill_opacity, appearance.stroke_width)
        };
        MarkerStyle {
            fill_rgb: self.class.accent_rgb(),
            fill_opacity,
            stroke_rgb,
            stroke_width,
        }
    }
}

/// One marker per record, in dataset order (later records draw on top).
pub fn layout_markers(cities: &[CityRecord], appearance: &MarkerAppearance) -> Vec<MarkerSpec> {
    cities
        .iter()
        .map(|city| MarkerSpec {
            city_id: city.id,
            lat: city.lat,
            lng: city.lng,
            radius: appearance.sizing.radius(city.danger_score),
            class: city.danger_class(),
        })
        .collect()
}
