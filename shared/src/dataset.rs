use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::city::{CityId, CityRecord};
use crate::colors::{BLUE_500, RED_500, Rgb};
use crate::geo::LatLngBounds;
use crate::marker::MarkerAppearance;
use crate::tile_source::TileSource;

/// The two dashboard screens. Each one is driven entirely by its [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKey {
    #[default]
    Monitor,
    Regions,
}

impl DatasetKey {
    pub const ALL: [Self; 2] = [Self::Monitor, Self::Regions];

    pub fn dataset(self) -> &'static Dataset {
        match self {
            Self::Monitor => &*MONITOR,
            Self::Regions => &*REGIONS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monitor => "Satellite Monitor",
            Self::Regions => "Real-time Map",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Monitor => Self::Regions,
            Self::Regions => Self::Monitor,
        }
    }
}

/// Static copy for the detail card rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetailLabels {
    pub heading: Option<&'static str>,
    pub score: &'static str,
    pub risk: &'static str,
    pub temp: &'static str,
    pub source: &'static str,
}

/// Everything a screen needs: branding, map setup, marker look and records.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub key: DatasetKey,
    pub title: &'static str,
    pub headline: &'static str,
    pub headline_accent: &'static str,
    /// Color of the accented part of the headline.
    pub headline_accent_rgb: Rgb,
    pub status_line: &'static str,
    pub list_heading: &'static str,
    pub detail_labels: DetailLabels,
    pub source_label: Option<&'static str>,
    /// Initial map center as (lat, lng).
    pub center: (f64, f64),
    pub zoom: f64,
    pub tile_source: TileSource,
    pub marker: MarkerAppearance,
    pub cities: Vec<CityRecord>,
}

impl Dataset {
    pub fn find(&self, id: CityId) -> Option<&CityRecord> {
        self.cities.iter().find(|city| city.id == id)
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(self.cities.iter().map(|city| (city.lat, city.lng)))
    }
}

pub static MONITOR: LazyLock<Dataset> = LazyLock::new(|| Dataset {
    key: DatasetKey::Monitor,
    title: "GUARDIA-TN",
    headline: "SATELLITE",
    headline_accent: "AI MONITOR",
    headline_accent_rgb: BLUE_500,
    status_line: "FLUX DE DONN\u{c9}ES EN DIRECT",
    list_heading: "ALERTES ACTIVES",
    detail_labels: DetailLabels {
        heading: Some("ANALYSE BIOCLIMATIQUE"),
        score: "Niveau de risque",
        risk: "Risque principal",
        temp: "Temp",
        source: "Source",
    },
    source_label: None,
    center: (34.5, 9.5),
    zoom: 7.0,
    tile_source: TileSource::GOOGLE_HYBRID,
    marker: MarkerAppearance::MONITOR,
    cities: vec![
        CityRecord::new(1, "Tunis", 36.8, 10.1, 85),
        CityRecord::new(2, "Sousse", 35.8, 10.6, 35),
        CityRecord::new(3, "Kairouan", 35.6, 10.1, 65),
        CityRecord::new(4, "Tataouine", 32.9, 10.4, 95),
    ],
});

pub static REGIONS: LazyLock<Dataset> = LazyLock::new(|| Dataset {
    key: DatasetKey::Regions,
    title: "WeatherGuard TN",
    headline: "DANGER",
    headline_accent: "SUMMARY",
    headline_accent_rgb: RED_500,
    status_line: "Hover a region for details",
    list_heading: "REGIONS",
    detail_labels: DetailLabels {
        heading: None,
        score: "Danger Level:",
        risk: "Primary Risk:",
        temp: "Temp",
        source: "Source",
    },
    source_label: Some("MLflow Model"),
    center: (34.5, 9.5),
    zoom: 6.5,
    tile_source: TileSource::CARTO_DARK,
    marker: MarkerAppearance::REGIONS,
    cities: vec![
        CityRecord::new(1, "Tunis", 36.8065, 10.1815, 88)
            .with_risk("High Flood Risk")
            .with_temp(25),
        CityRecord::new(2, "Sousse", 35.8256, 10.6369, 45)
            .with_risk("Moderate Wind")
            .with_temp(28),
        CityRecord::new(3, "Tozeur", 33.9197, 8.1335, 92)
            .with_risk("Extreme Heatwave")
            .with_temp(42),
        CityRecord::new(4, "Bizerte", 37.2744, 9.8739, 15)
            .with_risk("Low Risk")
            .with_temp(22),
    ],
});
