use serde::{Deserialize, Deserializer, Serialize};

use crate::danger::{DangerClass, classify};

pub type CityId = u32;

pub const MAX_DANGER_SCORE: u8 = 100;

/// One monitored city. Both screen schemas deserialize into this type:
/// `danger` and `dangerScore` name the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    pub id: CityId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(alias = "danger", deserialize_with = "deserialize_danger_score")]
    pub danger_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<i32>,
}

impl CityRecord {
    /// Build a record; the score is clamped into `0..=100`.
    pub fn new(
        id: CityId,
        name: impl Into<String>,
        lat: f64,
        lng: f64,
        danger_score: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            lat,
            lng,
            danger_score: clamp_danger_score(danger_score as i64),
            risk: None,
            temp: None,
        }
    }

    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk = Some(risk.into());
        self
    }

    pub fn with_temp(mut self, celsius: i32) -> Self {
        self.temp = Some(celsius);
        self
    }

    pub fn danger_class(&self) -> DangerClass {
        classify(self.danger_score)
    }

    pub fn has_valid_coordinate(&self) -> bool {
        is_valid_coordinate(self.lat, self.lng)
    }
}

pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

fn clamp_danger_score(raw: i64) -> u8 {
    raw.clamp(0, MAX_DANGER_SCORE as i64) as u8
}

fn deserialize_danger_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("danger score must be a finite number"));
    }
    Ok(clamp_danger_score(raw.round() as i64))
}
