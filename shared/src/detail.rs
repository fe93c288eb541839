use crate::city::{CityId, CityRecord, MAX_DANGER_SCORE};
use crate::danger::DangerClass;
use crate::hover::HoverSelection;

/// Everything the detail card shows for one city, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub city_id: CityId,
    pub name: String,
    pub class: DangerClass,
    pub status_label: &'static str,
    pub score_text: String,
    /// Bar fill as a percentage of the track width.
    pub bar_width_pct: f64,
    pub risk: Option<String>,
    pub temp_text: Option<String>,
    pub source_label: Option<&'static str>,
}

impl DetailView {
    pub fn from_city(city: &CityRecord, source_label: Option<&'static str>) -> Self {
        let class = city.danger_class();
        Self {
            city_id: city.id,
            name: city.name.clone(),
            class,
            status_label: class.label(),
            score_text: format!("{}%", city.danger_score),
            bar_width_pct: bar_width_pct(city.danger_score),
            risk: city.risk.clone(),
            temp_text: city.temp.map(format_temp),
            source_label,
        }
    }

    /// `None` hides the card.
    pub fn render(selection: &HoverSelection, source_label: Option<&'static str>) -> Option<Self> {
        selection
            .current()
            .map(|city| Self::from_city(city, source_label))
    }

    /// CSS width value for the bar fill.
    pub fn bar_width_css(&self) -> String {
        format!("{}%", self.bar_width_pct)
    }
}

pub fn bar_width_pct(score: u8) -> f64 {
    score.min(MAX_DANGER_SCORE) as f64
}

pub fn format_temp(celsius: i32) -> String {
    format!("{celsius}°C")
}
