use weatherguard_shared::{CityId, Dataset, MarkerSpec, layout_markers};

use crate::viewport::Viewport;

/// Extra pixels around each circle that still count as a hit.
const HIT_SLOP_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenMarker {
    city_id: CityId,
    x: f64,
    y: f64,
    radius: f64,
}

/// Markers projected to screen space for pointer hit-testing.
/// Rebuilt per pointer event; marker counts are small.
#[derive(Debug, Default)]
pub struct HitIndex {
    markers: Vec<ScreenMarker>,
}

impl HitIndex {
    /// Index every marker of `dataset` at the current view.
    pub fn for_dataset(dataset: &Dataset, vp: &Viewport) -> Self {
        Self::build(&layout_markers(&dataset.cities, &dataset.marker), vp)
    }

    pub fn build(markers: &[MarkerSpec], vp: &Viewport) -> Self {
        let markers = markers
            .iter()
            .map(|marker| {
                let (x, y) = vp.latlng_to_screen(marker.lat, marker.lng);
                ScreenMarker {
                    city_id: marker.city_id,
                    x,
                    y,
                    radius: marker.radius,
                }
            })
            .collect();
        Self { markers }
    }

    /// The marker under a screen point. Later markers are drawn on top, so
    /// they win where circles overlap.
    pub fn find_at(&self, sx: f64, sy: f64) -> Option<CityId> {
        self.markers
            .iter()
            .rev()
            .find(|m| {
                let dx = sx - m.x;
                let dy = sy - m.y;
                let reach = m.radius + HIT_SLOP_PX;
                dx * dx + dy * dy <= reach * reach
            })
            .map(|m| m.city_id)
    }

    /// Screen center and radius of a marker.
    pub fn circle_of(&self, city_id: CityId) -> Option<(f64, f64, f64)> {
        self.markers
            .iter()
            .find(|m| m.city_id == city_id)
            .map(|m| (m.x, m.y, m.radius))
    }
}

#[cfg(test)]
mod tests {
    use weatherguard_shared::DangerClass;
    use weatherguard_shared::dataset::{MONITOR, REGIONS};

    use super::*;

    fn marker(city_id: CityId, lat: f64, lng: f64, radius: f64) -> MarkerSpec {
        MarkerSpec {
            city_id,
            lat,
            lng,
            radius,
            class: DangerClass::Normal,
        }
    }

    fn view() -> Viewport {
        let mut vp = Viewport::new((34.5, 9.5), 7.0);
        vp.set_size(1000.0, 800.0);
        vp
    }

    #[test]
    fn hit_inside_radius_misses_outside() {
        let vp = view();
        let index = HitIndex::build(&[marker(1, 34.5, 9.5, 10.0)], &vp);
        assert_eq!(index.find_at(500.0, 400.0), Some(1));
        assert_eq!(index.find_at(508.0, 405.0), Some(1));
        assert_eq!(index.find_at(500.0, 412.0), None);
    }

    #[test]
    fn topmost_marker_wins_on_overlap() {
        let vp = view();
        let index = HitIndex::build(
            &[marker(1, 34.5, 9.5, 15.0), marker(2, 34.5, 9.5, 15.0)],
            &vp,
        );
        assert_eq!(index.find_at(500.0, 400.0), Some(2));
    }

    #[test]
    fn regions_markers_are_hit_at_their_coordinates() {
        let vp = view();
        let index = HitIndex::for_dataset(&REGIONS, &vp);
        for city in &REGIONS.cities {
            let (x, y, radius) = index.circle_of(city.id).expect("marker circle");
            assert_eq!(radius, city.danger_score as f64 / 5.0);
            assert_eq!(index.find_at(x, y), Some(city.id));
        }
    }

    #[test]
    fn empty_index_never_hits() {
        let index = HitIndex::default();
        assert_eq!(index.find_at(0.0, 0.0), None);
        assert_eq!(index.circle_of(1), None);
    }

    #[test]
    fn zooming_under_a_still_pointer_moves_the_marker_away() {
        let mut vp = view();
        let index = HitIndex::for_dataset(&MONITOR, &vp);
        let (tx, ty, _) = index.circle_of(1).expect("Tunis marker");
        let (px, py) = (tx + 12.0, ty);
        assert_eq!(index.find_at(px, py), Some(1));

        vp.zoom_at(-400.0, px, py);
        assert_eq!(HitIndex::for_dataset(&MONITOR, &vp).find_at(px, py), None);
    }
}
