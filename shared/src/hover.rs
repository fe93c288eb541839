use crate::city::{CityId, CityRecord};

/// Which city, if any, is under the pointer.
///
/// Two states with identity-guarded exit: `leave` only clears the selection
/// when it names the active city, so a late leave for a marker the pointer
/// already moved off of never hides the card for the marker it moved onto.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HoverSelection {
    #[default]
    None,
    Active(CityRecord),
}

/// Pointer crossing a marker (or a list row standing in for one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPointerEvent {
    Enter(CityId),
    Leave(CityId),
}

impl HoverSelection {
    pub fn current(&self) -> Option<&CityRecord> {
        match self {
            Self::None => None,
            Self::Active(city) => Some(city),
        }
    }

    pub fn active_id(&self) -> Option<CityId> {
        self.current().map(|city| city.id)
    }

    pub fn is_active(&self, id: CityId) -> bool {
        self.active_id() == Some(id)
    }

    /// Make `city` the active selection. Returns whether the state changed.
    pub fn enter(&mut self, city: &CityRecord) -> bool {
        if self.current() == Some(city) {
            return false;
        }
        *self = Self::Active(city.clone());
        true
    }

    /// Clear the selection if `city` is the active one. Returns whether the state changed.
    pub fn leave(&mut self, city: &CityRecord) -> bool {
        self.leave_id(city.id)
    }

    pub fn leave_id(&mut self, id: CityId) -> bool {
        if !self.is_active(id) {
            return false;
        }
        *self = Self::None;
        true
    }

    /// Unconditional reset.
    pub fn clear(&mut self) -> bool {
        if matches!(self, Self::None) {
            return false;
        }
        *self = Self::None;
        true
    }

    /// Apply a pointer event, resolving ids against `cities`. Unknown ids are ignored.
    pub fn apply(&mut self, event: MarkerPointerEvent, cities: &[CityRecord]) -> bool {
        match event {
            MarkerPointerEvent::Enter(id) => match cities.iter().find(|city| city.id == id) {
                Some(city) => self.enter(city),
                None => false,
            },
            MarkerPointerEvent::Leave(id) => self.leave_id(id),
        }
    }
}

/// Events implied by a hit-test result moving from `previous` to `next`:
/// leave the old marker, then enter the new one.
pub fn pointer_transition(
    previous: Option<CityId>,
    next: Option<CityId>,
) -> Vec<MarkerPointerEvent> {
    if previous == next {
        return Vec::new();
    }
    let mut events = Vec::with_capacity(2);
    if let Some(id) = previous {
        events.push(MarkerPointerEvent::Leave(id));
    }
    if let Some(id) = next {
        events.push(MarkerPointerEvent::Enter(id));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunis() -> CityRecord {
        CityRecord::new(1, "Tunis", 36.8065, 10.1815, 88)
    }

    fn sousse() -> CityRecord {
        CityRecord::new(2, "Sousse", 35.8256, 10.6369, 45)
    }

    #[test]
    fn starts_with_no_selection() {
        let selection = HoverSelection::default();
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn enter_selects_city() {
        let mut selection = HoverSelection::default();
        assert!(selection.enter(&tunis()));
        assert_eq!(selection.current(), Some(&tunis()));
    }

    #[test]
    fn repeated_enter_is_idempotent() {
        let mut selection = HoverSelection::default();
        selection.enter(&tunis());
        assert!(!selection.enter(&tunis()));
        assert_eq!(selection.active_id(), Some(1));
    }

    #[test]
    fn leave_of_active_city_clears() {
        let mut selection = HoverSelection::default();
        selection.enter(&tunis());
        assert!(selection.leave(&tunis()));
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn stale_leave_keeps_newer_selection() {
        let mut selection = HoverSelection::default();
        selection.enter(&tunis());
        selection.enter(&sousse());
        assert!(!selection.leave(&tunis()));
        assert_eq!(selection.current(), Some(&sousse()));
    }

    #[test]
    fn leave_without_selection_is_noop() {
        let mut selection = HoverSelection::default();
        assert!(!selection.leave(&tunis()));
        assert!(!selection.clear());
    }

    #[test]
    fn clear_is_unconditional() {
        let mut selection = HoverSelection::default();
        selection.enter(&sousse());
        assert!(selection.clear());
        assert_eq!(selection, HoverSelection::None);
    }

    #[test]
    fn apply_resolves_ids_and_ignores_unknown() {
        let cities = vec![tunis(), sousse()];
        let mut selection = HoverSelection::default();
        assert!(selection.apply(MarkerPointerEvent::Enter(2), &cities));
        assert_eq!(selection.active_id(), Some(2));
        assert!(!selection.apply(MarkerPointerEvent::Enter(99), &cities));
        assert_eq!(selection.active_id(), Some(2));
        assert!(!selection.apply(MarkerPointerEvent::Leave(1), &cities));
        assert!(selection.apply(MarkerPointerEvent::Leave(2), &cities));
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn out_of_order_delivery_keeps_last_enter() {
        let cities = vec![tunis(), sousse()];
        let mut selection = HoverSelection::default();
        for event in [
            MarkerPointerEvent::Enter(1),
            MarkerPointerEvent::Enter(2),
            MarkerPointerEvent::Leave(1),
        ] {
            selection.apply(event, &cities);
        }
        assert_eq!(selection.active_id(), Some(2));
    }

    #[test]
    fn transition_emits_leave_then_enter() {
        assert!(pointer_transition(Some(1), Some(1)).is_empty());
        assert!(pointer_transition(None, None).is_empty());
        assert_eq!(
            pointer_transition(None, Some(3)),
            vec![MarkerPointerEvent::Enter(3)]
        );
        assert_eq!(
            pointer_transition(Some(3), None),
            vec![MarkerPointerEvent::Leave(3)]
        );
        assert_eq!(
            pointer_transition(Some(1), Some(2)),
            vec![MarkerPointerEvent::Leave(1), MarkerPointerEvent::Enter(2)]
        );
    }
}
