use serde::{Deserialize, Serialize};

use crate::colors::{BLUE_400, BLUE_500, EMERALD_400, RED_400, RED_500, Rgb};

/// Scores strictly above this value are elevated.
pub const DANGER_THRESHOLD: u8 = 70;

/// Presentation class of a danger score. Every color and status label in the
/// dashboard is picked through this one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerClass {
    Normal,
    Elevated,
}

/// Classify a danger score. Total over `u8`; anything above 100 is still elevated.
pub fn classify(score: u8) -> DangerClass {
    if score > DANGER_THRESHOLD {
        DangerClass::Elevated
    } else {
        DangerClass::Normal
    }
}

impl DangerClass {
    pub fn is_elevated(self) -> bool {
        self == Self::Elevated
    }

    /// Status label shown on the detail card badge.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "STABLE",
            Self::Elevated => "CRITICAL",
        }
    }

    /// Marker fill, card accent, score text and bar color.
    pub fn accent_rgb(self) -> Rgb {
        match self {
            Self::Normal => BLUE_500,
            Self::Elevated => RED_500,
        }
    }

    /// Lighter outline drawn around markers on the regions screen.
    pub fn stroke_rgb(self) -> Rgb {
        match self {
            Self::Normal => BLUE_400,
            Self::Elevated => RED_400,
        }
    }

    /// Badge text color; the badge background is the same color at low alpha.
    pub fn badge_rgb(self) -> Rgb {
        match self {
            Self::Normal => EMERALD_400,
            Self::Elevated => RED_400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary() {
        assert_eq!(classify(70), DangerClass::Normal);
        assert_eq!(classify(71), DangerClass::Elevated);
    }

    #[test]
    fn elevated_iff_above_threshold_over_full_range() {
        for score in 0..=100u8 {
            assert_eq!(classify(score).is_elevated(), score > 70, "score {score}");
        }
    }

    #[test]
    fn out_of_range_scores_stay_elevated() {
        assert_eq!(classify(101), DangerClass::Elevated);
        assert_eq!(classify(u8::MAX), DangerClass::Elevated);
    }

    #[test]
    fn labels_and_colors_follow_class() {
        assert_eq!(classify(92).label(), "CRITICAL");
        assert_eq!(classify(45).label(), "STABLE");
        assert_eq!(classify(92).accent_rgb(), (239, 68, 68));
        assert_eq!(classify(45).accent_rgb(), (59, 130, 246));
        assert_eq!(classify(15).badge_rgb(), (52, 211, 153));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&DangerClass::Elevated).expect("serialize class");
        assert_eq!(json, "\"elevated\"");
    }
}
