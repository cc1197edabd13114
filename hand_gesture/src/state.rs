//! Per-hand state and the two-hand snapshot.

use glam::Vec3;

use crate::classify::Gesture;
use crate::landmarks::HandLandmarks;

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse a provider label (`"Left"` / `"Right"`, any case).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Some(Handedness::Left),
            "right" => Some(Handedness::Right),
            _       => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Handedness::Left  => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left  => "left",
            Handedness::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandState
// ════════════════════════════════════════════════════════════════════════════

/// Everything known about one hand in one frame.
///
/// The default value is the "not detected" state: openness 0, every flag
/// false, position and rotation zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandState {
    pub detected:   bool,
    pub handedness: Option<Handedness>,
    /// 0.0 (fist) – 1.0 (fully spread).
    pub openness:   f32,
    pub is_open:    bool,
    /// Wrist position in centred scene coordinates.
    pub position:   Vec3,
    /// `(pitch, yaw, roll)` radians.
    pub rotation:   Vec3,
    pub pinching:   bool,
    pub gesture:    Gesture,
    /// Raw landmarks the state was classified from.  Retained for display
    /// only; not a stable identity across frames.
    pub landmarks:  Option<HandLandmarks>,
}

impl HandState {
    pub fn not_detected() -> Self { HandState::default() }

    /// Openness as a whole percentage, 0 when not detected.
    pub fn openness_percent(&self) -> u8 {
        if !self.detected { return 0; }
        (self.openness.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TwoHandSnapshot
// ════════════════════════════════════════════════════════════════════════════

/// Left and right hand for one provider frame.
///
/// Rebuilt from scratch every frame; nothing is merged across frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TwoHandSnapshot {
    pub left:        HandState,
    pub right:       HandState,
    /// True once the provider has either started or definitively failed.
    pub initialized: bool,
}

impl TwoHandSnapshot {
    /// Both hands undetected.
    pub fn idle(initialized: bool) -> Self {
        TwoHandSnapshot { initialized, ..TwoHandSnapshot::default() }
    }

    pub fn hand(&self, which: Handedness) -> &HandState {
        match which {
            Handedness::Left  => &self.left,
            Handedness::Right => &self.right,
        }
    }

    pub fn hand_mut(&mut self, which: Handedness) -> &mut HandState {
        match which {
            Handedness::Left  => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    pub fn both_detected(&self) -> bool {
        self.left.detected && self.right.detected
    }

    /// Apply the per-hand enable switches: a disabled hand keeps its other
    /// fields but reports `detected = false`.
    pub fn with_enabled(mut self, left_enabled: bool, right_enabled: bool) -> Self {
        if !left_enabled  { self.left.detected  = false; }
        if !right_enabled { self.right.detected = false; }
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hand_is_not_detected() {
        let h = HandState::not_detected();
        assert!(!h.detected);
        assert!(!h.pinching);
        assert!(!h.is_open);
        assert_eq!(h.openness, 0.0);
        assert_eq!(h.position, Vec3::ZERO);
        assert_eq!(h.rotation, Vec3::ZERO);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(Handedness::from_label("Left"),   Some(Handedness::Left));
        assert_eq!(Handedness::from_label(" RIGHT"), Some(Handedness::Right));
        assert_eq!(Handedness::from_label("both"),   None);
        assert_eq!(Handedness::Left.opposite(), Handedness::Right);
    }

    #[test]
    fn disabling_a_hand_clears_only_its_detected_flag() {
        let mut snap = TwoHandSnapshot::idle(true);
        snap.left.detected  = true;
        snap.left.openness  = 0.7;
        snap.right.detected = true;

        let filtered = snap.clone().with_enabled(false, true);
        assert!(!filtered.left.detected);
        assert_eq!(filtered.left.openness, 0.7);
        assert!(filtered.right.detected);

        let untouched = snap.clone().with_enabled(true, true);
        assert_eq!(untouched, snap);
    }

    #[test]
    fn openness_percent_rounds() {
        let h = HandState { detected: true, openness: 0.456, ..HandState::default() };
        assert_eq!(h.openness_percent(), 46);
        let gone = HandState { detected: false, openness: 0.9, ..HandState::default() };
        assert_eq!(gone.openness_percent(), 0);
    }
}
