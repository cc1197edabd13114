//! Per-hand feedback markers drawn next to the cloud.
//!
//! The left marker turns green and pulses while pinching; the right marker
//! grows and shifts from blue to pink as the hand opens.

use glam::Vec3;
use hand_gesture::{HandState, TwoHandSnapshot};

use crate::color::Rgb;

/// Markers sit this far behind the hand position.
const DEPTH_OFFSET: f32 = 2.0;

const IDLE_COLOR:  Rgb = Rgb::from_hex(0x4a9eff);
const PINCH_COLOR: Rgb = Rgb::from_hex(0x00ffaa);
const OPEN_COLOR:  Rgb = Rgb::from_hex(0xff4a9e);

/// Oscillator rate shared by every marker animation, per millisecond.
const RATE: f64 = 0.003;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandMarker {
    pub position: Vec3,
    pub scale:    f32,
    pub color:    Rgb,
    /// 0 when the hand is not detected.
    pub opacity:  f32,
}

impl HandMarker {
    pub fn hidden() -> Self {
        HandMarker { position: Vec3::ZERO, scale: 1.0, color: IDLE_COLOR, opacity: 0.0 }
    }

    pub fn is_visible(&self) -> bool { self.opacity > 0.0 }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandIndicators {
    pub left:  HandMarker,
    pub right: HandMarker,
}

impl HandIndicators {
    pub fn compute(snap: &TwoHandSnapshot, elapsed_ms: f64) -> Self {
        HandIndicators {
            left:  left_marker(&snap.left, elapsed_ms),
            right: right_marker(&snap.right, elapsed_ms),
        }
    }
}

fn breathing_opacity(phase: f64) -> f32 {
    0.3 + phase.sin() as f32 * 0.15
}

fn anchored(hand: &HandState) -> Vec3 {
    hand.position - Vec3::Z * DEPTH_OFFSET
}

pub fn left_marker(hand: &HandState, elapsed_ms: f64) -> HandMarker {
    if !hand.detected { return HandMarker::hidden(); }
    let phase = elapsed_ms * RATE;
    let opacity = breathing_opacity(phase);

    if hand.pinching {
        HandMarker {
            position: anchored(hand),
            scale:    1.2 + (phase * 3.0).sin() as f32 * 0.2,
            color:    PINCH_COLOR,
            opacity:  opacity + 0.4,
        }
    } else {
        HandMarker { position: anchored(hand), scale: 1.0, color: IDLE_COLOR, opacity }
    }
}

pub fn right_marker(hand: &HandState, elapsed_ms: f64) -> HandMarker {
    if !hand.detected { return HandMarker::hidden(); }
    HandMarker {
        position: anchored(hand),
        scale:    0.4 + hand.openness * 0.5,
        color:    IDLE_COLOR.lerp(OPEN_COLOR, hand.openness),
        opacity:  breathing_opacity(elapsed_ms * RATE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(openness: f32, pinching: bool) -> HandState {
        HandState {
            detected: true,
            openness,
            pinching,
            position: Vec3::new(0.5, -0.2, 0.1),
            ..HandState::default()
        }
    }

    #[test]
    fn undetected_hands_are_invisible() {
        let ind = HandIndicators::compute(&TwoHandSnapshot::idle(true), 100.0);
        assert!(!ind.left.is_visible());
        assert!(!ind.right.is_visible());
    }

    #[test]
    fn markers_sit_behind_the_hand() {
        let m = right_marker(&detected(0.0, false), 0.0);
        assert!(m.position.abs_diff_eq(Vec3::new(0.5, -0.2, -1.9), 1e-6));
        assert!((m.opacity - 0.3).abs() < 1e-6);
    }

    #[test]
    fn pinching_left_hand_glows_green() {
        let idle = left_marker(&detected(0.5, false), 0.0);
        let pinch = left_marker(&detected(0.5, true), 0.0);
        assert_eq!(idle.color, IDLE_COLOR);
        assert_eq!(idle.scale, 1.0);
        assert_eq!(pinch.color, PINCH_COLOR);
        assert!((pinch.opacity - idle.opacity - 0.4).abs() < 1e-6);
        assert!((1.0..=1.4).contains(&pinch.scale));
    }

    #[test]
    fn right_marker_tracks_openness() {
        let closed = right_marker(&detected(0.0, false), 0.0);
        let open   = right_marker(&detected(1.0, false), 0.0);
        assert_eq!(closed.color, IDLE_COLOR);
        assert_eq!(open.color, OPEN_COLOR);
        assert!((closed.scale - 0.4).abs() < 1e-6);
        assert!((open.scale - 0.9).abs() < 1e-6);
    }
}
