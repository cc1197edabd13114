//! Gesture classification from a single hand's landmarks.
//!
//! Each signal is an independent pure function over the same landmark
//! slice.  Every function fails safe: a slice that is too short or holds a
//! non-finite point yields the "not detected" value (`0.0`, `Vec3::ZERO`,
//! `false`) rather than panicking.

use glam::Vec3;

use crate::landmarks::*;
use crate::state::{HandState, Handedness};

// ════════════════════════════════════════════════════════════════════════════
// Thresholds (empirically tuned)
// ════════════════════════════════════════════════════════════════════════════

/// Thumb-tip ↔ index-tip distance below which the hand is pinching.
pub const PINCH_THRESHOLD: f32 = 0.05;

/// `openness = clamp(sum / OPENNESS_DIVISOR − OPENNESS_OFFSET, 0, 1)`.
pub const OPENNESS_DIVISOR: f32 = 2.5;
pub const OPENNESS_OFFSET:  f32 = 0.3;

/// Openness above which a hand counts as open.
pub const OPEN_THRESHOLD: f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// Gesture — discrete pose label
// ════════════════════════════════════════════════════════════════════════════

/// Discrete pose recognised on a hand, in priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    Pinch,
    ThumbsUp,
    Peace,
}

// ════════════════════════════════════════════════════════════════════════════
// Continuous signals
// ════════════════════════════════════════════════════════════════════════════

/// How extended the fingers are, 0 (fist) to 1 (fully spread).
pub fn openness(raw: &[Vec3]) -> f32 {
    match HandLandmarks::from_slice(raw) {
        Some(lm) => openness_of(&lm),
        None     => 0.0,
    }
}

pub(crate) fn openness_of(lm: &HandLandmarks) -> f32 {
    let palm = lm.wrist();
    let sum: f32 = FINGERTIPS.iter().map(|&tip| lm[tip].distance(palm)).sum();
    (sum / OPENNESS_DIVISOR - OPENNESS_OFFSET).clamp(0.0, 1.0)
}

/// Wrist position in centred scene coordinates.
///
/// x and y are doubled about the image centre (y flipped so up is
/// positive); depth is doubled and inverted so nearer is positive.
pub fn hand_position(raw: &[Vec3]) -> Vec3 {
    match HandLandmarks::from_slice(raw) {
        Some(lm) => position_of(&lm),
        None     => Vec3::ZERO,
    }
}

pub(crate) fn position_of(lm: &HandLandmarks) -> Vec3 {
    let w = lm.wrist();
    Vec3::new((w.x - 0.5) * 2.0, -(w.y - 0.5) * 2.0, w.z * -2.0)
}

/// Approximate wrist orientation `(pitch, yaw, roll)` as `(x, y, z)` radians.
///
/// Built from two hand vectors:
/// * width   = index MCP − pinky MCP → roll  = `atan2(w.y, w.x)`
/// * forward = middle MCP − wrist    → pitch = `atan2(f.y, |f.xz|)`,
///                                     yaw   = `atan2(−f.x, −f.z)`
///
/// This is a heuristic, not an Euler decomposition; the downstream scale
/// and rotation constants are tuned against exactly this formula.
pub fn wrist_rotation(raw: &[Vec3]) -> Vec3 {
    match HandLandmarks::from_slice(raw) {
        Some(lm) => rotation_of(&lm),
        None     => Vec3::ZERO,
    }
}

pub(crate) fn rotation_of(lm: &HandLandmarks) -> Vec3 {
    let width   = lm[INDEX_MCP] - lm[PINKY_MCP];
    let forward = lm[MIDDLE_MCP] - lm[WRIST];

    let roll  = width.y.atan2(width.x);
    let pitch = forward.y.atan2((forward.x * forward.x + forward.z * forward.z).sqrt());
    let yaw   = (-forward.x).atan2(-forward.z);

    Vec3::new(pitch, yaw, roll)
}

// ════════════════════════════════════════════════════════════════════════════
// Discrete gestures
// ════════════════════════════════════════════════════════════════════════════

/// Thumb tip and index tip closer than [`PINCH_THRESHOLD`].
pub fn is_pinching(raw: &[Vec3]) -> bool {
    HandLandmarks::from_slice(raw).is_some_and(|lm| pinch_of(&lm))
}

pub(crate) fn pinch_of(lm: &HandLandmarks) -> bool {
    lm[THUMB_TIP].distance(lm[INDEX_TIP]) < PINCH_THRESHOLD
}

/// Thumb raised above its IP joint with the four fingers folded below
/// their knuckles.  Image y grows downward.
pub fn is_thumbs_up(raw: &[Vec3]) -> bool {
    HandLandmarks::from_slice(raw).is_some_and(|lm| thumbs_up_of(&lm))
}

pub(crate) fn thumbs_up_of(lm: &HandLandmarks) -> bool {
    let thumb_up = lm[THUMB_TIP].y < lm[THUMB_IP].y;
    let fingers_down = lm[INDEX_TIP].y  > lm[INDEX_MCP].y
                    && lm[MIDDLE_TIP].y > lm[MIDDLE_MCP].y
                    && lm[RING_TIP].y   > lm[RING_MCP].y
                    && lm[PINKY_TIP].y  > lm[PINKY_MCP].y;
    thumb_up && fingers_down
}

/// Index and middle raised, ring and pinky folded.
pub fn is_peace_sign(raw: &[Vec3]) -> bool {
    HandLandmarks::from_slice(raw).is_some_and(|lm| peace_of(&lm))
}

pub(crate) fn peace_of(lm: &HandLandmarks) -> bool {
    lm[INDEX_TIP].y  < lm[INDEX_MCP].y
        && lm[MIDDLE_TIP].y < lm[MIDDLE_MCP].y
        && lm[RING_TIP].y   > lm[RING_MCP].y
        && lm[PINKY_TIP].y  > lm[PINKY_MCP].y
}

fn gesture_of(lm: &HandLandmarks, pinching: bool) -> Gesture {
    if pinching {
        Gesture::Pinch
    } else if thumbs_up_of(lm) {
        Gesture::ThumbsUp
    } else if peace_of(lm) {
        Gesture::Peace
    } else {
        Gesture::None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify one hand.  Returns `None` for malformed input; the caller
/// treats that hand as not detected.
pub fn classify(raw: &[Vec3], handedness: Handedness) -> Option<HandState> {
    let lm       = HandLandmarks::from_slice(raw)?;
    let openness = openness_of(&lm);
    let pinching = pinch_of(&lm);
    Some(HandState {
        detected:   true,
        handedness: Some(handedness),
        openness,
        is_open:    openness > OPEN_THRESHOLD,
        position:   position_of(&lm),
        rotation:   rotation_of(&lm),
        pinching,
        gesture:    gesture_of(&lm, pinching),
        landmarks:  Some(lm),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    /// All 21 points at the same spot.
    fn collapsed(at: Vec3) -> Vec<Vec3> { vec![at; LANDMARK_COUNT] }

    /// Fingertips placed `reach` away from the wrist along distinct
    /// directions; knuckles halfway.
    fn spread_hand(reach: f32) -> Vec<Vec3> {
        let wrist = Vec3::new(0.5, 0.8, 0.0);
        let mut lm = collapsed(wrist);
        for (d, digit) in DIGITS.iter().enumerate() {
            let ang = (d as f32 - 2.0) * 0.3;
            let dir = Vec3::new(ang.sin(), -ang.cos(), 0.0);
            for (j, &idx) in digit.iter().enumerate() {
                lm[idx] = wrist + dir * reach * (j + 1) as f32 / 4.0;
            }
        }
        lm
    }

    #[test]
    fn closed_fist_has_zero_openness() {
        let lm = collapsed(Vec3::new(0.4, 0.6, -0.05));
        assert_eq!(openness(&lm), 0.0);
    }

    #[test]
    fn fully_extended_hand_has_full_openness() {
        // Five tips at 0.7 → sum 3.5 → 3.5/2.5 − 0.3 = 1.1 → clamped to 1.
        assert_eq!(openness(&spread_hand(0.7)), 1.0);
    }

    #[test]
    fn openness_formula_in_linear_range() {
        // Five tips at 0.3 → sum 1.5 → 0.6 − 0.3 = 0.3.
        assert!((openness(&spread_hand(0.3)) - 0.3).abs() < EPS);
    }

    #[test]
    fn openness_is_monotonic_between_fist_and_spread() {
        let mut last = -1.0;
        for step in 0..=20 {
            let reach = 0.7 * step as f32 / 20.0;
            let o = openness(&spread_hand(reach));
            assert!(o >= last, "openness dropped at reach {}", reach);
            last = o;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn pinch_when_tips_coincide() {
        let mut lm = spread_hand(0.4);
        lm[THUMB_TIP] = lm[INDEX_TIP];
        assert!(is_pinching(&lm));
    }

    #[test]
    fn pinch_threshold_boundary() {
        let mut lm = spread_hand(0.4);
        let index = lm[INDEX_TIP];

        lm[THUMB_TIP] = index + Vec3::new(PINCH_THRESHOLD - 1e-4, 0.0, 0.0);
        assert!(is_pinching(&lm), "just inside the threshold");

        lm[THUMB_TIP] = index + Vec3::new(PINCH_THRESHOLD + 1e-4, 0.0, 0.0);
        assert!(!is_pinching(&lm), "just outside the threshold");

        lm[THUMB_TIP] = index + Vec3::new(0.0, 0.0, 0.2);
        assert!(!is_pinching(&lm), "depth separation counts too");
    }

    #[test]
    fn position_remaps_image_space_to_scene() {
        let mut lm = collapsed(Vec3::ZERO);
        lm[WRIST] = Vec3::new(0.5, 0.5, 0.0);
        assert!(hand_position(&lm).length() < EPS);

        lm[WRIST] = Vec3::new(1.0, 0.0, 0.25);
        let p = hand_position(&lm);
        assert!((p - Vec3::new(1.0, 1.0, -0.5)).length() < EPS, "{:?}", p);

        lm[WRIST] = Vec3::new(0.0, 1.0, -0.5);
        let p = hand_position(&lm);
        assert!((p - Vec3::new(-1.0, -1.0, 1.0)).length() < EPS, "{:?}", p);
    }

    #[test]
    fn rotation_from_known_vectors() {
        let mut lm = collapsed(Vec3::ZERO);
        // width vector (1, 1, 0) → roll 45°
        lm[INDEX_MCP] = Vec3::new(1.0, 1.0, 0.0);
        lm[PINKY_MCP] = Vec3::ZERO;
        // forward vector (0, 0, −1) → pitch 0, yaw atan2(0, 1) = 0
        lm[MIDDLE_MCP] = Vec3::new(0.0, 0.0, -1.0);
        let r = wrist_rotation(&lm);
        assert!(r.x.abs() < EPS);
        assert!(r.y.abs() < EPS);
        assert!((r.z - std::f32::consts::FRAC_PI_4).abs() < EPS);

        // forward straight up the image (−y) → pitch −90°
        lm[MIDDLE_MCP] = Vec3::new(0.0, -1.0, 0.0);
        let r = wrist_rotation(&lm);
        assert!((r.x + FRAC_PI_2).abs() < EPS);

        // forward along −x → yaw atan2(1, 0) = 90°
        lm[MIDDLE_MCP] = Vec3::new(-1.0, 0.0, 0.0);
        let r = wrist_rotation(&lm);
        assert!((r.y - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn malformed_input_fails_safe() {
        let short = vec![Vec3::splat(0.5); 12];
        assert_eq!(openness(&short), 0.0);
        assert_eq!(hand_position(&short), Vec3::ZERO);
        assert_eq!(wrist_rotation(&short), Vec3::ZERO);
        assert!(!is_pinching(&short));
        assert!(!is_thumbs_up(&short));
        assert!(!is_peace_sign(&short));
        assert!(classify(&short, Handedness::Left).is_none());

        let mut nan = spread_hand(0.4);
        nan[WRIST].x = f32::NAN;
        assert!(classify(&nan, Handedness::Right).is_none());
        assert!(!is_pinching(&nan));
    }

    #[test]
    fn thumbs_up_and_peace_sign() {
        // Knuckles on a row at y = 0.5; tips above (smaller y) or below.
        let mut lm = collapsed(Vec3::new(0.5, 0.7, 0.0));
        for (d, digit) in DIGITS.iter().enumerate() {
            let x = 0.4 + d as f32 * 0.05;
            for &j in digit { lm[j] = Vec3::new(x, 0.5, 0.0); }
        }
        let fold  = |lm: &mut Vec<Vec3>, tip: usize| lm[tip].y = 0.6;
        let raise = |lm: &mut Vec<Vec3>, tip: usize| lm[tip].y = 0.3;

        let mut thumbs = lm.clone();
        raise(&mut thumbs, THUMB_TIP);
        for tip in [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP] { fold(&mut thumbs, tip); }
        assert!(is_thumbs_up(&thumbs));
        assert!(!is_peace_sign(&thumbs));

        let mut peace = lm.clone();
        raise(&mut peace, INDEX_TIP);
        raise(&mut peace, MIDDLE_TIP);
        fold(&mut peace, RING_TIP);
        fold(&mut peace, PINKY_TIP);
        assert!(is_peace_sign(&peace));
        assert!(!is_thumbs_up(&peace));

        let state = classify(&peace, Handedness::Left).unwrap();
        assert_eq!(state.gesture, Gesture::Peace);
    }

    #[test]
    fn classify_fills_every_field() {
        let mut lm = spread_hand(0.7);
        lm[THUMB_TIP] = lm[INDEX_TIP];
        let s = classify(&lm, Handedness::Right).unwrap();
        assert!(s.detected);
        assert_eq!(s.handedness, Some(Handedness::Right));
        assert!(s.pinching);
        assert_eq!(s.gesture, Gesture::Pinch);
        assert!(s.is_open);
        assert!(s.landmarks.is_some());
        assert_eq!(s.position, hand_position(&lm));
        assert_eq!(s.rotation, wrist_rotation(&lm));
    }
}
