//! Synthetic hand construction.
//!
//! Builds a 21-landmark set from a handful of pose parameters.  The
//! fingertip reach is derived from the requested openness so that
//! classifying the result gives that openness back.

use glam::Vec3;

use crate::classify::{OPENNESS_DIVISOR, OPENNESS_OFFSET};
use crate::landmarks::*;
use crate::state::Handedness;

/// Wrist → knuckle distance in normalised image units.
const KNUCKLE_REACH: f32 = 0.09;

/// Tip reach used for a closed fist (well inside the openness dead zone).
const FIST_REACH: f32 = 0.08;

/// Digit directions, radians clockwise from image-up, thumb first, for a
/// right hand seen palm-on.
const DIGIT_ANGLES: [f32; 5] = [-0.9, -0.3, 0.0, 0.25, 0.5];

/// Pose parameters for a synthetic hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    /// Wrist in normalised image space (`x`, `y` in 0–1, `z` relative depth).
    pub wrist:    Vec3,
    /// Target openness 0–1.
    pub openness: f32,
    /// Thumb tip placed on the index tip.
    pub pinch:    bool,
    /// In-plane rotation, radians.
    pub roll:     f32,
    /// Lean of the fingers toward (+) or away from (−) the camera, radians.
    pub tilt:     f32,
}

impl Default for HandPose {
    fn default() -> Self {
        HandPose {
            wrist:    Vec3::new(0.5, 0.7, 0.0),
            openness: 0.5,
            pinch:    false,
            roll:     0.0,
            tilt:     0.0,
        }
    }
}

impl HandPose {
    pub fn open() -> Self { HandPose { openness: 1.0, ..HandPose::default() } }

    pub fn fist() -> Self { HandPose { openness: 0.0, ..HandPose::default() } }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.wrist.x = x;
        self.wrist.y = y;
        self
    }

    pub fn with_openness(mut self, openness: f32) -> Self {
        self.openness = openness;
        self
    }

    pub fn pinching(mut self, pinch: bool) -> Self {
        self.pinch = pinch;
        self
    }

    pub fn rolled(mut self, roll: f32) -> Self {
        self.roll = roll;
        self
    }

    /// Fingertip distance from the wrist that yields `openness`.
    fn tip_reach(&self) -> f32 {
        let o = self.openness.clamp(0.0, 1.0);
        if o <= 0.0 {
            FIST_REACH
        } else {
            OPENNESS_DIVISOR * (o + OPENNESS_OFFSET) / FINGERTIPS.len() as f32
        }
    }
}

/// Landmarks for `pose`.  Left hands are mirrored about the wrist.
pub fn synthetic_hand(pose: &HandPose, handedness: Handedness) -> [Vec3; LANDMARK_COUNT] {
    let mirror = match handedness {
        Handedness::Right =>  1.0,
        Handedness::Left  => -1.0,
    };
    let reach = pose.tip_reach();
    let (sin_t, cos_t) = pose.tilt.sin_cos();

    let mut lm = [pose.wrist; LANDMARK_COUNT];
    for (digit, chain) in DIGITS.iter().enumerate() {
        let a   = DIGIT_ANGLES[digit] * mirror + pose.roll;
        let dir = Vec3::new(a.sin() * cos_t, -a.cos() * cos_t, -sin_t);

        let base = pose.wrist + dir * KNUCKLE_REACH;
        let tip  = pose.wrist + dir * reach;
        for (j, &idx) in chain.iter().enumerate() {
            lm[idx] = base.lerp(tip, j as f32 / 3.0);
        }
    }

    if pose.pinch {
        lm[THUMB_TIP] = lm[INDEX_TIP];
    }
    lm
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
