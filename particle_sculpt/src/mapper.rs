//! Hands → engine targets.
//!
//! Run once per new [`TwoHandSnapshot`]:
//!
//! * both hands: `scale = 0.7 × (hand distance × 1.5) + 0.3 × (right openness × 6)`
//! * right hand only: `scale = right openness × 6`
//! * otherwise the scale target is left where it was
//! * rotation target = right hand rotation while it is detected
//! * left pinch rising edge advances the color preset by one

use glam::Vec3;
use hand_gesture::TwoHandSnapshot;
use tracing::debug;

use crate::color::{ColorPreset, PRESETS};
use crate::engine::{ParticleEngine, SCALE_MAX, SCALE_MIN};

pub const DISTANCE_GAIN: f32 = 1.5;
pub const OPENNESS_GAIN: f32 = 6.0;
pub const DISTANCE_WEIGHT: f32 = 0.7;
pub const OPENNESS_WEIGHT: f32 = 0.3;

/// Scale target for a snapshot, or `None` when the right hand is missing.
pub fn target_scale(snap: &TwoHandSnapshot) -> Option<f32> {
    let (left, right) = (&snap.left, &snap.right);
    if !right.detected { return None; }

    let openness_scale = right.openness * OPENNESS_GAIN;
    let scale = if left.detected {
        let distance = left.position.distance(right.position);
        DISTANCE_WEIGHT * distance * DISTANCE_GAIN + OPENNESS_WEIGHT * openness_scale
    } else {
        openness_scale
    };
    Some(scale.clamp(SCALE_MIN, SCALE_MAX))
}

/// Rotation target for a snapshot, or `None` when the right hand is missing.
pub fn target_rotation(snap: &TwoHandSnapshot) -> Option<Vec3> {
    snap.right.detected.then_some(snap.right.rotation)
}

/// What one snapshot asks of the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlUpdate {
    pub scale:    Option<f32>,
    pub rotation: Option<Vec3>,
    /// New palette index after a pinch.
    pub color:    Option<usize>,
}

/// Stateful part of the mapping: the previous left-pinch flag and the
/// palette position.
#[derive(Clone, Debug, Default)]
pub struct ControlMapper {
    last_pinch:  bool,
    color_index: usize,
}

impl ControlMapper {
    pub fn new() -> Self { ControlMapper::default() }

    pub fn color_index(&self) -> usize { self.color_index }

    pub fn preset(&self) -> &'static ColorPreset { &PRESETS[self.color_index % PRESETS.len()] }

    /// Map one snapshot.  Call once per new snapshot, not once per frame:
    /// the pinch edge is measured between consecutive calls.
    pub fn map(&mut self, snap: &TwoHandSnapshot) -> ControlUpdate {
        // The enable switch only clears `detected`; the pinch flag still counts.
        let pinch = snap.left.pinching;
        let color = if pinch && !self.last_pinch {
            self.color_index = (self.color_index + 1) % PRESETS.len();
            debug!(target: "particle_sculpt", preset = self.preset().id, "pinch → next color");
            Some(self.color_index)
        } else {
            None
        };
        self.last_pinch = pinch;

        ControlUpdate {
            scale:    target_scale(snap),
            rotation: target_rotation(snap),
            color,
        }
    }

    /// Map and push the result into `engine`.  Returns the new preset when
    /// the color changed.
    pub fn apply(&mut self, snap: &TwoHandSnapshot, engine: &mut ParticleEngine) -> Option<&'static ColorPreset> {
        let update = self.map(snap);
        if let Some(scale) = update.scale       { engine.set_target_scale(scale); }
        if let Some(rotation) = update.rotation { engine.set_target_rotation(rotation); }
        update.color.map(|i| {
            let preset = &PRESETS[i];
            engine.set_color(preset.color);
            preset
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
