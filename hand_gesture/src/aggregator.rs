//! Hand tracking aggregator.
//!
//! Turns each provider frame into a fresh [`TwoHandSnapshot`]: classify
//! every reported hand, slot it by handedness, and leave any unreported
//! slot in the "not detected" state.  No smoothing happens here.
//!
//! ```text
//!   Uninitialized ──ready / failed / first frame──▶ Running
//! ```
//!
//! The aggregator never returns to `Uninitialized`.  If the provider failed
//! to start, every later snapshot reports both hands as not detected.

use std::time::Duration;

use glam::Vec3;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::state::{Handedness, TwoHandSnapshot};
use crate::tracker::ProviderError;

// ════════════════════════════════════════════════════════════════════════════
// Provider frame types
// ════════════════════════════════════════════════════════════════════════════

/// One hand as reported by the landmark provider.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    /// Ordered landmarks; 21 expected, anything else is rejected.
    pub landmarks:  Vec<Vec3>,
    /// The provider's handedness label.
    pub handedness: Handedness,
    /// Detection confidence 0–1.
    pub score:      f32,
}

impl DetectedHand {
    pub fn new(landmarks: Vec<Vec3>, handedness: Handedness) -> Self {
        DetectedHand { landmarks, handedness, score: 1.0 }
    }
}

/// One provider callback: zero, one or two hands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    pub hands: Vec<DetectedHand>,
}

impl LandmarkFrame {
    pub fn empty() -> Self { LandmarkFrame::default() }

    pub fn with_hands(hands: Vec<DetectedHand>) -> Self { LandmarkFrame { hands } }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tracking options shared by the aggregator and the provider thread.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingConfig {
    /// Hands beyond this many per frame are ignored.
    pub max_hands:                usize,
    /// Reported hands below this score are dropped.
    pub min_detection_confidence: f32,
    /// Not applied here: carried for the front end's detector, which tracks
    /// between detections and is configured with this score.
    pub min_tracking_confidence:  f32,
    /// Selfie-camera convention: the provider's "Left" is the user's right.
    pub mirrored:                 bool,
    /// Delay between provider start attempts.
    pub init_retry_interval:      Duration,
    /// Start attempts before giving up.
    pub max_init_attempts:        u32,
    /// Longest a provider poll may block.
    pub poll_timeout:             Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            max_hands:                2,
            min_detection_confidence: 0.3,
            min_tracking_confidence:  0.3,
            mirrored:                 true,
            init_retry_interval:      Duration::from_millis(100),
            max_init_attempts:        50,
            poll_timeout:             Duration::from_millis(100),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandAggregator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    Uninitialized,
    /// `provider_ok == false` means the provider never came up; hands stay
    /// undetected for good.
    Running { provider_ok: bool },
}

#[derive(Debug)]
pub struct HandAggregator {
    state:  TrackerState,
    config: TrackingConfig,
    frames: u64,
}

impl HandAggregator {
    pub fn new(config: TrackingConfig) -> Self {
        HandAggregator { state: TrackerState::Uninitialized, config, frames: 0 }
    }

    pub fn state(&self) -> TrackerState { self.state }

    pub fn is_initialized(&self) -> bool { self.state != TrackerState::Uninitialized }

    pub fn config(&self) -> &TrackingConfig { &self.config }

    pub fn frames_seen(&self) -> u64 { self.frames }

    /// The provider started.
    pub fn on_provider_ready(&mut self) {
        if self.state == TrackerState::Uninitialized {
            debug!(target: "hand_gesture", "provider ready");
            self.state = TrackerState::Running { provider_ok: true };
        }
    }

    /// The provider could not start.  The aggregator still counts as
    /// initialised so dependent UI is not blocked.
    pub fn on_provider_failed(&mut self, err: &ProviderError) {
        warn!(target: "hand_gesture", "landmark provider unavailable: {err}; hands stay undetected");
        self.state = TrackerState::Running { provider_ok: false };
    }

    /// Snapshot with both hands undetected, carrying the current
    /// initialisation flag.
    pub fn idle_snapshot(&self) -> TwoHandSnapshot {
        TwoHandSnapshot::idle(self.is_initialized())
    }

    /// Build the snapshot for one provider frame.
    pub fn ingest(&mut self, frame: &LandmarkFrame) -> TwoHandSnapshot {
        match self.state {
            TrackerState::Running { provider_ok: false } => return self.idle_snapshot(),
            // A delivered frame proves the provider is up.
            TrackerState::Uninitialized => self.on_provider_ready(),
            TrackerState::Running { provider_ok: true } => {}
        }
        self.frames += 1;

        let mut snap = TwoHandSnapshot::idle(true);
        let accepted = frame.hands
            .iter()
            .filter(|h| h.score >= self.config.min_detection_confidence)
            .take(self.config.max_hands);

        for hand in accepted {
            let slot = if self.config.mirrored { hand.handedness.opposite() } else { hand.handedness };
            match classify(&hand.landmarks, slot) {
                // A later hand with the same label overwrites an earlier one.
                Some(state) => *snap.hand_mut(slot) = state,
                None => debug!(
                    target: "hand_gesture",
                    "dropping {} hand with {} landmarks", slot.as_str(), hand.landmarks.len()
                ),
            }
        }
        snap
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
