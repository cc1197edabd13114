//! Scripted synthetic hands: a landmark provider that needs no camera.
//!
//! A script is a list of [`SimKeyframe`]s.  Between two keyframes that both
//! show a hand its pose is interpolated; a hand missing from either side
//! simply appears or disappears at the keyframe.  Optional jitter adds
//! per-landmark noise so downstream smoothing has something to do.

use std::thread;
use std::time::Duration;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::aggregator::{DetectedHand, LandmarkFrame};
use crate::state::Handedness;
use crate::synthetic::{synthetic_hand, HandPose};
use crate::tracker::{FrameSink, LandmarkSource, ProviderError};

/// Hand poses at one point of the script.  `left` / `right` are the user's
/// hands; the source applies the selfie mirroring itself when asked to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimKeyframe {
    pub at:    Duration,
    pub left:  Option<HandPose>,
    pub right: Option<HandPose>,
}

impl SimKeyframe {
    pub fn new(at: Duration) -> Self { SimKeyframe { at, ..SimKeyframe::default() } }

    pub fn left(mut self, pose: HandPose) -> Self {
        self.left = Some(pose);
        self
    }

    pub fn right(mut self, pose: HandPose) -> Self {
        self.right = Some(pose);
        self
    }
}

/// How start-up should go.
#[derive(Clone, Debug, PartialEq)]
enum StartBehaviour {
    Ok,
    /// Report `Unavailable` this many times, then start.
    SlowStart(u32),
    /// Never start.
    Fail(ProviderError),
}

pub struct SimLandmarkSource {
    script:   Vec<SimKeyframe>,
    interval: Duration,
    looping:  bool,
    jitter:   f32,
    rng:      StdRng,
    start:    StartBehaviour,
}

impl SimLandmarkSource {
    /// Keyframes are sorted by time; an empty script shows no hands.
    pub fn new(mut script: Vec<SimKeyframe>) -> Self {
        script.sort_by_key(|k| k.at);
        SimLandmarkSource {
            script,
            interval: Duration::from_millis(16),
            looping:  false,
            jitter:   0.0,
            rng:      StdRng::seed_from_u64(0x5eed),
            start:    StartBehaviour::Ok,
        }
    }

    /// A few seconds of both hands: the right hand opens and closes while
    /// the left pinches once.  Loops.
    pub fn demo() -> Self {
        let left  = HandPose::default().at(0.7, 0.6).with_openness(0.6);
        let right = HandPose::default().at(0.3, 0.6);
        SimLandmarkSource::new(vec![
            SimKeyframe::new(Duration::ZERO)
                .left(left).right(right.with_openness(0.1)),
            SimKeyframe::new(Duration::from_millis(1500))
                .left(left).right(right.with_openness(0.9).rolled(0.3)),
            SimKeyframe::new(Duration::from_millis(1600))
                .left(left.pinching(true)).right(right.with_openness(0.9).rolled(0.3)),
            SimKeyframe::new(Duration::from_millis(1900))
                .left(left).right(right.with_openness(0.7)),
            SimKeyframe::new(Duration::from_millis(3000))
                .left(left).right(right.with_openness(0.1)),
        ])
        .looping(true)
        .with_jitter(0.002)
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Uniform noise of ± `amount` on every landmark coordinate.
    pub fn with_jitter(mut self, amount: f32) -> Self {
        self.jitter = amount.max(0.0);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Report "not ready" for the first `attempts` start attempts.
    pub fn slow_start(mut self, attempts: u32) -> Self {
        self.start = StartBehaviour::SlowStart(attempts);
        self
    }

    /// Never start; every attempt reports `err`.
    pub fn failing(mut self, err: ProviderError) -> Self {
        self.start = StartBehaviour::Fail(err);
        self
    }

    fn script_len(&self) -> Duration {
        self.script.last().map(|k| k.at).unwrap_or(Duration::ZERO)
    }

    /// Poses of both hands at script time `t`.
    pub fn poses_at(&self, t: Duration) -> (Option<HandPose>, Option<HandPose>) {
        let t = match (self.looping, self.script_len()) {
            (true, len) if len > Duration::ZERO =>
                Duration::from_nanos((t.as_nanos() % len.as_nanos()) as u64),
            _ => t,
        };

        let next_idx = self.script.iter().position(|k| k.at > t);
        let (prev, next) = match next_idx {
            None    => (self.script.last(), None),
            Some(0) => (None, self.script.first()),
            Some(i) => (self.script.get(i - 1), self.script.get(i)),
        };
        let prev = match prev {
            Some(p) => p,
            None    => return (None, None),
        };
        let next = match next {
            Some(n) => n,
            None    => return (prev.left, prev.right),
        };

        let span = (next.at - prev.at).as_secs_f32();
        let f = if span > 0.0 { (t - prev.at).as_secs_f32() / span } else { 0.0 };
        (blend(prev.left, next.left, f), blend(prev.right, next.right, f))
    }

    fn frame_at(&mut self, t: Duration, mirrored: bool) -> LandmarkFrame {
        let (left, right) = self.poses_at(t);
        let mut hands = Vec::with_capacity(2);
        for (pose, user_hand) in [(left, Handedness::Left), (right, Handedness::Right)] {
            let Some(pose) = pose else { continue };
            let mut lm = synthetic_hand(&pose, user_hand);
            if self.jitter > 0.0 {
                for p in lm.iter_mut() {
                    *p += Vec3::new(
                        self.rng.random_range(-self.jitter..=self.jitter),
                        self.rng.random_range(-self.jitter..=self.jitter),
                        self.rng.random_range(-self.jitter..=self.jitter),
                    );
                }
            }
            // Label the way a selfie-camera detector would.
            let label = if mirrored { user_hand.opposite() } else { user_hand };
            hands.push(DetectedHand::new(lm.to_vec(), label));
        }
        LandmarkFrame::with_hands(hands)
    }
}

/// Pose interpolation; the pinch flag switches at the halfway point.
fn blend(a: Option<HandPose>, b: Option<HandPose>, f: f32) -> Option<HandPose> {
    match (a, b) {
        (Some(a), Some(b)) => Some(HandPose {
            wrist:    a.wrist.lerp(b.wrist, f),
            openness: a.openness + (b.openness - a.openness) * f,
            pinch:    if f < 0.5 { a.pinch } else { b.pinch },
            roll:     a.roll + (b.roll - a.roll) * f,
            tilt:     a.tilt + (b.tilt - a.tilt) * f,
        }),
        (a, _) => a,
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(mut self: Box<Self>, mut sink: FrameSink) {
        let mut start = self.start.clone();
        let opened = sink.open_with_retry(|| match &mut start {
            StartBehaviour::Ok => Ok(()),
            StartBehaviour::SlowStart(0) => Ok(()),
            StartBehaviour::SlowStart(n) => {
                *n -= 1;
                Err(ProviderError::Unavailable("simulated warm-up".into()))
            }
            StartBehaviour::Fail(err) => Err(err.clone()),
        });
        if opened.is_none() {
            sink.report_close(Ok(()));
            return;
        }

        info!(target: "hand_gesture", keyframes = self.script.len(), "simulated hands running");
        let mirrored = sink.config().mirrored;
        let mut t = Duration::ZERO;
        loop {
            let frame = self.frame_at(t, mirrored);
            if !sink.deliver(&frame) { break; }
            thread::sleep(self.interval);
            t += self.interval;
        }
        sink.report_close(Ok(()));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::TrackingConfig;
    use crate::tracker::HandTracker;
    use std::time::Instant;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn fast_config() -> TrackingConfig {
        TrackingConfig {
            init_retry_interval: ms(2),
            max_init_attempts:   5,
            poll_timeout:        ms(5),
            ..TrackingConfig::default()
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() { return true; }
            thread::sleep(ms(2));
        }
        false
    }

    #[test]
    fn poses_interpolate_between_keyframes() {
        let sim = SimLandmarkSource::new(vec![
            SimKeyframe::new(ms(0)).right(HandPose::fist()),
            SimKeyframe::new(ms(1000)).right(HandPose::open()),
        ]);
        let (_, r) = sim.poses_at(ms(500));
        assert!((r.unwrap().openness - 0.5).abs() < 1e-4);
        let (_, r) = sim.poses_at(ms(5000));
        assert_eq!(r.unwrap().openness, 1.0);
    }

    #[test]
    fn hands_appear_and_vanish_at_keyframes() {
        let sim = SimLandmarkSource::new(vec![
            SimKeyframe::new(ms(0)).left(HandPose::open()),
            SimKeyframe::new(ms(100)),
        ]);
        assert!(sim.poses_at(ms(50)).0.is_some());
        assert!(sim.poses_at(ms(150)).0.is_none());
        assert_eq!(sim.poses_at(ms(10)).1, None);
    }

    #[test]
    fn looping_wraps_script_time() {
        let sim = SimLandmarkSource::new(vec![
            SimKeyframe::new(ms(0)).right(HandPose::fist()),
            SimKeyframe::new(ms(1000)).right(HandPose::open()),
        ])
        .looping(true);
        let (_, a) = sim.poses_at(ms(250));
        let (_, b) = sim.poses_at(ms(1250));
        assert_eq!(a, b);
    }

    #[test]
    fn mirrored_labels_land_in_the_user_slot() {
        let source = SimLandmarkSource::new(vec![
            SimKeyframe::new(ms(0)).right(HandPose::open()),
        ])
        .frame_interval(ms(2));
        let tracker = HandTracker::spawn(source, fast_config());
        assert!(wait_until(|| tracker.snapshot().right.detected));
        assert!(!tracker.snapshot().left.detected);
    }

    #[test]
    fn slow_start_recovers() {
        let source = SimLandmarkSource::new(vec![
            SimKeyframe::new(ms(0)).left(HandPose::open().pinching(true)),
        ])
        .frame_interval(ms(2))
        .slow_start(3);
        let tracker = HandTracker::spawn(source, fast_config());
        assert!(wait_until(|| tracker.snapshot().left.pinching));
    }

    #[test]
    fn failing_start_reports_initialized_without_hands() {
        let source = SimLandmarkSource::new(vec![
            SimKeyframe::new(ms(0)).left(HandPose::open()),
        ])
        .failing(ProviderError::PermissionDenied("camera".into()));
        let tracker = HandTracker::spawn(source, fast_config());
        assert!(wait_until(|| tracker.is_initialized()));
        thread::sleep(ms(20));
        let snap = tracker.snapshot();
        assert!(!snap.left.detected && !snap.right.detected);
    }

    #[test]
    fn jitter_is_deterministic_per_seed() {
        let script = vec![SimKeyframe::new(ms(0)).right(HandPose::open())];
        let mut a = SimLandmarkSource::new(script.clone()).with_jitter(0.01).seed(7);
        let mut b = SimLandmarkSource::new(script).with_jitter(0.01).seed(7);
        assert_eq!(a.frame_at(ms(0), false), b.frame_at(ms(0), false));
    }
}
