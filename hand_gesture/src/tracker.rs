//! Landmark providers and the tracking thread.
//!
//! A provider implements [`LandmarkSource`] and runs on its own thread,
//! delivering frames through a [`FrameSink`].  The sink classifies each
//! frame and overwrites the shared [`Mailbox`]; the frame loop reads the
//! newest snapshot without waiting.  Consumers don't need to know whether
//! frames came from real hardware, a front-end callback, or the simulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::aggregator::{HandAggregator, LandmarkFrame, TrackingConfig};
use crate::mailbox::Mailbox;
use crate::state::TwoHandSnapshot;

// ════════════════════════════════════════════════════════════════════════════
// ProviderError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Detector or camera not ready yet; worth retrying.
    #[error("landmark provider not available yet: {0}")]
    Unavailable(String),

    /// Camera or device access refused.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The provider went away after starting.
    #[error("landmark provider disconnected")]
    Disconnected,

    /// Any other backend failure.
    #[error("landmark backend error: {0}")]
    Backend(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver landmark frames.
///
/// `run` owns the provider for its whole life: start it (ideally through
/// [`FrameSink::open_with_retry`]), deliver frames until
/// [`FrameSink::deliver`] returns `false`, then release its resources and
/// report the outcome with [`FrameSink::report_close`].
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, sink: FrameSink);
}

// ════════════════════════════════════════════════════════════════════════════
// Shared state between the tracker handle and its thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct Shared {
    mailbox:     Mailbox<TwoHandSnapshot>,
    initialized: AtomicBool,
    stop:        AtomicBool,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSink — the provider's view of the tracker
// ════════════════════════════════════════════════════════════════════════════

/// Handed to [`LandmarkSource::run`].
pub struct FrameSink {
    aggregator: HandAggregator,
    shared:     Arc<Shared>,
}

impl FrameSink {
    fn new(config: TrackingConfig, shared: Arc<Shared>) -> Self {
        FrameSink { aggregator: HandAggregator::new(config), shared }
    }

    pub fn config(&self) -> &TrackingConfig { self.aggregator.config() }

    pub fn poll_timeout(&self) -> Duration { self.config().poll_timeout }

    /// True once the tracker has been torn down.
    pub fn is_stopped(&self) -> bool { self.shared.stop.load(Ordering::Acquire) }

    /// Try to start the provider, retrying retryable errors at the
    /// configured interval up to the configured number of attempts.
    ///
    /// Either way the tracker is marked initialised afterwards.  On failure
    /// an all-undetected snapshot is published and `None` is returned.
    /// Teardown during start-up also returns `None`, without reporting a
    /// failure.
    pub fn open_with_retry<T, F>(&mut self, open: F) -> Option<T>
    where
        F: FnMut() -> Result<T, ProviderError>,
    {
        let interval = self.config().init_retry_interval;
        self.open_attempts(open, interval)
    }

    /// As [`open_with_retry`](Self::open_with_retry) for an `open` that
    /// itself blocks for up to the retry interval before reporting
    /// `Unavailable`; no extra delay is added between attempts.
    pub fn open_waiting<T, F>(&mut self, open: F) -> Option<T>
    where
        F: FnMut() -> Result<T, ProviderError>,
    {
        self.open_attempts(open, Duration::ZERO)
    }

    fn open_attempts<T, F>(&mut self, mut open: F, pause: Duration) -> Option<T>
    where
        F: FnMut() -> Result<T, ProviderError>,
    {
        let attempts = self.config().max_init_attempts.max(1);
        let mut last_err = ProviderError::Unavailable("no start attempt made".into());

        for attempt in 1..=attempts {
            if self.is_stopped() { break; }
            match open() {
                Ok(handle) => {
                    info!(target: "hand_gesture", attempt, "landmark provider started");
                    self.ready();
                    return Some(handle);
                }
                Err(err) if err.is_retryable() && attempt < attempts => {
                    debug!(target: "hand_gesture", attempt, "{err}; retrying");
                    last_err = err;
                    if !pause.is_zero() { thread::sleep(pause); }
                }
                Err(err) => {
                    last_err = err;
                    break;
                }
            }
        }

        if self.is_stopped() {
            debug!(target: "hand_gesture", "tracker stopped during provider start-up");
            return None;
        }
        self.failed(&last_err);
        None
    }

    /// Mark the provider as started without going through
    /// [`open_with_retry`](Self::open_with_retry).
    pub fn ready(&mut self) {
        self.aggregator.on_provider_ready();
        self.publish(self.aggregator.idle_snapshot());
    }

    /// Mark the provider as permanently unavailable.
    pub fn failed(&mut self, err: &ProviderError) {
        self.aggregator.on_provider_failed(err);
        self.publish(self.aggregator.idle_snapshot());
    }

    /// Classify and publish one frame.  Returns `false` once the tracker has
    /// been torn down; the frame is discarded and the source should exit.
    pub fn deliver(&mut self, frame: &LandmarkFrame) -> bool {
        if self.is_stopped() { return false; }
        let snap = self.aggregator.ingest(frame);
        // Late delivery after teardown is dropped.
        if self.is_stopped() { return false; }
        self.publish(snap);
        true
    }

    /// The provider lost its device mid-run: publish both hands as gone.
    pub fn lost(&mut self, err: &ProviderError) {
        warn!(target: "hand_gesture", "{err}; hands reset to undetected");
        self.publish(self.aggregator.idle_snapshot());
    }

    /// Log the outcome of releasing provider resources.  Errors never stop
    /// the rest of teardown.
    pub fn report_close(&self, result: Result<(), ProviderError>) {
        match result {
            Ok(())   => debug!(target: "hand_gesture", "landmark provider closed"),
            Err(err) => error!(target: "hand_gesture", "error closing landmark provider: {err}"),
        }
    }

    fn publish(&self, snap: TwoHandSnapshot) {
        if snap.initialized {
            self.shared.initialized.store(true, Ordering::Release);
        }
        self.shared.mailbox.post(snap);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

/// Handle to a running landmark provider.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) stops the
/// provider and joins its thread.
pub struct HandTracker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl HandTracker {
    /// Spawn `source` on its own thread.
    pub fn spawn<S: LandmarkSource>(source: S, config: TrackingConfig) -> Self {
        let shared = Arc::new(Shared::default());
        let sink   = FrameSink::new(config, Arc::clone(&shared));
        let handle = thread::Builder::new()
            .name("landmark-provider".into())
            .spawn(move || Box::new(source).run(sink));

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                error!(target: "hand_gesture", "could not spawn provider thread: {e}");
                shared.initialized.store(true, Ordering::Release);
                shared.mailbox.post(TwoHandSnapshot::idle(true));
                None
            }
        };
        HandTracker { shared, handle }
    }

    /// True once the provider has started or definitively failed.
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::Acquire)
    }

    /// Newest snapshot, or an uninitialised idle one if nothing arrived yet.
    pub fn snapshot(&self) -> TwoHandSnapshot {
        self.shared.mailbox
            .latest()
            .map(|(_, s)| s)
            .unwrap_or_else(|| TwoHandSnapshot::idle(self.is_initialized()))
    }

    /// Newest snapshot if it is newer than `last_seen`.
    pub fn snapshot_since(&self, last_seen: &mut u64) -> Option<TwoHandSnapshot> {
        self.shared.mailbox.take_newer(last_seen)
    }

    /// Stop the provider and wait for its thread.  Safe to call twice.
    pub fn shutdown(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(target: "hand_gesture", "landmark provider thread panicked");
            }
        }
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) { self.shutdown(); }
}

// ════════════════════════════════════════════════════════════════════════════
// ChannelSource — frames pushed by a front end that owns the detector
// ════════════════════════════════════════════════════════════════════════════

/// Message from a front-end detector callback.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderMessage {
    /// Camera and detector are running.
    Ready,
    /// Start-up failed (permission denied, library missing, …).
    Failed(ProviderError),
    /// One detection result.
    Results(LandmarkFrame),
}

/// Landmark source fed through a channel.
pub struct ChannelSource {
    pub rx: Receiver<ProviderMessage>,
}

impl ChannelSource {
    /// A connected `(sender, source)` pair.
    pub fn pair() -> (Sender<ProviderMessage>, ChannelSource) {
        let (tx, rx) = mpsc::channel();
        (tx, ChannelSource { rx })
    }
}

impl LandmarkSource for ChannelSource {
    fn run(self: Box<Self>, mut sink: FrameSink) {
        let rx       = self.rx;
        let interval = sink.config().init_retry_interval;

        // The receive timeout is the wait between start-up attempts.
        let mut early: Option<LandmarkFrame> = None;
        let started = sink.open_waiting(|| match rx.recv_timeout(interval) {
            Ok(ProviderMessage::Ready)          => Ok(()),
            Ok(ProviderMessage::Results(frame)) => { early = Some(frame); Ok(()) }
            Ok(ProviderMessage::Failed(err))    => Err(err),
            Err(RecvTimeoutError::Timeout)      =>
                Err(ProviderError::Unavailable("waiting for detector start-up".into())),
            Err(RecvTimeoutError::Disconnected) => Err(ProviderError::Disconnected),
        });
        if started.is_some() {
            pump(&rx, &mut sink, early);
        }
        sink.report_close(Ok(()));
    }
}

/// Deliver channel messages until teardown or disconnect.
fn pump(rx: &Receiver<ProviderMessage>, sink: &mut FrameSink, early: Option<LandmarkFrame>) {
    if let Some(frame) = early {
        if !sink.deliver(&frame) { return; }
    }
    loop {
        match rx.recv_timeout(sink.poll_timeout()) {
            Ok(ProviderMessage::Results(frame)) => {
                if !sink.deliver(&frame) { return; }
            }
            Ok(ProviderMessage::Ready) => {}
            Ok(ProviderMessage::Failed(err)) => sink.lost(&err),
            Err(RecvTimeoutError::Timeout) => {
                if sink.is_stopped() { return; }
            }
            Err(RecvTimeoutError::Disconnected) => {
                sink.lost(&ProviderError::Disconnected);
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::DetectedHand;
    use crate::state::Handedness;
    use crate::synthetic::{synthetic_hand, HandPose};
    use std::time::Instant;

    fn fast_config() -> TrackingConfig {
        TrackingConfig {
            mirrored:            false,
            init_retry_interval: Duration::from_millis(5),
            max_init_attempts:   4,
            poll_timeout:        Duration::from_millis(5),
            ..TrackingConfig::default()
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() { return true; }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    fn right_hand_frame() -> LandmarkFrame {
        let lm = synthetic_hand(&HandPose::open(), Handedness::Right);
        LandmarkFrame::with_hands(vec![DetectedHand::new(lm.to_vec(), Handedness::Right)])
    }

    #[test]
    fn channel_frames_reach_the_snapshot() {
        let (tx, source) = ChannelSource::pair();
        let mut tracker  = HandTracker::spawn(source, fast_config());

        tx.send(ProviderMessage::Ready).unwrap();
        tx.send(ProviderMessage::Results(right_hand_frame())).unwrap();

        assert!(wait_until(|| tracker.snapshot().right.detected));
        assert!(tracker.is_initialized());
        tracker.shutdown();
    }

    #[test]
    fn provider_failure_still_initializes() {
        let (tx, source) = ChannelSource::pair();
        let tracker = HandTracker::spawn(source, fast_config());
        tx.send(ProviderMessage::Failed(ProviderError::PermissionDenied("camera".into()))).unwrap();

        assert!(wait_until(|| tracker.is_initialized()));
        let snap = tracker.snapshot();
        assert!(snap.initialized);
        assert!(!snap.left.detected && !snap.right.detected);
    }

    #[test]
    fn silent_provider_gives_up_after_bounded_retries() {
        let (_tx, source) = ChannelSource::pair();
        let started = Instant::now();
        let tracker = HandTracker::spawn(source, fast_config());
        assert!(wait_until(|| tracker.is_initialized()));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!tracker.snapshot().right.detected);
    }

    #[test]
    fn frames_after_failure_are_ignored() {
        let (tx, source) = ChannelSource::pair();
        let tracker = HandTracker::spawn(source, fast_config());
        tx.send(ProviderMessage::Failed(ProviderError::Backend("no model".into()))).unwrap();
        assert!(wait_until(|| tracker.is_initialized()));
        let _ = tx.send(ProviderMessage::Results(right_hand_frame()));
        thread::sleep(Duration::from_millis(30));
        assert!(!tracker.snapshot().right.detected);
    }

    #[test]
    fn early_results_count_as_ready() {
        let (tx, source) = ChannelSource::pair();
        let tracker = HandTracker::spawn(source, fast_config());
        tx.send(ProviderMessage::Results(right_hand_frame())).unwrap();
        assert!(wait_until(|| tracker.snapshot().right.detected));
    }

    #[test]
    fn disconnect_resets_hands() {
        let (tx, source) = ChannelSource::pair();
        let tracker = HandTracker::spawn(source, fast_config());
        tx.send(ProviderMessage::Results(right_hand_frame())).unwrap();
        assert!(wait_until(|| tracker.snapshot().right.detected));
        drop(tx);
        assert!(wait_until(|| !tracker.snapshot().right.detected));
    }

    #[test]
    fn shutdown_is_idempotent_and_late_sends_are_harmless() {
        let (tx, source) = ChannelSource::pair();
        let mut tracker = HandTracker::spawn(source, fast_config());
        tx.send(ProviderMessage::Ready).unwrap();
        assert!(wait_until(|| tracker.is_initialized()));
        tracker.shutdown();
        tracker.shutdown();
        // The receiver is gone; a late result is simply dropped.
        let _ = tx.send(ProviderMessage::Results(right_hand_frame()));
        assert!(!tracker.snapshot().right.detected);
    }

    #[test]
    fn silent_channel_start_up_fits_the_retry_budget() {
        let config = TrackingConfig {
            init_retry_interval: Duration::from_millis(50),
            max_init_attempts:   10,
            ..fast_config()
        };
        let (_tx, source) = ChannelSource::pair();
        let started = Instant::now();
        let tracker = HandTracker::spawn(source, config);
        assert!(wait_until(|| tracker.is_initialized()));
        // Ten waits of 50 ms, not ten waits plus ten sleeps.
        assert!(started.elapsed() < Duration::from_millis(800));
    }

    #[test]
    fn shutdown_during_start_up_does_not_report_failure() {
        let config = TrackingConfig {
            init_retry_interval: Duration::from_millis(5),
            max_init_attempts:   u32::MAX,
            ..fast_config()
        };
        let (_tx, source) = ChannelSource::pair();
        let mut tracker = HandTracker::spawn(source, config);
        thread::sleep(Duration::from_millis(20));
        tracker.shutdown();
        assert!(!tracker.is_initialized());
    }

    #[test]
    fn open_waiting_adds_no_pause_between_attempts() {
        let shared = Arc::new(Shared::default());
        let config = TrackingConfig {
            init_retry_interval: Duration::from_millis(200),
            max_init_attempts:   3,
            ..fast_config()
        };
        let mut sink = FrameSink::new(config, Arc::clone(&shared));
        let mut calls = 0;
        let started = Instant::now();
        let opened: Option<()> = sink.open_waiting(|| {
            calls += 1;
            Err(ProviderError::Unavailable("not yet".into()))
        });
        assert!(opened.is_none());
        assert_eq!(calls, 3);
        assert!(started.elapsed() < Duration::from_millis(200));
        assert!(shared.initialized.load(Ordering::Acquire));
    }

    #[test]
    fn stopped_sink_skips_start_up() {
        let shared = Arc::new(Shared::default());
        shared.stop.store(true, Ordering::Release);
        let mut sink = FrameSink::new(fast_config(), Arc::clone(&shared));
        let opened: Option<()> = sink.open_with_retry(|| Ok(()));
        assert!(opened.is_none());
        assert!(!shared.initialized.load(Ordering::Acquire));
        assert!(shared.mailbox.latest().is_none());
    }

    #[test]
    fn snapshot_since_reports_each_new_snapshot_once() {
        let (tx, source) = ChannelSource::pair();
        let tracker = HandTracker::spawn(source, fast_config());
        tx.send(ProviderMessage::Ready).unwrap();
        let mut seen = 0;
        assert!(wait_until(|| tracker.snapshot_since(&mut seen).is_some()));
        assert!(tracker.snapshot_since(&mut seen).is_none());
    }
}
