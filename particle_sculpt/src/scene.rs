//! The sculpture: engine, mapper, tracker and control surface in one
//! owned object.
//!
//! ```text
//!   HandTracker ─(mailbox)─▶ enable filter ─▶ ControlMapper ─▶ ParticleEngine ─▶ SceneFrame
//!                                                   │
//!   setters (template, color, size, …) ─────────────┴──────────▶ engine / config
//! ```
//!
//! The front end calls [`Sculpture::frame`] once per display refresh and
//! draws what it returns.  Nothing here blocks: a frame reads whatever
//! snapshot the tracker published last.

use std::time::Instant;

use hand_gesture::{HandTracker, LandmarkSource, TwoHandSnapshot};
use point_templates::Shape;
use tracing::{debug, info, warn};

use crate::color::{ColorPreset, Rgb};
use crate::config::{
    BloomSettings, SculptConfig, AUTO_ROTATE_LIMIT, BLOOM_INTENSITY_MAX, DENSITY_MAX, DENSITY_MIN,
};
use crate::engine::{DisplayFrame, ParticleEngine};
use crate::indicator::HandIndicators;
use crate::mapper::ControlMapper;

// ════════════════════════════════════════════════════════════════════════════
// SceneFrame
// ════════════════════════════════════════════════════════════════════════════

/// One frame's worth of output for the display surface.
#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    pub particles:   DisplayFrame<'a>,
    pub bloom:       BloomSettings,
    pub background:  Rgb,
    /// `None` while indicators are switched off.
    pub indicators:  Option<HandIndicators>,
    /// Hands after the enable filter.
    pub hands:       &'a TwoHandSnapshot,
    /// True once hand tracking has started or given up.
    pub initialized: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Sculpture
// ════════════════════════════════════════════════════════════════════════════

pub struct Sculpture {
    config:     SculptConfig,
    engine:     ParticleEngine,
    mapper:     ControlMapper,
    tracker:    Option<HandTracker>,
    last_seq:   u64,
    hands:      TwoHandSnapshot,
    indicators: HandIndicators,
    clock:      Instant,
    disposed:   bool,
}

impl Sculpture {
    /// Build the cloud from `config`.  No hand tracking until
    /// [`attach_tracker`](Self::attach_tracker).
    pub fn create(config: SculptConfig) -> Self {
        let config = config.clamped();
        let engine = ParticleEngine::create(config.particles.template, config.particles.density);
        Self::from_parts(config, engine)
    }

    /// As [`create`](Self::create) with seeded templates and motion.
    pub fn with_seed(config: SculptConfig, seed: u64) -> Self {
        let config = config.clamped();
        let engine = ParticleEngine::with_seed(config.particles.template, config.particles.density, seed);
        Self::from_parts(config, engine)
    }

    fn from_parts(config: SculptConfig, mut engine: ParticleEngine) -> Self {
        let p = &config.particles;
        engine.set_color(p.color);
        engine.set_size(p.size);
        engine.set_opacity(p.opacity);
        engine.set_pulsate(p.pulsate);
        engine.set_auto_rotate(p.auto_rotate);
        info!(
            target: "particle_sculpt",
            template = %p.template, particles = engine.len(), "sculpture created"
        );

        let hands = TwoHandSnapshot::idle(false);
        Sculpture {
            indicators: HandIndicators::compute(&hands, 0.0),
            config,
            engine,
            mapper:   ControlMapper::new(),
            tracker:  None,
            last_seq: 0,
            hands,
            clock:    Instant::now(),
            disposed: false,
        }
    }

    // ── hand tracking ────────────────────────────────────────────────────

    /// Start `source` on its own thread with the configured tracking
    /// options.  Replaces (and stops) any tracker already attached.
    pub fn attach_tracker<S: LandmarkSource>(&mut self, source: S) {
        let tracking = self.config.tracking.to_tracking_config();
        self.attach(HandTracker::spawn(source, tracking));
    }

    /// Use an already running tracker.
    pub fn attach(&mut self, tracker: HandTracker) {
        if let Some(mut old) = self.tracker.replace(tracker) {
            old.shutdown();
        }
        self.last_seq = 0;
    }

    pub fn tracking_initialized(&self) -> bool {
        self.tracker.as_ref().is_some_and(HandTracker::is_initialized)
    }

    /// Feed one snapshot directly, for front ends that run their own
    /// aggregator.
    pub fn ingest(&mut self, snap: TwoHandSnapshot) {
        let hands = snap.with_enabled(self.config.hands.left_enabled, self.config.hands.right_enabled);
        if let Some(preset) = self.mapper.apply(&hands, &mut self.engine) {
            self.config.particles.color = preset.color;
        }
        self.hands = hands;
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Advance one frame on the sculpture's own clock.
    pub fn frame(&mut self) -> SceneFrame<'_> {
        let ms = self.clock.elapsed().as_secs_f64() * 1000.0;
        self.frame_at(ms)
    }

    /// Advance one frame at `elapsed_ms`: take the newest hand snapshot if
    /// one arrived, map it, animate, and return the display view.
    pub fn frame_at(&mut self, elapsed_ms: f64) -> SceneFrame<'_> {
        if !self.disposed {
            let fresh = self.tracker.as_ref().and_then(|t| t.snapshot_since(&mut self.last_seq));
            if let Some(snap) = fresh {
                self.ingest(snap);
            }
            self.engine.update_at(elapsed_ms);
            self.indicators = HandIndicators::compute(&self.hands, elapsed_ms);
        }

        SceneFrame {
            particles:   self.engine.frame(),
            bloom:       self.config.bloom,
            background:  self.config.particles.background,
            indicators:  (self.config.hands.show_indicators && !self.disposed).then_some(self.indicators),
            hands:       &self.hands,
            initialized: self.hands.initialized || self.tracking_initialized(),
        }
    }

    // ── control surface ──────────────────────────────────────────────────

    pub fn set_template(&mut self, shape: Shape) {
        self.config.particles.template = shape;
        self.engine.set_template(shape);
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.config.particles.color = color;
        self.engine.set_color(color);
    }

    pub fn set_size(&mut self, size: f32) {
        self.engine.set_size(size);
        if size.is_finite() {
            self.config.particles.size = size.clamp(crate::engine::SIZE_MIN, crate::engine::SIZE_MAX);
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.engine.set_opacity(opacity);
        if opacity.is_finite() {
            self.config.particles.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Particle count, clamped to 5 000 – 25 000.  Regenerates the cloud.
    pub fn set_density(&mut self, count: usize) {
        let count = count.clamp(DENSITY_MIN, DENSITY_MAX);
        self.config.particles.density = count;
        self.engine.set_density(count);
    }

    pub fn set_pulsate(&mut self, intensity: f32) {
        self.engine.set_pulsate(intensity);
        self.config.particles.pulsate = self.engine.pulsate();
    }

    /// Signed speed, clamped to ±3; 0 disables auto-rotation.
    pub fn set_auto_rotate(&mut self, speed: f32) {
        if !speed.is_finite() {
            warn!(target: "particle_sculpt", "ignoring non-finite auto-rotate speed");
            return;
        }
        let speed = speed.clamp(-AUTO_ROTATE_LIMIT, AUTO_ROTATE_LIMIT);
        self.config.particles.auto_rotate = speed;
        self.engine.set_auto_rotate(speed);
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.config.particles.background = color;
    }

    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.config.bloom.enabled = enabled;
    }

    pub fn set_bloom_intensity(&mut self, intensity: f32) {
        if !intensity.is_finite() {
            warn!(target: "particle_sculpt", "ignoring non-finite bloom intensity");
            return;
        }
        self.config.bloom.intensity = intensity.clamp(0.0, BLOOM_INTENSITY_MAX);
    }

    /// A disabled hand reaches the mapper as "not detected".
    pub fn set_left_enabled(&mut self, enabled: bool) {
        self.config.hands.left_enabled = enabled;
    }

    pub fn set_right_enabled(&mut self, enabled: bool) {
        self.config.hands.right_enabled = enabled;
    }

    pub fn set_show_indicators(&mut self, show: bool) {
        self.config.hands.show_indicators = show;
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn config(&self) -> &SculptConfig { &self.config }

    pub fn engine(&self) -> &ParticleEngine { &self.engine }

    pub fn hands(&self) -> &TwoHandSnapshot { &self.hands }

    pub fn color_preset(&self) -> &'static ColorPreset { self.mapper.preset() }

    pub fn is_disposed(&self) -> bool { self.disposed }

    // ── teardown ─────────────────────────────────────────────────────────

    /// Stop hand tracking and release the particle buffers.  Every step
    /// runs even if an earlier one reported a problem; calling twice is
    /// harmless.
    pub fn dispose(&mut self) {
        if self.disposed { return; }
        if let Some(mut tracker) = self.tracker.take() {
            tracker.shutdown();
        }
        self.engine.dispose();
        self.hands = TwoHandSnapshot::idle(self.hands.initialized);
        self.disposed = true;
        debug!(target: "particle_sculpt", "sculpture disposed");
    }
}

impl Drop for Sculpture {
    fn drop(&mut self) { self.dispose(); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
