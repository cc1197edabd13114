//! TOML configuration.
//!
//! ```toml
//! [particles]
//! template = "galaxy"
//! color = "#66ffcc"
//! density = 20000
//!
//! [bloom]
//! intensity = 2.0
//!
//! [hands]
//! show_indicators = false
//!
//! [tracking]
//! mirrored = false
//! ```
//!
//! Every key is optional.  Out-of-range values are clamped, never rejected.
//! The core only reads configuration; nothing is written back.

use std::fs;
use std::path::Path;
use std::time::Duration;

use hand_gesture::TrackingConfig;
use point_templates::Shape;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::color::Rgb;
use crate::engine::{SIZE_MAX, SIZE_MIN};
use crate::error::ConfigError;

pub const DENSITY_MIN: usize = 5_000;
pub const DENSITY_MAX: usize = 25_000;
pub const AUTO_ROTATE_LIMIT: f32 = 3.0;
pub const BLOOM_INTENSITY_MAX: f32 = 3.0;

// ════════════════════════════════════════════════════════════════════════════
// [particles]
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    #[serde(default, with = "shape_id")]
    pub template:    Shape,
    #[serde(default)]
    pub color:       Rgb,
    #[serde(default = "ParticleConfig::default_size")]
    pub size:        f32,
    #[serde(default = "ParticleConfig::default_opacity")]
    pub opacity:     f32,
    #[serde(default = "ParticleConfig::default_density")]
    pub density:     usize,
    #[serde(default)]
    pub pulsate:     f32,
    #[serde(default)]
    pub auto_rotate: f32,
    #[serde(default = "ParticleConfig::default_background")]
    pub background:  Rgb,
}

impl ParticleConfig {
    fn default_size() -> f32 {
        0.03
    }
    fn default_opacity() -> f32 {
        0.8
    }
    fn default_density() -> usize {
        15_000
    }
    fn default_background() -> Rgb {
        Rgb::from_hex(0x0a0a0a)
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            template:    Shape::default(),
            color:       Rgb::WHITE,
            size:        Self::default_size(),
            opacity:     Self::default_opacity(),
            density:     Self::default_density(),
            pulsate:     0.0,
            auto_rotate: 0.0,
            background:  Self::default_background(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// [bloom]
// ════════════════════════════════════════════════════════════════════════════

/// Glow post-effect settings.  Computed by the display layer; carried here
/// so the control surface has one place to set them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomSettings {
    #[serde(default = "BloomSettings::default_enabled")]
    pub enabled:   bool,
    #[serde(default = "BloomSettings::default_intensity")]
    pub intensity: f32,
    #[serde(default = "BloomSettings::default_radius")]
    pub radius:    f32,
    #[serde(default = "BloomSettings::default_threshold")]
    pub threshold: f32,
}

impl BloomSettings {
    fn default_enabled() -> bool {
        true
    }
    fn default_intensity() -> f32 {
        1.5
    }
    fn default_radius() -> f32 {
        0.6
    }
    fn default_threshold() -> f32 {
        0.7
    }

    /// Intensity the display should apply: 0 while disabled.
    pub fn effective_intensity(&self) -> f32 {
        if self.enabled { self.intensity } else { 0.0 }
    }
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled:   Self::default_enabled(),
            intensity: Self::default_intensity(),
            radius:    Self::default_radius(),
            threshold: Self::default_threshold(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// [hands]
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandsConfig {
    #[serde(default = "HandsConfig::default_enabled")]
    pub left_enabled:    bool,
    #[serde(default = "HandsConfig::default_enabled")]
    pub right_enabled:   bool,
    #[serde(default = "HandsConfig::default_enabled")]
    pub show_indicators: bool,
}

impl HandsConfig {
    fn default_enabled() -> bool {
        true
    }
}

impl Default for HandsConfig {
    fn default() -> Self {
        Self { left_enabled: true, right_enabled: true, show_indicators: true }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// [tracking]
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSection {
    #[serde(default = "TrackingSection::default_max_hands")]
    pub max_hands:                usize,
    #[serde(default = "TrackingSection::default_confidence")]
    pub min_detection_confidence: f32,
    /// Passed through to the front end's detector.
    #[serde(default = "TrackingSection::default_confidence")]
    pub min_tracking_confidence:  f32,
    #[serde(default = "TrackingSection::default_mirrored")]
    pub mirrored:                 bool,
    #[serde(default = "TrackingSection::default_retry_ms")]
    pub init_retry_interval_ms:   u64,
    #[serde(default = "TrackingSection::default_max_attempts")]
    pub max_init_attempts:        u32,
    #[serde(default = "TrackingSection::default_poll_ms")]
    pub poll_timeout_ms:          u64,
}

impl TrackingSection {
    fn default_max_hands() -> usize {
        2
    }
    fn default_confidence() -> f32 {
        0.3
    }
    fn default_mirrored() -> bool {
        true
    }
    fn default_retry_ms() -> u64 {
        100
    }
    fn default_max_attempts() -> u32 {
        50
    }
    fn default_poll_ms() -> u64 {
        100
    }

    pub fn to_tracking_config(&self) -> TrackingConfig {
        TrackingConfig {
            max_hands:                self.max_hands,
            min_detection_confidence: self.min_detection_confidence,
            min_tracking_confidence:  self.min_tracking_confidence,
            mirrored:                 self.mirrored,
            init_retry_interval:      Duration::from_millis(self.init_retry_interval_ms),
            max_init_attempts:        self.max_init_attempts,
            poll_timeout:             Duration::from_millis(self.poll_timeout_ms),
        }
    }
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            max_hands:                Self::default_max_hands(),
            min_detection_confidence: Self::default_confidence(),
            min_tracking_confidence:  Self::default_confidence(),
            mirrored:                 Self::default_mirrored(),
            init_retry_interval_ms:   Self::default_retry_ms(),
            max_init_attempts:        Self::default_max_attempts(),
            poll_timeout_ms:          Self::default_poll_ms(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SculptConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SculptConfig {
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub bloom:     BloomSettings,
    #[serde(default)]
    pub hands:     HandsConfig,
    #[serde(default)]
    pub tracking:  TrackingSection,
}

impl SculptConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SculptConfig = toml::from_str(text)?;
        Ok(cfg.clamped())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if it exists; fall back to defaults on any problem.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(target: "particle_sculpt", "no config at {}; using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(target: "particle_sculpt", "{err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Bring every value into its documented range.  Non-finite floats fall
    /// back to their defaults.
    pub fn clamped(mut self) -> Self {
        let d = SculptConfig::default();
        let p = &mut self.particles;
        p.size        = or_default(p.size, d.particles.size).clamp(SIZE_MIN, SIZE_MAX);
        p.opacity     = or_default(p.opacity, d.particles.opacity).clamp(0.0, 1.0);
        p.density     = p.density.clamp(DENSITY_MIN, DENSITY_MAX);
        p.pulsate     = or_default(p.pulsate, 0.0).clamp(0.0, 1.0);
        p.auto_rotate = or_default(p.auto_rotate, 0.0).clamp(-AUTO_ROTATE_LIMIT, AUTO_ROTATE_LIMIT);

        let b = &mut self.bloom;
        b.intensity = or_default(b.intensity, d.bloom.intensity).clamp(0.0, BLOOM_INTENSITY_MAX);
        b.radius    = or_default(b.radius, d.bloom.radius).max(0.0);
        b.threshold = or_default(b.threshold, d.bloom.threshold).clamp(0.0, 1.0);

        let t = &mut self.tracking;
        t.max_hands                = t.max_hands.clamp(1, 2);
        t.min_detection_confidence = or_default(t.min_detection_confidence, 0.3).clamp(0.0, 1.0);
        t.min_tracking_confidence  = or_default(t.min_tracking_confidence, 0.3).clamp(0.0, 1.0);
        t.max_init_attempts        = t.max_init_attempts.max(1);
        self
    }
}

fn or_default(value: f32, default: f32) -> f32 {
    if value.is_finite() { value } else { default }
}

/// Shapes are written by id (`"sphere"`, `"dna"`, …).
mod shape_id {
    use point_templates::Shape;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(shape: &Shape, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(shape.id())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Shape, D::Error> {
        let id = String::deserialize(d)?;
        id.parse().map_err(de::Error::custom)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
