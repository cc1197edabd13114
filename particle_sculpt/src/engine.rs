//! Particle animation engine.
//!
//! Owns the live point buffers and animates them once per display frame:
//!
//! ```text
//!   base[i] ──+ jitter(t, i)──× scale──▶ rotate ──▶ current[i]
//!   glow(t, i) ──────────────────────────────────▶ colors[i]
//! ```
//!
//! Every control value is a [`Smoothed`] target/current pair; `update`
//! moves each current value a tenth of the way toward its target, so no
//! target change is ever visible instantly.
//!
//! | Parameter | Range | Notes |
//! |---|---|---|
//! | scale | 0.1 – 8 | clamped on set |
//! | rotation | radians | ignored while auto-rotate ≠ 0 |
//! | point size | 0.01 – 0.1 | pulsates ± `0.015 × pulsate` |
//! | opacity | 0 – 1 | |
//! | pulsate | 0 – 1 | not smoothed |
//! | auto-rotate | signed | `y += speed × 0.01` per frame |

use std::f32::consts::TAU;
use std::ops::{Add, Mul, Sub};
use std::time::Instant;

use glam::{EulerRot, Mat3, Vec3};
use point_templates::{generate_with, Shape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::color::Rgb;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Fraction of the remaining distance covered per frame.
pub const SMOOTHING: f32 = 0.1;

pub const SCALE_MIN: f32 = 0.1;
pub const SCALE_MAX: f32 = 8.0;
pub const SIZE_MIN:  f32 = 0.01;
pub const SIZE_MAX:  f32 = 0.1;

/// Default point size; the pulsation amplitude is half of it.
pub const BASE_SIZE: f32 = 0.03;

/// Per-axis positional wobble before scaling.
pub const JITTER_AMPLITUDE: f32 = 0.02;

/// Auto-rotate increment per frame per unit of speed, radians.
pub const AUTO_ROTATE_STEP: f32 = 0.01;

/// Breathing frequency of the point size, per millisecond.
pub const PULSE_RATE: f64 = 0.003;

/// Darkest glow multiplier; glow spans `GLOW_FLOOR ..= 1`.
pub const GLOW_FLOOR: f32 = 0.2;

// ════════════════════════════════════════════════════════════════════════════
// Smoothed
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothed<T> {
    pub current: T,
    pub target:  T,
}

impl<T> Smoothed<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    pub fn new(value: T) -> Self { Smoothed { current: value, target: value } }

    /// `current += (target − current) × k`; returns the new current value.
    pub fn step(&mut self, k: f32) -> T {
        self.current = self.current + (self.target - self.current) * k;
        self.current
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-particle motion
// ════════════════════════════════════════════════════════════════════════════

/// Random oscillator parameters for one particle, fixed for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleMotion {
    pub jitter_phase: Vec3,
    pub jitter_speed: Vec3,
    pub glow_phase:   f32,
    pub glow_speed:   f32,
}

impl ParticleMotion {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut phase = || rng.random::<f32>() * TAU;
        let jitter_phase = Vec3::new(phase(), phase(), phase());
        let jitter_speed = Vec3::new(
            rng.random_range(0.5..2.0),
            rng.random_range(0.5..2.0),
            rng.random_range(0.5..2.0),
        );
        ParticleMotion {
            jitter_phase,
            jitter_speed,
            glow_phase: rng.random::<f32>() * TAU,
            glow_speed: rng.random_range(0.8..2.6),
        }
    }

    /// Positional offset at time `t` seconds.
    #[inline]
    fn jitter(&self, t: f32) -> Vec3 {
        let a = self.jitter_speed * t + self.jitter_phase;
        Vec3::new(a.x.sin(), a.y.sin(), a.z.sin()) * JITTER_AMPLITUDE
    }

    /// Brightness multiplier at time `t` seconds, in `GLOW_FLOOR ..= 1`.
    #[inline]
    fn glow(&self, t: f32) -> f32 {
        let wave = ((t * self.glow_speed + self.glow_phase).sin() + 1.0) * 0.5;
        GLOW_FLOOR + wave * (1.0 - GLOW_FLOOR)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Display view
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Overlapping points brighten each other.
    Additive,
}

/// Everything the display surface needs to draw the cloud.  Borrowed from
/// the engine, so buffers are always index-aligned and complete.
#[derive(Clone, Copy, Debug)]
pub struct DisplayFrame<'a> {
    pub positions:        &'a [Vec3],
    /// Per-particle grayscale glow multiplier as RGB.
    pub colors:           &'a [Vec3],
    pub point_size:       f32,
    pub opacity:          f32,
    /// Material tint, 0–1 per channel.
    pub tint:             Vec3,
    pub blend:            BlendMode,
    pub depth_write:      bool,
    pub size_attenuation: bool,
}

impl<'a> DisplayFrame<'a> {
    /// Interleaved `x, y, z` floats.
    pub fn positions_flat(&self) -> &'a [f32] { bytemuck::cast_slice(self.positions) }

    /// Interleaved `r, g, b` floats.
    pub fn colors_flat(&self) -> &'a [f32] { bytemuck::cast_slice(self.colors) }

    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleEngine
// ════════════════════════════════════════════════════════════════════════════

pub struct ParticleEngine {
    // ── cloud ─────────────────────────────────────────────────────────────
    shape:    Shape,
    count:    usize,
    base:     Vec<Vec3>,
    current:  Vec<Vec3>,
    colors:   Vec<Vec3>,
    motion:   Vec<ParticleMotion>,

    // ── control values ───────────────────────────────────────────────────
    scale:    Smoothed<f32>,
    rotation: Smoothed<Vec3>,
    size:     Smoothed<f32>,
    opacity:  Smoothed<f32>,
    tint:     Smoothed<Vec3>,
    color:    Rgb,
    pulsate:  f32,
    auto_rotate: f32,

    // ── per-frame outputs ────────────────────────────────────────────────
    point_size: f32,
    last_ms:    f64,
    frames:     u64,

    rng:      StdRng,
    clock:    Instant,
    disposed: bool,
}

impl ParticleEngine {
    /// Build an engine with `count` particles on `shape`.
    pub fn create(shape: Shape, count: usize) -> Self {
        Self::from_rng(shape, count, StdRng::from_rng(&mut rand::rng()))
    }

    /// As [`create`](Self::create) with a fixed seed for templates and
    /// per-particle motion.
    pub fn with_seed(shape: Shape, count: usize, seed: u64) -> Self {
        Self::from_rng(shape, count, StdRng::seed_from_u64(seed))
    }

    fn from_rng(shape: Shape, count: usize, rng: StdRng) -> Self {
        let mut engine = ParticleEngine {
            shape,
            count,
            base:     Vec::new(),
            current:  Vec::new(),
            colors:   Vec::new(),
            motion:   Vec::new(),
            scale:    Smoothed::new(1.0),
            rotation: Smoothed::new(Vec3::ZERO),
            size:     Smoothed::new(BASE_SIZE),
            opacity:  Smoothed::new(0.9),
            tint:     Smoothed::new(Rgb::WHITE.to_vec3()),
            color:    Rgb::WHITE,
            pulsate:  0.0,
            auto_rotate: 0.0,
            point_size: BASE_SIZE,
            last_ms:  0.0,
            frames:   0,
            rng,
            clock:    Instant::now(),
            disposed: false,
        };
        engine.regenerate();
        engine
    }

    // ── template / density ───────────────────────────────────────────────

    pub fn shape(&self) -> Shape { self.shape }

    pub fn len(&self) -> usize { self.current.len() }

    pub fn is_empty(&self) -> bool { self.current.is_empty() }

    /// Swap the template.  Regenerates only if the shape changed.
    pub fn set_template(&mut self, shape: Shape) {
        if shape != self.shape || self.disposed {
            self.shape = shape;
            self.regenerate();
        }
    }

    /// Change the particle count.  Regenerates only if the count changed.
    pub fn set_density(&mut self, count: usize) {
        if count != self.count || self.disposed {
            self.count = count;
            self.regenerate();
        }
    }

    /// Replace base positions and every per-particle oscillator, then
    /// rebuild the current buffers at the last frame's time so the display
    /// never sees a half-updated cloud.
    pub fn regenerate(&mut self) {
        let base   = generate_with(self.shape, self.count, &mut self.rng).into_points();
        let motion = (0..base.len()).map(|_| ParticleMotion::random(&mut self.rng)).collect();

        self.base     = base;
        self.motion   = motion;
        self.current  = vec![Vec3::ZERO; self.base.len()];
        self.colors   = vec![Vec3::ONE;  self.base.len()];
        self.disposed = false;
        self.write_particles(self.last_ms);
        debug!(target: "particle_sculpt", shape = %self.shape, count = self.count, "cloud regenerated");
    }

    // ── targets ──────────────────────────────────────────────────────────

    pub fn set_target_scale(&mut self, scale: f32) {
        if finite("scale", scale) {
            self.scale.target = scale.clamp(SCALE_MIN, SCALE_MAX);
        }
    }

    pub fn set_target_rotation(&mut self, rotation: Vec3) {
        if rotation.is_finite() {
            self.rotation.target = rotation;
        } else {
            warn!(target: "particle_sculpt", ?rotation, "ignoring non-finite rotation target");
        }
    }

    pub fn set_size(&mut self, size: f32) {
        if finite("size", size) {
            self.size.target = size.clamp(SIZE_MIN, SIZE_MAX);
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        if finite("opacity", opacity) {
            self.opacity.target = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn set_pulsate(&mut self, intensity: f32) {
        if finite("pulsate", intensity) {
            self.pulsate = intensity.clamp(0.0, 1.0);
        }
    }

    /// Signed speed; 0 hands rotation back to the rotation target.
    pub fn set_auto_rotate(&mut self, speed: f32) {
        if finite("auto-rotate", speed) {
            self.auto_rotate = speed;
        }
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
        self.tint.target = color.to_vec3();
    }

    // ── current values ───────────────────────────────────────────────────

    pub fn scale(&self) -> f32 { self.scale.current }

    pub fn target_scale(&self) -> f32 { self.scale.target }

    pub fn rotation(&self) -> Vec3 { self.rotation.current }

    pub fn target_rotation(&self) -> Vec3 { self.rotation.target }

    pub fn point_size(&self) -> f32 { self.point_size }

    pub fn opacity(&self) -> f32 { self.opacity.current }

    pub fn color(&self) -> Rgb { self.color }

    pub fn pulsate(&self) -> f32 { self.pulsate }

    pub fn auto_rotate(&self) -> f32 { self.auto_rotate }

    pub fn frames(&self) -> u64 { self.frames }

    pub fn base_positions(&self) -> &[Vec3] { &self.base }

    pub fn positions(&self) -> &[Vec3] { &self.current }

    pub fn colors(&self) -> &[Vec3] { &self.colors }

    pub fn motion(&self) -> &[ParticleMotion] { &self.motion }

    pub fn is_disposed(&self) -> bool { self.disposed }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Advance one frame using the engine's own clock.
    pub fn update(&mut self) {
        let ms = self.clock.elapsed().as_secs_f64() * 1000.0;
        self.update_at(ms);
    }

    /// Advance one frame; `elapsed_ms` drives every oscillator.
    pub fn update_at(&mut self, elapsed_ms: f64) {
        if self.disposed { return; }
        if !elapsed_ms.is_finite() {
            warn!(target: "particle_sculpt", "ignoring non-finite frame time");
            return;
        }

        self.scale.step(SMOOTHING);
        if self.auto_rotate != 0.0 {
            self.rotation.current.y += self.auto_rotate * AUTO_ROTATE_STEP;
        } else {
            self.rotation.step(SMOOTHING);
        }
        self.size.step(SMOOTHING);
        self.opacity.step(SMOOTHING);
        self.tint.step(SMOOTHING);

        let pulse = (elapsed_ms * PULSE_RATE).sin() as f32;
        self.point_size = self.size.current + (BASE_SIZE * 0.5) * pulse * self.pulsate;

        self.write_particles(elapsed_ms);
        self.last_ms = elapsed_ms;
        self.frames += 1;
    }

    /// Recompute current positions and glow colors at `elapsed_ms`.
    fn write_particles(&mut self, elapsed_ms: f64) {
        let t      = (elapsed_ms * 0.001) as f32;
        let scale  = self.scale.current;
        let r      = self.rotation.current;
        let rotate = Mat3::from_euler(EulerRot::XYZ, r.x, r.y, r.z);

        let particles = self.base.iter().zip(&self.motion);
        for ((out, color), (base, m)) in self.current.iter_mut().zip(self.colors.iter_mut()).zip(particles) {
            *out   = rotate * ((*base + m.jitter(t)) * scale);
            *color = Vec3::splat(m.glow(t));
        }
    }

    /// The cloud as the display surface should draw it.
    pub fn frame(&self) -> DisplayFrame<'_> {
        DisplayFrame {
            positions:        &self.current,
            colors:           &self.colors,
            point_size:       self.point_size,
            opacity:          self.opacity.current,
            tint:             self.tint.current,
            blend:            BlendMode::Additive,
            depth_write:      false,
            size_attenuation: true,
        }
    }

    /// Release the buffers.  Further updates are no-ops until the next
    /// template or density change.
    pub fn dispose(&mut self) {
        if self.disposed { return; }
        self.base    = Vec::new();
        self.current = Vec::new();
        self.colors  = Vec::new();
        self.motion  = Vec::new();
        self.disposed = true;
        debug!(target: "particle_sculpt", "particle buffers released");
    }
}

fn finite(what: &str, value: f32) -> bool {
    if value.is_finite() { return true; }
    warn!(target: "particle_sculpt", "ignoring non-finite {what} value {value}");
    false
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(count: usize) -> ParticleEngine {
        ParticleEngine::with_seed(Shape::Sphere, count, 42)
    }

    fn close(a: f32, b: f32, tol: f32) -> bool { (a - b).abs() <= tol }

    #[test]
    fn scale_follows_first_order_filter() {
        let mut e = engine(10);
        e.set_target_scale(5.0);
        for k in 1..=30 {
            e.update_at(k as f64 * 16.0);
            let expected = 5.0 - (5.0 - 1.0) * 0.9f32.powi(k);
            assert!(close(e.scale(), expected, 1e-4), "frame {k}: {} vs {expected}", e.scale());
        }
    }

    #[test]
    fn rotation_follows_first_order_filter_per_axis() {
        let mut e = engine(10);
        let target = Vec3::new(0.5, -1.0, 2.0);
        e.set_target_rotation(target);
        for k in 1..=20 {
            e.update_at(k as f64 * 16.0);
            let expected = target - target * 0.9f32.powi(k);
            assert!(e.rotation().abs_diff_eq(expected, 1e-4), "frame {k}");
        }
    }

    #[test]
    fn auto_rotate_overrides_rotation_target() {
        let mut e = engine(10);
        e.set_auto_rotate(2.0);
        e.set_target_rotation(Vec3::new(1.0, 1.0, 1.0));
        for _ in 0..10 { e.update_at(0.0); }
        let r = e.rotation();
        assert_eq!(r.x, 0.0);
        assert_eq!(r.z, 0.0);
        assert!(close(r.y, 10.0 * 2.0 * AUTO_ROTATE_STEP, 1e-5));

        // Turning auto-rotate off resumes smoothing toward the target.
        e.set_auto_rotate(0.0);
        e.update_at(0.0);
        assert!(e.rotation().x > 0.0);
    }

    #[test]
    fn setters_clamp_and_ignore_non_finite() {
        let mut e = engine(10);
        e.set_target_scale(100.0);
        assert_eq!(e.target_scale(), SCALE_MAX);
        e.set_target_scale(-3.0);
        assert_eq!(e.target_scale(), SCALE_MIN);
        e.set_target_scale(f32::NAN);
        assert_eq!(e.target_scale(), SCALE_MIN);

        e.set_size(1.0);
        e.set_opacity(-1.0);
        e.set_pulsate(4.0);
        e.set_auto_rotate(f32::INFINITY);
        e.set_target_rotation(Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(e.size.target, SIZE_MAX);
        assert_eq!(e.opacity.target, 0.0);
        assert_eq!(e.pulsate(), 1.0);
        assert_eq!(e.auto_rotate(), 0.0);
        assert_eq!(e.target_rotation(), Vec3::ZERO);
    }

    #[test]
    fn point_size_breathes_with_pulsate() {
        let mut e = engine(10);
        // sin(ms × 0.003) peaks at ms = π / 0.006.
        let peak = std::f64::consts::PI / (2.0 * PULSE_RATE);
        e.update_at(peak);
        assert!(close(e.point_size(), BASE_SIZE, 1e-6));

        e.set_pulsate(1.0);
        e.update_at(peak);
        assert!(close(e.point_size(), BASE_SIZE * 1.5, 1e-5));
    }

    #[test]
    fn positions_stay_within_jitter_of_scaled_base() {
        let mut e = engine(500);
        e.update_at(1234.0);
        let bound = JITTER_AMPLITUDE * 3f32.sqrt() + 1e-5;
        for (cur, base) in e.positions().iter().zip(e.base_positions()) {
            assert!(cur.distance(*base) <= bound);
        }
        for c in e.colors() {
            assert!(c.x >= GLOW_FLOOR - 1e-6 && c.x <= 1.0 + 1e-6);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }

    #[test]
    fn rotation_is_applied_after_scaling() {
        let mut e = engine(200);
        e.scale = Smoothed::new(2.0);
        e.rotation = Smoothed::new(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        e.update_at(0.0);
        let rot = Mat3::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let bound = 2.0 * JITTER_AMPLITUDE * 3f32.sqrt() + 1e-4;
        for (cur, base) in e.positions().iter().zip(e.base_positions()) {
            assert!(cur.distance(rot * (*base * 2.0)) <= bound);
        }
    }

    #[test]
    fn regeneration_replaces_buffers_and_motion() {
        let mut e = engine(1000);
        let old_motion = e.motion().to_vec();

        e.set_density(2500);
        assert_eq!(e.len(), 2500);
        assert_eq!(e.base_positions().len(), 2500);
        assert_eq!(e.colors().len(), 2500);
        assert_eq!(e.motion().len(), 2500);
        assert_eq!(e.frame().positions_flat().len(), 3 * 2500);

        e.set_template(Shape::Torus);
        assert_eq!(e.len(), 2500);
        let new_motion = e.motion();
        assert_ne!(&old_motion[..], &new_motion[..1000]);

        // Fresh phases are still uniform on 0..2π.
        let mean = new_motion.iter().map(|m| m.glow_phase).sum::<f32>() / new_motion.len() as f32;
        assert!(close(mean, std::f32::consts::PI, 0.15));
        assert!(new_motion.iter().all(|m| (0.8..2.6).contains(&m.glow_speed)));
    }

    #[test]
    fn unchanged_template_keeps_motion() {
        let mut e = engine(100);
        let before = e.motion().to_vec();
        e.set_template(Shape::Sphere);
        e.set_density(100);
        e.set_target_scale(3.0);
        e.update_at(16.0);
        assert_eq!(e.motion(), &before[..]);
    }

    #[test]
    fn frame_describes_additive_points() {
        let e = engine(10);
        let f = e.frame();
        assert_eq!(f.blend, BlendMode::Additive);
        assert!(!f.depth_write);
        assert!(f.size_attenuation);
        assert_eq!(f.len(), 10);
        assert_eq!(f.colors_flat().len(), 30);
    }

    #[test]
    fn tint_and_opacity_ease_toward_targets() {
        let mut e = engine(10);
        e.set_color(Rgb::BLACK);
        e.set_opacity(0.0);
        e.update_at(16.0);
        assert!(close(e.frame().tint.x, 0.9, 1e-5));
        assert!(close(e.opacity(), 0.81, 1e-5));
        assert_eq!(e.color(), Rgb::BLACK);
    }

    #[test]
    fn dispose_releases_and_template_change_revives() {
        let mut e = engine(50);
        e.dispose();
        e.dispose();
        assert!(e.is_disposed());
        assert!(e.frame().is_empty());
        e.update_at(16.0);
        assert_eq!(e.frames(), 0);

        e.set_template(Shape::Galaxy);
        assert_eq!(e.len(), 50);
        assert!(!e.is_disposed());
    }

    #[test]
    fn zero_particles_is_fine() {
        let mut e = engine(0);
        e.update_at(16.0);
        assert!(e.frame().is_empty());
    }
}
