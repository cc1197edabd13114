//! Per-shape generators.
//!
//! Each function returns exactly `count` points.  Dimensions are chosen so
//! every template fits roughly inside a radius-3 ball at unit scale.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::sampling::{angle, centred, sphere_surface, tube_jitter, unit};

// ════════════════════════════════════════════════════════════════════════════
// Dimensions
// ════════════════════════════════════════════════════════════════════════════

pub const SPHERE_RADIUS: f32 = 2.0;

pub const CUBE_HALF_EXTENT: f32 = 2.0;

pub const PYRAMID_BASE_HALF: f32 = 2.0;
pub const PYRAMID_HEIGHT:    f32 = 3.0;

pub const TORUS_MAJOR: f32 = 2.0;
pub const TORUS_MINOR: f32 = 0.8;

pub const HELIX_RADIUS: f32 = 1.5;
pub const HELIX_HEIGHT: f32 = 4.0;
pub const HELIX_COILS:  f32 = 3.0;
pub const HELIX_NOISE:  f32 = 0.3;

pub const DNA_RADIUS:           f32   = 1.2;
pub const DNA_HEIGHT:           f32   = 4.0;
pub const DNA_COILS:            usize = 2;
pub const DNA_STRAND_THICKNESS: f32   = 0.15;
pub const DNA_BAR_THICKNESS:    f32   = 0.12;
pub const DNA_BARS_PER_COIL:    usize = 8;

pub const GALAXY_ARMS:        usize = 3;
pub const GALAXY_ARM_SPREAD:  f32   = 0.5;
pub const GALAXY_MAX_RADIUS:  f32   = 3.0;
pub const GALAXY_BIAS:        f32   = 0.7;
pub const GALAXY_THICKNESS:   f32   = 0.3;

pub const STAR_POINTS:       usize = 5;
pub const STAR_OUTER_RADIUS: f32   = 2.5;
pub const STAR_INNER_RADIUS: f32   = 1.0;
pub const STAR_THICKNESS:    f32   = 0.3;

pub const SATURN_CORE_RADIUS: f32 = 1.5;
pub const SATURN_RING_INNER:  f32 = 2.0;
pub const SATURN_RING_OUTER:  f32 = 3.0;
pub const SATURN_RING_HEIGHT: f32 = 0.1;

/// Share of points given to the primary part of composite shapes
/// (DNA strands, Saturn core).
const PRIMARY_SHARE_NUM: usize = 6;
const PRIMARY_SHARE_DEN: usize = 10;

fn primary_count(count: usize) -> usize {
    count * PRIMARY_SHARE_NUM / PRIMARY_SHARE_DEN
}

// ════════════════════════════════════════════════════════════════════════════
// Solids and surfaces
// ════════════════════════════════════════════════════════════════════════════

pub fn sphere<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count).map(|_| sphere_surface(rng, SPHERE_RADIUS)).collect()
}

pub fn cube<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let w = CUBE_HALF_EXTENT * 2.0;
    (0..count)
        .map(|_| Vec3::new(centred(rng, w), centred(rng, w), centred(rng, w)))
        .collect()
}

/// Square pyramid, apex up.  The cross-section shrinks by `(1 − t)^(1/3)`
/// with height fraction `t`.
pub fn pyramid<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let w = PYRAMID_BASE_HALF * 2.0;
    (0..count)
        .map(|_| {
            let t     = unit(rng);
            let u     = unit(rng);
            let v     = unit(rng);
            let scale = (1.0 - t).cbrt();
            Vec3::new(
                (u - 0.5) * w * scale,
                t * PYRAMID_HEIGHT - PYRAMID_HEIGHT / 2.0,
                (v - 0.5) * w * scale,
            )
        })
        .collect()
}

pub fn torus<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let u    = angle(rng);
            let v    = angle(rng);
            let ring = TORUS_MAJOR + TORUS_MINOR * v.cos();
            Vec3::new(ring * u.cos(), TORUS_MINOR * v.sin(), ring * u.sin())
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Curves
// ════════════════════════════════════════════════════════════════════════════

/// Points evenly parameterised along the coil, each nudged radially and
/// vertically.
pub fn helix<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let t     = i as f32 / count as f32;
            let theta = t * TAU * HELIX_COILS;
            let y     = (t - 0.5) * HELIX_HEIGHT;
            let r     = HELIX_RADIUS + centred(rng, HELIX_NOISE);
            let y     = y + centred(rng, HELIX_NOISE);
            Vec3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

/// Double helix with base-pair bars.
///
/// Strand points alternate between the two strands (π apart).  Bar points
/// pick one of `coils × 8` rungs and interpolate across the axis between
/// the two strand positions at that height.
pub fn dna<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let strand_count = primary_count(count);
    let bar_count    = count - strand_count;
    let coils        = DNA_COILS as f32;
    let steps        = (strand_count / 2).max(1) as f32;

    let mut out = Vec::with_capacity(count);

    for i in 0..strand_count {
        let strand = (i % 2) as f32;
        let t      = (i / 2) as f32 / steps;
        let theta  = t * TAU * coils + strand * PI;
        let y      = (t - 0.5) * DNA_HEIGHT;
        let centre = Vec3::new(DNA_RADIUS * theta.cos(), y, DNA_RADIUS * theta.sin());
        out.push(centre + tube_jitter(rng, DNA_STRAND_THICKNESS));
    }

    let total_bars = DNA_COILS * DNA_BARS_PER_COIL;
    for _ in 0..bar_count {
        let bar   = rng.random_range(0..total_bars);
        let t     = bar as f32 / total_bars as f32;
        let theta = t * TAU * coils;
        let y     = (t - 0.5) * DNA_HEIGHT;

        let a = Vec3::new(DNA_RADIUS * theta.cos(), y, DNA_RADIUS * theta.sin());
        let b = Vec3::new(DNA_RADIUS * (theta + PI).cos(), y, DNA_RADIUS * (theta + PI).sin());
        let along = unit(rng);
        out.push(a.lerp(b, along) + tube_jitter(rng, DNA_BAR_THICKNESS));
    }

    out
}

/// Spiral galaxy.  Radius fraction is `u^0.7`, which concentrates points
/// toward the core; each arm winds two full turns from centre to rim.
pub fn galaxy<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let arms = GALAXY_ARMS as f32;
    (0..count)
        .map(|i| {
            let arm    = (i % GALAXY_ARMS) as f32;
            let t      = unit(rng).powf(GALAXY_BIAS);
            let theta  = (arm / arms) * TAU + t * 2.0 * TAU;
            let radius = t * GALAXY_MAX_RADIUS;

            let spread = centred(rng, GALAXY_ARM_SPREAD) * radius;
            let y      = centred(rng, GALAXY_THICKNESS) * radius;
            let r      = radius + spread;
            Vec3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

/// Five-point star lying in the XZ plane.  Each point picks one of the ten
/// alternating outer/inner spokes and a uniform distance along it.
pub fn star<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let spokes = STAR_POINTS * 2;
    (0..count)
        .map(|_| {
            let spoke  = rng.random_range(0..spokes);
            let limit  = if spoke % 2 == 0 { STAR_OUTER_RADIUS } else { STAR_INNER_RADIUS };
            let theta  = spoke as f32 / spokes as f32 * TAU;
            let r      = limit * unit(rng);
            let y      = centred(rng, STAR_THICKNESS);
            Vec3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

/// Sphere core plus a flat ring.
pub fn saturn<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec3> {
    let core_count = primary_count(count);
    let mut out = Vec::with_capacity(count);

    for _ in 0..core_count {
        out.push(sphere_surface(rng, SATURN_CORE_RADIUS));
    }
    for _ in core_count..count {
        let theta = angle(rng);
        let r     = SATURN_RING_INNER + unit(rng) * (SATURN_RING_OUTER - SATURN_RING_INNER);
        let y     = centred(rng, SATURN_RING_HEIGHT);
        out.push(Vec3::new(r * theta.cos(), y, r * theta.sin()));
    }

    out
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
