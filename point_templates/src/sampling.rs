//! Small sampling helpers shared by the shape generators.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

/// Uniform in `[0, 1)`.
#[inline]
pub(crate) fn unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>()
}

/// Uniform in `[-width/2, width/2)`.
#[inline]
pub(crate) fn centred<R: Rng + ?Sized>(rng: &mut R, width: f32) -> f32 {
    (unit(rng) - 0.5) * width
}

/// Uniform angle in `[0, 2π)`.
#[inline]
pub(crate) fn angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    unit(rng) * TAU
}

/// Uniform point on a sphere surface of radius `r`.
///
/// Latitude comes from `acos(2u − 1)` so the poles are not over-sampled.
pub(crate) fn sphere_surface<R: Rng + ?Sized>(rng: &mut R, r: f32) -> Vec3 {
    let phi   = (2.0 * unit(rng) - 1.0).clamp(-1.0, 1.0).acos();
    let theta = angle(rng);
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Random offset of magnitude `±thickness/2` in a random direction of the
/// XZ plane, plus an independent vertical offset of the same width.
pub(crate) fn tube_jitter<R: Rng + ?Sized>(rng: &mut R, thickness: f32) -> Vec3 {
    let offset = centred(rng, thickness);
    let dir    = angle(rng);
    let dy     = centred(rng, thickness);
    Vec3::new(offset * dir.cos(), dy, offset * dir.sin())
}
