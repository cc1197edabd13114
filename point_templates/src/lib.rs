//! # point_templates
//!
//! Procedural point distributions used to seed a particle sculpture.
//!
//! Every template is a pure function of `(shape, count)` plus a random
//! source: the same inputs give statistically identical clouds, never
//! bit-identical ones.  All clouds are centred on the origin.
//!
//! ## Shapes
//!
//! | Id | Sampling |
//! |---|---|
//! | `sphere` | uniform surface, `phi = acos(2u − 1)` latitude |
//! | `torus` | two uniform angles through the torus parametrics |
//! | `helix` | evenly spaced along 3 coils, radial + vertical noise |
//! | `dna` | 60 % two phase-offset strands, 40 % base-pair bars |
//! | `galaxy` | 3 spiral arms, radius `u^0.7` biased toward the core |
//! | `star` | 10 alternating outer/inner spokes of a 5-point star |
//! | `saturn` | 60 % sphere core, 40 % thin annulus ring |
//! | `cube` | uniform volume (auxiliary) |
//! | `pyramid` | volume, cube-root height for uniform density (auxiliary) |
//!
//! ## Quick start
//!
//! ```rust
//! use point_templates::{Shape, generate};
//!
//! let cloud = generate(Shape::Galaxy, 10_000);
//! assert_eq!(cloud.len(), 10_000);
//! ```

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rand::Rng;

mod sampling;
pub mod shapes;

// ════════════════════════════════════════════════════════════════════════════
// Shape — the fixed set of template identifiers
// ════════════════════════════════════════════════════════════════════════════

/// A template identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    Torus,
    Helix,
    Dna,
    Galaxy,
    Star,
    Saturn,
    Cube,
    Pyramid,
}

impl Shape {
    /// Every shape, selectable ones first.
    pub fn all() -> [Shape; 9] {
        [
            Shape::Sphere, Shape::Torus,  Shape::Helix,
            Shape::Dna,    Shape::Galaxy, Shape::Star,
            Shape::Saturn, Shape::Cube,   Shape::Pyramid,
        ]
    }

    /// Shapes offered on the control surface.  Cube and pyramid are kept
    /// as auxiliary templates and are not listed here.
    pub fn selectable() -> [Shape; 7] {
        [
            Shape::Sphere, Shape::Torus,  Shape::Helix,
            Shape::Dna,    Shape::Galaxy, Shape::Star,
            Shape::Saturn,
        ]
    }

    /// Stable lowercase identifier (`"sphere"`, `"dna"`, …).
    pub fn id(self) -> &'static str {
        match self {
            Shape::Sphere  => "sphere",
            Shape::Torus   => "torus",
            Shape::Helix   => "helix",
            Shape::Dna     => "dna",
            Shape::Galaxy  => "galaxy",
            Shape::Star    => "star",
            Shape::Saturn  => "saturn",
            Shape::Cube    => "cube",
            Shape::Pyramid => "pyramid",
        }
    }

    pub fn is_selectable(self) -> bool {
        !matches!(self, Shape::Cube | Shape::Pyramid)
    }
}

impl Default for Shape {
    fn default() -> Self { Shape::Sphere }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned by [`Shape::from_str`] for an unknown identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownShape(pub String);

impl fmt::Display for UnknownShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown template id \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownShape {}

impl FromStr for Shape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Shape::all()
            .into_iter()
            .find(|shape| shape.id() == wanted)
            .ok_or_else(|| UnknownShape(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointCloud
// ════════════════════════════════════════════════════════════════════════════

/// An ordered, fixed-length sequence of 3-D points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Vec3>,
}

impl PointCloud {
    pub fn from_points(points: Vec<Vec3>) -> Self {
        PointCloud { points }
    }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    pub fn points(&self) -> &[Vec3] { &self.points }

    pub fn into_points(self) -> Vec<Vec3> { self.points }

    /// Interleaved `x, y, z` view, `3 × len()` floats.
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }

    /// Mean of `|p|²` over the cloud; 0 for an empty cloud.
    pub fn mean_squared_radius(&self) -> f32 {
        if self.points.is_empty() { return 0.0; }
        let sum: f64 = self.points.iter().map(|p| p.length_squared() as f64).sum();
        (sum / self.points.len() as f64) as f32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Entry points
// ════════════════════════════════════════════════════════════════════════════

/// Generate `count` points for `shape` using the thread-local RNG.
pub fn generate(shape: Shape, count: usize) -> PointCloud {
    generate_with(shape, count, &mut rand::rng())
}

/// Generate `count` points for `shape` from the given random source.
///
/// Always returns exactly `count` points; `count == 0` gives an empty cloud.
pub fn generate_with<R: Rng + ?Sized>(shape: Shape, count: usize, rng: &mut R) -> PointCloud {
    let points = match shape {
        Shape::Sphere  => shapes::sphere(count, rng),
        Shape::Torus   => shapes::torus(count, rng),
        Shape::Helix   => shapes::helix(count, rng),
        Shape::Dna     => shapes::dna(count, rng),
        Shape::Galaxy  => shapes::galaxy(count, rng),
        Shape::Star    => shapes::star(count, rng),
        Shape::Saturn  => shapes::saturn(count, rng),
        Shape::Cube    => shapes::cube(count, rng),
        Shape::Pyramid => shapes::pyramid(count, rng),
    };
    debug_assert_eq!(points.len(), count);
    PointCloud { points }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
