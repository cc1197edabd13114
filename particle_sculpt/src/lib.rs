//! # particle_sculpt
//!
//! A point-cloud sculpture steered by two hands.
//!
//! | Hand | Control |
//! |---|---|
//! | right, open ↔ closed | scale (`openness × 6`) |
//! | both, apart ↔ together | scale (distance blended with right openness) |
//! | right, wrist turn | rotation |
//! | left, pinch | next color preset |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use particle_sculpt::{Sculpture, SculptConfig};
//! use hand_gesture::SimLandmarkSource;
//!
//! let mut sculpture = Sculpture::create(SculptConfig::load_or_default("sculpt.toml"));
//! sculpture.attach_tracker(SimLandmarkSource::demo());
//! loop {
//!     let frame = sculpture.frame();
//!     // upload frame.particles.positions_flat() / colors_flat(), draw …
//!     # let _ = frame; break;
//! }
//! ```

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod mapper;
pub mod scene;

pub use color::{ColorPreset, Rgb, PRESETS};
pub use config::{BloomSettings, HandsConfig, ParticleConfig, SculptConfig, TrackingSection};
pub use engine::{BlendMode, DisplayFrame, ParticleEngine, ParticleMotion, Smoothed};
pub use error::ConfigError;
pub use indicator::{HandIndicators, HandMarker};
pub use mapper::{ControlMapper, ControlUpdate};
pub use scene::{SceneFrame, Sculpture};

pub use point_templates::Shape;
