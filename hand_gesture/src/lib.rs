//! # hand_gesture
//!
//! Turns raw hand landmarks (21 points per hand, normalised image space)
//! into semantic control signals for an interactive particle sculpture.
//!
//! ## Pipeline
//!
//! ```text
//! LandmarkSource ──frames──▶ HandAggregator ──TwoHandSnapshot──▶ Mailbox ──▶ frame loop
//!  (own thread)               (classify + slot by hand)         (latest wins)
//! ```
//!
//! ## Signals per hand
//!
//! | Signal | Derived from |
//! |---|---|
//! | openness 0–1 | wrist → five fingertip distances, `clamp(sum/2.5 − 0.3)` |
//! | position | wrist, remapped to centred scene space |
//! | rotation | index-MCP − pinky-MCP and middle-MCP − wrist, `atan2` heuristic |
//! | pinch | thumb tip ↔ index tip closer than 0.05 |
//! | thumbs-up / peace | tip vs. MCP heights |
//!
//! ## Providers
//!
//! * [`SimLandmarkSource`]: scripted synthetic hands, no hardware needed.
//! * [`ChannelSource`]: a front end that owns the real detector pushes
//!   its callback results through a channel.
//! * `LeapLandmarkSource`: LeapMotion joints via LeapC (`leap` feature).

pub mod landmarks;
pub mod classify;
pub mod state;
pub mod aggregator;
pub mod mailbox;
pub mod tracker;
pub mod synthetic;
pub mod sim;

#[cfg(feature = "leap")]
pub mod leap;

pub use aggregator::{HandAggregator, LandmarkFrame, DetectedHand, TrackerState, TrackingConfig};
pub use classify::{classify, Gesture};
pub use landmarks::{HandLandmarks, LANDMARK_COUNT};
pub use mailbox::Mailbox;
pub use sim::{SimLandmarkSource, SimKeyframe};
pub use state::{HandState, Handedness, TwoHandSnapshot};
pub use synthetic::{HandPose, synthetic_hand};
pub use tracker::{
    ChannelSource, FrameSink, HandTracker, LandmarkSource, ProviderError, ProviderMessage,
};

#[cfg(feature = "leap")]
pub use leap::LeapLandmarkSource;
