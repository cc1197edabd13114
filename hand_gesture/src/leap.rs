//! LeapMotion landmark provider (feature = "leap").
//!
//! Requires the LeapC shared library.  Leap reports true handedness, not a
//! selfie-mirrored label, so run it with `TrackingConfig { mirrored: false, .. }`.

use glam::Vec3;
use leaprs::*;
use tracing::{debug, info};

use crate::aggregator::{DetectedHand, LandmarkFrame};
use crate::landmarks::LANDMARK_COUNT;
use crate::state::Handedness;
use crate::tracker::{FrameSink, LandmarkSource, ProviderError};

/// Interaction box mapped onto the normalised 0–1 image square, mm.
const BOX_WIDTH:  f32 = 400.0;
/// Height above the device that maps to the bottom of the image, mm.
const BOX_FLOOR:  f32 = 50.0;

/// Landmark provider backed by a LeapMotion controller.
pub struct LeapLandmarkSource;

impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, mut sink: FrameSink) {
        let connection = sink.open_with_retry(|| {
            let mut connection = Connection::create(ConnectionConfig::default())
                .map_err(|e| ProviderError::Backend(format!("LeapC connection: {e:?}")))?;
            connection.open()
                .map_err(|e| ProviderError::Unavailable(format!("LeapMotion device: {e:?}")))?;
            Ok(connection)
        });
        let Some(mut connection) = connection else {
            sink.report_close(Ok(()));
            return;
        };
        info!(target: "hand_gesture", "LeapMotion connected");

        let timeout_ms = sink.poll_timeout().as_millis().min(u32::MAX as u128) as u32;
        loop {
            if sink.is_stopped() { break; }
            let msg = match connection.poll(timeout_ms) {
                Ok(m)  => m,
                Err(e) => {
                    debug!(target: "hand_gesture", "leap poll: {e:?}");
                    continue;
                }
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame.hands()
                    .map(|h| {
                        let label = match h.hand_type() {
                            HandType::Left  => Handedness::Left,
                            HandType::Right => Handedness::Right,
                        };
                        DetectedHand::new(hand_landmarks(&h), label)
                    })
                    .collect();
                if !sink.deliver(&LandmarkFrame::with_hands(hands)) { break; }
            }
        }
        // The connection closes on drop.
        drop(connection);
        sink.report_close(Ok(()));
    }
}

/// Leap millimetres → normalised image space (y down, z toward the camera
/// negative).
fn normalise(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(
        0.5 + x / BOX_WIDTH,
        1.0 - (y - BOX_FLOOR) / BOX_WIDTH,
        z / BOX_WIDTH,
    )
}

/// 21 landmarks in the usual wrist / four-joints-per-digit order.
///
/// For every digit the chain is the base of the proximal, intermediate and
/// distal bones followed by the distal tip.  The thumb's metacarpal has
/// zero length in Leap's model, so the same chain gives CMC, MCP, IP, tip.
fn hand_landmarks(hand: &Hand) -> Vec<Vec3> {
    let digits: Vec<_> = hand.digits().collect();
    let mut out = Vec::with_capacity(LANDMARK_COUNT);

    let wrist = match digits.get(2) {
        Some(middle) => middle.metacarpal().prev_joint(),
        None         => return out,
    };
    out.push(normalise(wrist.x, wrist.y, wrist.z));

    for digit in &digits {
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        out.extend(joints.iter().map(|j| normalise(j.x, j.y, j.z)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_centre_maps_to_image_centre_column() {
        let p = normalise(0.0, BOX_FLOOR + BOX_WIDTH / 2.0, 0.0);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn higher_hands_are_nearer_the_top() {
        assert!(normalise(0.0, 300.0, 0.0).y < normalise(0.0, 100.0, 0.0).y);
    }
}
