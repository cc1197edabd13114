//! The 21-point hand landmark layout.

use glam::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Fingertips, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Joint chains per digit, base to tip (wrist excluded).
pub const DIGITS: [[usize; 4]; 5] = [
    [THUMB_CMC,  THUMB_MCP,  THUMB_IP,   THUMB_TIP ],
    [INDEX_MCP,  INDEX_PIP,  INDEX_DIP,  INDEX_TIP ],
    [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
    [RING_MCP,   RING_PIP,   RING_DIP,   RING_TIP  ],
    [PINKY_MCP,  PINKY_PIP,  PINKY_DIP,  PINKY_TIP ],
];

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks — a validated set
// ════════════════════════════════════════════════════════════════════════════

/// Exactly 21 finite landmarks.
///
/// `x`, `y` are normalised image coordinates in `[0, 1]` (y grows downward),
/// `z` is the provider's relative depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLandmarks(pub [Vec3; LANDMARK_COUNT]);

impl HandLandmarks {
    /// Validate a raw landmark slice.
    ///
    /// Returns `None` when fewer than 21 points are present or any of the
    /// first 21 is non-finite.  Extra trailing points are ignored.
    pub fn from_slice(raw: &[Vec3]) -> Option<Self> {
        let head: [Vec3; LANDMARK_COUNT] = raw.get(..LANDMARK_COUNT)?.try_into().ok()?;
        if head.iter().all(|p| p.is_finite()) {
            Some(HandLandmarks(head))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Vec3 { self.0[index] }

    pub fn wrist(&self) -> Vec3 { self.0[WRIST] }

    pub fn as_slice(&self) -> &[Vec3] { &self.0 }
}

impl std::ops::Index<usize> for HandLandmarks {
    type Output = Vec3;
    fn index(&self, index: usize) -> &Vec3 { &self.0[index] }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_slice_is_rejected() {
        let raw = vec![Vec3::ZERO; 20];
        assert!(HandLandmarks::from_slice(&raw).is_none());
        assert!(HandLandmarks::from_slice(&[]).is_none());
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let mut raw = vec![Vec3::splat(0.5); 21];
        raw[INDEX_TIP].y = f32::NAN;
        assert!(HandLandmarks::from_slice(&raw).is_none());
        raw[INDEX_TIP].y = f32::INFINITY;
        assert!(HandLandmarks::from_slice(&raw).is_none());
    }

    #[test]
    fn trailing_points_are_ignored() {
        let mut raw = vec![Vec3::splat(0.5); 23];
        raw[22] = Vec3::splat(f32::NAN);
        let lm = HandLandmarks::from_slice(&raw).expect("first 21 are valid");
        assert_eq!(lm.as_slice().len(), LANDMARK_COUNT);
    }

    #[test]
    fn digit_table_covers_every_non_wrist_landmark() {
        let mut seen = [false; LANDMARK_COUNT];
        seen[WRIST] = true;
        for digit in DIGITS { for j in digit { seen[j] = true; } }
        assert!(seen.iter().all(|&s| s));
    }
}
