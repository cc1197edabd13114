//! Colors and the named preset palette.
//!
//! | id | name | hex |
//! |---|---|---|
//! | white  | Pure White | `#ffffff` |
//! | sunset | Sunset     | `#ff6b35` |
//! | ocean  | Ocean      | `#0077be` |
//! | neon   | Neon       | `#00ff88` |
//! | aurora | Aurora     | `#66ffcc` |
//! | fire   | Fire       | `#ff3333` |
//! | ice    | Ice        | `#88ddff` |
//! | forest | Forest     | `#44aa44` |
//! | galaxy | Galaxy     | `#8844ff` |

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// 8-bit sRGB color.  Parses from and prints as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xffffff);
    pub const BLACK: Rgb = Rgb::from_hex(0x000000);

    pub const fn new(r: u8, g: u8, b: u8) -> Self { Rgb { r, g, b } }

    /// `0xrrggbb`; the top byte is ignored.
    pub const fn from_hex(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >>  8) & 0xff) as u8,
            b: ( hex        & 0xff) as u8,
        }
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Channels as 0–1 floats.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Nearest color to a 0–1 float triple (channels clamped).
    pub fn from_vec3(v: Vec3) -> Self {
        let c = (v.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        Rgb::new(c.x as u8, c.y as u8, c.z as u8)
    }

    /// Per-channel linear blend; `t` is clamped to 0–1.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::from_vec3(self.to_vec3().lerp(other.to_vec3(), t.clamp(0.0, 1.0)))
    }
}

impl Default for Rgb {
    fn default() -> Self { Rgb::WHITE }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    /// Accepts `#rrggbb`, `rrggbb` and the short `#rgb` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::Color(s.to_string());
        let digits = s.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) { return Err(bad()); }
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).map(Rgb::from_hex).map_err(|_| bad()),
            3 => {
                let v = u32::from_str_radix(digits, 16).map_err(|_| bad())?;
                let (r, g, b) = ((v >> 8) & 0xf, (v >> 4) & 0xf, v & 0xf);
                Ok(Rgb::new((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
            }
            _ => Err(bad()),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = String::deserialize(d)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Presets
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorPreset {
    pub id:    &'static str,
    pub name:  &'static str,
    pub color: Rgb,
}

/// The palette walked by the left-hand pinch gesture, in cycle order.
pub const PRESETS: [ColorPreset; 9] = [
    ColorPreset { id: "white",  name: "Pure White", color: Rgb::from_hex(0xffffff) },
    ColorPreset { id: "sunset", name: "Sunset",     color: Rgb::from_hex(0xff6b35) },
    ColorPreset { id: "ocean",  name: "Ocean",      color: Rgb::from_hex(0x0077be) },
    ColorPreset { id: "neon",   name: "Neon",       color: Rgb::from_hex(0x00ff88) },
    ColorPreset { id: "aurora", name: "Aurora",     color: Rgb::from_hex(0x66ffcc) },
    ColorPreset { id: "fire",   name: "Fire",       color: Rgb::from_hex(0xff3333) },
    ColorPreset { id: "ice",    name: "Ice",        color: Rgb::from_hex(0x88ddff) },
    ColorPreset { id: "forest", name: "Forest",     color: Rgb::from_hex(0x44aa44) },
    ColorPreset { id: "galaxy", name: "Galaxy",     color: Rgb::from_hex(0x8844ff) },
];

pub fn preset(id: &str) -> Option<&'static ColorPreset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
