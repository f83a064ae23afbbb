//! RGB colors written as CSS-style hex strings.
//!
//! Selectors for the solid-color and gradient sources are colors, and colors
//! also reach the crate from user input (config, CLI, pinned selectors), so
//! parsing is strict: the string must start with `#` and carry either three or
//! six hex digits.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid color value {0:?}: expected a leading '#'")]
    MissingHash(String),
    #[error("Invalid color value {0:?}: expected 3 or 6 hex digits")]
    BadDigits(String),
}

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive).
    pub fn from_hex(value: &str) -> Result<Self, ColorError> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(value.to_string()))?;
        let bad = || ColorError::BadDigits(value.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        match digits.len() {
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..=i], 16)
                        .map(|v| v * 17)
                        .map_err(|_| bad())
                };
                Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
            }
            6 => {
                let channel =
                    |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());
                Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => Err(bad()),
        }
    }

    /// Uniformly random color over the full 24-bit range.
    pub fn random(rng: &mut dyn RngCore) -> Self {
        let value: u32 = rng.gen_range(0..=0x00FF_FFFF);
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.red, self.green, self.blue, 255])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
