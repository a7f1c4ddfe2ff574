//! Color values for icon fills.
//!
//! Icon colors come from the built-in catalog and from user configuration, so
//! they are parsed once into [`Color`] and emitted in the `#rrggbb` form that
//! every layout backend understands.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};
use serde::{Deserialize, Deserializer};

/// Wrapper around the `DynamicColor` type from the color crate.
#[derive(Clone, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parse a CSS color string such as `"#0078d4"`, `"rgb(0, 120, 212)"` or `"steelblue"`.
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Color { color }),
            Err(err) => Err(format!("Invalid color '{color_str}': {err}")),
        }
    }

    /// The color as an opaque `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }

    /// The color packed as `0xRRGGBBAA`.
    pub fn to_rgba_u32(&self) -> u32 {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        u32::from_be_bytes([rgba.r, rgba.g, rgba.b, rgba.a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("#e8e8e8").expect("literal color is valid")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Color::new(&raw).map_err(serde::de::Error::custom)
    }
}
