//! Layer colors and color-display modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An opaque 24-bit color. Serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{input}`: expected #rrggbb")]
pub struct ColorParseError {
    pub input: String,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: input.to_string(),
        };
        let hex = input.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Built-in palette cycled through by `LayerRegistry::add_layer`.
pub const DEFAULT_PALETTE: [Rgb; 6] = [
    Rgb::new(0x94, 0xa3, 0xb8),
    Rgb::new(0x60, 0xa5, 0xfa),
    Rgb::new(0xf4, 0x72, 0xb6),
    Rgb::new(0xfb, 0xbf, 0x24),
    Rgb::new(0x34, 0xd3, 0x99),
    Rgb::new(0xa7, 0x8b, 0xfa),
];

/// How a layer's color is painted onto its runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Translucent background tint of the layer color.
    #[default]
    Highlight,
    /// Foreground painted in the layer color.
    #[serde(rename = "text")]
    TextColor,
    /// No color treatment.
    Off,
}

impl ColorMode {
    /// Highlight -> TextColor -> Off -> Highlight.
    pub fn next(self) -> Self {
        match self {
            ColorMode::Highlight => ColorMode::TextColor,
            ColorMode::TextColor => ColorMode::Off,
            ColorMode::Off => ColorMode::Highlight,
        }
    }
}

/// Policy for runs owned by hidden layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Remove hidden runs from layout entirely.
    Collapse,
    /// Render hidden runs transparent but keep their layout space.
    #[default]
    Keep,
}
