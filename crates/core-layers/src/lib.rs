//! Layer definitions and the ordered layer registry.
//!
//! A layer is a named, colored, toggleable annotation channel. Text runs refer
//! to layers by `LayerId`; the registry is the single source of truth for which
//! ids exist and which one is active (receives newly typed or pasted text).
//! Display order equals insertion order.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod color;
pub mod registry;

pub use color::{ColorMode, ColorParseError, DEFAULT_PALETTE, DisplayMode, Rgb};
pub use registry::{LayerRegistry, RegistryError, RegistryOptions};

/// Stable layer identifier (`layer-<n>` for generated layers).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub color: Rgb,
    pub visible: bool,
    #[serde(default)]
    pub color_mode: ColorMode,
}

impl Layer {
    /// A visible layer in `Highlight` mode.
    pub fn new(id: impl Into<LayerId>, name: impl Into<String>, color: Rgb) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            visible: true,
            color_mode: ColorMode::Highlight,
        }
    }
}
