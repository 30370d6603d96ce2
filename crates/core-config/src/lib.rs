//! Configuration loading and parsing.
//!
//! Parses `layerpad.toml` (or an override path provided by the binary). Every
//! section and key is optional; absent values take the built-in defaults.
//! Unknown fields are ignored (TOML deserialization tolerance). A file that
//! fails to parse is reported at `warn` and replaced by defaults: a broken
//! config never prevents the editor from starting.
//!
//! The raw parsed values are retained in `Config::file`; the accessors on
//! `Config` return the effective values (palette entries validated, history
//! cap at least one entry).

use anyhow::Result;
use core_layers::{DEFAULT_PALETTE, DisplayMode, RegistryOptions, Rgb};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, info, warn};

pub const FILE_NAME: &str = "layerpad.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::default_max_entries(),
        }
    }
}

impl HistoryConfig {
    const fn default_max_entries() -> usize {
        50
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LayersConfig {
    #[serde(default = "LayersConfig::default_label_prefix")]
    pub label_prefix: String,
    /// `#rrggbb` strings; invalid entries are skipped when resolved.
    #[serde(default = "LayersConfig::default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "LayersConfig::default_names")]
    pub default_names: [String; 3],
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            label_prefix: Self::default_label_prefix(),
            palette: Self::default_palette(),
            default_names: Self::default_names(),
        }
    }
}

impl LayersConfig {
    fn default_label_prefix() -> String {
        "Layer".to_string()
    }
    fn default_palette() -> Vec<String> {
        DEFAULT_PALETTE.iter().map(|c| c.to_hex()).collect()
    }
    fn default_names() -> [String; 3] {
        ["Default".into(), "Dialogue".into(), "Description".into()]
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the `memos-<scope>.json` files; platform data dir when absent.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "StoreConfig::default_scope")]
    pub scope: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            scope: Self::default_scope(),
        }
    }
}

impl StoreConfig {
    fn default_scope() -> String {
        "default".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub layers: LayersConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub path: Option<PathBuf>, // file the values came from, if any
    pub raw: Option<String>,   // original file string (optional)
    pub file: ConfigFile,      // parsed (or default) data
}

/// Config path: `./layerpad.toml` when present, else the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("layerpad").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_file_absent");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                path: Some(path),
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn history_limit(&self) -> usize {
        self.file.history.max_entries.max(1)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.file.display.mode
    }

    /// Valid palette entries in order; invalid ones are skipped with a warning.
    /// Falls back to the built-in palette when nothing valid remains.
    pub fn palette(&self) -> Vec<Rgb> {
        let mut colors = Vec::with_capacity(self.file.layers.palette.len());
        for entry in &self.file.layers.palette {
            match Rgb::from_hex(entry) {
                Ok(c) => colors.push(c),
                Err(e) => warn!(target: "config", error = %e, "palette_entry_skipped"),
            }
        }
        if colors.is_empty() {
            debug!(target: "config", "palette_empty_using_builtin");
            return DEFAULT_PALETTE.to_vec();
        }
        colors
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            palette: self.palette(),
            label_prefix: self.file.layers.label_prefix.clone(),
        }
    }

    pub fn default_names(&self) -> [String; 3] {
        self.file.layers.default_names.clone()
    }

    pub fn store_scope(&self) -> &str {
        &self.file.store.scope
    }

    pub fn store_dir(&self) -> Option<PathBuf> {
        self.file.store.dir.clone()
    }
}
