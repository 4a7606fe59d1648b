//! Gallery configuration.
//!
//! Settings come from three layers, later ones winning key by key:
//!
//! 1. stock defaults ([`GalleryConfig::default`])
//! 2. an optional `--config` TOML file
//! 3. command-line flags ([`Overrides`])
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Untitled"
//!
//! [thumbnail]
//! width = 256               # Exact thumbnail size (smart-cropped)
//! height = 256
//!
//! [small]
//! width = 2048              # Bounding box for the large view
//! height = 2048
//!
//! [encoding]
//! jpeg_quality = 90         # 1-100, PNG output is lossless
//!
//! [processing]
//! max_workers = 8           # Omit for one worker per source
//! ```
//!
//! Files are sparse: override just the values you want. Unknown keys are
//! rejected so typos fail loudly instead of being ignored.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Page title of the generated gallery.
    pub title: String,
    /// Exact size of the cropped thumbnails.
    pub thumbnail: SizeConfig,
    /// Bounding box of the proportionally scaled large view.
    pub small: SizeConfig,
    pub encoding: EncodingConfig,
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            thumbnail: SizeConfig {
                width: 256,
                height: 256,
            },
            small: SizeConfig {
                width: 2048,
                height: 2048,
            },
            encoding: EncodingConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [("thumbnail", &self.thumbnail), ("small", &self.small)] {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name} width and height must be non-zero"
                )));
            }
        }
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    pub jpeg_quality: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Cap on concurrent build workers.
    /// When absent, every source gets its own worker.
    pub max_workers: Option<usize>,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
    pub small_width: Option<u32>,
    pub small_height: Option<u32>,
    pub max_workers: Option<usize>,
}

impl Overrides {
    /// The overrides as a sparse TOML table, ready for [`merge_toml`].
    pub fn to_toml(&self) -> toml::Value {
        let mut root = toml::Table::new();
        if let Some(title) = &self.title {
            root.insert("title".into(), toml::Value::String(title.clone()));
        }
        let mut section = |name: &str, key: &str, value: Option<i64>| {
            if let Some(v) = value {
                let table = root
                    .entry(name)
                    .or_insert(toml::Value::Table(toml::Table::new()));
                if let toml::Value::Table(t) = table {
                    t.insert(key.into(), toml::Value::Integer(v));
                }
            }
        };
        section("thumbnail", "width", self.thumbnail_width.map(i64::from));
        section("thumbnail", "height", self.thumbnail_height.map(i64::from));
        section("small", "width", self.small_width.map(i64::from));
        section("small", "height", self.small_height.map(i64::from));
        section(
            "processing",
            "max_workers",
            self.max_workers.and_then(|n| i64::try_from(n).ok()),
        );
        toml::Value::Table(root)
    }
}

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective configuration from defaults, an optional file and
/// command-line overrides.
pub fn load_config(
    file: Option<&Path>,
    overrides: &Overrides,
) -> Result<GalleryConfig, ConfigError> {
    let mut overlays = Vec::new();
    if let Some(path) = file {
        overlays.push(load_raw_config(path)?);
    }
    overlays.push(overrides.to_toml());
    resolve_config(stock_defaults_value()?, overlays)
}
