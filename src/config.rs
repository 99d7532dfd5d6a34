//! Generator configuration documents.
//!
//! A flat JSON object using the vocabulary shared by the config files, the
//! CSV manifest columns, and the JSON manifest keys. Loading is
//! forward-tolerant: missing keys take their documented defaults, unknown
//! keys are ignored, and style names saved as display strings ("Rounded
//! Corners", "Solid Fill") translate onto internal keys at resolution
//! time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{self, Rgb};
use crate::style::{
    ErrorCorrection, MaskKind, OverlayBackground, OverlaySpec, StyleConfig, Theme,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The persisted configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Content kind last used in the interactive flow ("general", "url", …).
    #[serde(default = "defaults::preset")]
    pub preset: String,

    #[serde(default = "defaults::theme")]
    pub theme: String,

    #[serde(default = "defaults::color_mask")]
    pub color_mask: String,

    /// Output side length in pixels.
    #[serde(default = "defaults::size")]
    pub size: u32,

    /// Quiet-zone width in modules.
    #[serde(default = "defaults::border")]
    pub border: u32,

    /// Error correction level letter (L/M/Q/H).
    #[serde(default = "defaults::error_correction")]
    pub error_correction: String,

    #[serde(default = "defaults::fg_color")]
    pub fg_color: String,

    #[serde(default = "defaults::bg_color")]
    pub bg_color: String,

    /// Export format name; also settable per batch row.
    #[serde(default = "defaults::format")]
    pub format: String,

    #[serde(default)]
    pub use_image: bool,

    #[serde(default)]
    pub image_path: String,

    /// Overlay size as a percentage of the QR side.
    #[serde(default = "defaults::image_size")]
    pub image_size: u32,

    /// Overlay matte mode: match, custom, or none.
    #[serde(default = "defaults::image_bg")]
    pub image_bg: String,

    #[serde(default = "defaults::bg_color")]
    pub image_bg_color: String,

    #[serde(default = "defaults::image_padding")]
    pub image_padding: u32,

    #[serde(default)]
    pub mask_image_path: String,

    /// Last content payload, restored by the interactive flow.
    #[serde(default)]
    pub content: String,
}

mod defaults {
    pub fn preset() -> String {
        "general".into()
    }
    pub fn theme() -> String {
        "classic".into()
    }
    pub fn color_mask() -> String {
        "solid".into()
    }
    pub fn size() -> u32 {
        400
    }
    pub fn border() -> u32 {
        4
    }
    pub fn error_correction() -> String {
        "M".into()
    }
    pub fn fg_color() -> String {
        "#000000".into()
    }
    pub fn bg_color() -> String {
        "#FFFFFF".into()
    }
    pub fn format() -> String {
        "PNG".into()
    }
    pub fn image_size() -> u32 {
        20
    }
    pub fn image_bg() -> String {
        "match".into()
    }
    pub fn image_padding() -> u32 {
        10
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            preset: defaults::preset(),
            theme: defaults::theme(),
            color_mask: defaults::color_mask(),
            size: defaults::size(),
            border: defaults::border(),
            error_correction: defaults::error_correction(),
            fg_color: defaults::fg_color(),
            bg_color: defaults::bg_color(),
            format: defaults::format(),
            use_image: false,
            image_path: String::new(),
            image_size: defaults::image_size(),
            image_bg: defaults::image_bg(),
            image_bg_color: defaults::bg_color(),
            image_padding: defaults::image_padding(),
            mask_image_path: String::new(),
            content: String::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Overlay keys from a JSON manifest entry on top of this config.
    /// Unknown keys are ignored, matching load tolerance.
    pub fn merged_with(&self, entry: &serde_json::Value) -> Result<Self, ConfigError> {
        let mut base = serde_json::to_value(self)?;
        if let (Some(base_map), Some(entry_map)) = (base.as_object_mut(), entry.as_object()) {
            for (key, value) in entry_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    /// Resolve the string vocabulary into a [`StyleConfig`]. Invalid colors
    /// normalize to black on white; overlay settings apply only when
    /// `use_image` is set with a non-empty path.
    pub fn style(&self) -> StyleConfig {
        let bg = Rgb::parse_or(&self.bg_color, color::WHITE);
        let overlay = if self.use_image && !self.image_path.trim().is_empty() {
            Some(OverlaySpec {
                path: self.image_path.clone(),
                size_percent: self.image_size,
                background: OverlayBackground::parse(&self.image_bg),
                background_color: Rgb::parse_or(&self.image_bg_color, color::WHITE),
                padding_px: self.image_padding,
            })
        } else {
            None
        };
        StyleConfig {
            theme: Theme::parse(&self.theme),
            mask: MaskKind::parse(&self.color_mask),
            size_px: self.size.max(1),
            border_modules: self.border,
            error_correction: ErrorCorrection::parse(&self.error_correction),
            fg: Rgb::parse_or(&self.fg_color, color::BLACK),
            bg,
            overlay,
            mask_image_path: if self.mask_image_path.trim().is_empty() {
                None
            } else {
                Some(self.mask_image_path.clone())
            },
        }
    }
}
