//! Starter files for batch generation.
//!
//! Writes editable sample manifests and a documented config template into
//! the current directory, covering the full styling vocabulary so users
//! can copy-paste working rows instead of reading docs.

use std::path::{Path, PathBuf};

use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("failed to write sample file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize sample data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build sample CSV: {0}")]
    Csv(#[from] csv::Error),
}

const CSV_HEADERS: [&str; 16] = [
    "content",
    "filename",
    "theme",
    "color_mask",
    "fg_color",
    "bg_color",
    "size",
    "error_correction",
    "border",
    "use_image",
    "image_path",
    "image_size",
    "image_bg",
    "image_bg_color",
    "image_padding",
    "mask_image_path",
];

/// Write `enhanced_batch.csv` into `dir`.
pub fn write_sample_csv(dir: &Path) -> Result<PathBuf, SampleError> {
    let rows: [[&str; 16]; 4] = [
        [
            "https://www.rust-lang.org",
            "rust_website",
            "rounded",
            "radial",
            "#3776ab",
            "#ffffff",
            "400",
            "M",
            "",
            "true",
            "assets/logo.png",
            "25",
            "custom",
            "#f8f9fa",
            "15",
            "",
        ],
        [
            "WIFI:T:WPA;S:CoffeeShop;P:password123;H:false;",
            "wifi_coffee",
            "circular",
            "horizontal",
            "#8B4513",
            "#F5DEB3",
            "350",
            "",
            "3",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
        ],
        [
            "mailto:contact@company.com?subject=Hello&body=Thanks for visiting!",
            "contact_email",
            "classic",
            "solid",
            "#1f4e79",
            "#ffffff",
            "300",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
        ],
        [
            "BEGIN:VCARD\nVERSION:3.0\nFN:John Doe\nORG:Tech Company\nTEL:+1-555-123-4567\nEMAIL:john@company.com\nEND:VCARD",
            "business_card",
            "gapped",
            "square",
            "#2c3e50",
            "#ecf0f1",
            "",
            "Q",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
        ],
    ];

    let path = dir.join("enhanced_batch.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(SampleError::Io)?;
    Ok(path)
}

/// Write `enhanced_batch.json` into `dir`.
pub fn write_sample_json(dir: &Path) -> Result<PathBuf, SampleError> {
    let entries = json!([
        {
            "content": "https://github.com",
            "filename": "github_qr",
            "theme": "rounded",
            "color_mask": "vertical",
            "fg_color": "#24292e",
            "bg_color": "#ffffff",
            "size": 500,
            "error_correction": "M"
        },
        {
            "content": "tel:+1-800-555-0199",
            "filename": "phone_support",
            "theme": "circular",
            "color_mask": "radial",
            "fg_color": "#0066cc",
            "bg_color": "#f0f8ff"
        },
        {
            "content": "sms:+1-555-123-4567?body=Thanks for your service!",
            "filename": "sms_thanks",
            "theme": "classic",
            "color_mask": "horizontal",
            "fg_color": "#228B22",
            "bg_color": "#F0FFF0"
        }
    ]);
    let path = dir.join("enhanced_batch.json");
    std::fs::write(&path, serde_json::to_string_pretty(&entries)?)?;
    Ok(path)
}

/// Write `config_template.json` into `dir`. The template documents the
/// vocabulary alongside the defaults; only the `defaults` object is read
/// back as configuration.
pub fn write_config_template(dir: &Path) -> Result<PathBuf, SampleError> {
    let template = json!({
        "description": "QR generator configuration template",
        "version": "2.0",
        "defaults": {
            "size": 400,
            "border": 4,
            "error_correction": "M",
            "format": "PNG",
            "theme": "classic",
            "color_mask": "solid",
            "fg_color": "#000000",
            "bg_color": "#FFFFFF"
        },
        "themes": {
            "classic": "Traditional square modules",
            "rounded": "Rounded corner modules",
            "circular": "Circular modules",
            "gapped": "Squares with gaps between them",
            "vertical_bars": "Modules fused into vertical bars",
            "horizontal_bars": "Modules fused into horizontal bars"
        },
        "color_masks": {
            "solid": "Single solid color",
            "radial": "Radial gradient from center",
            "square": "Square gradient pattern",
            "horizontal": "Horizontal gradient",
            "vertical": "Vertical gradient",
            "image": "Colors sampled from mask_image_path"
        },
        "error_correction_levels": {
            "L": "~7% error recovery",
            "M": "~15% error recovery (recommended)",
            "Q": "~25% error recovery",
            "H": "~30% error recovery"
        },
        "example_batch_entry": {
            "content": "https://example.com",
            "filename": "example_qr",
            "theme": "rounded",
            "color_mask": "radial",
            "fg_color": "#1a365d",
            "bg_color": "#ffffff",
            "size": 400,
            "error_correction": "M"
        }
    });
    let path = dir.join("config_template.json");
    std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
    Ok(path)
}
