//! Batch generation from CSV and JSON manifests.
//!
//! Each manifest row becomes one export job: content string, output
//! filename, and per-row overrides of the base configuration. Rows are
//! processed sequentially and failures are isolated: a bad row is counted
//! and reported without aborting the rest of the batch.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use tracing::warn;

use crate::config::GeneratorConfig;
use crate::export::{self, ExportFormat};
use crate::overlay;
use crate::render;
use crate::style::Capabilities;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CSV manifest: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest must be a .csv or .json file: {0}")]
    UnsupportedManifest(PathBuf),
}

/// Outcome tally for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, row: usize, outcome: anyhow::Result<PathBuf>) {
        self.total += 1;
        match outcome {
            Ok(path) => {
                self.succeeded += 1;
                println!("row {row}: generated {}", path.display());
            }
            Err(err) => {
                self.failed += 1;
                println!("row {row}: error: {err:#}");
            }
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64 * 100.0
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} successful, {} failed", self.succeeded, self.failed)
    }
}

/// Run a batch from `manifest` into `output_dir`, using `base` for every
/// setting a row does not override.
pub fn run(
    manifest: &Path,
    output_dir: &Path,
    base: &GeneratorConfig,
    caps: &Capabilities,
) -> Result<BatchSummary, BatchError> {
    fs::create_dir_all(output_dir)?;
    match manifest
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("csv") => run_csv(manifest, output_dir, base, caps),
        Some("json") => run_json(manifest, output_dir, base, caps),
        _ => Err(BatchError::UnsupportedManifest(manifest.to_path_buf())),
    }
}

fn run_csv(
    manifest: &Path,
    output_dir: &Path,
    base: &GeneratorConfig,
    caps: &Capabilities,
) -> Result<BatchSummary, BatchError> {
    let mut reader = csv::Reader::from_path(manifest)?;
    let headers = reader.headers()?.clone();
    let mut summary = BatchSummary::default();

    for (i, record) in reader.records().enumerate() {
        let row_no = i + 1;
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                summary.record(row_no, Err(err.into()));
                continue;
            }
        };
        let row: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let content = row
            .get("content")
            .or_else(|| row.get("text"))
            .copied()
            .unwrap_or("")
            .to_string();
        let filename = row
            .get("filename")
            .copied()
            .map(str::to_string)
            .unwrap_or_else(|| format!("qr_{row_no:03}"));

        let cfg = apply_csv_overrides(base.clone(), row_no, &row);
        summary.record(row_no, generate_one(&content, &filename, &cfg, output_dir, caps));
    }
    Ok(summary)
}

fn run_json(
    manifest: &Path,
    output_dir: &Path,
    base: &GeneratorConfig,
    caps: &Capabilities,
) -> Result<BatchSummary, BatchError> {
    let raw = fs::read_to_string(manifest)?;
    let data: serde_json::Value = serde_json::from_str(&raw)?;
    // A single object is a one-entry manifest.
    let entries: Vec<serde_json::Value> = match data {
        serde_json::Value::Array(items) => items,
        object => vec![object],
    };

    let mut summary = BatchSummary::default();
    for (i, entry) in entries.iter().enumerate() {
        let row_no = i + 1;
        let content = entry
            .get("content")
            .or_else(|| entry.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let filename = entry
            .get("filename")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("qr_{row_no:03}"));

        let cfg = match base.merged_with(entry) {
            Ok(cfg) => cfg,
            Err(err) => {
                summary.record(row_no, Err(anyhow::Error::from(err)));
                continue;
            }
        };
        summary.record(row_no, generate_one(&content, &filename, &cfg, output_dir, caps));
    }
    Ok(summary)
}

/// Apply typed CSV overrides. An unparseable value warns and keeps the
/// base config's value rather than failing the row.
fn apply_csv_overrides(
    mut cfg: GeneratorConfig,
    row_no: usize,
    row: &HashMap<&str, &str>,
) -> GeneratorConfig {
    let parse_u32 = |key: &str, slot: &mut u32| {
        if let Some(value) = row.get(key) {
            match value.parse::<u32>() {
                Ok(v) => *slot = v,
                Err(_) => {
                    warn!(row = row_no, key, value, "invalid number, keeping default");
                    println!("row {row_no}: invalid {key} value '{value}', using default");
                }
            }
        }
    };
    let set_string = |key: &str, slot: &mut String| {
        if let Some(value) = row.get(key) {
            *slot = value.to_string();
        }
    };

    parse_u32("size", &mut cfg.size);
    parse_u32("border", &mut cfg.border);
    parse_u32("image_size", &mut cfg.image_size);
    parse_u32("image_padding", &mut cfg.image_padding);
    set_string("theme", &mut cfg.theme);
    set_string("color_mask", &mut cfg.color_mask);
    set_string("fg_color", &mut cfg.fg_color);
    set_string("bg_color", &mut cfg.bg_color);
    set_string("error_correction", &mut cfg.error_correction);
    set_string("format", &mut cfg.format);
    set_string("image_path", &mut cfg.image_path);
    set_string("image_bg", &mut cfg.image_bg);
    set_string("image_bg_color", &mut cfg.image_bg_color);
    set_string("mask_image_path", &mut cfg.mask_image_path);
    if let Some(value) = row.get("use_image") {
        cfg.use_image = matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        );
    }
    cfg
}

/// Render, composite, and export one job. Shared by batch rows and the
/// `generate` subcommand.
pub fn generate_one(
    content: &str,
    filename: &str,
    cfg: &GeneratorConfig,
    output_dir: &Path,
    caps: &Capabilities,
) -> anyhow::Result<PathBuf> {
    anyhow::ensure!(!content.trim().is_empty(), "empty content");

    let style = cfg.style();
    let mut img = render::render(content.trim(), &style).context("render failed")?;
    if let Some(spec) = &style.overlay {
        img = overlay::composite(&img, spec, style.bg);
    }

    let format = ExportFormat::parse(&cfg.format).unwrap_or(ExportFormat::Png);
    let path = output_dir.join(format!("{filename}.{}", format.extension()));
    let actual = export::export_to_file(&img, content.trim(), &style, caps, format, &path)
        .with_context(|| format!("export to {} failed", path.display()))?;
    if actual != format {
        // WEBP fell back to PNG; rename so the extension tells the truth.
        let fixed = output_dir.join(format!("{filename}.{}", actual.extension()));
        fs::rename(&path, &fixed).context("rename after format fallback")?;
        return Ok(fixed);
    }
    Ok(path)
}
