//! QR detection and decoding from raster images.
//!
//! Detection runs on a grayscale copy of the input; every located grid is
//! decoded independently, and grids that fail to decode are skipped with a
//! warning rather than failing the scan.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::content::{self, ContentAnalysis};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write scan report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize scan report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Axis-aligned bounding box of a detected symbol, in image pixels.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One decoded symbol.
#[derive(Debug, Clone, Serialize)]
pub struct ScanHit {
    pub content: String,
    pub position: Region,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ContentAnalysis>,
}

/// Decode every readable QR symbol in the image at `path`.
pub fn scan_file(path: &Path, analyze: bool) -> Result<Vec<ScanHit>, ScanError> {
    let img = image::open(path)?.to_luma8();
    Ok(scan_image(&img, analyze))
}

/// Decode every readable QR symbol in a grayscale image.
pub fn scan_image(img: &image::GrayImage, analyze: bool) -> Vec<ScanHit> {
    let mut prepared = rqrr::PreparedImage::prepare(img.clone());
    let mut hits = Vec::new();
    for grid in prepared.detect_grids() {
        let position = bounds_to_region(&grid.bounds);
        match grid.decode() {
            Ok((_meta, text)) => {
                let analysis = analyze.then(|| content::analyze(&text));
                hits.push(ScanHit {
                    content: text,
                    position,
                    analysis,
                });
            }
            Err(err) => {
                warn!(%err, ?position, "detected grid failed to decode, skipping");
            }
        }
    }
    hits
}

/// Write the hits as a pretty-printed JSON array.
pub fn write_report(hits: &[ScanHit], path: &Path) -> Result<(), ScanError> {
    std::fs::write(path, serde_json::to_string_pretty(hits)?)?;
    Ok(())
}

fn bounds_to_region(corners: &[rqrr::Point; 4]) -> Region {
    let xs = corners.iter().map(|p| p.x);
    let ys = corners.iter().map(|p| p.y);
    let min_x = xs.clone().min().unwrap_or(0);
    let max_x = xs.max().unwrap_or(0);
    let min_y = ys.clone().min().unwrap_or(0);
    let max_y = ys.max().unwrap_or(0);
    Region {
        x: min_x,
        y: min_y,
        width: (max_x - min_x).max(0) as u32,
        height: (max_y - min_y).max(0) as u32,
    }
}
