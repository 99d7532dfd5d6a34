//! Symbol encoding and styled rasterization.
//!
//! Symbol structure (version selection, Reed-Solomon error correction,
//! module matrix) is delegated entirely to the `qrcode` crate. This module
//! paints the resulting matrix: each dark module is shaped by the resolved
//! module drawer and colored by the resolved color mask, at a fixed box
//! size, then the canvas is resized to the requested pixel size.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use qrcode::render::svg;
use qrcode::{Color, QrCode};
use thiserror::Error;

use crate::style::{self, StyleConfig, Theme};

/// Pixels per module before the final resize.
pub const MODULE_PX: u32 = 10;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("nothing to encode: payload is empty")]
    EmptyPayload,

    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// Render a styled raster for `payload`.
///
/// The output is always `size_px` x `size_px` RGBA with opaque pixels;
/// overlay compositing happens downstream.
pub fn render(payload: &str, cfg: &StyleConfig) -> Result<RgbaImage, RenderError> {
    if payload.is_empty() {
        return Err(RenderError::EmptyPayload);
    }
    let code = QrCode::with_error_correction_level(payload, cfg.error_correction.ec_level())?;
    let (drawer, mask) = style::resolve(cfg);

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let canvas_px = (modules + 2 * cfg.border_modules) * MODULE_PX;
    let mut canvas = RgbaImage::from_pixel(canvas_px, canvas_px, mask.background().rgba());

    for my in 0..modules {
        for mx in 0..modules {
            if colors[(my * modules + mx) as usize] != Color::Dark {
                continue;
            }
            let px0 = (cfg.border_modules + mx) * MODULE_PX;
            let py0 = (cfg.border_modules + my) * MODULE_PX;
            for dy in 0..MODULE_PX {
                for dx in 0..MODULE_PX {
                    if drawer.covers(dx, dy, MODULE_PX) {
                        let (x, y) = (px0 + dx, py0 + dy);
                        let color = mask.module_color(x, y, canvas_px, canvas_px);
                        canvas.put_pixel(x, y, color.rgba());
                    }
                }
            }
        }
    }

    let size = cfg.size_px.max(1);
    if canvas_px == size {
        Ok(canvas)
    } else {
        Ok(imageops::resize(&canvas, size, size, FilterType::Lanczos3))
    }
}

/// Native vector rendering for the simple export path (classic squares,
/// solid fill). The quiet zone is the encoder's standard 4 modules; a zero
/// border disables it.
pub fn render_svg(payload: &str, cfg: &StyleConfig) -> Result<String, RenderError> {
    if payload.is_empty() {
        return Err(RenderError::EmptyPayload);
    }
    let code = QrCode::with_error_correction_level(payload, cfg.error_correction.ec_level())?;
    let fg = cfg.fg.to_hex();
    let bg = cfg.bg.to_hex();
    let svg = code
        .render()
        .quiet_zone(cfg.border_modules > 0)
        .module_dimensions(MODULE_PX, MODULE_PX)
        .dark_color(svg::Color(&fg))
        .light_color(svg::Color(&bg))
        .build();
    Ok(svg)
}

/// Whether the configuration can be expressed as native vector output.
pub fn vector_exportable(cfg: &StyleConfig) -> bool {
    cfg.theme == Theme::Classic
        && cfg.mask == crate::style::MaskKind::Solid
        && cfg.overlay.is_none()
}
