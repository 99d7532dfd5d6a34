//! Export encoding: raster formats and the two SVG paths.
//!
//! Raster formats go through the `image` crate with per-format policy
//! (JPEG and BMP flatten alpha, ICO is capped at 256 px, WEBP falls back
//! to PNG when the runtime cannot encode it). SVG has two deliberate
//! paths: plain classic/solid codes get native vector output rewritten to
//! be scalable; anything styled or overlaid cannot be vectorized from the
//! composited raster, so the raster is embedded as base64 PNG inside a
//! scalable wrapper.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::warn;

use crate::render::{self, RenderError};
use crate::style::{Capabilities, StyleConfig};

/// Pixel cap imposed by the ICO container.
const ICO_MAX_SIDE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Webp,
    Ico,
    Svg,
}

impl ExportFormat {
    /// Parse a format name or file extension; case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "bmp" => Some(ExportFormat::Bmp),
            "tif" | "tiff" => Some(ExportFormat::Tiff),
            "webp" => Some(ExportFormat::Webp),
            "ico" => Some(ExportFormat::Ico),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }

    /// Detect the format from a path's extension; defaults to PNG.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::parse)
            .unwrap_or(ExportFormat::Png)
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
            ExportFormat::Tiff => "tiff",
            ExportFormat::Webp => "webp",
            ExportFormat::Ico => "ico",
            ExportFormat::Svg => "svg",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Bmp => "BMP",
            ExportFormat::Tiff => "TIFF",
            ExportFormat::Webp => "WEBP",
            ExportFormat::Ico => "ICO",
            ExportFormat::Svg => "SVG",
        })
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Encode the raster in `format`, returning the bytes and the format
/// actually used (WEBP degrades to PNG when unavailable).
pub fn encode_raster(
    img: &RgbaImage,
    format: ExportFormat,
    caps: &Capabilities,
) -> Result<(Vec<u8>, ExportFormat), ExportError> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(img.clone()).write_to(&mut buf, ImageFormat::Png)?;
        }
        ExportFormat::Jpeg => {
            let rgb = flatten(img);
            let encoder = JpegEncoder::new_with_quality(&mut buf, 95);
            DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;
        }
        ExportFormat::Bmp => {
            DynamicImage::ImageRgb8(flatten(img)).write_to(&mut buf, ImageFormat::Bmp)?;
        }
        ExportFormat::Tiff => {
            DynamicImage::ImageRgba8(img.clone()).write_to(&mut buf, ImageFormat::Tiff)?;
        }
        ExportFormat::Webp => {
            if !caps.webp_encode {
                warn!("WEBP encoding unavailable, falling back to PNG");
                return encode_raster(img, ExportFormat::Png, caps);
            }
            let encoder = WebPEncoder::new_lossless(&mut buf);
            encoder.encode(
                img.as_raw(),
                img.width(),
                img.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Ico => {
            let capped = if img.width().max(img.height()) > ICO_MAX_SIDE {
                imageops::resize(img, ICO_MAX_SIDE, ICO_MAX_SIDE, FilterType::Lanczos3)
            } else {
                img.clone()
            };
            DynamicImage::ImageRgba8(capped).write_to(&mut buf, ImageFormat::Ico)?;
        }
        ExportFormat::Svg => unreachable!("SVG goes through svg_document"),
    }
    Ok((buf.into_inner(), format))
}

/// Build the SVG document for this code: native vector when the style is
/// plain classic/solid with no overlay, otherwise the embedded-PNG wrapper.
pub fn svg_document(
    img: &RgbaImage,
    payload: &str,
    cfg: &StyleConfig,
    caps: &Capabilities,
) -> Result<String, ExportError> {
    if render::vector_exportable(cfg) {
        let svg = render::render_svg(payload, cfg)?;
        Ok(ensure_background(make_scalable(svg), cfg))
    } else {
        let (png, _) = encode_raster(img, ExportFormat::Png, caps)?;
        let (w, h) = img.dimensions();
        Ok(format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
                "xmlns:xlink=\"http://www.w3.org/1999/xlink\" ",
                "viewBox=\"0 0 {w} {h}\" width=\"100%\" height=\"100%\" ",
                "preserveAspectRatio=\"xMidYMid meet\">",
                "<image x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" ",
                "xlink:href=\"data:image/png;base64,{data}\"/></svg>\n"
            ),
            w = w,
            h = h,
            data = BASE64.encode(&png)
        ))
    }
}

/// Export to a file. Returns the format actually written (WEBP may degrade
/// to PNG; the caller should report the change).
pub fn export_to_file(
    img: &RgbaImage,
    payload: &str,
    cfg: &StyleConfig,
    caps: &Capabilities,
    format: ExportFormat,
    path: &Path,
) -> Result<ExportFormat, ExportError> {
    if format == ExportFormat::Svg {
        fs::write(path, svg_document(img, payload, cfg, caps)?)?;
        return Ok(ExportFormat::Svg);
    }
    let (bytes, actual) = encode_raster(img, format, caps)?;
    fs::write(path, bytes)?;
    Ok(actual)
}

/// Flatten alpha onto the opaque RGB the alpha-less formats need.
fn flatten(img: &RgbaImage) -> image::RgbImage {
    DynamicImage::ImageRgba8(img.clone()).to_rgb8()
}

/// Replace fixed pixel dimensions on the root element with percentage
/// sizing so the document scales; the viewBox keeps the geometry.
fn make_scalable(svg: String) -> String {
    let Some(open) = svg.find("<svg") else {
        return svg;
    };
    let Some(close_rel) = svg[open..].find('>') else {
        return svg;
    };
    let close = open + close_rel;
    let tag = &svg[open..close];

    let mut rebuilt: String = tag
        .split_whitespace()
        .filter(|attr| !attr.starts_with("width=") && !attr.starts_with("height="))
        .collect::<Vec<_>>()
        .join(" ");
    rebuilt.push_str(" width=\"100%\" height=\"100%\"");
    if !rebuilt.contains("preserveAspectRatio=") {
        rebuilt.push_str(" preserveAspectRatio=\"xMidYMid meet\"");
    }

    let mut out = String::with_capacity(svg.len() + 48);
    out.push_str(&svg[..open]);
    out.push_str(&rebuilt);
    out.push_str(&svg[close..]);
    out
}

/// Inject a background rect sized from the viewBox when the background is
/// not white and the renderer did not already paint it.
fn ensure_background(svg: String, cfg: &StyleConfig) -> String {
    let bg = cfg.bg.to_hex();
    if cfg.bg == crate::color::WHITE || svg.contains(&bg) {
        return svg;
    }
    let Some((w, h)) = parse_view_box(&svg) else {
        return svg;
    };
    let Some(open) = svg.find("<svg") else {
        return svg;
    };
    let Some(close_rel) = svg[open..].find('>') else {
        return svg;
    };
    let insert_at = open + close_rel + 1;
    let rect = format!("<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{bg}\"/>");
    let mut out = String::with_capacity(svg.len() + rect.len());
    out.push_str(&svg[..insert_at]);
    out.push_str(&rect);
    out.push_str(&svg[insert_at..]);
    out
}

/// Pull width/height out of a `viewBox="0 0 w h"` attribute.
fn parse_view_box(svg: &str) -> Option<(f64, f64)> {
    let start = svg.find("viewBox=\"")? + "viewBox=\"".len();
    let end = svg[start..].find('"')? + start;
    let parts: Vec<f64> = svg[start..end]
        .split_whitespace()
        .filter_map(|p| p.parse().ok())
        .collect();
    if parts.len() == 4 {
        Some((parts[2], parts[3]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::render::render;
    use crate::style::Theme;

    fn caps() -> Capabilities {
        Capabilities::detect()
    }

    fn small_qr(cfg: &StyleConfig) -> RgbaImage {
        render("https://example.com", cfg).unwrap()
    }

    #[test]
    fn format_parse_and_extension() {
        assert_eq!(ExportFormat::parse("JPG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::parse("unknown"), None);
        assert_eq!(
            ExportFormat::from_path(Path::new("out/code.webp")),
            ExportFormat::Webp
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("no_extension")),
            ExportFormat::Png
        );
    }

    #[test]
    fn png_round_trips_dimensions() {
        let cfg = StyleConfig {
            size_px: 400,
            ..StyleConfig::default()
        };
        let img = small_qr(&cfg);
        let (bytes, fmt) = encode_raster(&img, ExportFormat::Png, &caps()).unwrap();
        assert_eq!(fmt, ExportFormat::Png);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 400);
        assert_eq!(decoded.height(), 400);
    }

    #[test]
    fn jpeg_and_bmp_drop_alpha() {
        let cfg = StyleConfig {
            size_px: 120,
            ..StyleConfig::default()
        };
        let img = small_qr(&cfg);
        for fmt in [ExportFormat::Jpeg, ExportFormat::Bmp] {
            let (bytes, actual) = encode_raster(&img, fmt, &caps()).unwrap();
            assert_eq!(actual, fmt);
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.width(), 120);
        }
    }

    #[test]
    fn ico_caps_dimensions() {
        let cfg = StyleConfig {
            size_px: 400,
            ..StyleConfig::default()
        };
        let img = small_qr(&cfg);
        let (bytes, _) = encode_raster(&img, ExportFormat::Ico, &caps()).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Ico).unwrap();
        assert_eq!(decoded.width(), 256);
    }

    #[test]
    fn webp_falls_back_to_png_when_unsupported() {
        let cfg = StyleConfig {
            size_px: 100,
            ..StyleConfig::default()
        };
        let img = small_qr(&cfg);
        let no_webp = Capabilities { webp_encode: false };
        let (bytes, actual) = encode_raster(&img, ExportFormat::Webp, &no_webp).unwrap();
        assert_eq!(actual, ExportFormat::Png);
        assert!(image::load_from_memory_with_format(&bytes, ImageFormat::Png).is_ok());
    }

    #[test]
    fn simple_svg_is_native_and_scalable() {
        let cfg = StyleConfig::default();
        let img = small_qr(&cfg);
        let svg = svg_document(&img, "https://example.com", &cfg, &caps()).unwrap();
        assert!(!svg.contains("base64"), "plain style must stay vector");
        assert!(svg.contains("width=\"100%\""));
        assert!(svg.contains("height=\"100%\""));
        assert!(svg.contains("preserveAspectRatio"));
        assert!(svg.contains("viewBox"));
    }

    #[test]
    fn styled_svg_embeds_base64_png() {
        let cfg = StyleConfig {
            theme: Theme::Rounded,
            size_px: 150,
            ..StyleConfig::default()
        };
        let img = small_qr(&cfg);
        let svg = svg_document(&img, "https://example.com", &cfg, &caps()).unwrap();
        assert!(svg.contains("<image"));
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains("preserveAspectRatio=\"xMidYMid meet\""));
    }

    #[test]
    fn non_white_background_is_present_in_simple_svg() {
        let cfg = StyleConfig {
            bg: Rgb::new(0xec, 0xf0, 0xf1),
            ..StyleConfig::default()
        };
        let img = small_qr(&cfg);
        let svg = svg_document(&img, "x", &cfg, &caps()).unwrap();
        assert!(svg.contains("#ecf0f1"));
    }

    #[test]
    fn make_scalable_strips_fixed_dimensions() {
        let svg = "<?xml?><svg xmlns=\"x\" width=\"290\" height=\"290\" \
                   viewBox=\"0 0 29 29\"><path/></svg>"
            .to_string();
        let out = make_scalable(svg);
        assert!(!out.contains("width=\"290\""));
        assert!(!out.contains("height=\"290\""));
        assert!(out.contains("width=\"100%\""));
        assert!(out.contains("viewBox=\"0 0 29 29\""));
    }

    #[test]
    fn ensure_background_injects_rect_once() {
        let cfg = StyleConfig {
            bg: Rgb::new(0x10, 0x20, 0x30),
            ..StyleConfig::default()
        };
        let svg = "<svg viewBox=\"0 0 10 10\"><path/></svg>".to_string();
        let out = ensure_background(svg, &cfg);
        assert!(out.contains("<rect x=\"0\" y=\"0\" width=\"10\" height=\"10\" fill=\"#102030\"/>"));
        // Second pass is a no-op: the color is already present.
        let again = ensure_background(out.clone(), &cfg);
        assert_eq!(out, again);
    }
}
