//! Center-image overlay compositing.
//!
//! Pipeline: shrink the overlay preserving aspect ratio, optionally matte
//! it onto a padded background rectangle, then alpha-paste it centered on
//! the QR raster. The matte rectangle pads width and height independently,
//! so non-square overlays keep their shape.
//!
//! Compositing failures are cosmetic by contract: if the overlay cannot be
//! loaded the original QR image is returned unchanged.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::warn;

use crate::color::Rgb;
use crate::style::{OverlayBackground, OverlaySpec};

/// Composite the overlay named by `spec.path` onto `qr`. `qr_bg` is the QR
/// background color, used when the matte mode is `match`.
pub fn composite(qr: &RgbaImage, spec: &OverlaySpec, qr_bg: Rgb) -> RgbaImage {
    match image::open(spec.path.trim()) {
        Ok(img) => composite_loaded(qr, &img.to_rgba8(), spec, qr_bg),
        Err(err) => {
            warn!(path = %spec.path, %err, "failed to load overlay image, keeping plain QR");
            qr.clone()
        }
    }
}

/// Composite an already-loaded overlay. Split out so the numeric policy is
/// testable without touching the filesystem.
pub fn composite_loaded(
    qr: &RgbaImage,
    overlay: &RgbaImage,
    spec: &OverlaySpec,
    qr_bg: Rgb,
) -> RgbaImage {
    let (qr_w, qr_h) = qr.dimensions();
    let max_side = qr_w * spec.clamped_percent() / 100;
    if max_side == 0 || overlay.width() == 0 || overlay.height() == 0 {
        warn!("degenerate overlay dimensions, keeping plain QR");
        return qr.clone();
    }

    let overlay = shrink_to_fit(overlay, max_side);

    let composed = match spec.background {
        OverlayBackground::None => overlay,
        OverlayBackground::Match | OverlayBackground::Custom => {
            let pad = spec.padding_px;
            let color = match spec.background {
                OverlayBackground::Match => qr_bg,
                _ => spec.background_color,
            };
            let bg_w = overlay.width() + 2 * pad;
            let bg_h = overlay.height() + 2 * pad;
            let mut matte = RgbaImage::from_pixel(bg_w, bg_h, color.rgba());
            imageops::overlay(&mut matte, &overlay, pad as i64, pad as i64);
            matte
        }
    };

    let mut out = qr.clone();
    let x = (qr_w as i64 - composed.width() as i64) / 2;
    let y = (qr_h as i64 - composed.height() as i64) / 2;
    imageops::overlay(&mut out, &composed, x, y);
    out
}

/// Resize preserving aspect ratio so the longest side is at most
/// `max_side`. Never upscales.
fn shrink_to_fit(img: &RgbaImage, max_side: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let longest = w.max(h);
    if longest <= max_side {
        return img.clone();
    }
    let scale = max_side as f64 / longest as f64;
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max_side);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max_side);
    imageops::resize(img, nw, nh, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{self, WHITE};
    use image::Rgba;

    fn spec(percent: u32, background: OverlayBackground, padding: u32) -> OverlaySpec {
        OverlaySpec {
            path: String::new(),
            size_percent: percent,
            background,
            background_color: color::BLACK,
            padding_px: padding,
        }
    }

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn shrink_caps_longest_side() {
        let img = solid(500, 250, [10, 10, 10, 255]);
        let out = shrink_to_fit(&img, 80);
        assert_eq!(out.width(), 80);
        assert_eq!(out.height(), 40);
    }

    #[test]
    fn shrink_never_upscales() {
        let img = solid(30, 20, [10, 10, 10, 255]);
        let out = shrink_to_fit(&img, 80);
        assert_eq!(out.dimensions(), (30, 20));
    }

    #[test]
    fn overlay_respects_twenty_percent_budget() {
        let qr = solid(400, 400, WHITE.rgba().0);
        let big = solid(600, 600, [200, 0, 0, 255]);
        let s = spec(20, OverlayBackground::None, 0);
        let max = 400 * 20 / 100;
        let shrunk = shrink_to_fit(&big, 400 * s.clamped_percent() / 100);
        assert!(shrunk.width().max(shrunk.height()) <= max);
        let out = composite_loaded(&qr, &big, &s, WHITE);
        assert_eq!(out.dimensions(), (400, 400));
    }

    #[test]
    fn overlay_is_centered_within_one_pixel() {
        let qr = solid(401, 401, WHITE.rgba().0);
        let logo = solid(100, 60, [200, 0, 0, 255]);
        let s = spec(50, OverlayBackground::None, 0);
        let out = composite_loaded(&qr, &logo, &s, WHITE);

        // Locate the painted bounding box.
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0, 0);
        for (x, y, p) in out.enumerate_pixels() {
            if p.0 == [200, 0, 0, 255] {
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            }
        }
        let expect_x = (401 - 100) / 2;
        let expect_y = (401 - 60) / 2;
        assert!((min.0 as i64 - expect_x as i64).abs() <= 1);
        assert!((min.1 as i64 - expect_y as i64).abs() <= 1);
        assert_eq!(max.0 - min.0 + 1, 100);
        assert_eq!(max.1 - min.1 + 1, 60);
    }

    #[test]
    fn matte_pads_width_and_height_independently() {
        let qr = solid(400, 400, WHITE.rgba().0);
        let logo = solid(80, 40, [0, 200, 0, 255]);
        let s = spec(50, OverlayBackground::Custom, 10);
        let out = composite_loaded(&qr, &logo, &s, WHITE);

        // The matte is 100x60 black, centered; its corner pixel is black.
        let matte_x = (400 - 100) / 2;
        let matte_y = (400 - 60) / 2;
        assert_eq!(out.get_pixel(matte_x, matte_y).0, [0, 0, 0, 255]);
        // Logo sits inside the matte at the padding offset.
        assert_eq!(out.get_pixel(matte_x + 10, matte_y + 10).0, [0, 200, 0, 255]);
        // Outside the matte the QR is untouched.
        assert_eq!(out.get_pixel(10, 10).0, WHITE.rgba().0);
    }

    #[test]
    fn transparent_overlay_lets_qr_show_through() {
        let qr = solid(200, 200, WHITE.rgba().0);
        let mut logo = solid(40, 40, [0, 0, 0, 0]);
        logo.put_pixel(20, 20, Rgba([5, 5, 5, 255]));
        let s = spec(50, OverlayBackground::None, 0);
        let out = composite_loaded(&qr, &logo, &s, WHITE);
        // Fully transparent pixels leave the QR untouched.
        assert_eq!(out.get_pixel(85, 85).0, WHITE.rgba().0);
        assert_eq!(out.get_pixel(100, 100).0, [5, 5, 5, 255]);
    }

    #[test]
    fn unreadable_overlay_path_returns_qr_unchanged() {
        let qr = solid(120, 120, WHITE.rgba().0);
        let s = OverlaySpec {
            path: "/nonexistent/logo.png".into(),
            size_percent: 20,
            background: OverlayBackground::Match,
            background_color: color::BLACK,
            padding_px: 4,
        };
        let out = composite(&qr, &s, WHITE);
        assert_eq!(out, qr);
    }
}
