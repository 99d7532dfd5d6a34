//! Color masks: per-pixel foreground color over the rendered symbol.
//!
//! Gradients interpolate from a middle color (component-wise average of
//! foreground and background) near the gradient origin out to the full
//! foreground color, matching the generator this replaces.

use image::RgbaImage;

use crate::color::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub enum ColorMask {
    Solid {
        front: Rgb,
        back: Rgb,
    },
    /// Radial gradient from the image center outward.
    Radial {
        back: Rgb,
        center: Rgb,
        edge: Rgb,
    },
    /// Concentric-square (Chebyshev distance) gradient.
    SquareGradient {
        back: Rgb,
        center: Rgb,
        edge: Rgb,
    },
    Horizontal {
        back: Rgb,
        left: Rgb,
        right: Rgb,
    },
    Vertical {
        back: Rgb,
        top: Rgb,
        bottom: Rgb,
    },
    /// Per-pixel lookup into a user-supplied image, stretched to the symbol.
    Image {
        back: Rgb,
        image: RgbaImage,
    },
}

impl ColorMask {
    pub fn solid(front: Rgb, back: Rgb) -> Self {
        ColorMask::Solid { front, back }
    }

    /// Background (light module) color.
    pub fn background(&self) -> Rgb {
        match self {
            ColorMask::Solid { back, .. }
            | ColorMask::Radial { back, .. }
            | ColorMask::SquareGradient { back, .. }
            | ColorMask::Horizontal { back, .. }
            | ColorMask::Vertical { back, .. }
            | ColorMask::Image { back, .. } => *back,
        }
    }

    /// Foreground color for the pixel at `(x, y)` of a `w`x`h` canvas.
    pub fn module_color(&self, x: u32, y: u32, w: u32, h: u32) -> Rgb {
        match self {
            ColorMask::Solid { front, .. } => *front,
            ColorMask::Radial { center, edge, .. } => {
                let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
                let dist = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                let t = if cx > 0.0 { dist / cx } else { 1.0 };
                center.lerp(*edge, t)
            }
            ColorMask::SquareGradient { center, edge, .. } => {
                let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
                let dist = (x as f32 - cx).abs().max((y as f32 - cy).abs());
                let t = if cx > 0.0 { dist / cx } else { 1.0 };
                center.lerp(*edge, t)
            }
            ColorMask::Horizontal { left, right, .. } => {
                let t = if w > 1 { x as f32 / (w - 1) as f32 } else { 0.0 };
                left.lerp(*right, t)
            }
            ColorMask::Vertical { top, bottom, .. } => {
                let t = if h > 1 { y as f32 / (h - 1) as f32 } else { 0.0 };
                top.lerp(*bottom, t)
            }
            ColorMask::Image { back, image } => {
                let (mw, mh) = image.dimensions();
                if mw == 0 || mh == 0 {
                    return *back;
                }
                let sx = ((x as u64 * mw as u64) / w.max(1) as u64).min(mw as u64 - 1) as u32;
                let sy = ((y as u64 * mh as u64) / h.max(1) as u64).min(mh as u64 - 1) as u32;
                let p = image.get_pixel(sx, sy).0;
                Rgb::new(p[0], p[1], p[2])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn solid_is_position_independent() {
        let mask = ColorMask::solid(BLACK, WHITE);
        assert_eq!(mask.module_color(0, 0, 100, 100), BLACK);
        assert_eq!(mask.module_color(99, 99, 100, 100), BLACK);
        assert_eq!(mask.background(), WHITE);
    }

    #[test]
    fn horizontal_gradient_hits_both_endpoints() {
        let mid = BLACK.mix(WHITE);
        let mask = ColorMask::Horizontal {
            back: WHITE,
            left: mid,
            right: BLACK,
        };
        assert_eq!(mask.module_color(0, 50, 100, 100), mid);
        assert_eq!(mask.module_color(99, 50, 100, 100), BLACK);
    }

    #[test]
    fn radial_gradient_is_middle_at_center() {
        let mid = BLACK.mix(WHITE);
        let mask = ColorMask::Radial {
            back: WHITE,
            center: mid,
            edge: BLACK,
        };
        assert_eq!(mask.module_color(50, 50, 100, 100), mid);
        // Far corner clamps to the edge color.
        assert_eq!(mask.module_color(0, 0, 100, 100), BLACK);
    }

    #[test]
    fn image_mask_samples_stretched_pixels() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
        let mask = ColorMask::Image {
            back: WHITE,
            image: img,
        };
        assert_eq!(mask.module_color(0, 0, 100, 100), Rgb::new(255, 0, 0));
        assert_eq!(mask.module_color(99, 0, 100, 100), Rgb::new(0, 0, 255));
    }
}
