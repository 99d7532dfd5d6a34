//! Style vocabulary and resolution.
//!
//! Maps the user-facing theme / color-effect vocabulary (internal keys as
//! well as the display names older config files saved) onto a concrete
//! rendering strategy: a [`drawers::ModuleDrawer`] plus a
//! [`masks::ColorMask`]. Resolution never fails; every unsupported or
//! erroring combination degrades to square modules with a solid fill so a
//! style problem can only change how a code looks, never whether it renders.

pub mod drawers;
pub mod masks;

use std::io::Cursor;

use image::ExtendedColorType;
use image::codecs::webp::WebPEncoder;
use qrcode::EcLevel;
use tracing::warn;

use crate::color::{self, Rgb};
use drawers::ModuleDrawer;
use masks::ColorMask;

/// Module shape theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Classic,
    Rounded,
    Circular,
    Gapped,
    VerticalBars,
    HorizontalBars,
}

impl Theme {
    /// Accepts internal keys and the display names older configs saved.
    /// Unknown names fall back to classic squares.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "classic" | "Classic Squares" | "" => Theme::Classic,
            "rounded" | "Rounded Corners" => Theme::Rounded,
            "circular" | "Circles" => Theme::Circular,
            "gapped" | "Gapped Squares" => Theme::Gapped,
            "vertical_bars" | "Vertical Bars" => Theme::VerticalBars,
            "horizontal_bars" | "Horizontal Bars" => Theme::HorizontalBars,
            other => {
                warn!(theme = other, "unknown theme, using classic");
                Theme::Classic
            }
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Rounded => "rounded",
            Theme::Circular => "circular",
            Theme::Gapped => "gapped",
            Theme::VerticalBars => "vertical_bars",
            Theme::HorizontalBars => "horizontal_bars",
        }
    }
}

/// Color-effect selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskKind {
    #[default]
    Solid,
    Radial,
    Square,
    Horizontal,
    Vertical,
    Image,
}

impl MaskKind {
    /// Accepts internal keys and display names; unknown falls back to solid.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "solid" | "Solid Fill" | "" => MaskKind::Solid,
            "radial" | "Radial Gradient" => MaskKind::Radial,
            "square" | "Square Gradient" => MaskKind::Square,
            "horizontal" | "Horizontal Gradient" => MaskKind::Horizontal,
            "vertical" | "Vertical Gradient" => MaskKind::Vertical,
            "image" | "Image Color Mask" => MaskKind::Image,
            other => {
                warn!(color_mask = other, "unknown color mask, using solid fill");
                MaskKind::Solid
            }
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            MaskKind::Solid => "solid",
            MaskKind::Radial => "radial",
            MaskKind::Square => "square",
            MaskKind::Horizontal => "horizontal",
            MaskKind::Vertical => "vertical",
            MaskKind::Image => "image",
        }
    }
}

/// Error correction tier (Reed-Solomon redundancy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => ErrorCorrection::L,
            "Q" => ErrorCorrection::Q,
            "H" => ErrorCorrection::H,
            _ => ErrorCorrection::M,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        }
    }

    pub fn ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// How the overlay matte behind a center image is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayBackground {
    /// Matte in the QR background color.
    #[default]
    Match,
    /// Matte in [`OverlaySpec::background_color`].
    Custom,
    /// No matte; the overlay keeps its own transparency.
    None,
}

impl OverlayBackground {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "custom" => OverlayBackground::Custom,
            "none" => OverlayBackground::None,
            _ => OverlayBackground::Match,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            OverlayBackground::Match => "match",
            OverlayBackground::Custom => "custom",
            OverlayBackground::None => "none",
        }
    }
}

/// A center image overlay request.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub path: String,
    /// Longest overlay side as a percentage of the QR side, clamped 1..=100.
    pub size_percent: u32,
    pub background: OverlayBackground,
    pub background_color: Rgb,
    pub padding_px: u32,
}

impl OverlaySpec {
    pub fn clamped_percent(&self) -> u32 {
        self.size_percent.clamp(1, 100)
    }
}

/// Fully resolved rendering parameters for one QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    pub theme: Theme,
    pub mask: MaskKind,
    pub size_px: u32,
    pub border_modules: u32,
    pub error_correction: ErrorCorrection,
    pub fg: Rgb,
    pub bg: Rgb,
    pub overlay: Option<OverlaySpec>,
    pub mask_image_path: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Classic,
            mask: MaskKind::Solid,
            size_px: 400,
            border_modules: 4,
            error_correction: ErrorCorrection::M,
            fg: color::BLACK,
            bg: color::WHITE,
            overlay: None,
            mask_image_path: None,
        }
    }
}

/// Optional-feature probe, evaluated once at startup instead of retrying
/// per call (the Python original re-attempted imports on every render).
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub webp_encode: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        let probe = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        let webp_encode = WebPEncoder::new_lossless(&mut buf)
            .encode(probe.as_raw(), 1, 1, ExtendedColorType::Rgba8)
            .is_ok();
        Self { webp_encode }
    }
}

/// Resolve a style into a module drawer and color mask.
///
/// The image mask is the only strategy that can fail (missing or unreadable
/// mask image); it degrades to a solid fill with the supplied colors.
pub fn resolve(cfg: &StyleConfig) -> (ModuleDrawer, ColorMask) {
    let drawer = ModuleDrawer::from_theme(cfg.theme);
    let mask = match cfg.mask {
        MaskKind::Solid => ColorMask::solid(cfg.fg, cfg.bg),
        MaskKind::Radial => ColorMask::Radial {
            back: cfg.bg,
            center: cfg.fg.mix(cfg.bg),
            edge: cfg.fg,
        },
        MaskKind::Square => ColorMask::SquareGradient {
            back: cfg.bg,
            center: cfg.fg.mix(cfg.bg),
            edge: cfg.fg,
        },
        MaskKind::Horizontal => ColorMask::Horizontal {
            back: cfg.bg,
            left: cfg.fg.mix(cfg.bg),
            right: cfg.fg,
        },
        MaskKind::Vertical => ColorMask::Vertical {
            back: cfg.bg,
            top: cfg.fg.mix(cfg.bg),
            bottom: cfg.fg,
        },
        MaskKind::Image => match &cfg.mask_image_path {
            Some(path) if !path.trim().is_empty() => match image::open(path.trim()) {
                Ok(img) => ColorMask::Image {
                    back: cfg.bg,
                    image: img.to_rgba8(),
                },
                Err(err) => {
                    warn!(path, %err, "failed to load mask image, using solid fill");
                    ColorMask::solid(cfg.fg, cfg.bg)
                }
            },
            _ => {
                warn!("image color mask selected without a mask image, using solid fill");
                ColorMask::solid(cfg.fg, cfg.bg)
            }
        },
    };
    (drawer, mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parse_accepts_keys_and_display_names() {
        assert_eq!(Theme::parse("rounded"), Theme::Rounded);
        assert_eq!(Theme::parse("Rounded Corners"), Theme::Rounded);
        assert_eq!(Theme::parse("Vertical Bars"), Theme::VerticalBars);
    }

    #[test]
    fn unknown_theme_falls_back_to_classic() {
        assert_eq!(Theme::parse("hexagons"), Theme::Classic);
        assert_eq!(Theme::parse(""), Theme::Classic);
    }

    #[test]
    fn unknown_mask_falls_back_to_solid() {
        assert_eq!(MaskKind::parse("plasma"), MaskKind::Solid);
        assert_eq!(MaskKind::parse("Radial Gradient"), MaskKind::Radial);
    }

    #[test]
    fn error_correction_defaults_to_m() {
        assert_eq!(ErrorCorrection::parse("q"), ErrorCorrection::Q);
        assert_eq!(ErrorCorrection::parse("X"), ErrorCorrection::M);
        assert_eq!(ErrorCorrection::parse(""), ErrorCorrection::M);
    }

    #[test]
    fn image_mask_without_image_resolves_to_solid() {
        let cfg = StyleConfig {
            mask: MaskKind::Image,
            mask_image_path: None,
            ..StyleConfig::default()
        };
        let (_, mask) = resolve(&cfg);
        assert_eq!(mask, ColorMask::solid(cfg.fg, cfg.bg));
    }

    #[test]
    fn unreadable_mask_image_resolves_to_solid() {
        let cfg = StyleConfig {
            mask: MaskKind::Image,
            mask_image_path: Some("/nonexistent/mask.png".into()),
            ..StyleConfig::default()
        };
        let (_, mask) = resolve(&cfg);
        assert_eq!(mask, ColorMask::solid(cfg.fg, cfg.bg));
    }

    #[test]
    fn gradient_middle_is_component_average() {
        let cfg = StyleConfig {
            mask: MaskKind::Radial,
            ..StyleConfig::default()
        };
        let (_, mask) = resolve(&cfg);
        match mask {
            ColorMask::Radial { center, edge, back } => {
                assert_eq!(center, cfg.fg.mix(cfg.bg));
                assert_eq!(edge, cfg.fg);
                assert_eq!(back, cfg.bg);
            }
            other => panic!("expected radial mask, got {other:?}"),
        }
    }
}
