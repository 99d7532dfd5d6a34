//! Hex color parsing and mixing shared by styling, config, and export.
//!
//! Colors travel as `#rrggbb` strings in config documents and batch
//! manifests; everything past the parsing boundary works with [`Rgb`].

use image::Rgba;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rgb` or `#rrggbb` hex string (leading `#` optional).
    /// Three-digit forms expand digit-wise (`#1af` -> `#11aaff`).
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Parse with a fallback for invalid input. Callers pass black for
    /// foreground slots and white for background slots.
    pub fn parse_or(s: &str, default: Self) -> Self {
        Self::parse(s).unwrap_or(default)
    }

    /// Component-wise average of two colors. Used as the gradient middle
    /// color between foreground and background.
    pub fn mix(self, other: Self) -> Self {
        Self {
            r: ((self.r as u16 + other.r as u16) / 2) as u8,
            g: ((self.g as u16 + other.g as u16) / 2) as u8,
            b: ((self.b as u16 + other.b as u16) / 2) as u8,
        }
    }

    /// Linear interpolation from `self` (t=0) to `other` (t=1).
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}
