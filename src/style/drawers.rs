//! Module shape drawers.
//!
//! A drawer decides, per pixel inside a module's box, whether the pixel
//! belongs to the module shape. The renderer walks every dark module and
//! asks the drawer for coverage; colors come separately from the mask.

use super::Theme;

/// Fraction of the box kept by the gapped-square theme (0.8 of the side).
const GAP_RATIO: f32 = 0.8;

/// Fraction of the box kept across the bar axis by the bar themes.
const BAR_RATIO: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleDrawer {
    Square,
    Rounded,
    Circle,
    Gapped,
    VerticalBars,
    HorizontalBars,
}

impl ModuleDrawer {
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Classic => ModuleDrawer::Square,
            Theme::Rounded => ModuleDrawer::Rounded,
            Theme::Circular => ModuleDrawer::Circle,
            Theme::Gapped => ModuleDrawer::Gapped,
            Theme::VerticalBars => ModuleDrawer::VerticalBars,
            Theme::HorizontalBars => ModuleDrawer::HorizontalBars,
        }
    }

    /// Whether pixel `(dx, dy)` of a `box_px`-sized module box is covered.
    pub fn covers(self, dx: u32, dy: u32, box_px: u32) -> bool {
        let size = box_px as f32;
        // Pixel center coordinates within the box.
        let x = dx as f32 + 0.5;
        let y = dy as f32 + 0.5;
        match self {
            ModuleDrawer::Square => true,
            ModuleDrawer::Gapped => {
                let margin = size * (1.0 - GAP_RATIO) / 2.0;
                x >= margin && x <= size - margin && y >= margin && y <= size - margin
            }
            ModuleDrawer::Circle => {
                let r = size / 2.0;
                let (cx, cy) = (r, r);
                (x - cx).powi(2) + (y - cy).powi(2) <= r * r
            }
            ModuleDrawer::Rounded => {
                let r = size / 3.0;
                // Inside unless the pixel sits in a corner square beyond
                // the corner circle.
                let corner_x = if x < r {
                    Some(r)
                } else if x > size - r {
                    Some(size - r)
                } else {
                    None
                };
                let corner_y = if y < r {
                    Some(r)
                } else if y > size - r {
                    Some(size - r)
                } else {
                    None
                };
                match (corner_x, corner_y) {
                    (Some(cx), Some(cy)) => (x - cx).powi(2) + (y - cy).powi(2) <= r * r,
                    _ => true,
                }
            }
            ModuleDrawer::VerticalBars => {
                // Full height so vertically adjacent modules connect.
                let margin = size * (1.0 - BAR_RATIO) / 2.0;
                x >= margin && x <= size - margin
            }
            ModuleDrawer::HorizontalBars => {
                let margin = size * (1.0 - BAR_RATIO) / 2.0;
                y >= margin && y <= size - margin
            }
        }
    }
}
