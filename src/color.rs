use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

/// Used when a chart colour cannot be parsed.
pub const FALLBACK_COLOR: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Hex colour → Color32
// ---------------------------------------------------------------------------

/// Convert a `#RRGGBB` (or `RRGGBB`) string from a chart description.
pub fn color_from_hex(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex.trim()) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("Invalid colour '{hex}': {e}");
            FALLBACK_COLOR
        }
    }
}
