// SPDX-License-Identifier: MIT OR Apache-2.0
//! Packed ARGB colour helpers for the colour control.

/// Fallback for unreadable colours: opaque black
pub const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// Swatch + alpha view of a packed ARGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorMeta {
    /// Red, green, blue
    pub rgb: [u8; 3],
    /// Alpha as a 0-100 percentage
    pub alpha_percent: u8,
}

impl ColorMeta {
    /// `#rrggbb` form of the swatch
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

/// Split a packed ARGB value into swatch and alpha percentage
pub fn argb_to_color_meta(argb: u32) -> ColorMeta {
    let [alpha, red, green, blue] = argb.to_be_bytes();
    ColorMeta {
        rgb: [red, green, blue],
        alpha_percent: alpha_byte_to_percent(alpha),
    }
}

/// Parse `#rrggbb` (the `#` is optional). Anything else yields black.
pub fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let clean = hex.trim().trim_start_matches('#');
    if clean.len() != 6 || !clean.chars().all(|c| c.is_ascii_hexdigit()) {
        return [0, 0, 0];
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&clean[range], 16).unwrap_or(0);
    [byte(0..2), byte(2..4), byte(4..6)]
}

/// Pack components into a 32-bit ARGB value, alpha first
pub fn rgb_alpha_to_argb(red: u8, green: u8, blue: u8, alpha: u8) -> u32 {
    u32::from_be_bytes([alpha, red, green, blue])
}

/// Alpha byte to a rounded 0-100 percentage
pub fn alpha_byte_to_percent(alpha: u8) -> u8 {
    (f64::from(alpha) / 255.0 * 100.0).round() as u8
}

/// Percentage (clamped to 0-100, non-finite treated as 0) to an alpha byte
pub fn percent_to_alpha_byte(percent: f64) -> u8 {
    let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
    (percent / 100.0 * 255.0).round() as u8
}

/// Parse the alpha text field. Returns the clamped, rounded percentage.
pub fn parse_alpha_percent(text: &str) -> f64 {
    let value = text.trim().parse::<f64>().unwrap_or(0.0);
    if value.is_finite() {
        value.clamp(0.0, 100.0).round()
    } else {
        0.0
    }
}
