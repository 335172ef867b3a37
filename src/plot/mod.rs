//! PNG charts. Each renderer owns its drawing surface for the duration of one
//! call; the backend is dropped (and the file closed) on every return path.

pub mod heatmap;
pub mod price;
pub mod volume;

pub use price::plot_btc_price;
pub use volume::plot_polymarket_volume;

use plotters::style::RGBColor;

pub const FONT: &str = "sans-serif";
pub const TITLE_SIZE: i32 = 24;
pub const LABEL_SIZE: i32 = 16;

/// matplotlib's default line/bar blue.
pub const SERIES_BLUE: RGBColor = RGBColor(31, 119, 180);

/// Label for an index axis drawn over `-0.5..n-0.5`: names land on integer
/// ticks, anything between ticks is blank.
pub fn label_at(names: &[String], position: f64) -> String {
    let nearest = position.round();
    if (position - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    names.get(nearest as usize).cloned().unwrap_or_default()
}

/// Blend two colors; `t` is clamped to [0, 1].
pub fn interpolate_color(c1: RGBColor, c2: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| ((1.0 - t) * a as f64 + t * b as f64).round() as u8;
    RGBColor(mix(c1.0, c2.0), mix(c1.1, c2.1), mix(c1.2, c2.2))
}

/// Pad a degenerate `[lo, hi]` so the chart has a non-empty span.
pub fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    } else {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        (lo - pad, hi + pad)
    }
}
