//! Color constants and auto-scaling helpers for the TUI.

use ratatui::style::Color;

/// Demand line color.
pub const DEMAND_COLOR: Color = Color::White;
/// Total supply line color.
pub const SUPPLY_COLOR: Color = Color::Cyan;
/// Wind + solar line color.
pub const RENEWABLE_COLOR: Color = Color::Green;
/// Battery gauge color when high (>= 50%).
pub const CHARGE_HIGH: Color = Color::Green;
/// Battery gauge color when medium (>= 20%).
pub const CHARGE_MID: Color = Color::Yellow;
/// Battery gauge color when low (< 20%).
pub const CHARGE_LOW: Color = Color::Red;
/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Gas plant running indicator.
pub const GAS_ACTIVE: Color = Color::LightRed;
/// Unstable grid indicator.
pub const UNSTABLE: Color = Color::Red;

/// Returns a color for a battery charge percentage.
pub fn charge_color(pct: f64) -> Color {
    if pct >= 50.0 {
        CHARGE_HIGH
    } else if pct >= 20.0 {
        CHARGE_MID
    } else {
        CHARGE_LOW
    }
}

/// Computes Y-axis bounds over every series with 10% padding.
pub fn auto_bounds_y(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let all = series.iter().flat_map(|s| s.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = (max - min).max(1.0);
    let pad = range * 0.1;
    [(min - pad).max(0.0), max + pad]
}
