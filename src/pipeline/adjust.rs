//! Derived palettes. Every function returns a new vector and leaves its input
//! untouched; percentages carry over unchanged.

use crate::color::Color;
use crate::pipeline::extract::ExtractedColor;

fn derive<F>(colors: &[ExtractedColor], f: F) -> Vec<ExtractedColor>
where
    F: Fn(Color) -> Color,
{
    colors
        .iter()
        .map(|c| ExtractedColor::new(f(c.rgb), c.percentage))
        .collect()
}

/// Shift OKLCH lightness of every color by `delta` (clamped to [0, 1]).
pub fn shift_lightness(colors: &[ExtractedColor], delta: f32) -> Vec<ExtractedColor> {
    derive(colors, |rgb| rgb.adjust_lightness(delta))
}

/// Rotate OKLCH hue of every color by `degrees`.
pub fn shift_hue(colors: &[ExtractedColor], degrees: f32) -> Vec<ExtractedColor> {
    derive(colors, |rgb| rgb.rotate_hue(degrees))
}
