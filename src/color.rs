use palette::{FromColor, IntoColor, OklabHue, Srgb};
use serde::Serialize;

use crate::error::ColorParseError;

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components and provides conversions to HSL, OKLCH and hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Public HSL form: hue in degrees `[0, 360)`, saturation and lightness in
/// percent `[0, 100]`.
///
/// Values produced by [`Color::to_hsl`] are rounded to integers. Internally
/// the conversions work on fractional `[0, 1]` saturation and lightness; the
/// percent scaling happens only in `to_hsl`, `to_hsl_precise` and `from_hsl`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// OKLCH: lightness `[0, 1]`, chroma `>= 0`, hue in degrees `[0, 360)`.
///
/// Values produced by [`Color::to_oklch`] are rounded: `l` and `c` to three
/// decimals, `h` to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// sRGB transfer function decode, shared by OKLCH and WCAG luminance.
pub(crate) fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Piecewise helper for HSL → RGB. `t` is a hue offset in turns.
fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let len = hex.chars().count();
        if len != 6 {
            return Err(ColorParseError::Length(len));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digits(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ColorParseError::Digits(hex.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Serialize to uppercase hex `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Unrounded HSL with hue in degrees and fractional saturation/lightness.
    fn hsl_fractions(self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        (h * 60.0, s, l)
    }

    /// Convert to the public, integer-rounded HSL form.
    pub fn to_hsl(self) -> Hsl {
        let (h, s, l) = self.hsl_fractions();
        Hsl {
            // 359.5.. rounds up to 360, which wraps to 0
            h: h.round().rem_euclid(360.0),
            s: (s * 100.0).round(),
            l: (l * 100.0).round(),
        }
    }

    /// HSL in percent units without rounding. Converts back losslessly
    /// (within ±1 per channel) through [`Color::from_hsl`].
    pub fn to_hsl_precise(self) -> Hsl {
        let (h, s, l) = self.hsl_fractions();
        Hsl {
            h,
            s: s * 100.0,
            l: l * 100.0,
        }
    }

    /// Convert from percent-unit HSL.
    pub fn from_hsl(hsl: Hsl) -> Self {
        let h = hsl.h.rem_euclid(360.0) / 360.0;
        let s = hsl.s / 100.0;
        let l = hsl.l / 100.0;

        let to_u8 = |v: f64| (v * 255.0).round() as u8;

        if s == 0.0 {
            let v = to_u8(l);
            return Self { r: v, g: v, b: v };
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self {
            r: to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            g: to_u8(hue_to_rgb(p, q, h)),
            b: to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        }
    }

    /// Convert to rounded OKLCH.
    ///
    /// sRGB decode, linear RGB → LMS, cube root, LMS' → OKLab, then polar.
    /// Matrices are Björn Ottosson's OKLab reference values.
    pub fn to_oklch(self) -> Oklch {
        let r = srgb_to_linear(self.r);
        let g = srgb_to_linear(self.g);
        let b = srgb_to_linear(self.b);

        let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
        let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
        let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        let lightness = 0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_;
        let a = 1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_;
        let b = 0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_;

        let chroma = (a * a + b * b).sqrt();
        let mut hue = b.atan2(a).to_degrees();
        if hue < 0.0 {
            hue += 360.0;
        }

        Oklch {
            l: round_to(lightness, 3),
            c: round_to(chroma, 3),
            h: round_to(hue, 1).rem_euclid(360.0),
        }
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    fn to_palette_oklch(self) -> palette::Oklch {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    fn from_palette_oklch(oklch: palette::Oklch) -> Self {
        let srgb_f32: Srgb<f32> = Srgb::from_color(oklch);
        Self::from_srgb_f32_clamped(srgb_f32)
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// WCAG 2.1 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f64 {
        let r = srgb_to_linear(self.r);
        let g = srgb_to_linear(self.g);
        let b = srgb_to_linear(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG 2.1 contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f64 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Adjust Oklch lightness by `delta`. Positive = lighter, negative = darker.
    /// Lightness is clamped to [0, 1].
    pub fn adjust_lightness(self, delta: f32) -> Color {
        let mut oklch = self.to_palette_oklch();
        oklch.l = (oklch.l + delta).clamp(0.0, 1.0);
        Color::from_palette_oklch(oklch)
    }

    /// Rotate the Oklch hue by `degrees`, keeping lightness and chroma.
    pub fn rotate_hue(self, degrees: f32) -> Color {
        let mut oklch = self.to_palette_oklch();
        oklch.hue = OklabHue::from(f32::from(oklch.hue) + degrees);
        Color::from_palette_oklch(oklch)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Hsl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.h, self.s, self.l)
    }
}

/// CSS Color 4 notation, e.g. `oklch(0.628 0.258 29.2)`.
impl std::fmt::Display for Oklch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "oklch({} {} {})", self.l, self.c, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color::BLACK;
    const WHITE: Color = Color::WHITE;

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.to_hex(), "#FF8800");
    }

    #[test]
    fn hex_is_zero_padded_uppercase() {
        assert_eq!(Color::new(1, 10, 171).to_hex(), "#010AAB");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#AABBCC");
    }

    #[test]
    fn hex_invalid_length() {
        assert_eq!(Color::from_hex("#fff"), Err(ColorParseError::Length(3)));
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(matches!(
            Color::from_hex("#gggggg"),
            Err(ColorParseError::Digits(_))
        ));
    }

    #[test]
    fn hex_rejects_multibyte_input() {
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(
            Color::new(255, 0, 0).to_hsl(),
            Hsl {
                h: 0.0,
                s: 100.0,
                l: 50.0
            }
        );
        assert_eq!(Color::new(0, 255, 0).to_hsl().h, 120.0);
        assert_eq!(Color::new(0, 0, 255).to_hsl().h, 240.0);
    }

    #[test]
    fn hsl_of_gray_has_no_hue_or_saturation() {
        let hsl = Color::new(136, 136, 136).to_hsl();
        assert_eq!(hsl.h, 0.0);
        assert_eq!(hsl.s, 0.0);
        assert_eq!(hsl.l, 53.0);
    }

    #[test]
    fn hsl_rounds_to_integers() {
        let hsl = Color::new(230, 57, 70).to_hsl();
        assert_eq!(
            hsl,
            Hsl {
                h: 355.0,
                s: 78.0,
                l: 56.0
            }
        );
    }

    #[test]
    fn hsl_hue_wraps_at_360() {
        // raw hue is ~359.76°
        assert_eq!(Color::new(255, 0, 1).to_hsl().h, 0.0);
    }

    #[test]
    fn hsl_precise_round_trip() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(33, 250, 42),
            Color::new(0, 0, 1),
            Color::new(128, 128, 128),
            BLACK,
            WHITE,
        ];
        for original in colors {
            let recovered = Color::from_hsl(original.to_hsl_precise());
            assert!(
                (original.r as i16 - recovered.r as i16).abs() <= 1
                    && (original.g as i16 - recovered.g as i16).abs() <= 1
                    && (original.b as i16 - recovered.b as i16).abs() <= 1,
                "{original:?} came back as {recovered:?}"
            );
        }
    }

    #[test]
    fn from_hsl_known_values() {
        let red = Color::from_hsl(Hsl {
            h: 0.0,
            s: 100.0,
            l: 50.0,
        });
        assert_eq!(red, Color::new(255, 0, 0));

        let navy = Color::from_hsl(Hsl {
            h: 240.0,
            s: 100.0,
            l: 25.0,
        });
        assert_eq!(navy, Color::new(0, 0, 128));
    }

    #[test]
    fn oklch_reference_values() {
        assert_eq!(
            Color::new(255, 0, 0).to_oklch(),
            Oklch {
                l: 0.628,
                c: 0.258,
                h: 29.2
            }
        );
        assert_eq!(
            Color::new(0, 0, 255).to_oklch(),
            Oklch {
                l: 0.452,
                c: 0.313,
                h: 264.1
            }
        );
    }

    #[test]
    fn oklch_black_and_white() {
        let black = BLACK.to_oklch();
        assert_eq!(black.l, 0.0);
        assert_eq!(black.c, 0.0);

        let white = WHITE.to_oklch();
        assert_eq!(white.l, 1.0);
        assert_eq!(white.c, 0.0);
    }

    #[test]
    fn oklch_agrees_with_palette_crate() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(0, 255, 0),
            Color::new(30, 60, 200),
            Color::new(230, 57, 70),
        ];
        for color in colors {
            let ours = color.to_oklch();
            let theirs = color.to_palette_oklch();
            assert!(
                (ours.l - theirs.l as f64).abs() < 2e-3,
                "L mismatch for {color:?}: {} vs {}",
                ours.l,
                theirs.l
            );
            assert!(
                (ours.c - theirs.chroma as f64).abs() < 2e-3,
                "C mismatch for {color:?}: {} vs {}",
                ours.c,
                theirs.chroma
            );
            let their_hue = theirs.hue.into_positive_degrees() as f64;
            let diff = (ours.h - their_hue).abs();
            assert!(
                diff.min(360.0 - diff) < 0.5,
                "H mismatch for {color:?}: {} vs {their_hue}",
                ours.h
            );
        }
    }

    #[test]
    fn oklch_display_is_css() {
        assert_eq!(
            Color::new(255, 0, 0).to_oklch().to_string(),
            "oklch(0.628 0.258 29.2)"
        );
    }

    #[test]
    fn contrast_ratio_black_white() {
        let ratio = Color::contrast_ratio(&BLACK, &WHITE);
        assert!(
            (ratio - 21.0).abs() < 1e-9,
            "black/white contrast should be 21:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_same_color() {
        let gray = Color::new(128, 128, 128);
        let ratio = Color::contrast_ratio(&gray, &gray);
        assert!(
            (ratio - 1.0).abs() < 0.001,
            "same color contrast should be 1:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_is_symmetric() {
        let a = Color::new(200, 50, 50);
        let b = Color::new(50, 200, 50);
        let ratio_ab = Color::contrast_ratio(&a, &b);
        let ratio_ba = Color::contrast_ratio(&b, &a);
        assert!(
            (ratio_ab - ratio_ba).abs() < 1e-12,
            "contrast ratio should be symmetric: {ratio_ab} vs {ratio_ba}"
        );
    }

    #[test]
    fn contrast_ratio_mid_gray_vs_black() {
        // sRGB(119,119,119) has relative luminance ~0.184
        let gray = Color::new(119, 119, 119);
        let ratio = Color::contrast_ratio(&gray, &BLACK);
        assert!(
            ratio > 4.5 && ratio < 5.0,
            "mid-gray vs black should be ~4.7:1, got {ratio}"
        );
    }

    #[test]
    fn relative_luminance_extremes() {
        assert!(BLACK.relative_luminance() < 1e-9);
        assert!((WHITE.relative_luminance() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn adjust_lightness_increases() {
        let dark = Color::new(50, 50, 50);
        let lighter = dark.adjust_lightness(0.2);
        assert!(
            lighter.relative_luminance() > dark.relative_luminance(),
            "increasing lightness should increase luminance"
        );
    }

    #[test]
    fn adjust_lightness_clamps() {
        let result = WHITE.adjust_lightness(1.0);
        assert!(result.relative_luminance() > 0.9);
    }

    #[test]
    fn rotate_hue_full_turn_is_identity() {
        let color = Color::new(200, 50, 50);
        let rotated = color.rotate_hue(360.0);
        assert!((color.r as i16 - rotated.r as i16).abs() <= 1);
        assert!((color.g as i16 - rotated.g as i16).abs() <= 1);
        assert!((color.b as i16 - rotated.b as i16).abs() <= 1);
    }

    #[test]
    fn rotate_hue_moves_hue() {
        let color = Color::new(200, 50, 50);
        let rotated = color.rotate_hue(120.0);
        let diff = (rotated.to_oklch().h - color.to_oklch().h).abs();
        let diff = diff.min(360.0 - diff);
        assert!(
            (diff - 120.0).abs() < 15.0,
            "hue should move ~120°, moved {diff}"
        );
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
