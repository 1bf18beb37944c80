use serde::Serialize;

use crate::color::Color;
use crate::error::ColorParseError;

/// WCAG 2.1 thresholds.
pub const AAA_NORMAL_TEXT: f64 = 7.0;
pub const AA_NORMAL_TEXT: f64 = 4.5;
pub const AAA_LARGE_TEXT: f64 = 4.5;
pub const AA_LARGE_TEXT: f64 = 3.0;
pub const AA_UI_COMPONENTS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AA Large")]
    AaLarge,
    Fail,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Level::Aaa => "AAA",
            Level::Aa => "AA",
            Level::AaLarge => "AA Large",
            Level::Fail => "Fail",
        })
    }
}

/// WCAG conformance of one color pair per usage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compliance {
    pub normal_text: Level,
    pub large_text: Level,
    pub ui_components: Level,
}

impl Compliance {
    pub fn from_ratio(ratio: f64) -> Self {
        let normal_text = if ratio >= AAA_NORMAL_TEXT {
            Level::Aaa
        } else if ratio >= AA_NORMAL_TEXT {
            Level::Aa
        } else {
            Level::Fail
        };
        let large_text = if ratio >= AAA_LARGE_TEXT {
            Level::Aaa
        } else if ratio >= AA_LARGE_TEXT {
            Level::AaLarge
        } else {
            Level::Fail
        };
        let ui_components = if ratio >= AA_UI_COMPONENTS {
            Level::Aa
        } else {
            Level::Fail
        };
        Self {
            normal_text,
            large_text,
            ui_components,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccessibilityReport {
    /// Contrast ratio rounded to two decimals.
    pub ratio: f64,
    pub compliance: Compliance,
}

impl AccessibilityReport {
    pub fn for_pair(foreground: &Color, background: &Color) -> Self {
        let ratio = Color::contrast_ratio(foreground, background);
        Self {
            ratio: (ratio * 100.0).round() / 100.0,
            compliance: Compliance::from_ratio(ratio),
        }
    }
}

/// Contrast check for two hex colors, e.g. `#000000` on `#FFFFFF`.
pub fn check_accessibility(
    foreground: &str,
    background: &str,
) -> Result<AccessibilityReport, ColorParseError> {
    let fg = Color::from_hex(foreground)?;
    let bg = Color::from_hex(background)?;
    Ok(AccessibilityReport::for_pair(&fg, &bg))
}
