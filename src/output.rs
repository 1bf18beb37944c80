use crossterm::style::{Color as TermColor, Stylize};
use serde::Serialize;

use crate::color::Color;
use crate::pipeline::assign::{assign_roles, SemanticRoles};
use crate::pipeline::contrast::AccessibilityReport;
use crate::pipeline::extract::ExtractedColor;

/// Contrast of one palette color against the report's reference color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastEntry {
    pub hex: String,
    #[serde(flatten)]
    pub report: AccessibilityReport,
}

/// Everything the CLI prints about one extraction.
#[derive(Debug, Clone, Serialize)]
pub struct PaletteReport<'a> {
    pub colors: &'a [ExtractedColor],
    pub roles: SemanticRoles<'a>,
    /// Hex of the color contrast is measured against.
    pub reference: Option<String>,
    pub contrast: Vec<ContrastEntry>,
}

impl<'a> PaletteReport<'a> {
    /// Build a report; contrast is measured against `against` or, when
    /// absent, the background role.
    pub fn new(colors: &'a [ExtractedColor], against: Option<Color>) -> Self {
        let roles = assign_roles(colors);
        let reference = against.or_else(|| roles.background.map(|c| c.rgb));
        let contrast = reference
            .map(|reference| {
                colors
                    .iter()
                    .map(|c| ContrastEntry {
                        hex: c.hex.clone(),
                        report: AccessibilityReport::for_pair(&c.rgb, &reference),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            colors,
            roles,
            reference: reference.map(Color::to_hex),
            contrast,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        if self.colors.is_empty() {
            return "no colors extracted\n".to_string();
        }

        let mut out = String::new();
        for (i, c) in self.colors.iter().enumerate() {
            out.push_str(&format!(
                "{:>2}  {}  {:<20} {:<26} {:>5.1}%\n",
                i + 1,
                c.hex,
                c.hsl.to_string(),
                c.oklch.to_string(),
                c.percentage
            ));
        }

        out.push('\n');
        for (role, color) in [
            ("primary", self.roles.primary),
            ("accent", self.roles.accent),
            ("background", self.roles.background),
        ] {
            let hex = color.map_or("-", |c| c.hex.as_str());
            out.push_str(&format!("{role:<11} {hex}\n"));
        }

        if let Some(reference) = &self.reference {
            out.push_str(&format!("\ncontrast against {reference}\n"));
            for entry in &self.contrast {
                let compliance = entry.report.compliance;
                out.push_str(&format!(
                    "{}  {:>5.2}:1  normal {:<8} large {:<8} ui {}\n",
                    entry.hex,
                    entry.report.ratio,
                    compliance.normal_text.to_string(),
                    compliance.large_text.to_string(),
                    compliance.ui_components
                ));
            }
        }

        out
    }

    /// One true-color swatch line per color.
    pub fn preview(&self) -> String {
        self.colors
            .iter()
            .map(|c| {
                let swatch = "        ".on(TermColor::Rgb {
                    r: c.rgb.r,
                    g: c.rgb.g,
                    b: c.rgb.b,
                });
                format!("{swatch} {} {:>5.1}%\n", c.hex, c.percentage)
            })
            .collect()
    }
}
