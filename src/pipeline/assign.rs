use serde::Serialize;

use crate::pipeline::extract::{hue_distance, ExtractedColor};

/// Saturation (percent) above which a color can take the primary/accent role.
const ROLE_MIN_SATURATION: f64 = 30.0;
/// Exclusive lightness window (percent) for primary/accent candidates.
const ROLE_LIGHTNESS: (f64, f64) = (25.0, 75.0);
/// Minimum hue separation between primary and a preferred accent.
const ACCENT_MIN_HUE_DISTANCE: f64 = 30.0;
/// Lightness (percent) above which a color is a natural background.
const BACKGROUND_MIN_LIGHTNESS: f64 = 80.0;

/// Role assignment over an extracted palette. Every role borrows from the
/// slice passed to [`assign_roles`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SemanticRoles<'a> {
    pub primary: Option<&'a ExtractedColor>,
    pub accent: Option<&'a ExtractedColor>,
    pub background: Option<&'a ExtractedColor>,
}

fn is_vibrant(color: &ExtractedColor) -> bool {
    let (lo, hi) = ROLE_LIGHTNESS;
    color.hsl.s > ROLE_MIN_SATURATION && color.hsl.l > lo && color.hsl.l < hi
}

/// First element with the highest key; later ties never replace it.
fn first_max_by<'a, I, F>(iter: I, key: F) -> Option<&'a ExtractedColor>
where
    I: IntoIterator<Item = &'a ExtractedColor>,
    F: Fn(&ExtractedColor) -> f64,
{
    iter.into_iter()
        .reduce(|best, candidate| if key(candidate) > key(best) { candidate } else { best })
}

/// Pick primary, accent and background colors from an extracted palette.
pub fn assign_roles(colors: &[ExtractedColor]) -> SemanticRoles<'_> {
    let vibrant: Vec<&ExtractedColor> = colors.iter().filter(|c| is_vibrant(c)).collect();

    let primary = first_max_by(vibrant.iter().copied(), |c| c.hsl.s * c.percentage)
        .or_else(|| colors.first());

    let accent = primary.and_then(|primary| {
        first_max_by(
            vibrant
                .iter()
                .copied()
                .filter(|c| hue_distance(c.hsl.h, primary.hsl.h) > ACCENT_MIN_HUE_DISTANCE),
            |c| c.hsl.s,
        )
    });
    let accent = accent
        .or_else(|| vibrant.get(1).copied())
        .or_else(|| colors.get(1));

    let background = first_max_by(
        colors.iter().filter(|c| c.hsl.l > BACKGROUND_MIN_LIGHTNESS),
        |c| c.hsl.l,
    )
    .or_else(|| {
        first_max_by(
            colors.iter().filter(|c| c.hsl.s <= ROLE_MIN_SATURATION),
            |c| c.hsl.l,
        )
    })
    .or_else(|| colors.last());

    SemanticRoles {
        primary,
        accent,
        background,
    }
}
