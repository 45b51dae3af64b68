//! Category naming and color assignment rules.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::types::DbId;

/// Name of the fallback category every note without an explicit category lands in.
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorized";

/// Color used when no palette color is available or a category has no color.
pub const DEFAULT_CATEGORY_COLOR: &str = "#FFFFFF";

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 50;

/// How a newly created category gets its color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorChoice {
    /// Reference a shared palette row.
    Palette(DbId),
    /// Store the color inline on the category.
    Inline(String),
}

impl ColorChoice {
    pub fn color_id(&self) -> Option<DbId> {
        match self {
            Self::Palette(id) => Some(*id),
            Self::Inline(_) => None,
        }
    }

    pub fn inline_color(&self) -> Option<&str> {
        match self {
            Self::Palette(_) => None,
            Self::Inline(color) => Some(color),
        }
    }
}

/// Pick the color for a new category.
///
/// Preference order: a palette color the user has not used yet, then any
/// palette color at random, then [`DEFAULT_CATEGORY_COLOR`] inline.
pub fn choose_color<R: Rng + ?Sized>(
    unassigned: Option<DbId>,
    palette: &[DbId],
    rng: &mut R,
) -> ColorChoice {
    if let Some(id) = unassigned {
        return ColorChoice::Palette(id);
    }
    match palette.choose(rng) {
        Some(id) => ColorChoice::Palette(*id),
        None => ColorChoice::Inline(DEFAULT_CATEGORY_COLOR.to_string()),
    }
}

/// Normalize a submitted category name.
///
/// Surrounding whitespace is dropped and a blank name counts as no name.
/// Names longer than [`MAX_CATEGORY_NAME_LENGTH`] characters are rejected.
pub fn normalize_category_name(name: Option<&str>) -> Result<Option<String>, String> {
    let Some(trimmed) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(format!(
            "Category name exceeds maximum length of {MAX_CATEGORY_NAME_LENGTH} characters"
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Effective display color: the palette color wins over the inline one, and a
/// category with neither shows [`DEFAULT_CATEGORY_COLOR`].
pub fn effective_color(palette: Option<&str>, inline: Option<&str>) -> String {
    palette
        .or(inline)
        .unwrap_or(DEFAULT_CATEGORY_COLOR)
        .to_string()
}
