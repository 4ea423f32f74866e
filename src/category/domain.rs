//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The emoji a category can use as its icon.
pub const EMOJI_OPTIONS: [&str; 12] = [
    "💰", "🍽️", "🚗", "🛍️", "🎬", "💡", "🏥", "✈️", "🏠", "📱", "⛽", "🎓",
];

/// The colours a category can be drawn in.
pub const COLOR_OPTIONS: [&str; 8] = [
    "#ef4444", "#3b82f6", "#8b5cf6", "#f59e0b", "#10b981", "#ec4899", "#6b7280", "#f97316",
];

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] if nothing is left after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation, e.g. for names read from
    /// the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the [EMOJI_OPTIONS].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryIcon(String);

impl CategoryIcon {
    /// The icon shown for expenses without a category.
    pub const FALLBACK: &'static str = EMOJI_OPTIONS[0];

    /// # Errors
    ///
    /// Returns [Error::InvalidCategoryStyle] if `icon` is not one of the
    /// [EMOJI_OPTIONS].
    pub fn new(icon: &str) -> Result<Self, Error> {
        if EMOJI_OPTIONS.contains(&icon) {
            Ok(Self(icon.to_owned()))
        } else {
            Err(Error::InvalidCategoryStyle(icon.to_owned()))
        }
    }

    /// Create a category icon without validation, e.g. for icons read from
    /// the database.
    pub fn new_unchecked(icon: &str) -> Self {
        Self(icon.to_owned())
    }
}

impl Default for CategoryIcon {
    fn default() -> Self {
        Self(Self::FALLBACK.to_owned())
    }
}

impl AsRef<str> for CategoryIcon {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One of the [COLOR_OPTIONS], as a lower case hex string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// The colour used for expenses without a category.
    pub const FALLBACK: &'static str = COLOR_OPTIONS[1];

    /// # Errors
    ///
    /// Returns [Error::InvalidCategoryStyle] if `color` is not one of the
    /// [COLOR_OPTIONS]. The comparison ignores case.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim().to_lowercase();

        if COLOR_OPTIONS.contains(&color.as_str()) {
            Ok(Self(color))
        } else {
            Err(Error::InvalidCategoryStyle(color))
        }
    }

    /// Create a category colour without validation, e.g. for colours read
    /// from the database.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl Default for CategoryColor {
    fn default() -> Self {
        Self(Self::FALLBACK.to_owned())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user's grouping for expenses, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub icon: CategoryIcon,
    pub color: CategoryColor,
}

/// Form data for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub icon: String,
    pub color: String,
}
