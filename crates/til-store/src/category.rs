//! The fixed set of fact categories and the list filter built on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tag color used when a category has no entry in the injected palette.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

/// Sentinel filter value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// One of the eight topical tags a fact can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technology,
    Science,
    Finance,
    Society,
    Entertainment,
    Health,
    History,
    News,
}

impl Category {
    /// Every category, in sidebar order.
    pub const ALL: [Category; 8] = [
        Category::Technology,
        Category::Science,
        Category::Finance,
        Category::Society,
        Category::Entertainment,
        Category::Health,
        Category::History,
        Category::News,
    ];

    /// Column value stored in the table.
    pub fn name(self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::Science => "science",
            Category::Finance => "finance",
            Category::Society => "society",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::History => "history",
            Category::News => "news",
        }
    }

    /// Display color of the category tag.
    pub fn color(self) -> &'static str {
        match self {
            Category::Technology => "#3b82f6",
            Category::Science => "#16a34a",
            Category::Finance => "#ef4444",
            Category::Society => "#eab308",
            Category::Entertainment => "#db2777",
            Category::Health => "#14b8a6",
            Category::History => "#f97316",
            Category::News => "#8b5cf6",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Which facts the list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Whether a fact in `category` passes this filter.
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    /// Query-string form: `all` or a category name.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(c) => c.name(),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_CATEGORIES {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

/// Category palette injected into the view layer at startup.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    entries: Vec<(Category, String)>,
}

impl Categories {
    /// Build a palette from explicit `(category, color)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (Category, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    /// Tag color for `category`, falling back to [`DEFAULT_CATEGORY_COLOR`].
    pub fn color_of(&self, category: Category) -> &str {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, color)| color.as_str())
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::new(Category::ALL.map(|c| (c, c.color().to_string())))
    }
}
