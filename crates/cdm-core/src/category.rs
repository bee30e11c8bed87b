//! Charity categories and their expansion into provider text queries.
//!
//! A category is a closed set of selectors. Each fixed category maps to a short
//! list of broad queries; [`Category::Other`] turns the user's free text into
//! the term itself plus a `"<term> near me"` variant. Query order only decides
//! the fan-out order; presentation order is by distance.

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    All,
    Food,
    Health,
    Education,
    Other,
}

const ALL_QUERIES: &[&str] = &[
    "charity near me",
    "nonprofit near me",
    "foundation near me",
    "donation center near me",
];
const FOOD_QUERIES: &[&str] = &["food bank near me", "food pantry near me", "soup kitchen near me"];
const HEALTH_QUERIES: &[&str] = &[
    "health charity near me",
    "hospital foundation near me",
    "blood donation near me",
];
const EDUCATION_QUERIES: &[&str] = &[
    "education charity near me",
    "scholarship foundation near me",
    "tutoring nonprofit near me",
];

/// Accepted spellings when parsing a category from user input.
static ALIASES: phf::Map<&'static str, Category> = phf_map! {
    "all" => Category::All,
    "charities" => Category::All,
    "charity" => Category::All,
    "food" => Category::Food,
    "health" => Category::Health,
    "medical" => Category::Health,
    "education" => Category::Education,
    "school" => Category::Education,
    "other" => Category::Other,
    "custom" => Category::Other,
};

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::Food,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    /// Label shown on category chips.
    pub fn label(self) -> &'static str {
        match self {
            Category::All => "Charities",
            Category::Food => "Food",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    /// Fixed query list for this category. Empty for [`Category::Other`],
    /// whose queries come from free text.
    pub fn fixed_queries(self) -> &'static [&'static str] {
        match self {
            Category::All => ALL_QUERIES,
            Category::Food => FOOD_QUERIES,
            Category::Health => HEALTH_QUERIES,
            Category::Education => EDUCATION_QUERIES,
            Category::Other => &[],
        }
    }

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        Category::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Next category, wrapping around.
    pub fn next(self) -> Self {
        Category::ALL[(self.index() + 1) % Category::ALL.len()]
    }

    /// Previous category, wrapping around.
    pub fn prev(self) -> Self {
        let len = Category::ALL.len();
        Category::ALL[(self.index() + len - 1) % len]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALIASES
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("unknown category {s:?} (expected all, food, health, education or other)"))
    }
}

/// Expand a category selection into the ordered provider queries to run.
///
/// Pure and total. An empty result is the "nothing to search" signal, which
/// only happens for [`Category::Other`] with blank free text.
pub fn expand(category: Category, free_text: Option<&str>) -> Vec<String> {
    match category {
        Category::Other => {
            let term = free_text.unwrap_or_default().trim();
            if term.is_empty() {
                Vec::new()
            } else {
                vec![term.to_string(), format!("{term} near me")]
            }
        }
        fixed => fixed.fixed_queries().iter().map(|q| q.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
