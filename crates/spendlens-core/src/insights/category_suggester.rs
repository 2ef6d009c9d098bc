//! Keyword-based category suggestion
//!
//! Scores a free-text transaction description against a fixed keyword list
//! per well-known category name and suggests the best match. The lexicon is
//! injected, read-only configuration; the built-in table covers the common
//! spending categories. Corrections are accepted through a validation-only
//! hook so a learning backend can be added without changing callers.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, CategoryId, UserId};
use crate::store::CategoryStore;

use super::types::CategorySuggestion;

/// Category used when nothing matches
const DEFAULT_CATEGORY_NAME: &str = "Other Expense";

/// Confidence reported for the default suggestion
const DEFAULT_CONFIDENCE: f64 = 30.0;

/// Keyword substrings per well-known category display name
const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    (
        "Food & Dining",
        &[
            "restaurant", "cafe", "coffee", "pizza", "burger", "food", "dining", "mcdonald",
            "starbucks", "subway", "chipotle", "domino", "kfc", "taco", "wendy",
        ],
    ),
    (
        "Groceries",
        &[
            "grocery", "supermarket", "walmart", "target", "costco", "safeway", "kroger",
            "whole foods", "trader joe", "aldi", "market",
        ],
    ),
    (
        "Transportation",
        &[
            "uber", "lyft", "taxi", "gas", "fuel", "shell", "chevron", "exxon", "bp", "parking",
            "metro", "transit", "bus", "train",
        ],
    ),
    ("Rent", &["rent", "lease", "apartment", "housing", "landlord"]),
    (
        "Utilities",
        &[
            "electric", "water", "gas", "internet", "phone", "utility", "verizon", "at&t",
            "comcast", "spectrum", "t-mobile",
        ],
    ),
    (
        "Healthcare",
        &[
            "doctor", "hospital", "pharmacy", "medical", "health", "clinic", "cvs", "walgreens",
            "medicine", "prescription",
        ],
    ),
    (
        "Entertainment",
        &[
            "movie", "cinema", "netflix", "spotify", "hulu", "disney", "game", "theater",
            "concert", "ticket", "entertainment",
        ],
    ),
    (
        "Shopping",
        &[
            "amazon", "ebay", "shop", "store", "mall", "clothing", "fashion", "nike", "adidas",
            "zara", "h&m",
        ],
    ),
    (
        "Education",
        &[
            "school", "university", "college", "course", "tuition", "book", "education",
            "learning", "udemy", "coursera",
        ],
    ),
    (
        "Travel",
        &[
            "hotel", "flight", "airline", "airbnb", "booking", "expedia", "travel", "vacation",
            "trip", "airport",
        ],
    ),
    (
        "Insurance",
        &["insurance", "policy", "premium", "geico", "state farm", "allstate"],
    ),
];

static DEFAULT_LEXICON: Lazy<KeywordLexicon> = Lazy::new(|| {
    KeywordLexicon::from_entries(DEFAULT_TABLE.iter().map(|(name, keywords)| {
        (
            (*name).to_string(),
            keywords.iter().map(|k| (*k).to_string()).collect(),
        )
    }))
});

/// Immutable mapping from category display name to keyword substrings
#[derive(Debug, Clone)]
pub struct KeywordLexicon {
    entries: HashMap<String, Vec<String>>,
}

impl KeywordLexicon {
    /// Build a lexicon from (category name, keywords) pairs
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Keyword list for a category name, if the lexicon covers it
    pub fn keywords_for(&self, category_name: &str) -> Option<&[String]> {
        self.entries.get(category_name).map(|k| k.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}

/// Suggests categories for free-text descriptions by keyword overlap
pub struct CategorySuggester<'a> {
    categories: &'a dyn CategoryStore,
    lexicon: KeywordLexicon,
}

impl<'a> CategorySuggester<'a> {
    pub fn new(categories: &'a dyn CategoryStore) -> Self {
        Self {
            categories,
            lexicon: KeywordLexicon::default(),
        }
    }

    pub fn with_lexicon(categories: &'a dyn CategoryStore, lexicon: KeywordLexicon) -> Self {
        Self {
            categories,
            lexicon,
        }
    }

    /// Best-guess category for `description` among the user's visible
    /// categories; Ok(None) when nothing matches and no default category
    /// exists.
    pub fn suggest(
        &self,
        description: &str,
        user: UserId,
    ) -> Result<Option<CategorySuggestion>> {
        if description.trim().is_empty() {
            return self.default_suggestion(user);
        }

        let lowered = description.to_lowercase();
        let visible = self.categories.visible_categories(user)?;

        let mut best: Option<(&Category, f64)> = None;
        for category in &visible {
            let score = self.match_score(&lowered, &category.name);
            if score <= 0.0 {
                continue;
            }
            let better = match best {
                None => true,
                // Equal scores resolve to the lowest category id
                Some((current, best_score)) => {
                    score > best_score || (score == best_score && category.id < current.id)
                }
            };
            if better {
                best = Some((category, score));
            }
        }

        if let Some((category, score)) = best {
            let confidence = (score * 100.0).min(100.0);
            debug!(
                user,
                category_id = category.id,
                confidence,
                "Keyword match for description"
            );
            return Ok(Some(CategorySuggestion {
                category_id: category.id,
                category_name: category.name.clone(),
                confidence,
                reason: format!("Matched keywords in description: '{}'", description),
            }));
        }

        self.default_suggestion(user)
    }

    /// Fraction of the category's keyword list found in the description
    fn match_score(&self, description: &str, category_name: &str) -> f64 {
        let Some(keywords) = self.lexicon.keywords_for(category_name) else {
            return 0.0;
        };
        if keywords.is_empty() {
            return 0.0;
        }
        let matches = keywords
            .iter()
            .filter(|k| description.contains(k.as_str()))
            .count();
        matches as f64 / keywords.len() as f64
    }

    fn default_suggestion(&self, user: UserId) -> Result<Option<CategorySuggestion>> {
        let visible = self.categories.visible_categories(user)?;
        Ok(visible
            .into_iter()
            .find(|c| c.name == DEFAULT_CATEGORY_NAME)
            .map(|c| CategorySuggestion {
                category_id: c.id,
                category_name: c.name,
                confidence: DEFAULT_CONFIDENCE,
                reason: "No specific keywords matched, using default category".to_string(),
            }))
    }

    /// Accept a user correction for a description.
    ///
    /// Inputs are validated; the correction itself is not stored. This is the
    /// seam where a learning backend plugs in.
    pub fn record_correction(
        &self,
        description: &str,
        category_id: CategoryId,
        user: UserId,
    ) -> Result<()> {
        if description.trim().is_empty() {
            return Err(Error::InvalidState(
                "Correction description is empty".to_string(),
            ));
        }
        let visible = self.categories.visible_categories(user)?;
        if !visible.iter().any(|c| c.id == category_id) {
            return Err(Error::NotFound(format!(
                "Category {} is not visible to user {}",
                category_id, user
            )));
        }
        debug!(user, category_id, "Categorization correction received");
        Ok(())
    }
}
