//! Spend categorization
//!
//! Categories are matched by case-insensitive substring against the
//! transaction description. Rules are checked in table order and the first
//! match wins; anything unmatched is `Other`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Spending category for an outflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpendCategory {
    FoodAndDining,
    Transportation,
    Shopping,
    Housing,
    Entertainment,
    Other,
}

impl SpendCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SpendCategory::FoodAndDining => "Food & Dining",
            SpendCategory::Transportation => "Transportation",
            SpendCategory::Shopping => "Shopping",
            SpendCategory::Housing => "Housing",
            SpendCategory::Entertainment => "Entertainment",
            SpendCategory::Other => "Other",
        }
    }
}

impl fmt::Display for SpendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ordered rule table. Keywords are lowercase.
pub const RULES: &[(SpendCategory, &[&str])] = &[
    (SpendCategory::FoodAndDining, &["grocery", "restaurant", "food"]),
    (SpendCategory::Transportation, &["gas", "fuel", "uber", "lyft"]),
    (SpendCategory::Shopping, &["amazon", "online", "shopping"]),
    (SpendCategory::Housing, &["rent", "mortgage", "utilities"]),
    (SpendCategory::Entertainment, &["netflix", "spotify", "entertainment"]),
];

/// Categorize a transaction description
pub fn categorize(description: &str) -> SpendCategory {
    let lowered = description.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(SpendCategory::Other)
}
