//! Clinical blood-pressure categories.
//!
//! Variants are declared from least to most severe, so the derived `Ord`
//! orders them by severity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the five fixed diagnosis labels a reading can carry.
///
/// The serialized form is the human-readable label ("Hypertension Stage 1"),
/// which is also what the record store holds in its `diagnosis` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Elevated")]
    Elevated,
    #[serde(rename = "Hypertension Stage 1")]
    HypertensionStage1,
    #[serde(rename = "Hypertension Stage 2")]
    HypertensionStage2,
    #[serde(rename = "Hypertensive Crisis")]
    HypertensiveCrisis,
}

impl Category {
    /// Every category, least severe first.
    pub const ALL: [Category; 5] = [
        Category::Normal,
        Category::Elevated,
        Category::HypertensionStage1,
        Category::HypertensionStage2,
        Category::HypertensiveCrisis,
    ];

    /// The display label used in prompts, storage and output.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Elevated => "Elevated",
            Category::HypertensionStage1 => "Hypertension Stage 1",
            Category::HypertensionStage2 => "Hypertension Stage 2",
            Category::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }

    /// True for the crisis category, which warrants immediate medical attention.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Category::HypertensiveCrisis)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string does not name any category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown diagnosis category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
