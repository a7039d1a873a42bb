//! Substitute search: constraint filter, scorer, and ranked finder.

pub mod constraints;
pub mod finder;
pub mod scoring;

pub use constraints::satisfies;
pub use finder::{find_alternatives, Finder};
pub use scoring::{explain, score, Rule, MAX_SCORE};

use serde::Serialize;

use crate::ingest::parse_tag_list;
use crate::{AltgraphError, Result};

/// Number of alternatives returned by [`find_alternatives`].
pub const MAX_ALTERNATIVES: usize = 3;

/// Search parameters collected from a front end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub product_id: String,
    /// Price ceiling; `None` means the requested product's own price.
    pub max_price: Option<f64>,
    pub required_tags: Vec<String>,
    /// `None` means no brand preference.
    pub preferred_brand: Option<String>,
}

impl Query {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            ..Self::default()
        }
    }

    pub fn max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn required_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Parse required tags from a delimited string (trimmed, blanks dropped).
    pub fn required_tags_str(mut self, raw: &str, delimiter: char) -> Self {
        self.required_tags = parse_tag_list(raw, delimiter);
        self
    }

    /// Set the preferred brand; blank input clears the preference.
    pub fn preferred_brand(mut self, brand: &str) -> Self {
        let brand = brand.trim();
        self.preferred_brand = if brand.is_empty() {
            None
        } else {
            Some(brand.to_string())
        };
        self
    }

    /// Reject a blank product id or a price ceiling that is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.product_id.trim().is_empty() {
            return Err(AltgraphError::InvalidInput("product id is empty".to_string()));
        }
        if let Some(p) = self.max_price {
            if !p.is_finite() || p < 0.0 {
                return Err(AltgraphError::InvalidInput(format!(
                    "max price must be a non-negative number, got {}",
                    p
                )));
            }
        }
        Ok(())
    }
}

/// One ranked substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub product_id: String,
    pub score: u8,
    pub rules: Vec<String>,
}

/// Result of a substitute search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// The requested product is available; no substitute needed.
    InStock { product_id: String },
    /// Ranked substitutes, best first. Empty when nothing qualifies or the
    /// requested product is unknown.
    Alternatives(Vec<Alternative>),
}

impl Outcome {
    /// True for an empty alternatives list.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Alternatives(list) if list.is_empty())
    }

    pub fn alternatives(&self) -> &[Alternative] {
        match self {
            Outcome::Alternatives(list) => list,
            Outcome::InStock { .. } => &[],
        }
    }
}
