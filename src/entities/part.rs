//! Inventory part entity type

use serde::{Deserialize, Serialize};

use super::{matches_search, non_negative_amount, optional_text, required};
use crate::core::error::ShopError;

/// A stocked part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPart {
    pub id: i64,
    pub name: String,
    pub article: Option<String>,
    /// Units on hand
    pub quantity: i64,
    pub price: f64,
}

impl InventoryPart {
    pub fn matches(&self, term: &str) -> bool {
        matches_search(
            term,
            [self.name.as_str(), self.article.as_deref().unwrap_or("")],
        )
    }

    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartForm {
    pub name: String,
    pub article: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

impl PartForm {
    pub fn new(name: &str, article: Option<String>, quantity: i64, price: f64) -> Self {
        Self {
            name: name.trim().to_string(),
            article: optional_text(article),
            quantity,
            price,
        }
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        required("name", &self.name)?;
        if self.quantity < 0 {
            return Err(ShopError::validation("quantity", "must not be negative"));
        }
        non_negative_amount("price", self.price)
    }
}

impl From<&InventoryPart> for PartForm {
    fn from(part: &InventoryPart) -> Self {
        Self {
            name: part.name.clone(),
            article: part.article.clone(),
            quantity: part.quantity,
            price: part.price,
        }
    }
}
