//! Workshop entity types and form validation

pub mod car;
pub mod client;
pub mod order;
pub mod part;

pub use car::{Car, CarForm};
pub use client::{Client, ClientForm};
pub use order::{
    lines_total, Order, OrderDraft, OrderForm, OrderSort, OrderStatus, PartLine, StatusFilter,
    TIMESTAMP_FORMAT,
};
pub use part::{InventoryPart, PartForm};

use crate::core::error::ShopError;

/// Case-insensitive substring match over a record's display fields
///
/// An empty (or all-whitespace) term matches everything.
pub fn matches_search<'a, I>(term: &str, fields: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Reject a required text field that is empty or blank
pub(crate) fn required(field: &'static str, value: &str) -> Result<(), ShopError> {
    if value.trim().is_empty() {
        return Err(ShopError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Normalize an optional text input: trimmed, empty becomes `None`
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn non_negative_amount(field: &'static str, value: f64) -> Result<(), ShopError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ShopError::validation(field, "must be a non-negative amount"));
    }
    Ok(())
}
