//! Client entity type

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{matches_search, optional_text, required};
use crate::core::error::ShopError;

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9\s()\-]{7,18}$").expect("phone pattern is valid")
});

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A workshop customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl Client {
    pub fn matches(&self, term: &str) -> bool {
        matches_search(
            term,
            [
                self.full_name.as_str(),
                self.phone.as_str(),
                self.email.as_deref().unwrap_or(""),
            ],
        )
    }
}

/// Client fields as entered by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientForm {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl ClientForm {
    pub fn new(full_name: &str, phone: &str, email: Option<String>) -> Self {
        Self {
            full_name: full_name.trim().to_string(),
            phone: phone.trim().to_string(),
            email: optional_text(email),
        }
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        required("full name", &self.full_name)?;
        if !PHONE_PATTERN.is_match(&self.phone) {
            return Err(ShopError::validation(
                "phone",
                "expected 7-18 digits, spaces, brackets or dashes, optionally starting with +",
            ));
        }
        if let Some(ref email) = self.email {
            if !EMAIL_PATTERN.is_match(email) {
                return Err(ShopError::validation("email", "expected name@domain.tld"));
            }
        }
        Ok(())
    }
}

impl From<&Client> for ClientForm {
    fn from(client: &Client) -> Self {
        Self {
            full_name: client.full_name.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
        }
    }
}
