//! Person Name Value Object
//!
//! First and last names shown on assignments and submissions.

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

pub const PERSON_NAME_MAX_LENGTH: usize = 100;

/// NFKC-normalized, trimmed, non-blank name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// `field` names the input in error messages ("First name", "Last name")
    pub fn new(raw: &str, field: &'static str) -> AppResult<Self> {
        let normalized: String = raw.nfkc().collect::<String>().trim().to_string();

        if normalized.is_empty() {
            return Err(AppError::bad_request(format!("{field} is required")));
        }
        if normalized.chars().count() > PERSON_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "{field} must be at most {PERSON_NAME_MAX_LENGTH} characters"
            )));
        }
        if normalized.chars().any(char::is_control) {
            return Err(AppError::bad_request(format!(
                "{field} contains invalid characters"
            )));
        }

        Ok(Self(normalized))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
