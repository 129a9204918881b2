//! Email Value Object
//!
//! E-mail addresses identify accounts and are stored lowercased.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RFC 5321 path limit
const EMAIL_MAX_LENGTH: usize = 254;
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Trim, lowercase and validate
    pub fn new(email: impl Into<String>) -> AppResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }
        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }
        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Invalid email format")
                .with_action("Use an address like name@example.com"));
        }

        Ok(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH || domain.contains('@') {
            return false;
        }
        if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') || domain.contains("..") {
            return false;
        }
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }
        !(domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']))
    }

    /// Value loaded from the database (already validated on the way in)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, d)| d).unwrap_or("")
    }

    /// File-name-safe form: anything outside `[a-z0-9_-]` becomes `_`
    pub fn slug(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                'a'..='z' | '0'..='9' | '_' | '-' => c,
                _ => '_',
            })
            .collect()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails_are_lowercased() {
        let email = Email::new("  Ada.Lovelace@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ada.lovelace@example.com");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_invalid_emails() {
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "a@b@example.com",
            "user@localhost",
            "user@-example.com",
            "user@example..com",
            "us er@example.com",
        ] {
            assert!(Email::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_too_long() {
        let local = "a".repeat(64);
        let domain = format!("{}.com", "b".repeat(190));
        assert!(Email::new(format!("{local}@{domain}")).is_err());
    }

    #[test]
    fn test_slug() {
        let email = Email::new("t.eacher@uni.edu").unwrap();
        assert_eq!(email.slug(), "t_eacher_uni_edu");

        for (raw, slug) in [
            ("a/b@uni.edu", "a_b_uni_edu"),
            (r"a\b@uni.edu", "a_b_uni_edu"),
            ("..@uni.edu", "___uni_edu"),
            ("first+tag@uni.edu", "first_tag_uni_edu"),
            ("jos\u{e9}-l@uni.edu", "jos_-l_uni_edu"),
        ] {
            assert_eq!(Email::new(raw).unwrap().slug(), slug, "{raw:?}");
        }
    }

    #[test]
    fn test_serde_validates() {
        let email: Email = serde_json::from_str(r#""Student@School.org""#).unwrap();
        assert_eq!(email.as_str(), "student@school.org");
        assert!(serde_json::from_str::<Email>(r#""nope""#).is_err());
    }
}
