//! User Password Value Object
//!
//! Domain wrappers over `platform::password` with user-facing error messages.
//!
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::PasswordHasher;
//!
//! let hasher = PasswordHasher::default();
//! let raw = RawPassword::new("Grading-Rubric-42".to_string()).unwrap();
//! let stored = UserPassword::hash(&raw, &hasher).unwrap();
//! assert!(stored.verify(&RawPassword::for_sign_in("Grading-Rubric-42".to_string()), &hasher));
//! ```

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordHasher, PasswordPolicyError};
use std::fmt;

/// Password from user input; zeroized when dropped
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Password chosen at sign-up, checked against the policy
    pub fn new(raw: String) -> AppResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(policy_error)
    }

    /// Password typed at sign-in; only normalized
    pub fn for_sign_in(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    let action = match &err {
        PasswordPolicyError::TooShort { .. } => "Please choose a longer password",
        PasswordPolicyError::TooLong { .. } => "Please choose a shorter password",
        PasswordPolicyError::EmptyOrWhitespace => "Please enter a password",
        PasswordPolicyError::InvalidCharacter => "Please remove any control characters",
        PasswordPolicyError::CommonPattern => "Please choose a less predictable password",
    };
    AppError::bad_request(err.to_string()).with_action(action)
}

/// Stored Argon2id hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn hash(raw: &RawPassword, hasher: &PasswordHasher) -> AppResult<Self> {
        hasher
            .hash(&raw.0)
            .map(Self)
            .map_err(|e| AppError::internal("Failed to hash password").with_source(e))
    }

    pub fn verify(&self, raw: &RawPassword, hasher: &PasswordHasher) -> bool {
        hasher.verify(&raw.0, &self.0)
    }

    pub fn from_db(phc: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc)
            .map(Self)
            .map_err(|e| AppError::internal("Stored password hash is corrupt").with_source(e))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }
}
