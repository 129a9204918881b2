use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Teacher,
    Student,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::Teacher => "TEACHER",
            UserRole::Student => "STUDENT",
        }
    }

    #[inline]
    pub const fn is_teacher(&self) -> bool {
        matches!(self, UserRole::Teacher)
    }

    #[inline]
    pub const fn is_student(&self) -> bool {
        matches!(self, UserRole::Student)
    }

    /// Case-insensitive parse of user input
    pub fn parse(code: &str) -> AppResult<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case("teacher") {
            Ok(UserRole::Teacher)
        } else if code.eq_ignore_ascii_case("student") {
            Ok(UserRole::Student)
        } else {
            Err(AppError::bad_request(format!("Invalid role: {code}"))
                .with_action("Use TEACHER or STUDENT"))
        }
    }

    /// Stored codes are always canonical; anything else is a data error
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TEACHER" => Some(UserRole::Teacher),
            "STUDENT" => Some(UserRole::Student),
            _ => {
                tracing::error!(code, "Invalid UserRole code in storage");
                None
            }
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
