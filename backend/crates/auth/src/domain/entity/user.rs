//! User Entity
//!
//! Profile data only; the password lives in [`super::credential::Credential`].

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{email::Email, person_name::PersonName, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, lowercased; used to sign in
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: Email,
        first_name: PersonName,
        last_name: PersonName,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            email,
            first_name,
            last_name,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn can_sign_in(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active() {
        let user = User::new(
            Email::new("ada@uni.edu").unwrap(),
            PersonName::new("Ada", "First name").unwrap(),
            PersonName::new("Lovelace", "Last name").unwrap(),
            UserRole::Teacher,
            Utc::now(),
        );
        assert!(user.can_sign_in());
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.created_at, user.updated_at);
    }
}
