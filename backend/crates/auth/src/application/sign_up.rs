//! Sign Up Use Case
//!
//! Creates a teacher or student account with a password credential.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{credential::Credential, user::User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    person_name::PersonName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        let email = Email::new(input.email)?;
        let first_name = PersonName::new(&input.first_name, "First name")?;
        let last_name = PersonName::new(&input.last_name, "Last name")?;
        let role = UserRole::parse(&input.role)?;
        let raw_password = RawPassword::new(input.password)?;

        // Advisory; the unique index decides under concurrency
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = UserPassword::hash(&raw_password, &self.config.password_hasher())?;

        let now = Utc::now();
        let user = User::new(email, first_name, last_name, role, now);
        let credential = Credential::new(user.user_id, password_hash, now);

        self.user_repo.register(&user, &credential).await?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.role,
            "User signed up"
        );

        Ok(user)
    }
}
