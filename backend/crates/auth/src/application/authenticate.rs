//! Authenticate Use Case
//!
//! Resolves a bearer token to the signed-in user.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Authenticated caller, placed in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub session_id: Uuid,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl CurrentUser {
    fn from_user(user: User, session_id: Uuid) -> Self {
        Self {
            user_id: user.user_id,
            session_id,
            email: user.email,
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            role: user.role,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_teacher(&self) -> bool {
        self.role.is_teacher()
    }

    pub fn is_student(&self) -> bool {
        self.role.is_student()
    }
}

pub struct AuthenticateUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> AuthenticateUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<CurrentUser> {
        let session_id = session_token::parse(&self.config.session_secret, token)?;

        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired(Utc::now()) {
            self.session_repo.delete(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .filter(User::can_sign_in)
            .ok_or(AuthError::SessionInvalid)?;

        Ok(CurrentUser::from_user(user, session_id))
    }
}
