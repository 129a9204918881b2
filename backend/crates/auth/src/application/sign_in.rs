//! Sign In Use Case
//!
//! Verifies e-mail and password, then opens a session and issues its bearer token.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthSessionRepository, CredentialRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub struct SignInOutput {
    pub token: String,
    pub expires_at_ms: i64,
    pub user: User,
}

impl std::fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInOutput")
            .field("token", &"[REDACTED]")
            .field("expires_at_ms", &self.expires_at_ms)
            .field("user", &self.user)
            .finish()
    }
}

pub struct SignInUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, C, S> SignInUseCase<U, C, S>
where
    U: UserRepository,
    C: CredentialRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        credential_repo: Arc<C>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            credential_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credential missing for user".to_string()))?;

        let now = Utc::now();
        if let Some(until) = credential.locked_until.filter(|_| credential.is_locked(now)) {
            return Err(AuthError::AccountLocked { until });
        }

        let raw_password = RawPassword::for_sign_in(input.password);
        let hasher = self.config.password_hasher();

        if !credential.password_hash.verify(&raw_password, &hasher) {
            credential.record_failure(now);
            self.credential_repo.update(&credential).await?;
            return Err(match credential.locked_until.filter(|_| credential.is_locked(now)) {
                Some(until) => AuthError::AccountLocked { until },
                None => AuthError::InvalidCredentials,
            });
        }

        if credential.login_failed_count > 0 || credential.locked_until.is_some() {
            credential.reset_failures(now);
            self.credential_repo.update(&credential).await?;
        }

        let session = AuthSession::new(
            user.user_id,
            user.role,
            self.config.session_ttl_chrono(),
            now,
        );
        self.session_repo.create(&session).await?;

        let token = session_token::issue(&self.config.session_secret, session.session_id);

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "User signed in"
        );

        Ok(SignInOutput {
            token,
            expires_at_ms: session.expires_at_ms,
            user,
        })
    }
}
