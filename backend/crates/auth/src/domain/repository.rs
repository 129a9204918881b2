//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use kernel::id::UserId;
use uuid::Uuid;

use crate::domain::entity::{auth_session::AuthSession, credential::Credential, user::User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert the user and its credential together
    ///
    /// Fails with `AuthError::EmailTaken` when the e-mail is already registered,
    /// including when a concurrent sign-up wins the race.
    async fn register(&self, user: &User, credential: &Credential) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;
}

#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>>;

    /// Persist failure counters and lock state
    async fn update(&self, credential: &Credential) -> AuthResult<()>;
}

#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Unexpired session by id
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>>;

    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Remove every session that expired before `now_ms`
    async fn cleanup_expired(&self, now_ms: i64) -> AuthResult<u64>;
}
