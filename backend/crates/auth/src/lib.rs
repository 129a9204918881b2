//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Teacher and student accounts identified by e-mail
//! - Password sign-in issuing HMAC-signed bearer tokens backed by server-side sessions
//! - `require_auth` middleware exposing [`application::CurrentUser`] to other crates
//!
//! ## Security Model
//! - Passwords hashed with Argon2id plus an optional pepper
//! - Five consecutive failed sign-ins lock the credential for 15 minutes
//! - Tokens are opaque; the session row decides expiry and sign-out

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{AuthConfig, CurrentUser};
pub use domain::value_object::{email::Email, user_role::UserRole};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryAuthRepository, postgres::PgAuthRepository};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
