//! Auth Middleware
//!
//! Guards protected routes and hands the caller to handlers as
//! `Extension<CurrentUser>`.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use platform::bearer::bearer_token;

use crate::application::AuthenticateUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::error::AuthError;

#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthMiddlewareState<R>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// Reject the request with 401 unless it carries a valid bearer token
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn require_auth<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let token = bearer_token(req.headers())?;

    let use_case =
        AuthenticateUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let current_user = use_case.execute(token).await?;

    tracing::debug!(
        user_id = %current_user.user_id,
        role = %current_user.role,
        "Request authenticated"
    );

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}
