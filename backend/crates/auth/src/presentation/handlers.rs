//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use std::sync::Arc;

use platform::bearer::bearer_token;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentUser, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::repository::{AuthSessionRepository, CredentialRepository, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{SignInRequest, SignInResponse, SignUpRequest, UserResponse};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + CredentialRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// POST /api/auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + CredentialRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let user = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<SignInResponse>>
where
    R: UserRepository + CredentialRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(SignInResponse {
        token: output.token,
        token_type: "Bearer",
        expires_at_ms: output.expires_at_ms,
        user: UserResponse::from(&output.user),
    }))
}

/// POST /api/auth/signout
///
/// A correctly signed token whose session is already gone still yields 204.
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<StatusCode>
where
    R: UserRepository + CredentialRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let token = bearer_token(&headers)?;

    let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me (behind `require_auth`)
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
