//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod health;

use anyhow::Context;
use auth::middleware::AuthMiddlewareState;
use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use coursework::{CourseworkConfig, DiskFileStorage, PgCourseworkRepository, coursework_router};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::health::health_router;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,coursework=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_name =
        env::var("APP_NAME").unwrap_or_else(|_| "Assignment Management System".to_string());

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    let auth_store = PgAuthRepository::new(pool.clone());
    match auth_store.cleanup_expired_sessions().await {
        Ok(sessions) => {
            tracing::info!(
                sessions_deleted = sessions,
                "Auth session cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Auth session cleanup failed, continuing anyway"
            );
        }
    }

    // Auth configuration
    let auth_config = Arc::new(load_auth_config()?);

    // Coursework configuration
    let coursework_config = Arc::new(CourseworkConfig::with_upload_dir(
        env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
    ));
    let files = DiskFileStorage::open(&coursework_config.upload_dir)
        .await
        .context("Upload directory is not usable")?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true);

    // Build router
    let guard = AuthMiddlewareState::new(Arc::new(auth_store.clone()), auth_config.clone());

    let api = Router::new()
        .merge(health_router(&app_name))
        .nest("/auth", auth_router(auth_store, auth_config))
        .merge(coursework_router(
            PgCourseworkRepository::new(pool),
            files,
            guard,
            coursework_config,
        ));

    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!(application = %app_name, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Session secret from `AUTH_SESSION_SECRET` (base64, 32 bytes)
///
/// Debug builds fall back to a random secret when it is unset.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let password_pepper = env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|p| !p.is_empty())
        .map(String::into_bytes);

    let base = match env::var("AUTH_SESSION_SECRET") {
        Ok(secret_b64) => {
            let secret_bytes = Engine::decode(&general_purpose::STANDARD, secret_b64.trim())
                .context("AUTH_SESSION_SECRET must be base64")?;
            let session_secret: [u8; 32] = secret_bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("AUTH_SESSION_SECRET must decode to 32 bytes"))?;
            AuthConfig {
                session_secret,
                ..AuthConfig::default()
            }
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_SESSION_SECRET unset, using a random development secret");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("AUTH_SESSION_SECRET must be set in production"),
    };

    Ok(AuthConfig {
        password_pepper,
        ..base
    })
}
