//! Liveness and build information

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

const FEATURES: [&str; 4] = [
    "User Authentication (Teachers & Students)",
    "Assignment Management with 5-character codes",
    "PDF File Upload and Storage",
    "Submission Tracking and Grading",
];

#[derive(Clone)]
struct HealthState {
    application: Arc<str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub application: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

/// `/health` and `/info`, both public
pub fn health_router(application: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .with_state(HealthState {
            application: Arc::from(application),
        })
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        application: state.application.to_string(),
        timestamp: Utc::now(),
        message: format!("{} is running successfully!", state.application),
    })
}

async fn info(State(state): State<HealthState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: state.application.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
        features: &FEATURES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(path: &str) -> (StatusCode, Value) {
        let response = health_router("Assignment Management System")
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
        assert_eq!(body["application"], "Assignment Management System");
        assert_eq!(
            body["message"],
            "Assignment Management System is running successfully!"
        );
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_info() {
        let (status, body) = get_json("/info").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Assignment Management System");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["features"].as_array().map(Vec::len), Some(FEATURES.len()));
    }
}
