//! Coursework Error Types
//!
//! Assignment and submission error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::gatekeeper::SubmissionRejection;

pub type CourseworkResult<T> = Result<T, CourseworkError>;

#[derive(Debug, Error)]
pub enum CourseworkError {
    #[error("Invalid assignment code format")]
    InvalidAssignmentCode,

    /// Upload named a well-formed code nobody owns
    #[error("Assignment not found with code: {0}")]
    UnknownAssignmentCode(String),

    #[error("Assignment not found")]
    AssignmentNotFound,

    #[error("Submission not found")]
    SubmissionNotFound,

    #[error("File not found")]
    FileNotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("{0} role required")]
    RoleRequired(&'static str),

    #[error("Assignment is no longer accepting submissions")]
    AssignmentInactive,

    #[error("Assignment deadline has passed")]
    DeadlinePassed,

    #[error("You have already submitted for this assignment")]
    AlreadySubmitted,

    #[error("{0}")]
    InvalidFile(&'static str),

    #[error("File size exceeds maximum limit of {} MB", max_bytes / (1024 * 1024))]
    FileTooLarge { max_bytes: usize },

    #[error("Malformed form data: {0}")]
    Multipart(String),

    /// Every generated code was already taken
    #[error("Could not allocate a free assignment code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    /// A concurrent write won the uniqueness race
    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Validation(AppError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CourseworkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CourseworkError::InvalidAssignmentCode
            | CourseworkError::UnknownAssignmentCode(_)
            | CourseworkError::AssignmentInactive
            | CourseworkError::DeadlinePassed
            | CourseworkError::AlreadySubmitted
            | CourseworkError::InvalidFile(_)
            | CourseworkError::Multipart(_) => ErrorKind::BadRequest,
            CourseworkError::AssignmentNotFound
            | CourseworkError::SubmissionNotFound
            | CourseworkError::FileNotFound => ErrorKind::NotFound,
            CourseworkError::AccessDenied | CourseworkError::RoleRequired(_) => {
                ErrorKind::Forbidden
            }
            CourseworkError::FileTooLarge { .. } => ErrorKind::PayloadTooLarge,
            CourseworkError::AllocationExhausted { .. } => ErrorKind::ServiceUnavailable,
            CourseworkError::Conflict(_) => ErrorKind::Conflict,
            CourseworkError::Validation(e) => e.kind(),
            CourseworkError::Storage(_)
            | CourseworkError::Database(_)
            | CourseworkError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub(crate) fn log(&self) {
        match self {
            CourseworkError::Database(e) => {
                tracing::error!(error = %e, "Coursework database error");
            }
            CourseworkError::Storage(e) => {
                tracing::error!(error = %e, "Coursework file storage error");
            }
            CourseworkError::Internal(msg) => {
                tracing::error!(message = %msg, "Coursework internal error");
            }
            CourseworkError::AllocationExhausted { attempts } => {
                tracing::warn!(attempts, "Assignment code namespace exhausted");
            }
            CourseworkError::Conflict(msg) => {
                tracing::warn!(message = %msg, "Concurrent write lost uniqueness race");
            }
            CourseworkError::AccessDenied => {
                tracing::warn!("Access to foreign coursework denied");
            }
            _ => {
                tracing::debug!(error = %self, "Coursework error");
            }
        }
    }
}

impl From<CourseworkError> for AppError {
    fn from(err: CourseworkError) -> Self {
        match err {
            CourseworkError::Validation(inner) => inner,
            CourseworkError::AllocationExhausted { .. } => {
                AppError::service_unavailable(err.to_string())
                    .with_action("Retry the request later")
            }
            CourseworkError::FileTooLarge { .. } => AppError::payload_too_large(err.to_string())
                .with_action("Upload a smaller PDF"),
            // Storage details stay in the logs
            CourseworkError::Storage(_)
            | CourseworkError::Database(_)
            | CourseworkError::Internal(_) => AppError::internal("Coursework service error"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl From<AppError> for CourseworkError {
    fn from(err: AppError) -> Self {
        CourseworkError::Validation(err)
    }
}

impl From<SubmissionRejection> for CourseworkError {
    fn from(rejection: SubmissionRejection) -> Self {
        match rejection {
            SubmissionRejection::Inactive => CourseworkError::AssignmentInactive,
            SubmissionRejection::DeadlinePassed => CourseworkError::DeadlinePassed,
            SubmissionRejection::AlreadySubmitted => CourseworkError::AlreadySubmitted,
        }
    }
}

impl IntoResponse for CourseworkError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
