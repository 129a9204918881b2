//! Coursework Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, code allocator, submission gatekeeper, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL repository, disk storage and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, multipart readers, router
//!
//! ## Features
//! - Teachers publish assignments addressed by a random 5-character code
//! - Students submit one PDF per assignment, located by that code
//! - Teachers grade submissions and may attach a corrected PDF
//!
//! ## Consistency Model
//! - Code and submission uniqueness are enforced by the database
//!   (`ON CONFLICT DO NOTHING`); the preceding lookups are advisory
//! - Lateness is decided once, when the submission row is created

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::CourseworkConfig;
pub use domain::{AssignmentCode, CodeAllocator, SubmissionStatus};
pub use error::{CourseworkError, CourseworkResult};
pub use infra::{
    DiskFileStorage, InMemoryCourseworkRepository, InMemoryFileStorage, PgCourseworkRepository,
};
pub use presentation::handlers::CourseworkAppState;
pub use presentation::router::{coursework_router, coursework_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
