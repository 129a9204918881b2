//! Domain Layer - Business logic and entities
//!
//! - Entities (Assignment, Submission) and value objects (AssignmentCode, PdfUpload)
//! - Code Allocator and Submission Gatekeeper rules
//! - Repository and file storage traits

pub mod code_allocator;
pub mod entities;
pub mod gatekeeper;
pub mod repository;
pub mod value_objects;

pub use code_allocator::CodeAllocator;
pub use entities::{
    Assignment, AssignmentDetails, AssignmentOverview, Submission, SubmissionOverview,
    SubmissionStats,
};
pub use gatekeeper::SubmissionRejection;
pub use repository::{AssignmentRepository, FileStorage, SubmissionRepository};
pub use value_objects::{AssignmentCode, SubmissionStatus};
