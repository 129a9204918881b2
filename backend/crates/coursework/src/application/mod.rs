//! Application Layer - Use Cases
//!
//! Orchestrates domain rules, repositories and file storage.

mod access;
pub mod config;
pub mod create_assignment;
pub mod fetch_submission_file;
pub mod find_assignment;
pub mod grade_submission;
pub mod list_assignments;
pub mod list_submissions;
pub mod submission_gate;
pub mod submission_stats;
pub mod update_assignment;
pub mod update_submission_status;
pub mod upload_submission;

// Re-exports
pub use config::CourseworkConfig;
pub use create_assignment::{AssignmentInput, CreateAssignmentUseCase};
pub use fetch_submission_file::{FetchSubmissionFileUseCase, SubmissionFile};
pub use find_assignment::FindAssignmentUseCase;
pub use grade_submission::{CorrectedFileInput, GradeSubmissionInput, GradeSubmissionUseCase};
pub use list_assignments::ListAssignmentsUseCase;
pub use list_submissions::ListSubmissionsUseCase;
pub use submission_gate::SubmissionGate;
pub use submission_stats::SubmissionStatsUseCase;
pub use update_assignment::{DeleteAssignmentUseCase, UpdateAssignmentUseCase};
pub use update_submission_status::UpdateSubmissionStatusUseCase;
pub use upload_submission::{
    UploadSubmissionInput, UploadSubmissionOutput, UploadSubmissionUseCase,
};
