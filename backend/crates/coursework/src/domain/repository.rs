//! Repository Traits
//!
//! Interfaces for data persistence and file storage. Implementations are in
//! the infra layer.

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, SubmissionId, UserId};

use crate::domain::entities::{
    Assignment, AssignmentOverview, Submission, SubmissionOverview, SubmissionStats,
};
use crate::domain::value_objects::{AssignmentCode, StoredFileName, SubmissionStatus};
use crate::error::CourseworkResult;

#[trait_variant::make(AssignmentRepository: Send)]
pub trait LocalAssignmentRepository {
    /// Advisory lookup; [`Self::insert_if_code_absent`] is authoritative
    async fn exists_by_code(&self, code: &AssignmentCode) -> CourseworkResult<bool>;

    /// Insert unless another assignment holds the code
    ///
    /// Returns `false` when the code was taken, including by a concurrent insert.
    async fn insert_if_code_absent(&self, assignment: &Assignment) -> CourseworkResult<bool>;

    async fn find_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Option<AssignmentOverview>>;

    /// Lookup by code, active or not
    async fn find_by_code(
        &self,
        code: &AssignmentCode,
    ) -> CourseworkResult<Option<AssignmentOverview>>;

    /// Active assignments created by `teacher_id`, newest first
    async fn list_active_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> CourseworkResult<Vec<AssignmentOverview>>;

    /// Persist the editable fields of a still-active assignment
    ///
    /// Returns `false` when the row is gone or was deactivated meanwhile. The
    /// active flag itself is never written here.
    async fn revise_assignment(&self, assignment: &Assignment) -> CourseworkResult<bool>;

    /// Soft delete
    async fn deactivate_assignment(
        &self,
        assignment_id: &AssignmentId,
        now: DateTime<Utc>,
    ) -> CourseworkResult<()>;
}

#[trait_variant::make(SubmissionRepository: Send)]
pub trait LocalSubmissionRepository {
    /// Advisory lookup; [`Self::insert_if_absent`] is authoritative
    async fn exists_submission(
        &self,
        assignment_id: &AssignmentId,
        student_id: &UserId,
    ) -> CourseworkResult<bool>;

    /// Insert unless the student already has a submission for the assignment
    ///
    /// Returns `false` when a row already existed.
    async fn insert_if_absent(&self, submission: &Submission) -> CourseworkResult<bool>;

    async fn find_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> CourseworkResult<Option<SubmissionOverview>>;

    /// Oldest first
    async fn list_by_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Vec<SubmissionOverview>>;

    /// Newest first
    async fn list_by_student(&self, student_id: &UserId)
    -> CourseworkResult<Vec<SubmissionOverview>>;

    /// Submissions to any assignment the teacher created, newest first
    async fn list_by_teacher(&self, teacher_id: &UserId)
    -> CourseworkResult<Vec<SubmissionOverview>>;

    /// Persist marks, feedback, corrected file and status
    async fn save_grade(&self, submission: &Submission) -> CourseworkResult<()>;

    async fn update_status(
        &self,
        submission_id: &SubmissionId,
        status: SubmissionStatus,
    ) -> CourseworkResult<()>;

    async fn stats_for_teacher(&self, teacher_id: &UserId) -> CourseworkResult<SubmissionStats>;
}

/// Flat blob store for submitted and corrected PDFs
#[trait_variant::make(FileStorage: Send)]
pub trait LocalFileStorage {
    async fn store(&self, name: &StoredFileName, bytes: &[u8]) -> CourseworkResult<()>;

    /// `CourseworkError::FileNotFound` when nothing is stored under `name`
    async fn load(&self, name: &str) -> CourseworkResult<Vec<u8>>;

    /// Deleting a missing file succeeds
    async fn delete(&self, name: &str) -> CourseworkResult<()>;
}
