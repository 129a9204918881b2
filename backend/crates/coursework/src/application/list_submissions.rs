//! List Submissions Use Case

use std::sync::Arc;

use auth::CurrentUser;
use kernel::id::AssignmentId;

use crate::application::access::{ensure_student, ensure_teacher};
use crate::domain::entities::SubmissionOverview;
use crate::domain::repository::{AssignmentRepository, SubmissionRepository};
use crate::error::{CourseworkError, CourseworkResult};

pub struct ListSubmissionsUseCase<A, S>
where
    A: AssignmentRepository,
    S: SubmissionRepository,
{
    assignment_repo: Arc<A>,
    submission_repo: Arc<S>,
}

impl<A, S> ListSubmissionsUseCase<A, S>
where
    A: AssignmentRepository,
    S: SubmissionRepository,
{
    pub fn new(assignment_repo: Arc<A>, submission_repo: Arc<S>) -> Self {
        Self {
            assignment_repo,
            submission_repo,
        }
    }

    /// Every submission to one of the teacher's assignments, oldest first
    pub async fn for_assignment(
        &self,
        teacher: &CurrentUser,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        ensure_teacher(teacher)?;

        let overview = self
            .assignment_repo
            .find_assignment(assignment_id)
            .await?
            .ok_or(CourseworkError::AssignmentNotFound)?;
        if !overview.assignment.is_owned_by(&teacher.user_id) {
            return Err(CourseworkError::AccessDenied);
        }

        self.submission_repo.list_by_assignment(assignment_id).await
    }

    /// The student's own submissions, newest first
    pub async fn for_student(
        &self,
        student: &CurrentUser,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        ensure_student(student)?;
        self.submission_repo.list_by_student(&student.user_id).await
    }

    /// Submissions across all of the teacher's assignments, newest first
    pub async fn for_teacher(
        &self,
        teacher: &CurrentUser,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        ensure_teacher(teacher)?;
        self.submission_repo.list_by_teacher(&teacher.user_id).await
    }
}
