//! List Assignments Use Case

use std::sync::Arc;

use auth::CurrentUser;

use crate::application::access::ensure_teacher;
use crate::domain::entities::AssignmentOverview;
use crate::domain::repository::AssignmentRepository;
use crate::error::CourseworkResult;

pub struct ListAssignmentsUseCase<A>
where
    A: AssignmentRepository,
{
    assignment_repo: Arc<A>,
}

impl<A> ListAssignmentsUseCase<A>
where
    A: AssignmentRepository,
{
    pub fn new(assignment_repo: Arc<A>) -> Self {
        Self { assignment_repo }
    }

    /// The teacher's active assignments, newest first
    pub async fn execute(&self, teacher: &CurrentUser) -> CourseworkResult<Vec<AssignmentOverview>> {
        ensure_teacher(teacher)?;
        self.assignment_repo
            .list_active_by_teacher(&teacher.user_id)
            .await
    }
}
