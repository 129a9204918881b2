//! Find Assignment Use Case
//!
//! Single-assignment reads: by id for its owner and students, by code for
//! students looking one up.

use std::sync::Arc;

use auth::CurrentUser;
use kernel::id::AssignmentId;

use crate::domain::entities::AssignmentOverview;
use crate::domain::repository::AssignmentRepository;
use crate::domain::value_objects::AssignmentCode;
use crate::error::{CourseworkError, CourseworkResult};

pub struct FindAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    assignment_repo: Arc<A>,
}

impl<A> FindAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    pub fn new(assignment_repo: Arc<A>) -> Self {
        Self { assignment_repo }
    }

    /// Teachers only see their own assignments
    pub async fn by_id(
        &self,
        viewer: &CurrentUser,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<AssignmentOverview> {
        let overview = self
            .assignment_repo
            .find_assignment(assignment_id)
            .await?
            .ok_or(CourseworkError::AssignmentNotFound)?;

        if viewer.is_teacher() && !overview.assignment.is_owned_by(&viewer.user_id) {
            return Err(CourseworkError::AccessDenied);
        }

        Ok(overview)
    }

    /// Inactive assignments are reported as missing
    pub async fn by_code(&self, raw_code: &str) -> CourseworkResult<AssignmentOverview> {
        let code = AssignmentCode::parse(raw_code)?;

        self.assignment_repo
            .find_by_code(&code)
            .await?
            .filter(|o| o.assignment.is_active)
            .ok_or(CourseworkError::AssignmentNotFound)
    }
}
