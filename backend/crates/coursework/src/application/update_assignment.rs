//! Update and Delete Assignment Use Cases
//!
//! Both are restricted to the teacher who created the assignment. Deleting
//! only clears the active flag so submissions keep their assignment.

use std::sync::Arc;

use auth::CurrentUser;
use kernel::clock::Clock;
use kernel::id::AssignmentId;

use crate::application::access::ensure_teacher;
use crate::application::config::CourseworkConfig;
use crate::application::create_assignment::AssignmentInput;
use crate::domain::entities::AssignmentOverview;
use crate::domain::repository::AssignmentRepository;
use crate::error::{CourseworkError, CourseworkResult};

async fn owned_assignment<A>(
    repo: &A,
    teacher: &CurrentUser,
    assignment_id: &AssignmentId,
) -> CourseworkResult<AssignmentOverview>
where
    A: AssignmentRepository,
{
    ensure_teacher(teacher)?;

    let overview = repo
        .find_assignment(assignment_id)
        .await?
        .ok_or(CourseworkError::AssignmentNotFound)?;

    if !overview.assignment.is_owned_by(&teacher.user_id) {
        return Err(CourseworkError::AccessDenied);
    }
    Ok(overview)
}

pub struct UpdateAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    assignment_repo: Arc<A>,
    clock: Arc<dyn Clock>,
    config: Arc<CourseworkConfig>,
}

impl<A> UpdateAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    pub fn new(assignment_repo: Arc<A>, clock: Arc<dyn Clock>, config: Arc<CourseworkConfig>) -> Self {
        Self {
            assignment_repo,
            clock,
            config,
        }
    }

    /// Existing submissions keep their late flag whatever the new deadline
    pub async fn execute(
        &self,
        teacher: &CurrentUser,
        assignment_id: &AssignmentId,
        input: AssignmentInput,
    ) -> CourseworkResult<AssignmentOverview> {
        let mut overview = owned_assignment(&*self.assignment_repo, teacher, assignment_id).await?;
        let details = input.into_details(self.config.default_max_marks)?;

        overview.assignment.revise(details, self.clock.now());
        // A concurrent delete wins over the edit
        if !self
            .assignment_repo
            .revise_assignment(&overview.assignment)
            .await?
        {
            return Err(CourseworkError::AssignmentNotFound);
        }

        tracing::info!(assignment_id = %assignment_id, "Assignment updated");

        Ok(overview)
    }
}

pub struct DeleteAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    assignment_repo: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> DeleteAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    pub fn new(assignment_repo: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            assignment_repo,
            clock,
        }
    }

    pub async fn execute(
        &self,
        teacher: &CurrentUser,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<()> {
        owned_assignment(&*self.assignment_repo, teacher, assignment_id).await?;

        self.assignment_repo
            .deactivate_assignment(assignment_id, self.clock.now())
            .await?;

        tracing::info!(assignment_id = %assignment_id, "Assignment deactivated");

        Ok(())
    }
}
