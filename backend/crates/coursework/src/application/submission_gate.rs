//! Submission Gate
//!
//! Applies the gatekeeper rules with the current time and the
//! existing-submission lookup.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::id::UserId;

use crate::domain::entities::Assignment;
use crate::domain::gatekeeper::{self, SubmissionRejection};
use crate::domain::repository::SubmissionRepository;
use crate::error::CourseworkResult;

pub struct SubmissionGate<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SubmissionGate<S>
where
    S: SubmissionRepository,
{
    pub fn new(submission_repo: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            submission_repo,
            clock,
        }
    }

    pub async fn can_submit(
        &self,
        assignment: &Assignment,
        student_id: &UserId,
    ) -> CourseworkResult<bool> {
        Ok(self.decide(assignment, student_id).await?.is_ok())
    }

    /// Like [`Self::can_submit`], failing with the user-facing reason
    pub async fn admit(&self, assignment: &Assignment, student_id: &UserId) -> CourseworkResult<()> {
        self.decide(assignment, student_id)
            .await?
            .map_err(Into::into)
    }

    async fn decide(
        &self,
        assignment: &Assignment,
        student_id: &UserId,
    ) -> CourseworkResult<Result<(), SubmissionRejection>> {
        let now = self.clock.now();

        // The assignment alone may already decide
        if let Err(rejection) = gatekeeper::evaluate(assignment, now, false) {
            return Ok(Err(rejection));
        }

        let already_submitted = self
            .submission_repo
            .exists_submission(&assignment.assignment_id, student_id)
            .await?;

        Ok(gatekeeper::evaluate(assignment, now, already_submitted))
    }
}
