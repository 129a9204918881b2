//! Update Submission Status Use Case

use std::sync::Arc;

use auth::CurrentUser;
use kernel::id::SubmissionId;

use crate::application::access::owned_submission;
use crate::domain::repository::SubmissionRepository;
use crate::domain::value_objects::SubmissionStatus;
use crate::error::CourseworkResult;

pub struct UpdateSubmissionStatusUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
}

impl<S> UpdateSubmissionStatusUseCase<S>
where
    S: SubmissionRepository,
{
    pub fn new(submission_repo: Arc<S>) -> Self {
        Self { submission_repo }
    }

    pub async fn execute(
        &self,
        teacher: &CurrentUser,
        submission_id: &SubmissionId,
        raw_status: &str,
    ) -> CourseworkResult<SubmissionStatus> {
        let status = SubmissionStatus::parse(raw_status)?;
        owned_submission(&*self.submission_repo, teacher, submission_id).await?;

        self.submission_repo
            .update_status(submission_id, status)
            .await?;

        tracing::info!(submission_id = %submission_id, status = %status, "Submission status updated");

        Ok(status)
    }
}
