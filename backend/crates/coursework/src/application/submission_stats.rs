//! Submission Stats Use Case

use std::sync::Arc;

use auth::CurrentUser;

use crate::application::access::ensure_teacher;
use crate::domain::entities::SubmissionStats;
use crate::domain::repository::SubmissionRepository;
use crate::error::CourseworkResult;

pub struct SubmissionStatsUseCase<S>
where
    S: SubmissionRepository,
{
    submission_repo: Arc<S>,
}

impl<S> SubmissionStatsUseCase<S>
where
    S: SubmissionRepository,
{
    pub fn new(submission_repo: Arc<S>) -> Self {
        Self { submission_repo }
    }

    pub async fn execute(&self, teacher: &CurrentUser) -> CourseworkResult<SubmissionStats> {
        ensure_teacher(teacher)?;
        self.submission_repo
            .stats_for_teacher(&teacher.user_id)
            .await
    }
}
