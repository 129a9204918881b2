//! Fetch Submission File Use Case
//!
//! Serves the corrected copy when one exists, else the original upload.

use std::sync::Arc;

use auth::CurrentUser;
use kernel::id::SubmissionId;

use crate::domain::repository::{FileStorage, SubmissionRepository};
use crate::error::{CourseworkError, CourseworkResult};

#[derive(Debug, Clone)]
pub struct SubmissionFile {
    /// Name the client originally uploaded it under
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct FetchSubmissionFileUseCase<S, F>
where
    S: SubmissionRepository,
    F: FileStorage,
{
    submission_repo: Arc<S>,
    files: Arc<F>,
}

impl<S, F> FetchSubmissionFileUseCase<S, F>
where
    S: SubmissionRepository,
    F: FileStorage,
{
    pub fn new(submission_repo: Arc<S>, files: Arc<F>) -> Self {
        Self {
            submission_repo,
            files,
        }
    }

    /// Readable by the owning teacher and the submitting student
    pub async fn execute(
        &self,
        user: &CurrentUser,
        submission_id: &SubmissionId,
    ) -> CourseworkResult<SubmissionFile> {
        let overview = self
            .submission_repo
            .find_submission(submission_id)
            .await?
            .ok_or(CourseworkError::SubmissionNotFound)?;

        if !overview.is_visible_to(&user.user_id) {
            return Err(CourseworkError::AccessDenied);
        }

        let (path, filename) = overview.submission.served_file();
        let bytes = self.files.load(path).await?;

        Ok(SubmissionFile {
            filename: filename.to_owned(),
            bytes,
        })
    }
}
