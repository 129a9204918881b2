//! Grade Submission Use Case

use std::sync::Arc;

use auth::CurrentUser;
use kernel::clock::Clock;
use kernel::id::SubmissionId;

use crate::application::access::owned_submission;
use crate::application::config::CourseworkConfig;
use crate::domain::entities::SubmissionOverview;
use crate::domain::repository::{FileStorage, SubmissionRepository};
use crate::domain::value_objects::{Marks, PdfUpload, StoredFileName};
use crate::error::CourseworkResult;

#[derive(Debug, Clone)]
pub struct CorrectedFileInput {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct GradeSubmissionInput {
    pub marks: i32,
    pub feedback: Option<String>,
    /// Annotated copy returned to the student; empty parts are ignored
    pub corrected_file: Option<CorrectedFileInput>,
}

pub struct GradeSubmissionUseCase<S, F>
where
    S: SubmissionRepository,
    F: FileStorage,
{
    submission_repo: Arc<S>,
    files: Arc<F>,
    clock: Arc<dyn Clock>,
    config: Arc<CourseworkConfig>,
}

impl<S, F> GradeSubmissionUseCase<S, F>
where
    S: SubmissionRepository,
    F: FileStorage,
{
    pub fn new(
        submission_repo: Arc<S>,
        files: Arc<F>,
        clock: Arc<dyn Clock>,
        config: Arc<CourseworkConfig>,
    ) -> Self {
        Self {
            submission_repo,
            files,
            clock,
            config,
        }
    }

    pub async fn execute(
        &self,
        teacher: &CurrentUser,
        submission_id: &SubmissionId,
        input: GradeSubmissionInput,
    ) -> CourseworkResult<SubmissionOverview> {
        let mut overview =
            owned_submission(&*self.submission_repo, teacher, submission_id).await?;

        let marks = Marks::new(input.marks, overview.assignment_max_marks)?;
        let feedback = input.feedback.filter(|f| !f.trim().is_empty());

        let upload = input
            .corrected_file
            .filter(|file| !file.bytes.is_empty())
            .map(|file| {
                PdfUpload::new(
                    file.filename.as_deref(),
                    file.bytes,
                    self.config.max_upload_bytes,
                )
            })
            .transpose()?;

        let now = self.clock.now();
        let corrected = match upload {
            Some(upload) => {
                let owner = StoredFileName::corrected_owner(&teacher.email.slug());
                let stored = StoredFileName::generate(&overview.assignment_code, &owner, now);
                self.files.store(&stored, upload.bytes()).await?;
                Some((stored, upload.original_filename().to_owned()))
            }
            None => None,
        };
        let new_file = corrected.as_ref().map(|(stored, _)| stored.to_string());

        let replaced = overview
            .submission
            .grade(marks, feedback, teacher.user_id, corrected, now);

        if let Err(e) = self.submission_repo.save_grade(&overview.submission).await {
            if let Some(name) = new_file {
                self.discard(&name).await;
            }
            return Err(e);
        }
        if let Some(old) = replaced {
            self.discard(&old).await;
        }

        overview.graded_by_name = Some(teacher.full_name());

        tracing::info!(
            submission_id = %submission_id,
            marks = marks.get(),
            corrected_file = new_file.is_some(),
            "Submission graded"
        );

        Ok(overview)
    }

    async fn discard(&self, file_path: &str) {
        if let Err(e) = self.files.delete(file_path).await {
            tracing::warn!(error = %e, file = file_path, "Failed to remove corrected file");
        }
    }
}
