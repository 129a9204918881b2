//! Upload Submission Use Case

use std::sync::Arc;

use auth::CurrentUser;
use kernel::clock::Clock;
use kernel::id::SubmissionId;

use crate::application::access::ensure_student;
use crate::application::config::CourseworkConfig;
use crate::application::submission_gate::SubmissionGate;
use crate::domain::entities::Submission;
use crate::domain::repository::{AssignmentRepository, FileStorage, SubmissionRepository};
use crate::domain::value_objects::{AssignmentCode, PdfUpload, StoredFileName};
use crate::error::{CourseworkError, CourseworkResult};

#[derive(Debug, Clone)]
pub struct UploadSubmissionInput {
    pub assignment_code: String,
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UploadSubmissionOutput {
    pub submission_id: SubmissionId,
    pub file_name: String,
    pub file_size: i64,
    pub is_late_submission: bool,
}

pub struct UploadSubmissionUseCase<A, S, F>
where
    A: AssignmentRepository,
    S: SubmissionRepository,
    F: FileStorage,
{
    assignment_repo: Arc<A>,
    submission_repo: Arc<S>,
    files: Arc<F>,
    clock: Arc<dyn Clock>,
    config: Arc<CourseworkConfig>,
}

impl<A, S, F> UploadSubmissionUseCase<A, S, F>
where
    A: AssignmentRepository,
    S: SubmissionRepository,
    F: FileStorage,
{
    pub fn new(
        assignment_repo: Arc<A>,
        submission_repo: Arc<S>,
        files: Arc<F>,
        clock: Arc<dyn Clock>,
        config: Arc<CourseworkConfig>,
    ) -> Self {
        Self {
            assignment_repo,
            submission_repo,
            files,
            clock,
            config,
        }
    }

    pub async fn execute(
        &self,
        student: &CurrentUser,
        input: UploadSubmissionInput,
    ) -> CourseworkResult<UploadSubmissionOutput> {
        ensure_student(student)?;

        let code = AssignmentCode::parse(&input.assignment_code)?;
        let assignment = self
            .assignment_repo
            .find_by_code(&code)
            .await?
            .ok_or_else(|| CourseworkError::UnknownAssignmentCode(code.to_string()))?
            .assignment;

        SubmissionGate::new(self.submission_repo.clone(), self.clock.clone())
            .admit(&assignment, &student.user_id)
            .await?;

        let upload = PdfUpload::new(
            input.filename.as_deref(),
            input.bytes,
            self.config.max_upload_bytes,
        )?;

        let stored = StoredFileName::generate(&code, &student.email.slug(), self.clock.now());
        self.files.store(&stored, upload.bytes()).await?;

        // Lateness is judged when the record is created, after the file landed
        let submission = Submission::new(
            &assignment,
            student.user_id,
            &upload,
            stored,
            self.clock.now(),
        );

        match self.submission_repo.insert_if_absent(&submission).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard(&submission.file_path).await;
                return Err(CourseworkError::Conflict(
                    "You have already submitted for this assignment",
                ));
            }
            Err(e) => {
                self.discard(&submission.file_path).await;
                return Err(e);
            }
        }

        tracing::info!(
            submission_id = %submission.submission_id,
            assignment_id = %assignment.assignment_id,
            student_id = %student.user_id,
            late = submission.is_late_submission,
            "Submission uploaded"
        );

        Ok(UploadSubmissionOutput {
            submission_id: submission.submission_id,
            file_name: submission.original_filename,
            file_size: submission.file_size,
            is_late_submission: submission.is_late_submission,
        })
    }

    async fn discard(&self, file_path: &str) {
        if let Err(e) = self.files.delete(file_path).await {
            tracing::warn!(error = %e, file = file_path, "Failed to remove orphaned upload");
        }
    }
}
