//! Multipart form readers for upload and grading

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use crate::application::{CorrectedFileInput, GradeSubmissionInput, UploadSubmissionInput};
use crate::error::{CourseworkError, CourseworkResult};

/// Fields `file` and `assignmentCode`
pub async fn read_upload_form(
    mut form: Multipart,
    max_bytes: usize,
) -> CourseworkResult<UploadSubmissionInput> {
    let mut assignment_code = None;
    let mut file = None;

    while let Some(field) = form.next_field().await.map_err(|e| rejection(e, max_bytes))? {
        match field.name() {
            Some("assignmentCode") => {
                assignment_code = Some(field.text().await.map_err(|e| rejection(e, max_bytes))?);
            }
            Some("file") => {
                let filename = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await.map_err(|e| rejection(e, max_bytes))?;
                file = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let assignment_code = assignment_code
        .ok_or_else(|| CourseworkError::Multipart("Missing field `assignmentCode`".into()))?;
    let (filename, bytes) =
        file.ok_or_else(|| CourseworkError::Multipart("Missing field `file`".into()))?;

    Ok(UploadSubmissionInput {
        assignment_code,
        filename,
        bytes,
    })
}

/// Fields `marks`, optional `feedback` and optional `correctedFile`
pub async fn read_grade_form(
    mut form: Multipart,
    max_bytes: usize,
) -> CourseworkResult<GradeSubmissionInput> {
    let mut marks = None;
    let mut feedback = None;
    let mut corrected_file = None;

    while let Some(field) = form.next_field().await.map_err(|e| rejection(e, max_bytes))? {
        match field.name() {
            Some("marks") => {
                let raw = field.text().await.map_err(|e| rejection(e, max_bytes))?;
                let value = raw
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| CourseworkError::Multipart(format!("Invalid marks: {raw}")))?;
                marks = Some(value);
            }
            Some("feedback") => {
                feedback = Some(field.text().await.map_err(|e| rejection(e, max_bytes))?);
            }
            Some("correctedFile") => {
                let filename = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await.map_err(|e| rejection(e, max_bytes))?;
                corrected_file = Some(CorrectedFileInput {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let marks = marks.ok_or_else(|| CourseworkError::Multipart("Missing field `marks`".into()))?;

    Ok(GradeSubmissionInput {
        marks,
        feedback,
        corrected_file,
    })
}

// The body limit surfaces as a field read error
fn rejection(err: MultipartError, max_bytes: usize) -> CourseworkError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CourseworkError::FileTooLarge { max_bytes }
    } else {
        CourseworkError::Multipart(err.body_text())
    }
}
