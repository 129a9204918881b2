//! HTTP Handlers
//!
//! Every route sits behind `require_auth`, so each handler receives the
//! caller as `Extension<CurrentUser>`.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::{HeaderValue, StatusCode, header};
use std::sync::Arc;

use auth::CurrentUser;
use kernel::clock::Clock;
use kernel::id::{AssignmentId, SubmissionId};

use crate::application::{
    CourseworkConfig, CreateAssignmentUseCase, DeleteAssignmentUseCase,
    FetchSubmissionFileUseCase, FindAssignmentUseCase, GradeSubmissionUseCase,
    ListAssignmentsUseCase, ListSubmissionsUseCase, SubmissionFile, SubmissionStatsUseCase,
    UpdateAssignmentUseCase, UpdateSubmissionStatusUseCase, UploadSubmissionUseCase,
};
use crate::domain::code_allocator::CodeAllocator;
use crate::domain::repository::{AssignmentRepository, FileStorage, SubmissionRepository};
use crate::error::CourseworkResult;
use crate::presentation::dto::{
    AssignmentRequest, AssignmentResponse, MessageResponse, StatsResponse, StatusQuery,
    SubmissionResponse, UploadResponse,
};
use crate::presentation::multipart::{read_grade_form, read_upload_form};

/// Shared state for coursework handlers
#[derive(Clone)]
pub struct CourseworkAppState<R, F>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub files: Arc<F>,
    pub allocator: Arc<CodeAllocator>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<CourseworkConfig>,
}

// ============================================================================
// Assignments
// ============================================================================

/// POST /api/assignments
pub async fn create_assignment<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AssignmentRequest>,
) -> CourseworkResult<(StatusCode, Json<AssignmentResponse>)>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let use_case = CreateAssignmentUseCase::new(
        state.repo.clone(),
        state.allocator.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let overview = use_case.execute(&user, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse::from_overview(&overview, state.clock.now())),
    ))
}

/// GET /api/assignments
pub async fn list_assignments<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
) -> CourseworkResult<Json<Vec<AssignmentResponse>>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let overviews = ListAssignmentsUseCase::new(state.repo.clone())
        .execute(&user)
        .await?;

    let now = state.clock.now();
    Ok(Json(
        overviews
            .iter()
            .map(|o| AssignmentResponse::from_overview(o, now))
            .collect(),
    ))
}

/// GET /api/assignments/{id}
pub async fn get_assignment<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
) -> CourseworkResult<Json<AssignmentResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let overview = FindAssignmentUseCase::new(state.repo.clone())
        .by_id(&user, &assignment_id)
        .await?;

    Ok(Json(AssignmentResponse::from_overview(&overview, state.clock.now())))
}

/// GET /api/assignments/search/{code}
pub async fn search_assignment<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Path(code): Path<String>,
) -> CourseworkResult<Json<AssignmentResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let overview = FindAssignmentUseCase::new(state.repo.clone())
        .by_code(&code)
        .await?;

    Ok(Json(AssignmentResponse::from_overview(&overview, state.clock.now())))
}

/// PUT /api/assignments/{id}
pub async fn update_assignment<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
    Json(req): Json<AssignmentRequest>,
) -> CourseworkResult<Json<AssignmentResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let use_case = UpdateAssignmentUseCase::new(
        state.repo.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let overview = use_case.execute(&user, &assignment_id, req.into()).await?;

    Ok(Json(AssignmentResponse::from_overview(&overview, state.clock.now())))
}

/// DELETE /api/assignments/{id}
pub async fn delete_assignment<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
) -> CourseworkResult<Json<MessageResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    DeleteAssignmentUseCase::new(state.repo.clone(), state.clock.clone())
        .execute(&user, &assignment_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Assignment deleted successfully",
    }))
}

// ============================================================================
// Submissions
// ============================================================================

/// POST /api/submissions/upload
pub async fn upload_submission<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    form: Multipart,
) -> CourseworkResult<Json<UploadResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let input = read_upload_form(form, state.config.max_upload_bytes).await?;

    let use_case = UploadSubmissionUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.files.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(&user, input).await?;

    Ok(Json(output.into()))
}

/// GET /api/submissions/assignment/{id}
pub async fn list_for_assignment<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(assignment_id): Path<AssignmentId>,
) -> CourseworkResult<Json<Vec<SubmissionResponse>>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let overviews = ListSubmissionsUseCase::new(state.repo.clone(), state.repo.clone())
        .for_assignment(&user, &assignment_id)
        .await?;

    Ok(Json(overviews.iter().map(SubmissionResponse::from).collect()))
}

/// GET /api/submissions/student
pub async fn list_for_student<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
) -> CourseworkResult<Json<Vec<SubmissionResponse>>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let overviews = ListSubmissionsUseCase::new(state.repo.clone(), state.repo.clone())
        .for_student(&user)
        .await?;

    Ok(Json(overviews.iter().map(SubmissionResponse::from).collect()))
}

/// GET /api/submissions/teacher
pub async fn list_for_teacher<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
) -> CourseworkResult<Json<Vec<SubmissionResponse>>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let overviews = ListSubmissionsUseCase::new(state.repo.clone(), state.repo.clone())
        .for_teacher(&user)
        .await?;

    Ok(Json(overviews.iter().map(SubmissionResponse::from).collect()))
}

/// GET /api/submissions/stats
pub async fn submission_stats<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
) -> CourseworkResult<Json<StatsResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let stats = SubmissionStatsUseCase::new(state.repo.clone())
        .execute(&user)
        .await?;

    Ok(Json(stats.into()))
}

/// POST /api/submissions/{id}/grade
pub async fn grade_submission<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(submission_id): Path<SubmissionId>,
    form: Multipart,
) -> CourseworkResult<Json<SubmissionResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let input = read_grade_form(form, state.config.max_upload_bytes).await?;

    let use_case = GradeSubmissionUseCase::new(
        state.repo.clone(),
        state.files.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let overview = use_case.execute(&user, &submission_id, input).await?;

    Ok(Json(SubmissionResponse::from(&overview)))
}

/// PUT /api/submissions/{id}/status?status=
pub async fn update_status<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(submission_id): Path<SubmissionId>,
    Query(query): Query<StatusQuery>,
) -> CourseworkResult<Json<MessageResponse>>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    UpdateSubmissionStatusUseCase::new(state.repo.clone())
        .execute(&user, &submission_id, &query.status)
        .await?;

    Ok(Json(MessageResponse {
        message: "Status updated successfully",
    }))
}

/// GET /api/submissions/download/{id}
pub async fn download_file<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(submission_id): Path<SubmissionId>,
) -> CourseworkResult<Response>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let file = FetchSubmissionFileUseCase::new(state.repo.clone(), state.files.clone())
        .execute(&user, &submission_id)
        .await?;

    Ok(pdf_response(file, Disposition::Attachment))
}

/// GET /api/submissions/view/{id}
pub async fn view_file<R, F>(
    State(state): State<CourseworkAppState<R, F>>,
    Extension(user): Extension<CurrentUser>,
    Path(submission_id): Path<SubmissionId>,
) -> CourseworkResult<Response>
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
{
    let file = FetchSubmissionFileUseCase::new(state.repo.clone(), state.files.clone())
        .execute(&user, &submission_id)
        .await?;

    Ok(pdf_response(file, Disposition::Inline))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Attachment,
    Inline,
}

fn pdf_response(file: SubmissionFile, disposition: Disposition) -> Response {
    let kind = match disposition {
        Disposition::Attachment => "attachment",
        Disposition::Inline => "inline",
    };
    let content_disposition = HeaderValue::from_str(&format!(
        "{kind}; filename=\"{}\"",
        header_safe_filename(&file.filename)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut response = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        file.bytes,
    )
        .into_response();

    if disposition == Disposition::Inline {
        response
            .headers_mut()
            .insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    }

    response
}

/// Quoted-string safe: no quotes, backslashes, control or non-ASCII characters
pub(crate) fn header_safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if cleaned.trim().is_empty() {
        "submission.pdf".to_owned()
    } else {
        cleaned
    }
}
