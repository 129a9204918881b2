//! Role and ownership checks shared by the use cases

use auth::CurrentUser;
use kernel::id::SubmissionId;

use crate::domain::entities::SubmissionOverview;
use crate::domain::repository::SubmissionRepository;
use crate::error::{CourseworkError, CourseworkResult};

pub(crate) fn ensure_teacher(user: &CurrentUser) -> CourseworkResult<()> {
    if user.is_teacher() {
        Ok(())
    } else {
        Err(CourseworkError::RoleRequired("Teacher"))
    }
}

pub(crate) fn ensure_student(user: &CurrentUser) -> CourseworkResult<()> {
    if user.is_student() {
        Ok(())
    } else {
        Err(CourseworkError::RoleRequired("Student"))
    }
}

/// Submission to an assignment `teacher` created
pub(crate) async fn owned_submission<S>(
    repo: &S,
    teacher: &CurrentUser,
    submission_id: &SubmissionId,
) -> CourseworkResult<SubmissionOverview>
where
    S: SubmissionRepository,
{
    ensure_teacher(teacher)?;

    let overview = repo
        .find_submission(submission_id)
        .await?
        .ok_or(CourseworkError::SubmissionNotFound)?;

    if overview.assignment_owner != teacher.user_id {
        return Err(CourseworkError::AccessDenied);
    }
    Ok(overview)
}
