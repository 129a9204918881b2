//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kernel::id::{AssignmentId, SubmissionId, UserId};

use crate::application::{AssignmentInput, UploadSubmissionOutput};
use crate::domain::entities::{AssignmentOverview, SubmissionOverview, SubmissionStats};

// ============================================================================
// Assignments
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub max_marks: Option<i32>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl From<AssignmentRequest> for AssignmentInput {
    fn from(req: AssignmentRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            deadline: req.deadline,
            max_marks: req.max_marks,
            instructions: req.instructions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub title: String,
    pub description: Option<String>,
    pub assignment_code: String,
    pub created_by_id: UserId,
    pub created_by_name: String,
    pub deadline: DateTime<Utc>,
    pub max_marks: i32,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_expired: bool,
    pub submission_count: i64,
}

impl AssignmentResponse {
    /// `is_expired` is relative to `now`
    pub fn from_overview(overview: &AssignmentOverview, now: DateTime<Utc>) -> Self {
        let a = &overview.assignment;
        Self {
            id: a.assignment_id,
            title: a.title.to_string(),
            description: a.description.clone(),
            assignment_code: a.assignment_code.to_string(),
            created_by_id: a.created_by,
            created_by_name: overview.teacher_name.clone(),
            deadline: a.deadline,
            max_marks: a.max_marks.get(),
            instructions: a.instructions.clone(),
            created_at: a.created_at,
            is_expired: a.is_expired(now),
            submission_count: overview.submission_count,
        }
    }
}

// ============================================================================
// Submissions
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub assignment_title: String,
    pub assignment_code: String,
    pub assignment_max_marks: i32,
    pub student_id: UserId,
    pub student_name: String,
    pub student_email: String,
    pub original_filename: String,
    pub file_size: i64,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
    pub marks_obtained: Option<i32>,
    pub feedback: Option<String>,
    pub corrected_filename: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by_name: Option<String>,
    pub is_late_submission: bool,
    pub is_graded: bool,
}

impl From<&SubmissionOverview> for SubmissionResponse {
    fn from(overview: &SubmissionOverview) -> Self {
        let s = &overview.submission;
        Self {
            id: s.submission_id,
            assignment_id: s.assignment_id,
            assignment_title: overview.assignment_title.clone(),
            assignment_code: overview.assignment_code.to_string(),
            assignment_max_marks: overview.assignment_max_marks.get(),
            student_id: s.student_id,
            student_name: overview.student_name.clone(),
            student_email: overview.student_email.clone(),
            original_filename: s.original_filename.clone(),
            file_size: s.file_size,
            submitted_at: s.submitted_at,
            status: s.status.code().to_string(),
            marks_obtained: s.marks_obtained,
            feedback: s.feedback.clone(),
            corrected_filename: s.corrected_filename.clone(),
            graded_at: s.graded_at,
            graded_by_name: overview.graded_by_name.clone(),
            is_late_submission: s.is_late_submission,
            is_graded: s.is_graded(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub submission_id: SubmissionId,
    pub file_name: String,
    pub file_size: i64,
    pub is_late_submission: bool,
}

impl From<UploadSubmissionOutput> for UploadResponse {
    fn from(output: UploadSubmissionOutput) -> Self {
        Self {
            message: "File uploaded successfully",
            submission_id: output.submission_id,
            file_name: output.file_name,
            file_size: output.file_size,
            is_late_submission: output.is_late_submission,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_submissions: i64,
    pub pending_submissions: i64,
    pub graded_submissions: i64,
    pub late_submissions: i64,
    pub average_marks: Option<f64>,
}

impl From<SubmissionStats> for StatsResponse {
    fn from(stats: SubmissionStats) -> Self {
        Self {
            total_submissions: stats.total,
            pending_submissions: stats.pending,
            graded_submissions: stats.graded,
            late_submissions: stats.late,
            average_marks: stats.average_marks,
        }
    }
}

/// `PUT /submissions/{id}/status?status=...`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

// ============================================================================
// Misc
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
