//! Domain Entities
//!
//! Core business entities for assignments and submissions.

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, SubmissionId, UserId};

use crate::domain::gatekeeper;
use crate::domain::value_objects::{
    AssignmentCode, AssignmentTitle, Marks, MaxMarks, PdfUpload, StoredFileName, SubmissionStatus,
};

/// Editable part of an assignment
#[derive(Debug, Clone)]
pub struct AssignmentDetails {
    pub title: AssignmentTitle,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub max_marks: MaxMarks,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub assignment_id: AssignmentId,
    pub title: AssignmentTitle,
    pub description: Option<String>,
    pub assignment_code: AssignmentCode,
    pub created_by: UserId,
    pub deadline: DateTime<Utc>,
    pub max_marks: MaxMarks,
    pub instructions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(
        details: AssignmentDetails,
        assignment_code: AssignmentCode,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            assignment_id: AssignmentId::new(),
            title: details.title,
            description: details.description,
            assignment_code,
            created_by,
            deadline: details.deadline,
            max_marks: details.max_marks,
            instructions: details.instructions,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields; the code is immutable
    pub fn revise(&mut self, details: AssignmentDetails, now: DateTime<Utc>) {
        self.title = details.title;
        self.description = details.description;
        self.deadline = details.deadline;
        self.max_marks = details.max_marks;
        self.instructions = details.instructions;
        self.updated_at = now;
    }

    /// Soft delete
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.created_by == user_id
    }
}

/// Assignment joined with what listings show about it
#[derive(Debug, Clone)]
pub struct AssignmentOverview {
    pub assignment: Assignment,
    pub teacher_name: String,
    pub submission_count: i64,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub submission_id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub student_id: UserId,
    pub file_path: String,
    pub original_filename: String,
    pub file_size: i64,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub marks_obtained: Option<i32>,
    pub feedback: Option<String>,
    pub corrected_file_path: Option<String>,
    pub corrected_filename: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<UserId>,
    /// Frozen at creation; later deadline edits leave it alone
    pub is_late_submission: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// `now` is read when the record is created, after the file was stored
    pub fn new(
        assignment: &Assignment,
        student_id: UserId,
        upload: &PdfUpload,
        stored: StoredFileName,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            submission_id: SubmissionId::new(),
            assignment_id: assignment.assignment_id,
            student_id,
            file_path: stored.into_string(),
            original_filename: upload.original_filename().to_owned(),
            file_size: upload.size(),
            submitted_at: now,
            status: SubmissionStatus::Uploaded,
            marks_obtained: None,
            feedback: None,
            corrected_file_path: None,
            corrected_filename: None,
            graded_at: None,
            graded_by: None,
            is_late_submission: gatekeeper::is_late(now, assignment.deadline),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_graded(&self) -> bool {
        self.marks_obtained.is_some() && self.graded_at.is_some()
    }

    /// Record a grade and mark the submission completed
    ///
    /// Returns the previously stored corrected file when `corrected` replaces it.
    pub fn grade(
        &mut self,
        marks: Marks,
        feedback: Option<String>,
        graded_by: UserId,
        corrected: Option<(StoredFileName, String)>,
        now: DateTime<Utc>,
    ) -> Option<String> {
        self.marks_obtained = Some(marks.get());
        self.feedback = feedback;
        self.graded_by = Some(graded_by);
        self.graded_at = Some(now);
        self.status = SubmissionStatus::Completed;
        self.updated_at = now;

        let (stored, filename) = corrected?;
        self.corrected_filename = Some(filename);
        self.corrected_file_path.replace(stored.into_string())
    }

    pub fn set_status(&mut self, status: SubmissionStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// File served to readers: the corrected copy when there is one
    pub fn served_file(&self) -> (&str, &str) {
        match (&self.corrected_file_path, &self.corrected_filename) {
            (Some(path), Some(name)) => (path.as_str(), name.as_str()),
            _ => (self.file_path.as_str(), self.original_filename.as_str()),
        }
    }
}

/// Submission joined with its assignment and the people involved
#[derive(Debug, Clone)]
pub struct SubmissionOverview {
    pub submission: Submission,
    pub assignment_title: String,
    pub assignment_code: AssignmentCode,
    pub assignment_max_marks: MaxMarks,
    pub assignment_owner: UserId,
    pub student_name: String,
    pub student_email: String,
    pub graded_by_name: Option<String>,
}

impl SubmissionOverview {
    /// The owning teacher or the submitting student
    pub fn is_visible_to(&self, user_id: &UserId) -> bool {
        &self.assignment_owner == user_id || &self.submission.student_id == user_id
    }
}

/// Aggregates over every submission to one teacher's assignments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionStats {
    pub total: i64,
    pub pending: i64,
    /// Status `COMPLETED`
    pub graded: i64,
    pub late: i64,
    /// Mean over graded submissions; `None` when nothing is graded
    pub average_marks: Option<f64>,
}
