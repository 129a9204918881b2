//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, SubmissionId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    Assignment, AssignmentOverview, Submission, SubmissionOverview, SubmissionStats,
};
use crate::domain::repository::{AssignmentRepository, SubmissionRepository};
use crate::domain::value_objects::{AssignmentCode, AssignmentTitle, MaxMarks, SubmissionStatus};
use crate::error::{CourseworkError, CourseworkResult};

/// Assignment columns plus owner name and submission count
const ASSIGNMENT_OVERVIEW: &str = r#"
    SELECT
        a.assignment_id,
        a.title,
        a.description,
        a.assignment_code,
        a.created_by,
        a.deadline,
        a.max_marks,
        a.instructions,
        a.is_active,
        a.created_at,
        a.updated_at,
        u.first_name || ' ' || u.last_name AS teacher_name,
        (SELECT COUNT(*) FROM submissions s WHERE s.assignment_id = a.assignment_id) AS submission_count
    FROM assignments a
    JOIN users u ON u.user_id = a.created_by
"#;

/// Submission columns plus assignment, student and grader details
const SUBMISSION_OVERVIEW: &str = r#"
    SELECT
        s.submission_id,
        s.assignment_id,
        s.student_id,
        s.file_path,
        s.original_filename,
        s.file_size,
        s.submitted_at,
        s.status,
        s.marks_obtained,
        s.feedback,
        s.corrected_file_path,
        s.corrected_filename,
        s.graded_at,
        s.graded_by,
        s.is_late_submission,
        s.created_at,
        s.updated_at,
        a.title AS assignment_title,
        a.assignment_code,
        a.max_marks AS assignment_max_marks,
        a.created_by AS assignment_owner,
        st.first_name || ' ' || st.last_name AS student_name,
        st.email AS student_email,
        g.first_name || ' ' || g.last_name AS graded_by_name
    FROM submissions s
    JOIN assignments a ON a.assignment_id = s.assignment_id
    JOIN users st ON st.user_id = s.student_id
    LEFT JOIN users g ON g.user_id = s.graded_by
"#;

/// PostgreSQL-backed assignment and submission repository
#[derive(Clone)]
pub struct PgCourseworkRepository {
    pool: PgPool,
}

impl PgCourseworkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Assignment Repository Implementation
// ============================================================================

impl AssignmentRepository for PgCourseworkRepository {
    async fn exists_by_code(&self, code: &AssignmentCode) -> CourseworkResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM assignments WHERE assignment_code = $1)",
        )
        .bind(code.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_if_code_absent(&self, assignment: &Assignment) -> CourseworkResult<bool> {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO assignments (
                assignment_id,
                title,
                description,
                assignment_code,
                created_by,
                deadline,
                max_marks,
                instructions,
                is_active,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (assignment_code) DO NOTHING
            RETURNING assignment_id
            "#,
        )
        .bind(assignment.assignment_id.as_uuid())
        .bind(assignment.title.as_str())
        .bind(assignment.description.as_deref())
        .bind(assignment.assignment_code.as_str())
        .bind(assignment.created_by.as_uuid())
        .bind(assignment.deadline)
        .bind(assignment.max_marks.get())
        .bind(assignment.instructions.as_deref())
        .bind(assignment.is_active)
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    async fn find_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Option<AssignmentOverview>> {
        let sql = format!("{ASSIGNMENT_OVERVIEW} WHERE a.assignment_id = $1");
        let row = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(assignment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AssignmentRow::into_overview))
    }

    async fn find_by_code(
        &self,
        code: &AssignmentCode,
    ) -> CourseworkResult<Option<AssignmentOverview>> {
        let sql = format!("{ASSIGNMENT_OVERVIEW} WHERE a.assignment_code = $1");
        let row = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AssignmentRow::into_overview))
    }

    async fn list_active_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> CourseworkResult<Vec<AssignmentOverview>> {
        let sql = format!(
            "{ASSIGNMENT_OVERVIEW} WHERE a.created_by = $1 AND a.is_active ORDER BY a.created_at DESC"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(teacher_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AssignmentRow::into_overview).collect())
    }

    async fn revise_assignment(&self, assignment: &Assignment) -> CourseworkResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE assignments SET
                title = $2,
                description = $3,
                deadline = $4,
                max_marks = $5,
                instructions = $6,
                updated_at = $7
            WHERE assignment_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(assignment.assignment_id.as_uuid())
        .bind(assignment.title.as_str())
        .bind(assignment.description.as_deref())
        .bind(assignment.deadline)
        .bind(assignment.max_marks.get())
        .bind(assignment.instructions.as_deref())
        .bind(assignment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn deactivate_assignment(
        &self,
        assignment_id: &AssignmentId,
        now: DateTime<Utc>,
    ) -> CourseworkResult<()> {
        sqlx::query(
            r#"
            UPDATE assignments SET is_active = FALSE, updated_at = $2
            WHERE assignment_id = $1
            "#,
        )
        .bind(assignment_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Submission Repository Implementation
// ============================================================================

impl SubmissionRepository for PgCourseworkRepository {
    async fn exists_submission(
        &self,
        assignment_id: &AssignmentId,
        student_id: &UserId,
    ) -> CourseworkResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE assignment_id = $1 AND student_id = $2)",
        )
        .bind(assignment_id.as_uuid())
        .bind(student_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_if_absent(&self, submission: &Submission) -> CourseworkResult<bool> {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO submissions (
                submission_id,
                assignment_id,
                student_id,
                file_path,
                original_filename,
                file_size,
                submitted_at,
                status,
                is_late_submission,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (assignment_id, student_id) DO NOTHING
            RETURNING submission_id
            "#,
        )
        .bind(submission.submission_id.as_uuid())
        .bind(submission.assignment_id.as_uuid())
        .bind(submission.student_id.as_uuid())
        .bind(&submission.file_path)
        .bind(&submission.original_filename)
        .bind(submission.file_size)
        .bind(submission.submitted_at)
        .bind(submission.status.code())
        .bind(submission.is_late_submission)
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    async fn find_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> CourseworkResult<Option<SubmissionOverview>> {
        let sql = format!("{SUBMISSION_OVERVIEW} WHERE s.submission_id = $1");
        let row = sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(submission_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(SubmissionRow::into_overview).transpose()
    }

    async fn list_by_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        let sql = format!("{SUBMISSION_OVERVIEW} WHERE s.assignment_id = $1 ORDER BY s.submitted_at");
        self.fetch_overviews(&sql, assignment_id.as_uuid()).await
    }

    async fn list_by_student(
        &self,
        student_id: &UserId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        let sql =
            format!("{SUBMISSION_OVERVIEW} WHERE s.student_id = $1 ORDER BY s.submitted_at DESC");
        self.fetch_overviews(&sql, student_id.as_uuid()).await
    }

    async fn list_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        let sql =
            format!("{SUBMISSION_OVERVIEW} WHERE a.created_by = $1 ORDER BY s.submitted_at DESC");
        self.fetch_overviews(&sql, teacher_id.as_uuid()).await
    }

    async fn save_grade(&self, submission: &Submission) -> CourseworkResult<()> {
        sqlx::query(
            r#"
            UPDATE submissions SET
                status = $2,
                marks_obtained = $3,
                feedback = $4,
                corrected_file_path = $5,
                corrected_filename = $6,
                graded_at = $7,
                graded_by = $8,
                updated_at = $9
            WHERE submission_id = $1
            "#,
        )
        .bind(submission.submission_id.as_uuid())
        .bind(submission.status.code())
        .bind(submission.marks_obtained)
        .bind(submission.feedback.as_deref())
        .bind(submission.corrected_file_path.as_deref())
        .bind(submission.corrected_filename.as_deref())
        .bind(submission.graded_at)
        .bind(submission.graded_by.map(UserId::into_uuid))
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        submission_id: &SubmissionId,
        status: SubmissionStatus,
    ) -> CourseworkResult<()> {
        sqlx::query("UPDATE submissions SET status = $2, updated_at = now() WHERE submission_id = $1")
            .bind(submission_id.as_uuid())
            .bind(status.code())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn stats_for_teacher(&self, teacher_id: &UserId) -> CourseworkResult<SubmissionStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE s.status = 'PENDING') AS pending,
                COUNT(*) FILTER (WHERE s.status = 'COMPLETED') AS graded,
                COUNT(*) FILTER (WHERE s.is_late_submission) AS late,
                (AVG(s.marks_obtained)
                    FILTER (WHERE s.marks_obtained IS NOT NULL AND s.graded_at IS NOT NULL)
                )::FLOAT8 AS average_marks
            FROM submissions s
            JOIN assignments a ON a.assignment_id = s.assignment_id
            WHERE a.created_by = $1
            "#,
        )
        .bind(teacher_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(SubmissionStats {
            total: row.total,
            pending: row.pending,
            graded: row.graded,
            late: row.late,
            average_marks: row.average_marks,
        })
    }
}

impl PgCourseworkRepository {
    async fn fetch_overviews(
        &self,
        sql: &str,
        key: &Uuid,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(sql)
            .bind(*key)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SubmissionRow::into_overview).collect()
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    assignment_id: Uuid,
    title: String,
    description: Option<String>,
    assignment_code: String,
    created_by: Uuid,
    deadline: DateTime<Utc>,
    max_marks: i32,
    instructions: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    teacher_name: String,
    submission_count: i64,
}

impl AssignmentRow {
    fn into_overview(self) -> AssignmentOverview {
        AssignmentOverview {
            assignment: Assignment {
                assignment_id: AssignmentId::from_uuid(self.assignment_id),
                title: AssignmentTitle::from_db(self.title),
                description: self.description,
                assignment_code: AssignmentCode::from_db(self.assignment_code),
                created_by: UserId::from_uuid(self.created_by),
                deadline: self.deadline,
                max_marks: MaxMarks::from_db(self.max_marks),
                instructions: self.instructions,
                is_active: self.is_active,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            teacher_name: self.teacher_name,
            submission_count: self.submission_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    submission_id: Uuid,
    assignment_id: Uuid,
    student_id: Uuid,
    file_path: String,
    original_filename: String,
    file_size: i64,
    submitted_at: DateTime<Utc>,
    status: String,
    marks_obtained: Option<i32>,
    feedback: Option<String>,
    corrected_file_path: Option<String>,
    corrected_filename: Option<String>,
    graded_at: Option<DateTime<Utc>>,
    graded_by: Option<Uuid>,
    is_late_submission: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignment_title: String,
    assignment_code: String,
    assignment_max_marks: i32,
    assignment_owner: Uuid,
    student_name: String,
    student_email: String,
    graded_by_name: Option<String>,
}

impl SubmissionRow {
    fn into_overview(self) -> CourseworkResult<SubmissionOverview> {
        let status = SubmissionStatus::from_code(&self.status)
            .ok_or_else(|| CourseworkError::Internal(format!("Invalid status: {}", self.status)))?;

        Ok(SubmissionOverview {
            submission: Submission {
                submission_id: SubmissionId::from_uuid(self.submission_id),
                assignment_id: AssignmentId::from_uuid(self.assignment_id),
                student_id: UserId::from_uuid(self.student_id),
                file_path: self.file_path,
                original_filename: self.original_filename,
                file_size: self.file_size,
                submitted_at: self.submitted_at,
                status,
                marks_obtained: self.marks_obtained,
                feedback: self.feedback,
                corrected_file_path: self.corrected_file_path,
                corrected_filename: self.corrected_filename,
                graded_at: self.graded_at,
                graded_by: self.graded_by.map(UserId::from_uuid),
                is_late_submission: self.is_late_submission,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            assignment_title: self.assignment_title,
            assignment_code: AssignmentCode::from_db(self.assignment_code),
            assignment_max_marks: MaxMarks::from_db(self.assignment_max_marks),
            assignment_owner: UserId::from_uuid(self.assignment_owner),
            student_name: self.student_name,
            student_email: self.student_email,
            graded_by_name: self.graded_by_name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: i64,
    pending: i64,
    graded: i64,
    late: i64,
    average_marks: Option<f64>,
}
