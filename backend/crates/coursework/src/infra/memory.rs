//! In-memory repository and file storage
//!
//! Same contracts as [`super::postgres::PgCourseworkRepository`] and
//! [`super::file_storage::DiskFileStorage`], backed by maps. Used by the test
//! suite; the uniqueness guards hold under the table lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, SubmissionId, UserId};

use crate::domain::entities::{
    Assignment, AssignmentOverview, Submission, SubmissionOverview, SubmissionStats,
};
use crate::domain::repository::{AssignmentRepository, FileStorage, SubmissionRepository};
use crate::domain::value_objects::{AssignmentCode, StoredFileName, SubmissionStatus};
use crate::error::{CourseworkError, CourseworkResult};

#[derive(Debug, Clone)]
struct Person {
    name: String,
    email: String,
}

#[derive(Default)]
struct Tables {
    people: HashMap<UserId, Person>,
    assignments: HashMap<AssignmentId, Assignment>,
    submissions: HashMap<SubmissionId, Submission>,
}

impl Tables {
    fn person_name(&self, user_id: &UserId) -> String {
        self.people
            .get(user_id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn assignment_overview(&self, assignment: &Assignment) -> AssignmentOverview {
        AssignmentOverview {
            assignment: assignment.clone(),
            teacher_name: self.person_name(&assignment.created_by),
            submission_count: self
                .submissions
                .values()
                .filter(|s| s.assignment_id == assignment.assignment_id)
                .count() as i64,
        }
    }

    fn submission_overview(&self, submission: &Submission) -> CourseworkResult<SubmissionOverview> {
        let assignment = self
            .assignments
            .get(&submission.assignment_id)
            .ok_or_else(|| CourseworkError::Internal("Submission without assignment".into()))?;
        let student = self.people.get(&submission.student_id);

        Ok(SubmissionOverview {
            submission: submission.clone(),
            assignment_title: assignment.title.to_string(),
            assignment_code: assignment.assignment_code.clone(),
            assignment_max_marks: assignment.max_marks,
            assignment_owner: assignment.created_by,
            student_name: student.map(|p| p.name.clone()).unwrap_or_default(),
            student_email: student.map(|p| p.email.clone()).unwrap_or_default(),
            graded_by_name: submission.graded_by.map(|id| self.person_name(&id)),
        })
    }

    fn submission_overviews<P>(
        &self,
        keep: P,
        newest_first: bool,
    ) -> CourseworkResult<Vec<SubmissionOverview>>
    where
        P: Fn(&Submission) -> bool,
    {
        let mut matching: Vec<&Submission> =
            self.submissions.values().filter(|s| keep(s)).collect();
        matching.sort_by_key(|s| s.submitted_at);
        if newest_first {
            matching.reverse();
        }
        matching
            .into_iter()
            .map(|s| self.submission_overview(s))
            .collect()
    }

    fn owner_of(&self, assignment_id: &AssignmentId) -> Option<UserId> {
        self.assignments.get(assignment_id).map(|a| a.created_by)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCourseworkRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryCourseworkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Names and e-mails the SQL implementation joins from `users`
    pub fn add_person(&self, user_id: UserId, name: &str, email: &str) {
        self.lock().people.insert(
            user_id,
            Person {
                name: name.to_owned(),
                email: email.to_owned(),
            },
        );
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }
}

impl AssignmentRepository for InMemoryCourseworkRepository {
    async fn exists_by_code(&self, code: &AssignmentCode) -> CourseworkResult<bool> {
        Ok(self
            .lock()
            .assignments
            .values()
            .any(|a| &a.assignment_code == code))
    }

    async fn insert_if_code_absent(&self, assignment: &Assignment) -> CourseworkResult<bool> {
        let mut tables = self.lock();
        if tables
            .assignments
            .values()
            .any(|a| a.assignment_code == assignment.assignment_code)
        {
            return Ok(false);
        }
        tables
            .assignments
            .insert(assignment.assignment_id, assignment.clone());
        Ok(true)
    }

    async fn find_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Option<AssignmentOverview>> {
        let tables = self.lock();
        Ok(tables
            .assignments
            .get(assignment_id)
            .map(|a| tables.assignment_overview(a)))
    }

    async fn find_by_code(
        &self,
        code: &AssignmentCode,
    ) -> CourseworkResult<Option<AssignmentOverview>> {
        let tables = self.lock();
        Ok(tables
            .assignments
            .values()
            .find(|a| &a.assignment_code == code)
            .map(|a| tables.assignment_overview(a)))
    }

    async fn list_active_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> CourseworkResult<Vec<AssignmentOverview>> {
        let tables = self.lock();
        let mut own: Vec<&Assignment> = tables
            .assignments
            .values()
            .filter(|a| a.is_active && &a.created_by == teacher_id)
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own.into_iter().map(|a| tables.assignment_overview(a)).collect())
    }

    async fn revise_assignment(&self, assignment: &Assignment) -> CourseworkResult<bool> {
        let mut tables = self.lock();
        match tables.assignments.get_mut(&assignment.assignment_id) {
            Some(current) if current.is_active => {
                *current = Assignment {
                    is_active: true,
                    ..assignment.clone()
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate_assignment(
        &self,
        assignment_id: &AssignmentId,
        now: DateTime<Utc>,
    ) -> CourseworkResult<()> {
        if let Some(assignment) = self.lock().assignments.get_mut(assignment_id) {
            assignment.deactivate(now);
        }
        Ok(())
    }
}

impl SubmissionRepository for InMemoryCourseworkRepository {
    async fn exists_submission(
        &self,
        assignment_id: &AssignmentId,
        student_id: &UserId,
    ) -> CourseworkResult<bool> {
        Ok(self
            .lock()
            .submissions
            .values()
            .any(|s| &s.assignment_id == assignment_id && &s.student_id == student_id))
    }

    async fn insert_if_absent(&self, submission: &Submission) -> CourseworkResult<bool> {
        let mut tables = self.lock();
        if tables.submissions.values().any(|s| {
            s.assignment_id == submission.assignment_id && s.student_id == submission.student_id
        }) {
            return Ok(false);
        }
        tables
            .submissions
            .insert(submission.submission_id, submission.clone());
        Ok(true)
    }

    async fn find_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> CourseworkResult<Option<SubmissionOverview>> {
        let tables = self.lock();
        tables
            .submissions
            .get(submission_id)
            .map(|s| tables.submission_overview(s))
            .transpose()
    }

    async fn list_by_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        self.lock()
            .submission_overviews(|s| &s.assignment_id == assignment_id, false)
    }

    async fn list_by_student(
        &self,
        student_id: &UserId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        self.lock()
            .submission_overviews(|s| &s.student_id == student_id, true)
    }

    async fn list_by_teacher(
        &self,
        teacher_id: &UserId,
    ) -> CourseworkResult<Vec<SubmissionOverview>> {
        let tables = self.lock();
        tables.submission_overviews(
            |s| tables.owner_of(&s.assignment_id).as_ref() == Some(teacher_id),
            true,
        )
    }

    async fn save_grade(&self, submission: &Submission) -> CourseworkResult<()> {
        self.lock()
            .submissions
            .insert(submission.submission_id, submission.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        submission_id: &SubmissionId,
        status: SubmissionStatus,
    ) -> CourseworkResult<()> {
        if let Some(s) = self.lock().submissions.get_mut(submission_id) {
            s.status = status;
        }
        Ok(())
    }

    async fn stats_for_teacher(&self, teacher_id: &UserId) -> CourseworkResult<SubmissionStats> {
        let tables = self.lock();
        let mine: Vec<&Submission> = tables
            .submissions
            .values()
            .filter(|s| tables.owner_of(&s.assignment_id).as_ref() == Some(teacher_id))
            .collect();

        let graded_marks: Vec<i32> = mine
            .iter()
            .filter(|s| s.is_graded())
            .filter_map(|s| s.marks_obtained)
            .collect();

        Ok(SubmissionStats {
            total: mine.len() as i64,
            pending: mine
                .iter()
                .filter(|s| s.status == SubmissionStatus::Pending)
                .count() as i64,
            graded: mine
                .iter()
                .filter(|s| s.status == SubmissionStatus::Completed)
                .count() as i64,
            late: mine.iter().filter(|s| s.is_late_submission).count() as i64,
            average_marks: (!graded_marks.is_empty()).then(|| {
                graded_marks.iter().map(|&m| f64::from(m)).sum::<f64>() / graded_marks.len() as f64
            }),
        })
    }
}

/// Map-backed [`FileStorage`]
#[derive(Clone, Default)]
pub struct InMemoryFileStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl FileStorage for InMemoryFileStorage {
    async fn store(&self, name: &StoredFileName, bytes: &[u8]) -> CourseworkResult<()> {
        self.lock().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, name: &str) -> CourseworkResult<Vec<u8>> {
        self.lock()
            .get(name)
            .cloned()
            .ok_or(CourseworkError::FileNotFound)
    }

    async fn delete(&self, name: &str) -> CourseworkResult<()> {
        self.lock().remove(name);
        Ok(())
    }
}
