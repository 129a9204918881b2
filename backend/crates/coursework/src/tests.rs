//! Unit tests for the coursework crate

#[cfg(test)]
mod fixtures {
    use std::sync::Arc;

    use auth::{CurrentUser, Email, UserRole};
    use chrono::{DateTime, TimeZone, Utc};
    use kernel::clock::{Clock, FixedClock};
    use kernel::id::UserId;
    use uuid::Uuid;

    use crate::application::*;
    use crate::domain::code_allocator::CodeAllocator;
    use crate::domain::entities::AssignmentOverview;
    use crate::error::CourseworkResult;
    use crate::infra::{InMemoryCourseworkRepository, InMemoryFileStorage};

    pub const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF";

    pub fn t(day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, h, m, s).unwrap()
    }

    pub fn deadline() -> DateTime<Utc> {
        t(10, 23, 59, 59)
    }

    pub fn user(first: &str, last: &str, email: &str, role: UserRole) -> CurrentUser {
        CurrentUser {
            user_id: UserId::new(),
            session_id: Uuid::new_v4(),
            email: Email::new(email).unwrap(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            role,
        }
    }

    pub struct Fixture {
        pub repo: Arc<InMemoryCourseworkRepository>,
        pub files: Arc<InMemoryFileStorage>,
        pub clock: Arc<FixedClock>,
        pub config: Arc<CourseworkConfig>,
        pub allocator: Arc<CodeAllocator>,
        pub teacher: CurrentUser,
        pub student: CurrentUser,
    }

    impl Fixture {
        pub fn new() -> Self {
            let fixture = Self {
                repo: Arc::new(InMemoryCourseworkRepository::new()),
                files: Arc::new(InMemoryFileStorage::new()),
                clock: Arc::new(FixedClock::new(t(5, 12, 0, 0))),
                config: Arc::new(CourseworkConfig::default()),
                allocator: Arc::new(CodeAllocator::seeded(7, 10)),
                teacher: user("Grace", "Hopper", "grace@uni.edu", UserRole::Teacher),
                student: user("Alan", "Turing", "alan@uni.edu", UserRole::Student),
            };
            fixture.register(&fixture.teacher);
            fixture.register(&fixture.student);
            fixture
        }

        pub fn register(&self, person: &CurrentUser) {
            self.repo
                .add_person(person.user_id, &person.full_name(), person.email.as_str());
        }

        pub fn clock(&self) -> Arc<dyn Clock> {
            self.clock.clone()
        }

        pub fn input(&self, title: &str) -> AssignmentInput {
            AssignmentInput {
                title: title.to_string(),
                description: Some("Write about it".to_string()),
                deadline: deadline(),
                max_marks: None,
                instructions: None,
            }
        }

        pub async fn create(&self, title: &str) -> CourseworkResult<AssignmentOverview> {
            CreateAssignmentUseCase::new(
                self.repo.clone(),
                self.allocator.clone(),
                self.clock(),
                self.config.clone(),
            )
            .execute(&self.teacher, self.input(title))
            .await
        }

        pub async fn upload_as(
            &self,
            student: &CurrentUser,
            code: &str,
            filename: &str,
            bytes: &[u8],
        ) -> CourseworkResult<UploadSubmissionOutput> {
            UploadSubmissionUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.files.clone(),
                self.clock(),
                self.config.clone(),
            )
            .execute(
                student,
                UploadSubmissionInput {
                    assignment_code: code.to_string(),
                    filename: Some(filename.to_string()),
                    bytes: bytes.to_vec(),
                },
            )
            .await
        }

        pub async fn upload(&self, code: &str) -> CourseworkResult<UploadSubmissionOutput> {
            self.upload_as(&self.student, code, "essay.pdf", PDF).await
        }

        pub fn grader(&self) -> GradeSubmissionUseCase<InMemoryCourseworkRepository, InMemoryFileStorage> {
            GradeSubmissionUseCase::new(
                self.repo.clone(),
                self.files.clone(),
                self.clock(),
                self.config.clone(),
            )
        }
    }
}

#[cfg(test)]
mod allocator_tests {
    use std::sync::Arc;

    use kernel::error::kind::ErrorKind;
    use tokio_test::{assert_err, assert_ok};

    use super::fixtures::*;
    use crate::AppError;
    use crate::application::CreateAssignmentUseCase;
    use crate::domain::code_allocator::CodeAllocator;
    use crate::domain::value_objects::AssignmentCode;
    use crate::error::CourseworkError;

    #[tokio::test]
    async fn test_created_assignment_gets_valid_code() {
        let fx = Fixture::new();

        let overview = assert_ok!(fx.create("Essay 1").await);

        assert!(AssignmentCode::is_valid(overview.assignment.assignment_code.as_str()));
        assert_eq!(overview.teacher_name, "Grace Hopper");
        assert_eq!(overview.submission_count, 0);
        assert_eq!(overview.assignment.max_marks.get(), 100);
    }

    #[tokio::test]
    async fn test_taken_code_is_skipped() {
        let fx = Fixture::new();
        let first = assert_ok!(fx.create("Essay 1").await);

        // Same seed proposes the taken code first
        let replay = CreateAssignmentUseCase::new(
            fx.repo.clone(),
            Arc::new(CodeAllocator::seeded(7, 10)),
            fx.clock(),
            fx.config.clone(),
        );
        let second = assert_ok!(replay.execute(&fx.teacher, fx.input("Essay 2")).await);

        assert_ne!(
            first.assignment.assignment_code,
            second.assignment.assignment_code
        );
    }

    #[tokio::test]
    async fn test_exhausted_allocation_is_service_unavailable() {
        let fx = Fixture::new();
        let single_try = |fx: &Fixture| {
            CreateAssignmentUseCase::new(
                fx.repo.clone(),
                Arc::new(CodeAllocator::seeded(99, 1)),
                fx.clock(),
                fx.config.clone(),
            )
        };

        assert_ok!(single_try(&fx).execute(&fx.teacher, fx.input("A")).await);
        let err = assert_err!(single_try(&fx).execute(&fx.teacher, fx.input("B")).await);

        assert!(matches!(
            err,
            CourseworkError::AllocationExhausted { attempts: 1 }
        ));
        let app: AppError = err.into();
        assert_eq!(app.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(app.action(), Some("Retry the request later"));
    }
}

#[cfg(test)]
mod gatekeeper_tests {
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    use super::fixtures::*;
    use crate::application::SubmissionGate;
    use crate::error::CourseworkError;

    #[tokio::test]
    async fn test_can_submit_before_deadline() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let gate = SubmissionGate::new(fx.repo.clone(), fx.clock());

        fx.clock.set(deadline() - Duration::seconds(1));
        assert!(assert_ok!(
            gate.can_submit(&overview.assignment, &fx.student.user_id)
                .await
        ));
    }

    #[tokio::test]
    async fn test_cannot_submit_at_deadline() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let gate = SubmissionGate::new(fx.repo.clone(), fx.clock());

        fx.clock.set(deadline());
        assert!(!assert_ok!(
            gate.can_submit(&overview.assignment, &fx.student.user_id)
                .await
        ));
        let err = assert_err!(gate.admit(&overview.assignment, &fx.student.user_id).await);
        assert!(matches!(err, CourseworkError::DeadlinePassed));
    }

    #[tokio::test]
    async fn test_second_submission_is_refused() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let code = overview.assignment.assignment_code.to_string();
        assert_ok!(fx.upload(&code).await);

        let gate = SubmissionGate::new(fx.repo.clone(), fx.clock());
        assert!(!assert_ok!(
            gate.can_submit(&overview.assignment, &fx.student.user_id)
                .await
        ));

        let err = assert_err!(fx.upload(&code).await);
        assert!(matches!(err, CourseworkError::AlreadySubmitted));
        assert_eq!(
            err.to_string(),
            "You have already submitted for this assignment"
        );
        assert_eq!(fx.repo.submission_count(), 1);
        assert_eq!(fx.files.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_assignment_refuses_uploads() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        crate::application::DeleteAssignmentUseCase::new(fx.repo.clone(), fx.clock())
            .execute(&fx.teacher, &overview.assignment.assignment_id)
            .await
            .unwrap();

        let err = assert_err!(
            fx.upload(overview.assignment.assignment_code.as_str())
                .await
        );
        assert!(matches!(err, CourseworkError::AssignmentInactive));
        assert!(fx.files.is_empty());
    }
}

#[cfg(test)]
mod race_tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use kernel::error::kind::ErrorKind;
    use kernel::id::{AssignmentId, SubmissionId, UserId};
    use tokio_test::{assert_err, assert_ok};

    use super::fixtures::*;
    use crate::AppError;
    use crate::application::*;
    use crate::domain::code_allocator::CodeAllocator;
    use crate::domain::entities::{
        Assignment, AssignmentOverview, Submission, SubmissionOverview, SubmissionStats,
    };
    use crate::domain::repository::{AssignmentRepository, SubmissionRepository};
    use crate::domain::value_objects::{AssignmentCode, SubmissionStatus};
    use crate::error::{CourseworkError, CourseworkResult};
    use crate::infra::InMemoryCourseworkRepository;

    /// Advisory lookups always miss, as when a rival write lands between
    /// the check and the insert
    struct StaleReads(Arc<InMemoryCourseworkRepository>);

    impl AssignmentRepository for StaleReads {
        async fn exists_by_code(&self, _code: &AssignmentCode) -> CourseworkResult<bool> {
            Ok(false)
        }

        async fn insert_if_code_absent(&self, assignment: &Assignment) -> CourseworkResult<bool> {
            self.0.insert_if_code_absent(assignment).await
        }

        async fn find_assignment(
            &self,
            assignment_id: &AssignmentId,
        ) -> CourseworkResult<Option<AssignmentOverview>> {
            self.0.find_assignment(assignment_id).await
        }

        async fn find_by_code(
            &self,
            code: &AssignmentCode,
        ) -> CourseworkResult<Option<AssignmentOverview>> {
            self.0.find_by_code(code).await
        }

        async fn list_active_by_teacher(
            &self,
            teacher_id: &UserId,
        ) -> CourseworkResult<Vec<AssignmentOverview>> {
            self.0.list_active_by_teacher(teacher_id).await
        }

        async fn revise_assignment(&self, assignment: &Assignment) -> CourseworkResult<bool> {
            self.0.revise_assignment(assignment).await
        }

        async fn deactivate_assignment(
            &self,
            assignment_id: &AssignmentId,
            now: DateTime<Utc>,
        ) -> CourseworkResult<()> {
            self.0.deactivate_assignment(assignment_id, now).await
        }
    }

    impl SubmissionRepository for StaleReads {
        async fn exists_submission(
            &self,
            _assignment_id: &AssignmentId,
            _student_id: &UserId,
        ) -> CourseworkResult<bool> {
            Ok(false)
        }

        async fn insert_if_absent(&self, submission: &Submission) -> CourseworkResult<bool> {
            self.0.insert_if_absent(submission).await
        }

        async fn find_submission(
            &self,
            submission_id: &SubmissionId,
        ) -> CourseworkResult<Option<SubmissionOverview>> {
            self.0.find_submission(submission_id).await
        }

        async fn list_by_assignment(
            &self,
            assignment_id: &AssignmentId,
        ) -> CourseworkResult<Vec<SubmissionOverview>> {
            self.0.list_by_assignment(assignment_id).await
        }

        async fn list_by_student(
            &self,
            student_id: &UserId,
        ) -> CourseworkResult<Vec<SubmissionOverview>> {
            self.0.list_by_student(student_id).await
        }

        async fn list_by_teacher(
            &self,
            teacher_id: &UserId,
        ) -> CourseworkResult<Vec<SubmissionOverview>> {
            self.0.list_by_teacher(teacher_id).await
        }

        async fn save_grade(&self, submission: &Submission) -> CourseworkResult<()> {
            self.0.save_grade(submission).await
        }

        async fn update_status(
            &self,
            submission_id: &SubmissionId,
            status: SubmissionStatus,
        ) -> CourseworkResult<()> {
            self.0.update_status(submission_id, status).await
        }

        async fn stats_for_teacher(&self, teacher_id: &UserId) -> CourseworkResult<SubmissionStats> {
            self.0.stats_for_teacher(teacher_id).await
        }
    }

    #[tokio::test]
    async fn test_lost_submission_race_is_conflict_and_drops_file() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let code = overview.assignment.assignment_code.to_string();
        let first = assert_ok!(fx.upload(&code).await);
        let first_path = assert_ok!(fx.repo.find_submission(&first.submission_id).await)
            .unwrap()
            .submission
            .file_path;

        let stale = Arc::new(StaleReads(fx.repo.clone()));
        let racing = UploadSubmissionUseCase::new(
            stale.clone(),
            stale,
            fx.files.clone(),
            fx.clock(),
            fx.config.clone(),
        );
        let err = assert_err!(
            racing
                .execute(
                    &fx.student,
                    UploadSubmissionInput {
                        assignment_code: code,
                        filename: Some("again.pdf".to_string()),
                        bytes: PDF.to_vec(),
                    },
                )
                .await
        );

        assert!(matches!(err, CourseworkError::Conflict(_)));
        let app: AppError = err.into();
        assert_eq!(app.kind(), ErrorKind::Conflict);
        assert_eq!(app.status_code(), 409);

        assert_eq!(fx.repo.submission_count(), 1);
        assert_eq!(fx.files.len(), 1);
        assert!(fx.files.contains(&first_path));
    }

    #[tokio::test]
    async fn test_lost_code_race_is_retried() {
        let fx = Fixture::new();
        let first = assert_ok!(fx.create("Essay 1").await);

        // Same seed proposes the taken code first, and the lookup misses it
        let stale = Arc::new(StaleReads(fx.repo.clone()));
        let racing = CreateAssignmentUseCase::new(
            stale.clone(),
            Arc::new(CodeAllocator::seeded(7, 10)),
            fx.clock(),
            fx.config.clone(),
        );
        let second = assert_ok!(racing.execute(&fx.teacher, fx.input("Essay 2")).await);

        assert_ne!(
            first.assignment.assignment_code,
            second.assignment.assignment_code
        );
        let listed = assert_ok!(fx.repo.list_active_by_teacher(&fx.teacher.user_id).await);
        assert_eq!(listed.len(), 2);

        let single_try = CreateAssignmentUseCase::new(
            stale,
            Arc::new(CodeAllocator::seeded(7, 1)),
            fx.clock(),
            fx.config.clone(),
        );
        let err = assert_err!(single_try.execute(&fx.teacher, fx.input("Essay 3")).await);
        assert!(matches!(
            err,
            CourseworkError::AllocationExhausted { attempts: 1 }
        ));
    }
}

#[cfg(test)]
mod config_tests {
    use crate::application::config::*;
    use std::path::Path;

    #[test]
    fn test_default_config() {
        let config = CourseworkConfig::default();

        assert_eq!(config.upload_dir, Path::new("./uploads"));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.code_max_attempts, 10);
        assert_eq!(config.default_max_marks, 100);
    }

    #[test]
    fn test_body_limit_leaves_room_for_form_fields() {
        let config = CourseworkConfig::with_upload_dir("/srv/uploads");

        assert_eq!(config.upload_dir, Path::new("/srv/uploads"));
        assert!(config.body_limit() > config.max_upload_bytes);
    }
}

#[cfg(test)]
mod dto_tests {
    use super::fixtures::*;
    use crate::domain::repository::SubmissionRepository;
    use crate::presentation::dto::*;

    #[test]
    fn test_assignment_request_deserialization() {
        let json = r#"{
            "title": "Essay",
            "deadline": "2024-01-10T23:59:59Z",
            "maxMarks": 50
        }"#;

        let req: AssignmentRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.title, "Essay");
        assert_eq!(req.deadline, deadline());
        assert_eq!(req.max_marks, Some(50));
        assert!(req.description.is_none());
    }

    #[tokio::test]
    async fn test_assignment_response_serialization() {
        let fx = Fixture::new();
        let overview = fx.create("Essay").await.unwrap();

        let before = AssignmentResponse::from_overview(&overview, t(5, 12, 0, 0));
        let json = serde_json::to_value(&before).unwrap();

        assert_eq!(json["assignmentCode"], overview.assignment.assignment_code.as_str());
        assert_eq!(json["createdByName"], "Grace Hopper");
        assert_eq!(json["maxMarks"], 100);
        assert_eq!(json["deadline"], "2024-01-10T23:59:59Z");
        assert_eq!(json["isExpired"], false);
        assert_eq!(json["submissionCount"], 0);

        let after = AssignmentResponse::from_overview(&overview, deadline());
        assert!(after.is_expired);
    }

    #[tokio::test]
    async fn test_submission_response_serialization() {
        let fx = Fixture::new();
        let overview = fx.create("Essay").await.unwrap();
        let uploaded = fx
            .upload(overview.assignment.assignment_code.as_str())
            .await
            .unwrap();

        let submission = fx
            .repo
            .find_submission(&uploaded.submission_id)
            .await
            .unwrap()
            .unwrap();
        let json = serde_json::to_value(SubmissionResponse::from(&submission)).unwrap();

        assert_eq!(json["status"], "UPLOADED");
        assert_eq!(json["studentName"], "Alan Turing");
        assert_eq!(json["studentEmail"], "alan@uni.edu");
        assert_eq!(json["originalFilename"], "essay.pdf");
        assert_eq!(json["isGraded"], false);
        assert_eq!(json["isLateSubmission"], false);
        assert!(json["marksObtained"].is_null());

        let upload = serde_json::to_value(UploadResponse::from(uploaded)).unwrap();
        assert_eq!(upload["message"], "File uploaded successfully");
        assert_eq!(upload["fileName"], "essay.pdf");
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::CourseworkError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_codes() {
        let cases = [
            (CourseworkError::InvalidAssignmentCode, StatusCode::BAD_REQUEST),
            (
                CourseworkError::UnknownAssignmentCode("ZZZZZ".into()),
                StatusCode::BAD_REQUEST,
            ),
            (CourseworkError::DeadlinePassed, StatusCode::BAD_REQUEST),
            (CourseworkError::AlreadySubmitted, StatusCode::BAD_REQUEST),
            (CourseworkError::AssignmentNotFound, StatusCode::NOT_FOUND),
            (CourseworkError::FileNotFound, StatusCode::NOT_FOUND),
            (CourseworkError::AccessDenied, StatusCode::FORBIDDEN),
            (CourseworkError::RoleRequired("Teacher"), StatusCode::FORBIDDEN),
            (
                CourseworkError::FileTooLarge {
                    max_bytes: 10 * 1024 * 1024,
                },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                CourseworkError::AllocationExhausted { attempts: 10 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CourseworkError::Conflict("taken"), StatusCode::CONFLICT),
            (
                CourseworkError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CourseworkError::UnknownAssignmentCode("AB12Z".into()).to_string(),
            "Assignment not found with code: AB12Z"
        );
        assert_eq!(
            CourseworkError::FileTooLarge {
                max_bytes: 10 * 1024 * 1024
            }
            .to_string(),
            "File size exceeds maximum limit of 10 MB"
        );
        assert_eq!(
            CourseworkError::RoleRequired("Student").to_string(),
            "Student role required"
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app: crate::AppError = CourseworkError::Internal("pool timed out".into()).into();

        assert_eq!(app.message(), "Coursework service error");
    }
}

#[cfg(test)]
mod use_case_tests {
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    use auth::UserRole;
    use kernel::clock::Clock;
    use kernel::error::kind::ErrorKind;

    use super::fixtures::*;
    use crate::AppError;
    use crate::application::*;
    use crate::domain::repository::AssignmentRepository;
    use crate::domain::value_objects::SubmissionStatus;
    use crate::error::CourseworkError;

    #[tokio::test]
    async fn test_upload_stores_file_and_record() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let code = overview.assignment.assignment_code.to_string();

        let output = assert_ok!(fx.upload(&code).await);

        assert_eq!(output.file_name, "essay.pdf");
        assert_eq!(output.file_size, PDF.len() as i64);
        assert!(!output.is_late_submission);
        assert_eq!(fx.files.len(), 1);

        let listed = assert_ok!(
            ListSubmissionsUseCase::new(fx.repo.clone(), fx.repo.clone())
                .for_student(&fx.student)
                .await
        );
        assert_eq!(listed.len(), 1);
        let stored = &listed[0].submission;
        assert!(stored.file_path.starts_with(&format!("{code}_alan_uni_edu_20240105_120000_")));
        assert!(fx.files.contains(&stored.file_path));
        assert_eq!(stored.status, SubmissionStatus::Uploaded);
    }

    #[tokio::test]
    async fn test_code_errors() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);

        let err = assert_err!(fx.upload("ab12z").await);
        assert!(matches!(err, CourseworkError::InvalidAssignmentCode));

        let padded = format!(" {} ", overview.assignment.assignment_code);
        let err = assert_err!(fx.upload(&padded).await);
        assert!(matches!(err, CourseworkError::InvalidAssignmentCode));
        assert!(fx.files.is_empty());

        let err = assert_err!(fx.upload("ZZZZZ").await);
        assert!(matches!(err, CourseworkError::UnknownAssignmentCode(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_file_validation() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let code = overview.assignment.assignment_code.to_string();

        let err = assert_err!(fx.upload_as(&fx.student, &code, "essay.docx", PDF).await);
        assert_eq!(err.to_string(), "Only PDF files are allowed");

        let err = assert_err!(fx.upload_as(&fx.student, &code, "essay.pdf", b"").await);
        assert_eq!(err.to_string(), "Cannot upload empty file");

        let err = assert_err!(fx.upload_as(&fx.student, &code, "../essay.pdf", PDF).await);
        assert_eq!(err.to_string(), "Filename contains invalid path sequence");

        assert!(fx.files.is_empty());
    }

    #[tokio::test]
    async fn test_roles_are_enforced() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);

        let err = assert_err!(
            fx.upload_as(
                &fx.teacher,
                overview.assignment.assignment_code.as_str(),
                "essay.pdf",
                PDF
            )
            .await
        );
        assert!(matches!(err, CourseworkError::RoleRequired("Student")));

        let err = assert_err!(
            CreateAssignmentUseCase::new(
                fx.repo.clone(),
                fx.allocator.clone(),
                fx.clock(),
                fx.config.clone(),
            )
            .execute(&fx.student, fx.input("Sneaky"))
            .await
        );
        assert!(matches!(err, CourseworkError::RoleRequired("Teacher")));
    }

    #[tokio::test]
    async fn test_deadline_edit_keeps_late_flag() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let id = overview.assignment.assignment_id;
        let uploaded = assert_ok!(fx.upload(overview.assignment.assignment_code.as_str()).await);

        let mut input = fx.input("Essay");
        input.deadline = t(1, 0, 0, 0);
        let updated = assert_ok!(
            UpdateAssignmentUseCase::new(fx.repo.clone(), fx.clock(), fx.config.clone())
                .execute(&fx.teacher, &id, input)
                .await
        );
        assert_eq!(updated.assignment.assignment_code, overview.assignment.assignment_code);
        assert_eq!(updated.submission_count, 1);

        let listed = assert_ok!(
            ListSubmissionsUseCase::new(fx.repo.clone(), fx.repo.clone())
                .for_assignment(&fx.teacher, &id)
                .await
        );
        assert_eq!(listed[0].submission.submission_id, uploaded.submission_id);
        assert!(!listed[0].submission.is_late_submission);
    }

    #[tokio::test]
    async fn test_assignment_visibility() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let id = overview.assignment.assignment_id;
        let other = user("Ada", "Lovelace", "ada@uni.edu", UserRole::Teacher);
        let find = FindAssignmentUseCase::new(fx.repo.clone());

        assert_ok!(find.by_id(&fx.teacher, &id).await);
        assert_ok!(find.by_id(&fx.student, &id).await);
        let err = assert_err!(find.by_id(&other, &id).await);
        assert!(matches!(err, CourseworkError::AccessDenied));

        let err = assert_err!(
            UpdateAssignmentUseCase::new(fx.repo.clone(), fx.clock(), fx.config.clone())
                .execute(&other, &id, fx.input("Hijacked"))
                .await
        );
        assert!(matches!(err, CourseworkError::AccessDenied));

        let found = assert_ok!(find.by_code(overview.assignment.assignment_code.as_str()).await);
        assert_eq!(found.assignment.assignment_id, id);
        let err = assert_err!(find.by_code("abc").await);
        assert!(matches!(err, CourseworkError::InvalidAssignmentCode));
    }

    #[tokio::test]
    async fn test_deleted_assignment_leaves_listing_and_search() {
        let fx = Fixture::new();
        let kept = assert_ok!(fx.create("Kept").await);
        fx.clock.advance(Duration::minutes(1));
        let dropped = assert_ok!(fx.create("Dropped").await);

        assert_ok!(
            DeleteAssignmentUseCase::new(fx.repo.clone(), fx.clock())
                .execute(&fx.teacher, &dropped.assignment.assignment_id)
                .await
        );

        let listed = assert_ok!(ListAssignmentsUseCase::new(fx.repo.clone()).execute(&fx.teacher).await);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].assignment.assignment_id, kept.assignment.assignment_id);

        let err = assert_err!(
            FindAssignmentUseCase::new(fx.repo.clone())
                .by_code(dropped.assignment.assignment_code.as_str())
                .await
        );
        assert!(matches!(err, CourseworkError::AssignmentNotFound));
    }

    #[tokio::test]
    async fn test_edit_does_not_revive_deleted_assignment() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let id = overview.assignment.assignment_id;

        // Loaded for an edit before the delete lands
        let mut stale = overview.assignment.clone();
        stale.title = crate::domain::value_objects::AssignmentTitle::new("Renamed").unwrap();

        assert_ok!(
            DeleteAssignmentUseCase::new(fx.repo.clone(), fx.clock())
                .execute(&fx.teacher, &id)
                .await
        );

        assert!(!assert_ok!(fx.repo.revise_assignment(&stale).await));
        let current = assert_ok!(fx.repo.find_assignment(&id).await).unwrap();
        assert!(!current.assignment.is_active);
        assert_eq!(current.assignment.title.as_str(), "Essay");

        let err = assert_err!(
            UpdateAssignmentUseCase::new(fx.repo.clone(), fx.clock(), fx.config.clone())
                .execute(&fx.teacher, &id, fx.input("Renamed"))
                .await
        );
        assert!(matches!(err, CourseworkError::AssignmentNotFound));
        assert!(!assert_ok!(fx.repo.find_assignment(&id).await).unwrap().assignment.is_active);
    }

    #[tokio::test]
    async fn test_grading_flow() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let uploaded = assert_ok!(fx.upload(overview.assignment.assignment_code.as_str()).await);

        let err = assert_err!(
            fx.grader()
                .execute(
                    &fx.teacher,
                    &uploaded.submission_id,
                    GradeSubmissionInput {
                        marks: 101,
                        feedback: None,
                        corrected_file: None,
                    },
                )
                .await
        );
        let app: AppError = err.into();
        assert_eq!(app.kind(), ErrorKind::BadRequest);
        assert_eq!(app.message(), "Marks must be between 0 and 100");

        fx.clock.advance(Duration::hours(2));
        let graded = assert_ok!(
            fx.grader()
                .execute(
                    &fx.teacher,
                    &uploaded.submission_id,
                    GradeSubmissionInput {
                        marks: 87,
                        feedback: Some("Solid argument".into()),
                        corrected_file: Some(CorrectedFileInput {
                            filename: Some("marked.pdf".into()),
                            bytes: b"%PDF-corrected".to_vec(),
                        }),
                    },
                )
                .await
        );

        let s = &graded.submission;
        assert!(s.is_graded());
        assert_eq!(s.status, SubmissionStatus::Completed);
        assert_eq!(s.marks_obtained, Some(87));
        assert_eq!(s.graded_at, Some(fx.clock.now()));
        assert_eq!(graded.graded_by_name.as_deref(), Some("Grace Hopper"));
        assert_eq!(s.corrected_filename.as_deref(), Some("marked.pdf"));
        let corrected_path = s.corrected_file_path.clone().unwrap();
        assert!(corrected_path.contains("_corrected_by_grace_uni_edu_"));
        assert_eq!(fx.files.len(), 2);

        // Both parties now receive the corrected copy
        let fetch = FetchSubmissionFileUseCase::new(fx.repo.clone(), fx.files.clone());
        for viewer in [&fx.teacher, &fx.student] {
            let file = assert_ok!(fetch.execute(viewer, &uploaded.submission_id).await);
            assert_eq!(file.filename, "marked.pdf");
            assert_eq!(file.bytes, b"%PDF-corrected");
        }

        let stats = assert_ok!(SubmissionStatsUseCase::new(fx.repo.clone()).execute(&fx.teacher).await);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.graded, 1);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.average_marks, Some(87.0));
    }

    #[tokio::test]
    async fn test_regrade_replaces_corrected_file() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let uploaded = assert_ok!(fx.upload(overview.assignment.assignment_code.as_str()).await);
        let with_file = |marks| GradeSubmissionInput {
            marks,
            feedback: None,
            corrected_file: Some(CorrectedFileInput {
                filename: Some("marked.pdf".into()),
                bytes: PDF.to_vec(),
            }),
        };

        let first = assert_ok!(fx.grader().execute(&fx.teacher, &uploaded.submission_id, with_file(40)).await);
        fx.clock.advance(Duration::seconds(1));
        let second = assert_ok!(fx.grader().execute(&fx.teacher, &uploaded.submission_id, with_file(60)).await);

        let old = first.submission.corrected_file_path.unwrap();
        let new = second.submission.corrected_file_path.unwrap();
        assert!(!fx.files.contains(&old));
        assert!(fx.files.contains(&new));
        assert_eq!(fx.files.len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_submissions_are_off_limits() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let uploaded = assert_ok!(fx.upload(overview.assignment.assignment_code.as_str()).await);
        let other_teacher = user("Ada", "Lovelace", "ada@uni.edu", UserRole::Teacher);
        let other_student = user("Kurt", "Godel", "kurt@uni.edu", UserRole::Student);

        let err = assert_err!(
            fx.grader()
                .execute(
                    &other_teacher,
                    &uploaded.submission_id,
                    GradeSubmissionInput {
                        marks: 10,
                        feedback: None,
                        corrected_file: None,
                    },
                )
                .await
        );
        assert!(matches!(err, CourseworkError::AccessDenied));

        let fetch = FetchSubmissionFileUseCase::new(fx.repo.clone(), fx.files.clone());
        let err = assert_err!(fetch.execute(&other_student, &uploaded.submission_id).await);
        assert!(matches!(err, CourseworkError::AccessDenied));

        let err = assert_err!(
            ListSubmissionsUseCase::new(fx.repo.clone(), fx.repo.clone())
                .for_assignment(&other_teacher, &overview.assignment.assignment_id)
                .await
        );
        assert!(matches!(err, CourseworkError::AccessDenied));
    }

    #[tokio::test]
    async fn test_status_update() {
        let fx = Fixture::new();
        let overview = assert_ok!(fx.create("Essay").await);
        let uploaded = assert_ok!(fx.upload(overview.assignment.assignment_code.as_str()).await);
        let use_case = UpdateSubmissionStatusUseCase::new(fx.repo.clone());

        let status = assert_ok!(use_case.execute(&fx.teacher, &uploaded.submission_id, "pending").await);
        assert_eq!(status, SubmissionStatus::Pending);

        let stats = assert_ok!(SubmissionStatsUseCase::new(fx.repo.clone()).execute(&fx.teacher).await);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.average_marks, None);

        let err = assert_err!(use_case.execute(&fx.teacher, &uploaded.submission_id, "LOST").await);
        let app: AppError = err.into();
        assert_eq!(app.message(), "Unknown submission status: LOST");
        assert_eq!(app.action(), Some("Use one of UPLOADED, PENDING, COMPLETED"));
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use auth::application::{SignInInput, SignInUseCase, SignUpInput, SignUpUseCase};
    use auth::middleware::AuthMiddlewareState;
    use auth::{AuthConfig, InMemoryAuthRepository};

    use super::fixtures::*;
    use crate::presentation::handlers::CourseworkAppState;
    use crate::presentation::router::coursework_router_generic;

    const BOUNDARY: &str = "coursework-test-boundary";

    struct Harness {
        app: Router,
        teacher_token: String,
        student_token: String,
    }

    async fn sign_up_and_in(
        repo: &Arc<InMemoryAuthRepository>,
        config: &Arc<AuthConfig>,
        fx: &Fixture,
        email: &str,
        role: &str,
    ) -> String {
        let user = SignUpUseCase::new(repo.clone(), config.clone())
            .execute(SignUpInput {
                email: email.to_string(),
                password: "Grading-Rubric-42".to_string(),
                first_name: "Test".to_string(),
                last_name: role.to_string(),
                role: role.to_string(),
            })
            .await
            .unwrap();
        fx.repo
            .add_person(user.user_id, &format!("Test {role}"), email);

        SignInUseCase::new(repo.clone(), repo.clone(), repo.clone(), config.clone())
            .execute(SignInInput {
                email: email.to_string(),
                password: "Grading-Rubric-42".to_string(),
            })
            .await
            .unwrap()
            .token
    }

    async fn harness() -> Harness {
        let fx = Fixture::new();
        let auth_repo = Arc::new(InMemoryAuthRepository::new());
        let auth_config = Arc::new(AuthConfig::with_random_secret());

        let teacher_token = sign_up_and_in(&auth_repo, &auth_config, &fx, "prof@uni.edu", "TEACHER").await;
        let student_token = sign_up_and_in(&auth_repo, &auth_config, &fx, "kid@uni.edu", "STUDENT").await;

        let state = CourseworkAppState {
            repo: fx.repo.clone(),
            files: fx.files.clone(),
            allocator: fx.allocator.clone(),
            clock: fx.clock(),
            config: fx.config.clone(),
        };
        let guard = AuthMiddlewareState::new(auth_repo, auth_config);

        Harness {
            app: coursework_router_generic(state, guard),
            teacher_token,
            student_token,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn upload_body(code: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"assignmentCode\"\r\n\r\n{code}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    #[tokio::test]
    async fn test_requests_without_token_are_rejected() {
        let h = harness().await;

        let response = h
            .app
            .oneshot(Request::get("/assignments").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_assignment_to_download_flow() {
        let h = harness().await;
        let teacher = format!("Bearer {}", h.teacher_token);
        let student = format!("Bearer {}", h.student_token);

        // Teacher publishes
        let response = h
            .app
            .clone()
            .oneshot(
                Request::post("/assignments")
                    .header(header::AUTHORIZATION, &teacher)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "title": "Essay", "deadline": "2024-01-10T23:59:59Z" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let code = created["assignmentCode"].as_str().unwrap().to_string();
        assert_eq!(code.len(), 5);
        assert_eq!(created["createdByName"], "Test TEACHER");

        // Student finds it by code
        let response = h
            .app
            .clone()
            .oneshot(
                Request::get(format!("/assignments/search/{code}"))
                    .header(header::AUTHORIZATION, &student)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Student uploads
        let response = h
            .app
            .clone()
            .oneshot(
                Request::post("/submissions/upload")
                    .header(header::AUTHORIZATION, &student)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(upload_body(&code, "essay.pdf", PDF)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = body_json(response).await;
        assert_eq!(uploaded["message"], "File uploaded successfully");
        assert_eq!(uploaded["isLateSubmission"], false);
        let submission_id = uploaded["submissionId"].as_str().unwrap().to_string();

        // A second upload is refused with the user-facing reason
        let response = h
            .app
            .clone()
            .oneshot(
                Request::post("/submissions/upload")
                    .header(header::AUTHORIZATION, &student)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(upload_body(&code, "essay.pdf", PDF)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "You have already submitted for this assignment"
        );

        // Teacher views the PDF inline
        let response = h
            .app
            .clone()
            .oneshot(
                Request::get(format!("/submissions/view/{submission_id}"))
                    .header(header::AUTHORIZATION, &teacher)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], PDF);

        // Student is not a teacher
        let response = h
            .app
            .clone()
            .oneshot(
                Request::get("/submissions/stats")
                    .header(header::AUTHORIZATION, &student)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = h
            .app
            .oneshot(
                Request::get("/submissions/stats")
                    .header(header::AUTHORIZATION, &teacher)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stats = body_json(response).await;
        assert_eq!(stats["totalSubmissions"], 1);
        assert!(stats["averageMarks"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_code_search() {
        let h = harness().await;

        let response = h
            .app
            .oneshot(
                Request::get("/assignments/search/abc")
                    .header(header::AUTHORIZATION, format!("Bearer {}", h.student_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "Invalid assignment code format"
        );
    }
}
