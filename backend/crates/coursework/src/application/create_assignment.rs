//! Create Assignment Use Case

use std::sync::Arc;

use auth::CurrentUser;
use chrono::{DateTime, Utc};
use kernel::clock::Clock;

use crate::application::access::ensure_teacher;
use crate::application::config::CourseworkConfig;
use crate::domain::code_allocator::CodeAllocator;
use crate::domain::entities::{Assignment, AssignmentDetails, AssignmentOverview};
use crate::domain::repository::AssignmentRepository;
use crate::domain::value_objects::{AssignmentTitle, MaxMarks};
use crate::error::CourseworkResult;

/// Fields a teacher supplies when creating or editing an assignment
#[derive(Debug, Clone)]
pub struct AssignmentInput {
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub max_marks: Option<i32>,
    pub instructions: Option<String>,
}

impl AssignmentInput {
    pub(crate) fn into_details(self, default_max_marks: i32) -> CourseworkResult<AssignmentDetails> {
        Ok(AssignmentDetails {
            title: AssignmentTitle::new(&self.title)?,
            description: non_blank(self.description),
            deadline: self.deadline,
            max_marks: MaxMarks::new(self.max_marks.unwrap_or(default_max_marks))?,
            instructions: non_blank(self.instructions),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct CreateAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    assignment_repo: Arc<A>,
    allocator: Arc<CodeAllocator>,
    clock: Arc<dyn Clock>,
    config: Arc<CourseworkConfig>,
}

impl<A> CreateAssignmentUseCase<A>
where
    A: AssignmentRepository,
{
    pub fn new(
        assignment_repo: Arc<A>,
        allocator: Arc<CodeAllocator>,
        clock: Arc<dyn Clock>,
        config: Arc<CourseworkConfig>,
    ) -> Self {
        Self {
            assignment_repo,
            allocator,
            clock,
            config,
        }
    }

    pub async fn execute(
        &self,
        teacher: &CurrentUser,
        input: AssignmentInput,
    ) -> CourseworkResult<AssignmentOverview> {
        ensure_teacher(teacher)?;
        let details = input.into_details(self.config.default_max_marks)?;
        let now = self.clock.now();
        let repo = &self.assignment_repo;

        let assignment = self
            .allocator
            .allocate(|code| {
                let candidate = Assignment::new(details.clone(), code, teacher.user_id, now);
                async move {
                    if repo.exists_by_code(&candidate.assignment_code).await? {
                        return Ok(None);
                    }
                    // Lost races come back as `false` and are retried
                    let inserted = repo.insert_if_code_absent(&candidate).await?;
                    Ok(inserted.then_some(candidate))
                }
            })
            .await?;

        tracing::info!(
            assignment_id = %assignment.assignment_id,
            code = %assignment.assignment_code,
            teacher_id = %teacher.user_id,
            "Assignment created"
        );

        Ok(AssignmentOverview {
            assignment,
            teacher_name: teacher.full_name(),
            submission_count: 0,
        })
    }
}
