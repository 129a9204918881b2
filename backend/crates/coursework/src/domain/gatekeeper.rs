//! Submission Gatekeeper
//!
//! Pure rules deciding whether an upload is acceptable and whether it is late.
//! Reading the clock and the existing-submission lookup happens in
//! [`crate::application::submission_gate`].

use chrono::{DateTime, Utc};

use crate::domain::entities::Assignment;

/// Why an upload was refused, in the order the checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionRejection {
    Inactive,
    DeadlinePassed,
    AlreadySubmitted,
}

/// Accept unless the assignment is inactive, expired, or already submitted to
pub fn evaluate(
    assignment: &Assignment,
    now: DateTime<Utc>,
    already_submitted: bool,
) -> Result<(), SubmissionRejection> {
    if !assignment.is_active {
        return Err(SubmissionRejection::Inactive);
    }
    if assignment.is_expired(now) {
        return Err(SubmissionRejection::DeadlinePassed);
    }
    if already_submitted {
        return Err(SubmissionRejection::AlreadySubmitted);
    }
    Ok(())
}

/// A submission created at or after the deadline is late
#[inline]
pub fn is_late(now: DateTime<Utc>, deadline: DateTime<Utc>) -> bool {
    now >= deadline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AssignmentDetails;
    use crate::domain::value_objects::{AssignmentCode, AssignmentTitle, MaxMarks};
    use chrono::{Duration, TimeZone};
    use kernel::id::UserId;

    fn assignment(deadline: DateTime<Utc>) -> Assignment {
        Assignment::new(
            AssignmentDetails {
                title: AssignmentTitle::new("Lab report").unwrap(),
                description: None,
                deadline,
                max_marks: MaxMarks::new(100).unwrap(),
                instructions: None,
            },
            AssignmentCode::parse("LAB01").unwrap(),
            UserId::new(),
            deadline - Duration::days(14),
        )
    }

    #[test]
    fn test_deadline_boundary() {
        let deadline = Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap();
        let a = assignment(deadline);

        let before = Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 58).unwrap();
        assert_eq!(evaluate(&a, before, false), Ok(()));
        assert!(!is_late(before, deadline));

        assert_eq!(
            evaluate(&a, deadline, false),
            Err(SubmissionRejection::DeadlinePassed)
        );
        assert!(is_late(deadline, deadline));

        let after = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 1).unwrap();
        assert_eq!(
            evaluate(&a, after, false),
            Err(SubmissionRejection::DeadlinePassed)
        );
    }

    #[test]
    fn test_duplicate_rejected_regardless_of_deadline() {
        let deadline = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let a = assignment(deadline);
        let now = deadline - Duration::days(1);

        assert_eq!(
            evaluate(&a, now, true),
            Err(SubmissionRejection::AlreadySubmitted)
        );
    }

    #[test]
    fn test_rejection_precedence() {
        let deadline = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mut a = assignment(deadline);
        let late = deadline + Duration::days(1);

        assert_eq!(
            evaluate(&a, late, true),
            Err(SubmissionRejection::DeadlinePassed)
        );

        a.deactivate(late);
        assert_eq!(evaluate(&a, late, true), Err(SubmissionRejection::Inactive));
    }
}
