//! Domain Value Objects
//!
//! Immutable value types for assignments and submissions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CourseworkError, CourseworkResult};

// ============================================================================
// Assignment code
// ============================================================================

/// Symbols an assignment code is drawn from
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const CODE_LENGTH: usize = 5;

/// Five-character public identifier students use to find an assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AssignmentCode(String);

impl AssignmentCode {
    /// Exactly five characters, each in `[A-Z0-9]`
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == CODE_LENGTH
            && raw
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    /// Parse user input; lowercase is rejected rather than folded
    pub fn parse(raw: &str) -> CourseworkResult<Self> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(CourseworkError::InvalidAssignmentCode)
        }
    }

    /// Built from alphabet symbols by the allocator
    pub(crate) fn from_generated(code: String) -> Self {
        debug_assert!(Self::is_valid(&code));
        Self(code)
    }

    /// Restore from database (the column carries a format CHECK)
    pub fn from_db(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssignmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssignmentCode {
    type Err = CourseworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Assignment details
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssignmentTitle(String);

impl AssignmentTitle {
    pub const MAX_CHARS: usize = 255;

    pub fn new(raw: &str) -> CourseworkResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::bad_request("Title is required").into());
        }
        if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(AppError::bad_request(format!(
                "Title must be at most {} characters",
                Self::MAX_CHARS
            ))
            .into());
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn from_db(title: String) -> Self {
        Self(title)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssignmentTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Highest mark an assignment awards; always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MaxMarks(i32);

impl MaxMarks {
    pub fn new(value: i32) -> CourseworkResult<Self> {
        if value <= 0 {
            return Err(AppError::bad_request("Max marks must be greater than 0").into());
        }
        Ok(Self(value))
    }

    pub fn from_db(value: i32) -> Self {
        Self(value)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Marks awarded to one submission, bounded by the assignment's maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marks(i32);

impl Marks {
    pub fn new(value: i32, max: MaxMarks) -> CourseworkResult<Self> {
        if !(0..=max.get()).contains(&value) {
            return Err(AppError::bad_request(format!(
                "Marks must be between 0 and {}",
                max.get()
            ))
            .into());
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

// ============================================================================
// Submission status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    #[default]
    Uploaded,
    Pending,
    Completed,
}

impl SubmissionStatus {
    pub fn code(self) -> &'static str {
        match self {
            SubmissionStatus::Uploaded => "UPLOADED",
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [Self::Uploaded, Self::Pending, Self::Completed]
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn parse(raw: &str) -> CourseworkResult<Self> {
        Self::from_code(raw).ok_or_else(|| {
            AppError::bad_request(format!("Unknown submission status: {raw}"))
                .with_action("Use one of UPLOADED, PENDING, COMPLETED")
                .into()
        })
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Files
// ============================================================================

/// A PDF received from a client, checked before it reaches storage
#[derive(Clone)]
pub struct PdfUpload {
    original_filename: String,
    bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(filename: Option<&str>, bytes: Vec<u8>, max_bytes: usize) -> CourseworkResult<Self> {
        if bytes.is_empty() {
            return Err(CourseworkError::InvalidFile("Cannot upload empty file"));
        }
        if bytes.len() > max_bytes {
            return Err(CourseworkError::FileTooLarge { max_bytes });
        }

        let filename = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(CourseworkError::InvalidFile("File name is required"))?;

        if filename.contains("..") || filename.contains(['/', '\\']) {
            return Err(CourseworkError::InvalidFile(
                "Filename contains invalid path sequence",
            ));
        }

        let is_pdf = filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(CourseworkError::InvalidFile("Only PDF files are allowed"));
        }

        Ok(Self {
            original_filename: filename.to_owned(),
            bytes,
        })
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> i64 {
        self.bytes.len() as i64
    }
}

impl fmt::Debug for PdfUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfUpload")
            .field("original_filename", &self.original_filename)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Name a file is kept under inside the upload directory
///
/// `{code}_{owner}_{yyyyMMdd_HHmmss}_{8 hex}.pdf`; `owner` is an e-mail slug
/// such as `jane_doe_uni_edu`, or `corrected_by_{slug}` for graded copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFileName(String);

impl StoredFileName {
    pub fn generate(code: &AssignmentCode, owner: &str, now: DateTime<Utc>) -> Self {
        let unique = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}_{}_{}_{}.pdf",
            code,
            owner,
            now.format("%Y%m%d_%H%M%S"),
            &unique[..8]
        ))
    }

    pub fn corrected_owner(teacher_slug: &str) -> String {
        format!("corrected_by_{teacher_slug}")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_code_validity() {
        assert!(AssignmentCode::is_valid("AB12Z"));
        assert!(AssignmentCode::is_valid("00000"));
        assert!(!AssignmentCode::is_valid("ab12z"));
        assert!(!AssignmentCode::is_valid("AB12"));
        assert!(!AssignmentCode::is_valid("AB12ZZ"));
        assert!(!AssignmentCode::is_valid("AB-12"));
        assert!(!AssignmentCode::is_valid("AB 12"));
        assert!(!AssignmentCode::is_valid("ÄB12Z"));
        assert!(!AssignmentCode::is_valid(""));
    }

    #[test]
    fn test_code_parse_does_not_fold_case() {
        assert!(matches!(
            AssignmentCode::parse("abcde"),
            Err(CourseworkError::InvalidAssignmentCode)
        ));
        assert_eq!(AssignmentCode::parse("ABCDE").unwrap().as_str(), "ABCDE");
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(AssignmentTitle::new("  Essay 1 ").unwrap().as_str(), "Essay 1");
        assert!(AssignmentTitle::new("   ").is_err());
        assert!(AssignmentTitle::new(&"x".repeat(255)).is_ok());
        assert!(AssignmentTitle::new(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_marks_bounds() {
        let max = MaxMarks::new(50).unwrap();
        assert!(Marks::new(0, max).is_ok());
        assert!(Marks::new(50, max).is_ok());
        assert!(Marks::new(51, max).is_err());
        assert!(Marks::new(-1, max).is_err());
        assert!(MaxMarks::new(0).is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            SubmissionStatus::parse("pending").unwrap(),
            SubmissionStatus::Pending
        );
        assert_eq!(SubmissionStatus::default(), SubmissionStatus::Uploaded);
        assert!(SubmissionStatus::parse("GRADED").is_err());
    }

    #[test]
    fn test_pdf_validation() {
        let max = 1024;
        assert!(PdfUpload::new(Some("essay.PDF"), vec![1; 10], max).is_ok());

        let cases = [
            (Some("essay.pdf"), vec![], "Cannot upload empty file"),
            (None, vec![1], "File name is required"),
            (Some("../essay.pdf"), vec![1], "Filename contains invalid path sequence"),
            (Some("dir/essay.pdf"), vec![1], "Filename contains invalid path sequence"),
            (Some("essay.docx"), vec![1], "Only PDF files are allowed"),
            (Some("pdf"), vec![1], "Only PDF files are allowed"),
        ];
        for (name, bytes, expected) in cases {
            let err = PdfUpload::new(name, bytes, max).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }

        assert!(matches!(
            PdfUpload::new(Some("big.pdf"), vec![1; max + 1], max),
            Err(CourseworkError::FileTooLarge { max_bytes: 1024 })
        ));
    }

    #[test]
    fn test_stored_file_name_layout() {
        let code = AssignmentCode::parse("AB12Z").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 58).unwrap();
        let name = StoredFileName::generate(&code, "jane_doe_uni_edu", now);

        let prefix = "AB12Z_jane_doe_uni_edu_20240110_235958_";
        assert!(name.as_str().starts_with(prefix));
        assert!(name.as_str().ends_with(".pdf"));
        assert_eq!(name.as_str().len(), prefix.len() + 8 + ".pdf".len());
        assert_eq!(
            StoredFileName::corrected_owner("prof_uni_edu"),
            "corrected_by_prof_uni_edu"
        );
    }
}
