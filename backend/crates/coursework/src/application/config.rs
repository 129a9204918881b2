//! Application Configuration
//!
//! Configuration for the coursework application layer.

use std::path::PathBuf;

/// Multipart framing allowance on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct CourseworkConfig {
    /// Directory holding every submitted and corrected PDF
    pub upload_dir: PathBuf,
    /// Largest accepted PDF (10 MiB)
    pub max_upload_bytes: usize,
    /// Codes tried before assignment creation gives up
    pub code_max_attempts: u32,
    /// Applied when a new assignment names no maximum
    pub default_max_marks: i32,
}

impl Default for CourseworkConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            code_max_attempts: 10,
            default_max_marks: 100,
        }
    }
}

impl CourseworkConfig {
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Default::default()
        }
    }

    /// Request body limit for multipart routes
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes + FORM_OVERHEAD_BYTES
    }
}
