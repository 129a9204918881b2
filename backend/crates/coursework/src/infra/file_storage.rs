//! Local Disk File Storage
//!
//! Files live flat inside one upload directory. Names handed to `load` and
//! `delete` come from the database and are still checked so no lookup leaves
//! that directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::repository::FileStorage;
use crate::domain::value_objects::StoredFileName;
use crate::error::{CourseworkError, CourseworkResult};

#[derive(Debug, Clone)]
pub struct DiskFileStorage {
    root: PathBuf,
}

impl DiskFileStorage {
    /// Create the directory if needed and anchor on its canonical path
    pub async fn open(upload_dir: impl AsRef<Path>) -> CourseworkResult<Self> {
        tokio::fs::create_dir_all(upload_dir.as_ref()).await?;
        let root = tokio::fs::canonicalize(upload_dir.as_ref()).await?;

        tracing::info!(upload_dir = %root.display(), "File storage ready");

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> CourseworkResult<PathBuf> {
        let flat = !name.is_empty()
            && name != "."
            && !name.contains("..")
            && !name.contains(['/', '\\', '\0']);
        if !flat {
            tracing::warn!(file = name, "Rejected stored path outside upload directory");
            return Err(CourseworkError::FileNotFound);
        }
        Ok(self.root.join(name))
    }
}

impl FileStorage for DiskFileStorage {
    async fn store(&self, name: &StoredFileName, bytes: &[u8]) -> CourseworkResult<()> {
        let path = self.resolve(name.as_str())?;
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(file = %name, size = bytes.len(), "File stored");

        Ok(())
    }

    async fn load(&self, name: &str) -> CourseworkResult<Vec<u8>> {
        let path = self.resolve(name)?;

        // Symlinks must not lead out of the directory either
        let real = match tokio::fs::canonicalize(&path).await {
            Ok(real) => real,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CourseworkError::FileNotFound),
            Err(e) => return Err(e.into()),
        };
        if !real.starts_with(&self.root) {
            tracing::warn!(file = name, "Rejected stored path outside upload directory");
            return Err(CourseworkError::FileNotFound);
        }

        Ok(tokio::fs::read(&real).await?)
    }

    async fn delete(&self, name: &str) -> CourseworkResult<()> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
