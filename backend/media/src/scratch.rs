//! Per-operation scratch directory.
//!
//! Uploaded inputs, the concat manifest and the resized logo all live in one
//! temporary directory that is removed when the [`Scratch`] is dropped,
//! whichever way the operation ends.

use std::path::{Path, PathBuf};

use reelforge_core::{ReelResult, UploadedFile};
use tempfile::TempDir;
use tracing::{debug, warn};

pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Create a scratch directory under the system temp root.
    pub fn new() -> ReelResult<Self> {
        let dir = tempfile::Builder::new().prefix("reelforge-").tempdir()?;
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `data` to `name` and return the absolute path.
    pub async fn persist(&self, name: &str, data: &[u8]) -> ReelResult<PathBuf> {
        let path = self.file(name);
        tokio::fs::write(&path, data).await?;
        debug!(path = %path.display(), bytes = data.len(), "Persisted scratch file");
        Ok(path)
    }
}

/// Remove whatever a failed run left at `output`. A missing file is fine.
pub(crate) async fn discard_partial(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => debug!(path = %output.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %output.display(), error = %e, "Could not remove partial output"),
    }
}

/// Upload extension if it is plain alphanumeric, `mp4` otherwise. Scratch
/// names never carry user text beyond this.
pub fn safe_extension(file: &UploadedFile) -> String {
    file.extension()
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "mp4".to_string())
}
