//! Temp Staging: uploaded payloads written to uniquely named scratch files.
//!
//! A [`StagedFile`] owns its path. The file is removed by
//! [`StagedFile::release`] or, failing that, when the handle is dropped, so
//! every exit path of the caller (early return, error, panic) cleans up.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::error::PipelineError;

const STAGED_PREFIX: &str = "facegate-upload-";

/// Writes uploads into a scratch directory.
#[derive(Debug, Clone)]
pub struct TempStaging {
    dir: PathBuf,
}

impl TempStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stage into the platform temp directory
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `payload` to a new file named uniquely within the scratch
    /// directory, with `extension_hint` (if any) as its extension.
    pub fn stage(
        &self,
        payload: &[u8],
        extension_hint: Option<&str>,
    ) -> Result<StagedFile, PipelineError> {
        let suffix = extension_hint
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        // Created with O_EXCL and a random name, so concurrent requests never collide.
        let mut file = Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| PipelineError::Io(format!("create staged file: {}", e)))?;

        // On failure `file` drops here and removes the partial file.
        file.write_all(payload)
            .and_then(|_| file.flush())
            .map_err(|e| PipelineError::Io(format!("write staged file: {}", e)))?;

        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        debug!(path = %path.display(), bytes = payload.len(), "Staged upload");

        Ok(StagedFile {
            path,
            guard: Some(temp_path),
        })
    }
}

/// A staged copy of an upload. Removed on release or drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now. Safe to call repeatedly, and safe when the file
    /// is already gone.
    pub fn release(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };

        match guard.close() {
            Ok(()) => debug!(path = %self.path.display(), "Released staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staged file"),
        }
    }

    pub fn is_released(&self) -> bool {
        self.guard.is_none()
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.release();
    }
}
