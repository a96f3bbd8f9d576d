//! Filesystem provider trait for testable binary location.

use super::types::AttemptOutcome;
use std::path::Path;

/// Trait for probing candidate binary paths (injectable for testing).
pub trait FsProvider: Send + Sync {
    /// Check whether a candidate exists and is a regular file.
    fn probe(&self, path: &Path) -> AttemptOutcome;
}

/// Production filesystem provider backed by real filesystem metadata.
pub struct SystemFs;

impl FsProvider for SystemFs {
    fn probe(&self, path: &Path) -> AttemptOutcome {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => AttemptOutcome::Ok,
            Ok(_) => AttemptOutcome::NotAFile,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AttemptOutcome::NotFound,
            Err(e) => AttemptOutcome::IoError(e.to_string()),
        }
    }
}

/// Test/mock filesystem provider with predefined responses.
#[cfg(test)]
#[derive(Default)]
pub struct MockFs {
    files: std::collections::HashSet<std::path::PathBuf>,
}

#[cfg(test)]
impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }
}

#[cfg(test)]
impl FsProvider for MockFs {
    fn probe(&self, path: &Path) -> AttemptOutcome {
        if self.files.contains(path) {
            AttemptOutcome::Ok
        } else {
            AttemptOutcome::NotFound
        }
    }
}
