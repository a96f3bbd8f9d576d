//! Types for engine binary location.

use std::path::PathBuf;

/// A single candidate checked during location, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// Strategy that produced the candidate.
    pub strategy: &'static str,
    /// The path (or resolution base) that was checked.
    pub candidate: PathBuf,
    /// The outcome of checking this candidate.
    pub outcome: AttemptOutcome,
}

/// Possible outcomes when probing a candidate binary path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Candidate accepted (success case).
    Ok,
    /// Path does not exist.
    NotFound,
    /// Path exists but is not a regular file.
    NotAFile,
    /// Dependency resolution reported failure for this base directory.
    NotResolved(String),
    /// Other I/O error occurred while probing.
    IoError(String),
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::NotFound => write!(f, "not found"),
            Self::NotAFile => write!(f, "not a file"),
            Self::NotResolved(msg) => write!(f, "not resolved: {msg}"),
            Self::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

/// Error returned when binary location fails.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// No engine artifact is published for the host platform. Terminal
    /// for the whole session.
    #[error(
        "No prebuilt engine binary is available for {os}/{arch}. \
         Build the engine yourself and point the server path setting at it."
    )]
    UnsupportedPlatform { os: String, arch: String },

    /// Every strategy in the chain was exhausted. Terminal for the whole
    /// session.
    #[error("Could not locate the engine binary. Tried:\n{attempts}")]
    NotFound { attempts: String },

    /// A configured relative path existed under none of the workspace
    /// roots and fallback is disabled.
    #[error(
        "Configured engine path '{path}' was not found under any workspace root"
    )]
    ConfiguredPathMissing { path: String },
}

impl LocateError {
    /// Create a `NotFound` error with formatted attempt details.
    pub fn not_found(attempts: &[Attempt]) -> Self {
        let attempts_str = attempts
            .iter()
            .map(|a| format!("  {} ({}): {}", a.candidate.display(), a.strategy, a.outcome))
            .collect::<Vec<_>>()
            .join("\n");

        Self::NotFound {
            attempts: if attempts_str.is_empty() {
                "  (no candidates checked)".to_string()
            } else {
                attempts_str
            },
        }
    }
}
