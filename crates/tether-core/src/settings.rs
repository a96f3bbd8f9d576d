//! Settings domain types and validation.
//!
//! Pure domain types for the host-facing configuration surface. How the
//! host stores or edits these values is its own concern; this module only
//! defines the shape, defaults, and validation rules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bounded wait for the engine socket-discovery handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 10_000;

/// Default bounded wait for the IPC connect.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Upper bound accepted for either timeout.
pub const MAX_TIMEOUT_MS: u64 = 120_000;

/// Engine bridge settings.
///
/// All fields are optional to support partial updates and graceful
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Explicit engine binary path; workspace-relative unless absolute.
    pub server_path: Option<String>,

    /// When the configured path cannot be found under any workspace root,
    /// fall through to dependency and bundle resolution instead of
    /// failing outright. Defaults to strict (no fallback).
    pub configured_path_fallback: Option<bool>,

    /// Bounded wait for the socket-discovery handshake, in milliseconds.
    pub handshake_timeout_ms: Option<u64>,

    /// Bounded wait for the IPC connect, in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            server_path: None,
            configured_path_fallback: Some(false),
            handshake_timeout_ms: Some(DEFAULT_HANDSHAKE_TIMEOUT_MS),
            connect_timeout_ms: Some(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    /// Get the effective handshake timeout (with default fallback).
    #[must_use]
    pub const fn effective_handshake_timeout(&self) -> Duration {
        match self.handshake_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_millis(DEFAULT_HANDSHAKE_TIMEOUT_MS),
        }
    }

    /// Get the effective connect timeout (with default fallback).
    #[must_use]
    pub const fn effective_connect_timeout(&self) -> Duration {
        match self.connect_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    /// Whether a missing configured path falls through to the remaining
    /// strategies (with default fallback: strict).
    #[must_use]
    pub const fn effective_configured_path_fallback(&self) -> bool {
        match self.configured_path_fallback {
            Some(fallback) => fallback,
            None => false,
        }
    }

    /// Merge another settings into this one, only updating fields that
    /// are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref path) = other.server_path {
            self.server_path.clone_from(path);
        }
        if let Some(ref fallback) = other.configured_path_fallback {
            self.configured_path_fallback = *fallback;
        }
        if let Some(ref ms) = other.handshake_timeout_ms {
            self.handshake_timeout_ms = *ms;
        }
        if let Some(ref ms) = other.connect_timeout_ms {
            self.connect_timeout_ms = *ms;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub server_path: Option<Option<String>>,
    pub configured_path_fallback: Option<Option<bool>>,
    pub handshake_timeout_ms: Option<Option<u64>>,
    pub connect_timeout_ms: Option<Option<u64>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Timeout must be between 1 and {MAX_TIMEOUT_MS} ms, got {0}")]
    InvalidTimeout(u64),

    #[error("Server path cannot be blank; unset it instead")]
    BlankServerPath,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    for timeout in [settings.handshake_timeout_ms, settings.connect_timeout_ms] {
        if let Some(ms) = timeout {
            if !(1..=MAX_TIMEOUT_MS).contains(&ms) {
                return Err(SettingsError::InvalidTimeout(ms));
            }
        }
    }

    // A path of only whitespace is almost certainly an editing mistake;
    // an empty string means "unset" and is accepted.
    if settings
        .server_path
        .as_ref()
        .is_some_and(|p| !p.is_empty() && p.trim().is_empty())
    {
        return Err(SettingsError::BlankServerPath);
    }

    Ok(())
}
