//! Core domain types for engine resolution and connection.
//!
//! These are pure data types with no process or network dependencies;
//! the resolution and connection machinery lives in `tether-bridge`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Workspace trust level supplied by the host environment.
///
/// Untrusted workspaces are restricted to the bundled engine binary:
/// no configured, override, or dependency-resolved binary may execute
/// there. This is a security boundary, not an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trust {
    Trusted,
    Untrusted,
}

impl Trust {
    #[must_use]
    pub const fn is_trusted(self) -> bool {
        matches!(self, Self::Trusted)
    }
}

/// Platform-specific IPC endpoint address advertised by the engine:
/// a named-pipe path on Windows, a domain-socket path elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketAddress(String);

impl SocketAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs to engine binary resolution.
///
/// Constructed once per activation by the host integration and read-only
/// for the duration of the resolution chain.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Trust level of the workspace the session was activated for.
    pub trust: Trust,
    /// Explicit binary path from settings; workspace-relative unless
    /// absolute. Empty strings are treated as unset.
    pub configured_path: Option<String>,
    /// Workspace roots in declaration order.
    pub workspace_roots: Vec<PathBuf>,
    /// Root of the host-provided bundle holding the fallback binary.
    pub bundle_root: PathBuf,
}

impl ResolutionContext {
    #[must_use]
    pub fn new(trust: Trust, bundle_root: impl Into<PathBuf>) -> Self {
        Self {
            trust,
            configured_path: None,
            workspace_roots: Vec::new(),
            bundle_root: bundle_root.into(),
        }
    }

    /// Set the explicit binary path from settings.
    #[must_use]
    pub fn with_configured_path(mut self, path: impl Into<String>) -> Self {
        self.configured_path = Some(path.into());
        self
    }

    /// Set the workspace roots, in declaration order.
    #[must_use]
    pub fn with_workspace_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.workspace_roots = roots;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Trust::Untrusted).unwrap(),
            "\"untrusted\""
        );
    }

    #[test]
    fn socket_address_displays_raw_path() {
        let address = SocketAddress::new("/tmp/tether.sock");
        assert_eq!(address.to_string(), "/tmp/tether.sock");
        assert_eq!(address.as_str(), "/tmp/tether.sock");
    }

    #[test]
    fn context_builder_collects_inputs() {
        let cx = ResolutionContext::new(Trust::Trusted, "/ext")
            .with_configured_path("bin/tether")
            .with_workspace_roots(vec![PathBuf::from("/ws")]);

        assert!(cx.trust.is_trusted());
        assert_eq!(cx.configured_path.as_deref(), Some("bin/tether"));
        assert_eq!(cx.workspace_roots, vec![PathBuf::from("/ws")]);
        assert_eq!(cx.bundle_root, PathBuf::from("/ext"));
    }
}
