//! Location strategies, evaluated in fixed priority order.

use super::fs::FsProvider;
use super::types::{Attempt, AttemptOutcome, LocateError};
use crate::platform::TargetDescriptor;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tether_core::{DependencyResolver, ResolutionContext};
use tracing::{info, warn};

/// Environment variable holding a development-time engine binary path.
pub const DEBUG_SERVER_PATH_VAR: &str = "TETHER_DEBUG_SERVER_PATH";

/// Subdirectory of the bundle root holding the fallback binary.
const BUNDLE_SERVER_DIR: &str = "server";

/// Outcome of evaluating one strategy in the chain.
pub enum StrategyOutcome {
    /// This strategy determined the final path; the rest are skipped.
    Resolved(PathBuf),
    /// Nothing found here; evaluation continues with the next strategy.
    Skip,
    /// Resolution fails without consulting the remaining strategies.
    Halt(LocateError),
}

/// One step of the location chain.
///
/// Each strategy inspects the context, records what it checked, and
/// reports exactly one outcome; ordering and short-circuiting belong to
/// the chain, not to the strategies.
#[async_trait]
pub trait LocateStrategy: Send + Sync {
    /// Short name used in diagnostics and logs.
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        cx: &ResolutionContext,
        attempts: &mut Vec<Attempt>,
    ) -> StrategyOutcome;
}

/// Development escape hatch: an environment-level binary path returned
/// unconditionally when set.
pub(super) struct DebugOverride<'a> {
    pub env: &'a (dyn Fn(&str) -> Option<OsString> + Send + Sync),
}

#[async_trait]
impl LocateStrategy for DebugOverride<'_> {
    fn name(&self) -> &'static str {
        "debug-override"
    }

    async fn evaluate(
        &self,
        _cx: &ResolutionContext,
        attempts: &mut Vec<Attempt>,
    ) -> StrategyOutcome {
        let Some(value) = (self.env)(DEBUG_SERVER_PATH_VAR) else {
            return StrategyOutcome::Skip;
        };
        if value.is_empty() {
            return StrategyOutcome::Skip;
        }

        let path = PathBuf::from(value);
        info!(path = %path.display(), "engine debug override detected");
        attempts.push(Attempt {
            strategy: self.name(),
            candidate: path.clone(),
            outcome: AttemptOutcome::Ok,
        });
        StrategyOutcome::Resolved(path)
    }
}

/// Explicit binary path from settings.
///
/// Absolute paths are returned as-is without existence verification: the
/// operator asked for this exact binary. Relative paths are checked under
/// each workspace root in declaration order. A relative path found under
/// no root halts the chain unless fallback is enabled.
pub(super) struct ConfiguredPath<'a> {
    pub fs: &'a dyn FsProvider,
    pub fallback: bool,
}

#[async_trait]
impl LocateStrategy for ConfiguredPath<'_> {
    fn name(&self) -> &'static str {
        "configured"
    }

    async fn evaluate(
        &self,
        cx: &ResolutionContext,
        attempts: &mut Vec<Attempt>,
    ) -> StrategyOutcome {
        let Some(configured) = cx.configured_path.as_deref() else {
            return StrategyOutcome::Skip;
        };
        if configured.is_empty() {
            return StrategyOutcome::Skip;
        }

        let path = Path::new(configured);
        if path.is_absolute() {
            attempts.push(Attempt {
                strategy: self.name(),
                candidate: path.to_path_buf(),
                outcome: AttemptOutcome::Ok,
            });
            return StrategyOutcome::Resolved(path.to_path_buf());
        }

        for root in &cx.workspace_roots {
            let candidate = root.join(path);
            let outcome = self.fs.probe(&candidate);
            let hit = outcome == AttemptOutcome::Ok;
            attempts.push(Attempt {
                strategy: self.name(),
                candidate: candidate.clone(),
                outcome,
            });
            if hit {
                return StrategyOutcome::Resolved(candidate);
            }
        }

        if self.fallback {
            warn!(
                path = configured,
                "configured engine path not found under any workspace root, falling back"
            );
            StrategyOutcome::Skip
        } else {
            StrategyOutcome::Halt(LocateError::ConfiguredPathMissing {
                path: configured.to_string(),
            })
        }
    }
}

/// Engine artifact installed in the workspace's own dependency tree,
/// looked up through the host's module resolution port.
pub(super) struct WorkspaceDependency<'a> {
    pub resolver: &'a dyn DependencyResolver,
    pub target: &'static TargetDescriptor,
}

#[async_trait]
impl LocateStrategy for WorkspaceDependency<'_> {
    fn name(&self) -> &'static str {
        "dependency"
    }

    async fn evaluate(
        &self,
        cx: &ResolutionContext,
        attempts: &mut Vec<Attempt>,
    ) -> StrategyOutcome {
        for root in &cx.workspace_roots {
            match self.resolver.resolve(self.target.package, root).await {
                Ok(resolved) => {
                    attempts.push(Attempt {
                        strategy: self.name(),
                        candidate: resolved.clone(),
                        outcome: AttemptOutcome::Ok,
                    });
                    return StrategyOutcome::Resolved(resolved);
                }
                Err(e) => {
                    attempts.push(Attempt {
                        strategy: self.name(),
                        candidate: root.clone(),
                        outcome: AttemptOutcome::NotResolved(e.to_string()),
                    });
                }
            }
        }

        StrategyOutcome::Skip
    }
}

/// Binary shipped inside the host-provided bundle. Last resort for
/// trusted workspaces, the only permitted source for untrusted ones.
pub(super) struct BundledBinary<'a> {
    pub fs: &'a dyn FsProvider,
    pub target: &'static TargetDescriptor,
}

#[async_trait]
impl LocateStrategy for BundledBinary<'_> {
    fn name(&self) -> &'static str {
        "bundled"
    }

    async fn evaluate(
        &self,
        cx: &ResolutionContext,
        attempts: &mut Vec<Attempt>,
    ) -> StrategyOutcome {
        let candidate = cx
            .bundle_root
            .join(BUNDLE_SERVER_DIR)
            .join(self.target.server_binary_name());

        let outcome = self.fs.probe(&candidate);
        let hit = outcome == AttemptOutcome::Ok;
        attempts.push(Attempt {
            strategy: self.name(),
            candidate: candidate.clone(),
            outcome,
        });

        if hit {
            StrategyOutcome::Resolved(candidate)
        } else {
            StrategyOutcome::Skip
        }
    }
}
