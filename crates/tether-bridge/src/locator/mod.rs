//! Engine binary location.
//!
//! Resolves the engine binary for one activation through an ordered
//! strategy chain: debug override, configured path, workspace dependency,
//! bundled fallback. Exactly one strategy determines the final path; the
//! first success wins and all later strategies are skipped. Untrusted
//! workspaces run a bundle-only chain.
//!
//! The module is split into small, focused pieces:
//! - `types`: attempt diagnostics and `LocateError`
//! - `fs`: filesystem probing trait (injectable for testing)
//! - `strategy`: the individual strategies and their outcomes

mod fs;
mod strategy;
mod types;

pub use fs::{FsProvider, SystemFs};
pub use strategy::{DEBUG_SERVER_PATH_VAR, LocateStrategy, StrategyOutcome};
pub use types::{Attempt, AttemptOutcome, LocateError};

use crate::platform;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use strategy::{BundledBinary, ConfiguredPath, DebugOverride, WorkspaceDependency};
use tether_core::{DependencyResolver, ResolutionContext};
use tracing::debug;

/// Environment lookup used by the debug-override strategy; injectable
/// for testing.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<OsString> + Send + Sync>;

/// Locates the engine binary for an activation context.
pub struct BinaryLocator {
    resolver: Arc<dyn DependencyResolver>,
    env: EnvLookup,
    fs: Box<dyn FsProvider>,
    configured_path_fallback: bool,
    os: String,
    arch: String,
}

impl BinaryLocator {
    /// Locator for the host platform, backed by the real environment and
    /// filesystem.
    pub fn new(resolver: Arc<dyn DependencyResolver>, configured_path_fallback: bool) -> Self {
        Self::with_deps(
            resolver,
            configured_path_fallback,
            Box::new(|key: &str| std::env::var_os(key)),
            Box::new(SystemFs),
            std::env::consts::OS,
            std::env::consts::ARCH,
        )
    }

    /// Locator with injected providers and platform (for testing).
    pub fn with_deps(
        resolver: Arc<dyn DependencyResolver>,
        configured_path_fallback: bool,
        env: EnvLookup,
        fs: Box<dyn FsProvider>,
        os: &str,
        arch: &str,
    ) -> Self {
        Self {
            resolver,
            env,
            fs,
            configured_path_fallback,
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Resolve the engine binary path for `cx`.
    ///
    /// Strategies run in fixed priority order with short-circuit on first
    /// success; a strategy may also halt the chain outright (strict
    /// configured-path behavior).
    pub async fn locate(&self, cx: &ResolutionContext) -> Result<PathBuf, LocateError> {
        let Some(target) = platform::resolve_target(&self.os, &self.arch) else {
            return Err(LocateError::UnsupportedPlatform {
                os: self.os.clone(),
                arch: self.arch.clone(),
            });
        };

        // Untrusted workspaces only ever run the bundled binary. The
        // trust gate is enforced by chain construction so no later step
        // can reintroduce a configured or resolved path.
        let chain: Vec<Box<dyn LocateStrategy + '_>> = if cx.trust.is_trusted() {
            vec![
                Box::new(DebugOverride {
                    env: self.env.as_ref(),
                }),
                Box::new(ConfiguredPath {
                    fs: self.fs.as_ref(),
                    fallback: self.configured_path_fallback,
                }),
                Box::new(WorkspaceDependency {
                    resolver: self.resolver.as_ref(),
                    target,
                }),
                Box::new(BundledBinary {
                    fs: self.fs.as_ref(),
                    target,
                }),
            ]
        } else {
            vec![Box::new(BundledBinary {
                fs: self.fs.as_ref(),
                target,
            })]
        };

        let mut attempts = Vec::new();
        for step in &chain {
            match step.evaluate(cx, &mut attempts).await {
                StrategyOutcome::Resolved(path) => {
                    debug!(
                        strategy = step.name(),
                        path = %path.display(),
                        "engine binary located"
                    );
                    return Ok(path);
                }
                StrategyOutcome::Skip => {}
                StrategyOutcome::Halt(err) => return Err(err),
            }
        }

        Err(LocateError::not_found(&attempts))
    }
}
