//! Port definitions for external collaborators.
//!
//! The engine artifact is distributed as a platform-specific package in
//! the host ecosystem's dependency tree; looking it up requires the
//! host's module resolution machinery, which this crate only models as a
//! trait.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error from a dependency resolution attempt.
#[derive(Debug, Error)]
pub enum DependencyResolveError {
    #[error("package '{package}' not found from {base_dir}")]
    NotFound { package: String, base_dir: PathBuf },

    #[error("dependency resolution failed: {0}")]
    Failed(String),
}

/// Node-style module resolution for engine artifact packages.
///
/// Implemented by the host integration. Given a package specifier and a
/// base directory, returns the resolved file path inside the installed
/// package. This port is never reimplemented here; resolution semantics
/// belong entirely to the host.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    async fn resolve(
        &self,
        package: &str,
        base_dir: &Path,
    ) -> Result<PathBuf, DependencyResolveError>;
}

/// Resolver that never finds anything.
///
/// Default when the host provides no resolution machinery; the locator
/// then skips straight past the dependency strategy.
pub struct NoopDependencyResolver;

#[async_trait]
impl DependencyResolver for NoopDependencyResolver {
    async fn resolve(
        &self,
        package: &str,
        base_dir: &Path,
    ) -> Result<PathBuf, DependencyResolveError> {
        Err(DependencyResolveError::NotFound {
            package: package.to_string(),
            base_dir: base_dir.to_path_buf(),
        })
    }
}
