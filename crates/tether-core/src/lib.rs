//! Core domain types and port definitions for tether.
//!
//! This crate holds the pure data model shared by the engine bridge and
//! the host integration: trust levels, resolution inputs, settings, and
//! the traits external collaborators implement. It deliberately has no
//! process, filesystem, or network code.

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{ResolutionContext, SocketAddress, Trust};
pub use ports::{DependencyResolveError, DependencyResolver, NoopDependencyResolver};
pub use settings::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HANDSHAKE_TIMEOUT_MS, Settings, SettingsError,
    SettingsUpdate, validate_settings,
};
