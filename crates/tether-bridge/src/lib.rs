//! Editor-side launcher and IPC bridge for the Tether analysis engine.
//!
//! Given an activation context from the host integration, this crate
//! locates the engine binary through an ordered strategy chain, runs the
//! one-shot `__print_socket` handshake against it, and connects to the
//! advertised IPC endpoint, yielding a duplex [`transport::Transport`]
//! for the protocol client. Resolution honors the workspace trust
//! boundary: untrusted workspaces only ever execute the bundled binary.

pub mod handshake;
pub mod locator;
pub mod platform;
pub mod session;
pub mod transport;

// Re-export the session-level surface for convenience
pub use handshake::{HandshakeClient, HandshakeError, PRINT_SOCKET_ARG};
pub use locator::{
    Attempt, AttemptOutcome, BinaryLocator, DEBUG_SERVER_PATH_VAR, LocateError,
};
pub use platform::{TargetDescriptor, resolve_target};
pub use session::{EngineSession, SessionError};
pub use transport::{ConnectError, Transport, TransportFactory};
