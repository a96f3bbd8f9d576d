//! One-shot subprocess handshake for IPC address discovery.
//!
//! The engine prints its IPC endpoint address on stdout when started with
//! a single diagnostic argument, then exits. This module runs that
//! protocol once per call: spawn, read everything, wait for exit. The
//! child never receives input and the call does not resolve before the
//! process is gone.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tether_core::SocketAddress;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Argument understood by the engine binary: print the IPC endpoint
/// address on stdout and exit.
pub const PRINT_SOCKET_ARG: &str = "__print_socket";

/// Errors from the socket-discovery handshake. All of them are terminal
/// for the current connection attempt only; a fresh pipeline run starts
/// clean.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The process could not be started at all.
    #[error("failed to start engine binary: {0}")]
    Spawn(#[source] std::io::Error),

    /// The engine exited with a nonzero status.
    #[error("engine exited with status {code} during socket discovery")]
    ExitCode { code: i32 },

    /// The engine was terminated by a signal before reporting an address.
    #[error("engine terminated by signal during socket discovery")]
    Terminated,

    /// The engine exited cleanly but printed nothing usable.
    #[error("engine exited without printing a socket address")]
    EmptyResponse,

    /// The engine did not exit within the configured bound.
    #[error("engine did not complete socket discovery within {timeout:?}")]
    TimedOut { timeout: Duration },

    /// Reading the engine's output failed.
    #[error("failed to read engine output: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes the one-shot discovery protocol against a located engine
/// binary.
pub struct HandshakeClient {
    timeout: Duration,
}

impl HandshakeClient {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Spawn the binary and read its IPC endpoint address from stdout.
    ///
    /// Resolves only once the process has exited. On exit 0 the address
    /// is the accumulated stdout with trailing whitespace stripped. The
    /// child is killed if it outlives the configured timeout, so no
    /// subprocess survives a failed handshake.
    pub async fn discover_socket(&self, binary: &Path) -> Result<SocketAddress, HandshakeError> {
        let mut command = Command::new(binary);
        command
            .arg(PRINT_SOCKET_ARG)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(HandshakeError::Spawn)?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            // Dropping the wait future drops the child handle, which
            // kills the process (kill_on_drop).
            Err(_) => {
                return Err(HandshakeError::TimedOut {
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(match output.status.code() {
                Some(code) => HandshakeError::ExitCode { code },
                None => HandshakeError::Terminated,
            });
        }

        let address = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();
        if address.is_empty() {
            return Err(HandshakeError::EmptyResponse);
        }

        debug!(address = %address, "engine socket discovered");
        Ok(SocketAddress::new(address))
    }
}
