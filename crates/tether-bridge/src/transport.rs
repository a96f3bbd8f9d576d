//! IPC transport to a running engine process.
//!
//! Connects to the platform endpoint the engine advertised during the
//! handshake: a Unix domain socket on Unix, a named pipe on Windows. The
//! resulting [`Transport`] is handed whole to the protocol client; this
//! module never looks at message content.

use std::time::Duration;
use tether_core::SocketAddress;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::debug;

/// Errors from opening the engine transport. Terminal for the current
/// connection attempt only.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The connection failed before becoming ready.
    #[error("failed to connect to engine socket: {0}")]
    Connect(#[from] std::io::Error),

    /// The endpoint did not become ready within the configured bound.
    #[error("engine socket was not ready within {timeout:?}")]
    TimedOut { timeout: Duration },
}

/// Boxed read half of the engine channel.
pub type TransportReader = Box<dyn AsyncRead + Unpin + Send>;

/// Boxed write half of the engine channel.
pub type TransportWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Duplex byte stream to the engine.
///
/// Exposes independent read and write halves over the same underlying
/// channel. Dropping both halves closes the connection; after the
/// factory returns, the transport is the protocol client's sole
/// responsibility.
pub struct Transport {
    reader: TransportReader,
    writer: TransportWriter,
}

impl Transport {
    fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }

    /// Consume the transport, yielding its read and write halves.
    #[must_use]
    pub fn into_split(self) -> (TransportReader, TransportWriter) {
        (self.reader, self.writer)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

/// Connects to the platform IPC endpoint named by a socket address.
pub struct TransportFactory {
    timeout: Duration,
}

impl TransportFactory {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Open a client connection and return it once ready.
    ///
    /// Connection completion is the readiness signal. An error or
    /// timeout before readiness drops the half-open connection; nothing
    /// is left for the caller to clean up.
    pub async fn connect(&self, address: &SocketAddress) -> Result<Transport, ConnectError> {
        match timeout(self.timeout, Self::open(address)).await {
            Ok(Ok(transport)) => {
                debug!(address = %address, "engine transport ready");
                Ok(transport)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ConnectError::TimedOut {
                timeout: self.timeout,
            }),
        }
    }

    #[cfg(unix)]
    async fn open(address: &SocketAddress) -> Result<Transport, ConnectError> {
        let stream = tokio::net::UnixStream::connect(address.as_str()).await?;
        Ok(Transport::new(stream))
    }

    #[cfg(windows)]
    async fn open(address: &SocketAddress) -> Result<Transport, ConnectError> {
        use tokio::net::windows::named_pipe::ClientOptions;

        // All pipe server instances being busy is transient; back off
        // briefly and retry until the outer timeout expires.
        const ERROR_PIPE_BUSY: i32 = 231;

        loop {
            match ClientOptions::new().open(address.as_str()) {
                Ok(pipe) => return Ok(Transport::new(pipe)),
                Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY) => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Err(e) => return Err(ConnectError::Connect(e)),
            }
        }
    }
}
