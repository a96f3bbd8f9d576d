//! Engine session lifecycle owned by the host integration.
//!
//! One session exists per host activation. Starting it runs the full
//! discovery pipeline (locate the binary, handshake for the socket
//! address, connect) strictly in sequence and hands the resulting
//! transport to the caller; stopping it resets the session so an
//! externally triggered restart begins from a clean slate.

use crate::handshake::{HandshakeClient, HandshakeError};
use crate::locator::{BinaryLocator, LocateError};
use crate::transport::{ConnectError, Transport, TransportFactory};
use std::sync::Arc;
use tether_core::{DependencyResolver, ResolutionContext, Settings};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from starting an engine session.
///
/// `Locate` failures are terminal for the whole session: the host should
/// surface them once and disable itself. `Handshake` and `Connect`
/// failures are terminal for the attempt only; the session stays stopped
/// and a later `start` runs the pipeline again from scratch.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a session pipeline is already running")]
    AlreadyStarted,

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// One engine session per host activation.
pub struct EngineSession {
    settings: Settings,
    context: ResolutionContext,
    locator: BinaryLocator,
    started: bool,
}

impl EngineSession {
    /// Create a stopped session.
    ///
    /// The host assembles the [`ResolutionContext`] from its own state
    /// (trust flag, workspace roots, bundle location) and the settings'
    /// configured server path.
    pub fn new(
        settings: Settings,
        context: ResolutionContext,
        resolver: Arc<dyn DependencyResolver>,
    ) -> Self {
        let locator =
            BinaryLocator::new(resolver, settings.effective_configured_path_fallback());
        Self {
            settings,
            context,
            locator,
            started: false,
        }
    }

    /// Run the discovery pipeline and connect to the engine.
    ///
    /// Stages run strictly in sequence and never overlap; a failure at
    /// any stage aborts the attempt, releases everything opened so far,
    /// and leaves the session stopped.
    pub async fn start(&mut self) -> Result<Transport, SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }

        let binary = self.locator.locate(&self.context).await?;
        info!(binary = %binary.display(), "engine binary located");

        let handshake = HandshakeClient::new(self.settings.effective_handshake_timeout());
        let address = handshake.discover_socket(&binary).await?;

        let factory = TransportFactory::new(self.settings.effective_connect_timeout());
        let transport = factory.connect(&address).await?;

        self.started = true;
        info!(address = %address, "engine session started");
        Ok(transport)
    }

    /// Mark the session stopped so a later `start` runs the pipeline
    /// again.
    ///
    /// The transport itself is owned by the protocol client; dropping it
    /// closes the channel.
    pub fn stop(&mut self) {
        if self.started {
            debug!("engine session stopped");
        }
        self.started = false;
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }
}
