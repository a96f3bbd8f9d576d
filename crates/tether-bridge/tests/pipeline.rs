//! End-to-end pipeline tests: locate, handshake, connect.
//!
//! Each test stands up a fake engine as a shell script that honors the
//! `__print_socket` contract, plus (where relevant) a Unix socket
//! listener standing in for the engine's IPC endpoint.

#![cfg(unix)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tether_bridge::PRINT_SOCKET_ARG;
use tether_bridge::handshake::HandshakeError;
use tether_bridge::session::{EngineSession, SessionError};
use tether_core::{
    DependencyResolveError, DependencyResolver, NoopDependencyResolver, ResolutionContext,
    Settings, Trust,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write a fake engine binary that prints `socket` for the handshake
/// argument and fails loudly for anything else.
fn write_engine(path: &Path, socket: &Path) -> Result<()> {
    let body = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"{PRINT_SOCKET_ARG}\" ]; then\n\
         \x20 printf '%s\\n' '{}'\n\
         \x20 exit 0\n\
         fi\n\
         exit 9\n",
        socket.display()
    );
    std::fs::write(path, body)?;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

/// Write a fake engine that exits with `code` instead of handshaking.
fn write_broken_engine(path: &Path, code: i32) -> Result<()> {
    std::fs::write(path, format!("#!/bin/sh\nexit {code}\n"))?;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

/// Resolver with canned results keyed by base directory.
#[derive(Default)]
struct StaticResolver {
    by_base: HashMap<PathBuf, PathBuf>,
}

#[async_trait]
impl DependencyResolver for StaticResolver {
    async fn resolve(
        &self,
        package: &str,
        base_dir: &Path,
    ) -> Result<PathBuf, DependencyResolveError> {
        self.by_base
            .get(base_dir)
            .cloned()
            .ok_or_else(|| DependencyResolveError::NotFound {
                package: package.to_string(),
                base_dir: base_dir.to_path_buf(),
            })
    }
}

/// Accept one connection and echo a fixed exchange through it.
fn spawn_echo_server(listener: UnixListener) -> tokio::task::JoinHandle<Vec<u8>> {
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).await.unwrap();
        stream.write_all(b"ready").await.unwrap();
        buf.to_vec()
    })
}

#[tokio::test]
async fn dependency_resolved_engine_yields_ready_transport() -> Result<()> {
    init_tracing();

    let workspace = tempfile::tempdir()?;
    let bundle = tempfile::tempdir()?;
    let socket = workspace.path().join("engine.sock");
    let engine = workspace.path().join("tether");
    write_engine(&engine, &socket)?;

    let listener = UnixListener::bind(&socket)?;
    let server = spawn_echo_server(listener);

    let resolver = StaticResolver {
        by_base: HashMap::from([(workspace.path().to_path_buf(), engine)]),
    };
    let context = ResolutionContext::new(Trust::Trusted, bundle.path())
        .with_workspace_roots(vec![workspace.path().to_path_buf()]);

    let mut session = EngineSession::new(Settings::with_defaults(), context, Arc::new(resolver));
    let transport = session.start().await?;
    assert!(session.is_started());

    // The transport must be usable both ways by the protocol client.
    let (mut reader, mut writer) = transport.into_split();
    writer.write_all(b"hello").await?;
    writer.flush().await?;
    let mut reply = [0u8; 5];
    reader.read_exact(&mut reply).await?;
    assert_eq!(&reply, b"ready");
    assert_eq!(server.await?, b"hello");

    // Only one pipeline per session until the host stops it.
    assert!(matches!(
        session.start().await,
        Err(SessionError::AlreadyStarted)
    ));

    Ok(())
}

#[tokio::test]
async fn untrusted_workspace_runs_only_the_bundled_engine() -> Result<()> {
    init_tracing();

    let workspace = tempfile::tempdir()?;
    let bundle = tempfile::tempdir()?;

    // A workspace-local engine exists and would resolve, but untrusted
    // activation must ignore it in favor of the bundle.
    let decoy_socket = workspace.path().join("decoy.sock");
    let decoy = workspace.path().join("tether");
    write_engine(&decoy, &decoy_socket)?;

    let bundle_socket = bundle.path().join("bundled.sock");
    let server_dir = bundle.path().join("server");
    std::fs::create_dir_all(&server_dir)?;
    write_engine(&server_dir.join("tether"), &bundle_socket)?;

    let listener = UnixListener::bind(&bundle_socket)?;
    let server = spawn_echo_server(listener);

    let resolver = StaticResolver {
        by_base: HashMap::from([(workspace.path().to_path_buf(), decoy)]),
    };
    let context = ResolutionContext::new(Trust::Untrusted, bundle.path())
        .with_configured_path("tether")
        .with_workspace_roots(vec![workspace.path().to_path_buf()]);

    let mut session = EngineSession::new(Settings::with_defaults(), context, Arc::new(resolver));
    let transport = session.start().await?;

    // Connecting on the bundled engine's socket proves which binary ran.
    let (mut reader, mut writer) = transport.into_split();
    writer.write_all(b"guard").await?;
    writer.flush().await?;
    let mut reply = [0u8; 5];
    reader.read_exact(&mut reply).await?;
    assert_eq!(&reply, b"ready");
    assert_eq!(server.await?, b"guard");

    Ok(())
}

#[tokio::test]
async fn handshake_failure_aborts_the_pipeline() -> Result<()> {
    init_tracing();

    let workspace = tempfile::tempdir()?;
    let bundle = tempfile::tempdir()?;
    let engine = workspace.path().join("tether");
    write_broken_engine(&engine, 2)?;

    let context = ResolutionContext::new(Trust::Trusted, bundle.path())
        .with_configured_path(engine.display().to_string())
        .with_workspace_roots(vec![workspace.path().to_path_buf()]);

    let mut session = EngineSession::new(
        Settings::with_defaults(),
        context,
        Arc::new(NoopDependencyResolver),
    );

    let err = session.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Handshake(HandshakeError::ExitCode { code: 2 })
    ));
    assert!(!session.is_started());

    Ok(())
}

#[tokio::test]
async fn connect_failure_leaves_the_session_restartable() -> Result<()> {
    init_tracing();

    let workspace = tempfile::tempdir()?;
    let bundle = tempfile::tempdir()?;
    let socket = workspace.path().join("engine.sock");
    let engine = workspace.path().join("tether");
    write_engine(&engine, &socket)?;

    let context = ResolutionContext::new(Trust::Trusted, bundle.path())
        .with_configured_path(engine.display().to_string())
        .with_workspace_roots(vec![workspace.path().to_path_buf()]);

    let mut session = EngineSession::new(
        Settings::with_defaults(),
        context,
        Arc::new(NoopDependencyResolver),
    );

    // Handshake succeeds but nothing is listening yet.
    let err = session.start().await.unwrap_err();
    assert!(matches!(err, SessionError::Connect(_)));
    assert!(!session.is_started());

    // Once the endpoint exists, the same session starts clean.
    let listener = UnixListener::bind(&socket)?;
    let server = spawn_echo_server(listener);

    let transport = session.start().await?;
    let (mut reader, mut writer) = transport.into_split();
    writer.write_all(b"again").await?;
    writer.flush().await?;
    let mut reply = [0u8; 5];
    reader.read_exact(&mut reply).await?;
    assert_eq!(&reply, b"ready");
    assert_eq!(server.await?, b"again");

    // Stopping allows a later full re-run.
    session.stop();
    assert!(!session.is_started());

    Ok(())
}
