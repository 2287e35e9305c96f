//! Daemon Server Implementation
//!
//! Binds the prepared socket and holds it for local clients:
//! - Runs the sockprep bootstrap (umask, stale socket cleanup, bind)
//! - Accepts connections and tracks them until the peer hangs up
//! - Stops accepting on shutdown and releases the socket path

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use dashmap::DashMap;
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn, Instrument};

use sockprep_core::{Bootstrap, SocketOptions};

/// Pause after a failed accept so persistent errors (EMFILE) don't spin
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Connection state tracking
struct ConnectionState {
    /// When the connection was established
    connected_at: Instant,
    /// Remote peer UID
    peer_uid: Option<u32>,
}

/// The main daemon server
pub struct DaemonServer {
    /// Startup sequence for the socket path
    bootstrap: Bootstrap,
    /// Active connections by id
    connections: Arc<DashMap<u64, ConnectionState>>,
    /// Next connection id
    next_id: AtomicU64,
}

impl DaemonServer {
    /// Create a new daemon server
    pub fn new(options: SocketOptions) -> Self {
        Self {
            bootstrap: Bootstrap::new(options),
            connections: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of currently connected peers
    pub fn active_connections(&self) -> usize {
        self.connections.len()
    }

    /// Prepare the socket path and bind the listener
    pub fn bind(&self) -> Result<UnixListener> {
        let bound = self
            .bootstrap
            .bind()
            .context("Failed to prepare socket")?;

        if let Some(previous) = bound.previous_mask {
            info!(
                previous_umask = %previous,
                restored = self.bootstrap.options().restore_umask,
                "Socket created under configured umask"
            );
        }

        bound
            .listener
            .set_nonblocking(true)
            .context("Failed to make listener non-blocking")?;
        UnixListener::from_std(bound.listener).context("Failed to register listener with runtime")
    }

    /// Bind, serve until `shutdown` resolves, then release the socket path
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = self.bind()?;
        info!(path = ?self.bootstrap.options().path, "Listening for connections");

        self.serve(listener, shutdown).await;

        self.bootstrap.release();
        Ok(())
    }

    /// Accept connections on `listener` until `shutdown` resolves
    pub async fn serve<F>(&self, listener: UnixListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, _addr)) => self.spawn_connection(stream),
                    Err(e) => accept_failed(&e).await,
                }
            }
        }

        info!(active = self.connections.len(), "Accept loop stopped");
    }

    fn spawn_connection(&self, mut stream: UnixStream) {
        let conn_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let peer_uid = stream.peer_cred().ok().map(|cred| cred.uid());

        self.connections.insert(
            conn_id,
            ConnectionState {
                connected_at: Instant::now(),
                peer_uid,
            },
        );
        info!(conn_id, peer_uid = ?peer_uid, "Peer connected");

        let connections = Arc::clone(&self.connections);
        let span = tracing::info_span!("connection", conn_id);
        tokio::spawn(
            async move {
                let mut buf = [0u8; 4096];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) => break,
                        Ok(n) => debug!(bytes = n, "Discarding inbound data"),
                        Err(e) => {
                            warn!(error = %e, "Read error");
                            break;
                        }
                    }
                }

                if let Some((_, state)) = connections.remove(&conn_id) {
                    info!(
                        peer_uid = ?state.peer_uid,
                        duration_ms = state.connected_at.elapsed().as_millis(),
                        "Peer disconnected"
                    );
                }
            }
            .instrument(span),
        );
    }
}

async fn accept_failed(e: &std::io::Error) {
    error!(error = %e, backoff_ms = ACCEPT_ERROR_BACKOFF.as_millis(), "Accept failed");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}
