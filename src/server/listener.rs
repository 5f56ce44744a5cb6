use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

use crate::context::ServeContext;
use crate::http::connection::Connection;

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Bound TLS listener. Each accepted connection gets its own task.
pub struct Listener {
    tcp: TcpListener,
    acceptor: TlsAcceptor,
    ctx: Arc<ServeContext>,
    accepted: Arc<AtomicU64>,
}

impl Listener {
    /// Binds `addr`. Failure here is fatal for the server.
    pub async fn bind(addr: SocketAddr, acceptor: TlsAcceptor, ctx: Arc<ServeContext>) -> anyhow::Result<Self> {
        let tcp = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        info!("Listening on {}", tcp.local_addr()?);

        Ok(Self {
            tcp,
            acceptor,
            ctx,
            accepted: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tcp.local_addr()
    }

    /// Shared count of accepted connections.
    pub fn accepted(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.accepted)
    }

    /// Accept loop. Never returns under normal operation.
    ///
    /// The TLS handshake and all request work run inside the spawned task,
    /// so the loop only ever waits on `accept`.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = match self.tcp.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };
            let count = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(peer = %peer, count, "Accepted connection");

            let acceptor = self.acceptor.clone();
            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                let stream = match acceptor.accept(socket).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!("TLS handshake with {} failed: {}", peer, e);
                        return;
                    }
                };

                let conn = Connection::new(stream, peer, ctx);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {:#}", peer, e);
                }
            });
        }
    }
}
