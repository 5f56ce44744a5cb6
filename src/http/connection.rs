use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::context::ServeContext;
use crate::files::resolver::ResourceHandler;
use crate::http::request::{RequestLine, Route};
use crate::http::scanner::scan_request_line;

/// One client connection, from first byte to close.
///
/// The connection owns its stream; it is shut down when [`Connection::run`]
/// returns and dropped with the connection on every other path.
pub struct Connection<S> {
    stream: S,
    peer: SocketAddr,
    buffer: BytesMut,
    ctx: Arc<ServeContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Scanning,
    Routing(RequestLine),
    Serving { request: RequestLine, identifier: String },
    Rejecting(RequestLine),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, ctx: Arc<ServeContext>) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(1024),
            ctx,
            state: ConnectionState::Scanning,
        }
    }

    /// Handles the single request on this connection, then closes it.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive().await;

        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "Shutdown after response failed");
        }

        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Scanning => {
                    match scan_request_line(&mut self.stream, &mut self.buffer).await {
                        Ok(request) => {
                            self.state = ConnectionState::Routing(request);
                        }
                        Err(e) => {
                            // Malformed request: no response, no access-log entry.
                            warn!(peer = %self.peer, reason = %e, "Dropping malformed request");
                        }
                    }
                }

                ConnectionState::Routing(request) => {
                    self.state = match request.route(&self.ctx.settings.default_resource) {
                        Route::Serve(identifier) => ConnectionState::Serving { request, identifier },
                        Route::NotFound => ConnectionState::Rejecting(request),
                    };
                }

                ConnectionState::Serving { request, identifier } => {
                    let status = ResourceHandler::new(&self.ctx)
                        .serve(&mut self.stream, self.peer.ip(), request.raw(), &identifier)
                        .await?;
                    debug!(peer = %self.peer, identifier = %identifier, status = status.as_u16(), "Served");
                }

                ConnectionState::Rejecting(request) => {
                    self.ctx
                        .errors
                        .not_found(&mut self.stream, self.peer.ip(), request.raw())
                        .await?;
                    debug!(peer = %self.peer, request = request.raw(), "Rejected identifier");
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }
}
