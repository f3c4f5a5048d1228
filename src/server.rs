use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::handler::RoundHandler;
use crate::rng::{DrawSource, ThreadRngDraw};

/// Prefix of the reply sent when a round is rejected.
pub const ERROR_PREFIX: &str = "error: ";

/// WebSocket front end: one task per connection, one round per text frame.
pub struct Server<D = ThreadRngDraw> {
    listener: TcpListener,
    path: Arc<str>,
    handler: Arc<RoundHandler<D>>,
}

impl<D: DrawSource + 'static> Server<D> {
    /// Bind the listener. Port 0 picks an ephemeral port; see `local_addr`.
    pub async fn bind(config: &ServerConfig, handler: RoundHandler<D>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind)
            .await
            .with_context(|| format!("failed to bind {}", config.bind))?;
        Ok(Self {
            listener,
            path: Arc::from(config.path.as_str()),
            handler: Arc::new(handler),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already open keep running on their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let addr = self.local_addr()?;
        info!("Listening on ws://{addr}{}", self.path);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Accept failed: {e}");
                            continue;
                        }
                    };
                    let path = Arc::clone(&self.path);
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, peer, path, handler).await {
                            warn!("Connection {peer} closed with error: {e:#}");
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

fn not_found() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("not found".to_string()));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

async fn serve_connection<D: DrawSource>(
    stream: TcpStream,
    peer: SocketAddr,
    path: Arc<str>,
    handler: Arc<RoundHandler<D>>,
) -> Result<()> {
    let ws = accept_hdr_async(stream, move |req: &Request, resp: Response| {
        if req.uri().path() == &*path {
            Ok(resp)
        } else {
            debug!("Refusing {peer}: unknown path {}", req.uri().path());
            Err(not_found())
        }
    })
    .await
    .context("WebSocket handshake failed")?;
    info!("Player connected: {peer}");

    let (mut write, mut read) = ws.split();

    while let Some(msg) = read.next().await {
        let reply = match msg.context("failed to read frame")? {
            Message::Text(text) => match handler.handle(text.as_str()) {
                Ok(payout) => {
                    debug!("{peer} {} -> {payout}", text.as_str());
                    payout
                }
                Err(e) => {
                    warn!("Rejected round from {peer}: {e}");
                    format!("{ERROR_PREFIX}{e}")
                }
            },
            Message::Binary(_) => {
                warn!("Rejected binary frame from {peer}");
                format!("{ERROR_PREFIX}expected a text frame")
            }
            Message::Close(_) => break,
            // Ping/pong are answered by the protocol layer.
            _ => continue,
        };

        write
            .send(Message::Text(reply.into()))
            .await
            .context("failed to send reply")?;
    }

    info!("Player disconnected: {peer}");
    Ok(())
}
