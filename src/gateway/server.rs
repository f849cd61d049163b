// RKSOK — TCP Gateway Server
//
// Listens for RKSOK clients. Each connection is handled in a spawned tokio
// task that carries exactly one request/response exchange:
// read frame → parse → ask the authority → dispatch → respond → close.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::store::PhonebookStore;

use super::authority::AuthorityClient;
use super::dispatch::Dispatcher;
use super::frame::read_frame;
use super::protocol::{parse_request, Response};
use super::GatewayError;

/// Per-connection request handling, shared by every connection task.
pub struct Gateway {
    frame_timeout: Duration,
    authority: AuthorityClient,
    dispatcher: Dispatcher,
}

impl Gateway {
    pub fn new(
        frame_timeout: Duration,
        authority: AuthorityClient,
        store: Arc<dyn PhonebookStore>,
    ) -> Self {
        Self {
            frame_timeout,
            authority,
            dispatcher: Dispatcher::new(store),
        }
    }

    pub fn from_config(config: &GatewayConfig, store: Arc<dyn PhonebookStore>) -> Self {
        let authority = AuthorityClient::new(config.authority.clone(), config.authority_timeout());
        Self::new(config.frame_timeout(), authority, store)
    }

    /// Serve one exchange on `stream`: exactly one response is written, then
    /// the write half is shut down. Returns what was sent.
    pub async fn handle_connection<S>(&self, mut stream: S) -> std::io::Result<Response>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let response = match read_frame(&mut stream, self.frame_timeout).await {
            Ok(raw) => self.respond(&raw).await,
            Err(e) => {
                tracing::info!(error = %e, "Rejecting connection without a complete frame");
                Response::from(e.status())
            }
        };

        stream.write_all(response.encode().as_bytes()).await?;
        stream.flush().await?;
        stream.shutdown().await?;

        Ok(response)
    }

    /// Turn a complete frame into the response for the client. Never fails:
    /// every error is mapped to its wire status.
    pub async fn respond(&self, raw: &[u8]) -> Response {
        match self.process(raw).await {
            Ok(response) => {
                tracing::info!(status = ?response.status(), "Request handled");
                response
            }
            Err(e) => {
                tracing::info!(error = %e, "Request rejected");
                Response::from(e.status())
            }
        }
    }

    async fn process(&self, raw: &[u8]) -> Result<Response, GatewayError> {
        let frame = std::str::from_utf8(raw)
            .map_err(|_| GatewayError::MalformedRequest("frame is not valid UTF-8".to_string()))?;
        tracing::debug!(frame, "Received frame");

        let message = parse_request(frame)?;
        tracing::info!(verb = %message.verb(), name = message.name(), "Request parsed");

        let outcome = self.authority.check(frame).await?;
        if !outcome.approved {
            tracing::info!("Request denied by authority");
            return Ok(Response::Verbatim(outcome.response));
        }

        self.dispatcher.dispatch(message).await
    }
}

/// TCP listener front-end for a [`Gateway`].
pub struct GatewayServer {
    listen: String,
    gateway: Arc<Gateway>,
}

impl GatewayServer {
    pub fn new(listen: impl Into<String>, gateway: Gateway) -> Self {
        Self {
            listen: listen.into(),
            gateway: Arc::new(gateway),
        }
    }

    /// Bind the listen address and serve until the process is terminated.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.listen).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(
            addr = %listener.local_addr()?,
            authority = %self.gateway.authority.addr(),
            "RKSOK gateway listening"
        );

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    continue;
                }
            };
            let gateway = Arc::clone(&self.gateway);
            let span = tracing::info_span!("connection", request_id = %Uuid::new_v4(), %peer);

            tokio::spawn(
                async move {
                    if let Err(e) = gateway.handle_connection(stream).await {
                        tracing::error!("Connection handler error: {}", e);
                    }
                }
                .instrument(span),
            );
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
