// RKSOK — Approval Authority Client
//
// Every request is forwarded to the external regulatory authority before the
// phonebook is touched. The authority's reply is opaque to the gateway apart
// from one check: whether it starts with the approval word and a space.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::protocol::{APPROVAL_QUERY, APPROVED, CRLF, PROTOCOL, TERMINATOR};
use super::GatewayError;

/// Upper bound on the authority reply.
pub const MAX_REPLY_LEN: usize = 1024;

/// The authority's verdict on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub approved: bool,
    /// Raw reply, returned to the client as-is when not approved.
    pub response: String,
}

impl ApprovalOutcome {
    pub fn from_response(response: String) -> Self {
        let approved = response.starts_with(&format!("{} ", APPROVED));
        Self { approved, response }
    }
}

/// Client for the regulatory authority endpoint.
#[derive(Debug, Clone)]
pub struct AuthorityClient {
    addr: String,
    timeout: Duration,
}

impl AuthorityClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Ask the authority about `frame`. One connection per call, no retries.
    pub async fn check(&self, frame: &str) -> Result<ApprovalOutcome, GatewayError> {
        tracing::debug!(authority = %self.addr, "Requesting approval");

        let response = tokio::time::timeout(self.timeout, self.exchange(frame))
            .await
            .map_err(|_| {
                GatewayError::AuthorityUnreachable(format!(
                    "no reply from {} within {:?}",
                    self.addr, self.timeout
                ))
            })??;

        let outcome = ApprovalOutcome::from_response(response);
        tracing::debug!(approved = outcome.approved, "Authority replied");
        Ok(outcome)
    }

    async fn exchange(&self, frame: &str) -> Result<String, GatewayError> {
        let io_err =
            |e: std::io::Error| GatewayError::AuthorityUnreachable(format!("{}: {}", self.addr, e));

        let mut stream = TcpStream::connect(&self.addr).await.map_err(io_err)?;

        let request = format!("{} {}{}{}", APPROVAL_QUERY, PROTOCOL, CRLF, frame);
        stream
            .write_all(request.as_bytes())
            .await
            .map_err(io_err)?;
        stream.flush().await.map_err(io_err)?;

        let mut reply = Vec::with_capacity(MAX_REPLY_LEN);
        let mut chunk = [0u8; MAX_REPLY_LEN];
        while reply.len() < MAX_REPLY_LEN {
            let room = MAX_REPLY_LEN - reply.len();
            let n = stream
                .read(&mut chunk[..room])
                .await
                .map_err(io_err)?;
            if n == 0 {
                break;
            }
            reply.extend_from_slice(&chunk[..n]);
            if reply.ends_with(TERMINATOR) {
                break;
            }
        }

        if reply.is_empty() {
            return Err(GatewayError::AuthorityUnreachable(format!(
                "{} closed the connection without replying",
                self.addr
            )));
        }

        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
