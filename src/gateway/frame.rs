// RKSOK — Frame Reader
//
// Accumulates bytes until the first `\r\n\r\n`. The whole read, across however
// many chunks the peer needs, is bounded by a single deadline.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use super::protocol::TERMINATOR;
use super::GatewayError;

/// Bytes requested per read call.
pub const READ_CHUNK: usize = 1024;

/// Largest frame buffered before giving up on a terminator.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Read one frame, returning the bytes up to and including the terminator.
pub async fn read_frame<R>(reader: &mut R, deadline: Duration) -> Result<Vec<u8>, GatewayError>
where
    R: AsyncRead + Unpin,
{
    match tokio::time::timeout(deadline, read_until_terminator(reader)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(?deadline, "Frame read timed out");
            Err(GatewayError::IncompleteFrame)
        }
    }
}

async fn read_until_terminator<R>(reader: &mut R) -> Result<Vec<u8>, GatewayError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await.map_err(|e| {
            tracing::debug!(error = %e, "Frame read failed");
            GatewayError::IncompleteFrame
        })?;
        if n == 0 {
            tracing::debug!(buffered = buf.len(), "Peer closed before terminator");
            return Err(GatewayError::IncompleteFrame);
        }

        // Only the tail can contain a terminator that was not there before.
        let search_from = buf.len().saturating_sub(TERMINATOR.len() - 1);
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find_terminator(&buf[search_from..]) {
            buf.truncate(search_from + pos + TERMINATOR.len());
            return Ok(buf);
        }

        if buf.len() > MAX_FRAME_LEN {
            tracing::debug!(buffered = buf.len(), "Frame exceeds size limit");
            return Err(GatewayError::IncompleteFrame);
        }
    }
}

fn find_terminator(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(TERMINATOR.len())
        .position(|window| window == TERMINATOR)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_reads_single_chunk_frame() {
        let mut input: &[u8] = b"OTDAI ivan X\r\n\r\n";
        let frame = read_frame(&mut input, DEADLINE).await.unwrap();
        assert_eq!(frame, b"OTDAI ivan X\r\n\r\n");
    }

    #[tokio::test]
    async fn test_stops_at_first_terminator() {
        let mut input: &[u8] = b"first\r\n\r\nsecond\r\n\r\n";
        let frame = read_frame(&mut input, DEADLINE).await.unwrap();
        assert_eq!(frame, b"first\r\n\r\n");
    }

    #[tokio::test]
    async fn test_terminator_split_across_reads() {
        let (mut client, mut server) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            for part in ["ОТДОВАЙ ivan", " РКСОК/1.0\r", "\n\r", "\n"] {
                client.write_all(part.as_bytes()).await.unwrap();
                client.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            client
        });

        let frame = read_frame(&mut server, DEADLINE).await.unwrap();
        assert_eq!(frame, "ОТДОВАЙ ivan РКСОК/1.0\r\n\r\n".as_bytes());
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn test_peer_close_before_terminator() {
        let mut input: &[u8] = "ОТДОВАЙ ivan".as_bytes();
        let err = read_frame(&mut input, DEADLINE).await.unwrap_err();
        assert!(matches!(err, GatewayError::IncompleteFrame));
    }

    #[tokio::test]
    async fn test_deadline_elapses_without_terminator() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all("ОТДОВАЙ ivan".as_bytes()).await.unwrap();

        let err = read_frame(&mut server, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::IncompleteFrame));
        drop(client);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let data = vec![b'a'; MAX_FRAME_LEN + READ_CHUNK];
        let mut input: &[u8] = &data;
        let err = read_frame(&mut input, DEADLINE).await.unwrap_err();
        assert!(matches!(err, GatewayError::IncompleteFrame));
    }
}
