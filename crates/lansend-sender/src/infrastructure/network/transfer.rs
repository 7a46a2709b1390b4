//! One-shot TCP transfer server.
//!
//! The transfer server accepts exactly one receiver connection and streams
//! the prepared payload to it:
//!
//! 1. Bind the TCP listener on the configured transfer port.
//! 2. Wait for a single `accept`, bounded by the broadcast timeout plus a
//!    grace margin (late receivers that heard the final announcement still
//!    get a window to connect).
//! 3. On accept, raise the connected signal and join the broadcaster, then
//!    stream the framed payload to the receiver.
//! 4. Close the connection.  The server never accepts a second receiver.
//!
//! When the wait elapses with no connection the run ends in
//! [`TransferOutcome::NoReceiver`] — a normal outcome, not an error.  A
//! failure while streaming produces a best-effort error report frame before
//! the close and ends in [`TransferOutcome::Aborted`].
//!
//! # Single-shot accept
//!
//! `accept` is wrapped in [`tokio::time::timeout`] rather than looped: this
//! server exists to hand one payload to one receiver, so there is nothing
//! to do after the first connection (or the deadline) but shut down.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use lansend_core::{encode_error_frame, encode_header, ConnectedSignal, FrameHeader, ProtocolError};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::infrastructure::network::broadcast::BroadcastOutcome;
use crate::infrastructure::storage::config::SenderConfig;

/// Error type for transfer server operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The configured bind address could not be parsed.
    #[error("invalid transfer bind address {addr}: {source}")]
    BindAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The TCP listener could not be bound.
    #[error("failed to bind transfer listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The pending connection could not be accepted.
    #[error("failed to accept receiver connection: {0}")]
    Accept(#[source] std::io::Error),

    /// The payload header could not be encoded.
    #[error("frame encoding failed: {0}")]
    Frame(#[from] ProtocolError),

    /// The payload could not be read from disk.
    #[error("failed to read payload {path}: {source}")]
    Payload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The connection to the receiver failed mid-send.
    #[error("connection error while sending: {0}")]
    Connection(#[source] std::io::Error),
}

/// How a transfer run ended.
///
/// All three variants are orderly ends of the run; setup failures surface
/// as [`TransferError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The payload was fully streamed to the receiver.
    Sent { name: String, bytes: u64 },
    /// The accept deadline elapsed with no receiver; nothing was sent.
    NoReceiver,
    /// A receiver connected but the send failed part-way.
    Aborted { name: String, error: String },
}

/// Runs the transfer server for one payload.
///
/// Waits for a single receiver, bounded by the accept deadline, and streams
/// `payload_path` framed under `header`.  On every exit path the
/// `broadcaster` task is stopped (via `signal`) and joined before this
/// function returns, so no announcement outlives the run.
///
/// # Errors
///
/// Returns a [`TransferError`] for setup failures: an unusable bind
/// address, a port that cannot be bound, or a failed accept.  Failures
/// *after* the accept are reported as [`TransferOutcome::Aborted`].
pub async fn serve_transfer(
    config: &SenderConfig,
    header: &FrameHeader,
    payload_path: &Path,
    signal: &ConnectedSignal,
    broadcaster: JoinHandle<BroadcastOutcome>,
) -> Result<TransferOutcome, TransferError> {
    let addr_text = format!(
        "{}:{}",
        config.transfer.bind_address, config.transfer.transfer_port
    );
    let addr: SocketAddr = match addr_text.parse() {
        Ok(addr) => addr,
        Err(source) => {
            stop_broadcaster(signal, broadcaster).await;
            return Err(TransferError::BindAddr {
                addr: addr_text,
                source,
            });
        }
    };

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(source) => {
            stop_broadcaster(signal, broadcaster).await;
            return Err(TransferError::Bind { addr, source });
        }
    };

    let deadline = config.accept_deadline();
    info!(
        "waiting for a receiver on {addr} (up to {}s)",
        deadline.as_secs()
    );

    match timeout(deadline, listener.accept()).await {
        Err(_) => {
            info!("no receiver connected; closing without sending");
            stop_broadcaster(signal, broadcaster).await;
            Ok(TransferOutcome::NoReceiver)
        }
        Ok(Err(source)) => {
            stop_broadcaster(signal, broadcaster).await;
            Err(TransferError::Accept(source))
        }
        Ok(Ok((stream, peer))) => {
            info!("receiver connected from {peer}");
            // Silence the announcements before any payload bytes move.
            stop_broadcaster(signal, broadcaster).await;
            Ok(handle_receiver(
                stream,
                peer,
                header,
                payload_path,
                config.transfer.chunk_size,
            )
            .await)
        }
    }
}

/// Raises the connected signal and joins the broadcaster task.
async fn stop_broadcaster(signal: &ConnectedSignal, broadcaster: JoinHandle<BroadcastOutcome>) {
    if signal.set() {
        debug!("broadcast stop signal raised");
    }
    match broadcaster.await {
        Ok(outcome) => debug!("broadcaster finished: {outcome:?}"),
        Err(e) => warn!("broadcaster task failed to join: {e}"),
    }
}

/// Streams the payload to the accepted receiver and classifies the result.
///
/// The stream is dropped — and therefore closed — on both paths.
async fn handle_receiver(
    mut stream: TcpStream,
    peer: SocketAddr,
    header: &FrameHeader,
    payload_path: &Path,
    chunk_size: usize,
) -> TransferOutcome {
    match send_framed(&mut stream, header, payload_path, chunk_size).await {
        Ok(bytes) => {
            info!("sent {} ({bytes} bytes) to {peer}", header.name);
            TransferOutcome::Sent {
                name: header.name.clone(),
                bytes,
            }
        }
        Err(e) => {
            warn!("transfer to {peer} failed: {e}");
            send_error_report(&mut stream, &e).await;
            TransferOutcome::Aborted {
                name: header.name.clone(),
                error: e.to_string(),
            }
        }
    }
}

/// Writes the frame header followed by the payload body in fixed-size
/// chunks, returning the number of body bytes sent.
///
/// The header goes out before the payload is opened, mirroring the wire
/// contract: the receiver always sees a header first, even when the body
/// subsequently fails.
///
/// # Errors
///
/// Returns [`TransferError::Payload`] when the payload cannot be read and
/// [`TransferError::Connection`] when the receiver stops taking bytes.
pub async fn send_framed<W: AsyncWrite + Unpin>(
    writer: &mut W,
    header: &FrameHeader,
    payload_path: &Path,
    chunk_size: usize,
) -> Result<u64, TransferError> {
    let header_bytes = encode_header(header)?;
    writer
        .write_all(&header_bytes)
        .await
        .map_err(TransferError::Connection)?;

    let mut file =
        tokio::fs::File::open(payload_path)
            .await
            .map_err(|source| TransferError::Payload {
                path: payload_path.to_path_buf(),
                source,
            })?;

    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut sent = 0u64;
    loop {
        let n = file.read(&mut buf).await.map_err(|source| TransferError::Payload {
            path: payload_path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .map_err(TransferError::Connection)?;
        sent += n as u64;
    }
    writer.flush().await.map_err(TransferError::Connection)?;
    Ok(sent)
}

/// Best-effort delivery of an error report frame to the receiver.
///
/// The connection may already be dead, so failures here are only logged.
async fn send_error_report<W: AsyncWrite + Unpin>(writer: &mut W, error: &TransferError) {
    let frame = encode_error_frame(&error.to_string());
    if let Err(e) = writer.write_all(&frame).await {
        warn!("could not deliver error report: {e}");
        return;
    }
    if let Err(e) = writer.flush().await {
        warn!("could not flush error report: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
