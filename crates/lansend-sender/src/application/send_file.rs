//! Whole-run orchestration: resolve the source, prepare the payload,
//! announce, and serve one receiver.
//!
//! [`send_path`] is the single entry point used by the binary and the
//! integration tests.  The payload is fully prepared — including directory
//! packaging — before the first announcement goes out, so a receiver can
//! never connect ahead of a payload that does not exist yet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lansend_core::{ConnectedSignal, FrameHeader};
use thiserror::Error;
use tracing::info;

use crate::application::item::{ItemError, TransferItem};
use crate::infrastructure::archive::{pack_directory, ArchiveError, PackedArchive};
use crate::infrastructure::network::broadcast::spawn_broadcaster;
use crate::infrastructure::network::transfer::{serve_transfer, TransferError, TransferOutcome};
use crate::infrastructure::storage::config::SenderConfig;

/// Error type for a whole send run.
#[derive(Debug, Error)]
pub enum SendError {
    /// The source path could not be resolved into a payload.
    #[error("nothing to send: {0}")]
    Item(#[from] ItemError),

    /// A directory source could not be packaged.
    #[error("failed to package directory: {0}")]
    Archive(#[from] ArchiveError),

    /// The transfer server could not be set up.
    #[error("transfer run failed: {0}")]
    Transfer(#[from] TransferError),
}

/// The payload as offered on the wire, plus whatever keeps it on disk.
struct PreparedPayload {
    header: FrameHeader,
    disk_path: PathBuf,
    /// Holds the staged archive (and its temp directory) alive for the
    /// duration of the run; `None` for plain files.
    _archive: Option<PackedArchive>,
}

/// Turns a resolved [`TransferItem`] into a streamable payload.
///
/// Files are offered in place; directories are packaged into a staged zip
/// first.  The header size is captured here, once, from the bytes that
/// will actually be streamed.
fn prepare(item: &TransferItem) -> Result<PreparedPayload, SendError> {
    match item {
        TransferItem::File { path, .. } => {
            let size = std::fs::metadata(path)
                .map_err(|source| ItemError::Metadata {
                    path: path.clone(),
                    source,
                })?
                .len();
            Ok(PreparedPayload {
                header: FrameHeader::new(item.kind(), item.wire_name(), size),
                disk_path: path.clone(),
                _archive: None,
            })
        }
        TransferItem::Directory { path, .. } => {
            let archive_name = item.wire_name();
            let packed = pack_directory(path, &archive_name)?;
            Ok(PreparedPayload {
                header: FrameHeader::new(item.kind(), archive_name, packed.size()),
                disk_path: packed.zip_path().to_path_buf(),
                _archive: Some(packed),
            })
        }
    }
}

/// Runs one complete send: announce on UDP until a receiver connects (or
/// the timeout elapses), then stream the payload to that single receiver.
///
/// The connected signal and broadcaster task are scoped to this call, so
/// consecutive runs in one process are fully independent.
///
/// # Errors
///
/// Returns [`SendError`] when the source cannot be resolved, the directory
/// cannot be packaged, or the transfer server cannot be set up.  A run
/// where nobody connects is *not* an error; it ends in
/// [`TransferOutcome::NoReceiver`].
pub async fn send_path(config: &SenderConfig, path: &Path) -> Result<TransferOutcome, SendError> {
    let item = TransferItem::resolve(path)?;
    info!("resolved {} as {}", path.display(), item.kind());

    let payload = prepare(&item)?;
    info!(
        "offering {} ({} bytes) on TCP port {}",
        payload.header.name, payload.header.size, config.transfer.transfer_port
    );

    let signal = Arc::new(ConnectedSignal::new());
    let broadcaster = spawn_broadcaster(config.clone(), Arc::clone(&signal));
    let outcome = serve_transfer(
        config,
        &payload.header,
        &payload.disk_path,
        &signal,
        broadcaster,
    )
    .await?;

    // `payload` drops here; for directories that removes the staged zip.
    Ok(outcome)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
