//! Resolution of the command-line path into a transfer item.
//!
//! Everything the rest of the run needs to know about the payload is decided
//! here, up front: whether the path exists, whether it is a file or a
//! directory, and the name the receiver will be told.  Network activity only
//! starts after resolution succeeds, so a mistyped path is reported
//! immediately instead of after a full broadcast timeout.

use std::path::{Path, PathBuf};

use lansend_core::PayloadKind;
use thiserror::Error;

/// Error type for payload resolution.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The path does not exist.
    #[error("file or directory not found: {path}")]
    NotFound { path: PathBuf },

    /// The path exists but could not be inspected.
    #[error("cannot inspect {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the sender was asked to transfer, resolved against the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferItem {
    /// A regular file, streamed as-is.
    File { path: PathBuf, name: String },
    /// A directory, packaged into a zip archive before streaming.
    Directory { path: PathBuf, name: String },
}

impl TransferItem {
    /// Classifies `path` as a file or directory payload.
    ///
    /// Symlinks are followed, so a link to a directory is sent as a
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::NotFound`] when nothing exists at `path` and
    /// [`ItemError::Metadata`] for other file-system failures (permissions,
    /// dangling mounts).
    pub fn resolve(path: &Path) -> Result<Self, ItemError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ItemError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ItemError::Metadata {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let name = base_name(path);
        if metadata.is_dir() {
            Ok(TransferItem::Directory {
                path: path.to_path_buf(),
                name,
            })
        } else {
            Ok(TransferItem::File {
                path: path.to_path_buf(),
                name,
            })
        }
    }

    /// The payload kind announced in the frame header.
    pub fn kind(&self) -> PayloadKind {
        match self {
            TransferItem::File { .. } => PayloadKind::File,
            TransferItem::Directory { .. } => PayloadKind::Folder,
        }
    }

    /// The name the receiver is told to save the payload under.
    ///
    /// Files keep their own name; directories are announced under the name
    /// of the archive they will be packaged into.
    pub fn wire_name(&self) -> String {
        match self {
            TransferItem::File { name, .. } => name.clone(),
            TransferItem::Directory { name, .. } => format!("{name}.zip"),
        }
    }

    /// The on-disk location of the source payload.
    pub fn path(&self) -> &Path {
        match self {
            TransferItem::File { path, .. } | TransferItem::Directory { path, .. } => path,
        }
    }
}

/// Derives the payload name from the final path component.
///
/// `file_name` already ignores trailing separators; for paths without a
/// final component (`.`, `..`, `/`) the canonicalised path supplies one, and
/// as a last resort a fixed name keeps the transfer well-formed.
fn base_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    if let Ok(canonical) = path.canonicalize() {
        if let Some(name) = canonical.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }
    "transfer".to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
