//! Directory → temporary zip packaging.
//!
//! A directory payload cannot be streamed as-is, so it is packaged into a
//! zip archive first.  The archive is staged in a fresh temporary directory
//! that lives exactly as long as the [`PackedArchive`] value: when the run
//! ends — sent, timed out, aborted, or panicked — dropping the value removes
//! the staging directory and the archive inside it.
//!
//! The archive root is the directory's own name, so unzipping
//! `photos.zip` produces `photos/...` rather than spilling the contents
//! into the receiver's working directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Error type for archive packaging.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The staging directory or the archive file inside it could not be
    /// created.
    #[error("failed to stage archive: {0}")]
    Staging(#[source] std::io::Error),

    /// A directory entry could not be visited.
    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A source file could not be read into the archive.
    #[error("failed to add {path} to the archive: {source}")]
    AddEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The zip writer rejected an entry or failed to finalise the archive.
    #[error("zip error on {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// A zip archive staged in its own temporary directory.
///
/// Dropping this value removes the staging directory — and therefore the
/// archive — on every exit path of the run.
pub struct PackedArchive {
    staging: TempDir,
    zip_path: PathBuf,
    size: u64,
}

impl PackedArchive {
    /// On-disk location of the staged zip file.
    pub fn zip_path(&self) -> &Path {
        &self.zip_path
    }

    /// Size of the finished archive in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for PackedArchive {
    fn drop(&mut self) {
        // The TempDir field removes the directory tree after this runs.
        debug!(
            "removing archive staging directory {}",
            self.staging.path().display()
        );
    }
}

/// Packages `dir` into a staged zip archive named `archive_name`.
///
/// Entry names inside the zip are rooted at the directory's basename, i.e.
/// packaging `/home/me/photos` as `photos.zip` produces entries
/// `photos/...`.  Empty subdirectories are preserved as directory entries.
///
/// # Errors
///
/// Any staging, walk, read, or zip-write failure aborts the packaging.  The
/// partially written archive and its staging directory are removed before
/// the error is returned.
pub fn pack_directory(dir: &Path, archive_name: &str) -> Result<PackedArchive, ArchiveError> {
    pack_directory_in(&std::env::temp_dir(), dir, archive_name)
}

/// Like [`pack_directory`], but stages under `staging_root` instead of the
/// system temp directory.
fn pack_directory_in(
    staging_root: &Path,
    dir: &Path,
    archive_name: &str,
) -> Result<PackedArchive, ArchiveError> {
    let staging = TempDir::new_in(staging_root).map_err(ArchiveError::Staging)?;
    let zip_path = staging.path().join(archive_name);

    let root_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "transfer".to_string());

    debug!(
        "packaging {} into {} (root {root_name:?})",
        dir.display(),
        zip_path.display()
    );

    // On failure `staging` is dropped right here, taking the partial
    // archive with it.
    let size = write_zip(dir, &root_name, &zip_path)?;

    Ok(PackedArchive {
        staging,
        zip_path,
        size,
    })
}

/// Walks `source` and writes every entry under `root_name/` into a zip at
/// `zip_path`, returning the finished archive size.
fn write_zip(source: &Path, root_name: &str, zip_path: &Path) -> Result<u64, ArchiveError> {
    let file = File::create(zip_path).map_err(ArchiveError::Staging)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walked entries stay under the walk root");
        let entry_name = if relative.as_os_str().is_empty() {
            PathBuf::from(root_name)
        } else {
            Path::new(root_name).join(relative)
        };
        let entry_name = entry_name.to_string_lossy();

        if entry.file_type().is_dir() {
            writer
                .add_directory(entry_name.as_ref(), options)
                .map_err(|e| ArchiveError::Zip {
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;
        } else {
            writer
                .start_file(entry_name.as_ref(), options)
                .map_err(|e| ArchiveError::Zip {
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;
            let mut src = File::open(entry.path()).map_err(|e| ArchiveError::AddEntry {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            io::copy(&mut src, &mut writer).map_err(|e| ArchiveError::AddEntry {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
        }
    }

    let file = writer.finish().map_err(|e| ArchiveError::Zip {
        path: zip_path.to_path_buf(),
        source: e,
    })?;
    let size = file.metadata().map_err(ArchiveError::Staging)?.len();
    Ok(size)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
