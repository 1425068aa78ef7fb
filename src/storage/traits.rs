//! Storage traits and error types
//!
//! This module defines the trait interface for chapter libraries and
//! associated error types.

use crate::state::Chapter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for local chapter libraries
///
/// The downloader only ever asks where a chapter belongs and whether it is
/// already there; writing the archive itself is the job of
/// [`ArchiveWriter`](crate::archive::ArchiveWriter).
pub trait ChapterStore: Send + Sync {
    /// Returns the final archive path for a chapter
    fn archive_path(&self, chapter: &Chapter) -> PathBuf;

    /// Returns the temporary path an archive is assembled under
    ///
    /// The temporary file is a sibling of the final path so that the
    /// finishing rename never crosses a filesystem boundary.
    fn temp_path(&self, archive_path: &Path) -> PathBuf {
        let mut name = archive_path.as_os_str().to_os_string();
        name.push(".");
        name.push(super::TEMP_SUFFIX);
        PathBuf::from(name)
    }

    /// Returns true if a finished archive exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Creates the library directory if it is missing
    fn ensure_directory(&self) -> StorageResult<()>;
}
