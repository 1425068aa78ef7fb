//! Storage module for the local chapter library
//!
//! This module handles everything the downloader needs from the local disk:
//! - Creating the library directory
//! - Deriving archive and temporary paths for a chapter
//! - Checking whether a chapter was already downloaded

mod fs;
mod traits;

pub use fs::FsLibrary;
pub use traits::{ChapterStore, StorageError};

/// File extension of finished chapter archives
pub const ARCHIVE_EXTENSION: &str = "cbz";

/// Suffix appended to the final path while an archive is being written
pub const TEMP_SUFFIX: &str = "tmp";
