//! Chapter archive assembly
//!
//! Archives are written entry by entry into a temporary file and only
//! appear under their final name through a single rename once complete.

mod writer;

pub use writer::{ArchiveError, ArchiveResult, ArchiveWriter};
