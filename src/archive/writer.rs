use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Errors raised while assembling an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive is already closed")]
    Closed,
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Incremental deflate-compressed archive backed by a temporary file
///
/// An `ArchiveWriter` ends in exactly one of two ways: [`finalize`] renames
/// the temporary file into place, or [`discard`] deletes it. Dropping a
/// writer that was neither finalized nor discarded deletes the temporary
/// file as well.
///
/// [`finalize`]: ArchiveWriter::finalize
/// [`discard`]: ArchiveWriter::discard
pub struct ArchiveWriter {
    zip: Option<ZipWriter<File>>,
    temp_path: PathBuf,
    entries: usize,
}

impl ArchiveWriter {
    /// Creates (or truncates) the temporary archive file
    pub fn create(temp_path: impl Into<PathBuf>) -> ArchiveResult<Self> {
        let temp_path = temp_path.into();
        let file = File::create(&temp_path)?;
        debug!("Opened temporary archive {}", temp_path.display());

        Ok(Self {
            zip: Some(ZipWriter::new(file)),
            temp_path,
            entries: 0,
        })
    }

    /// Appends one compressed entry; entries keep call order
    pub fn write_entry(&mut self, name: &str, bytes: &[u8]) -> ArchiveResult<()> {
        let zip = self.zip.as_mut().ok_or(ArchiveError::Closed)?;
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
        self.entries += 1;

        Ok(())
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Closes the archive and renames it to `final_path`
    ///
    /// On failure the temporary file is removed before the error is returned.
    pub fn finalize(mut self, final_path: &Path) -> ArchiveResult<PathBuf> {
        let mut zip = self.zip.take().ok_or(ArchiveError::Closed)?;

        let result = zip
            .finish()
            .map_err(ArchiveError::from)
            .and_then(|file| file.sync_all().map_err(ArchiveError::from))
            .and_then(|()| {
                std::fs::rename(&self.temp_path, final_path).map_err(ArchiveError::from)
            });

        match result {
            Ok(()) => {
                debug!(
                    "Finalized archive {} with {} entries",
                    final_path.display(),
                    self.entries
                );
                Ok(final_path.to_path_buf())
            }
            Err(e) => {
                remove_temp(&self.temp_path);
                Err(e)
            }
        }
    }

    /// Closes the archive (if still open) and deletes the temporary file
    pub fn discard(mut self) {
        self.close_and_remove();
    }

    fn close_and_remove(&mut self) {
        if let Some(zip) = self.zip.take() {
            drop(zip);
        }
        remove_temp(&self.temp_path);
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if self.zip.is_some() {
            self.close_and_remove();
        }
    }
}

fn remove_temp(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed temporary archive {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temporary archive {}: {}", path.display(), e),
    }
}
