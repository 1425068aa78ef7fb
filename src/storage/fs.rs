use crate::state::Chapter;
use crate::storage::traits::{ChapterStore, StorageError, StorageResult};
use crate::storage::ARCHIVE_EXTENSION;
use std::path::{Path, PathBuf};

/// Chapter library stored as plain files under one directory
#[derive(Debug, Clone)]
pub struct FsLibrary {
    root: PathBuf,
}

impl FsLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ChapterStore for FsLibrary {
    fn archive_path(&self, chapter: &Chapter) -> PathBuf {
        self.root.join(format!("{}.{}", chapter.name, ARCHIVE_EXTENSION))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn ensure_directory(&self) -> StorageResult<()> {
        if self.root.is_dir() {
            return Ok(());
        }

        tracing::debug!("Creating library directory {}", self.root.display());
        std::fs::create_dir_all(&self.root).map_err(|source| StorageError::CreateDir {
            path: self.root.clone(),
            source,
        })
    }
}
