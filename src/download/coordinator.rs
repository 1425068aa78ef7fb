//! Chapter download coordinator - main download orchestration logic
//!
//! This module contains the per-chapter download flow, including:
//! - Skipping chapters whose archive already exists
//! - Resolving the page list through the site adapter
//! - Fanning pages out to workers under the admission gate
//! - Draining worker results in page order into the archive
//! - Publishing the archive atomically, or discarding it on failure

use crate::archive::ArchiveWriter;
use crate::config::Config;
use crate::download::scheduler::AdmissionGate;
use crate::download::worker::{PageOutcome, PageWorker};
use crate::download::{Fetcher, RetryPolicy};
use crate::progress::{NoProgress, ProgressSink};
use crate::site::SiteAdapter;
use crate::state::{BatchReport, Chapter, ChapterOutcome, Page};
use crate::storage::{ChapterStore, FsLibrary};
use crate::{FetchError, GetMangaError};
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Default admission gate size
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Downloads chapters of one title into a chapter library
///
/// Chapters are processed one at a time; pages of a chapter are fetched
/// concurrently.
pub struct ChapterDownloader {
    site: Arc<dyn SiteAdapter>,
    fetcher: Arc<Fetcher>,
    store: Arc<dyn ChapterStore>,
    progress: Arc<dyn ProgressSink>,
    concurrency: usize,
}

impl ChapterDownloader {
    /// Creates a downloader with the default concurrency and no progress output
    pub fn new(
        site: Arc<dyn SiteAdapter>,
        fetcher: Arc<Fetcher>,
        store: Arc<dyn ChapterStore>,
    ) -> Self {
        Self {
            site,
            fetcher,
            store,
            progress: Arc::new(NoProgress),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Creates a downloader from configuration, storing archives in `output-dir`
    pub fn from_config(site: Arc<dyn SiteAdapter>, client: Client, config: &Config) -> Self {
        let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.http));
        let store = FsLibrary::new(config.download.output_dir.clone());

        Self::new(site, Arc::new(fetcher), Arc::new(store))
            .with_concurrency(config.download.concurrency as usize)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn site(&self) -> &Arc<dyn SiteAdapter> {
        &self.site
    }

    /// Downloads one chapter as an archive
    ///
    /// # Flow
    ///
    /// 1. Return `Skipped` if the archive already exists (no network access)
    /// 2. Resolve the page list; an empty list is an error
    /// 3. Open a temporary archive next to the final path
    /// 4. Spawn one worker per page, gated by the admission gate
    /// 5. Await results in page order, writing each page as it comes due
    /// 6. Rename the finished archive into place
    ///
    /// Any page failure discards the temporary archive and fails the whole
    /// chapter. Workers that were already admitted run to completion, but
    /// their results are ignored and no new worker is admitted.
    ///
    /// # Returns
    ///
    /// * `Ok(ChapterOutcome)` - Chapter downloaded or skipped
    /// * `Err(GetMangaError)` - Chapter failed; no archive was left behind
    pub async fn download_chapter(
        &self,
        chapter: &Chapter,
    ) -> Result<ChapterOutcome, GetMangaError> {
        self.store.ensure_directory()?;

        let archive_path = self.store.archive_path(chapter);
        if self.store.exists(&archive_path) {
            info!("File {} exists, skipped download", archive_path.display());
            return Ok(ChapterOutcome::Skipped { path: archive_path });
        }

        let pages = self.site.list_pages(&chapter.uri).await?;
        if pages.is_empty() {
            return Err(GetMangaError::EmptyChapter {
                chapter: chapter.name.clone(),
            });
        }

        info!(
            "Downloading {} {} to {}",
            self.site.title(),
            chapter.number,
            archive_path.display()
        );

        let mut archive = ArchiveWriter::create(self.store.temp_path(&archive_path))?;
        let gate = AdmissionGate::for_site(self.concurrency, self.site.is_sequential_only());
        let worker = PageWorker::new(
            Arc::clone(&self.site),
            Arc::clone(&self.fetcher),
            gate.clone(),
        );

        let handles: Vec<JoinHandle<PageOutcome>> =
            pages.iter().cloned().map(|page| worker.spawn(page)).collect();

        self.progress.update(0, pages.len());

        let drained = self.drain(chapter, &pages, handles, &mut archive).await;
        if let Err(e) = drained {
            gate.close();
            archive.discard();
            self.progress.finish();
            warn!("Discarded partial archive for {}: {}", chapter.name, e);
            return Err(e);
        }

        let path = archive.finalize(&archive_path)?;
        self.progress.finish();
        info!("Finished {} ({} pages)", path.display(), pages.len());

        Ok(ChapterOutcome::Downloaded {
            path,
            pages: pages.len(),
        })
    }

    /// Writes worker results into the archive strictly in page order
    ///
    /// Results that finish early stay in their task until their turn.
    async fn drain(
        &self,
        chapter: &Chapter,
        pages: &[Page],
        handles: Vec<JoinHandle<PageOutcome>>,
        archive: &mut ArchiveWriter,
    ) -> Result<(), GetMangaError> {
        let total = pages.len();

        for (page, handle) in pages.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(FetchError::Worker(e.to_string())),
            };

            let fetched = outcome.map_err(|source| GetMangaError::PageFailed {
                chapter: chapter.name.clone(),
                page: page.name.clone(),
                source,
            })?;

            archive.write_entry(&fetched.entry_name, &fetched.bytes)?;
            self.progress.update(archive.entry_count(), total);
        }

        Ok(())
    }

    /// Returns the chapters after the last one already in the library
    ///
    /// Gaps before that chapter are not filled in.
    pub fn new_chapters<'a>(&self, chapters: &'a [Chapter]) -> &'a [Chapter] {
        let start = chapters
            .iter()
            .rposition(|chapter| self.store.exists(&self.store.archive_path(chapter)))
            .map_or(0, |last| last + 1);

        &chapters[start..]
    }

    /// Downloads every chapter newer than the newest archived one
    pub async fn download_all_new(&self, chapters: &[Chapter]) -> BatchReport {
        let new = self.new_chapters(chapters);
        if new.is_empty() {
            info!("No new chapters for {}", self.site.title());
        } else {
            info!("{} new chapter(s) for {}", new.len(), self.site.title());
        }

        self.download_chapters(new).await
    }

    /// Downloads chapters one after another
    ///
    /// A failed chapter is logged and recorded; the batch moves on to the
    /// next chapter.
    pub async fn download_chapters(&self, chapters: &[Chapter]) -> BatchReport {
        let mut report = BatchReport::default();

        for chapter in chapters {
            let result = self.download_chapter(chapter).await;
            if let Err(e) = &result {
                error!("Failed to download chapter {}: {}", chapter.number, e);
            }
            report.record(chapter, result);
        }

        report
    }
}
