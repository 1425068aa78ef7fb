//! Download module for chapter fetching and assembly
//!
//! This module contains the core download logic, including:
//! - HTTP fetching with retry logic and response validation
//! - Page and archive file naming
//! - Admission control for concurrent page fetches
//! - Per-page workers
//! - Overall chapter coordination

mod coordinator;
mod fetcher;
mod filename;
mod scheduler;
mod worker;

pub use coordinator::{ChapterDownloader, DEFAULT_CONCURRENCY};
pub use fetcher::{build_http_client, Fetcher, RetryPolicy};
pub use filename::{
    chapter_stem, entry_name, image_extension, normalize_page_name, pad_chapter_number,
};
pub use scheduler::AdmissionGate;
pub use worker::{FetchedPage, PageOutcome, PageWorker};
