//! getmanga: a chapter archiver for manga reading sites
//!
//! This crate downloads manga chapters page by page from sites that only
//! expose them through HTML markup, and packs every chapter into a single
//! ordered `.cbz` archive. Page fetches run concurrently under a bounded
//! admission gate while the archive is written strictly in page order.

pub mod archive;
pub mod config;
pub mod download;
pub mod progress;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for getmanga operations
#[derive(Debug, Error)]
pub enum GetMangaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Unknown site '{0}' (supported: {})", site::SITES.join(", "))]
    UnknownSite(String),

    #[error("There is no chapter available for {title}")]
    NoChapters { title: String },

    #[error("Chapter {number} not found")]
    ChapterNotFound { number: String },

    #[error("Chapter {chapter} has no pages")]
    EmptyChapter { chapter: String },

    #[error("Chapter {chapter} failed at page {page}: {source}")]
    PageFailed {
        chapter: String,
        page: String,
        source: FetchError,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Failure of a single page fetch
///
/// Every variant is terminal for the page, and therefore for its chapter.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to retrieve {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to retrieve {url} after {attempts} attempts")]
    Exhausted { url: String, attempts: u32 },

    #[error("Failed to resolve image on {page_uri}")]
    ImageNotFound { page_uri: String },

    #[error("Image lookup failed on {page_uri}: {message}")]
    Lookup { page_uri: String, message: String },

    #[error("Download cancelled")]
    Cancelled,

    #[error("Page worker failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for getmanga operations
pub type Result<T> = std::result::Result<T, GetMangaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use download::{ChapterDownloader, Fetcher, RetryPolicy};
pub use site::{connect, SiteAdapter};
pub use state::{BatchReport, Chapter, ChapterOutcome, Page};
