//! Progress reporting for chapter downloads
//!
//! The coordinator reports `(pages archived, pages total)` after every page;
//! sinks only display it and never influence the download.

mod terminal;

pub use terminal::TerminalProgress;

/// Receiver of per-chapter progress notifications
pub trait ProgressSink: Send + Sync {
    /// Called with `(0, total)` when a chapter starts and after each archived page
    fn update(&self, done: usize, total: usize);

    /// Called once when the chapter is finished or abandoned
    fn finish(&self) {}
}

/// Sink that discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _done: usize, _total: usize) {}
}
