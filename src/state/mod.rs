//! Data model shared by site adapters and the download pipeline
//!
//! This module defines:
//! - Chapters and pages as produced by site adapters
//! - Per-chapter download outcomes
//! - Batch reports for multi-chapter runs

mod chapter_state;

pub use chapter_state::{BatchReport, Chapter, ChapterOutcome, Page};
