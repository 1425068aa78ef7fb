//! Configuration module for getmanga
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so running without a configuration file is fine.
//!
//! # Example
//!
//! ```no_run
//! use getmanga::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("getmanga.toml")).unwrap();
//! println!("Downloading with {} concurrent pages", config.download.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DownloadConfig, HttpConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
