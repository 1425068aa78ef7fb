//! getmanga main entry point
//!
//! This is the command-line interface for the getmanga chapter archiver.

use anyhow::Context;
use clap::Parser;
use getmanga::config::{load_config_with_hash, validate, Config};
use getmanga::download::build_http_client;
use getmanga::progress::{NoProgress, ProgressSink, TerminalProgress};
use getmanga::state::{BatchReport, Chapter};
use getmanga::{connect, ChapterDownloader, GetMangaError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// getmanga: download manga chapters as .cbz archives
///
/// Without a mode flag, every chapter newer than the newest archive in the
/// output directory is downloaded.
#[derive(Parser, Debug)]
#[command(name = "getmanga")]
#[command(version = "1.0.0")]
#[command(about = "Download manga chapters as .cbz archives", long_about = None)]
struct Cli {
    /// Site to download from (mangahere, mangafox, mangareader, ...)
    #[arg(value_name = "SITE")]
    site: String,

    /// Manga title; some sites expect `title:id`
    #[arg(value_name = "TITLE")]
    title: String,

    /// List available chapters and exit
    #[arg(short, long, conflicts_with_all = ["chapter", "latest", "new", "all"])]
    list: bool,

    /// Download a single chapter
    #[arg(short, long, value_name = "NUMBER", conflicts_with_all = ["latest", "new", "all"])]
    chapter: Option<String>,

    /// Download the latest chapter
    #[arg(long, conflicts_with_all = ["new", "all"])]
    latest: bool,

    /// Download chapters newer than the last archived one (default)
    #[arg(short, long, conflicts_with = "all")]
    new: bool,

    /// Download every chapter, skipping existing archives
    #[arg(short, long)]
    all: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory the archives are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Number of pages fetched at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_settings(&cli)?;

    let client = build_http_client(&config.http).context("Failed to build HTTP client")?;
    let site = connect(&cli.site, &cli.title, client.clone(), &config.http)?;
    let chapters = site.list_chapters().await?;

    if cli.list {
        print_chapters(&chapters);
        return Ok(ExitCode::SUCCESS);
    }

    let progress: Arc<dyn ProgressSink> = if cli.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(TerminalProgress::new())
    };
    let downloader = ChapterDownloader::from_config(site, client, &config).with_progress(progress);

    let report = if let Some(number) = &cli.chapter {
        let chapter = chapters
            .iter()
            .find(|c| c.matches_number(number))
            .ok_or_else(|| GetMangaError::ChapterNotFound {
                number: number.clone(),
            })?;
        downloader.download_chapters(std::slice::from_ref(chapter)).await
    } else if cli.latest {
        let latest = chapters.last().ok_or_else(|| GetMangaError::NoChapters {
            title: cli.title.clone(),
        })?;
        downloader.download_chapters(std::slice::from_ref(latest)).await
    } else if cli.all {
        downloader.download_chapters(&chapters).await
    } else {
        downloader.download_all_new(&chapters).await
    };

    Ok(summarize(&report))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("getmanga=info,warn"),
            1 => EnvFilter::new("getmanga=debug,info"),
            2 => EnvFilter::new("getmanga=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::debug!("Configuration loaded (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.download.output_dir = dir.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.download.concurrency = concurrency;
    }

    validate(&config)?;
    Ok(config)
}

fn print_chapters(chapters: &[Chapter]) {
    for chapter in chapters {
        match &chapter.volume {
            Some(volume) => println!("{:>8}  {:<6} {}", chapter.number, volume, chapter.name),
            None => println!("{:>8}  {:<6} {}", chapter.number, "", chapter.name),
        }
    }
}

/// Logs the batch result and turns it into the process exit status
fn summarize(report: &BatchReport) -> ExitCode {
    for (name, error) in report.failures() {
        tracing::error!("{}: {}", name, error);
    }

    if !report.is_empty() {
        tracing::info!(
            "Downloaded {}, skipped {}, failed {}",
            report.downloaded(),
            report.skipped(),
            report.failed()
        );
    }

    if report.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
