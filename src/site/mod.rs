//! Site adapters
//!
//! A site adapter turns a site's markup into chapters, pages and image
//! locations. Every bundled site is an [`HtmlSite`] configured by a
//! [`SiteRules`] implementation.

pub mod html;
pub mod parser;
pub mod rules;
pub mod sites;

pub use html::HtmlSite;
pub use rules::SiteRules;

use crate::config::HttpConfig;
use crate::state::{Chapter, Page};
use crate::{GetMangaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Names accepted by [`connect`]
pub const SITES: &[&str] = &[
    sites::MangaHere::NAME,
    sites::MangaFox::NAME,
    sites::MangaReader::NAME,
    sites::MangaDex::NAME,
    sites::CartoonMad::NAME,
    sites::RawMangaUpdate::NAME,
];

#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Site name as given on the command line
    fn name(&self) -> &str;

    /// Normalized title, the prefix of every archive name
    fn title(&self) -> &str;

    /// All chapters of the title, oldest first
    ///
    /// Fails with [`GetMangaError::NoChapters`] when the index lists none.
    async fn list_chapters(&self) -> Result<Vec<Chapter>>;

    /// Pages of one chapter in reading order
    async fn list_pages(&self, chapter_uri: &str) -> Result<Vec<Page>>;

    /// Absolute URL of the image shown on `page_uri`
    ///
    /// Returns `Ok(None)` when the page never shows an image element.
    async fn resolve_image_locator(&self, page_uri: &str) -> Result<Option<String>>;

    /// Whether pages must be fetched one at a time
    fn is_sequential_only(&self) -> bool {
        false
    }
}

/// Creates the adapter for `site`, looking up `title`
pub fn connect(
    site: &str,
    title: &str,
    client: Client,
    config: &HttpConfig,
) -> Result<Arc<dyn SiteAdapter>> {
    fn build<R: SiteRules>(client: Client, title: &str, attempts: u32) -> Arc<dyn SiteAdapter> {
        Arc::new(HtmlSite::<R>::new(client, title, attempts))
    }

    let attempts = config.lookup_attempts;
    let adapter = match site.trim().to_lowercase().as_str() {
        sites::MangaHere::NAME => build::<sites::MangaHere>(client, title, attempts),
        sites::MangaFox::NAME => build::<sites::MangaFox>(client, title, attempts),
        sites::MangaReader::NAME => build::<sites::MangaReader>(client, title, attempts),
        sites::MangaDex::NAME => build::<sites::MangaDex>(client, title, attempts),
        sites::CartoonMad::NAME => build::<sites::CartoonMad>(client, title, attempts),
        sites::RawMangaUpdate::NAME => build::<sites::RawMangaUpdate>(client, title, attempts),
        _ => return Err(GetMangaError::UnknownSite(site.to_string())),
    };

    Ok(adapter)
}
