//! Generic markup-driven site adapter

use super::parser::{element_text, resolve_link, selector};
use super::rules::SiteRules;
use super::SiteAdapter;
use crate::download::chapter_stem;
use crate::state::{Chapter, Page};
use crate::{GetMangaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::marker::PhantomData;
use tracing::{debug, warn};
use url::Url;

/// Adapter for a site whose listings are plain HTML
///
/// Markup is parsed in synchronous helpers so no parsed document is held
/// across an await point.
pub struct HtmlSite<R: SiteRules> {
    client: Client,
    base_uri: String,
    input_title: String,
    title: String,
    lookup_attempts: u32,
    rules: PhantomData<R>,
}

impl<R: SiteRules> HtmlSite<R> {
    pub fn new(client: Client, input_title: &str, lookup_attempts: u32) -> Self {
        let input_title = input_title.trim().to_string();
        Self {
            client,
            base_uri: R::BASE_URI.to_string(),
            title: R::title(&input_title),
            input_title,
            lookup_attempts: lookup_attempts.max(1),
            rules: PhantomData,
        }
    }

    /// Points the adapter at another host serving the same markup
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into().trim_end_matches('/').to_string();
        self
    }

    pub fn title_uri(&self) -> String {
        R::title_uri(&self.base_uri, &self.input_title)
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let http_error = |source| GetMangaError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_error)?;
        let response = response.error_for_status().map_err(http_error)?;
        response.text().await.map_err(http_error)
    }

    /// Extracts chapters from a title index, oldest first
    pub fn parse_chapters(&self, html: &str) -> Result<Vec<Chapter>> {
        let document = Html::parse_document(html);
        let links = selector(R::CHAPTERS_CSS, &self.title_uri())?;
        let base = Url::parse(&self.base_uri)?;

        let mut elements: Vec<_> = document.select(&links).collect();
        if R::DESCENDING {
            elements.reverse();
        }

        let mut chapters = Vec::with_capacity(elements.len());
        for element in elements {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(number) = R::chapter_number(&element_text(&element), href) else {
                continue;
            };
            let Some(uri) = resolve_link(href, &base) else {
                debug!("Skipping chapter {} with unusable link {}", number, href);
                continue;
            };

            let volume = R::chapter_volume(href);
            let name = chapter_stem(&self.title, &number, volume.as_deref());
            chapters.push(Chapter {
                number,
                name,
                uri,
                volume,
            });
        }

        Ok(chapters)
    }

    /// Extracts the ordered page list of a chapter
    pub fn parse_pages(&self, chapter_uri: &str, html: &str) -> Result<Vec<Page>> {
        let document = Html::parse_document(html);
        let entries = selector(R::PAGES_CSS, chapter_uri)?;

        let mut pages = Vec::new();
        for (index, entry) in document.select(&entries).enumerate() {
            let Some(name) = R::page_name(&element_text(&entry), index + 1) else {
                continue;
            };
            let uri = R::page_uri(&self.base_uri, chapter_uri, &name, entry.value().attr("value"));

            if R::is_ad_page(&uri) {
                debug!("Skipping advertisement page {}", uri);
                continue;
            }

            pages.push(Page { name, uri });
        }

        Ok(pages)
    }

    /// Extracts the absolute image URL from a page, if the image is present
    pub fn parse_image(&self, page_uri: &str, html: &str) -> Result<Option<String>> {
        let document = Html::parse_document(html);
        let image = selector(R::IMAGE_CSS, page_uri)?;
        let base = Url::parse(page_uri)?;

        Ok(document
            .select(&image)
            .next()
            .and_then(|element| element.value().attr("src"))
            .and_then(|src| resolve_link(src, &base)))
    }
}

#[async_trait]
impl<R: SiteRules> SiteAdapter for HtmlSite<R> {
    fn name(&self) -> &str {
        R::NAME
    }

    fn title(&self) -> &str {
        &self.title
    }

    async fn list_chapters(&self) -> Result<Vec<Chapter>> {
        let title_uri = self.title_uri();
        debug!("Listing chapters from {}", title_uri);

        let html = self.fetch_html(&title_uri).await?;
        let chapters = self.parse_chapters(&html)?;

        if chapters.is_empty() {
            return Err(GetMangaError::NoChapters {
                title: self.input_title.clone(),
            });
        }
        Ok(chapters)
    }

    async fn list_pages(&self, chapter_uri: &str) -> Result<Vec<Page>> {
        let html = self.fetch_html(chapter_uri).await?;
        self.parse_pages(chapter_uri, &html)
    }

    async fn resolve_image_locator(&self, page_uri: &str) -> Result<Option<String>> {
        let mut last_error = None;

        for attempt in 1..=self.lookup_attempts {
            match self.fetch_html(page_uri).await {
                Ok(html) => {
                    if let Some(locator) = self.parse_image(page_uri, &html)? {
                        return Ok(Some(locator));
                    }
                    last_error = None;
                    warn!(
                        "No image on {} (attempt {}/{})",
                        page_uri, attempt, self.lookup_attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "Fetching {} failed (attempt {}/{}): {}",
                        page_uri, attempt, self.lookup_attempts, e
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn is_sequential_only(&self) -> bool {
        R::SEQUENTIAL_ONLY
    }
}
