//! HTML and text helpers shared by site adapters
//!
//! This module handles:
//! - Compiling CSS selectors
//! - Resolving relative links against a base URL
//! - Pulling numbers and slugs out of link texts and user input

use crate::GetMangaError;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use url::Url;

/// Compiles a CSS selector, reporting failures against `url`
pub(crate) fn selector(css: &str, url: &str) -> Result<Selector, GetMangaError> {
    Selector::parse(css).map_err(|e| GetMangaError::HtmlParse {
        url: url.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Concatenated text content of an element
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, data: schemes
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

pub(crate) fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid built-in pattern"))
}

/// Last whole number in a text, ignoring trailing non-digits
///
/// `"Grand Blue 42 (raw)"` yields `42`.
pub fn last_number(text: &str) -> Option<String> {
    static LAST_NUMBER: OnceLock<Regex> = OnceLock::new();
    cached(&LAST_NUMBER, r"\b([0-9]+)\b[^0-9]*$")
        .captures(text.trim())
        .map(|caps| caps[1].to_string())
}

/// Like [`last_number`], but keeps a decimal part such as `12.5`
pub fn last_decimal_number(text: &str) -> Option<String> {
    static LAST_DECIMAL: OnceLock<Regex> = OnceLock::new();
    cached(&LAST_DECIMAL, r"\b([0-9][0-9.]*)\b[^0-9]*$")
        .captures(text.trim())
        .map(|caps| caps[1].to_string())
}

/// Volume segment of a chapter link, e.g. `v01` in `/manga/x/v01/c006/`
pub fn volume_segment(href: &str) -> Option<String> {
    static VOLUME: OnceLock<Regex> = OnceLock::new();
    cached(&VOLUME, r"/(v[0-9.]+)/c[0-9]")
        .captures(href)
        .map(|caps| caps[1].to_string())
}

/// Lowercase slug: trims non-alphanumerics from both ends and collapses
/// every other run of them into `separator`
pub fn slug(input: &str, separator: &str) -> String {
    static EDGES: OnceLock<Regex> = OnceLock::new();
    static RUNS: OnceLock<Regex> = OnceLock::new();

    let lower = input.to_lowercase();
    let trimmed = cached(&EDGES, r"^[^a-z0-9]+|[^a-z0-9]+$").replace_all(&lower, "");
    cached(&RUNS, r"[^a-z0-9]+")
        .replace_all(&trimmed, regex::NoExpand(separator))
        .into_owned()
}

/// Splits `"title:id"` input into its title and id parts
///
/// Input without a colon is treated as a bare id with an empty title.
pub fn split_title_id(input: &str) -> (&str, &str) {
    match input.rsplit_once(':') {
        Some((title, id)) => (title.trim(), id.trim()),
        None => ("", input.trim()),
    }
}
