//! Per-site extraction rules
//!
//! A site is described by a handful of CSS selectors plus small pure
//! functions that turn link texts and attributes into chapter numbers,
//! page names and page URLs. The defaults cover the most common layout
//! (`/manga/<title>/` index, descending chapter list, `<chapter>/<page>.html`
//! page URLs); each site overrides what differs.

use super::parser::{slug, volume_segment};

pub trait SiteRules: Send + Sync + 'static {
    /// Name used on the command line
    const NAME: &'static str;

    /// Scheme and host, without a trailing slash
    const BASE_URI: &'static str;

    /// Selects the chapter links on the title index page
    const CHAPTERS_CSS: &'static str;

    /// Selects the page entries (usually `<option>`s) on a chapter page
    const PAGES_CSS: &'static str;

    /// Selects the `<img>` holding the page image
    const IMAGE_CSS: &'static str;

    /// Whether the index lists the newest chapter first
    const DESCENDING: bool = true;

    /// Whether the site blocks concurrent page fetches
    const SEQUENTIAL_ONLY: bool = false;

    /// Normalized title used in URLs and archive names
    fn title(input: &str) -> String {
        slug(input, "_")
    }

    /// URL of the title's chapter index
    fn title_uri(base: &str, input: &str) -> String {
        format!("{}/manga/{}/", base, Self::title(input))
    }

    /// Chapter number from the link text; None skips the link
    fn chapter_number(text: &str, _href: &str) -> Option<String> {
        text.trim()
            .split(' ')
            .last()
            .filter(|word| !word.is_empty())
            .map(str::to_string)
    }

    fn chapter_volume(href: &str) -> Option<String> {
        volume_segment(href)
    }

    /// Page name from the entry text and its 1-based position; None skips it
    fn page_name(text: &str, _position: usize) -> Option<String> {
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// URL of the HTML page holding one image
    ///
    /// `value` is the entry's `value` attribute, if any.
    fn page_uri(_base: &str, chapter_uri: &str, page_name: &str, _value: Option<&str>) -> String {
        format!("{}{}.html", chapter_uri, page_name)
    }

    /// True for pages that carry an advertisement instead of an image
    fn is_ad_page(_page_uri: &str) -> bool {
        false
    }
}
