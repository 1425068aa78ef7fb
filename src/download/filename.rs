//! Archive entry and chapter file naming
//!
//! Page names are rewritten so that lexicographic order inside the archive
//! matches numeric page order, and image extensions are checked against a
//! whitelist before they become part of an entry name.

use regex::Regex;
use std::sync::OnceLock;

/// Extensions accepted as-is; anything else is stored as `jpg`
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpeg", "jpg", "tif", "tiff", "pdf", "gif", "webp", "bmp",
];

const FALLBACK_EXTENSION: &str = "jpg";

/// Minimum width of every digit run in page names and chapter numbers
const PAD_WIDTH: usize = 3;

fn digit_runs() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new("[0-9]+").expect("valid digit pattern"))
}

fn pad(digits: &str) -> String {
    format!("{:0>width$}", digits, width = PAD_WIDTH)
}

/// Zero-pads every run of digits in a page name to at least three digits
///
/// # Examples
///
/// ```
/// use getmanga::download::normalize_page_name;
///
/// assert_eq!(normalize_page_name("9"), "009");
/// assert_eq!(normalize_page_name("7-8"), "007-008");
/// assert_eq!(normalize_page_name("1234"), "1234");
/// ```
pub fn normalize_page_name(name: &str) -> String {
    digit_runs()
        .replace_all(name, |caps: &regex::Captures<'_>| pad(&caps[0]))
        .into_owned()
}

/// Resolves the file extension of an image locator
///
/// The query string is stripped before looking at the text after the last
/// `.`; unknown extensions fall back to `jpg`.
pub fn image_extension(locator: &str) -> String {
    let without_query = locator.split('?').next().unwrap_or(locator);
    let candidate = without_query.rsplit('.').next().unwrap_or_default();

    if IMAGE_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(candidate))
    {
        candidate.to_string()
    } else {
        FALLBACK_EXTENSION.to_string()
    }
}

/// Builds the archive entry name for a page, e.g. `007-008.png`
pub fn entry_name(page_name: &str, locator: &str) -> String {
    format!("{}.{}", normalize_page_name(page_name), image_extension(locator))
}

/// Pads the integer part of a chapter number, keeping any decimal part
///
/// `6` becomes `006` and `2.3` becomes `002.3`.
pub fn pad_chapter_number(number: &str) -> String {
    let number = number.trim();
    match number.split_once('.') {
        Some((integer, decimal)) => format!("{}.{}", pad(integer), decimal),
        None => pad(number),
    }
}

/// Derives the archive stem of a chapter from the site title, volume and number
///
/// # Examples
///
/// ```
/// use getmanga::download::chapter_stem;
///
/// assert_eq!(chapter_stem("one-piece", "6", None), "one_piece_c006");
/// assert_eq!(chapter_stem("Bleach", "2.5", Some("v01")), "bleach_v01_c002.5");
/// ```
pub fn chapter_stem(title: &str, number: &str, volume: Option<&str>) -> String {
    let clean_title = title.to_lowercase().replace('-', "_");
    let number = pad_chapter_number(number);

    match volume {
        Some(volume) => format!("{}_{}_c{}", clean_title, volume, number),
        None => format!("{}_c{}", clean_title, number),
    }
}
