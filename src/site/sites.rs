//! Bundled site definitions

use super::parser::{cached, last_decimal_number, last_number, slug, split_title_id};
use super::rules::SiteRules;
use regex::{NoExpand, Regex};
use std::sync::OnceLock;

pub struct MangaHere;

impl SiteRules for MangaHere {
    const NAME: &'static str = "mangahere";
    const BASE_URI: &'static str = "http://www.mangahere.cc";
    const CHAPTERS_CSS: &'static str = "div.detail_list ul li a";
    const PAGES_CSS: &'static str = "section.readpage_top div.go_page select option";
    const IMAGE_CSS: &'static str = "img#image";

    // Blocks clients that open several connections at once
    const SEQUENTIAL_ONLY: bool = true;

    fn is_ad_page(page_uri: &str) -> bool {
        page_uri.to_lowercase().contains("featured.htm")
    }
}

pub struct MangaFox;

impl SiteRules for MangaFox {
    const NAME: &'static str = "mangafox";
    const BASE_URI: &'static str = "http://mangafox.me";
    const CHAPTERS_CSS: &'static str = "a.tips";
    const PAGES_CSS: &'static str = "#top_bar option";
    const IMAGE_CSS: &'static str = "img#image";

    fn page_name(text: &str, _position: usize) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || text == "Comments" {
            return None;
        }
        Some(text.to_string())
    }

    fn page_uri(_base: &str, chapter_uri: &str, page_name: &str, _value: Option<&str>) -> String {
        static PAGE_FILE: OnceLock<Regex> = OnceLock::new();
        let re = cached(&PAGE_FILE, r"[0-9]+\.html$");
        let page_file = format!("{}.html", page_name);
        re.replace(chapter_uri, NoExpand(&page_file)).into_owned()
    }
}

pub struct MangaReader;

impl SiteRules for MangaReader {
    const NAME: &'static str = "mangareader";
    const BASE_URI: &'static str = "http://www.mangareader.net";
    const CHAPTERS_CSS: &'static str = "#chapterlist td a";
    const PAGES_CSS: &'static str = "div#selectpage option";
    const IMAGE_CSS: &'static str = "img#img";
    const DESCENDING: bool = false;

    fn title(input: &str) -> String {
        input
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .filter(|c| *c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect()
    }

    fn title_uri(base: &str, input: &str) -> String {
        format!("{}/{}", base, Self::title(input))
    }

    fn page_uri(_base: &str, chapter_uri: &str, page_name: &str, _value: Option<&str>) -> String {
        // Older chapters live at `<id>-<chapter>-<page>/<title>-chapter-<n>.html`
        if chapter_uri.ends_with(".html") {
            static PAGE_SEGMENT: OnceLock<Regex> = OnceLock::new();
            let re = cached(&PAGE_SEGMENT, r"-[0-9]+/");
            let segment = format!("-{}/", page_name);
            re.replace(chapter_uri, NoExpand(&segment)).into_owned()
        } else {
            format!("{}/{}", chapter_uri, page_name)
        }
    }
}

/// Titles are given as `title:id`, the index is addressed by id
pub struct MangaDex;

impl SiteRules for MangaDex {
    const NAME: &'static str = "mangadex";
    const BASE_URI: &'static str = "https://mangadex.org";
    const CHAPTERS_CSS: &'static str = "div[id|=content] td a[data-chapter-num]";
    const PAGES_CSS: &'static str = "select[id|=jump_page] option[value]";
    const IMAGE_CSS: &'static str = "div[id|=content] img[id|=current_page]";

    fn title(input: &str) -> String {
        slug(split_title_id(input).0, "_")
    }

    fn title_uri(base: &str, input: &str) -> String {
        format!("{}/manga/{}", base, split_title_id(input).1)
    }

    fn chapter_number(text: &str, _href: &str) -> Option<String> {
        last_decimal_number(text)
    }

    fn page_name(text: &str, _position: usize) -> Option<String> {
        last_number(text)
    }

    fn page_uri(_base: &str, chapter_uri: &str, _page_name: &str, value: Option<&str>) -> String {
        let separator = if chapter_uri.ends_with('/') { "" } else { "/" };
        format!("{}{}{}", chapter_uri, separator, value.unwrap_or_default())
    }
}

/// Titles are given as `title:id`
pub struct CartoonMad;

impl SiteRules for CartoonMad {
    const NAME: &'static str = "cartoonmad";
    const BASE_URI: &'static str = "http://www.cartoonmad.com";
    const CHAPTERS_CSS: &'static str = "fieldset[id|=info] td a";
    const PAGES_CSS: &'static str = "tr td center li select option[value]";
    const IMAGE_CSS: &'static str =
        "td[align|=center] table td[align|=center] a img[oncontextmenu]";
    const DESCENDING: bool = false;

    fn title(input: &str) -> String {
        slug(split_title_id(input).0, "_")
    }

    fn title_uri(base: &str, input: &str) -> String {
        format!("{}/comic/{}.html", base, split_title_id(input).1)
    }

    fn chapter_number(text: &str, _href: &str) -> Option<String> {
        last_number(text)
    }

    fn page_name(text: &str, _position: usize) -> Option<String> {
        last_number(text)
    }

    fn page_uri(base: &str, _chapter_uri: &str, _page_name: &str, value: Option<&str>) -> String {
        format!("{}/comic/{}", base, value.unwrap_or_default())
    }
}

pub struct RawMangaUpdate;

impl SiteRules for RawMangaUpdate {
    const NAME: &'static str = "rawmangaupdate";
    const BASE_URI: &'static str = "http://rawmangaupdate.com";
    const CHAPTERS_CSS: &'static str = "ul.chapters h5 a";
    const PAGES_CSS: &'static str = "div[class|=page-nav] select[id|=page-list] option";
    const IMAGE_CSS: &'static str = "div[id|=ppp] img";

    fn title(input: &str) -> String {
        static SEPARATORS: OnceLock<Regex> = OnceLock::new();
        let re = cached(&SEPARATORS, r"[^a-z0-9]+");
        re.replace_all(&input.to_lowercase(), "-").into_owned()
    }

    fn chapter_number(text: &str, _href: &str) -> Option<String> {
        last_number(text)
    }

    fn page_uri(_base: &str, chapter_uri: &str, page_name: &str, _value: Option<&str>) -> String {
        format!("{}/{}", chapter_uri, page_name)
    }
}
