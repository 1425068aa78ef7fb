/// Chapter and page definitions plus the outcomes of downloading them
use std::fmt;
use std::path::PathBuf;

use crate::GetMangaError;

/// One downloadable chapter as listed by a site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter number exactly as the site prints it (may carry a decimal part)
    pub number: String,

    /// Archive stem, e.g. `one_piece_v01_c006`
    pub name: String,

    /// Absolute URL of the chapter's first page
    pub uri: String,

    /// Volume label such as `v01`, when the site exposes one
    pub volume: Option<String>,
}

impl Chapter {
    /// Returns true if this chapter matches the number given on the command line
    ///
    /// Numbers are compared numerically when both sides parse, so `6`
    /// matches `006` and `6.0`.
    pub fn matches_number(&self, number: &str) -> bool {
        match (self.number.parse::<f64>(), number.trim().parse::<f64>()) {
            (Ok(ours), Ok(theirs)) => ours == theirs,
            _ => self.number == number.trim(),
        }
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.volume {
            Some(volume) => write!(f, "{} {} ({})", volume, self.number, self.name),
            None => write!(f, "{} ({})", self.number, self.name),
        }
    }
}

/// One image-bearing page of a chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Site-local page identifier, before normalization
    pub name: String,

    /// Absolute URL of the HTML page holding the image
    pub uri: String,
}

impl Page {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }
}

/// Successful result of one chapter download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// A new archive was written
    Downloaded {
        /// Final archive location
        path: PathBuf,
        /// Number of page entries in the archive
        pages: usize,
    },

    /// The archive already existed; nothing was fetched
    Skipped {
        /// Existing archive location
        path: PathBuf,
    },
}

impl ChapterOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Downloaded { path, .. } | Self::Skipped { path } => path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Per-chapter results of a multi-chapter run
///
/// A failed chapter never stops the batch; its error is recorded here instead.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<(String, Result<ChapterOutcome, GetMangaError>)>,
}

impl BatchReport {
    pub fn record(&mut self, chapter: &Chapter, result: Result<ChapterOutcome, GetMangaError>) {
        self.results.push((chapter.name.clone(), result));
    }

    pub fn downloaded(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(ChapterOutcome::Downloaded { .. })))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(ChapterOutcome::Skipped { .. })))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the failed chapters with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &GetMangaError)> {
        self.results
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(number: &str) -> Chapter {
        Chapter {
            number: number.to_string(),
            name: format!("title_c{}", number),
            uri: format!("https://example.com/c{}/", number),
            volume: None,
        }
    }

    #[test]
    fn test_matches_number_numeric() {
        let ch = chapter("6");
        assert!(ch.matches_number("6"));
        assert!(ch.matches_number("006"));
        assert!(ch.matches_number("6.0"));
        assert!(!ch.matches_number("7"));
    }

    #[test]
    fn test_matches_number_decimal() {
        let ch = chapter("2.5");
        assert!(ch.matches_number("2.5"));
        assert!(!ch.matches_number("2"));
    }

    #[test]
    fn test_matches_number_non_numeric() {
        let ch = chapter("extra");
        assert!(ch.matches_number("extra"));
        assert!(!ch.matches_number("1"));
    }

    #[test]
    fn test_display_with_volume() {
        let mut ch = chapter("12");
        ch.volume = Some("v02".to_string());
        assert_eq!(ch.to_string(), "v02 12 (title_c12)");
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::default();
        report.record(
            &chapter("1"),
            Ok(ChapterOutcome::Skipped {
                path: PathBuf::from("title_c1.cbz"),
            }),
        );
        report.record(
            &chapter("2"),
            Ok(ChapterOutcome::Downloaded {
                path: PathBuf::from("title_c2.cbz"),
                pages: 20,
            }),
        );
        report.record(
            &chapter("3"),
            Err(GetMangaError::EmptyChapter {
                chapter: "title_c3".to_string(),
            }),
        );

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.downloaded(), 1);
        assert_eq!(report.failed(), 1);

        let failures: Vec<_> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["title_c3"]);
    }
}
