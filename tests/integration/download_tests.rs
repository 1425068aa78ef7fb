//! Integration tests for chapter downloads
//!
//! These tests drive `ChapterDownloader` end-to-end with a scripted site
//! adapter and a wiremock server standing in for the image host.

use async_trait::async_trait;
use getmanga::download::{ChapterDownloader, Fetcher, RetryPolicy};
use getmanga::progress::ProgressSink;
use getmanga::state::{Chapter, ChapterOutcome, Page};
use getmanga::storage::FsLibrary;
use getmanga::{FetchError, GetMangaError, SiteAdapter};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Site adapter serving a fixed catalogue
///
/// Page `n` of chapter `c` lives at `<host>/pages/c<c>/<n>.html` and shows
/// the image `<host>/img/c<c>/<n>.png`.
struct ScriptedSite {
    chapters: Vec<Chapter>,
    pages: HashMap<String, Vec<Page>>,
    sequential: bool,
    lookup_delay: Duration,
    page_list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSite {
    fn new(host: &str, page_counts: &[usize]) -> Self {
        let mut chapters = Vec::new();
        let mut pages = HashMap::new();

        for (index, count) in page_counts.iter().enumerate() {
            let number = index + 1;
            let uri = format!("{}/pages/c{}/", host, number);
            let chapter_pages = (1..=*count)
                .map(|n| Page::new(n.to_string(), format!("{}{}.html", uri, n)))
                .collect();

            pages.insert(uri.clone(), chapter_pages);
            chapters.push(Chapter {
                number: number.to_string(),
                name: format!("scripted_c{:03}", number),
                uri,
                volume: None,
            });
        }

        Self {
            chapters,
            pages,
            sequential: false,
            lookup_delay: Duration::ZERO,
            page_list_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }
}

#[async_trait]
impl SiteAdapter for ScriptedSite {
    fn name(&self) -> &str {
        "scripted"
    }

    fn title(&self) -> &str {
        "scripted"
    }

    async fn list_chapters(&self) -> getmanga::Result<Vec<Chapter>> {
        Ok(self.chapters.clone())
    }

    async fn list_pages(&self, chapter_uri: &str) -> getmanga::Result<Vec<Page>> {
        self.page_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.get(chapter_uri).cloned().unwrap_or_default())
    }

    async fn resolve_image_locator(&self, page_uri: &str) -> getmanga::Result<Option<String>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(
            page_uri.replace("/pages/", "/img/").replace(".html", ".png"),
        ))
    }

    fn is_sequential_only(&self) -> bool {
        self.sequential
    }
}

/// Progress sink recording every notification
#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<(usize, usize)>>,
    finished: AtomicUsize,
}

impl ProgressSink for Recorder {
    fn update(&self, done: usize, total: usize) {
        self.updates.lock().unwrap().push((done, total));
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

async fn mount_image(server: &MockServer, image_path: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(image_path.as_bytes().to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

async fn mount_chapter(server: &MockServer, chapter: usize, pages: usize, delay: Duration) {
    for n in 1..=pages {
        mount_image(server, &format!("/img/c{}/{}.png", chapter, n), delay).await;
    }
}

fn downloader(site: &Arc<ScriptedSite>, library: &Path, concurrency: usize) -> ChapterDownloader {
    let fetcher = Fetcher::new(
        reqwest::Client::new(),
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
    );
    let adapter: Arc<dyn SiteAdapter> = site.clone();

    ChapterDownloader::new(adapter, Arc::new(fetcher), Arc::new(FsLibrary::new(library)))
        .with_concurrency(concurrency)
}

fn archive_entries(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn library_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_entries_follow_page_order_under_variable_latency() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Page 1 is slowest and page 3 fastest
    let delays = [300, 200, 0, 100, 50];
    for (index, millis) in delays.iter().enumerate() {
        mount_image(
            &server,
            &format!("/img/c1/{}.png", index + 1),
            Duration::from_millis(*millis),
        )
        .await;
    }

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[5]));
    let chapter = site.chapters[0].clone();

    let outcome = downloader(&site, dir.path(), 5)
        .download_chapter(&chapter)
        .await
        .unwrap();

    let path = match outcome {
        ChapterOutcome::Downloaded { path, pages } => {
            assert_eq!(pages, 5);
            path
        }
        other => panic!("expected a download, got {:?}", other),
    };

    assert_eq!(path, dir.path().join("scripted_c001.cbz"));
    assert_eq!(
        archive_entries(&path),
        vec!["001.png", "002.png", "003.png", "004.png", "005.png"]
    );
    assert_eq!(library_files(dir.path()), vec!["scripted_c001.cbz"]);
}

#[tokio::test]
async fn test_archive_entries_hold_image_bytes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_chapter(&server, 1, 2, Duration::ZERO).await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[2]));
    let chapter = site.chapters[0].clone();

    let outcome = downloader(&site, dir.path(), 2)
        .download_chapter(&chapter)
        .await
        .unwrap();

    let mut archive = zip::ZipArchive::new(File::open(outcome.path()).unwrap()).unwrap();
    let mut entry = archive.by_name("002.png").unwrap();
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut bytes).unwrap();

    assert_eq!(bytes, b"/img/c1/2.png");
}

#[tokio::test]
async fn test_failed_page_leaves_no_archive() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_image(&server, "/img/c1/1.png", Duration::ZERO).await;
    mount_image(&server, "/img/c1/2.png", Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/img/c1/3.png"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    mount_image(&server, "/img/c1/4.png", Duration::ZERO).await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[4]));
    let chapter = site.chapters[0].clone();

    let result = downloader(&site, dir.path(), 2).download_chapter(&chapter).await;

    match result {
        Err(GetMangaError::PageFailed { page, source, .. }) => {
            assert_eq!(page, "3");
            assert!(matches!(source, FetchError::Exhausted { attempts: 3, .. }));
        }
        other => panic!("expected a page failure, got {:?}", other),
    }
    assert!(library_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/img/c1/1.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[1]));
    let chapter = site.chapters[0].clone();

    let result = downloader(&site, dir.path(), 1).download_chapter(&chapter).await;

    assert!(matches!(
        result,
        Err(GetMangaError::PageFailed {
            source: FetchError::Status { status: 404, .. },
            ..
        })
    ));
    assert!(library_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_existing_archive_is_skipped_without_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = Arc::new(ScriptedSite::new(&server.uri(), &[3]));
    let chapter = site.chapters[0].clone();

    std::fs::write(dir.path().join("scripted_c001.cbz"), b"done").unwrap();
    let downloader = downloader(&site, dir.path(), 2);

    for _ in 0..2 {
        let outcome = downloader.download_chapter(&chapter).await.unwrap();
        assert!(outcome.is_skipped());
    }

    assert_eq!(site.page_list_calls.load(Ordering::SeqCst), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(
        std::fs::read(dir.path().join("scripted_c001.cbz")).unwrap(),
        b"done"
    );
}

#[tokio::test]
async fn test_empty_chapter_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let site = Arc::new(ScriptedSite::new(&server.uri(), &[0]));
    let chapter = site.chapters[0].clone();

    let result = downloader(&site, dir.path(), 2).download_chapter(&chapter).await;

    assert!(matches!(result, Err(GetMangaError::EmptyChapter { .. })));
    assert!(library_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_concurrency_cap_bounds_wall_clock_time() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let delay = Duration::from_millis(100);
    mount_chapter(&server, 1, 10, delay).await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[10]));
    let chapter = site.chapters[0].clone();

    let started = Instant::now();
    downloader(&site, dir.path(), 2)
        .download_chapter(&chapter)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // Ten pages through two slots take five rounds
    assert!(elapsed >= delay * 5, "finished too fast: {:?}", elapsed);
    assert!(elapsed < delay * 10, "pages were not fetched in parallel: {:?}", elapsed);
    assert!(site.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_sequential_site_fetches_one_page_at_a_time() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_chapter(&server, 1, 6, Duration::ZERO).await;

    let site = Arc::new(
        ScriptedSite::new(&server.uri(), &[6])
            .sequential()
            .with_lookup_delay(Duration::from_millis(20)),
    );
    let chapter = site.chapters[0].clone();

    downloader(&site, dir.path(), 4)
        .download_chapter(&chapter)
        .await
        .unwrap();

    assert_eq!(site.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parallel_site_uses_several_slots() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_chapter(&server, 1, 6, Duration::ZERO).await;

    let site = Arc::new(
        ScriptedSite::new(&server.uri(), &[6]).with_lookup_delay(Duration::from_millis(50)),
    );
    let chapter = site.chapters[0].clone();

    downloader(&site, dir.path(), 3)
        .download_chapter(&chapter)
        .await
        .unwrap();

    let max = site.max_in_flight.load(Ordering::SeqCst);
    assert!(max > 1 && max <= 3, "max in flight was {}", max);
}

#[tokio::test]
async fn test_batch_continues_after_failed_chapter() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_chapter(&server, 1, 2, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/img/c2/1.png"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_chapter(&server, 3, 2, Duration::ZERO).await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[2, 1, 2]));
    let chapters = site.chapters.clone();

    let report = downloader(&site, dir.path(), 2)
        .download_chapters(&chapters)
        .await;

    assert_eq!(report.downloaded(), 2);
    assert_eq!(report.failed(), 1);
    let failures: Vec<_> = report.failures().map(|(name, _)| name).collect();
    assert_eq!(failures, vec!["scripted_c002"]);
    assert_eq!(
        library_files(dir.path()),
        vec!["scripted_c001.cbz", "scripted_c003.cbz"]
    );
}

#[tokio::test]
async fn test_download_all_new_starts_after_last_archive() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_chapter(&server, 3, 1, Duration::ZERO).await;
    mount_chapter(&server, 4, 1, Duration::ZERO).await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[1, 1, 1, 1]));
    let chapters = site.chapters.clone();

    // Chapter 1 is missing but older than the newest archive
    std::fs::write(dir.path().join("scripted_c002.cbz"), b"done").unwrap();

    let report = downloader(&site, dir.path(), 2)
        .download_all_new(&chapters)
        .await;

    let names: Vec<_> = report.results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["scripted_c003", "scripted_c004"]);
    assert_eq!(report.downloaded(), 2);
    assert!(!dir.path().join("scripted_c001.cbz").exists());
}

#[tokio::test]
async fn test_progress_reports_every_archived_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_chapter(&server, 1, 3, Duration::ZERO).await;

    let site = Arc::new(ScriptedSite::new(&server.uri(), &[3]));
    let chapter = site.chapters[0].clone();
    let recorder = Arc::new(Recorder::default());

    downloader(&site, dir.path(), 2)
        .with_progress(recorder.clone())
        .download_chapter(&chapter)
        .await
        .unwrap();

    assert_eq!(
        *recorder.updates.lock().unwrap(),
        vec![(0, 3), (1, 3), (2, 3), (3, 3)]
    );
    assert_eq!(recorder.finished.load(Ordering::SeqCst), 1);
}
