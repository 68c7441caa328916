//! Crawl scheduler behaviour over an in-memory site

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitemigrate::config::PaginatedSection;
use sitemigrate::content_saver::{IMAGES_KEY, SITE_MAP_KEY, read_json, write_json};
use sitemigrate::crawl_engine::{
    ContentType, CrawlError, CrawlSummary, NoOpProgress, ProgressReporter, SiteMapEntry, VisitOutcome,
    crawl_site,
};
use sitemigrate::{MemoryBlobStore, RawPageRecord};
use tokio::time::Instant;

mod common;
use common::{FakeSite, create_test_html, page_with_links, test_config, test_config_with, url};

/// Records page outcomes, checkpoints and pagination reports
#[derive(Clone, Default)]
struct RecordingProgress {
    pages: Arc<Mutex<Vec<(String, VisitOutcome)>>>,
    checkpoints: Arc<Mutex<Vec<usize>>>,
    pagination: Arc<Mutex<Vec<(String, usize)>>>,
}

impl ProgressReporter for RecordingProgress {
    fn report_started(&self, _seed_url: &str, _resumed: usize) {}

    fn report_pagination(&self, section: &str, total_pages: usize, _links: usize) {
        self.pagination.lock().unwrap().push((section.to_string(), total_pages));
    }

    fn report_page(&self, _index: usize, url: &str, _content_type: ContentType, outcome: VisitOutcome) {
        self.pages.lock().unwrap().push((url.to_string(), outcome));
    }

    fn report_checkpoint(&self, entries: usize) {
        self.checkpoints.lock().unwrap().push(entries);
    }

    fn report_completed(&self, _summary: &CrawlSummary) {}

    fn report_error(&self, _error: &str) {}
}

fn small_site() -> FakeSite {
    FakeSite::new()
        .page(
            "/",
            page_with_links(
                "Home",
                &[
                    "/about/",
                    "/news/spring-gala",
                    "/about#team",
                    "https://other.org/elsewhere",
                    "/files/annual-report.pdf",
                ],
            ),
        )
        .page("/about", page_with_links("About Us", &["/", "/news/spring-gala"]))
        .page(
            "/news/spring-gala",
            create_test_html(
                "Spring Gala | Example",
                r#"<article><h1 class="entry-title">Spring Gala</h1>
                   <time datetime="2024-03-01">March 1, 2024</time>
                   <div class="entry-content"><p>We met.</p><img src="/uploads/gala.jpg" alt="Gala"></div>
                   </article>"#,
            ),
        )
}

#[tokio::test]
async fn test_crawl_visits_each_url_once() {
    let site = small_site();
    let store = MemoryBlobStore::new();
    let config = test_config(&["/"]);

    let summary = crawl_site(&config, &site, &store, NoOpProgress).await.unwrap();

    assert_eq!(summary.success, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.errors, 0);

    // The seed is fetched once up front for the navigation tree
    assert_eq!(site.open_count(&url("/")), 2);
    assert_eq!(site.open_count(&url("/about")), 1);
    assert_eq!(site.open_count(&url("/news/spring-gala")), 1);
    assert!(site.opened().iter().all(|u| u.starts_with("https://example.org/")));
    assert!(!site.opened().iter().any(|u| u.ends_with(".pdf")));

    let keys = store.keys().await;
    assert!(keys.contains(&"pages/index".to_string()));
    assert!(keys.contains(&"pages/about".to_string()));
    assert!(keys.contains(&"news/news--spring-gala".to_string()));
    assert!(keys.contains(&"navigation".to_string()));

    let site_map: Vec<SiteMapEntry> = read_json(&store, SITE_MAP_KEY).await.unwrap().unwrap();
    assert_eq!(site_map.len(), 3);
    let news = site_map.iter().find(|e| e.url == url("/news/spring-gala")).unwrap();
    assert_eq!(news.content_type, ContentType::News);
    assert_eq!(news.title, "Spring Gala");

    let images: Vec<String> = read_json(&store, IMAGES_KEY).await.unwrap().unwrap();
    assert_eq!(images, vec![url("/uploads/gala.jpg")]);

    let record: RawPageRecord = read_json(&store, "news/news--spring-gala").await.unwrap().unwrap();
    assert_eq!(record.url, url("/news/spring-gala"));
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_crawl() {
    let site = FakeSite::new()
        .page("/", page_with_links("Home", &["/missing", "/broken", "/silent", "/about"]))
        .status("/missing", Some(404), create_test_html("Not Found", "<h1>Not Found</h1>"))
        .status("/silent", None, create_test_html("", ""))
        .page("/about", page_with_links("About", &[]));
    let store = MemoryBlobStore::new();
    let progress = RecordingProgress::default();

    let summary = crawl_site(&test_config(&["/"]), &site, &store, progress.clone())
        .await
        .unwrap();

    assert_eq!(summary.success, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.errors, 1);

    let pages = progress.pages.lock().unwrap().clone();
    assert!(pages.contains(&(url("/missing"), VisitOutcome::Skipped)));
    assert!(pages.contains(&(url("/silent"), VisitOutcome::Skipped)));
    assert!(pages.contains(&(url("/broken"), VisitOutcome::Error)));

    let keys = store.keys().await;
    assert!(!keys.contains(&"pages/missing".to_string()));
    assert!(!keys.contains(&"pages/broken".to_string()));

    // Failures stay out of the site-map so a resumed run retries them
    let site_map: Vec<SiteMapEntry> = read_json(&store, SITE_MAP_KEY).await.unwrap().unwrap();
    assert_eq!(site_map.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_request_delay_spaces_every_cycle() {
    let site = FakeSite::new()
        .page("/", page_with_links("Home", &["/about", "/missing", "/broken", "/contact"]))
        .page("/about", page_with_links("About", &[]))
        .status("/missing", Some(404), create_test_html("Not Found", "<h1>Not Found</h1>"))
        .page("/contact", page_with_links("Contact", &[]));
    let store = MemoryBlobStore::new();
    let delay = Duration::from_millis(500);
    let config = test_config_with(&["/"], Vec::new(), |b| b.request_delay_ms(500));

    let start = Instant::now();
    let summary = crawl_site(&config, &site, &store, NoOpProgress).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(summary.visited(), 5);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.skipped, 1);
    // Seed navigation fetch plus five dequeues: six cycles, five gaps
    assert!(elapsed >= delay * 5, "elapsed {elapsed:?}");
    assert!(elapsed < delay * 6, "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_page_budget_limits_dequeues() {
    let site = FakeSite::new()
        .page("/", page_with_links("Home", &["/a", "/b", "/c", "/d"]))
        .page("/a", page_with_links("A", &[]))
        .page("/b", page_with_links("B", &[]))
        .page("/c", page_with_links("C", &[]))
        .page("/d", page_with_links("D", &[]));
    let store = MemoryBlobStore::new();
    let config = test_config_with(&["/"], Vec::new(), |b| b.max_pages(2));

    let summary = crawl_site(&config, &site, &store, NoOpProgress).await.unwrap();

    assert_eq!(summary.visited(), 2);
    assert_eq!(site.open_count(&url("/c")), 0);
    assert_eq!(site.open_count(&url("/d")), 0);
}

#[tokio::test]
async fn test_resume_skips_previously_visited_urls() {
    let site = FakeSite::new()
        .page("/", page_with_links("Home", &["/about", "/contact"]))
        .page("/about", page_with_links("About", &["/history"]))
        .page("/contact", page_with_links("Contact", &["/history"]))
        .page("/history", page_with_links("History", &[]));
    let store = MemoryBlobStore::new();

    let prior = vec![SiteMapEntry {
        url: url("/about"),
        content_type: ContentType::Page,
        title: "About".to_string(),
    }];
    write_json(&store, SITE_MAP_KEY, &prior).await.unwrap();
    write_json(&store, IMAGES_KEY, &vec![url("/uploads/old.png")])
        .await
        .unwrap();

    let config = test_config_with(&["/"], Vec::new(), |b| b.resume(true));
    let summary = crawl_site(&config, &site, &store, NoOpProgress).await.unwrap();

    assert_eq!(summary.resumed, 1);
    assert_eq!(site.open_count(&url("/about")), 0);
    // Reachable through a fresh page, so still crawled
    assert_eq!(site.open_count(&url("/history")), 1);

    let site_map: Vec<SiteMapEntry> = read_json(&store, SITE_MAP_KEY).await.unwrap().unwrap();
    let urls: Vec<&str> = site_map.iter().map(|e| e.url.as_str()).collect();
    assert!(urls.contains(&url("/about").as_str()));
    assert!(urls.contains(&url("/contact").as_str()));
    assert_eq!(site_map.len(), 4);

    let images: Vec<String> = read_json(&store, IMAGES_KEY).await.unwrap().unwrap();
    assert!(images.contains(&url("/uploads/old.png")));
}

#[tokio::test]
async fn test_unreachable_seed_aborts_the_run() {
    let store = MemoryBlobStore::new();

    let result = crawl_site(&test_config(&["/"]), &FakeSite::new(), &store, NoOpProgress).await;
    assert!(matches!(result, Err(CrawlError::SeedUnreachable { .. })));

    let failing = FakeSite::new().status("/", Some(503), create_test_html("Down", ""));
    let result = crawl_site(&test_config(&["/"]), &failing, &store, NoOpProgress).await;
    assert!(matches!(result, Err(CrawlError::SeedUnreachable { .. })));
    assert_eq!(failing.opened(), vec![url("/")]);
}

#[tokio::test]
async fn test_site_map_is_checkpointed() {
    let site = FakeSite::new()
        .page("/", page_with_links("Home", &["/a", "/b"]))
        .page("/a", page_with_links("A", &[]))
        .page("/b", page_with_links("B", &[]));
    let store = MemoryBlobStore::new();
    let progress = RecordingProgress::default();
    let config = test_config_with(&["/"], Vec::new(), |b| b.checkpoint_interval(2));

    crawl_site(&config, &site, &store, progress.clone()).await.unwrap();

    assert_eq!(*progress.checkpoints.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn test_paginated_section_links_are_crawled() {
    let listing = |items: &[&str]| page_with_links("News", items);
    let site = FakeSite::new()
        .page("/", page_with_links("Home", &[]))
        .paginated(
            "/news",
            vec![listing(&["/news/first"]), listing(&["/news/second"])],
        )
        .page("/news/first", page_with_links("First", &[]))
        .page("/news/second", page_with_links("Second", &[]));
    let store = MemoryBlobStore::new();
    let progress = RecordingProgress::default();
    let config = test_config_with(
        &["/"],
        vec![PaginatedSection::new("/news", ".pagination a")],
        |b| b,
    );

    crawl_site(&config, &site, &store, progress.clone()).await.unwrap();

    assert_eq!(*progress.pagination.lock().unwrap(), vec![("/news".to_string(), 2)]);
    assert_eq!(site.open_count(&url("/news/second")), 1);
    assert!(store.keys().await.contains(&"news/news--second".to_string()));
}
