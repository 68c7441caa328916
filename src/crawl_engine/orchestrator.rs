//! Crawl scheduler: the single-threaded breadth-first crawl loop.
//!
//! One page is opened, extracted and persisted at a time, and the frontier
//! only changes between fetches. The run is aborted only by setup failures
//! (store not writable, seed unreachable, prior site-map unreadable); every
//! per-page failure is recorded as a [`VisitOutcome`] and the loop moves on.

use std::collections::BTreeSet;

use log::{debug, info, warn};

use super::content_classifier::{ContentType, classify_url};
use super::crawl_types::{CrawlError, CrawlResult, SiteMapEntry, VisitOutcome};
use super::frontier::Frontier;
use super::page_timeout::with_page_timeout;
use super::pagination::{PaginationLimits, discover_paginated_links};
use super::progress::{CrawlSummary, ProgressReporter};
use super::rate_limiter::CrawlDelay;
use crate::config::{MigrationConfig, PaginatedSection};
use crate::content_saver::{BlobStore, IMAGES_KEY, NAVIGATION_KEY, SITE_MAP_KEY, read_json, record_key, write_json};
use crate::page_extractor::{HtmlDocument, build_record, extract_navigation, navigation_links};
use crate::render::{PageRenderer, RenderedPage};
use crate::utils::{UrlNormalizer, page_slug};

pub struct Scheduler<'a, R, S, P> {
    config: &'a MigrationConfig,
    renderer: &'a R,
    store: &'a S,
    progress: P,
    normalizer: UrlNormalizer,
    frontier: Frontier,
    delay: CrawlDelay,
    /// Prior entries (on resume) followed by this run's successes
    site_map: Vec<SiteMapEntry>,
    images: BTreeSet<String>,
    summary: CrawlSummary,
}

impl<'a, R, S, P> Scheduler<'a, R, S, P>
where
    R: PageRenderer,
    S: BlobStore,
    P: ProgressReporter,
{
    pub fn new(config: &'a MigrationConfig, renderer: &'a R, store: &'a S, progress: P) -> CrawlResult<Self> {
        let normalizer = config
            .url_normalizer()
            .map_err(|e| CrawlError::Setup(format!("{e:#}")))?;

        Ok(Self {
            config,
            renderer,
            store,
            progress,
            normalizer,
            frontier: Frontier::new(),
            delay: CrawlDelay::new(config.request_delay()),
            site_map: Vec::new(),
            images: BTreeSet::new(),
            summary: CrawlSummary::default(),
        })
    }

    /// Run the crawl to completion and return its summary
    pub async fn run(mut self) -> CrawlResult<CrawlSummary> {
        self.store
            .prepare()
            .await
            .map_err(|e| CrawlError::Setup(format!("{e:#}")))?;

        if self.config.resume() {
            self.load_prior_run().await?;
        }

        let seed_url = self
            .normalizer
            .normalize(self.config.site_url())
            .unwrap_or_else(|| self.normalizer.base().to_string());
        self.progress.report_started(&seed_url, self.summary.resumed);

        self.capture_navigation(&seed_url).await?;

        for path in self.config.seed_paths() {
            match self.normalizer.normalize(path) {
                Some(url) => {
                    self.frontier.enqueue(url);
                }
                None => warn!(target: "sitemigrate::crawl", "Ignoring seed path outside the site: {path}"),
            }
        }

        for section in self.config.paginated_sections() {
            self.discover_section(section).await;
        }

        self.crawl_loop().await?;
        self.finish().await
    }

    /// Pre-seed the visited set and the manifests from a prior run
    async fn load_prior_run(&mut self) -> CrawlResult<()> {
        let prior: Vec<SiteMapEntry> = read_json(self.store, SITE_MAP_KEY)
            .await
            .map_err(|e| CrawlError::Storage(format!("Failed to load prior site-map: {e:#}")))?
            .unwrap_or_default();

        for entry in &prior {
            self.frontier.mark_visited(entry.url.clone());
        }
        self.summary.resumed = prior.len();
        self.site_map = prior;

        let prior_images: Vec<String> = read_json(self.store, IMAGES_KEY)
            .await
            .map_err(|e| CrawlError::Storage(format!("Failed to load prior image manifest: {e:#}")))?
            .unwrap_or_default();
        self.images.extend(prior_images);

        info!(
            target: "sitemigrate::crawl",
            "Loaded {} visited URLs and {} images from prior run",
            self.summary.resumed,
            self.images.len()
        );
        Ok(())
    }

    /// Fetch the seed once: proves the site is reachable and captures the nav tree
    async fn capture_navigation(&mut self, seed_url: &str) -> CrawlResult<()> {
        let unreachable = |reason: String| CrawlError::SeedUnreachable {
            url: seed_url.to_string(),
            reason,
        };

        self.delay.wait().await;
        let page = self
            .open(seed_url)
            .await
            .map_err(|e| unreachable(format!("{e:#}")))?;

        let status = page.status();
        let html = match status {
            Some(code) if code < 400 => page.html().await,
            Some(code) => Err(anyhow::anyhow!("HTTP status {code}")),
            None => Err(anyhow::anyhow!("no response")),
        };
        close_page(page).await;
        let html = html.map_err(|e| unreachable(format!("{e:#}")))?;

        let navigation = {
            let doc = HtmlDocument::parse(&html);
            extract_navigation(&doc, self.normalizer.base())
        };
        write_json(self.store, NAVIGATION_KEY, &navigation)
            .await
            .map_err(|e| CrawlError::Storage(format!("{e:#}")))?;

        let added = self
            .frontier
            .enqueue_all(navigation_links(&navigation, &self.normalizer));
        debug!(
            target: "sitemigrate::crawl",
            "Navigation: {} top-level items, {added} new URLs queued",
            navigation.len()
        );
        Ok(())
    }

    /// Run pagination discovery for one listing section; failures are logged
    async fn discover_section(&mut self, section: &PaginatedSection) {
        let Some(url) = self.normalizer.normalize(&section.path) else {
            self.progress
                .report_error(&format!("Paginated section outside the site: {}", section.path));
            return;
        };

        let limits = PaginationLimits {
            max_pages: self.config.max_pagination_pages(),
            settle_timeout: self.config.settle_timeout(),
            settle_poll: self.config.settle_poll(),
        };

        self.delay.wait().await;
        let page = match self.open(&url).await {
            Ok(page) => page,
            Err(e) => {
                self.progress
                    .report_error(&format!("Pagination discovery failed for {url}: {e:#}"));
                return;
            }
        };

        let result = if page.status().is_some_and(|code| code < 400) {
            discover_paginated_links(&page, &section.control_selector, limits, &self.normalizer).await
        } else {
            Err(anyhow::anyhow!("listing returned status {:?}", page.status()))
        };
        close_page(page).await;

        match result {
            Ok(outcome) => {
                self.frontier.enqueue_all(outcome.links.iter().cloned());
                self.progress
                    .report_pagination(&section.path, outcome.total_pages, outcome.links.len());
            }
            Err(e) => {
                self.progress
                    .report_error(&format!("Pagination discovery failed for {url}: {e:#}"));
            }
        }
    }

    async fn crawl_loop(&mut self) -> CrawlResult<()> {
        let max_pages = self.config.max_pages();
        let checkpoint_interval = self.config.checkpoint_interval();

        loop {
            if self.frontier.dequeued() >= max_pages {
                info!(target: "sitemigrate::crawl", "Reached page budget of {max_pages}");
                break;
            }
            let Some(url) = self.frontier.next_url() else {
                break;
            };

            self.delay.wait().await;
            let content_type = classify_url(&url);
            let outcome = self.visit(&url, content_type).await;

            self.summary.record(content_type, outcome);
            self.progress
                .report_page(self.frontier.dequeued(), &url, content_type, outcome);

            if self.frontier.dequeued() % checkpoint_interval == 0 {
                self.checkpoint().await?;
            }
        }
        Ok(())
    }

    /// Fetch, extract and persist one URL
    async fn visit(&mut self, url: &str, content_type: ContentType) -> VisitOutcome {
        let page = match self.open(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(target: "sitemigrate::crawl", "Failed to open {url}: {e:#}");
                return VisitOutcome::Error;
            }
        };

        match page.status() {
            Some(code) if code < 400 => {}
            status => {
                debug!(target: "sitemigrate::crawl", "Skipping {url}: status {status:?}");
                close_page(page).await;
                return VisitOutcome::Skipped;
            }
        }

        let html = page.html().await;
        close_page(page).await;
        let html = match html {
            Ok(html) => html,
            Err(e) => {
                warn!(target: "sitemigrate::crawl", "Failed to read DOM of {url}: {e:#}");
                return VisitOutcome::Error;
            }
        };

        let record = build_record(url, content_type, &html, &self.normalizer);
        let key = record_key(content_type.partition(), &page_slug(url));
        if let Err(e) = write_json(self.store, &key, &record).await {
            warn!(target: "sitemigrate::crawl", "Failed to persist {url} as {key}: {e:#}");
            return VisitOutcome::Error;
        }

        let heading = &record.extracted_data.common().title;
        let title = if heading.is_empty() {
            record.meta.title.clone()
        } else {
            heading.clone()
        };
        self.site_map.push(SiteMapEntry {
            url: url.to_string(),
            content_type,
            title,
        });
        self.images.extend(record.discovered_images.iter().cloned());

        let added = self.frontier.enqueue_all(record.discovered_links);
        debug!(
            target: "sitemigrate::links",
            "{url}: {added} new URLs queued, {} pending",
            self.frontier.pending()
        );

        VisitOutcome::Success
    }

    async fn open(&self, url: &str) -> anyhow::Result<R::Page> {
        with_page_timeout(
            self.renderer.open(url),
            self.config.page_load_timeout(),
            "Page load",
        )
        .await
    }

    async fn checkpoint(&mut self) -> CrawlResult<()> {
        self.write_manifests().await?;
        self.progress.report_checkpoint(self.site_map.len());
        Ok(())
    }

    async fn write_manifests(&self) -> CrawlResult<()> {
        write_json(self.store, SITE_MAP_KEY, &self.site_map)
            .await
            .map_err(|e| CrawlError::Storage(format!("Failed to write site-map: {e:#}")))?;
        write_json(self.store, IMAGES_KEY, &self.images)
            .await
            .map_err(|e| CrawlError::Storage(format!("Failed to write image manifest: {e:#}")))
    }

    async fn finish(mut self) -> CrawlResult<CrawlSummary> {
        self.write_manifests().await?;
        self.summary.images = self.images.len();
        self.progress.report_completed(&self.summary);
        Ok(self.summary)
    }
}

async fn close_page<P: RenderedPage>(page: P) {
    let url = page.url().to_string();
    if let Err(e) = page.close().await {
        debug!(target: "sitemigrate::browser", "Failed to close {url}: {e:#}");
    }
}

/// Crawl the configured site with the given renderer and store
pub async fn crawl_site<R, S, P>(
    config: &MigrationConfig,
    renderer: &R,
    store: &S,
    progress: P,
) -> CrawlResult<CrawlSummary>
where
    R: PageRenderer,
    S: BlobStore,
    P: ProgressReporter,
{
    Scheduler::new(config, renderer, store, progress)?.run().await
}
