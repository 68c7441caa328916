//! Progress reporting abstraction for crawl runs
//!
//! Defines the `ProgressReporter` trait for lifecycle event reporting, the
//! end-of-run `CrawlSummary`, and two implementations: a no-op one for tests
//! and library callers, and a log-backed one used by the CLI.

use std::collections::BTreeMap;
use std::fmt;

use log::{info, warn};

use super::content_classifier::ContentType;
use super::crawl_types::VisitOutcome;

/// Trait for reporting crawl progress at key lifecycle events
pub trait ProgressReporter: Send + Sync {
    /// Report that the crawl is starting; `resumed` is the number of URLs
    /// pre-seeded as visited from a prior site-map
    fn report_started(&self, seed_url: &str, resumed: usize);

    /// Report the result of pagination discovery for one listing section
    fn report_pagination(&self, section: &str, total_pages: usize, links: usize);

    /// Report one visited URL: the per-page progress line
    fn report_page(&self, index: usize, url: &str, content_type: ContentType, outcome: VisitOutcome);

    /// Report that the site-map was checkpointed
    fn report_checkpoint(&self, entries: usize);

    /// Report the end-of-run summary
    fn report_completed(&self, summary: &CrawlSummary);

    /// Report a non-fatal error that occurred outside a page visit
    fn report_error(&self, error: &str);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_started(&self, _seed_url: &str, _resumed: usize) {}

    #[inline(always)]
    fn report_pagination(&self, _section: &str, _total_pages: usize, _links: usize) {}

    #[inline(always)]
    fn report_page(&self, _index: usize, _url: &str, _ct: ContentType, _outcome: VisitOutcome) {}

    #[inline(always)]
    fn report_checkpoint(&self, _entries: usize) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &CrawlSummary) {}

    #[inline(always)]
    fn report_error(&self, _error: &str) {}
}

/// Progress reporter that writes one log line per event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_started(&self, seed_url: &str, resumed: usize) {
        if resumed > 0 {
            info!(target: "sitemigrate::crawl", "Resuming crawl of {seed_url} ({resumed} URLs already visited)");
        } else {
            info!(target: "sitemigrate::crawl", "Starting crawl of {seed_url}");
        }
    }

    fn report_pagination(&self, section: &str, total_pages: usize, links: usize) {
        info!(
            target: "sitemigrate::crawl",
            "Pagination {section}: {total_pages} page(s), {links} link(s) discovered"
        );
    }

    fn report_page(&self, index: usize, url: &str, content_type: ContentType, outcome: VisitOutcome) {
        match outcome {
            VisitOutcome::Success => {
                info!(target: "sitemigrate::crawl", "[{index}] {content_type} {url}");
            }
            VisitOutcome::Skipped | VisitOutcome::Error => {
                warn!(target: "sitemigrate::crawl", "[{index}] {content_type} {url} ({outcome})");
            }
        }
    }

    fn report_checkpoint(&self, entries: usize) {
        info!(target: "sitemigrate::crawl", "Checkpointed site-map ({entries} entries)");
    }

    fn report_completed(&self, summary: &CrawlSummary) {
        for line in summary.to_string().lines() {
            info!(target: "sitemigrate::crawl", "{line}");
        }
    }

    fn report_error(&self, error: &str) {
        warn!(target: "sitemigrate::crawl", "{error}");
    }
}

/// End-of-run counts by content type and by outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Successfully extracted pages per content type
    pub by_type: BTreeMap<ContentType, usize>,
    pub success: usize,
    pub skipped: usize,
    pub errors: usize,
    /// URLs pre-seeded from a prior run's site-map
    pub resumed: usize,
    pub images: usize,
}

impl CrawlSummary {
    pub fn record(&mut self, content_type: ContentType, outcome: VisitOutcome) {
        match outcome {
            VisitOutcome::Success => {
                self.success += 1;
                *self.by_type.entry(content_type).or_insert(0) += 1;
            }
            VisitOutcome::Skipped => self.skipped += 1,
            VisitOutcome::Error => self.errors += 1,
        }
    }

    /// Pages visited in this run, whatever their outcome
    #[must_use]
    pub fn visited(&self) -> usize {
        self.success + self.skipped + self.errors
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Crawl complete: {} visited ({} success, {} skipped, {} error), {} resumed, {} images",
            self.visited(),
            self.success,
            self.skipped,
            self.errors,
            self.resumed,
            self.images
        )?;
        for (content_type, count) in &self.by_type {
            writeln!(f, "  {content_type:<20} {count}")?;
        }
        Ok(())
    }
}
