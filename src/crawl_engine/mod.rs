//! Crawl Engine Module
//!
//! The single-threaded breadth-first crawl: URL classification, frontier
//! state, rate limiting, pagination discovery and the scheduler loop that
//! ties them to a renderer and a blob store.

pub mod cleanup;
pub mod content_classifier;
pub mod crawl_types;
pub mod frontier;
pub mod orchestrator;
pub mod page_timeout;
pub mod pagination;
pub mod progress;
pub mod rate_limiter;

pub use content_classifier::{ContentType, PARTITIONS, classify_path, classify_url};
pub use crawl_types::{CrawlError, CrawlResult, SiteMapEntry, UrlState, VisitOutcome};
pub use frontier::Frontier;
pub use orchestrator::{Scheduler, crawl_site};
pub use pagination::{PaginationLimits, PaginationOutcome, discover_paginated_links};
pub use progress::{CrawlSummary, LogProgress, NoOpProgress, ProgressReporter};
pub use rate_limiter::{CrawlDelay, RateLimitDecision};
