//! Shared configuration constants for sitemigrate
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default page budget for a single crawl run
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Fixed delay between two dequeue-and-fetch cycles: 1 second
///
/// Applied regardless of the outcome of the previous page so the request
/// rate against the legacy site stays bounded even when pages fail fast.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Timeout for `page.goto()` and the following navigation wait
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Maximum time to wait for a listing to re-render after a pagination click
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for a listing to re-render
pub const DEFAULT_SETTLE_POLL_MS: u64 = 250;

/// Safety ceiling for pagination discovery on a single listing section
pub const DEFAULT_MAX_PAGINATION_PAGES: usize = 50;

/// Site-map checkpoint interval, in processed pages
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 25;

/// Concurrent asset downloads
pub const DEFAULT_ASSET_CONCURRENCY: usize = 4;

/// Asset map checkpoint interval, in completed downloads
pub const DEFAULT_ASSET_CHECKPOINT_INTERVAL: usize = 20;

/// Timeout for a single asset download
pub const ASSET_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Maximum excerpt length for clean news records, in characters
pub const EXCERPT_MAX_CHARS: usize = 200;

/// Paths crawled on every run in addition to the navigation links
pub const DEFAULT_SEED_PATHS: &[&str] = &[
    "/",
    "/news",
    "/scholarships",
    "/grants",
    "/about/staff",
    "/about/board",
];

/// Pagination control selector used by the default paginated sections
pub const DEFAULT_PAGINATION_CONTROL: &str = ".pagination a, .pagination button";

/// File extensions that are never crawled as pages
///
/// Documents and media are collected by the asset phase instead.
pub const DENIED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "zip", "rar", "gz", "jpg",
    "jpeg", "png", "gif", "svg", "webp", "bmp", "ico", "tif", "tiff", "mp3", "mp4", "m4a",
    "mov", "avi", "wmv", "webm", "ics",
];

/// Chrome user agent string used by the rendering browser
///
/// Chrome releases new stable versions ~every 4 weeks.
/// Update quarterly to stay within reasonable version window.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
