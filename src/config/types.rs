//! Core configuration types for a site migration run
//!
//! `MigrationConfig` carries everything the crawl, asset and transform
//! phases need. It is built through the typestate builder in
//! [`super::builder`] or loaded from a JSON file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    DEFAULT_ASSET_CHECKPOINT_INTERVAL, DEFAULT_ASSET_CONCURRENCY, DEFAULT_CHECKPOINT_INTERVAL,
    DEFAULT_MAX_PAGES, DEFAULT_MAX_PAGINATION_PAGES, DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
    DEFAULT_PAGINATION_CONTROL, DEFAULT_REQUEST_DELAY_MS, DEFAULT_SEED_PATHS,
    DEFAULT_SETTLE_POLL_MS, DEFAULT_SETTLE_TIMEOUT_MS,
};

/// A listing section whose items are only reachable through a JS pager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedSection {
    /// Site-relative path of the listing's first page, e.g. `/news`
    pub path: String,
    /// Selector matching the page-number controls of the pager
    pub control_selector: String,
}

impl PaginatedSection {
    pub fn new(path: impl Into<String>, control_selector: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            control_selector: control_selector.into(),
        }
    }
}

/// Main configuration struct for migration runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationConfig {
    /// Seed URL of the legacy site; also the base for resolving links.
    pub(crate) site_url: String,

    /// Root of the blob store.
    ///
    /// **INVARIANT:** absolute after `build()`.
    pub(crate) output_dir: PathBuf,

    pub(crate) seed_paths: Vec<String>,
    pub(crate) paginated_sections: Vec<PaginatedSection>,

    /// Page budget for a single run, counted in URLs dequeued by this run.
    /// URLs pre-seeded as visited from a resumed site-map, the seed's
    /// navigation fetch and pagination discovery do not count against it.
    pub(crate) max_pages: usize,
    pub(crate) resume: bool,

    /// Fixed delay between two dequeue-and-fetch cycles
    pub(crate) request_delay_ms: u64,

    /// Timeout for opening a page, covering `goto` and the navigation wait.
    /// A timeout is treated like any other fetch error.
    pub(crate) page_load_timeout_secs: u64,

    pub(crate) settle_timeout_ms: u64,
    pub(crate) settle_poll_ms: u64,
    pub(crate) max_pagination_pages: usize,
    pub(crate) checkpoint_interval: usize,

    pub(crate) headless: bool,

    /// Chrome user data directory. A temporary one is created per run when unset.
    pub(crate) chrome_data_dir: Option<PathBuf>,

    /// Download directory for assets. Defaults to `<output_dir>/assets`.
    pub(crate) asset_dir: Option<PathBuf>,
    pub(crate) asset_concurrency: usize,
    pub(crate) asset_checkpoint_interval: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            output_dir: PathBuf::from("./migration"),
            seed_paths: DEFAULT_SEED_PATHS.iter().map(|p| (*p).to_string()).collect(),
            paginated_sections: default_paginated_sections(),
            max_pages: DEFAULT_MAX_PAGES,
            resume: false,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            settle_poll_ms: DEFAULT_SETTLE_POLL_MS,
            max_pagination_pages: DEFAULT_MAX_PAGINATION_PAGES,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            headless: true,
            chrome_data_dir: None,
            asset_dir: None,
            asset_concurrency: DEFAULT_ASSET_CONCURRENCY,
            asset_checkpoint_interval: DEFAULT_ASSET_CHECKPOINT_INTERVAL,
        }
    }
}

pub(crate) fn default_paginated_sections() -> Vec<PaginatedSection> {
    ["/news", "/scholarships"]
        .into_iter()
        .map(|path| PaginatedSection::new(path, DEFAULT_PAGINATION_CONTROL))
        .collect()
}

impl MigrationConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their defaults; the result is validated the same
    /// way the builder validates.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse_json_file(path)?.into_builder()?.build()
    }

    /// Deserialize a JSON config file without validating it.
    ///
    /// For callers that apply overrides first and validate once through
    /// [`Self::rebuild`].
    pub fn parse_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
