//! Getter methods for `MigrationConfig`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use super::types::{MigrationConfig, PaginatedSection};
use crate::utils::UrlNormalizer;

impl MigrationConfig {
    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn seed_paths(&self) -> &[String] {
        &self.seed_paths
    }

    #[must_use]
    pub fn paginated_sections(&self) -> &[PaginatedSection] {
        &self.paginated_sections
    }

    /// Dequeues allowed this run; resumed URLs are not counted
    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn resume(&self) -> bool {
        self.resume
    }

    #[must_use]
    pub fn request_delay_ms(&self) -> u64 {
        self.request_delay_ms
    }

    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    #[must_use]
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    #[must_use]
    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    #[must_use]
    pub fn max_pagination_pages(&self) -> usize {
        self.max_pagination_pages
    }

    #[must_use]
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }

    /// Asset download directory, `<output_dir>/assets` unless overridden
    #[must_use]
    pub fn asset_dir(&self) -> PathBuf {
        self.asset_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("assets"))
    }

    #[must_use]
    pub fn asset_concurrency(&self) -> usize {
        self.asset_concurrency
    }

    #[must_use]
    pub fn asset_checkpoint_interval(&self) -> usize {
        self.asset_checkpoint_interval
    }

    /// Link normaliser bound to this site's apex and `www.` hosts
    pub fn url_normalizer(&self) -> Result<UrlNormalizer> {
        UrlNormalizer::new(&self.site_url)
    }
}
