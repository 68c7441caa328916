//! Type-safe builder for `MigrationConfig` using the typestate pattern
//!
//! `output_dir` and `site_url` are required and must be set in that order
//! before `build()` becomes available.

use anyhow::{Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{MigrationConfig, PaginatedSection};
use crate::utils::UrlNormalizer;

// Type states for the builder
pub struct WithOutputDir;
pub struct Complete;

pub struct MigrationConfigBuilder<State = ()> {
    pub(crate) config: MigrationConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for MigrationConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: MigrationConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl<State> MigrationConfigBuilder<State> {
    fn transition<Next>(self) -> MigrationConfigBuilder<Next> {
        MigrationConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl MigrationConfig {
    /// Create a builder for configuring a `MigrationConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> MigrationConfigBuilder<()> {
        MigrationConfigBuilder::default()
    }

    /// Reopen a config at the first builder state, keeping every optional
    /// setting, so the required fields can be set again (CLI overrides on top
    /// of a JSON config file).
    #[must_use]
    pub fn rebuild(self) -> MigrationConfigBuilder<()> {
        MigrationConfigBuilder {
            config: self,
            _phantom: PhantomData,
        }
    }

    /// Reopen a config with its current required fields re-validated
    pub fn into_builder(self) -> Result<MigrationConfigBuilder<Complete>> {
        let site_url = self.site_url.clone();
        let output_dir = self.output_dir.clone();
        self.rebuild().output_dir(output_dir).site_url(site_url)
    }
}

impl MigrationConfigBuilder<()> {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> MigrationConfigBuilder<WithOutputDir> {
        self.config.output_dir = dir.into();
        self.transition()
    }
}

impl MigrationConfigBuilder<WithOutputDir> {
    /// Set the seed URL. A missing scheme defaults to `https://`.
    pub fn site_url(mut self, url: impl Into<String>) -> Result<MigrationConfigBuilder<Complete>> {
        let url_string = url.into();
        let url_string = url_string.trim();
        if url_string.is_empty() {
            bail!("site_url is required");
        }

        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string.to_string()
            } else {
                format!("https://{url_string}")
            };

        // Parses the URL and derives the allowed hosts, rejecting host-less URLs
        UrlNormalizer::new(&normalized_url)?;

        self.config.site_url = normalized_url;
        Ok(self.transition())
    }
}

// Build method only available when all required fields are set
impl MigrationConfigBuilder<Complete> {
    pub fn build(self) -> Result<MigrationConfig> {
        let mut config = self.config;

        if config.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        if config.asset_concurrency == 0 {
            bail!("asset_concurrency must be at least 1");
        }
        if config.checkpoint_interval == 0 || config.asset_checkpoint_interval == 0 {
            bail!("checkpoint intervals must be at least 1");
        }
        if config.settle_poll_ms == 0 {
            bail!("settle_poll_ms must be at least 1");
        }
        if config.page_load_timeout_secs == 0 {
            bail!("page_load_timeout_secs must be at least 1");
        }
        for section in &config.paginated_sections {
            if section.control_selector.trim().is_empty() {
                bail!("paginated section {} has no control selector", section.path);
            }
        }

        config.output_dir = std::path::absolute(&config.output_dir).map_err(|e| {
            anyhow!(
                "Failed to resolve output_dir {}: {e}",
                config.output_dir.display()
            )
        })?;

        Ok(config)
    }
}

// Optional settings, available in every state
impl<State> MigrationConfigBuilder<State> {
    #[must_use]
    pub fn seed_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.seed_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn paginated_sections(mut self, sections: Vec<PaginatedSection>) -> Self {
        self.config.paginated_sections = sections;
        self
    }

    /// Page budget for one run (default 1000), counted in this run's
    /// dequeues only; URLs already visited by a resumed run are excluded
    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Pre-seed the visited set from the persisted site-map
    #[must_use]
    pub fn resume(mut self, resume: bool) -> Self {
        self.config.resume = resume;
        self
    }

    #[must_use]
    pub fn request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.request_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_load_timeout_secs = secs;
        self
    }

    /// How long to wait for a listing to re-render after a pager click
    #[must_use]
    pub fn settle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.settle_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn settle_poll_ms(mut self, ms: u64) -> Self {
        self.config.settle_poll_ms = ms;
        self
    }

    #[must_use]
    pub fn max_pagination_pages(mut self, pages: usize) -> Self {
        self.config.max_pagination_pages = pages;
        self
    }

    #[must_use]
    pub fn checkpoint_interval(mut self, pages: usize) -> Self {
        self.config.checkpoint_interval = pages;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.chrome_data_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.asset_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn asset_concurrency(mut self, workers: usize) -> Self {
        self.config.asset_concurrency = workers;
        self
    }

    #[must_use]
    pub fn asset_checkpoint_interval(mut self, completions: usize) -> Self {
        self.config.asset_checkpoint_interval = completions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = MigrationConfig::builder()
            .output_dir("./out")
            .site_url("example.org")?
            .build()?;

        assert_eq!(config.site_url(), "https://example.org");
        assert!(config.output_dir().is_absolute());
        assert_eq!(config.max_pages(), 1000);
        assert_eq!(config.request_delay_ms(), 1000);
        assert_eq!(config.seed_paths().len(), 6);
        assert_eq!(config.paginated_sections().len(), 2);
        assert!(!config.resume());
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() -> Result<()> {
        assert!(
            MigrationConfig::builder()
                .output_dir("./out")
                .site_url("")
                .is_err()
        );
        assert!(
            MigrationConfig::builder()
                .output_dir("./out")
                .site_url("https://example.org")?
                .max_pages(0)
                .build()
                .is_err()
        );
        assert!(
            MigrationConfig::builder()
                .output_dir("./out")
                .site_url("https://example.org")?
                .asset_concurrency(0)
                .build()
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_into_builder_keeps_settings() -> Result<()> {
        let config = MigrationConfig::builder()
            .output_dir("./out")
            .site_url("https://example.org")?
            .max_pages(12)
            .build()?;

        let reopened = config.into_builder()?.resume(true).build()?;
        assert_eq!(reopened.max_pages(), 12);
        assert!(reopened.resume());
        Ok(())
    }
}
