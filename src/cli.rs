//! Command-line surface of the `sitemigrate` binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::MigrationConfig;

/// Migrate a website into clean JSON content records.
/// Exit code is non-zero when a run aborts on a setup or seed failure.
#[derive(Parser, Debug)]
#[command(name = "sitemigrate")]
#[command(about = "Crawl a site, derive clean content records and download its assets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the site and persist one raw record per page
    Crawl {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(long, help = "Skip URLs already recorded in the site-map of a prior run")]
        resume: bool,

        #[arg(long, help = "Maximum number of pages to dequeue this run")]
        max_pages: Option<usize>,
    },

    /// Download every image referenced by crawled pages
    Assets {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(long, help = "Concurrent downloads")]
        concurrency: Option<usize>,
    },

    /// Derive clean content records from the raw records
    Transform {
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Site URL: seed page and allowed origin")]
    pub site_url: Option<String>,

    #[arg(long, help = "Directory for crawl output [default: ./migration]")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_name = "JSON", help = "Load settings from a JSON config file")]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    /// Config from the file (or defaults) with the command-line flags applied,
    /// validated once after the overrides
    pub fn load_config(&self) -> Result<MigrationConfig> {
        let base = match &self.config {
            Some(path) => MigrationConfig::parse_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => MigrationConfig::default(),
        };

        let site_url = self
            .site_url
            .clone()
            .unwrap_or_else(|| base.site_url().to_string());
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| base.output_dir().to_path_buf());

        base.rebuild()
            .output_dir(output_dir)
            .site_url(site_url)?
            .build()
    }
}

impl Commands {
    /// Resolve the effective config for this command
    pub fn config(&self) -> Result<MigrationConfig> {
        match self {
            Self::Crawl {
                common,
                resume,
                max_pages,
            } => {
                let mut builder = common.load_config()?.into_builder()?;
                if *resume {
                    builder = builder.resume(true);
                }
                if let Some(max_pages) = max_pages {
                    builder = builder.max_pages(*max_pages);
                }
                builder.build()
            }
            Self::Assets { common, concurrency } => {
                let config = common.load_config()?;
                match concurrency {
                    Some(n) => config.into_builder()?.asset_concurrency(*n).build(),
                    None => Ok(config),
                }
            }
            Self::Transform { common } => common.load_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_flags_override_defaults() -> Result<()> {
        let cli = Cli::try_parse_from([
            "sitemigrate",
            "crawl",
            "--site-url",
            "https://example.org",
            "--output-dir",
            "/tmp/out",
            "--resume",
            "--max-pages",
            "10",
        ])?;
        let config = cli.command.config()?;
        assert!(config.resume());
        assert_eq!(config.max_pages(), 10);
        assert_eq!(config.output_dir(), std::path::Path::new("/tmp/out"));
        Ok(())
    }

    #[test]
    fn test_missing_site_url_is_an_error() {
        let cli = Cli::try_parse_from(["sitemigrate", "transform"]).expect("parses");
        assert!(cli.command.config().is_err());
    }

    #[test]
    fn test_site_url_flag_completes_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"maxPages": 25, "requestDelayMs": 0}"#)?;

        let path = path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "sitemigrate",
            "crawl",
            "--config",
            &path,
            "--site-url",
            "https://example.org",
        ])?;
        let config = cli.command.config()?;
        assert_eq!(config.site_url(), "https://example.org");
        assert_eq!(config.max_pages(), 25);
        assert_eq!(config.request_delay_ms(), 0);
        Ok(())
    }

    #[test]
    fn test_config_file_without_site_url_still_needs_one() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{}")?;

        let path = path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["sitemigrate", "transform", "--config", &path])?;
        assert!(cli.command.config().is_err());
        Ok(())
    }

    #[test]
    fn test_assets_concurrency() -> Result<()> {
        let cli = Cli::try_parse_from([
            "sitemigrate",
            "assets",
            "--site-url",
            "https://example.org",
            "--concurrency",
            "8",
        ])?;
        assert_eq!(cli.command.config()?.asset_concurrency(), 8);
        Ok(())
    }
}
