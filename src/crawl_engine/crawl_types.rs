//! Core types for crawl runs.
//!
//! This module contains the fatal error taxonomy, the per-URL visit outcome
//! and the site-map entry persisted after every run.

use serde::{Deserialize, Serialize};

use super::content_classifier::ContentType;

/// Errors that abort a whole crawl run.
///
/// Per-page failures never surface here; they become
/// [`VisitOutcome::Skipped`] or [`VisitOutcome::Error`].
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Output directory or other local setup failed
    #[error("Setup error: {0}")]
    Setup(String),

    /// The seed URL could not be fetched at all
    #[error("Seed URL {url} is unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    /// Blob store read or write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Browser launch or control failed
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Crawl error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for CrawlError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve full error chain with context
        Self::Other(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Lifecycle of a URL within one run: `unseen -> queued -> visited`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlState {
    Unseen,
    Queued,
    Visited,
}

/// How a visited URL ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitOutcome {
    /// Status below 400; record persisted and links harvested
    Success,
    /// Status 400 or above, or no response at all
    Skipped,
    /// Navigation raised (timeout, network, protocol)
    Error,
}

impl VisitOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the persisted `site-map`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMapEntry {
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub title: String,
}
