//! Browser and resource cleanup after a crawl run.

use anyhow::Result;
use chromiumoxide::Browser;
use log::{debug, warn};
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

/// Close the browser, stop its CDP handler and, when requested, remove the
/// Chrome profile directory.
pub async fn cleanup_browser_and_data(
    mut browser: Browser,
    handler: JoinHandle<()>,
    chrome_data_dir: PathBuf,
    remove_data_dir: bool,
) -> Result<CleanupResult> {
    let mut errors = Vec::new();

    debug!(target: "sitemigrate::cleanup", "Closing browser");
    if let Err(e) = browser.close().await {
        warn!(target: "sitemigrate::cleanup", "Failed to close browser: {e}");
        errors.push(format!("Browser close failed: {e}"));
    }

    // Wait for the process to exit so the profile directory is unlocked
    if let Err(e) = browser.wait().await {
        warn!(target: "sitemigrate::cleanup", "Failed to wait for browser exit: {e}");
        errors.push(format!("Browser wait failed: {e}"));
    }

    handler.abort();

    if remove_data_dir {
        debug!(
            target: "sitemigrate::cleanup",
            "Removing Chrome data directory {}",
            chrome_data_dir.display()
        );
        if let Err(e) = tokio::fs::remove_dir_all(&chrome_data_dir).await {
            warn!(target: "sitemigrate::cleanup", "Failed to clean up Chrome data directory: {e}");
            errors.push(format!("Directory cleanup failed: {e}"));
        }
    }

    if errors.is_empty() {
        Ok(CleanupResult::Success)
    } else {
        Ok(CleanupResult::PartialFailure(errors))
    }
}
