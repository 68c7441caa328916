//! `PageRenderer` over a chromiumoxide-controlled Chrome.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::{Browser, Page};
use log::{debug, warn};
use tokio::task::JoinHandle;

use super::{PageRenderer, RenderedPage, activate_script};
use crate::browser_setup::launch_browser;
use crate::config::MigrationConfig;
use crate::crawl_engine::cleanup::{CleanupResult, cleanup_browser_and_data};
use crate::crawl_engine::page_timeout::with_page_timeout;

/// Status of the main document from the Navigation Timing API, used when the
/// CDP response for the navigation was not captured
const STATUS_SCRIPT: &str = r"
    (() => {
        const entry = performance.getEntriesByType('navigation')[0];
        return entry && entry.responseStatus ? entry.responseStatus : null;
    })()
";

/// Resolves once the document has finished loading or `maxMs` has passed
const READY_SCRIPT: &str = r"
    new Promise(resolve => {
        if (document.readyState === 'complete') {
            resolve(true);
            return;
        }
        window.addEventListener('load', () => resolve(true), { once: true });
        setTimeout(() => resolve(false), 10000);
    })
";

pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
    /// Only profile directories we created are removed at shutdown
    owns_data_dir: bool,
    page_load_timeout: Duration,
}

impl ChromiumRenderer {
    /// Launch a browser configured from `config`
    pub async fn launch(config: &MigrationConfig) -> Result<Self> {
        let owns_data_dir = config.chrome_data_dir().is_none();
        let (browser, handler, user_data_dir) =
            launch_browser(config.headless(), config.chrome_data_dir().cloned()).await?;

        Ok(Self {
            browser,
            handler,
            user_data_dir,
            owns_data_dir,
            page_load_timeout: config.page_load_timeout(),
        })
    }

    /// Close the browser and remove the temporary profile
    pub async fn shutdown(self) -> Result<CleanupResult> {
        cleanup_browser_and_data(
            self.browser,
            self.handler,
            self.user_data_dir,
            self.owns_data_dir,
        )
        .await
    }

    /// Navigate and return the main document's status as reported over CDP
    async fn navigate(&self, page: &Page, url: &str) -> Result<Option<i64>> {
        with_page_timeout(
            async {
                page.goto(url).await.map_err(|e| anyhow::anyhow!("{e}"))?;
                let request = page
                    .wait_for_navigation_response()
                    .await
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                Ok(request.and_then(|req| req.response.as_ref().map(|resp| resp.status)))
            },
            self.page_load_timeout,
            "Page navigation",
        )
        .await
    }
}

impl PageRenderer for ChromiumRenderer {
    type Page = ChromiumPage;

    async fn open(&self, url: &str) -> Result<ChromiumPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create page")?;

        let captured = match self.navigate(&page, url).await {
            Ok(captured) => captured,
            Err(e) => {
                if let Err(close_err) = page.close().await {
                    debug!(target: "sitemigrate::browser", "Failed to close page after error: {close_err}");
                }
                return Err(e.context(format!("Navigation failed for {url}")));
            }
        };

        let page = ChromiumPage {
            url: url.to_string(),
            page,
            status: None,
        };

        if let Err(e) = page.evaluate(READY_SCRIPT).await {
            debug!(target: "sitemigrate::browser", "Ready-state wait failed for {url}: {e}");
        }

        let mut status = http_status(captured);
        if status.is_none() {
            let timing = page.evaluate(STATUS_SCRIPT).await.ok().and_then(|v| v.as_i64());
            status = http_status(timing);
            debug!(target: "sitemigrate::browser", "No CDP response for {url}, navigation timing status {status:?}");
        }

        Ok(ChromiumPage { status, ..page })
    }
}

/// A usable HTTP status; `0` (opaque or cached responses) counts as unknown
fn http_status(raw: Option<i64>) -> Option<u16> {
    raw.and_then(|s| u16::try_from(s).ok()).filter(|s| *s != 0)
}

pub struct ChromiumPage {
    url: String,
    page: Page,
    status: Option<u16>,
}

impl RenderedPage for ChromiumPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    async fn html(&self) -> Result<String> {
        self.page
            .content()
            .await
            .with_context(|| format!("Failed to read content of {}", self.url))
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .with_context(|| format!("Script evaluation failed on {}", self.url))?;

        // `undefined` results cannot be deserialised; treat them as null
        Ok(result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn activate(&self, selector: &str, label: &str) -> Result<bool> {
        let clicked = self.evaluate(&activate_script(selector, label)).await?;
        Ok(clicked.as_bool().unwrap_or(false))
    }

    async fn close(self) -> Result<()> {
        if let Err(e) = self.page.close().await {
            warn!(target: "sitemigrate::browser", "Failed to close page {}: {e}", self.url);
        }
        Ok(())
    }
}
