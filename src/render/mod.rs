//! Rendered-page capability consumed by the crawl scheduler.
//!
//! The scheduler only needs four things from a browser: open a URL, report
//! the HTTP status, serialise the rendered DOM, and run small scripts or
//! click-and-settle interactions. [`chromium`] implements this over
//! chromiumoxide; tests implement it over canned HTML.

pub mod chromium;

use anyhow::Result;

pub use chromium::{ChromiumPage, ChromiumRenderer};

/// An opened, rendered page
#[allow(async_fn_in_trait)]
pub trait RenderedPage {
    /// URL the page was opened with
    fn url(&self) -> &str;

    /// HTTP status of the main document; `None` when no response was seen
    fn status(&self) -> Option<u16>;

    /// Serialise the current DOM
    async fn html(&self) -> Result<String>;

    /// Evaluate a script and return its JSON value (`null` for `undefined`)
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Click the first element matching `selector` whose trimmed text equals
    /// `label`. Returns `Ok(false)` when no such element exists.
    async fn activate(&self, selector: &str, label: &str) -> Result<bool>;

    /// Release the page
    async fn close(self) -> Result<()>;
}

/// Opens URLs as rendered pages
#[allow(async_fn_in_trait)]
pub trait PageRenderer {
    type Page: RenderedPage;

    /// Navigate to `url` and wait for the load to finish.
    ///
    /// Errors on navigation failure; the caller applies the page timeout.
    async fn open(&self, url: &str) -> Result<Self::Page>;
}

/// Script for [`RenderedPage::activate`], with arguments embedded as JSON literals
#[must_use]
pub fn activate_script(selector: &str, label: &str) -> String {
    let selector = serde_json::Value::from(selector);
    let label = serde_json::Value::from(label);
    format!(
        r#"
    ((selector, label) => {{
        const target = Array.from(document.querySelectorAll(selector))
            .find(el => (el.textContent || '').trim() === label);
        if (!target) {{
            return false;
        }}
        target.click();
        return true;
    }})({selector}, {label})
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_script_escapes_arguments() {
        let script = activate_script(".pagination a[data-x=\"1\"]", "2");
        assert!(script.contains(r#"(".pagination a[data-x=\"1\"]", "2")"#));
    }
}
