//! Test utilities shared by the sitemigrate integration tests

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use sitemigrate::config::{MigrationConfig, PaginatedSection};
use sitemigrate::{PageRenderer, RenderedPage};

pub const SITE: &str = "https://example.org";

/// Absolute URL of a site path, in normalised form
#[allow(dead_code)]
pub fn url(path: &str) -> String {
    format!("{SITE}{path}")
}

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body>
    {}
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

/// Page whose main content links to `links`
#[allow(dead_code)]
pub fn page_with_links(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">{href}</a></li>"#))
        .collect();
    create_test_html(
        title,
        &format!(r#"<main><h1>{title}</h1><div class="entry-content"><ul>{anchors}</ul></div></main>"#),
    )
}

/// Config for crawling [`SITE`] without delays or pagination sections
#[allow(dead_code)]
pub fn test_config(seed_paths: &[&str]) -> MigrationConfig {
    test_config_with(seed_paths, Vec::new(), |b| b)
}

#[allow(dead_code)]
pub fn test_config_with<F>(seed_paths: &[&str], sections: Vec<PaginatedSection>, tweak: F) -> MigrationConfig
where
    F: FnOnce(
        sitemigrate::config::MigrationConfigBuilder<sitemigrate::config::Complete>,
    ) -> sitemigrate::config::MigrationConfigBuilder<sitemigrate::config::Complete>,
{
    let builder = MigrationConfig::builder()
        .output_dir("/tmp/sitemigrate-unused")
        .site_url(SITE)
        .unwrap()
        .seed_paths(seed_paths.iter().copied())
        .paginated_sections(sections)
        .request_delay_ms(0)
        .settle_timeout_ms(20)
        .settle_poll_ms(1);
    tweak(builder).build().unwrap()
}

/// Canned response for one URL
#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: Option<u16>,
    /// DOM states: index 0 on load, index N-1 after activating control `N`
    pub states: Vec<String>,
}

/// In-memory site: every URL not registered fails to open
#[derive(Debug, Default)]
pub struct FakeSite {
    responses: HashMap<String, FakeResponse>,
    opened: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, path: &str, html: impl Into<String>) -> Self {
        self.responses.insert(
            url(path),
            FakeResponse {
                status: Some(200),
                states: vec![html.into()],
            },
        );
        self
    }

    pub fn status(mut self, path: &str, status: Option<u16>, html: impl Into<String>) -> Self {
        self.responses.insert(
            url(path),
            FakeResponse {
                status,
                states: vec![html.into()],
            },
        );
        self
    }

    /// Listing whose pager swaps in `states[n - 1]` for control `n`
    pub fn paginated(mut self, path: &str, states: Vec<String>) -> Self {
        self.responses.insert(
            url(path),
            FakeResponse {
                status: Some(200),
                states,
            },
        );
        self
    }

    /// Every URL opened so far, in order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn open_count(&self, url: &str) -> usize {
        self.opened().iter().filter(|u| *u == url).count()
    }
}

impl PageRenderer for FakeSite {
    type Page = FakePage;

    async fn open(&self, url: &str) -> Result<FakePage> {
        self.opened.lock().unwrap().push(url.to_string());
        let response = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("net::ERR_NAME_NOT_RESOLVED at {url}"))?;
        Ok(FakePage {
            url: url.to_string(),
            response,
            current: Mutex::new(0),
        })
    }
}

pub struct FakePage {
    url: String,
    response: FakeResponse,
    current: Mutex<usize>,
}

impl RenderedPage for FakePage {
    fn url(&self) -> &str {
        &self.url
    }

    fn status(&self) -> Option<u16> {
        self.response.status
    }

    async fn html(&self) -> Result<String> {
        let current = *self.current.lock().unwrap();
        Ok(self.response.states[current].clone())
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn activate(&self, _selector: &str, label: &str) -> Result<bool> {
        let Ok(number) = label.parse::<usize>() else {
            return Ok(false);
        };
        if number == 0 || number > self.response.states.len() {
            return Ok(false);
        }
        *self.current.lock().unwrap() = number - 1;
        Ok(true)
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
