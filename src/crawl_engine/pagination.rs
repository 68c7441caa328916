//! Pagination discovery for listing sections.
//!
//! Listing pages replace their item list in place when a page-number control
//! is clicked, so the URLs of later pages never appear as links. The
//! sub-protocol clicks through the numbered controls and harvests the links
//! of every state the listing settles into.

use std::time::Duration;

use anyhow::Result;
use log::debug;
use url::Url;

use crate::page_extractor::{HtmlDocument, discover_links};
use crate::render::RenderedPage;
use crate::utils::UrlNormalizer;

/// Knobs of one discovery run, taken from the config
#[derive(Debug, Clone, Copy)]
pub struct PaginationLimits {
    /// Safety ceiling on total pages clicked through
    pub max_pages: usize,
    pub settle_timeout: Duration,
    pub settle_poll: Duration,
}

/// Result of discovery over one listing section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationOutcome {
    /// Every in-site link seen on any page, first-seen order, deduplicated
    pub links: Vec<String>,
    pub total_pages: usize,
}

impl PaginationOutcome {
    fn harvest(&mut self, links: Vec<String>) {
        for link in links {
            if !self.links.contains(&link) {
                self.links.push(link);
            }
        }
    }
}

/// Click through a listing's numbered controls starting from page 1.
///
/// An absent control for page N ends discovery with `N - 1` total pages.
/// A control that does not change the listing before the settle timeout is
/// still counted and harvested.
pub async fn discover_paginated_links<P: RenderedPage>(
    page: &P,
    control_selector: &str,
    limits: PaginationLimits,
    normalizer: &UrlNormalizer,
) -> Result<PaginationOutcome> {
    let page_url = Url::parse(page.url()).unwrap_or_else(|_| normalizer.base().clone());

    let mut outcome = PaginationOutcome::default();
    let mut current_html = page.html().await?;
    outcome.harvest(harvest_links(&current_html, &page_url, normalizer));
    outcome.total_pages = 1;

    for number in 2..=limits.max_pages.max(1) {
        let label = number.to_string();
        if !page.activate(control_selector, &label).await? {
            debug!(
                target: "sitemigrate::links",
                "No pagination control '{label}' on {}, stopping",
                page.url()
            );
            break;
        }

        current_html = wait_for_change(page, &current_html, limits).await?;
        outcome.harvest(harvest_links(&current_html, &page_url, normalizer));
        outcome.total_pages = number;
    }

    Ok(outcome)
}

/// Poll the DOM until it differs from `previous` or the settle timeout passes
async fn wait_for_change<P: RenderedPage>(
    page: &P,
    previous: &str,
    limits: PaginationLimits,
) -> Result<String> {
    let deadline = tokio::time::Instant::now() + limits.settle_timeout;
    loop {
        tokio::time::sleep(limits.settle_poll).await;
        let html = page.html().await?;
        if html != previous {
            return Ok(html);
        }
        if tokio::time::Instant::now() >= deadline {
            debug!(
                target: "sitemigrate::links",
                "Listing on {} did not change within {:?}",
                page.url(),
                limits.settle_timeout
            );
            return Ok(html);
        }
    }
}

// Parsing stays synchronous so no DOM handle lives across an await
fn harvest_links(html: &str, page_url: &Url, normalizer: &UrlNormalizer) -> Vec<String> {
    let doc = HtmlDocument::parse(html);
    discover_links(&doc, page_url, normalizer)
}
