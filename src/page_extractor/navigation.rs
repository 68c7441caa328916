//! Primary navigation capture.

use scraper::ElementRef;
use url::Url;

use super::dom::{HtmlDocument, element_text, select_first_in};
use super::schema::NavItem;
use crate::utils::UrlNormalizer;

const NAV_ROOTS: &[&str] = &[
    "nav.main-navigation > ul",
    "#primary-menu",
    "#menu-main-menu",
    "header nav ul",
    "nav ul",
];

const MAX_NAV_DEPTH: usize = 2;

/// Navigation tree of the page, at most two levels deep.
///
/// Items without a label are dropped; hrefs are resolved to absolute URLs.
#[must_use]
pub fn extract_navigation(doc: &HtmlDocument, page_url: &Url) -> Vec<NavItem> {
    match doc.select_first(NAV_ROOTS) {
        Some(list) => read_list(&list, page_url, 1),
        None => Vec::new(),
    }
}

fn read_list(list: &ElementRef, page_url: &Url, depth: usize) -> Vec<NavItem> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .filter_map(|li| read_item(&li, page_url, depth))
        .collect()
}

fn read_item(li: &ElementRef, page_url: &Url, depth: usize) -> Option<NavItem> {
    let anchor = li
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "a")?;

    let label = element_text(&anchor);
    if label.is_empty() {
        return None;
    }

    let href = anchor
        .value()
        .attr("href")
        .and_then(|href| page_url.join(href.trim()).ok())
        .map(|url| url.to_string())
        .unwrap_or_default();

    let children = if depth < MAX_NAV_DEPTH {
        li.children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "ul")
            .or_else(|| select_first_in(li, &["ul"]))
            .map(|sub| read_list(&sub, page_url, depth + 1))
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    Some(NavItem {
        label,
        href,
        children,
    })
}

/// Every in-site link of the navigation tree, normalised, in tree order
#[must_use]
pub fn navigation_links(items: &[NavItem], normalizer: &UrlNormalizer) -> Vec<String> {
    let mut links = Vec::new();
    for item in items {
        if let Some(url) = normalizer.normalize(&item.href)
            && !links.contains(&url)
        {
            links.push(url);
        }
        for url in navigation_links(&item.children, normalizer) {
            if !links.contains(&url) {
                links.push(url);
            }
        }
    }
    links
}
