//! Type-specific HTML content cleaning.
//!
//! Cleaning selects the main content region of a raw fragment, drops site
//! chrome inside it, and appends an optional supplementary region. Regions
//! are emitted with their own wrapper tag (a `div` for table cells and list
//! items), so cleaning an already-cleaned fragment finds the same regions
//! again and removes nothing further.

use std::collections::HashSet;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use super::html_cleaning::{collect_removals, parse_selectors, serialize_children_excluding, serialize_region_excluding};
use crate::page_extractor::dom::select_first_in;

/// Chrome removed from every profile
const COMMON_REMOVALS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    ".sidebar",
    ".widget-area",
    ".widget",
    ".breadcrumbs",
    ".sharedaddy",
    ".share-buttons",
    ".social-share",
    ".addtoany_share_save_container",
    ".jp-relatedposts",
    ".related-posts",
    ".post-navigation",
    ".wpforms-container",
    ".gform_wrapper",
    "iframe[src*='forms']",
    "iframe[src*='jotform']",
];

/// Theme-marked thumbnail repeated at the top of news bodies
const NEWS_REMOVALS: &[&str] = &[".post-thumbnail", "img.wp-post-image", ".entry-meta"];

const SCHOLARSHIP_REMOVALS: &[&str] = &[".scholarship-meta-share"];

const NEWS_MAIN: &[&str] = &[".entry-content", ".post-content", ".article-content"];
const SCHOLARSHIP_MAIN: &[&str] = &[".entry-content", ".scholarship-content", ".scholarship-description"];
const SCHOLARSHIP_SUPPLEMENTARY: &[&str] = &[".scholarship-details", ".scholarship-info"];
const GENERIC_MAIN: &[&str] = &[".entry-content", ".page-content", "#main-content"];

/// Cleaning profile per content family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanProfile {
    News,
    Scholarship,
    Generic,
}

impl CleanProfile {
    fn main_region(self) -> &'static [&'static str] {
        match self {
            Self::News => NEWS_MAIN,
            Self::Scholarship => SCHOLARSHIP_MAIN,
            Self::Generic => GENERIC_MAIN,
        }
    }

    fn supplementary_region(self) -> &'static [&'static str] {
        match self {
            Self::Scholarship => SCHOLARSHIP_SUPPLEMENTARY,
            Self::News | Self::Generic => &[],
        }
    }

    fn removals(self) -> Vec<Selector> {
        let extra = match self {
            Self::News => NEWS_REMOVALS,
            Self::Scholarship => SCHOLARSHIP_REMOVALS,
            Self::Generic => &[],
        };
        let mut selectors = parse_selectors(COMMON_REMOVALS);
        selectors.extend(parse_selectors(extra));
        selectors
    }
}

/// Clean a raw content fragment.
///
/// Returns `""` when the profile's main region is absent; callers decide
/// whether to fall back to [`clean_document`].
#[must_use]
pub fn clean_html(html: &str, profile: CleanProfile) -> String {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();
    let removals = profile.removals();

    let Some(main) = select_first_in(&root, profile.main_region()) else {
        return String::new();
    };
    if is_removed(&main, &removals) {
        return String::new();
    }

    let mut output = String::new();
    let to_remove = collect_removals(&main, &removals);
    serialize_region_excluding(&main, &to_remove, &mut output);

    if let Some(extra) = select_first_in(&root, profile.supplementary_region())
        && !overlaps(&main, &extra)
        && !is_removed(&extra, &removals)
    {
        let to_remove = collect_removals(&extra, &removals);
        serialize_region_excluding(&extra, &to_remove, &mut output);
    }

    output.trim().to_string()
}

/// Whole-fragment fallback: drop chrome everywhere and keep everything else
#[must_use]
pub fn clean_document(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();
    let removals = CleanProfile::Generic.removals();

    let to_remove: HashSet<NodeId> = collect_removals(&root, &removals);
    let mut output = String::new();
    serialize_children_excluding(&root, &to_remove, &mut output);
    output.trim().to_string()
}

/// Generic cleaning with the whole-fragment fallback
#[must_use]
pub fn clean_page_html(html: &str) -> String {
    let cleaned = clean_html(html, CleanProfile::Generic);
    if cleaned.is_empty() {
        clean_document(html)
    } else {
        cleaned
    }
}

/// `a` contains `b` or `b` contains `a`
fn overlaps(a: &ElementRef, b: &ElementRef) -> bool {
    a.id() == b.id()
        || b.ancestors().any(|n| n.id() == a.id())
        || a.ancestors().any(|n| n.id() == b.id())
}

/// The region itself, or one of its ancestors, is chrome
fn is_removed(el: &ElementRef, removals: &[Selector]) -> bool {
    removals.iter().any(|sel| sel.matches(el))
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| removals.iter().any(|sel| sel.matches(&ancestor)))
}
