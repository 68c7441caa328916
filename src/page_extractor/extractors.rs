//! Per-content-type field extractors.
//!
//! Every extractor is best-effort: a selector chain that matches nothing
//! yields an empty value, never an error.

use std::collections::HashSet;

use chrono::Utc;
use scraper::ElementRef;
use url::Url;

use super::dom::{
    HtmlDocument, render_text, sanitized_inner_html, scoped_attr, scoped_text,
    select_all_in, select_first_in,
};
use super::schema::{
    CommonFields, ContentImage, ExtractedData, GenericFields, ListingFields, NewsFields, PageMeta,
    PersonCard, RawPageRecord, RawScholarshipFields, ScholarshipFields,
};
use crate::crawl_engine::content_classifier::ContentType;
use crate::utils::UrlNormalizer;

// Content regions. Broad on purpose: the cleaner narrows them later.
const NEWS_REGION: &[&str] = &["article", "main", "#content", "body"];
const SCHOLARSHIP_REGION: &[&str] = &["article", "main", "#content", "body"];
const GENERIC_REGION: &[&str] = &["main", "#content", "article", ".site-content", "body"];

const HEADING: &[&str] = &["h1.entry-title", "h1.page-title", "article h1", "main h1", "h1"];

const NEWS_DATE_ATTR: &[&str] = &["time.entry-date[datetime]", "time[datetime]"];
const NEWS_DATE_TEXT: &[&str] = &[".entry-date", ".post-date", ".published", ".date", "time"];
const NEWS_AUTHOR: &[&str] = &[".author .fn", ".byline .author", ".author-name", ".author", "[rel='author']"];
const NEWS_CATEGORY: &[&str] = &[".cat-links a", "a[rel~='category']", ".post-category", ".category"];
const NEWS_FEATURED: &[&str] = &[".post-thumbnail img", "img.wp-post-image", ".featured-image img"];

const SCHOLARSHIP_AMOUNT: &[&str] = &[".scholarship-amount", ".amount"];
const SCHOLARSHIP_DEADLINE: &[&str] = &[".scholarship-deadline", ".deadline"];
const SCHOLARSHIP_RENEWABLE: &[&str] = &[".scholarship-renewable", ".renewable"];
const SCHOLARSHIP_ELIGIBILITY: &[&str] = &[".scholarship-eligibility", ".eligibility"];
const SCHOLARSHIP_REQUIREMENTS: &[&str] = &[".scholarship-requirements", ".requirements"];
const APPLY_LINK: &[&str] = &[
    "a.apply-button",
    "a.scholarship-apply",
    "a.button[href*='apply']",
    "a[href*='apply']",
];

const STAFF_CARDS: &[&str] = &[".staff-member", ".team-member", ".staff-card", ".person", ".staff-list > li"];
const BOARD_CARDS: &[&str] = &[".board-member", ".team-member", ".board-card", ".person", ".board-list > li"];
const CARD_NAME: &[&str] = &[".name", ".member-name", "h3", "h4", "h2", "strong"];
const CARD_ROLE: &[&str] = &[".role", ".position", ".job-title", ".title", "em"];
const CARD_EMAIL: &[&str] = &["a[href^='mailto:']"];
const CARD_PHOTO: &[&str] = &["img"];
const CARD_BIO: &[&str] = &[".bio", ".description", ".excerpt", ".member-bio"];

/// Parse a rendered page and build its raw record
#[must_use]
pub fn build_record(
    url: &str,
    content_type: ContentType,
    html: &str,
    normalizer: &UrlNormalizer,
) -> RawPageRecord {
    let doc = HtmlDocument::parse(html);
    let page_url = Url::parse(url).unwrap_or_else(|_| normalizer.base().clone());

    RawPageRecord {
        url: url.to_string(),
        content_type,
        meta: extract_meta(&doc, &page_url),
        extracted_data: extract_fields(&doc, content_type, &page_url),
        discovered_links: discover_links(&doc, &page_url, normalizer),
        discovered_images: discover_images(&doc, &page_url),
        scraped_at: Utc::now(),
    }
}

#[must_use]
pub fn extract_meta(doc: &HtmlDocument, page_url: &Url) -> PageMeta {
    PageMeta {
        title: doc.document_title(),
        description: doc.meta_content(&["description", "og:description"]),
        og_image: absolutize(page_url, &doc.meta_content(&["og:image"])),
    }
}

/// Dispatch to the extractor for `content_type`
#[must_use]
pub fn extract_fields(doc: &HtmlDocument, content_type: ContentType, page_url: &Url) -> ExtractedData {
    match content_type {
        ContentType::News => ExtractedData::News(extract_news(doc, page_url)),
        ContentType::Scholarship => ExtractedData::Scholarship(extract_scholarship(doc, page_url)),
        ContentType::Grant => ExtractedData::Grant(GenericFields {
            common: extract_common(doc, GENERIC_REGION, page_url),
        }),
        ContentType::Staff => ExtractedData::StaffListing(extract_listing(doc, STAFF_CARDS, page_url)),
        ContentType::Board => ExtractedData::BoardListing(extract_listing(doc, BOARD_CARDS, page_url)),
        ContentType::Page | ContentType::NewsListing | ContentType::ScholarshipListing => {
            ExtractedData::Generic(GenericFields {
                common: extract_common(doc, GENERIC_REGION, page_url),
            })
        }
    }
}

fn extract_common(doc: &HtmlDocument, region: &[&str], page_url: &Url) -> CommonFields {
    let mut title = doc.first_text(HEADING);
    if title.is_empty() {
        title = doc.document_title();
    }

    match doc.select_first(region) {
        Some(el) => CommonFields {
            title,
            content_html: sanitized_inner_html(&el),
            content_text: render_text(&el),
            images: content_images(&el, page_url),
        },
        None => CommonFields {
            title,
            ..CommonFields::default()
        },
    }
}

fn extract_news(doc: &HtmlDocument, page_url: &Url) -> NewsFields {
    let mut date = doc.first_attr(NEWS_DATE_ATTR, "datetime");
    if date.is_empty() {
        date = doc.first_text(NEWS_DATE_TEXT);
    }

    let mut featured_image = absolutize(page_url, &image_src_in(&doc.root(), NEWS_FEATURED));
    if featured_image.is_empty() {
        featured_image = absolutize(page_url, &doc.meta_content(&["og:image"]));
    }

    NewsFields {
        common: extract_common(doc, NEWS_REGION, page_url),
        date,
        author: doc.first_text(NEWS_AUTHOR),
        category: doc.first_text(NEWS_CATEGORY),
        featured_image,
    }
}

fn extract_scholarship(doc: &HtmlDocument, page_url: &Url) -> ScholarshipFields {
    let common = extract_common(doc, SCHOLARSHIP_REGION, page_url);

    let mut raw = RawScholarshipFields {
        amount: doc.first_text(SCHOLARSHIP_AMOUNT),
        deadline: doc.first_text(SCHOLARSHIP_DEADLINE),
        renewable: doc.first_text(SCHOLARSHIP_RENEWABLE),
        eligibility: list_text(doc, SCHOLARSHIP_ELIGIBILITY),
        requirements: list_text(doc, SCHOLARSHIP_REQUIREMENTS),
    };
    fill_from_labeled_lines(&mut raw, &common.content_text);

    let apply_url = doc
        .select_first(SCHOLARSHIP_REGION)
        .map(|region| scoped_attr(&region, APPLY_LINK, "href"))
        .unwrap_or_default();

    ScholarshipFields {
        common,
        raw,
        apply_url: absolutize(page_url, &apply_url),
    }
}

/// Text of a list-bearing field: items joined by newlines when it is a list
fn list_text(doc: &HtmlDocument, chain: &[&str]) -> String {
    match doc.select_first(chain) {
        Some(el) => render_text(&el),
        None => String::new(),
    }
}

/// Fill empty raw slots from `Label: value` lines of the rendered text
fn fill_from_labeled_lines(raw: &mut RawScholarshipFields, text: &str) {
    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let slot = match label.trim().to_ascii_lowercase().as_str() {
            "amount" | "award amount" => &mut raw.amount,
            "deadline" | "application deadline" => &mut raw.deadline,
            "renewable" => &mut raw.renewable,
            "eligibility" => &mut raw.eligibility,
            "requirements" => &mut raw.requirements,
            _ => continue,
        };
        if slot.is_empty() {
            *slot = value.to_string();
        }
    }
}

fn extract_listing(doc: &HtmlDocument, card_chain: &[&str], page_url: &Url) -> ListingFields {
    let common = extract_common(doc, GENERIC_REGION, page_url);
    let cards = select_all_in(&doc.root(), card_chain);

    if cards.is_empty() {
        return ListingFields {
            page_html: common.content_html.clone(),
            common,
            members: Vec::new(),
            degraded: true,
        };
    }

    let members = cards
        .iter()
        .map(|card| extract_person(card, page_url))
        .filter(|person| !person.name.is_empty())
        .collect();

    ListingFields {
        common,
        members,
        degraded: false,
        page_html: String::new(),
    }
}

fn extract_person(card: &ElementRef, page_url: &Url) -> PersonCard {
    let name = scoped_text(card, CARD_NAME);
    let mut role = scoped_text(card, CARD_ROLE);
    if role == name {
        role.clear();
    }

    let email = scoped_attr(card, CARD_EMAIL, "href")
        .trim_start_matches("mailto:")
        .split('?')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let photo = select_first_in(card, CARD_PHOTO)
        .map(|img| ContentImage {
            src: absolutize(page_url, &image_src(&img)),
            alt: element_alt(&img),
        })
        .unwrap_or_default();

    let bio_html = select_first_in(card, CARD_BIO)
        .map(|el| sanitized_inner_html(&el))
        .unwrap_or_default();

    PersonCard {
        name,
        role,
        email,
        photo,
        bio_html,
    }
}

/// Normalised in-site links of the page, in document order, deduplicated
#[must_use]
pub fn discover_links(doc: &HtmlDocument, page_url: &Url, normalizer: &UrlNormalizer) -> Vec<String> {
    let mut seen = HashSet::new();
    select_all_in(&doc.root(), &["a[href]"])
        .iter()
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| normalizer.normalize_relative_to(href, page_url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Absolute URLs of every image on the page, deduplicated
#[must_use]
pub fn discover_images(doc: &HtmlDocument, page_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    select_all_in(&doc.root(), &["img"])
        .iter()
        .map(|img| absolutize(page_url, &image_src(img)))
        .filter(|src| !src.is_empty())
        .filter(|src| seen.insert(src.clone()))
        .collect()
}

fn content_images(region: &ElementRef, page_url: &Url) -> Vec<ContentImage> {
    select_all_in(region, &["img"])
        .iter()
        .filter_map(|img| {
            let src = absolutize(page_url, &image_src(img));
            (!src.is_empty()).then(|| ContentImage {
                src,
                alt: element_alt(img),
            })
        })
        .collect()
}

fn element_alt(img: &ElementRef) -> String {
    img.value().attr("alt").unwrap_or_default().trim().to_string()
}

/// `src`, or the lazy-load attribute when `src` is a placeholder
fn image_src(img: &ElementRef) -> String {
    let el = img.value();
    let src = el.attr("src").unwrap_or_default().trim();
    if !src.is_empty() && !src.starts_with("data:") {
        return src.to_string();
    }
    ["data-src", "data-lazy-src", "data-original"]
        .iter()
        .find_map(|attr| el.attr(attr).map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or_default()
        .to_string()
}

fn image_src_in(scope: &ElementRef, chain: &[&str]) -> String {
    select_first_in(scope, chain)
        .map(|img| image_src(&img))
        .unwrap_or_default()
}

/// Resolve `href` against the page; empty or non-http results become ""
fn absolutize(page_url: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    match page_url.join(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => String::new(),
    }
}
