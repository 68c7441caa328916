//! Offline derivation of clean content from persisted raw records.
//!
//! The transform reads every raw partition, derives one clean record per raw
//! record and writes four sorted arrays. Output depends only on the raw
//! records, so re-running it produces identical files.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{info, warn};
use url::Url;

use super::cleaner::{CleanProfile, clean_html, clean_page_html};
use super::field_parser::parse_scholarship_fields;
use super::records::{CleanMember, CleanNews, CleanPage, CleanScholarship, relative_navigation};
use crate::content_saver::{
    BlobStore, CONTENT_NAV_KEY, CONTENT_NEWS_KEY, CONTENT_PAGES_KEY, CONTENT_SCHOLARSHIPS_KEY,
    NAVIGATION_KEY, read_json, write_json,
};
use crate::crawl_engine::PARTITIONS;
use crate::page_extractor::HtmlDocument;
use crate::page_extractor::dom::render_text;
use crate::page_extractor::schema::{ExtractedData, NavItem, NewsFields, RawPageRecord, ScholarshipFields};
use crate::utils::{EXCERPT_MAX_CHARS, UrlNormalizer, excerpt, last_segment_slug, path_slug};

/// Date layouts seen in source pages, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%b. %d, %Y", "%m/%d/%Y", "%d %B %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Separators between a page title and the site name
const TITLE_SEPARATORS: &[&str] = &[" | ", " – ", " — ", " - "];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSummary {
    pub news: usize,
    pub scholarships: usize,
    pub pages: usize,
    /// Raw records that could not be read
    pub skipped: usize,
}

/// All clean output derived from one set of raw records
#[derive(Debug, Default)]
pub struct CleanContent {
    pub news: Vec<CleanNews>,
    pub scholarships: Vec<CleanScholarship>,
    pub pages: Vec<CleanPage>,
}

impl CleanContent {
    pub fn push(&mut self, record: RawPageRecord) {
        let RawPageRecord {
            url,
            content_type,
            meta,
            extracted_data,
            ..
        } = record;
        let title = clean_title(&extracted_data.common().title, &meta.title);

        match extracted_data {
            ExtractedData::News(fields) => self.news.push(clean_news(&url, title, fields)),
            ExtractedData::Scholarship(fields) => {
                self.scholarships.push(clean_scholarship(&url, title, fields));
            }
            ExtractedData::StaffListing(fields) | ExtractedData::BoardListing(fields) => {
                let source = if fields.degraded { &fields.page_html } else { &fields.common.content_html };
                self.pages.push(CleanPage {
                    slug: path_slug(&url),
                    title,
                    section: content_type.to_string(),
                    body: clean_page_html(source),
                    members: fields.members.into_iter().map(CleanMember::from).collect(),
                    source_url: url,
                });
            }
            ExtractedData::Grant(fields) | ExtractedData::Generic(fields) => {
                self.pages.push(CleanPage {
                    slug: path_slug(&url),
                    title,
                    section: content_type.to_string(),
                    body: clean_page_html(&fields.common.content_html),
                    members: Vec::new(),
                    source_url: url,
                });
            }
        }
    }

    /// Sort every array by slug, then source URL
    pub fn sort(&mut self) {
        self.news.sort_by(|a, b| (&a.slug, &a.source_url).cmp(&(&b.slug, &b.source_url)));
        self.scholarships
            .sort_by(|a, b| (&a.slug, &a.source_url).cmp(&(&b.slug, &b.source_url)));
        self.pages.sort_by(|a, b| (&a.slug, &a.source_url).cmp(&(&b.slug, &b.source_url)));
    }
}

fn clean_news(url: &str, title: String, fields: NewsFields) -> CleanNews {
    let body = clean_html(&fields.common.content_html, CleanProfile::News);
    // Headline and byline live outside the cleaned body
    let text = if body.is_empty() {
        fields.common.content_text
    } else {
        let doc = HtmlDocument::parse_fragment(&body);
        render_text(&doc.root())
    };

    CleanNews {
        slug: last_segment_slug(url),
        title,
        date: normalize_date(&fields.date),
        author: fields.author,
        category: fields.category,
        featured_image: fields.featured_image,
        excerpt: excerpt(&text, EXCERPT_MAX_CHARS),
        body,
        source_url: url.to_string(),
    }
}

fn clean_scholarship(url: &str, title: String, fields: ScholarshipFields) -> CleanScholarship {
    let body = clean_html(&fields.common.content_html, CleanProfile::Scholarship);
    let parse_source = if body.is_empty() { &fields.common.content_html } else { &body };
    let parsed = parse_scholarship_fields(parse_source, &fields.raw);

    let apply_url = if parsed.apply_url.is_empty() {
        fields.apply_url
    } else {
        absolutize(url, &parsed.apply_url)
    };

    CleanScholarship {
        slug: last_segment_slug(url),
        title,
        description: parsed.description,
        eligibility: parsed.eligibility,
        amount: parsed.amount,
        renewable: parsed.renewable,
        deadline: parsed.deadline,
        requirements: parsed.requirements,
        apply_url,
        body,
        source_url: url.to_string(),
    }
}

/// Heading, or the document title without its site-name suffix
#[must_use]
pub fn clean_title(heading: &str, document_title: &str) -> String {
    let heading = heading.trim();
    if !heading.is_empty() && heading != document_title.trim() {
        return heading.to_string();
    }
    strip_title_suffix(document_title)
}

/// Drop a trailing ` | Site` or ` - Site` from a document title
#[must_use]
pub fn strip_title_suffix(title: &str) -> String {
    let title = title.trim();
    TITLE_SEPARATORS
        .iter()
        .find_map(|sep| title.rsplit_once(sep))
        .map(|(head, _)| head.trim())
        .filter(|head| !head.is_empty())
        .unwrap_or(title)
        .to_string()
}

/// ISO `YYYY-MM-DD` when `raw` parses as a date, trimmed `raw` otherwise
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.date().format("%Y-%m-%d").to_string();
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

fn absolutize(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Read every raw partition and write the clean content arrays
pub async fn transform_all<S: BlobStore>(store: &S, normalizer: &UrlNormalizer) -> Result<TransformSummary> {
    let mut content = CleanContent::default();
    let mut summary = TransformSummary::default();

    for partition in PARTITIONS {
        for key in store.list_keys(partition).await? {
            match read_json::<_, RawPageRecord>(store, &key).await {
                Ok(Some(record)) => content.push(record),
                Ok(None) => {}
                Err(e) => {
                    warn!(target: "sitemigrate::transform", "Skipping unreadable record {key}: {e:#}");
                    summary.skipped += 1;
                }
            }
        }
    }
    content.sort();

    summary.news = content.news.len();
    summary.scholarships = content.scholarships.len();
    summary.pages = content.pages.len();

    write_json(store, CONTENT_NEWS_KEY, &content.news).await?;
    write_json(store, CONTENT_SCHOLARSHIPS_KEY, &content.scholarships).await?;
    write_json(store, CONTENT_PAGES_KEY, &content.pages).await?;

    let navigation: Vec<NavItem> = read_json(store, NAVIGATION_KEY).await?.unwrap_or_default();
    write_json(store, CONTENT_NAV_KEY, &relative_navigation(navigation, normalizer)).await?;

    info!(
        target: "sitemigrate::transform",
        "Transform complete: {} news, {} scholarships, {} pages ({} skipped)",
        summary.news,
        summary.scholarships,
        summary.pages,
        summary.skipped
    );
    Ok(summary)
}
