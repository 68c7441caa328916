//! URL-path based content classification.
//!
//! Rules are evaluated in order and the first match wins. Item patterns sit
//! before the listing patterns that would also match them, so moving a rule
//! changes results.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Content type tag attached to every crawled page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Page,
    News,
    NewsListing,
    Scholarship,
    ScholarshipListing,
    Grant,
    Staff,
    Board,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::News => "news",
            Self::NewsListing => "news-listing",
            Self::Scholarship => "scholarship",
            Self::ScholarshipListing => "scholarship-listing",
            Self::Grant => "grant",
            Self::Staff => "staff",
            Self::Board => "board",
        }
    }

    /// Blob store partition that raw records of this type are written to
    #[must_use]
    pub fn partition(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Scholarship => "scholarships",
            Self::Grant => "grants",
            Self::Staff => "staff",
            Self::Board => "board",
            Self::Page | Self::NewsListing | Self::ScholarshipListing => "pages",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every partition a crawl can write to
pub const PARTITIONS: &[&str] = &["pages", "news", "scholarships", "grants", "staff", "board"];

struct ClassificationRule {
    pattern: Regex,
    content_type: ContentType,
}

fn rule(pattern: &str, content_type: ContentType) -> ClassificationRule {
    ClassificationRule {
        pattern: Regex::new(pattern).expect("CLASSIFICATION_RULES: hardcoded regex is valid"),
        content_type,
    }
}

/// Ordered (pattern, type) rules matched against the lower-cased URL path
static CLASSIFICATION_RULES: LazyLock<Vec<ClassificationRule>> = LazyLock::new(|| {
    vec![
        rule(r"^/news/[^/]+$", ContentType::News),
        rule(r"(^|/)news(/|$)", ContentType::NewsListing),
        rule(r"^/scholarships/[^/]+$", ContentType::Scholarship),
        rule(r"(^|/)scholarships(/|$)", ContentType::ScholarshipListing),
        rule(r"(^|/)grants?(/|$)", ContentType::Grant),
        rule(r"(^|/)(staff|our-team|team)(/|$)", ContentType::Staff),
        rule(r"(^|/)(board|board-of-directors|trustees)(/|$)", ContentType::Board),
    ]
});

/// Classify a path such as `/news/my-article`
#[must_use]
pub fn classify_path(path: &str) -> ContentType {
    let path = path.to_ascii_lowercase();
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path.as_str()
    };

    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(path))
        .map_or(ContentType::Page, |rule| rule.content_type)
}

/// Classify an absolute URL by its path
#[must_use]
pub fn classify_url(url: &str) -> ContentType {
    match Url::parse(url) {
        Ok(parsed) => classify_path(parsed.path()),
        Err(_) => ContentType::Page,
    }
}
