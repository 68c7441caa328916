//! Clean content records consumed by the rebuilt site.

use serde::{Deserialize, Serialize};

use super::field_parser::Renewable;
use crate::page_extractor::schema::{ContentImage, NavItem, PersonCard};
use crate::utils::UrlNormalizer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanNews {
    pub slug: String,
    pub title: String,
    /// `YYYY-MM-DD` when the source date parses, the source text otherwise
    pub date: String,
    pub author: String,
    pub category: String,
    pub featured_image: String,
    pub excerpt: String,
    pub body: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanScholarship {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub eligibility: Vec<String>,
    pub amount: String,
    pub renewable: Renewable,
    pub deadline: String,
    pub requirements: Vec<String>,
    pub apply_url: String,
    pub body: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanMember {
    pub name: String,
    pub role: String,
    pub email: String,
    pub photo: ContentImage,
    pub bio: String,
}

impl From<PersonCard> for CleanMember {
    fn from(card: PersonCard) -> Self {
        Self {
            name: card.name,
            role: card.role,
            email: card.email,
            photo: card.photo,
            bio: card.bio_html,
        }
    }
}

/// Pages, listings, grants, staff and board pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanPage {
    pub slug: String,
    pub title: String,
    /// Content type the page was crawled as (`page`, `grant`, `staff`, ...)
    pub section: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<CleanMember>,
    pub source_url: String,
}

/// Rewrite in-site navigation hrefs to site-relative paths
#[must_use]
pub fn relative_navigation(items: Vec<NavItem>, normalizer: &UrlNormalizer) -> Vec<NavItem> {
    items
        .into_iter()
        .map(|item| NavItem {
            href: normalizer.site_relative_path(&item.href).unwrap_or(item.href),
            children: relative_navigation(item.children, normalizer),
            label: item.label,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_hrefs_become_relative() {
        let normalizer = UrlNormalizer::new("https://example.org").expect("valid url");
        let nav = vec![NavItem {
            label: "About".to_string(),
            href: "https://www.example.org/about".to_string(),
            children: vec![NavItem {
                label: "Facebook".to_string(),
                href: "https://facebook.com/x".to_string(),
                children: Vec::new(),
            }],
        }];

        let nav = relative_navigation(nav, &normalizer);
        assert_eq!(nav[0].href, "/about");
        assert_eq!(nav[0].children[0].href, "https://facebook.com/x");
    }

    #[test]
    fn test_scholarship_wire_shape() {
        let record = CleanScholarship {
            renewable: Renewable::from_text("Yes"),
            ..CleanScholarship::default()
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["renewable"]["isRenewable"], true);
        assert!(json.get("applyUrl").is_some());
        assert!(json.get("sourceUrl").is_some());
    }
}
