use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crawl_engine::content_classifier::ContentType;

/// One persisted crawl result, written once and never modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageRecord {
    pub url: String,
    pub content_type: ContentType,
    pub meta: PageMeta,
    pub extracted_data: ExtractedData,
    #[serde(default)]
    pub discovered_links: Vec<String>,
    #[serde(default)]
    pub discovered_images: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub og_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentImage {
    pub src: String,
    pub alt: String,
}

/// Fields every extractor produces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommonFields {
    /// Page heading, falling back to the document title
    pub title: String,
    /// Primary content region with scripts and styles removed
    pub content_html: String,
    /// Block-aware plain-text rendering of `content_html`
    pub content_text: String,
    pub images: Vec<ContentImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsFields {
    #[serde(flatten)]
    pub common: CommonFields,
    pub date: String,
    pub author: String,
    pub category: String,
    pub featured_image: String,
}

/// Scholarship values captured verbatim from the page, before any parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawScholarshipFields {
    pub amount: String,
    pub deadline: String,
    pub renewable: String,
    pub eligibility: String,
    pub requirements: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScholarshipFields {
    #[serde(flatten)]
    pub common: CommonFields,
    pub raw: RawScholarshipFields,
    pub apply_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericFields {
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonCard {
    pub name: String,
    pub role: String,
    pub email: String,
    pub photo: ContentImage,
    pub bio_html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingFields {
    #[serde(flatten)]
    pub common: CommonFields,
    pub members: Vec<PersonCard>,
    /// No cards matched; `page_html` holds the whole page un-decomposed
    pub degraded: bool,
    pub page_html: String,
}

/// Type-dependent field bag, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExtractedData {
    News(NewsFields),
    Scholarship(ScholarshipFields),
    Grant(GenericFields),
    StaffListing(ListingFields),
    BoardListing(ListingFields),
    Generic(GenericFields),
}

impl ExtractedData {
    #[must_use]
    pub fn common(&self) -> &CommonFields {
        match self {
            Self::News(f) => &f.common,
            Self::Scholarship(f) => &f.common,
            Self::Grant(f) | Self::Generic(f) => &f.common,
            Self::StaffListing(f) | Self::BoardListing(f) => &f.common,
        }
    }
}

/// Node of the primary navigation tree (depth <= 2)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub children: Vec<NavItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_data_is_tagged_and_flat() {
        let data = ExtractedData::News(NewsFields {
            common: CommonFields {
                title: "Gala".to_string(),
                ..CommonFields::default()
            },
            date: "2024-03-01".to_string(),
            ..NewsFields::default()
        });

        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["kind"], "news");
        assert_eq!(json["title"], "Gala");
        assert_eq!(json["contentHtml"], "");
        assert_eq!(json["date"], "2024-03-01");

        let back: ExtractedData = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, data);
    }

    #[test]
    fn test_listing_kind_names() {
        let data = ExtractedData::StaffListing(ListingFields::default());
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["kind"], "staff-listing");
    }
}
