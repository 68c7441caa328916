//! Page data extraction.
//!
//! Turns a rendered DOM snapshot into a [`schema::RawPageRecord`]: page
//! metadata, type-specific fields, discovered links and images.

pub mod dom;
pub mod extractors;
pub mod navigation;
pub mod schema;

pub use dom::HtmlDocument;
pub use extractors::{build_record, discover_images, discover_links, extract_fields, extract_meta};
pub use navigation::{extract_navigation, navigation_links};
