//! Content transformation: raw records to clean content records.
//!
//! - [`html_cleaning`]: DOM removal and serialisation primitives
//! - [`cleaner`]: type-specific content cleaning
//! - [`field_parser`]: label-driven recovery of scholarship fields
//! - [`records`] / [`transformer`]: clean record shapes and the offline pass

pub mod cleaner;
pub mod field_parser;
pub mod html_cleaning;
pub mod records;
pub mod transformer;

pub use cleaner::{CleanProfile, clean_document, clean_html, clean_page_html};
pub use field_parser::{ParsedFields, Renewable, parse_scholarship_fields};
pub use records::{CleanMember, CleanNews, CleanPage, CleanScholarship};
pub use transformer::{CleanContent, TransformSummary, transform_all};
