//! Structured field parser for scholarship bodies.
//!
//! Scholarship pages mark their fields only with bold label text followed
//! by a list or by the rest of the paragraph. Parsing is best-effort: a
//! field that cannot be recovered is left empty, never reported as an error.
//!
//! Precedence per field: same-paragraph text, then the next paragraph
//! (unless it starts with a different label), then the raw field bag the
//! extractor captured. The first label occurrence that yields a value wins.

pub mod labels;
pub mod merge;
pub mod recovery;

use serde::{Deserialize, Serialize};

use crate::page_extractor::schema::RawScholarshipFields;

pub use labels::FieldLabel;
pub use merge::merge_with_raw;
pub use recovery::recover_fields;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renewable {
    pub is_renewable: bool,
    pub details: String,
}

impl Renewable {
    /// Renewable iff the text starts with "yes", case-insensitively
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let details = text.trim().to_string();
        Self {
            is_renewable: details.to_lowercase().starts_with("yes"),
            details,
        }
    }
}

/// Fields recovered from one scholarship body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub description: String,
    pub eligibility: Vec<String>,
    pub amount: String,
    pub renewable: Renewable,
    pub deadline: String,
    pub requirements: Vec<String>,
    /// Raw href of the first link after an Apply label
    pub apply_url: String,
}

/// Parse `body_html`, falling back to `raw` for anything not found
#[must_use]
pub fn parse_scholarship_fields(body_html: &str, raw: &RawScholarshipFields) -> ParsedFields {
    merge_with_raw(recover_fields(body_html), raw)
}
