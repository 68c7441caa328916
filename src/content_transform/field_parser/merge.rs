//! Merge parser output with the extractor's raw field bag.

use super::labels::{FieldLabel, after_last_occurrence, scrub_trailing_labels, split_list};
use super::{ParsedFields, Renewable};
use crate::page_extractor::schema::RawScholarshipFields;
use crate::utils::normalize_whitespace;

/// Fill slots the parser left empty from `raw`.
///
/// Parsed values always win. Raw values are cleaned first: list fields are
/// split on delimiter punctuation and leaked labels are scrubbed.
#[must_use]
pub fn merge_with_raw(mut parsed: ParsedFields, raw: &RawScholarshipFields) -> ParsedFields {
    if parsed.eligibility.is_empty() {
        parsed.eligibility = split_list(&raw.eligibility);
    }
    if parsed.requirements.is_empty() {
        parsed.requirements = split_list(&raw.requirements);
    }
    if parsed.amount.is_empty() {
        parsed.amount = clean_scalar(&raw.amount);
    }
    if parsed.deadline.is_empty() {
        parsed.deadline = clean_scalar(&after_last_occurrence(&raw.deadline, FieldLabel::Deadline));
    }
    if parsed.renewable.details.is_empty() {
        parsed.renewable = Renewable::from_text(&clean_scalar(&raw.renewable));
    }
    parsed
}

fn clean_scalar(text: &str) -> String {
    scrub_trailing_labels(&normalize_whitespace(text))
}
