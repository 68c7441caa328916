//! Known field labels and label-text helpers.

use std::sync::LazyLock;

use regex::Regex;

/// Field labels recognised in scholarship bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLabel {
    Eligibility,
    Amount,
    Renewable,
    Deadline,
    Requirements,
    Apply,
}

impl FieldLabel {
    pub const ALL: [FieldLabel; 6] = [
        Self::Eligibility,
        Self::Amount,
        Self::Renewable,
        Self::Deadline,
        Self::Requirements,
        Self::Apply,
    ];

    /// Accepted spellings, lower-case, without the trailing colon
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Eligibility => &["eligibility", "eligibility criteria", "who is eligible"],
            Self::Amount => &["amount", "award amount", "award"],
            Self::Renewable => &["renewable", "renewability"],
            Self::Deadline => &["deadline", "application deadline", "due date"],
            Self::Requirements => &["requirements", "application requirements"],
            Self::Apply => &["apply", "how to apply", "to apply", "apply now"],
        }
    }

    /// Label of emphasis text such as `Eligibility:` or ` DEADLINE `
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        let normalized = normalize_label(text);
        if normalized.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|label| label.aliases().contains(&normalized.as_str()))
    }
}

/// Lower-cased, whitespace-collapsed label text without a trailing colon
fn normalize_label(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_lowercase()
}

fn alias_alternation() -> String {
    let mut aliases: Vec<&str> = FieldLabel::ALL
        .into_iter()
        .flat_map(|label| label.aliases().iter().copied())
        .collect();
    // Longest first so "application deadline" wins over "deadline"
    aliases.sort_by_key(|alias| std::cmp::Reverse(alias.len()));
    aliases
        .iter()
        .map(|alias| regex::escape(alias).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

/// `Label:` in running text, at the start or after whitespace/punctuation
static INLINE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:^|[\s.;,])((?:{})\s*:)", alias_alternation()))
        .expect("INLINE_LABEL: hardcoded regex is valid")
});

/// One or more leaked `Label:` tokens at the end of recovered text
static TRAILING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:\s*\b(?:{})\s*:)+\s*$", alias_alternation()))
        .expect("TRAILING_LABEL: hardcoded regex is valid")
});

/// Remove leaked trailing labels and surrounding whitespace
#[must_use]
pub fn scrub_trailing_labels(text: &str) -> String {
    TRAILING_LABEL.replace(text.trim(), "").trim().to_string()
}

/// Split text at inline `Label:` markers.
///
/// The first segment carries `None` when text precedes the first label.
/// Each label owns the text up to the next label.
#[must_use]
pub fn split_at_labels(text: &str) -> Vec<(Option<FieldLabel>, String)> {
    let mut segments = Vec::new();
    let mut current: Option<FieldLabel> = None;
    let mut start = 0;

    for caps in INLINE_LABEL.captures_iter(text) {
        let Some(marker) = caps.get(1) else {
            continue;
        };
        let segment = text[start..marker.start()].trim();
        if current.is_some() || !segment.is_empty() {
            segments.push((current, segment.to_string()));
        }
        current = FieldLabel::from_text(marker.as_str());
        start = marker.end();
    }

    let tail = text[start..].trim();
    if current.is_some() || !tail.is_empty() {
        segments.push((current, tail.to_string()));
    }
    segments
}

/// Label that `text` begins with, if any
#[must_use]
pub fn leading_label(text: &str) -> Option<FieldLabel> {
    match split_at_labels(text.trim_start()).first() {
        Some((Some(label), _)) => Some(*label),
        _ => None,
    }
}

/// Text after the last `Label:` of `label` in `text`, or `text` itself
#[must_use]
pub fn after_last_occurrence(text: &str, label: FieldLabel) -> String {
    let mut result = text.trim().to_string();
    for (found, segment) in split_at_labels(text) {
        if found == Some(label) {
            result = segment;
        }
    }
    result
}

/// Split a loosely delimited list (`;`, bullets, newlines) into items
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    text.split(['\n', ';', '•', '·'])
        .map(|item| item.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '*'))
        .map(scrub_trailing_labels)
        .filter(|item| !item.is_empty())
        .collect()
}
