//! UTF-8-safe string helpers
//!
//! Truncation never slices through a multi-byte character, which matters for
//! excerpts built from scraped prose with curly quotes or accented names.

/// Find a safe byte index for truncation, preferring word boundaries.
///
/// Returns the byte index of the last whitespace or `boundary_chars`
/// character within the first `max_chars` characters, falling back to the
/// `max_chars`-th character itself.
///
/// # Examples
/// ```
/// # use sitemigrate::utils::string_utils::safe_truncate_boundary;
/// let text = "Hello, wonderful world of Unicode!";
/// let idx = safe_truncate_boundary(text, 20, " ,;:");
/// assert_eq!(&text[..idx], "Hello, wonderful");
/// ```
#[must_use]
pub fn safe_truncate_boundary(s: &str, max_chars: usize, boundary_chars: &str) -> usize {
    let max_byte_idx = s
        .char_indices()
        .nth(max_chars)
        .map_or(s.len(), |(idx, _)| idx);

    if max_byte_idx == s.len() {
        return s.len();
    }

    s[..max_byte_idx]
        .rfind(|c: char| c.is_whitespace() || boundary_chars.contains(c))
        .unwrap_or(max_byte_idx)
}

/// Build an excerpt of at most `max_chars` characters, cut at a word
/// boundary with trailing punctuation trimmed.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = normalize_whitespace(text);
    let idx = safe_truncate_boundary(&text, max_chars, ",;:");
    if idx == text.len() {
        return text;
    }
    text[..idx]
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}

/// Collapse every whitespace run (including non-breaking spaces) to a
/// single space and trim both ends.
#[must_use]
pub fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(|c: char| c.is_whitespace() || c == '\u{a0}') {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
