//! URL and path manipulation utilities.
//!
//! This module provides the link normaliser used by the crawl scheduler and
//! the slug helpers used to derive storage keys and clean-record slugs.

use anyhow::{Context, Result};
use url::Url;

use super::constants::DENIED_EXTENSIONS;

/// Canonicalises discovered links against one site's origins.
///
/// The allowed origins are the apex host of the site URL plus its `www.`
/// variant, so `https://example.org` and `https://www.example.org` are
/// treated as the same site.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    base: Url,
    allowed_hosts: Vec<String>,
}

impl UrlNormalizer {
    /// Build a normaliser for the site rooted at `site_url`
    pub fn new(site_url: &str) -> Result<Self> {
        let base = Url::parse(site_url).with_context(|| format!("Invalid site URL: {site_url}"))?;
        let host = base
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Site URL has no host: {site_url}"))?;

        Ok(Self {
            allowed_hosts: allowed_hosts_for(host),
            base,
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Normalise `href` relative to the site base URL
    #[must_use]
    pub fn normalize(&self, href: &str) -> Option<String> {
        self.normalize_relative_to(href, &self.base)
    }

    /// Normalise `href` relative to the page it was found on.
    ///
    /// Returns `None` when the href does not parse, leaves the site, uses a
    /// non-http scheme, or points at a denied file extension.
    #[must_use]
    pub fn normalize_relative_to(&self, href: &str, page_url: &Url) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let mut url = page_url.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?;
        if !self.is_allowed_host(host) {
            return None;
        }

        if has_denied_extension(url.path()) {
            return None;
        }

        url.set_fragment(None);

        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
            url.set_path(&trimmed);
        }

        Some(url.to_string())
    }

    #[must_use]
    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| *allowed == host)
    }

    /// Site-relative form (`/path?query`) of an absolute URL on this site
    #[must_use]
    pub fn site_relative_path(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        if !self.is_allowed_host(parsed.host_str()?) {
            return None;
        }
        let mut relative = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            relative.push('?');
            relative.push_str(query);
        }
        Some(relative)
    }
}

/// Apex host plus its `www.` variant
fn allowed_hosts_for(host: &str) -> Vec<String> {
    let host = host.to_ascii_lowercase();
    let apex = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let www = format!("www.{apex}");
    vec![apex, www]
}

fn has_denied_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            DENIED_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Storage slug for a page URL.
///
/// Path segments are sanitised to `[a-z0-9_-]` and joined with `--`; the
/// root path becomes `index`. A query string, when present, is appended as
/// a `q-` segment so paginated variants do not collide.
#[must_use]
pub fn page_slug(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return sanitize_segment(url);
    };

    let mut parts = slug_segments(&parsed);
    if parts.is_empty() {
        parts.push("index".to_string());
    }

    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        parts.push(format!("q-{}", sanitize_segment(&decode_component(query))));
    }

    parts.join("--")
}

/// Last path segment of a URL, sanitised. Root becomes `index`.
#[must_use]
pub fn last_segment_slug(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| slug_segments(&parsed).pop())
        .unwrap_or_else(|| "index".to_string())
}

/// `/`-joined sanitised path of a URL. Root becomes `index`.
#[must_use]
pub fn path_slug(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return sanitize_segment(url);
    };
    let joined = slug_segments(&parsed).join("/");

    if joined.is_empty() {
        "index".to_string()
    } else {
        joined
    }
}

/// Decoded, sanitised, non-empty path segments of `url`
fn slug_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| sanitize_segment(&decode_component(s)))
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Percent-decode a path or query component; invalid UTF-8 keeps the raw text
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// ASCII stand-in for common Latin letters with diacritics
fn fold_latin(ch: char) -> Option<char> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ś' | 'š' => 's',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return None,
    };
    Some(folded)
}

fn sanitize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut last_dash = false;
    for ch in segment.chars().flat_map(char::to_lowercase) {
        // Apostrophes join words: "o'brien" -> "obrien"
        if matches!(ch, '\'' | '\u{2019}') {
            continue;
        }
        let ch = fold_latin(ch).unwrap_or(ch);
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// Check if a URL is valid
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> UrlNormalizer {
        UrlNormalizer::new("https://www.example.org/").expect("valid site url")
    }

    #[test]
    fn test_resolves_relative_links() {
        let n = normalizer();
        assert_eq!(
            n.normalize("/about/staff/"),
            Some("https://www.example.org/about/staff".to_string())
        );
        let page = Url::parse("https://www.example.org/news/").expect("url");
        assert_eq!(
            n.normalize_relative_to("my-article", &page),
            Some("https://www.example.org/news/my-article".to_string())
        );
    }

    #[test]
    fn test_accepts_apex_and_www() {
        let n = normalizer();
        assert!(n.normalize("https://example.org/grants").is_some());
        assert!(n.normalize("https://WWW.EXAMPLE.ORG/grants").is_some());
        assert!(n.normalize("https://blog.example.org/grants").is_none());
        assert!(n.normalize("https://other.org/").is_none());
    }

    #[test]
    fn test_strips_fragment_and_keeps_query() {
        let n = normalizer();
        assert_eq!(
            n.normalize("/news/?page=2#top"),
            Some("https://www.example.org/news?page=2".to_string())
        );
    }

    #[test]
    fn test_root_keeps_slash() {
        let n = normalizer();
        assert_eq!(
            n.normalize("https://www.example.org"),
            Some("https://www.example.org/".to_string())
        );
        assert_eq!(
            n.normalize("/#main"),
            Some("https://www.example.org/".to_string())
        );
    }

    #[test]
    fn test_rejects_denied_extensions_and_schemes() {
        let n = normalizer();
        assert!(n.normalize("/files/report.PDF").is_none());
        assert!(n.normalize("/uploads/photo.jpg?size=2").is_none());
        assert!(n.normalize("mailto:info@example.org").is_none());
        assert!(n.normalize("javascript:void(0)").is_none());
        assert!(n.normalize("tel:5551234").is_none());
        assert!(n.normalize("").is_none());
        // A dotted directory name is not an extension
        assert!(n.normalize("/.well-known").is_some());
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug("https://www.example.org/"), "index");
        assert_eq!(
            page_slug("https://www.example.org/news/My Article"),
            "news--my-article"
        );
        assert_eq!(
            page_slug("https://www.example.org/news?page=2"),
            "news--q-page-2"
        );
    }

    #[test]
    fn test_slugs_decode_percent_escapes() {
        assert_eq!(
            page_slug("https://www.example.org/news/caf%C3%A9-night"),
            "news--cafe-night"
        );
        assert_eq!(
            last_segment_slug("https://www.example.org/scholarships/O%27Brien%20Award"),
            "obrien-award"
        );
        assert_eq!(
            path_slug("https://www.example.org/about/%E2%80%9Cour%E2%80%9D%20team"),
            "about/our-team"
        );
        assert_eq!(
            page_slug("https://www.example.org/search?q=spring+gala"),
            "search--q-q-spring-gala"
        );
        // Undecodable bytes still produce a usable slug
        assert_eq!(last_segment_slug("https://www.example.org/a%FFb"), "a-ffb");
    }

    #[test]
    fn test_segment_slugs() {
        assert_eq!(
            last_segment_slug("https://www.example.org/scholarships/smith-award"),
            "smith-award"
        );
        assert_eq!(last_segment_slug("https://www.example.org/"), "index");
        assert_eq!(
            path_slug("https://www.example.org/about/our-team"),
            "about/our-team"
        );
    }

    #[test]
    fn test_site_relative_path() {
        let n = normalizer();
        assert_eq!(
            n.site_relative_path("https://example.org/about?x=1"),
            Some("/about?x=1".to_string())
        );
        assert_eq!(n.site_relative_path("https://other.org/about"), None);
    }
}
