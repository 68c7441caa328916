//! Link normaliser properties

use proptest::prelude::*;
use sitemigrate::UrlNormalizer;
use sitemigrate::crawl_engine::{ContentType, classify_url};
use sitemigrate::utils::page_slug;

fn normalizer() -> UrlNormalizer {
    UrlNormalizer::new("https://example.org").unwrap()
}

fn path_segment() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,11}"
}

fn site_path() -> impl Strategy<Value = String> {
    prop::collection::vec(path_segment(), 0..4).prop_map(|segments| format!("/{}", segments.join("/")))
}

proptest! {
    #[test]
    fn normalizing_twice_is_idempotent(path in site_path(), slash in any::<bool>(), fragment in "[a-z]{0,6}") {
        let n = normalizer();
        let mut href = path;
        if slash && href != "/" {
            href.push('/');
        }
        if !fragment.is_empty() {
            href = format!("{href}#{fragment}");
        }

        let once = n.normalize(&href).unwrap();
        prop_assert_eq!(n.normalize(&once), Some(once.clone()));
        prop_assert!(!once.contains('#'));
    }

    #[test]
    fn foreign_hosts_are_rejected(host in "[a-z]{3,10}\\.(com|net|io)", path in site_path()) {
        let href = format!("https://{host}{path}");
        prop_assert_eq!(normalizer().normalize(&href), None);
    }

    #[test]
    fn denied_extensions_are_rejected(
        path in site_path(),
        ext in prop::sample::select(vec!["pdf", "docx", "JPG", "png", "zip", "mp4"]),
    ) {
        let href = format!("{}/file.{ext}", path.trim_end_matches('/'));
        prop_assert_eq!(normalizer().normalize(&href), None);
    }

    #[test]
    fn slugs_are_filesystem_safe(path in site_path(), query in "[a-z=&]{0,8}") {
        let href = if query.is_empty() { path } else { format!("{path}?{query}") };
        let url = normalizer().normalize(&href).unwrap();
        let slug = page_slug(&url);
        prop_assert!(!slug.is_empty());
        prop_assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}

#[test]
fn test_trailing_slash_and_root() {
    let n = normalizer();
    assert_eq!(n.normalize("/about/").unwrap(), "https://example.org/about");
    assert_eq!(n.normalize("/").unwrap(), "https://example.org/");
    assert_eq!(n.normalize("https://example.org").unwrap(), "https://example.org/");
    assert_eq!(n.normalize("/news?page=2#top").unwrap(), "https://example.org/news?page=2");
}

#[test]
fn test_www_variant_is_same_site() {
    let n = normalizer();
    assert_eq!(
        n.normalize("https://www.example.org/grants").unwrap(),
        "https://www.example.org/grants"
    );
    assert_eq!(n.normalize("mailto:info@example.org"), None);
    assert_eq!(n.normalize("http://[broken"), None);
}

#[test]
fn test_specific_rules_win_over_general_ones() {
    assert_eq!(classify_url("https://example.org/news/my-article"), ContentType::News);
    assert_eq!(classify_url("https://example.org/about/news"), ContentType::NewsListing);
    assert_eq!(
        classify_url("https://example.org/scholarships/smith-award"),
        ContentType::Scholarship
    );
    assert_eq!(classify_url("https://example.org/about"), ContentType::Page);
}
