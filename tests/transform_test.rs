//! Crawl into memory, then derive clean content records

use sitemigrate::content_saver::{
    CONTENT_NAV_KEY, CONTENT_NEWS_KEY, CONTENT_PAGES_KEY, CONTENT_SCHOLARSHIPS_KEY, read_json,
};
use sitemigrate::content_transform::{CleanNews, CleanPage, CleanScholarship, transform_all};
use sitemigrate::crawl_engine::{NoOpProgress, crawl_site};
use sitemigrate::{MemoryBlobStore, NavItem};

mod common;
use common::{FakeSite, create_test_html, test_config, url};

fn migrated_site() -> FakeSite {
    let home = create_test_html(
        "Example Foundation",
        r#"<nav class="main-navigation"><ul>
             <li><a href="/about/">About</a></li>
             <li><a href="/scholarships/smith-award">Smith Award</a></li>
           </ul></nav>
           <main><div class="entry-content"><p>Welcome.</p>
             <a href="/news/spring-gala">Spring Gala</a></div></main>"#,
    );
    let scholarship = create_test_html(
        "Smith Award | Example Foundation",
        r#"<article><h1 class="entry-title">Smith Award</h1>
           <div class="entry-content">
             <p>Intro text.<br><br><strong>Eligibility:</strong></p>
             <ul><li>GPA 3.0</li><li>Resident</li></ul>
             <p><strong>Amount:</strong> $1,000</p>
             <p><strong>Renewable:</strong> Yes, up to 3 years.</p>
             <p><strong>Deadline:</strong> March 1</p>
             <p><strong>How to Apply:</strong> <a href="/apply/smith">Apply online</a></p>
             <div class="sharedaddy">Share this</div>
           </div></article>"#,
    );
    let news = create_test_html(
        "Spring Gala | Example Foundation",
        r#"<article><h1 class="entry-title">Spring Gala</h1>
           <time datetime="2024-03-01T18:00:00+00:00">March 1, 2024</time>
           <div class="entry-content"><p>Guests gathered for the annual gala.</p></div></article>"#,
    );

    FakeSite::new()
        .page("/", home)
        .page("/about", create_test_html("About | Example Foundation", "<main><h1>About</h1><div class=\"entry-content\"><p>Since 1990.</p></div></main>"))
        .page("/scholarships/smith-award", scholarship)
        .page("/news/spring-gala", news)
}

#[tokio::test]
async fn test_transform_derives_clean_records() {
    let site = migrated_site();
    let store = MemoryBlobStore::new();
    crawl_site(&test_config(&["/"]), &site, &store, NoOpProgress)
        .await
        .unwrap();

    let normalizer = test_config(&["/"]).url_normalizer().unwrap();
    let summary = transform_all(&store, &normalizer).await.unwrap();
    assert_eq!(summary.news, 1);
    assert_eq!(summary.scholarships, 1);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.skipped, 0);

    let scholarships: Vec<CleanScholarship> = read_json(&store, CONTENT_SCHOLARSHIPS_KEY).await.unwrap().unwrap();
    let smith = &scholarships[0];
    assert_eq!(smith.slug, "smith-award");
    assert_eq!(smith.title, "Smith Award");
    assert!(smith.description.contains("Intro text."));
    assert_eq!(smith.eligibility, vec!["GPA 3.0", "Resident"]);
    assert_eq!(smith.amount, "$1,000");
    assert!(smith.renewable.is_renewable);
    assert_eq!(smith.deadline, "March 1");
    assert_eq!(smith.apply_url, url("/apply/smith"));
    assert!(!smith.body.contains("Share this"));
    assert_eq!(smith.source_url, url("/scholarships/smith-award"));

    let news: Vec<CleanNews> = read_json(&store, CONTENT_NEWS_KEY).await.unwrap().unwrap();
    assert_eq!(news[0].slug, "spring-gala");
    assert_eq!(news[0].date, "2024-03-01");
    assert_eq!(news[0].excerpt, "Guests gathered for the annual gala.");

    let pages: Vec<CleanPage> = read_json(&store, CONTENT_PAGES_KEY).await.unwrap().unwrap();
    let slugs: Vec<&str> = pages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["about", "index"]);
    assert_eq!(pages[0].title, "About");
    assert_eq!(pages[0].section, "page");

    let nav: Vec<NavItem> = read_json(&store, CONTENT_NAV_KEY).await.unwrap().unwrap();
    assert_eq!(nav.len(), 2);
    assert_eq!(nav[0].label, "About");
    assert!(nav[0].href.starts_with("/about"));
}

#[tokio::test]
async fn test_transform_is_repeatable() {
    let site = migrated_site();
    let store = MemoryBlobStore::new();
    crawl_site(&test_config(&["/"]), &site, &store, NoOpProgress)
        .await
        .unwrap();
    let normalizer = test_config(&["/"]).url_normalizer().unwrap();

    transform_all(&store, &normalizer).await.unwrap();
    let mut first = Vec::new();
    for key in [CONTENT_NEWS_KEY, CONTENT_SCHOLARSHIPS_KEY, CONTENT_PAGES_KEY, CONTENT_NAV_KEY] {
        first.push(read_json::<_, serde_json::Value>(&store, key).await.unwrap());
    }

    transform_all(&store, &normalizer).await.unwrap();
    for (key, before) in [CONTENT_NEWS_KEY, CONTENT_SCHOLARSHIPS_KEY, CONTENT_PAGES_KEY, CONTENT_NAV_KEY]
        .into_iter()
        .zip(first)
    {
        let after = read_json::<_, serde_json::Value>(&store, key).await.unwrap();
        assert_eq!(after, before, "{key} changed between runs");
    }
}
