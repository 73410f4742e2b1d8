//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end with the real HTTP fetcher and HTML extractor.

use hostcrawl::config::{Config, LedgerBackend, LedgerConfig};
use hostcrawl::crawler::{crawl, run_crawl};
use hostcrawl::store::{open_store, DedupStore};
use hostcrawl::site_id;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `root_url` with a memory ledger
fn create_test_config(root_url: &str) -> Config {
    let mut config = Config::default();
    config.crawler.root_url = root_url.to_string();
    config.crawler.workers = 3;
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config
}

fn html_page(links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", anchors))
        .insert_header("content-type", "text/html")
}

/// Mounts the standard site: "/" links to itself twice and to three pages
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/", "/", "/a", "/b", "/c"]))
        .expect(1)
        .mount(server)
        .await;

    for page in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(&[]))
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let root = format!("{}/", server.uri());
    let config = create_test_config(&root);
    let store = Arc::new(open_store(&config.ledger).expect("Failed to open ledger"));

    let report = run_crawl(&config, store.clone())
        .await
        .expect("Crawl failed");

    assert_eq!(report.discovered, 4);
    assert_eq!(report.finished, 4);
    assert_eq!(report.links_enqueued, 3);
    assert_eq!(report.fetch_failures, 0);
    assert_eq!(report.ledger_entries, 4);

    let sites = store.visited_sites().expect("Failed to read ledger");
    assert_eq!(sites.len(), 4);
    for page in ["", "a", "b", "c"] {
        let id = site_id(&format!("{}/{}", server.uri(), page));
        assert!(sites.contains(&id), "missing {} in {:?}", id, sites);
    }
}

#[tokio::test]
async fn test_failed_page_does_not_stall_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/ok", "/broken"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_page(&["/broken"]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()));
    let store = Arc::new(open_store(&config.ledger).unwrap());

    let report = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        run_crawl(&config, store),
    )
    .await
    .expect("Crawl did not complete")
    .expect("Crawl failed");

    assert_eq!(report.discovered, 3);
    assert_eq!(report.finished, 3);
    assert_eq!(report.fetch_failures, 1);
}

#[tokio::test]
async fn test_off_host_and_fragment_links_filtered() {
    let server = MockServer::start().await;
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();
    // Same machine, different host name
    let local_alias = format!("http://localhost:{}/a", port);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&[
            "https://other.example/x",
            local_alias.as_str(),
            "/docs#intro",
            "/docs#usage",
            "docs",
        ]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()));
    let store = Arc::new(open_store(&config.ledger).unwrap());

    let report = run_crawl(&config, store).await.unwrap();

    assert_eq!(report.discovered, 2);
    assert_eq!(report.links_enqueued, 1);
    assert_eq!(report.skipped_links, 2);
}

#[tokio::test]
async fn test_file_ledger_persists_between_runs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/a", "/b", "/c"]))
        .mount(&server)
        .await;
    for page in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(&[]))
            .mount(&server)
            .await;
    }

    let dir = tempdir().unwrap();
    let ledger_path = dir.path().join("visited.json");
    let mut config = create_test_config(&format!("{}/", server.uri()));
    config.ledger = LedgerConfig {
        backend: LedgerBackend::File,
        path: Some(ledger_path.to_string_lossy().into_owned()),
    };

    let first = crawl(config.clone(), false).await.unwrap();
    assert_eq!(first.finished, 4);
    assert!(ledger_path.exists());

    // Everything is already recorded: only the root is fetched again
    let second = crawl(config.clone(), false).await.unwrap();
    assert_eq!(second.discovered, 1);
    assert_eq!(second.links_enqueued, 0);
    assert_eq!(second.ledger_entries, 4);
    assert_eq!(second.visited_sites, first.visited_sites);

    let fresh = crawl(config, true).await.unwrap();
    assert_eq!(fresh.discovered, 4);
    assert_eq!(fresh.ledger_entries, 4);
    assert_eq!(fresh.visited_sites.len(), 4);
    assert!(fresh
        .visited_sites
        .contains(&site_id(&format!("{}/b", server.uri()))));
}

#[tokio::test]
async fn test_sqlite_ledger_backend() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempdir().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()));
    config.ledger = LedgerConfig {
        backend: LedgerBackend::Sqlite,
        path: Some(dir.path().join("ledger.db").to_string_lossy().into_owned()),
    };

    let report = crawl(config.clone(), false).await.unwrap();
    assert_eq!(report.ledger_entries, 4);

    let reopened = open_store(&config.ledger).unwrap();
    assert_eq!(reopened.visited_count().unwrap(), 4);
}
