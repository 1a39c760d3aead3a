//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalogue and drive the real
//! HTTP browser and JSON file sink through full crawl runs.

use shelf_crawler::browser::HttpBrowser;
use shelf_crawler::config::{validate, Config};
use shelf_crawler::crawler::Coordinator;
use shelf_crawler::output::{
    ArtifactStatus, CrawlReport, JsonFileSink, RecordSink, SinkError, SinkResult,
};
use shelf_crawler::{DetailRecord, RunResult};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, data_dir: &Path, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{}/", server.uri());
    config.crawler.catalogue_url = format!("{}/catalogue/", server.uri());
    config.crawler.max_pages = max_pages;
    config.crawler.item_delay_ms = 0; // No pacing in tests
    config.crawler.page_delay_ms = 0;
    config.browser.navigation_timeout_ms = 5000;
    config.output.data_dir = data_dir.to_string_lossy().into_owned();
    validate(&config).expect("test config should be valid");
    config
}

/// One list entry; `rating` of None leaves the star-rating element out
fn entry(slug: &str, title: &str, rating: Option<&str>) -> String {
    let rating = rating
        .map(|r| format!(r#"<p class="star-rating {}"></p>"#, r))
        .unwrap_or_default();
    format!(
        r#"<article class="product_pod">
            <div class="image_container">
                <a href="{slug}/index.html"><img src="../media/cache/{slug}.jpg" alt="{title}"></a>
            </div>
            {rating}
            <h3><a href="{slug}/index.html" title="{title}">{title}</a></h3>
            <div class="product_price">
                <p class="price_color">£20.00</p>
                <p class="instock availability"><i class="icon-ok"></i> In stock</p>
            </div>
        </article>"#
    )
}

fn list_page(entries: &[String]) -> String {
    format!(
        r#"<html><head><title>All products</title></head><body>
        <section><ol class="row">{}</ol></section>
        </body></html>"#,
        entries.join("\n")
    )
}

fn detail_page(title: &str) -> String {
    format!(
        r#"<html><body>
        <ul class="breadcrumb">
            <li><a href="../../index.html">Home</a></li>
            <li><a href="../category/books_1/index.html">Books</a></li>
            <li><a href="../category/books/poetry_23/index.html">Poetry</a></li>
            <li class="active">{title}</li>
        </ul>
        <div id="product_gallery"><div class="thumbnail">
            <div class="item active"><img src="../../media/cache/full/{title}.jpg" alt="{title}"></div>
        </div></div>
        <div class="product_main">
            <h1>{title}</h1>
            <p class="price_color">£20.00</p>
            <p class="instock availability"><i class="icon-ok"></i> In stock (7 available)</p>
            <p class="star-rating Four"></p>
        </div>
        <div id="product_description" class="sub-header"><h2>Product Description</h2></div>
        <p>A book about {title}.</p>
        <table class="table table-striped">
            <tr><th>UPC</th><td>upc-{title}</td></tr>
            <tr><th>Product Type</th><td>Books</td></tr>
            <tr><td>orphan cell</td></tr>
        </table>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mounts a list page and the detail page of every item on it
async fn mount_catalogue_page(server: &MockServer, page: u32, items: &[&str]) {
    let entries: Vec<String> = items
        .iter()
        .map(|slug| entry(slug, slug, Some("Three")))
        .collect();
    mount_html(
        server,
        &format!("/catalogue/page-{}.html", page),
        list_page(&entries),
    )
    .await;
    for slug in items {
        mount_html(
            server,
            &format!("/catalogue/{}/index.html", slug),
            detail_page(slug),
        )
        .await;
    }
}

async fn run(config: Config) -> CrawlReport {
    let browser = HttpBrowser::launch(&config.browser).expect("browser should launch");
    let sink = JsonFileSink::new(&config.output.data_dir, &config.output.books_subdir);
    Coordinator::with_parts(config, Box::new(browser), Box::new(sink))
        .expect("coordinator should build")
        .run()
        .await
        .expect("crawl should not fail fatally")
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("artifact should be readable");
    serde_json::from_str(&content).expect("artifact should be valid JSON")
}

fn written_path(report: &CrawlReport) -> &Path {
    match &report.artifact {
        ArtifactStatus::Written(path) => path.as_path(),
        other => panic!("expected a written artifact, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_crawl_writes_items_and_combined_result() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let data_dir = tmp.path().join("data");

    mount_catalogue_page(&server, 1, &["alpha_1", "beta_2"]).await;
    mount_catalogue_page(&server, 2, &["gamma_3"]).await;

    let report = run(create_test_config(&server, &data_dir, 2)).await;

    assert_eq!(report.result.metadata.total_books, 3);
    assert_eq!(report.result.metadata.pages_scraped, 2);
    assert_eq!(report.result.metadata.degraded_books, 0);

    // Per-item artifacts keyed by title slug
    for slug in ["alpha_1", "beta_2", "gamma_3"] {
        let item = read_json(&data_dir.join("books").join(format!("{}.json", slug)));
        assert_eq!(item["title"], slug);
        assert_eq!(item["stockInfo"]["inStock"], true);
        assert_eq!(item["stockInfo"]["quantity"], "7");
        assert_eq!(item["category"], "Poetry");
        assert_eq!(item["rate"], "Four");
        assert_eq!(item["productInfo"].as_object().unwrap().len(), 2);
        assert_eq!(item["description"], format!("A book about {}.", slug));
        assert_eq!(
            item["thumbnail"],
            format!("{}/media/cache/full/{}.jpg", server.uri(), slug)
        );
        assert!(item["scrapedAt"].as_str().unwrap().ends_with('Z'));
    }

    // Combined artifact keeps page-then-item order
    let path = written_path(&report);
    assert!(path.starts_with(&data_dir));
    assert!(!path.file_name().unwrap().to_string_lossy().contains(':'));

    let combined = read_json(path);
    assert_eq!(combined["metadata"]["totalBooks"], 3);
    assert_eq!(combined["metadata"]["pagesScraped"], 2);
    assert!(combined["metadata"]["durationSeconds"].as_f64().unwrap() >= 0.0);
    let titles: Vec<&str> = combined["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["bookTitle"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["alpha_1", "beta_2", "gamma_3"]);
    assert_eq!(
        combined["books"][0]["bookLink"],
        format!("{}/catalogue/alpha_1/index.html", server.uri())
    );
}

#[tokio::test]
async fn test_missing_rating_uses_sentinel() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    let entries = vec![
        entry("rated_1", "Rated", Some("Five")),
        entry("unrated_2", "Unrated", None),
    ];
    mount_html(&server, "/catalogue/page-1.html", list_page(&entries)).await;
    // Detail pages are absent, so both items stay summary-only

    let report = run(create_test_config(&server, tmp.path(), 1)).await;
    let books = &report.result.books;

    assert_eq!(books.len(), 2);
    let combined = read_json(written_path(&report));
    assert_eq!(combined["books"][0]["rate"], "Five");
    assert_eq!(combined["books"][1]["rate"], "No Rating");
    assert_eq!(combined["books"][1]["stock"], "In Stock");
    assert_eq!(
        combined["books"][1]["thumbnail"],
        format!("{}/media/cache/unrated_2.jpg", server.uri())
    );
    assert!(combined["books"][1].get("bookDetails").is_none());
}

#[tokio::test]
async fn test_missing_list_page_is_skipped() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_catalogue_page(&server, 1, &["first_1"]).await;
    mount_status(&server, "/catalogue/page-2.html", 404).await;
    mount_catalogue_page(&server, 3, &["third_3"]).await;

    let report = run(create_test_config(&server, tmp.path(), 3)).await;

    let titles: Vec<&str> = report.result.books.iter().map(|b| b.title()).collect();
    assert_eq!(titles, vec!["first_1", "third_3"]);
    assert_eq!(report.result.metadata.pages_scraped, 2);
    assert_eq!(report.result.metadata.failed_pages, vec![2]);

    let combined = read_json(written_path(&report));
    assert_eq!(combined["metadata"]["failedPages"], serde_json::json!([2]));
}

#[tokio::test]
async fn test_detail_server_error_degrades_item() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    let entries = vec![
        entry("good_1", "good_1", Some("One")),
        entry("broken_2", "broken_2", Some("Two")),
    ];
    mount_html(&server, "/catalogue/page-1.html", list_page(&entries)).await;
    mount_html(&server, "/catalogue/good_1/index.html", detail_page("good_1")).await;
    mount_status(&server, "/catalogue/broken_2/index.html", 500).await;

    let report = run(create_test_config(&server, tmp.path(), 1)).await;

    assert!(!report.result.books[0].is_degraded());
    assert!(report.result.books[1].is_degraded());
    assert_eq!(report.result.metadata.degraded_books, 1);

    assert!(tmp.path().join("books").join("good_1.json").exists());
    assert!(!tmp.path().join("books").join("broken_2.json").exists());

    let combined = read_json(written_path(&report));
    assert_eq!(combined["books"][1]["title"], "broken_2");
    assert_eq!(combined["books"][1]["rate"], "Two");
}

/// Delegates to a JSON sink but refuses one item key
struct FailingSink {
    inner: JsonFileSink,
    fail_key: String,
}

impl RecordSink for FailingSink {
    fn write_detail(&self, key: &str, record: &DetailRecord) -> SinkResult<PathBuf> {
        if key == self.fail_key {
            return Err(SinkError::Io {
                path: self.inner.books_dir().join(key),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.write_detail(key, record)
    }

    fn write_run(&self, key: &str, result: &RunResult) -> SinkResult<PathBuf> {
        self.inner.write_run(key, result)
    }
}

#[tokio::test]
async fn test_item_error_isolated_to_that_item() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    let items = ["item_1", "item_2", "item_3", "item_4", "item_5"];
    mount_catalogue_page(&server, 1, &items).await;

    let config = create_test_config(&server, tmp.path(), 1);
    let browser = HttpBrowser::launch(&config.browser).unwrap();
    let sink = FailingSink {
        inner: JsonFileSink::new(tmp.path(), "books"),
        fail_key: "item_3".to_string(),
    };
    let report = Coordinator::with_parts(config, Box::new(browser), Box::new(sink))
        .unwrap()
        .run()
        .await
        .unwrap();

    let books = &report.result.books;
    assert_eq!(books.len(), 5);
    for (i, book) in books.iter().enumerate() {
        assert_eq!(book.title(), items[i]);
        assert_eq!(book.is_degraded(), items[i] == "item_3");
    }

    let combined = read_json(written_path(&report));
    let third = &combined["books"][2];
    assert_eq!(third["title"], "item_3");
    assert!(third.get("bookDetails").is_none());
    assert!(combined["books"][3].get("bookDetails").is_some());

    let mut written: Vec<String> = std::fs::read_dir(tmp.path().join("books"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(
        written,
        vec!["item_1.json", "item_2.json", "item_4.json", "item_5.json"]
    );
}

#[tokio::test]
async fn test_nothing_collected_creates_no_artifacts() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let data_dir = tmp.path().join("data");

    // No mocks mounted: every page answers 404
    let report = run(create_test_config(&server, &data_dir, 3)).await;

    assert_eq!(report.artifact, ArtifactStatus::Skipped);
    assert_eq!(report.result.metadata.total_books, 0);
    assert_eq!(report.result.metadata.pages_scraped, 0);
    assert_eq!(report.result.metadata.failed_pages, vec![1, 2, 3]);
    assert!(!data_dir.exists());
    assert!(!data_dir.join("books").exists());
}

#[tokio::test]
async fn test_empty_page_stops_when_configured() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    mount_catalogue_page(&server, 1, &["only_1"]).await;
    mount_html(&server, "/catalogue/page-2.html", list_page(&[])).await;
    mount_catalogue_page(&server, 3, &["never_3"]).await;

    let mut config = create_test_config(&server, tmp.path(), 3);
    config.crawler.stop_on_empty_page = true;
    let report = run(config).await;

    let titles: Vec<&str> = report.result.books.iter().map(|b| b.title()).collect();
    assert_eq!(titles, vec!["only_1"]);
    assert_eq!(report.pages_attempted, 2);
}

#[tokio::test]
async fn test_retry_policy_recovers_flaky_page() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    // First request fails, later ones succeed
    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_catalogue_page(&server, 1, &["flaky_1"]).await;

    let mut config = create_test_config(&server, tmp.path(), 1);
    config.retry.max_retries = 2;
    config.retry.initial_backoff_ms = 10;
    let report = run(config).await;

    assert_eq!(report.result.metadata.pages_scraped, 1);
    assert_eq!(report.result.books.len(), 1);
    assert!(!report.result.books[0].is_degraded());
}
