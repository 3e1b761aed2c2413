//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! fetch, crawl and output cycle end-to-end. The HTTP client resolves a
//! made-up host name to the mock server, since seed URLs must carry a real
//! domain name rather than an IP address.

use async_trait::async_trait;
use fathom::crawler::{CrawlLimits, DomainCrawler, FetchErrorKind, FetchOptions, HttpFetcher};
use fathom::model::SearchResult;
use fathom::output::{load_session, save_session, write_markdown_dir};
use fathom::search::SearchClient;
use fathom::{crawler, Orchestrator};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOST: &str = "docs.fathom.test";

/// Creates a fetcher whose client sends every request for `hosts` to the
/// mock server
fn fetcher_for(server: &MockServer, hosts: &[&str]) -> Arc<HttpFetcher> {
    let mut builder = reqwest::Client::builder().user_agent("fathom-tests");
    for host in hosts {
        builder = builder.resolve(host, *server.address());
    }
    Arc::new(HttpFetcher::with_client(builder.build().expect("client builds")))
}

fn site_url(server: &MockServer, host: &str, path: &str) -> String {
    format!("http://{}:{}{}", host, server.address().port(), path)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html lang=\"en\"><head>{}</html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts a four-page site: `/` links to `/a` and `/b`, `/a` links to `/c`
async fn mount_site(server: &MockServer) {
    let port = server.address().port();
    mount_page(
        server,
        "/",
        &format!(
            r#"<title>Home</title>
            <meta name="description" content="The home page">
            <script type="application/ld+json">{{"@type": "WebSite", "name": "Docs"}}</script>
            </head><body>
            <a href="/a">A</a>
            <a href="b">B</a>
            <a href="/a#section">A again</a>
            <a href="http://elsewhere.test:{port}/x">Elsewhere</a>
            <a href="/manual.pdf">Manual</a>
            <a href="mailto:team@fathom.test">Mail</a>
            <table><caption>Versions</caption>
                <tr><th>Name</th><th>Year</th></tr>
                <tr><td>One</td><td>2020</td></tr>
            </table>
            </body>"#
        ),
    )
    .await;
    mount_page(
        server,
        "/a",
        r#"<title>Page A</title></head><body><p>Alpha</p><a href="/c">C</a></body>"#,
    )
    .await;
    mount_page(server, "/b", "<title>Page B</title></head><body><p>Beta</p></body>").await;
    mount_page(server, "/c", "<title>Page C</title></head><body><p>Gamma</p></body>").await;
}

#[tokio::test]
async fn test_fetch_page_extracts_everything() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let fetcher = fetcher_for(&server, &[HOST]);

    let page = crawler::fetch_page(
        fetcher.as_ref(),
        &site_url(&server, HOST, "/"),
        0,
        &FetchOptions::default(),
    )
    .await;

    assert!(page.success, "unexpected error: {:?}", page.error);
    assert_eq!(page.title, "Home");
    assert_eq!(page.metadata.description, "The home page");
    assert_eq!(page.metadata.language, "en");
    assert_eq!(
        page.links,
        vec![site_url(&server, HOST, "/a"), site_url(&server, HOST, "/b")]
    );
    assert_eq!(page.structured_data.json_ld.len(), 1);
    assert_eq!(page.tables.len(), 1);
    assert_eq!(page.tables[0].caption, "Versions");
    assert_eq!(page.tables[0].headers, vec!["Name", "Year"]);
    assert_eq!(page.tables[0].rows, vec![vec!["One", "2020"]]);
    assert!(page.markdown.starts_with("# Home"));
}

#[tokio::test]
async fn test_http_error_status_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let fetcher = fetcher_for(&server, &[HOST]);

    let page = crawler::fetch_page(
        fetcher.as_ref(),
        &site_url(&server, HOST, "/missing"),
        0,
        &FetchOptions::default(),
    )
    .await;

    assert!(!page.success);
    assert_eq!(page.error_kind, Some(FetchErrorKind::HttpStatus));
    assert_eq!(page.error.as_deref(), Some("HTTP status 404"));
    assert!(page.links.is_empty());
}

#[tokio::test]
async fn test_non_html_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    let fetcher = fetcher_for(&server, &[HOST]);

    let page = crawler::fetch_page(
        fetcher.as_ref(),
        &site_url(&server, HOST, "/"),
        0,
        &FetchOptions::default(),
    )
    .await;

    assert!(!page.success);
    assert_eq!(page.error_kind, Some(FetchErrorKind::ContentMismatch));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<title>Slow</title></head><body></body>").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let fetcher = fetcher_for(&server, &[HOST]);
    let options = FetchOptions {
        page_timeout: Duration::from_secs(1),
        ..FetchOptions::default()
    };

    let page =
        crawler::fetch_page(fetcher.as_ref(), &site_url(&server, HOST, "/"), 0, &options).await;

    assert!(!page.success);
    assert_eq!(page.error_kind, Some(FetchErrorKind::Timeout));
    assert_eq!(
        page.error.as_deref(),
        Some("Operation timed out after 1 seconds")
    );
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/docs/index.html"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/docs/index.html",
        r#"<title>Docs</title></head><body><a href="guide.html">Guide</a></body>"#,
    )
    .await;
    let fetcher = fetcher_for(&server, &[HOST]);

    let page = crawler::fetch_page(
        fetcher.as_ref(),
        &site_url(&server, HOST, "/old"),
        0,
        &FetchOptions::default(),
    )
    .await;

    assert!(page.success);
    assert_eq!(page.links, vec![site_url(&server, HOST, "/docs/guide.html")]);
}

#[tokio::test]
async fn test_domain_crawl_respects_depth() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let fetcher = fetcher_for(&server, &[HOST, "elsewhere.test"]);

    let limits = CrawlLimits {
        max_depth: 1,
        max_pages: 10,
        politeness_delay: Duration::ZERO,
    };
    let crawler = DomainCrawler::new(fetcher, limits, FetchOptions::default());
    let result = crawler.crawl(&site_url(&server, HOST, "/")).await;

    assert!(result.success);
    let urls: Vec<&str> = result.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            site_url(&server, HOST, "/"),
            site_url(&server, HOST, "/a"),
            site_url(&server, HOST, "/b"),
        ]
    );
    assert_eq!(result.pages[1].depth, 1);
}

#[tokio::test]
async fn test_domain_crawl_respects_page_budget() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let fetcher = fetcher_for(&server, &[HOST]);

    let limits = CrawlLimits {
        max_depth: 5,
        max_pages: 2,
        politeness_delay: Duration::ZERO,
    };
    let crawler = DomainCrawler::new(fetcher, limits, FetchOptions::default());
    let result = crawler.crawl(&site_url(&server, HOST, "/")).await;

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.domain, format!("{}:{}", HOST, server.address().port()));
}

#[tokio::test]
async fn test_seed_redirect_to_www_keeps_crawling() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let apex = "shop.fathom.test";
    let www = "www.shop.fathom.test";

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("host", format!("{}:{}", apex, port).as_str()))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", site_url(&server, www, "/").as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    for (route, body) in [
        ("/", r#"<title>Shop</title></head><body><a href="/a">A</a><a href="/b">B</a></body>"#),
        ("/a", r#"<title>A</title></head><body><a href="/b">B</a><a href="/">Home</a></body>"#),
        ("/b", r#"<title>B</title></head><body><a href="/a">A</a></body>"#),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("host", format!("{}:{}", www, port).as_str()))
            .respond_with(html(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    let fetcher = fetcher_for(&server, &[apex, www]);

    let limits = CrawlLimits {
        max_depth: 3,
        max_pages: 10,
        politeness_delay: Duration::ZERO,
    };
    let crawler = DomainCrawler::new(fetcher, limits, FetchOptions::default());
    let result = crawler.crawl(&site_url(&server, apex, "/")).await;

    assert!(result.success);
    let urls: Vec<&str> = result.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            site_url(&server, apex, "/"),
            site_url(&server, www, "/a"),
            site_url(&server, www, "/b"),
        ]
    );
    assert_eq!(
        result.pages[0].final_url.as_deref(),
        Some(site_url(&server, www, "/").as_str())
    );
    assert!(result.pages.iter().all(|p| p.success));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind and drop a listener so the port is known to be closed
    let closed = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .unwrap();
    let client = reqwest::Client::builder()
        .resolve(HOST, closed)
        .build()
        .unwrap();
    let fetcher = Arc::new(HttpFetcher::with_client(client));
    let url = format!("http://{}:{}/", HOST, closed.port());

    let page = crawler::fetch_page(fetcher.as_ref(), &url, 0, &FetchOptions::default()).await;

    assert!(!page.success);
    assert_eq!(page.error_kind, Some(FetchErrorKind::Transport));
    assert!(page.links.is_empty());

    let limits = CrawlLimits {
        max_depth: 2,
        max_pages: 5,
        politeness_delay: Duration::ZERO,
    };
    let result = DomainCrawler::new(fetcher, limits, FetchOptions::default())
        .crawl(&url)
        .await;

    assert!(result.success);
    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].error_kind, Some(FetchErrorKind::Transport));
}

/// Search client returning a fixed list of hits
struct FixedSearch(Vec<SearchResult>);

#[async_trait]
impl SearchClient for FixedSearch {
    async fn search(&self, _query: &str, num_results: usize) -> Vec<SearchResult> {
        self.0.iter().take(num_results).cloned().collect()
    }
}

#[tokio::test]
async fn test_session_end_to_end_with_outputs() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let fetcher = fetcher_for(&server, &[HOST]);

    let hits = vec![
        SearchResult {
            title: "Docs".into(),
            snippet: "Documentation".into(),
            url: site_url(&server, HOST, "/"),
        },
        SearchResult {
            title: "Broken".into(),
            snippet: "Not a URL".into(),
            url: "not a url".into(),
        },
    ];
    let limits = CrawlLimits {
        max_depth: 2,
        max_pages: 5,
        politeness_delay: Duration::ZERO,
    };
    let orchestrator = Orchestrator::new(
        Arc::new(FixedSearch(hits)),
        fetcher,
        limits,
        FetchOptions::default(),
        4,
    );

    let session = orchestrator
        .search_and_deep_scrape("fathom docs", 3, true)
        .await;

    assert!(session.success);
    assert_eq!(session.domain_results.len(), 2);
    assert!(session.domain_results[0].success);
    assert!(!session.domain_results[1].success);
    assert_eq!(session.domain_results[0].pages.len(), 4);
    assert_eq!(session.analysis.total_domains, 2);
    assert_eq!(session.analysis.successful_domains, 1);
    assert_eq!(session.analysis.total_pages, 4);
    assert_eq!(session.analysis.tables_found, 1);
    assert_eq!(session.analysis.structured_data_found, 1);

    let dir = TempDir::new().unwrap();
    let json = save_session(&dir.path().join("session"), &session).unwrap();
    assert_eq!(load_session(&json).unwrap(), session);

    let md_dir = dir.path().join("pages");
    let written = write_markdown_dir(&md_dir, &session).unwrap();
    assert_eq!(written, 4);

    let home = std::fs::read_to_string(md_dir.join("d01_p01-Home.md")).unwrap();
    assert!(home.starts_with("# Home\n\nURL: "));
    assert!(home.contains("## Tables Found (1)\n\n### Versions\n\n| Name | Year |"));
    assert!(md_dir.join("d01_p04-Page-C.md").exists());
}
