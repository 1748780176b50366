//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from the HTTP fetcher to the sitemap
//! files written on disk.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use sumi_sitemap::config::{
    load_config_with_hash, Config, CrawlerConfig, OutputConfig, PolitenessDelay, UserAgentConfig,
};
use sumi_sitemap::crawler::Coordinator;
use sumi_sitemap::output::{generate_markdown_summary, sitemap_file_name};
use sumi_sitemap::state::PageOutcome;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing sitemaps into `output_dir`
fn create_test_config(output_dir: &Path, max_depth: u32, max_requests: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            concurrency: 4,
            max_requests,
            politeness_delay_min: 0.0,
            politeness_delay_max: 0.0,
            request_timeout: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
            contact_email: Some("test@example.com".to_string()),
        },
        output: OutputConfig {
            directory: output_dir.to_path_buf(),
            summary_path: None,
        },
        site: vec![],
    }
}

fn coordinator(config: &Config) -> Coordinator {
    Coordinator::new(config)
        .expect("Failed to build coordinator")
        .with_politeness_delay(PolitenessDelay::NONE)
}

/// Mounts an HTML page that must be fetched exactly `times` times
async fn mount_page(server: &MockServer, route: &str, html: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .expect(times)
        .mount(server)
        .await;
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read sitemap file")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_writes_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let output = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/about">About</a>
            <a href="/contact">Contact</a>
        </body></html>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/about", r#"<a href="/team">Team</a><a href="/contact">Contact</a>"#, 1).await;
    mount_page(&mock_server, "/contact", "<p>Write to us</p>", 1).await;
    mount_page(&mock_server, "/team", "<p>Everyone</p>", 1).await;

    let config = create_test_config(output.path(), 3, 50);
    let (report, sitemap_path) = coordinator(&config)
        .crawl_root(&base_url)
        .await
        .expect("Crawl failed");

    let expected: HashSet<String> = ["", "/about", "/contact", "/team"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();

    assert_eq!(report.sitemap[0], base_url);
    assert_eq!(report.sitemap[1], format!("{}/about", base_url));
    assert_eq!(report.sitemap.iter().cloned().collect::<HashSet<_>>(), expected);
    assert_eq!(report.statistics.outcome_count(PageOutcome::Processed), 4);

    let root = url::Url::parse(&base_url).unwrap();
    assert_eq!(sitemap_path, output.path().join(sitemap_file_name(&root).unwrap()));
    assert_eq!(read_lines(&sitemap_path), report.sitemap);
}

#[tokio::test]
async fn test_invalid_utf8_body_is_still_parsed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let output = TempDir::new().unwrap();

    let mut body = b"\xff\xfe<html><body>".to_vec();
    body.extend_from_slice(br#"<a href="/next">Next</a>"#);
    body.extend_from_slice(b"</body></html>\xc3");
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/next", "<p>next</p>", 1).await;

    let config = create_test_config(output.path(), 3, 50);
    let (report, _) = coordinator(&config)
        .crawl_root(&base_url)
        .await
        .expect("Crawl failed");

    assert_eq!(report.sitemap, vec![base_url.clone(), format!("{}/next", base_url)]);
    assert_eq!(report.statistics.outcome_count(PageOutcome::Processed), 2);
    assert_eq!(report.statistics.error_count(), 0);
}

#[tokio::test]
async fn test_cross_origin_links_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    // Same host, different port: a different origin
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>other</p>", "text/html"))
        .expect(0)
        .mount(&other_server)
        .await;

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="{}/x">Other</a><a href="https://example.com/">Example</a><a href="mailto:a@b.c">Mail</a>"#,
            other_server.uri()
        ),
        1,
    )
    .await;

    let config = create_test_config(output.path(), 3, 50);
    let (report, _) = coordinator(&config)
        .crawl_root(&mock_server.uri())
        .await
        .expect("Crawl failed");

    assert_eq!(report.sitemap, vec![mock_server.uri()]);
    assert_eq!(report.statistics.links_found, 3);
    assert_eq!(report.statistics.links_rejected, 3);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&mock_server, "/", r#"<a href="/level1">Level 1</a>"#, 1).await;
    mount_page(&mock_server, "/level1", r#"<a href="/level2">Level 2</a>"#, 1).await;
    mount_page(&mock_server, "/level2", "<p>Too deep</p>", 0).await;

    let config = create_test_config(output.path(), 1, 50);
    let (report, _) = coordinator(&config)
        .crawl_root(&mock_server.uri())
        .await
        .expect("Crawl failed");

    assert_eq!(
        report.sitemap,
        vec![mock_server.uri(), format!("{}/level1", mock_server.uri())]
    );
}

#[tokio::test]
async fn test_request_budget_caps_sitemap() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &links, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>leaf</p>", "text/html"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 3, 3);
    let (report, sitemap_path) = coordinator(&config)
        .crawl_root(&mock_server.uri())
        .await
        .expect("Crawl failed");

    assert_eq!(report.sitemap.len(), 3);
    assert_eq!(report.statistics.requests_used, 3);
    assert_eq!(read_lines(&sitemap_path).len(), 3);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn test_fetch_failures_are_recorded() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"
            <a href="/missing">Missing</a>
            <a href="/gone">Gone</a>
            <a href="/report.pdf">Report</a>
            <a href="/broken">Broken</a>
            <a href="/busy">Busy</a>
        "#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Links inside a non-text body must not be followed
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/hidden">x</a>"#, "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/hidden", "<p>hidden</p>", 0).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(output.path(), 3, 50);
    let (report, _) = coordinator(&config)
        .crawl_root(&mock_server.uri())
        .await
        .expect("Crawl failed");

    // Failed pages are still part of the sitemap
    assert_eq!(report.sitemap.len(), 6);

    let stats = &report.statistics;
    assert_eq!(stats.outcome_count(PageOutcome::Processed), 1);
    assert_eq!(stats.outcome_count(PageOutcome::DeadLink), 2);
    assert_eq!(stats.outcome_count(PageOutcome::ContentMismatch), 1);
    assert_eq!(stats.outcome_count(PageOutcome::Failed), 1);
    assert_eq!(stats.outcome_count(PageOutcome::RateLimited), 1);
}

#[tokio::test]
async fn test_timeout_marks_page_unreachable() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>", "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(output.path(), 3, 50);
    config.crawler.request_timeout = 1;

    let (report, _) = coordinator(&config)
        .crawl_root(&mock_server.uri())
        .await
        .expect("Crawl failed");

    assert_eq!(
        report.sitemap,
        vec![mock_server.uri(), format!("{}/slow", mock_server.uri())]
    );
    assert_eq!(report.statistics.outcome_count(PageOutcome::Unreachable), 1);
}

#[tokio::test]
async fn test_batch_isolates_malformed_root() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&mock_server, "/", "<p>home</p>", 1).await;

    let config = create_test_config(output.path(), 3, 50);
    let roots = vec!["not a url".to_string(), mock_server.uri()];
    let summary = coordinator(&config).run(&roots).await;

    assert_eq!(summary.sites.len(), 2);
    assert!(!summary.sites[0].is_success());
    assert!(summary.sites[0].error.as_deref().unwrap().contains("not a url"));

    let site = &summary.sites[1];
    assert!(site.is_success());
    let path = site.sitemap_path.as_ref().unwrap();
    assert_eq!(read_lines(path), vec![mock_server.uri()]);
}

#[tokio::test]
async fn test_config_file_end_to_end() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&mock_server, "/", r#"<a href="/docs">Docs</a>"#, 1).await;
    mount_page(&mock_server, "/docs", "<p>docs</p>", 1).await;

    let summary_path = output.path().join("summary.md");
    let toml = format!(
        r#"
[crawler]
max-depth = 2
concurrency = 2
max-requests = 10
politeness-delay-min = 0.0
politeness-delay-max = 0.0
request-timeout = 5

[output]
directory = "{}"
summary-path = "{}"

[[site]]
root = "{}"
"#,
        output.path().display(),
        summary_path.display(),
        mock_server.uri()
    );
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();
    file.flush().unwrap();

    let (config, hash) = load_config_with_hash(file.path()).expect("Failed to load config");
    let summary = Coordinator::new(&config)
        .unwrap()
        .with_config_hash(hash.clone())
        .run(&config.roots())
        .await;

    assert_eq!(summary.sites_succeeded(), 1);
    assert_eq!(summary.total_pages(), 2);

    generate_markdown_summary(&summary, config.output.summary_path.as_ref().unwrap()).unwrap();
    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains(&hash));
    assert!(markdown.contains(&mock_server.uri()));
}
