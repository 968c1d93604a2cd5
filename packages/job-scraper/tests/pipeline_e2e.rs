//! End-to-end runs against a local HTTP server.

use std::time::Duration;

use job_scraper::{
    FetchCause, HttpFetcher, PageFetcher, Pipeline, ScrapeError, ScraperConfig, NOT_SPECIFIED,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn config(server: &MockServer, archive: &std::path::Path) -> ScraperConfig {
    ScraperConfig::default()
        .with_listing_url(format!("{}/latestjob/", server.uri()))
        .with_archive_dir(archive)
}

#[tokio::test]
async fn test_table_listing_is_enriched_and_archived() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/latestjob/",
        r#"<html><body><table><tr>
            <td><a href="/job/1">Example Job</a> Last Date : 31/12/2025 apply now</td>
        </tr></table></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/job/1",
        r#"<html><body>
            <a href="/notification.pdf">Download Notification</a>
            <a href="/apply/1">Apply Online</a>
        </body></html>"#,
    )
    .await;

    let tmp = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config(&server, tmp.path())).unwrap();

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.jobs, 1);
    assert_eq!(summary.with_apply_url, 1);

    let raw = std::fs::read_to_string(tmp.path().join("jobs.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        saved,
        serde_json::json!([{
            "name": "Example Job",
            "last_date": "31/12/2025",
            "link": "/job/1",
            "apply_url": "/apply/1"
        }])
    );
}

#[tokio::test]
async fn test_anchor_fallback_when_listing_has_no_table() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/latestjob/",
        r#"<html><body>
            <a href="/">Home</a>
            <a href="/careers/xyz">Clerk Vacancy</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/careers/xyz",
        r#"<a href="https://portal.example/register">Candidate Portal</a>"#,
    )
    .await;

    let tmp = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config(&server, tmp.path())).unwrap();

    let jobs = pipeline.produce_jobs().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "Clerk Vacancy");
    assert_eq!(jobs[0].last_date, NOT_SPECIFIED);
    assert_eq!(jobs[0].detail_link, "/careers/xyz");
    assert_eq!(jobs[0].apply_url, "https://portal.example/register");
}

#[tokio::test]
async fn test_failing_detail_page_keeps_the_job() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/latestjob/",
        r#"<table><tr>
            <td><a href="/job/ok">Working Job</a></td>
            <td><a href="/job/broken">Broken Job</a></td>
        </tr></table>"#,
    )
    .await;
    mount_page(&server, "/job/ok", r#"<a href="/apply">Apply Online</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/job/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config(&server, tmp.path())).unwrap();

    let jobs = pipeline.produce_jobs().await.unwrap();
    let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["Working Job", "Broken Job"]);
    assert_eq!(jobs[0].apply_url, "/apply");
    assert_eq!(jobs[1].apply_url, "");
}

#[tokio::test]
async fn test_listing_error_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latestjob/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::from_config(config(&server, tmp.path())).unwrap();

    let err = pipeline.run_once().await.unwrap_err();
    match err {
        ScrapeError::Fetch(e) => assert!(matches!(e.cause, FetchCause::Status(500))),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!tmp.path().join("jobs.json").exists());
}

#[tokio::test]
async fn test_http_fetcher_reports_status_and_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("late").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();

    let err = fetcher
        .fetch(&format!("{}/gone", server.uri()), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err.cause, FetchCause::Status(404)));

    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()), Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_rate_limited_fetcher_spaces_out_requests() {
    let server = MockServer::start().await;
    mount_page(&server, "/page", "<p>ok</p>").await;

    let fetcher = HttpFetcher::new().unwrap().with_rate_limit(2);
    let url = format!("{}/page", server.uri());

    let started = std::time::Instant::now();
    for _ in 0..3 {
        fetcher.fetch(&url, Duration::from_secs(5)).await.unwrap();
    }
    let total = started.elapsed();

    // Two requests fit the burst; the third waits for a replenished cell
    assert!(total >= Duration::from_millis(400), "third fetch not delayed: {total:?}");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
