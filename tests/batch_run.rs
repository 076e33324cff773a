//! Integration tests for the batch runner: category resolution, clearing,
//! and per-line error recovery against a mocked reader API.
//!
//! Input files live under `target/` so they pass the runner's
//! working-directory guard.

use std::path::PathBuf;

use ghfeeds::batch::{self, BatchError, BatchOptions};
use ghfeeds::reader::{ReaderClient, ReaderError};
use secrecy::SecretString;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_input(test_name: &str, lines: &[&str]) -> PathBuf {
    let dir = std::env::current_dir()
        .unwrap()
        .join("target")
        .join("batch-run-tests")
        .join(test_name);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("repos.txt");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn cleanup(input: &std::path::Path) {
    if let Some(dir) = input.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}

fn test_client(server: &MockServer) -> ReaderClient {
    ReaderClient::new(server.uri(), SecretString::from("dummy-api-key".to_string()))
}

fn options(file: PathBuf) -> BatchOptions {
    BatchOptions {
        file,
        category: None,
        clear_category_feeds: false,
        dry_run: false,
    }
}

#[tokio::test]
async fn malformed_lines_do_not_abort_the_batch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"feed_id": 1}"#))
        .expect(3)
        .mount(&mock_server)
        .await;

    let input = write_input(
        "mixed-lines",
        &[
            "username/repo",
            "",
            "  badword",
            "ghcr.io/owner",
            "https://github.com/a/b",
            "ghcr.io/owner/name:latest",
        ],
    );

    let client = test_client(&mock_server);
    let summary = batch::run(&client, &options(input.clone())).await.unwrap();

    assert_eq!(summary.subscribed, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.deleted, 0);

    cleanup(&input);
}

#[tokio::test]
async fn category_is_resolved_and_cleared_before_subscribing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[{"id": 3, "title": "Releases"}]"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/categories/3/feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id": 10}, {"id": 11}]"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feeds/10"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feeds/11"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .and(body_json(serde_json::json!({
            "feed_url": "https://github.com/owner/name/releases.atom",
            "category_id": 3,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"feed_id": 12}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = write_input("clear-category", &["owner/name"]);

    let client = test_client(&mock_server);
    // Lowercase on purpose: category titles match case-insensitively.
    let opts = BatchOptions {
        category: Some("releases".to_string()),
        clear_category_feeds: true,
        ..options(input.clone())
    };
    let summary = batch::run(&client, &opts).await.unwrap();

    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.subscribed, 1);
    assert_eq!(summary.failed, 0);

    cleanup(&input);
}

#[tokio::test]
async fn unknown_category_fails_before_any_subscription() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let input = write_input("unknown-category", &["owner/name"]);

    let client = test_client(&mock_server);
    let opts = BatchOptions {
        category: Some("Missing".to_string()),
        ..options(input.clone())
    };
    let err = batch::run(&client, &opts).await.unwrap_err();

    assert!(matches!(
        err,
        BatchError::Reader(ReaderError::CategoryNotFound(_))
    ));

    cleanup(&input);
}

#[tokio::test]
async fn clearing_requires_a_category() {
    let mock_server = MockServer::start().await;
    let input = write_input("clear-without-category", &["owner/name"]);

    let client = test_client(&mock_server);
    let opts = BatchOptions {
        clear_category_feeds: true,
        ..options(input.clone())
    };
    let err = batch::run(&client, &opts).await.unwrap_err();

    assert!(matches!(err, BatchError::ClearWithoutCategory));

    cleanup(&input);
}

#[tokio::test]
async fn failed_deletes_are_skipped_not_fatal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[{"id": 5, "title": "Tools"}]"#),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/categories/5/feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id": 20}, {"id": 21}]"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feeds/20"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feeds/21"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"feed_id": 22}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = write_input("failed-delete", &["owner/name"]);

    let client = test_client(&mock_server);
    let opts = BatchOptions {
        category: Some("Tools".to_string()),
        clear_category_feeds: true,
        ..options(input.clone())
    };
    let summary = batch::run(&client, &opts).await.unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.subscribed, 1);

    cleanup(&input);
}

#[tokio::test]
async fn failed_subscriptions_are_counted_and_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let input = write_input("failed-subscribe", &["a/b", "c/d"]);

    let client = test_client(&mock_server);
    let summary = batch::run(&client, &options(input.clone())).await.unwrap();

    assert_eq!(summary.subscribed, 0);
    assert_eq!(summary.failed, 2);

    cleanup(&input);
}

#[tokio::test]
async fn dry_run_issues_no_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let input = write_input("dry-run", &["a/b", "c/d", "notarepo"]);

    let client = test_client(&mock_server);
    let opts = BatchOptions {
        dry_run: true,
        ..options(input.clone())
    };
    let summary = batch::run(&client, &opts).await.unwrap();

    assert_eq!(summary.subscribed, 2);
    assert_eq!(summary.failed, 1);

    cleanup(&input);
}
