//! Search, delete and ping against a mock artifact service

mod common;

use httpmock::prelude::*;
use serde_json::json;

use arte_cli::app::models::{ArtifactDescriptor, SearchQuery};
use arte_cli::cli::{delete_with_confirmation, ProgressReporter, ReporterConfig};
use arte_cli::errors::{AppError, ArtifactError, ErrorKind, RemoteError};

use common::client;

fn record(version: &str) -> serde_json::Value {
    json!({
        "bucket": "b1",
        "name": "n1",
        "version": version,
        "normalizedVersion": version,
        "path": format!("b1/n1/{}.zip", version),
        "fileSize": 2048,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z",
        "uploads": 1,
        "downloads": 4,
        "metadata": { "arch": "x86" }
    })
}

fn hidden_reporter() -> ProgressReporter {
    ProgressReporter::new(ReporterConfig::hidden())
}

#[tokio::test]
async fn test_ping_ok() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ping");
            then.status(200).json_body(json!({ "status": "ok" }));
        })
        .await;

    client(&server.base_url()).check_server().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ping_error_status_is_connectivity_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ping");
            then.status(500);
        })
        .await;

    let err = client(&server.base_url()).check_server().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(err.to_string().starts_with("Cannot connect to"));
}

#[tokio::test]
async fn test_search_not_found_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/artifacts/search");
            then.status(404).json_body(json!({ "message": "No artifacts" }));
        })
        .await;

    let query = SearchQuery {
        name: Some("n1".to_string()),
        ..SearchQuery::default()
    };
    let records = client(&server.base_url()).search(&query).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_partial_search_decodes_records() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/artifacts/search")
                .query_param("partial", "true")
                .query_param("bucket", "b1")
                .query_param("artifact", "n")
                .query_param("arch", "x86");
            then.status(200)
                .json_body(json!([record("1.0"), record("1.1")]));
        })
        .await;

    let mut query = SearchQuery {
        bucket: Some("b1".to_string()),
        name: Some("n".to_string()),
        ..SearchQuery::default()
    };
    query.metadata.insert("arch".to_string(), "x86".to_string());

    let records = client(&server.base_url()).search(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].version, "1.0");
    assert_eq!(records[1].path, "b1/n1/1.1.zip");
    assert_eq!(records[1].file_size, 2048);
    assert_eq!(records[1].downloads, 4);
    assert_eq!(records[1].metadata.get("arch").map(String::as_str), Some("x86"));
}

#[tokio::test]
async fn test_exact_search_disables_partial_matching() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/artifacts/search")
                .query_param("partial", "false")
                .query_param("artifact", "n1")
                .query_param("version", "1.0");
            then.status(200).json_body(json!([record("1.0")]));
        })
        .await;

    let descriptor = ArtifactDescriptor::new("b1", "n1").with_version("1.0");
    let records = client(&server.base_url())
        .search(&SearchQuery::exact(&descriptor))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_search_server_error_is_remote_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/artifacts/search");
            then.status(500).json_body(json!({ "error": "database offline" }));
        })
        .await;

    let err = client(&server.base_url())
        .search(&SearchQuery::default())
        .await
        .unwrap_err();

    match err {
        ArtifactError::Remote(RemoteError { status, ref payload }) => {
            assert_eq!(status, 500);
            assert_eq!(payload.message(), "database offline");
        }
        other => panic!("Expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_without_version_omits_segment() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/buckets/b1/artifacts/n1");
            then.status(200).json_body(json!([record("1.0"), record("1.1")]));
        })
        .await;

    let deleted = client(&server.base_url())
        .delete(&ArtifactDescriptor::new("b1", "n1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(deleted.len(), 2);
}

#[tokio::test]
async fn test_delete_not_found_is_empty() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/buckets/b1/artifacts/n1");
            then.status(404).json_body(json!({ "message": "No artifacts" }));
        })
        .await;

    let deleted = client(&server.base_url())
        .delete(&ArtifactDescriptor::new("b1", "n1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(deleted.is_empty());
}

#[tokio::test]
async fn test_delete_nothing_matches_never_prompts() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET).path("/artifacts/search");
            then.status(404);
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = client(&server.base_url());
    let mut reporter = hidden_reporter();
    let deleted = delete_with_confirmation(
        &client,
        &ArtifactDescriptor::new("b1", "n1"),
        &mut reporter,
        |_| panic!("confirmation must not be requested"),
    )
    .await
    .unwrap();

    assert!(deleted.is_empty());
    assert_eq!(search.hits_async().await, 1);
    assert_eq!(delete.hits_async().await, 0);
}

#[tokio::test]
async fn test_delete_confirmed_requeries_then_deletes() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/artifacts/search")
                .query_param("partial", "false")
                .query_param("version", "1.0");
            then.status(200).json_body(json!([record("1.0")]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/buckets/b1/artifacts/n1/1.0");
            then.status(200).json_body(json!([record("1.0")]));
        })
        .await;

    let client = client(&server.base_url());
    let mut reporter = hidden_reporter();
    let mut shown = 0;
    let deleted = delete_with_confirmation(
        &client,
        &ArtifactDescriptor::new("b1", "n1").with_version("1.0"),
        &mut reporter,
        |matches| {
            shown = matches.len();
            Ok(true)
        },
    )
    .await
    .unwrap();

    assert_eq!(shown, 1);
    assert_eq!(deleted.len(), 1);
    assert_eq!(search.hits_async().await, 2);
    assert_eq!(delete.hits_async().await, 1);
}

#[tokio::test]
async fn test_delete_declined_sends_no_delete() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/artifacts/search");
            then.status(200).json_body(json!([record("1.0")]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = client(&server.base_url());
    let mut reporter = hidden_reporter();
    let deleted = delete_with_confirmation(
        &client,
        &ArtifactDescriptor::new("b1", "n1"),
        &mut reporter,
        |_| Ok(false),
    )
    .await
    .unwrap();

    assert!(deleted.is_empty());
    assert_eq!(delete.hits_async().await, 0);
}

#[tokio::test]
async fn test_delete_search_failure_is_propagated() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/artifacts/search");
            then.status(503).body("maintenance");
        })
        .await;

    let client = client(&server.base_url());
    let mut reporter = hidden_reporter();
    let err = delete_with_confirmation(
        &client,
        &ArtifactDescriptor::new("b1", "n1"),
        &mut reporter,
        |_| Ok(true),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Artifact(ArtifactError::Remote(_))));
    assert_eq!(err.category(), "remote");
}
