//! Search engine client against a mock engine

use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeno::config::SearchConfig;
use zeno::index::{IndexError, MeilisearchIndex, SearchIndex};
use zeno::supervisor::HealthProbe;
use zeno::{DocType, Document};

fn index_for(server: &MockServer, api_key: &str) -> MeilisearchIndex {
    let config = SearchConfig {
        api_key: api_key.to_string(),
        ..SearchConfig::default()
    };
    MeilisearchIndex::with_base_url(&server.uri(), &config).unwrap()
}

fn document() -> Document {
    let mut doc = Document::new(
        &Url::parse("https://example.com/post").unwrap(),
        "Post".to_string(),
        "A post".to_string(),
        true,
    );
    doc.content = "Body text ".to_string();
    doc.doc_type = DocType::Html;
    doc
}

fn accepted(task_uid: u64) -> ResponseTemplate {
    ResponseTemplate::new(202).set_body_json(serde_json::json!({
        "taskUid": task_uid,
        "indexUid": "sites",
        "status": "enqueued",
    }))
}

#[tokio::test]
async fn test_index_posts_document_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/sites/documents"))
        .respond_with(accepted(7))
        .expect(1)
        .mount(&server)
        .await;

    let doc = document();
    index_for(&server, "").index(&doc).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let sent = body.as_array().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["id"], doc.id.as_str());
    assert_eq!(sent[0]["content"], "Body text ");
    assert_eq!(sent[0]["doc_type"], "html");
}

#[tokio::test]
async fn test_production_key_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/sites/documents"))
        .and(header("authorization", "Bearer master-key"))
        .respond_with(accepted(1))
        .expect(1)
        .mount(&server)
        .await;

    index_for(&server, "master-key")
        .index(&document())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_by_id() {
    let server = MockServer::start().await;
    let doc = document();
    Mock::given(method("DELETE"))
        .and(path(format!("/indexes/sites/documents/{}", doc.id)))
        .respond_with(accepted(8))
        .expect(1)
        .mount(&server)
        .await;

    index_for(&server, "").delete(&doc.id).await.unwrap();
}

#[tokio::test]
async fn test_engine_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid document id"))
        .mount(&server)
        .await;

    let err = index_for(&server, "").index(&document()).await.unwrap_err();
    match err {
        IndexError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid document id"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_search_returns_engine_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexes/sites/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hits": [{ "id": "abc", "title": "Post" }],
            "query": "post",
        })))
        .mount(&server)
        .await;

    let results = index_for(&server, "").search("post", 5).await.unwrap();
    assert_eq!(results["hits"][0]["title"], "Post");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["q"], "post");
    assert_eq!(body["limit"], 5);
}

#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "available"
        })))
        .mount(&server)
        .await;

    assert!(index_for(&server, "").is_healthy().await);
}

#[tokio::test]
async fn test_health_probe_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    assert!(!index_for(&server, "").is_healthy().await);

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&slow)
        .await;
    // Default probe timeout is well below the delay
    assert!(!index_for(&slow, "").is_healthy().await);

    let config = SearchConfig::default();
    let unreachable = MeilisearchIndex::with_base_url("http://127.0.0.1:1", &config).unwrap();
    assert!(!unreachable.is_healthy().await);
}
