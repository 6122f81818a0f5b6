//! Catalog against a mock search engine and a file-backed store

use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeno::catalog::{Catalog, CatalogError};
use zeno::config::SearchConfig;
use zeno::index::MeilisearchIndex;
use zeno::storage::{DocumentStore, SqliteStore};
use zeno::{DocType, Document};

struct Fixture {
    catalog: Catalog,
    store: Arc<SqliteStore>,
    _dir: TempDir,
}

fn fixture(server: &MockServer) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::new(&dir.path().join("catalog.db")).unwrap());
    let index = MeilisearchIndex::with_base_url(&server.uri(), &SearchConfig::default()).unwrap();
    Fixture {
        catalog: Catalog::new(store.clone(), Arc::new(index)),
        store,
        _dir: dir,
    }
}

fn document(url: &str) -> Document {
    let mut doc = Document::new(
        &Url::parse(url).unwrap(),
        "Title".to_string(),
        String::new(),
        false,
    );
    doc.doc_type = DocType::Html;
    doc
}

async fn engine_responding(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex("^/indexes/sites/documents$"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(serde_json::json!({ "taskUid": 1 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex("^/indexes/sites/documents/.+$"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(serde_json::json!({ "taskUid": 2 })),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_save_then_delete() {
    let server = engine_responding(202).await;
    let f = fixture(&server);

    let saved = f
        .catalog
        .save_and_index(document("https://example.com/a"))
        .await
        .unwrap();
    assert!(saved.indexed);
    assert_eq!(f.store.count().unwrap(), 1);

    f.catalog.delete(&saved.document.id).await.unwrap();
    assert_eq!(f.store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_engine_down_on_save_keeps_record() {
    let server = engine_responding(500).await;
    let f = fixture(&server);

    let saved = f
        .catalog
        .save_and_index(document("https://example.com/a"))
        .await
        .unwrap();

    assert!(!saved.indexed);
    assert!(f.store.get(&saved.document.id).unwrap().is_some());
}

#[tokio::test]
async fn test_engine_down_on_delete_keeps_record() {
    let healthy = engine_responding(202).await;
    let broken = engine_responding(500).await;
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::new(&dir.path().join("catalog.db")).unwrap());
    let config = SearchConfig::default();

    let saving = Catalog::new(
        store.clone(),
        Arc::new(MeilisearchIndex::with_base_url(&healthy.uri(), &config).unwrap()),
    );
    let saved = saving
        .save_and_index(document("https://example.com/a"))
        .await
        .unwrap();

    let deleting = Catalog::new(
        store.clone(),
        Arc::new(MeilisearchIndex::with_base_url(&broken.uri(), &config).unwrap()),
    );
    let result = deleting.delete(&saved.document.id).await;

    assert!(matches!(result, Err(CatalogError::IndexDelete { .. })));
    assert!(store.get(&saved.document.id).unwrap().is_some());
}

#[tokio::test]
async fn test_delete_requires_id() {
    let server = engine_responding(202).await;
    let f = fixture(&server);

    assert!(matches!(
        f.catalog.delete("").await,
        Err(CatalogError::EmptyId)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let server = engine_responding(202).await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("catalog.db");
    let config = SearchConfig::default();

    let id = {
        let store = Arc::new(SqliteStore::new(&db).unwrap());
        let catalog = Catalog::new(
            store,
            Arc::new(MeilisearchIndex::with_base_url(&server.uri(), &config).unwrap()),
        );
        catalog
            .save_and_index(document("https://example.com/kept"))
            .await
            .unwrap()
            .document
            .id
    };

    let reopened = SqliteStore::new(&db).unwrap();
    let doc = reopened.get(&id).unwrap().unwrap();
    assert_eq!(doc.url, "https://example.com/kept");
    assert!(doc.parsed_at.is_some());
}
