//! End-to-end acquisition against mock web servers

use crate::common::Harness;
use std::sync::atomic::Ordering;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeno::acquire::{AcquireState, Outcome, ScrapeRequest};
use zeno::storage::DocumentStore;
use zeno::{derive_id, DocType};

const ARTICLE: &str = r#"<html><head><title>Release Notes</title></head><body>
    <nav><a href="/">Home</a></nav>
    <main><p>Hello <b>World</b></p></main>
    <footer>Copyright</footer>
</body></html>"#;

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn run(harness: &Harness, request: ScrapeRequest) -> Outcome {
    let submitted = harness.acquirer.submit(request).unwrap();
    submitted.handle.await.unwrap()
}

#[tokio::test]
async fn test_capture_extracts_text_and_title() {
    let server = MockServer::start().await;
    mount_html(&server, "/notes", ARTICLE).await;
    let harness = Harness::new();
    let url = format!("{}/notes", server.uri());

    let outcome = run(&harness, ScrapeRequest::new(url.clone(), true)).await;

    let doc = outcome.document().expect("document should be finalized");
    assert_eq!(doc.id, derive_id(&url));
    assert_eq!(doc.doc_type, DocType::Html);
    assert_eq!(doc.title, "Release Notes");
    assert_eq!(doc.content, "Hello World ");
    assert!(doc.parsed_at.is_some());

    let stored = harness.store.get(&doc.id).unwrap().unwrap();
    assert_eq!(stored.content, "Hello World ");
    assert_eq!(harness.index.indexed_ids(), vec![doc.id.clone()]);
}

#[tokio::test]
async fn test_without_capture_content_stays_empty() {
    let server = MockServer::start().await;
    let large = format!("<p>{}</p>", "lorem ipsum ".repeat(50_000));
    mount_html(&server, "/big", &large).await;
    let harness = Harness::new();

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/big", server.uri()), false),
    )
    .await;

    let doc = outcome.document().expect("document should be finalized");
    assert_eq!(doc.doc_type, DocType::Html);
    assert!(doc.content.is_empty());
    assert!(!doc.capture_requested);

    let stored = harness.store.get(&doc.id).unwrap().unwrap();
    assert!(stored.content.is_empty());
}

#[tokio::test]
async fn test_caller_metadata_is_kept() {
    let server = MockServer::start().await;
    mount_html(&server, "/notes", ARTICLE).await;
    let harness = Harness::new();

    let request = ScrapeRequest {
        url: format!("{}/notes", server.uri()),
        title: "My Bookmark".to_string(),
        description: "Read later".to_string(),
        capture: true,
    };
    let outcome = run(&harness, request).await;

    let doc = outcome.document().unwrap();
    assert_eq!(doc.title, "My Bookmark");
    assert_eq!(doc.description, "Read later");
}

#[tokio::test]
async fn test_pdf_extension_wins_over_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4 not really".to_vec())
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    let harness = Harness::new();

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/files/report.pdf", server.uri()), false),
    )
    .await;

    let doc = outcome.document().expect("document should be finalized");
    assert_eq!(doc.doc_type, DocType::Pdf);
    assert!(doc.content.is_empty());
    assert!(harness.pdf_dir_is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_pdf_capture_runs_converter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"Annual Report\nEverything went fine.\n".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;
    // cat echoes the temp file, standing in for pdftotext
    let harness = Harness::with_pdf_tool("cat");

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/files/report.pdf", server.uri()), true),
    )
    .await;

    let doc = outcome.document().expect("document should be finalized");
    assert_eq!(doc.doc_type, DocType::Pdf);
    assert_eq!(doc.title, "Annual Report");
    assert!(doc.content.contains("Everything went fine."));
    assert!(harness.pdf_dir_is_empty());
}

#[tokio::test]
async fn test_converter_failure_drops_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .mount(&server)
        .await;
    let harness = Harness::with_pdf_tool("/nonexistent/pdftotext");

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/report.pdf", server.uri()), true),
    )
    .await;

    match outcome {
        Outcome::Failed { stage, .. } => assert_eq!(stage, AcquireState::Classified),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(harness.store.count().unwrap(), 0);
    assert!(harness.pdf_dir_is_empty());
}

#[tokio::test]
async fn test_unknown_type_is_not_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"a": 1}"#, "application/json"),
        )
        .mount(&server)
        .await;
    let harness = Harness::new();

    for capture in [true, false] {
        let outcome = run(
            &harness,
            ScrapeRequest::new(format!("{}/api/data", server.uri()), capture),
        )
        .await;
        match outcome {
            Outcome::Failed { stage, .. } => assert_eq!(stage, AcquireState::Classified),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    assert_eq!(harness.store.count().unwrap(), 0);
    assert!(harness.index.indexed_ids().is_empty());
}

#[tokio::test]
async fn test_http_error_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let harness = Harness::new();

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/gone", server.uri()), true),
    )
    .await;

    match outcome {
        Outcome::Failed { stage, reason, .. } => {
            assert_eq!(stage, AcquireState::Requested);
            assert!(reason.contains("404"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(harness.store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_rescrape_updates_single_record() {
    let server = MockServer::start().await;
    mount_html(&server, "/notes", ARTICLE).await;
    let harness = Harness::new();
    let url = format!("{}/notes", server.uri());

    for title in ["First", "Second"] {
        let request = ScrapeRequest {
            url: url.clone(),
            title: title.to_string(),
            ..ScrapeRequest::default()
        };
        assert!(run(&harness, request).await.is_finalized());
    }

    assert_eq!(harness.store.count().unwrap(), 1);
    let stored = harness.store.get(&derive_id(&url)).unwrap().unwrap();
    assert_eq!(stored.title, "Second");
}

#[tokio::test]
async fn test_redirect_target_becomes_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_html(&server, "/new", ARTICLE).await;
    let harness = Harness::new();

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/old", server.uri()), true),
    )
    .await;

    let doc = outcome.document().unwrap();
    let final_url = format!("{}/new", server.uri());
    assert_eq!(doc.url, final_url);
    assert_eq!(doc.id, derive_id(&final_url));
}

#[tokio::test]
async fn test_index_failure_still_persists() {
    let server = MockServer::start().await;
    mount_html(&server, "/notes", ARTICLE).await;
    let harness = Harness::new();
    harness.index.fail.store(true, Ordering::SeqCst);

    let outcome = run(
        &harness,
        ScrapeRequest::new(format!("{}/notes", server.uri()), true),
    )
    .await;

    match outcome {
        Outcome::Finalized { document, indexed } => {
            assert!(!indexed);
            assert!(harness.store.get(&document.id).unwrap().is_some());
        }
        other => panic!("expected finalized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_requests_and_drain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>page</p>", "text/html")
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    let harness = Harness::new();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            harness
                .acquirer
                .submit(ScrapeRequest::new(format!("{}/page{}", server.uri(), i), true))
                .unwrap()
                .handle
        })
        .collect();
    assert!(harness.acquirer.in_flight().count() > 0);

    // Draining waits for every running fetch and refuses new ones
    harness.acquirer.in_flight().drain().await;
    assert_eq!(harness.acquirer.in_flight().count(), 0);
    assert!(harness
        .acquirer
        .submit(ScrapeRequest::new(server.uri(), true))
        .is_err());

    for handle in handles {
        assert!(handle.await.unwrap().is_finalized());
    }
    assert_eq!(harness.store.count().unwrap(), 5);
}
