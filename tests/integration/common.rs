//! Shared fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use zeno::acquire::{build_http_client, Acquirer, InFlight, PdfExtractor};
use zeno::catalog::Catalog;
use zeno::config::FetchConfig;
use zeno::index::{IndexError, IndexResult, SearchIndex};
use zeno::storage::SqliteStore;
use zeno::Document;

/// In-memory index that records what it was given
#[derive(Default)]
pub struct RecordingIndex {
    pub fail: AtomicBool,
    pub indexed: Mutex<Vec<Document>>,
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingIndex {
    pub fn indexed_ids(&self) -> Vec<String> {
        self.indexed
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }

    fn check(&self) -> IndexResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(IndexError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn index(&self, doc: &Document) -> IndexResult<()> {
        self.check()?;
        self.indexed.lock().unwrap().push(doc.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> IndexResult<()> {
        self.check()?;
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// An acquirer over a file-backed store in a temporary directory
pub struct Harness {
    pub acquirer: Acquirer,
    pub store: Arc<SqliteStore>,
    pub index: Arc<RecordingIndex>,
    pub dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_pdf_tool("pdftotext")
    }

    /// Uses `tool` in place of the PDF converter
    pub fn with_pdf_tool(tool: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::new(&dir.path().join("zeno.db")).unwrap());
        let index = Arc::new(RecordingIndex::default());
        let catalog = Arc::new(Catalog::new(store.clone(), index.clone()));

        let config = FetchConfig {
            user_agent: "zeno-test/0.1".to_string(),
            ..FetchConfig::default()
        };
        let pdf_dir = dir.path().join("pdf");
        std::fs::create_dir(&pdf_dir).unwrap();

        let acquirer = Acquirer::with_client(
            build_http_client(&config).unwrap(),
            catalog,
            PdfExtractor::new(tool, pdf_dir),
            InFlight::new(),
        );

        Self {
            acquirer,
            store,
            index,
            dir,
        }
    }

    pub fn pdf_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.dir.path().join("pdf"))
            .unwrap()
            .next()
            .is_none()
    }
}
