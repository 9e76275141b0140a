//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `library`: the documents in `tests/fixtures/library.json`
//! - `php_fields`: title boosted 10, tags boosted 5
//! - `temp_workspace`: an empty temporary directory for config and document files

// Each integration test crate uses a different subset of these helpers.
#![allow(dead_code)]

use fieldrank::{Document, FieldConfig, FieldValue, ScoredDocument, document::load_documents};
use rstest::fixture;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn library_path() -> PathBuf {
    project_root().join("tests/fixtures/library.json")
}

#[fixture]
pub fn library() -> Vec<Document> {
    load_documents(&library_path()).expect("Failed to load library fixture")
}

#[fixture]
pub fn php_fields() -> FieldConfig {
    FieldConfig::new().field("title", 10.0).field("tags", 5.0)
}

/// The `id` field of each result, in rank order.
pub fn ids(results: &[ScoredDocument<&Document>]) -> Vec<String> {
    results
        .iter()
        .map(|result| match result.document.get("id") {
            Some(FieldValue::Text(id)) => id.clone(),
            other => panic!("Document without text id: {:?}", other),
        })
        .collect()
}

/// A temporary directory that is removed when dropped.
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

impl TempWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content and returns its full path.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(name);
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", name, e));
        full_path
    }
}

#[fixture]
pub fn temp_workspace() -> TempWorkspace {
    TempWorkspace::new()
}
