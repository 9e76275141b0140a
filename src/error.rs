//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for fieldrank operations.
pub type Result<T> = std::result::Result<T, RankError>;

/// Errors raised while configuring a scorer or running a search.
#[derive(Debug, Error)]
pub enum RankError {
    /// Neither the search call nor the searcher carried a query.
    #[error("Can not perform search without query")]
    InvalidQuery,

    /// The field configuration names no fields.
    #[error("Field configuration must name at least one field")]
    NoFields,

    /// A field boost that is not a finite, strictly positive number.
    #[error("Invalid boost {boost} for field '{field}': must be finite and greater than zero")]
    InvalidBoost { field: String, boost: f64 },

    /// A configured result limit of zero.
    #[error("max_results must be at least 1")]
    ZeroLimit,

    /// A configured field is missing or not text on some document.
    #[error(
        "{}: field '{field}' must be text or a list of text, found {found}",
        doc_label(.doc)
    )]
    MalformedField {
        doc: Option<usize>,
        field: String,
        found: &'static str,
    },

    /// The popularity field is missing or not numeric on some document.
    #[error("{}: popularity field '{field}' must be a number", doc_label(.doc))]
    MalformedPopularity { doc: Option<usize>, field: String },

    /// A term matcher failed to compile.
    #[error("Failed to build term matcher: {0}")]
    Pattern(#[from] regex::Error),

    /// A configuration file could not be understood.
    #[error("Invalid configuration in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RankError {
    /// Create a configuration error for the given file.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach the collection position of the offending document, if the
    /// error concerns one and does not already name it.
    #[must_use]
    pub fn at_document(self, index: usize) -> Self {
        match self {
            Self::MalformedField {
                doc: None,
                field,
                found,
            } => Self::MalformedField {
                doc: Some(index),
                field,
                found,
            },
            Self::MalformedPopularity { doc: None, field } => Self::MalformedPopularity {
                doc: Some(index),
                field,
            },
            other => other,
        }
    }
}

#[allow(clippy::ref_option)]
fn doc_label(doc: &Option<usize>) -> String {
    match doc {
        Some(index) => format!("Document {}", index),
        None => "Document".to_string(),
    }
}
