pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod scoring;
pub mod search;

pub use config::{AggregationMode, FieldConfig, MultiMatch, PopularityConfig, SearchConfig};
pub use document::{Document, FieldValue, Searchable, TextRef};
pub use error::{RankError, Result};
pub use scoring::{DocumentScorer, QueryTerm, Scorer};
pub use search::{ScoredDocument, Searcher};
