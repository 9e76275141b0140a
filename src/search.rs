//! Ranking a document collection against a query.

use serde::Serialize;

use crate::{
    config::{AggregationMode, DEFAULT_MAX_RESULTS, MultiMatch, PopularityConfig, SearchConfig},
    document::Searchable,
    error::{RankError, Result},
    scoring::{DocumentScorer, Scorer},
};

/// A document paired with its relevance score.
///
/// Serializes as the document's own fields plus `_score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument<T> {
    #[serde(flatten)]
    pub document: T,
    #[serde(rename = "_score")]
    pub score: f64,
}

/// Scores a borrowed collection and returns the best matches.
///
/// The collection itself is never modified; results borrow from it.
#[derive(Debug)]
pub struct Searcher<'a, D, S = DocumentScorer<'a, D>> {
    docs: &'a [D],
    query: Option<String>,
    scorer: S,
}

impl<'a, D: Searchable> Searcher<'a, D> {
    /// Build a searcher with an internal [`DocumentScorer`] averaging field
    /// scores.
    pub fn new(
        docs: &'a [D],
        multi_match: MultiMatch,
        popularity: Option<PopularityConfig>,
    ) -> Result<Self> {
        let MultiMatch { query, fields } = multi_match;
        let scorer = DocumentScorer::new(docs, fields, popularity, AggregationMode::Average)?;
        Ok(Self::with_scorer(docs, query, scorer))
    }

    /// Build a searcher from a full configuration, honouring its score type.
    pub fn from_config(docs: &'a [D], config: &SearchConfig) -> Result<Self> {
        let scorer = DocumentScorer::new(
            docs,
            config.multi_match.fields.clone(),
            config.popularity.clone(),
            config.score_type,
        )?;
        Ok(Self::with_scorer(
            docs,
            config.multi_match.query.clone(),
            scorer,
        ))
    }
}

impl<'a, D, S: Scorer<D>> Searcher<'a, D, S> {
    /// Build a searcher around an externally supplied scorer.
    pub fn with_scorer(docs: &'a [D], query: Option<String>, scorer: S) -> Self {
        Self {
            docs,
            query: query.filter(|q| !q.is_empty()),
            scorer,
        }
    }

    /// The query used when [`Searcher::search`] is called without one.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score every document and return up to `max_results` (default 10)
    /// documents with a strictly positive score, best first.
    ///
    /// A non-empty `query` replaces the stored one for this and later
    /// calls. Documents with equal scores keep their collection order.
    pub fn search(
        &mut self,
        query: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<ScoredDocument<&'a D>>> {
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            self.query = Some(query.to_string());
        }
        let query = self.query.as_deref().ok_or(RankError::InvalidQuery)?;
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);

        let start = std::time::Instant::now();
        self.scorer.set_query(query)?;

        let mut scored = Vec::with_capacity(self.docs.len());
        for (index, document) in self.docs.iter().enumerate() {
            let score = self
                .scorer
                .score(document)
                .map_err(|e| e.at_document(index))?;
            tracing::trace!("Document {} scored {}", index, score);
            scored.push(ScoredDocument { document, score });
        }

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        let results: Vec<_> = scored
            .into_iter()
            .filter(|result| result.score > 0.0)
            .take(max_results)
            .collect();

        tracing::debug!(
            "Search for '{}' matched {} of {} documents in {:?}",
            query,
            results.len(),
            self.docs.len(),
            start.elapsed()
        );
        Ok(results)
    }
}
