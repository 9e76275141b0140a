//! Field-weighted TF-IDF relevance scoring.
//!
//! A document's score is built per configured field:
//!
//! ```text
//! contribution(field) = coord * Σ_terms tf(term) * idf(term) * norm * boost
//! ```
//!
//! where `coord` is the fraction of query terms present in the field. Fields
//! with `coord == 0` contribute nothing. Contributions are then combined
//! according to [`AggregationMode`] and optionally multiplied by a popularity
//! value read from the document.
//!
//! Text fields match case-insensitively by substring. List fields (tags and
//! the like) match by exact, case-sensitive element equality for coordination
//! and document frequency, while term frequency counts case-insensitive
//! occurrences inside each element.

use ahash::AHashMap;
use regex::{Regex, RegexBuilder};

use crate::{
    config::{AggregationMode, FieldConfig, PopularityConfig},
    document::{FieldValue, Searchable, TextRef},
    error::{RankError, Result},
};

/// Something that can score documents against an active query.
///
/// [`crate::Searcher`] drives any implementation: it sets the query once per
/// search, then scores each document independently.
pub trait Scorer<D: ?Sized> {
    /// Replace the active query.
    fn set_query(&mut self, query: &str) -> Result<()>;

    /// Relevance of `doc` for the active query.
    fn score(&self, doc: &D) -> Result<f64>;
}

impl<D: ?Sized, S: Scorer<D> + ?Sized> Scorer<D> for Box<S> {
    fn set_query(&mut self, query: &str) -> Result<()> {
        (**self).set_query(query)
    }

    fn score(&self, doc: &D) -> Result<f64> {
        (**self).score(doc)
    }
}

/// One whitespace-delimited piece of the query, with its literal matcher.
#[derive(Debug, Clone)]
pub struct QueryTerm {
    text: String,
    lowercase: String,
    pattern: Regex,
}

impl QueryTerm {
    /// Build a term. The text is matched literally and case-insensitively.
    pub fn new(text: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            text: text.to_string(),
            lowercase: text.to_lowercase(),
            pattern,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the term is present in a field, by the field's match rule.
    fn occurs_in(&self, value: TextRef<'_>) -> bool {
        match value {
            TextRef::List(items) => items.iter().any(|item| *item == self.text),
            TextRef::Text(text) => text.to_lowercase().contains(&self.lowercase),
        }
    }

    /// Number of non-overlapping occurrences of the term in a field.
    fn count_in(&self, value: TextRef<'_>) -> usize {
        match value {
            TextRef::List(items) => items
                .iter()
                .map(|item| self.pattern.find_iter(item).count())
                .sum(),
            TextRef::Text(text) => self.pattern.find_iter(text).count(),
        }
    }
}

/// Split a query into terms on single spaces. Empty pieces and duplicates
/// are kept, so an empty query yields one empty term.
pub fn split_query(query: &str) -> Vec<&str> {
    query.split(' ').collect()
}

/// Resolve a configured field on a document as scorable text.
fn text_field<'d, D: Searchable + ?Sized>(doc: &'d D, field: &str) -> Result<TextRef<'d>> {
    match doc.field(field) {
        Some(value) => value.as_text().ok_or_else(|| RankError::MalformedField {
            doc: None,
            field: field.to_string(),
            found: value.kind(),
        }),
        None => Err(RankError::MalformedField {
            doc: None,
            field: field.to_string(),
            found: "nothing",
        }),
    }
}

fn field_length(value: TextRef<'_>) -> usize {
    match value {
        TextRef::List(items) => items.len(),
        TextRef::Text(text) => text.split(' ').count(),
    }
}

fn idf_from_count(docs_count: usize, matching: usize) -> f64 {
    1.0 + (docs_count as f64 / (matching as f64 + 1.0)).ln()
}

/// Scores documents of a fixed collection against a query.
///
/// The collection is borrowed for the scorer's lifetime, so the document
/// count used for inverse document frequency always matches the collection
/// being scored.
#[derive(Debug)]
pub struct DocumentScorer<'a, D> {
    docs: &'a [D],
    docs_count: usize,
    fields: FieldConfig,
    popularity: Option<PopularityConfig>,
    mode: AggregationMode,
    query: String,
    terms: Vec<QueryTerm>,
    /// Per configured field (in [`FieldConfig::iter`] order): term text to
    /// the number of documents containing it. Rebuilt on every query.
    doc_freqs: Vec<AHashMap<String, usize>>,
}

impl<'a, D: Searchable> DocumentScorer<'a, D> {
    /// Create a scorer over `docs` with an empty active query.
    ///
    /// Fails if the field configuration is empty or carries an invalid
    /// boost, or if any document holds a non-text value for a configured
    /// field.
    pub fn new(
        docs: &'a [D],
        fields: FieldConfig,
        popularity: Option<PopularityConfig>,
        mode: AggregationMode,
    ) -> Result<Self> {
        fields.validate()?;
        let mut scorer = Self {
            docs,
            docs_count: docs.len(),
            fields,
            popularity,
            mode,
            query: String::new(),
            terms: Vec::new(),
            doc_freqs: Vec::new(),
        };
        scorer.set_query("")?;
        Ok(scorer)
    }

    /// Builder-style initial query.
    pub fn with_query(mut self, query: &str) -> Result<Self> {
        self.set_query(query)?;
        Ok(self)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    pub fn fields(&self) -> &FieldConfig {
        &self.fields
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn docs_count(&self) -> usize {
        self.docs_count
    }

    /// Replace the active query, recompute its terms and the document
    /// frequency of each term in each configured field.
    pub fn set_query(&mut self, query: &str) -> Result<()> {
        let terms = split_query(query)
            .into_iter()
            .map(QueryTerm::new)
            .collect::<Result<Vec<_>>>()?;

        let mut doc_freqs = Vec::with_capacity(self.fields.len());
        for (field, _) in self.fields.iter() {
            let mut counts: AHashMap<String, usize> = AHashMap::with_capacity(terms.len());
            for term in &terms {
                if !counts.contains_key(term.text()) {
                    counts.insert(term.text.clone(), self.docs_matching_term(term, field)?);
                }
            }
            doc_freqs.push(counts);
        }

        tracing::debug!(
            "Query set to '{}' ({} terms, {} fields, {} documents)",
            query,
            terms.len(),
            self.fields.len(),
            self.docs_count
        );

        self.query = query.to_string();
        self.terms = terms;
        self.doc_freqs = doc_freqs;
        Ok(())
    }

    /// Fraction of query terms present in the field.
    pub fn coord(&self, doc: &D, field: &str) -> Result<f64> {
        let value = text_field(doc, field)?;
        Ok(self.coord_of(value))
    }

    fn coord_of(&self, value: TextRef<'_>) -> f64 {
        let matched = self
            .terms
            .iter()
            .filter(|term| term.occurs_in(value))
            .count();
        matched as f64 / self.terms.len() as f64
    }

    /// Square root of how often the term occurs in the field.
    pub fn term_freq(&self, doc: &D, term: &QueryTerm, field: &str) -> Result<f64> {
        let value = text_field(doc, field)?;
        Ok((term.count_in(value) as f64).sqrt())
    }

    /// Number of documents in the collection containing the term in the
    /// field. Scans the whole collection.
    pub fn docs_matching_term(&self, term: &QueryTerm, field: &str) -> Result<usize> {
        let mut matching = 0;
        for (index, doc) in self.docs.iter().enumerate() {
            let value = text_field(doc, field).map_err(|e| e.at_document(index))?;
            if term.occurs_in(value) {
                matching += 1;
            }
        }
        Ok(matching)
    }

    /// `1 + ln(docs / (matching + 1))`: rarer terms weigh more.
    pub fn inverse_doc_freq(&self, term: &QueryTerm, field: &str) -> Result<f64> {
        Ok(idf_from_count(
            self.docs_count,
            self.docs_matching_term(term, field)?,
        ))
    }

    /// `1 / sqrt(length)`, where length is the element count of a list or
    /// the number of space-separated pieces of a text.
    pub fn field_term_norm(&self, doc: &D, field: &str) -> Result<f64> {
        let value = text_field(doc, field)?;
        Ok(1.0 / (field_length(value) as f64).sqrt())
    }

    /// Contribution of one field, zero unless some query term matches it.
    fn field_score(&self, doc: &D, field_index: usize, field: &str, boost: f64) -> Result<f64> {
        let value = text_field(doc, field)?;
        let coord = self.coord_of(value);
        if coord <= 0.0 {
            return Ok(0.0);
        }

        let norm = 1.0 / (field_length(value) as f64).sqrt();
        let doc_freqs = &self.doc_freqs[field_index];
        let term_sum: f64 = self
            .terms
            .iter()
            .map(|term| {
                let matching = doc_freqs.get(term.text()).copied().unwrap_or(0);
                let tf = (term.count_in(value) as f64).sqrt();
                tf * idf_from_count(self.docs_count, matching) * norm * boost
            })
            .sum();

        Ok(coord * term_sum)
    }

    fn popularity_of(&self, doc: &D) -> Result<Option<f64>> {
        let Some(popularity) = &self.popularity else {
            return Ok(None);
        };
        doc.field(&popularity.field)
            .and_then(FieldValue::as_number)
            .map(Some)
            .ok_or_else(|| RankError::MalformedPopularity {
                doc: None,
                field: popularity.field.clone(),
            })
    }

    /// Relevance of `doc` for the active query.
    pub fn score(&self, doc: &D) -> Result<f64> {
        let mut total = 0.0_f64;
        let mut best = 0.0_f64;

        for (field_index, (field, boost)) in self.fields.iter().enumerate() {
            let contribution = self.field_score(doc, field_index, field, boost)?;
            total += contribution;
            best = best.max(contribution);
        }

        let base = match self.mode {
            AggregationMode::Average => total / self.fields.len() as f64,
            AggregationMode::BestField => best,
        };

        Ok(match self.popularity_of(doc)? {
            Some(multiplier) => base * multiplier,
            None => base,
        })
    }
}

impl<D: Searchable> Scorer<D> for DocumentScorer<'_, D> {
    fn set_query(&mut self, query: &str) -> Result<()> {
        DocumentScorer::set_query(self, query)
    }

    fn score(&self, doc: &D) -> Result<f64> {
        DocumentScorer::score(self, doc)
    }
}
