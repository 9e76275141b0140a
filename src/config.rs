//! Search configuration: which fields are scored, how much each counts,
//! the optional popularity signal, and how field scores are combined.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::error::{RankError, Result};

/// Default number of results returned by a search.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Per-field options as written in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOptions {
    /// Relative weight of the field. Unset means 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

/// The fields taking part in scoring, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldConfig {
    fields: BTreeMap<String, FieldOptions>,
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with an explicit boost.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, boost: f64) -> Self {
        self.fields
            .insert(name.into(), FieldOptions { boost: Some(boost) });
        self
    }

    /// Add a field with the default boost.
    #[must_use]
    pub fn unboosted(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FieldOptions::default());
        self
    }

    /// Effective boost of a configured field.
    pub fn boost(&self, name: &str) -> Option<f64> {
        self.fields
            .get(name)
            .map(|options| options.boost.unwrap_or(1.0))
    }

    /// Field names with their effective boosts, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields
            .iter()
            .map(|(name, options)| (name.as_str(), options.boost.unwrap_or(1.0)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject empty configurations and non-positive or non-finite boosts.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(RankError::NoFields);
        }
        for (name, boost) in self.iter() {
            if !boost.is_finite() || boost <= 0.0 {
                return Err(RankError::InvalidBoost {
                    field: name.to_string(),
                    boost,
                });
            }
        }
        Ok(())
    }
}

/// Names the numeric document field used as a final score multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopularityConfig {
    pub field: String,
}

impl PopularityConfig {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// How per-field contributions are combined into one document score.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Sum the matching fields' contributions and divide by the number of
    /// configured fields.
    #[default]
    Average,
    /// Take the single best field's contribution.
    BestField,
}

/// Query text plus the fields it runs against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub fields: FieldConfig,
}

impl MultiMatch {
    pub fn new(fields: FieldConfig) -> Self {
        Self {
            query: None,
            fields,
        }
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Complete search setup, loadable from a TOML or JSON file.
///
/// ```toml
/// score_type = "best_field"
/// max_results = 5
///
/// [multi_match]
/// query = "PHP test"
/// fields = { title = { boost = 10 }, tags = { boost = 5 } }
///
/// [popularity]
/// field = "views"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    pub multi_match: MultiMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<PopularityConfig>,
    #[serde(default)]
    pub score_type: AggregationMode,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl SearchConfig {
    pub fn new(multi_match: MultiMatch) -> Self {
        Self {
            multi_match,
            popularity: None,
            score_type: AggregationMode::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Load and validate a configuration file. Files ending in `.toml` are
    /// parsed as TOML, everything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config: Self = if is_toml {
            toml::from_str(&content).map_err(|e| RankError::config(path, e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| RankError::config(path, e.to_string()))?
        };

        config.validate()?;
        tracing::debug!(
            "Loaded search config from {} ({} fields, {:?})",
            path.display(),
            config.multi_match.fields.len(),
            config.score_type
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(RankError::ZeroLimit);
        }
        self.multi_match.fields.validate()
    }
}
