use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::{fmt::Write as _, path::PathBuf};

use crate::{
    config::{AggregationMode, FieldConfig, MultiMatch, PopularityConfig, SearchConfig},
    document::{Document, FieldValue, load_documents},
    logging::LogFormat,
    search::{ScoredDocument, Searcher},
};

#[derive(Parser)]
#[command(name = "fieldrank")]
#[command(about = "Rank JSON documents against a query with field-weighted TF-IDF", long_about = None)]
pub struct Cli {
    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every document and print the best matches
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// JSON file holding an array of documents
    pub docs: PathBuf,
    /// Query text; overrides the configured query
    pub query: Option<String>,
    /// TOML or JSON search configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Field to score, optionally boosted: `title^10`. Replaces configured fields.
    #[arg(short = 'f', long = "field", value_name = "FIELD[^BOOST]")]
    pub fields: Vec<String>,
    /// Numeric document field multiplied into the final score
    #[arg(short, long)]
    pub popularity: Option<String>,
    #[arg(short, long, value_enum)]
    pub score_type: Option<AggregationMode>,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Print results as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Parse `name` or `name^boost`.
pub fn parse_field_spec(spec: &str) -> anyhow::Result<(String, Option<f64>)> {
    match spec.split_once('^') {
        Some((name, boost)) => {
            if name.is_empty() {
                bail!("Field spec '{}' has no field name", spec);
            }
            let boost: f64 = boost
                .parse()
                .with_context(|| format!("Invalid boost in field spec '{}'", spec))?;
            Ok((name.to_string(), Some(boost)))
        }
        None if spec.is_empty() => bail!("Empty field spec"),
        None => Ok((spec.to_string(), None)),
    }
}

/// Merge the configuration file (if any) with command-line overrides.
pub fn build_config(args: &SearchArgs) -> anyhow::Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SearchConfig::new(MultiMatch::default()),
    };

    if !args.fields.is_empty() {
        let mut fields = FieldConfig::new();
        for spec in &args.fields {
            fields = match parse_field_spec(spec)? {
                (name, Some(boost)) => fields.field(name, boost),
                (name, None) => fields.unboosted(name),
            };
        }
        config.multi_match.fields = fields;
    }
    if let Some(query) = &args.query {
        config.multi_match.query = Some(query.clone());
    }
    if let Some(field) = &args.popularity {
        config.popularity = Some(PopularityConfig::new(field.clone()));
    }
    if let Some(score_type) = args.score_type {
        config.score_type = score_type;
    }
    if let Some(limit) = args.limit {
        config.max_results = limit;
    }

    if config.max_results == 0 {
        bail!("--limit must be at least 1");
    }
    config
        .validate()
        .context("No usable fields: pass --field or a config file with multi_match.fields")?;
    Ok(config)
}

/// Run a search command and return its printable output.
pub fn execute_search(args: &SearchArgs) -> anyhow::Result<String> {
    let config = build_config(args)?;
    let docs = load_documents(&args.docs)
        .with_context(|| format!("Failed to load documents from {}", args.docs.display()))?;

    let mut searcher = Searcher::from_config(&docs, &config)?;
    let results = searcher.search(None, Some(config.max_results))?;
    tracing::info!(
        "{} of {} documents matched '{}'",
        results.len(),
        docs.len(),
        searcher.query().unwrap_or_default()
    );

    if args.json {
        return Ok(serde_json::to_string_pretty(&results)?);
    }
    Ok(format_results(&results, &config))
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::TextList(items) => items.join(", "),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Other(other) => other.to_string(),
    }
}

/// Ranked listing showing each configured field of every match.
fn format_results(results: &[ScoredDocument<&Document>], config: &SearchConfig) -> String {
    let query = config.multi_match.query.as_deref().unwrap_or_default();
    if results.is_empty() {
        return format!("No results found for '{}'.\n", query);
    }

    let mut output = format!("Results for '{}':\n\n", query);
    for (idx, result) in results.iter().enumerate() {
        let _ = writeln!(output, "{}. score {:.4}", idx + 1, result.score);
        for (field, _) in config.multi_match.fields.iter() {
            if let Some(value) = result.document.get(field) {
                let _ = writeln!(output, "   {}: {}", field, format_value(value));
            }
        }
        if let Some(popularity) = &config.popularity
            && let Some(value) = result.document.get(&popularity.field)
        {
            let _ = writeln!(output, "   {}: {}", popularity.field, format_value(value));
        }
    }
    output
}
