mod common;

use assert2::check;
use common::{ids, library, php_fields};
use fieldrank::{
    AggregationMode, Document, DocumentScorer, FieldConfig, FieldValue, MultiMatch,
    PopularityConfig, RankError, SearchConfig, Searcher,
};
use rstest::rstest;
use std::collections::HashMap;

fn php_searcher<'a>(docs: &'a [Document], fields: FieldConfig) -> Searcher<'a, Document> {
    Searcher::new(docs, MultiMatch::new(fields).query("PHP test"), None)
        .expect("Searcher should build")
}

/// Two-document example: the matching title wins, the unrelated one is dropped.
#[rstest]
fn search_ranks_matching_title_and_drops_unrelated(php_fields: FieldConfig) {
    let docs = vec![
        Document::new()
            .with("id", "php")
            .with("title", "PHP test")
            .with("tags", vec!["php"]),
        Document::new()
            .with("id", "other")
            .with("title", "unrelated")
            .with("tags", vec!["other"]),
    ];
    let mut searcher = php_searcher(&docs, php_fields);

    let results = searcher.search(None, None).unwrap();
    check!(ids(&results) == ["php"]);
    check!(results[0].score > 0.0);
}

#[rstest]
fn search_without_any_query_fails(library: Vec<Document>, php_fields: FieldConfig) {
    let mut searcher = Searcher::new(&library, MultiMatch::new(php_fields), None).unwrap();
    check!(let Err(RankError::InvalidQuery) = searcher.search(None, None));
}

#[rstest]
fn search_returns_fewer_than_limit_when_few_match(
    library: Vec<Document>,
    php_fields: FieldConfig,
) {
    let mut searcher = php_searcher(&library, php_fields);
    let results = searcher.search(Some("Cooking"), Some(2)).unwrap();
    check!(ids(&results) == ["5"]);
}

#[rstest]
fn search_average_mode_ranking(library: Vec<Document>, php_fields: FieldConfig) {
    let mut searcher = php_searcher(&library, php_fields);
    let results = searcher.search(None, None).unwrap();
    check!(ids(&results) == ["1", "2", "4", "6"]);
}

#[rstest]
fn search_best_field_mode_ranking(library: Vec<Document>, php_fields: FieldConfig) {
    let mut config = SearchConfig::new(MultiMatch::new(php_fields).query("PHP test"));
    config.score_type = AggregationMode::BestField;
    let mut searcher = Searcher::from_config(&library, &config).unwrap();

    // The lone "PHP" title now outranks "Testing Rust code", whose score was
    // spread across two partially matching fields.
    let results = searcher.search(None, None).unwrap();
    check!(ids(&results) == ["1", "2", "6", "4"]);
}

#[rstest]
fn search_popularity_reorders_results(library: Vec<Document>, php_fields: FieldConfig) {
    let mut searcher = Searcher::new(
        &library,
        MultiMatch::new(php_fields).query("PHP test"),
        Some(PopularityConfig::new("views")),
    )
    .unwrap();

    let results = searcher.search(None, None).unwrap();
    check!(ids(&results) == ["6", "1", "2", "4"]);
}

#[rstest]
#[case("PHP test", 10)]
#[case("PHP test", 3)]
#[case("rust", 1)]
#[case("php", 10)]
#[case("nothing-matches-this", 10)]
fn search_results_are_bounded_positive_and_sorted(
    library: Vec<Document>,
    php_fields: FieldConfig,
    #[case] query: &str,
    #[case] limit: usize,
) {
    let mut searcher = php_searcher(&library, php_fields);
    let results = searcher.search(Some(query), Some(limit)).unwrap();

    check!(results.len() <= limit);
    for result in &results {
        check!(result.score > 0.0);
    }
    for pair in results.windows(2) {
        check!(pair[0].score >= pair[1].score);
    }
}

#[rstest]
fn search_is_idempotent(library: Vec<Document>, php_fields: FieldConfig) {
    let mut searcher = php_searcher(&library, php_fields);
    let first = searcher.search(None, None).unwrap();
    let second = searcher.search(None, None).unwrap();
    check!(first == second);
}

#[rstest]
fn search_leaves_collection_untouched(library: Vec<Document>, php_fields: FieldConfig) {
    let before = library.clone();
    let mut searcher = php_searcher(&library, php_fields);
    searcher.search(None, None).unwrap();
    check!(library == before);
}

#[rstest]
fn scores_are_never_negative(library: Vec<Document>, php_fields: FieldConfig) {
    let scorer = DocumentScorer::new(&library, php_fields, None, AggregationMode::Average)
        .and_then(|s| s.with_query("PHP test rust pasta"))
        .unwrap();
    for doc in &library {
        check!(scorer.score(doc).unwrap() >= 0.0);
    }
}

#[rstest]
fn raising_a_boost_never_lowers_matching_scores(library: Vec<Document>) {
    let low = DocumentScorer::new(
        &library,
        FieldConfig::new().field("title", 2.0).field("tags", 5.0),
        None,
        AggregationMode::Average,
    )
    .and_then(|s| s.with_query("PHP test"))
    .unwrap();
    let high = DocumentScorer::new(
        &library,
        FieldConfig::new().field("title", 8.0).field("tags", 5.0),
        None,
        AggregationMode::Average,
    )
    .and_then(|s| s.with_query("PHP test"))
    .unwrap();

    for doc in &library {
        if low.coord(doc, "title").unwrap() > 0.0 {
            check!(high.score(doc).unwrap() >= low.score(doc).unwrap());
        }
    }
}

/// Tags match whole, case-sensitive elements.
#[rstest]
fn list_fields_match_exact_elements(library: Vec<Document>) {
    let fields = FieldConfig::new().unboosted("tags");
    let mut searcher = Searcher::new(&library, MultiMatch::new(fields), None).unwrap();

    check!(searcher.search(Some("PHP"), None).unwrap().is_empty());
    let mut matched = ids(&searcher.search(Some("php"), None).unwrap());
    matched.sort();
    check!(matched == ["1", "2", "6"]);
    check!(searcher.search(Some("ph"), None).unwrap().is_empty());
}

#[rstest]
fn malformed_field_fails_search_setup(php_fields: FieldConfig) {
    let docs = vec![
        Document::new().with("title", "PHP").with("tags", vec!["php"]),
        Document::new().with("title", "PHP"),
    ];
    let result = Searcher::new(&docs, MultiMatch::new(php_fields).query("PHP"), None);
    check!(let Err(RankError::MalformedField { doc: Some(1), .. }) = result);
}

/// Plain maps rank the same way as `Document`s.
#[rstest]
fn search_over_plain_maps(library: Vec<Document>, php_fields: FieldConfig) {
    let records: Vec<HashMap<String, FieldValue>> = library
        .iter()
        .map(|doc| {
            doc.iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect()
        })
        .collect();
    let mut searcher =
        Searcher::new(&records, MultiMatch::new(php_fields).query("PHP test"), None).unwrap();

    let results = searcher.search(None, None).unwrap();
    let ranked: Vec<FieldValue> = results
        .iter()
        .filter_map(|result| result.document.get("id").cloned())
        .collect();
    let expected: Vec<FieldValue> = ["1", "2", "4", "6"].map(FieldValue::from).into();
    check!(ranked == expected);
}
