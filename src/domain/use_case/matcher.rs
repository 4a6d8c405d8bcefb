//! Substring scoring of free-text queries against the use-case catalog

use serde::Serialize;

use super::catalog::UseCaseCatalog;
use super::entity::DetailedUseCase;

pub const DEFAULT_LIMIT: usize = 5;

const TITLE_WEIGHT: u32 = 10;
const CATEGORY_WEIGHT: u32 = 5;
const EXAMPLE_WEIGHT: u32 = 15;
const TAG_WEIGHT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredUseCase<'a> {
    pub score: u32,
    #[serde(flatten)]
    pub use_case: &'a DetailedUseCase,
}

/// Score one use case against an already lower-cased query
pub fn score_use_case(use_case: &DetailedUseCase, query: &str) -> u32 {
    let mut score = 0;

    let title = use_case.title.to_lowercase();
    if title.contains(query) || query.contains(&title) {
        score += TITLE_WEIGHT;
    }

    if use_case.category.to_lowercase().contains(query) {
        score += CATEGORY_WEIGHT;
    }

    let example_hit = use_case.examples.iter().any(|example| {
        let example = example.to_lowercase();
        example.contains(query) || query.contains(&example)
    });
    if example_hit {
        score += EXAMPLE_WEIGHT;
    }

    let tag_hits = use_case
        .tags
        .iter()
        .filter(|tag| query.contains(&tag.to_lowercase()))
        .count() as u32;

    score + tag_hits * TAG_WEIGHT
}

impl UseCaseCatalog {
    /// Highest scoring use cases first; ties keep catalog order
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredUseCase<'_>> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let query = query.to_lowercase();
        let mut scored: Vec<ScoredUseCase<'_>> = self
            .iter()
            .filter_map(|use_case| {
                let score = score_use_case(use_case, &query);
                (score > 0).then_some(ScoredUseCase { score, use_case })
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);
        scored
    }
}

/// Best matches from the embedded catalog
pub fn find_best_use_cases(query: &str, limit: usize) -> Vec<&'static DetailedUseCase> {
    UseCaseCatalog::embedded()
        .search(query, limit)
        .into_iter()
        .map(|scored| scored.use_case)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::use_case::{
        Complexity, EstimatedTokens, ModelUseCases, RecommendedModels,
    };

    fn ids(query: &str, limit: usize) -> Vec<(String, u32)> {
        UseCaseCatalog::embedded()
            .search(query, limit)
            .into_iter()
            .map(|s| (s.use_case.id.clone(), s.score))
            .collect()
    }

    fn pairs(expected: &[(&str, u32)]) -> Vec<(String, u32)> {
        expected.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    fn use_case(id: &str, title: &str, tags: &[&str]) -> DetailedUseCase {
        DetailedUseCase {
            id: id.to_string(),
            category: "Testing".to_string(),
            title: title.to_string(),
            description: String::new(),
            examples: vec![],
            recommended_models: RecommendedModels {
                primary: "m".to_string(),
                alternatives: vec![],
            },
            estimated_tokens: EstimatedTokens {
                prompt: 1,
                completion: 1,
            },
            complexity: Complexity::Simple,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_regex_ranks_both_regex_cases_first() {
        assert_eq!(
            ids("regex", 5),
            pairs(&[("haiku-10", 33), ("mini-8", 23), ("mini-22", 15)])
        );
    }

    #[test]
    fn test_query_is_case_insensitive() {
        assert_eq!(ids("REGEX", 5), ids("regex", 5));
    }

    #[test]
    fn test_unmatched_query_is_empty() {
        assert!(find_best_use_cases("this function does not exist anywhere", 5).is_empty());
    }

    #[test]
    fn test_blank_query_is_empty() {
        assert!(find_best_use_cases("", 5).is_empty());
        assert!(find_best_use_cases("   ", 5).is_empty());
    }

    #[test]
    fn test_exact_title_scores_title_weight() {
        let results = ids("Blog Post Creation", 5);
        assert_eq!(results, pairs(&[("mini-1", 13)]));
        assert!(results[0].1 >= TITLE_WEIGHT);
    }

    #[test]
    fn test_query_containing_title_and_tags() {
        assert_eq!(
            ids("professional email writing", 5),
            pairs(&[("mini-2", 16), ("mini-1", 3)])
        );
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        assert_eq!(
            ids("code", 100),
            pairs(&[
                ("mini-25", 25),
                ("mini-30", 25),
                ("haiku-7", 15),
                ("haiku-13", 15),
                ("haiku-23", 15),
                ("mini-9", 13),
                ("mini-22", 13),
                ("haiku-1", 13),
                ("mini-26", 10),
                ("mini-27", 10),
                ("mini-29", 10),
                ("mini-4", 8),
                ("mini-21", 3),
            ])
        );
    }

    #[test]
    fn test_limit_truncates_and_scores_do_not_increase() {
        for query in ["code", "email", "json", "sql", "translation"] {
            let results = UseCaseCatalog::embedded().search(query, 3);
            assert!(results.len() <= 3, "{}", query);
            assert!(
                results.windows(2).all(|w| w[0].score >= w[1].score),
                "{}",
                query
            );
        }

        assert_eq!(find_best_use_cases("code", DEFAULT_LIMIT).len(), DEFAULT_LIMIT);
        assert!(find_best_use_cases("code", 0).is_empty());
    }

    #[test]
    fn test_known_queries() {
        assert_eq!(
            ids("email", 5),
            pairs(&[("mini-2", 33), ("mini-4", 15), ("haiku-10", 15), ("haiku-22", 15)])
        );
        assert_eq!(
            ids("json", 5),
            pairs(&[("mini-3", 25), ("mini-16", 18), ("mini-25", 15), ("haiku-2", 15)])
        );
        assert_eq!(
            ids("write a function to validate email addresses", 5),
            pairs(&[("mini-4", 15), ("mini-2", 3)])
        );
    }

    #[test]
    fn test_example_weight_counts_once() {
        let mut case = use_case("x-1", "Unrelated", &[]);
        case.examples = vec!["parse csv".to_string(), "parse csv files".to_string()];

        assert_eq!(score_use_case(&case, "csv"), EXAMPLE_WEIGHT);
    }

    #[test]
    fn test_each_tag_adds_weight() {
        let case = use_case("x-1", "Unrelated", &["sql", "query", "db"]);
        assert_eq!(score_use_case(&case, "optimize this sql query"), 2 * TAG_WEIGHT);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = UseCaseCatalog::new(vec![ModelUseCases {
            model: "m".to_string(),
            use_cases: vec![
                use_case("a", "Summaries", &["summary"]),
                use_case("b", "Summary Writing", &["summary"]),
            ],
        }]);

        let results = catalog.search("summary", 5);
        assert_eq!(results[0].use_case.id, "b");
        assert_eq!(results[0].score, TITLE_WEIGHT + TAG_WEIGHT);
        assert_eq!(results[1].use_case.id, "a");
        assert_eq!(results[1].score, TAG_WEIGHT);
    }
}
