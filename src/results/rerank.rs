//! Per-user blocklist filtering and weight-based reranking

use super::types::SearchResult;
use crate::preferences::{BlocklistEntry, DomainPattern, WeightEntry};
use tracing::debug;

/// Applies one user's blocklist and weights to a merged result sequence
#[derive(Debug, Clone, Default)]
pub struct Reranker {
    blocked: Vec<DomainPattern>,
    weights: Vec<(DomainPattern, f64)>,
}

impl Reranker {
    pub fn new(blocklist: &[BlocklistEntry], weights: &[WeightEntry]) -> Self {
        Self {
            blocked: blocklist.iter().map(|e| e.pattern.clone()).collect(),
            weights: weights
                .iter()
                .map(|e| (e.pattern.clone(), e.multiplier))
                .collect(),
        }
    }

    /// Whether a host is excluded by the blocklist
    pub fn is_blocked(&self, host: &str) -> bool {
        self.blocked.iter().any(|p| p.matches_host(host))
    }

    /// Product of all weight multipliers matching a host (1.0 if none)
    pub fn multiplier(&self, host: &str) -> f64 {
        self.weights
            .iter()
            .filter(|(pattern, _)| pattern.matches_host(host))
            .map(|(_, m)| *m)
            .product()
    }

    /// Drop blocked results, score the rest and sort by score.
    ///
    /// The base score of the result at merged position `i` is `1 / (1 + i)`.
    /// Positions are taken before blocked results are removed. Ties keep
    /// merged order.
    pub fn rerank(&self, merged: Vec<SearchResult>) -> Vec<SearchResult> {
        let total = merged.len();

        let mut ranked: Vec<SearchResult> = merged
            .into_iter()
            .enumerate()
            .filter_map(|(position, mut result)| {
                let host = result.host();
                if host.as_deref().is_some_and(|h| self.is_blocked(h)) {
                    return None;
                }
                let multiplier = host.as_deref().map_or(1.0, |h| self.multiplier(h));
                result.score = multiplier / (1.0 + position as f64);
                Some(result)
            })
            .collect();

        // Vec::sort_by is stable
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            kept = ranked.len(),
            blocked = total - ranked.len(),
            "reranked results"
        );
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::UserId;

    fn make_result(url: &str) -> SearchResult {
        SearchResult::new(url, url, "ddg")
    }

    fn urls(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_blocklist_removes_domain_and_subdomains() {
        let user = UserId::new("alice");
        let reranker = Reranker::new(&[BlocklistEntry::new(&user, "example.com").unwrap()], &[]);

        let results = reranker.rerank(vec![
            make_result("https://example.com/a"),
            make_result("https://www.example.com/b"),
            make_result("https://badexample.com/c"),
            make_result("https://other.org/d"),
        ]);

        assert_eq!(urls(&results), vec!["https://badexample.com/c", "https://other.org/d"]);
    }

    #[test]
    fn test_blocklist_beats_weight() {
        let user = UserId::new("alice");
        let reranker = Reranker::new(
            &[BlocklistEntry::new(&user, "spam.net").unwrap()],
            &[WeightEntry::new(&user, "spam.net", 100.0).unwrap()],
        );

        let results = reranker.rerank(vec![
            make_result("https://spam.net/"),
            make_result("https://ok.org/"),
        ]);
        assert_eq!(urls(&results), vec!["https://ok.org/"]);
    }

    #[test]
    fn test_weight_promotes_over_equal_score() {
        let user = UserId::new("alice");
        let reranker = Reranker::new(&[], &[WeightEntry::new(&user, "b.org", 2.0).unwrap()]);

        // Position 0 base 1.0, position 1 base 0.5 * 2.0 = 1.0: a tie, merged order wins
        let tied = reranker.rerank(vec![make_result("https://a.org/"), make_result("https://b.org/")]);
        assert_eq!(urls(&tied), vec!["https://a.org/", "https://b.org/"]);

        // Same position-derived score: weighted host strictly ahead
        let a = reranker.rerank(vec![make_result("https://a.org/")]);
        let b = reranker.rerank(vec![make_result("https://b.org/")]);
        assert!(b[0].score > a[0].score);
    }

    #[test]
    fn test_weighted_host_overtakes_earlier_result() {
        let user = UserId::new("alice");
        let reranker = Reranker::new(&[], &[WeightEntry::new(&user, "b.org", 2.5).unwrap()]);

        // b.org: 2.5 / 2 = 1.25 beats a.org's neutral 1.0
        let results = reranker.rerank(vec![make_result("https://a.org/"), make_result("https://b.org/")]);
        assert_eq!(urls(&results), vec!["https://b.org/", "https://a.org/"]);
        assert_eq!(results[0].score, 1.25);
        assert_eq!(results[1].score, 1.0);
    }

    #[test]
    fn test_weight_reorders_sequence() {
        let user = UserId::new("alice");
        let reranker = Reranker::new(&[], &[WeightEntry::new(&user, "docs.rs", 3.0).unwrap()]);

        let results = reranker.rerank(vec![
            make_result("https://a.org/"),
            make_result("https://b.org/"),
            make_result("https://docs.rs/tokio"),
        ]);
        // docs.rs: 3.0 / 3 = 1.0, ties with a.org and keeps its later merged position
        assert_eq!(
            urls(&results),
            vec!["https://a.org/", "https://docs.rs/tokio", "https://b.org/"]
        );
    }

    #[test]
    fn test_demotion_and_multiplicative_patterns() {
        let user = UserId::new("alice");
        let reranker = Reranker::new(
            &[],
            &[
                WeightEntry::new(&user, "example.com", 0.5).unwrap(),
                WeightEntry::new(&user, "blog.example.com", 0.5).unwrap(),
            ],
        );
        assert_eq!(reranker.multiplier("blog.example.com"), 0.25);
        assert_eq!(reranker.multiplier("www.example.com"), 0.5);
        assert_eq!(reranker.multiplier("unrelated.net"), 1.0);

        let results = reranker.rerank(vec![
            make_result("https://blog.example.com/"),
            make_result("https://unrelated.net/"),
        ]);
        assert_eq!(urls(&results), vec!["https://unrelated.net/", "https://blog.example.com/"]);
    }

    #[test]
    fn test_neutral_preferences_keep_merged_order() {
        let reranker = Reranker::default();
        let input = vec![
            make_result("https://one.org/"),
            make_result("not a url"),
            make_result("https://three.org/"),
        ];
        let results = reranker.rerank(input);
        assert_eq!(urls(&results), vec!["https://one.org/", "not a url", "https://three.org/"]);
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[2].score, 1.0 / 3.0);
    }
}
