//! Merging and deduplication of per-provider result sequences
//!
//! Merge order is a pure function of provider priority and provider-local
//! rank. Arrival order of provider responses never enters into it.

use super::types::SearchResult;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Key used to detect duplicate destinations.
///
/// `scheme://host[:port]path[?query]` with scheme and host lowercased and
/// the fragment dropped. Anything that does not parse as a URL is compared
/// by its trimmed raw text.
pub fn dedup_key(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return url.trim().to_string();
    };

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let mut key = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        key.push_str(&format!(":{port}"));
    }
    key.push_str(parsed.path());
    if let Some(query) = parsed.query() {
        key.push('?');
        key.push_str(query);
    }
    key
}

/// Merge provider outputs into one sequence.
///
/// `batches` must be in provider priority order. Within a batch results are
/// ordered by their provider-local rank. Advertisement entries are dropped
/// and for each destination only the earliest occurrence survives.
pub fn merge(batches: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    let mut dropped = 0usize;

    for mut batch in batches {
        batch.sort_by_key(|r| r.rank);
        for result in batch {
            if result.is_ad {
                dropped += 1;
                continue;
            }
            if seen.insert(dedup_key(&result.url)) {
                merged.push(result);
            } else {
                dropped += 1;
            }
        }
    }

    debug!(kept = merged.len(), dropped, "merged provider results");
    merged
}
