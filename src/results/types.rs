//! Result type definitions

use crate::error::{ErrorKind, ProviderError};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single normalized search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title text of the result link
    pub title: String,
    /// Display text for the destination, as shown by the provider
    pub display_url: String,
    /// Resolved destination URL, never a provider redirect wrapper
    pub url: String,
    /// Content snippet/summary
    pub snippet: Option<String>,
    /// Provider that returned this result
    pub provider: String,
    /// 0-based position in the provider's own output
    pub rank: usize,
    /// Whether the provider marked this entry as an advertisement
    #[serde(default)]
    pub is_ad: bool,
    /// Score assigned by the reranker
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    /// Create a new organic result
    pub fn new(url: impl Into<String>, title: impl Into<String>, provider: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            display_url: url.clone(),
            url,
            title: title.into(),
            snippet: None,
            provider: provider.into(),
            rank: 0,
            is_ad: false,
            score: 0.0,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_display_url(mut self, display: impl Into<String>) -> Self {
        self.display_url = display.into();
        self
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// Lowercased host of the target URL, if it parses
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_end_matches('.').to_lowercase()))
    }
}

/// A provider that contributed nothing because it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(provider: impl Into<String>, error: &ProviderError) -> Self {
        Self {
            provider: provider.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Provider response timing information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Provider name
    pub provider: String,
    /// Fetch plus parse time in milliseconds
    pub elapsed_ms: u64,
    /// Number of results parsed
    pub result_count: usize,
}

/// Final merged, filtered and ordered output of one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResultSet {
    /// The query text as dispatched
    pub query: String,
    /// Ordered results
    pub results: Vec<SearchResult>,
    /// Providers that failed or timed out, in priority order
    pub errors: Vec<ProviderFailure>,
    /// Timings for providers that answered
    #[serde(default)]
    pub timings: Vec<Timing>,
}

impl AggregatedResultSet {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// True when at least one provider failed but others answered
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() && !self.timings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_is_lowercased() {
        let result = SearchResult::new("https://WWW.Example.COM/Page", "Example", "bing");
        assert_eq!(result.host().as_deref(), Some("www.example.com"));
    }

    #[test]
    fn test_host_of_unparseable_url() {
        let result = SearchResult::new("not a url", "Broken", "bing");
        assert_eq!(result.host(), None);
    }

    #[test]
    fn test_failure_records_kind_and_message() {
        let failure = ProviderFailure::new("google", &ProviderError::http(Some(503), "unavailable"));
        assert_eq!(failure.kind, ErrorKind::HttpError);
        assert!(failure.message.contains("503"));
    }
}
