//! bangsearch: a bang-aware metasearch aggregator
//!
//! Resolves `!bang` shortcuts to redirects, otherwise queries several web
//! search providers concurrently, normalizes and deduplicates their
//! results, and reorders them with per-user blocklists and weights.

pub mod config;
pub mod error;
pub mod network;
pub mod preferences;
pub mod providers;
pub mod query;
pub mod results;
pub mod search;

pub use config::Settings;
pub use error::{ErrorKind, ProviderError, SearchError};
pub use preferences::{InMemoryPreferenceStore, PreferenceStore, UserId};
pub use providers::Provider;
pub use results::{AggregatedResultSet, SearchResult};
pub use search::{Search, SearchOutcome, SearchRequest};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default shared deadline for one search request, in milliseconds
pub const DEFAULT_DEADLINE_MS: u64 = 3000;
