//! Error types for bangsearch
//!
//! Provider-level failures are recovered by the dispatcher and recorded
//! next to the results. Only [`SearchError`] ever fails a whole request.

use crate::results::ProviderFailure;
use serde::{Deserialize, Serialize};

/// Coarse error kind reported for a failed provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    HttpError,
    ParseError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::HttpError => write!(f, "http_error"),
            Self::ParseError => write!(f, "parse_error"),
        }
    }
}

/// Failure of a single provider's fetch or parse step
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider did not answer within its timeout or the shared deadline
    #[error("request timed out")]
    Timeout,

    /// Transport failure or non-success HTTP status
    #[error("HTTP error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Unrecognized or malformed markup
    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    pub fn http(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout => ErrorKind::Timeout,
            Self::Http { .. } => ErrorKind::HttpError,
            Self::Parse(_) => ErrorKind::ParseError,
        }
    }
}

/// Errors that fail an entire search request
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// The query was blank after trimming
    #[error("empty query")]
    EmptyQuery,

    /// No providers configured, or all of them disabled
    #[error("no search providers are enabled")]
    NoProvidersEnabled,

    /// Every enabled provider errored; distinct from a query with no matches
    #[error("all {} search providers failed", failures.len())]
    AllProvidersFailed { failures: Vec<ProviderFailure> },
}
