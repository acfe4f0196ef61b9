//! Search request and outcome models

use crate::preferences::UserId;
use crate::results::AggregatedResultSet;
use serde::{Deserialize, Serialize};

pub use crate::query::RedirectDirective;

/// A search as submitted by the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Raw query text, possibly starting with a bang
    pub query: String,
    /// User whose preferences apply
    pub user: UserId,
    /// Requested locale, the configured default when absent
    #[serde(default)]
    pub locale: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, user: UserId) -> Self {
        Self {
            query: query.into(),
            user,
            locale: None,
        }
    }

    /// Search as the anonymous user
    pub fn anonymous(query: impl Into<String>) -> Self {
        Self::new(query, UserId::anonymous())
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Either a bang redirect or aggregated results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchOutcome {
    Redirect(RedirectDirective),
    Results(AggregatedResultSet),
}

impl SearchOutcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    pub fn redirect(&self) -> Option<&RedirectDirective> {
        match self {
            Self::Redirect(directive) => Some(directive),
            Self::Results(_) => None,
        }
    }

    pub fn results(&self) -> Option<&AggregatedResultSet> {
        match self {
            Self::Results(set) => Some(set),
            Self::Redirect(_) => None,
        }
    }
}
