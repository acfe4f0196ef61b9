//! Query model and bang handling
//!
//! A [`Query`] is what the dispatcher fans out to providers. Bang detection
//! runs before a query is built and can short-circuit the search entirely.

mod bang;

pub use bang::{BangResolution, BangResolver, RedirectDirective};

use crate::preferences::UserId;
use serde::{Deserialize, Serialize};

/// A query as dispatched to providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Raw query text
    pub text: String,
    /// User the search runs for
    pub user: UserId,
    /// Locale such as `en` or `de-CH`
    pub locale: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>, user: UserId) -> Self {
        Self {
            text: text.into(),
            user,
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        self.locale = (!locale.trim().is_empty()).then(|| locale.trim().to_string());
        self
    }

    /// Check if query is empty
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Locale or the given fallback
    pub fn locale_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.locale.as_deref().unwrap_or(default)
    }

    /// Language part of the locale (`de-CH` -> `de`)
    pub fn language(&self) -> Option<&str> {
        self.locale
            .as_deref()
            .and_then(|l| l.split(['-', '_']).next())
            .filter(|l| !l.is_empty())
    }
}
