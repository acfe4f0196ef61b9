//! Search execution: bangs, dispatch and per-user reranking

use super::dispatcher::Dispatcher;
use super::models::{SearchOutcome, SearchRequest};
use crate::config::Settings;
use crate::error::SearchError;
use crate::network::HttpClient;
use crate::preferences::PreferenceStore;
use crate::providers::ProviderLoader;
use crate::query::{BangResolution, BangResolver, Query};
use crate::results::Reranker;
use std::sync::Arc;
use tracing::info;

/// Front-end entry point that runs one search request end to end
pub struct Search {
    dispatcher: Dispatcher,
    preferences: Arc<dyn PreferenceStore>,
    default_locale: String,
}

impl Search {
    /// Create a new search executor
    pub fn new(dispatcher: Dispatcher, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            dispatcher,
            preferences,
            default_locale: "en".to_string(),
        }
    }

    /// Wire client, providers and deadline from settings
    pub fn from_settings(
        settings: &Settings,
        preferences: Arc<dyn PreferenceStore>,
    ) -> anyhow::Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let registry = Arc::new(ProviderLoader::load(settings));
        let dispatcher = Dispatcher::new(client, registry, settings.search.deadline());

        Ok(Self::new(dispatcher, preferences).with_default_locale(&settings.search.default_locale))
    }

    /// Locale for requests that carry none
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run a search.
    ///
    /// A known bang short-circuits into a redirect without contacting any
    /// provider. Everything else is dispatched with the original text and
    /// reranked with the user's blocklist and weights.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, SearchError> {
        if request.query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let prefs = self.preferences.snapshot(&request.user);

        let resolver = BangResolver::new(prefs.bangs);
        if let BangResolution::Redirect(directive) = resolver.resolve(&request.query) {
            info!(
                "Bang !{} for user {} redirects to {}",
                directive.trigger, request.user, directive.provider
            );
            return Ok(SearchOutcome::Redirect(directive));
        }

        let locale = request.locale.unwrap_or_else(|| self.default_locale.clone());
        let query = Arc::new(Query::new(request.query, request.user).with_locale(locale));

        let mut set = self.dispatcher.dispatch(query).await?;
        set.results = Reranker::new(&prefs.blocklist, &prefs.weights).rerank(set.results);

        Ok(SearchOutcome::Results(set))
    }
}
