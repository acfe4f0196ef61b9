//! Concurrent fan-out of one query to every enabled provider

use crate::error::{ProviderError, SearchError};
use crate::network::HttpClient;
use crate::providers::{Provider, ProviderRegistry};
use crate::query::Query;
use crate::results::{merge, AggregatedResultSet, ProviderFailure, SearchResult, Timing};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

/// What one provider task produced
#[derive(Debug)]
struct ProviderOutcome {
    provider: String,
    elapsed: Duration,
    result: Result<Vec<SearchResult>, ProviderError>,
}

/// Sends a query to all registered providers under one shared deadline
#[derive(Clone)]
pub struct Dispatcher {
    client: HttpClient,
    registry: Arc<ProviderRegistry>,
    deadline: Duration,
}

impl Dispatcher {
    pub fn new(client: HttpClient, registry: Arc<ProviderRegistry>, deadline: Duration) -> Self {
        Self {
            client,
            registry,
            deadline,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Fetch and parse from every provider, then merge in priority order.
    ///
    /// Providers still running at the deadline are aborted and recorded as
    /// timeouts. Fails only when no provider is enabled or all of them failed.
    pub async fn dispatch(&self, query: Arc<Query>) -> Result<AggregatedResultSet, SearchError> {
        if self.registry.is_empty() {
            return Err(SearchError::NoProvidersEnabled);
        }

        let started = Instant::now();
        let deadline = started + self.deadline;

        info!(
            "Dispatching '{}' to {} providers",
            query.text,
            self.registry.len()
        );

        let handles: Vec<(String, JoinHandle<ProviderOutcome>)> = self
            .registry
            .providers()
            .map(|provider| {
                let name = provider.name().to_string();
                let budget = provider.timeout().min(self.deadline);
                let task = run_provider(
                    Arc::clone(provider),
                    self.client.clone(),
                    Arc::clone(&query),
                    budget,
                );
                (name, tokio::spawn(task))
            })
            .collect();

        // Awaited in priority order; each handle sees the same deadline
        let outcomes = join_all(handles.into_iter().map(|(provider, mut handle)| async move {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(join_error)) => ProviderOutcome {
                    provider,
                    elapsed: started.elapsed(),
                    result: Err(ProviderError::parse(format!("provider task failed: {join_error}"))),
                },
                Err(_) => {
                    handle.abort();
                    ProviderOutcome {
                        provider,
                        elapsed: started.elapsed(),
                        result: Err(ProviderError::Timeout),
                    }
                }
            }
        }))
        .await;

        let mut set = AggregatedResultSet::new(query.text.clone());
        let mut batches = Vec::with_capacity(outcomes.len());

        for outcome in outcomes {
            match outcome.result {
                Ok(results) => {
                    debug!(
                        "Provider {} returned {} results in {:?}",
                        outcome.provider,
                        results.len(),
                        outcome.elapsed
                    );
                    set.timings.push(Timing {
                        provider: outcome.provider,
                        elapsed_ms: outcome.elapsed.as_millis() as u64,
                        result_count: results.len(),
                    });
                    batches.push(results);
                }
                Err(error) => {
                    warn!("Provider {} failed: {}", outcome.provider, error);
                    set.errors.push(ProviderFailure::new(outcome.provider, &error));
                }
            }
        }

        if batches.is_empty() {
            return Err(SearchError::AllProvidersFailed { failures: set.errors });
        }

        set.results = merge(batches);
        info!(
            "Query '{}' merged to {} results ({} providers failed) in {:?}",
            set.query,
            set.results.len(),
            set.errors.len(),
            started.elapsed()
        );
        Ok(set)
    }
}

/// Fetch then parse, bounded by the provider's own budget
async fn run_provider(
    provider: Arc<dyn Provider>,
    client: HttpClient,
    query: Arc<Query>,
    budget: Duration,
) -> ProviderOutcome {
    let started = Instant::now();
    debug!("Querying provider {} with timeout {:?}", provider.name(), budget);

    let result = match timeout(budget, provider.fetch(&client, &query)).await {
        Ok(Ok(raw)) => provider.parse(&raw),
        Ok(Err(error)) => Err(error),
        Err(_) => Err(ProviderError::Timeout),
    };

    ProviderOutcome {
        provider: provider.name().to_string(),
        elapsed: started.elapsed(),
        result,
    }
}
