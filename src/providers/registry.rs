//! Provider registry: the enabled providers in priority order

use super::traits::Provider;
use std::sync::Arc;

/// Registry of loaded providers. Registration order is merge priority.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider after all previously registered ones.
    /// A provider with the same name replaces the earlier one in place.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        match self.providers.iter().position(|p| p.name() == provider.name()) {
            Some(index) => self.providers[index] = provider,
            None => self.providers.push(provider),
        }
    }

    /// Providers in priority order
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.iter()
    }

    /// Get all provider names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.providers().map(|p| p.name()).collect()
    }

    /// Get number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
