//! Provider loader for initializing providers from configuration

use super::registry::ProviderRegistry;
use super::traits::Provider;
use super::{bing, duckduckgo, google};
use crate::config::{ProviderConfig, Settings};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Load all enabled providers from settings, in configured order
    pub fn load(settings: &Settings) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();

        for config in &settings.providers {
            if config.disabled {
                info!("Skipping disabled provider: {}", config.name);
                continue;
            }

            match Self::create_provider(config) {
                Ok(provider) => {
                    info!("Loaded provider: {} ({})", config.name, config.engine);
                    registry.register(provider);
                }
                Err(e) => {
                    warn!("Failed to load provider {}: {}", config.name, e);
                }
            }
        }

        info!("Loaded {} providers", registry.len());
        registry
    }

    /// Create and configure a provider instance
    pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
        let mut provider: Box<dyn Provider> = match config.engine.as_str() {
            "duckduckgo" => Box::new(duckduckgo::DuckDuckGo::new()),
            "bing" => Box::new(bing::Bing::new()),
            "google" => Box::new(google::Google::new()),
            other => {
                return Err(anyhow::anyhow!("Unknown provider engine: {}", other));
            }
        };

        provider.init(config)?;

        Ok(Arc::from(provider))
    }

    /// Get list of available provider engines
    pub fn available_providers() -> Vec<&'static str> {
        vec!["duckduckgo", "bing", "google"]
    }
}
