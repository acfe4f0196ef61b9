//! Settings structures for bangsearch configuration

use crate::providers::{FormatSelector, ProviderLoader};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for `search.deadline_ms` (ten minutes)
pub const MAX_DEADLINE_MS: u64 = 600_000;

/// Positive, representable number of seconds
fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value)
        .ok()
        .filter(|d| !d.is_zero())
}

/// Main settings structure loaded from settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
    /// Providers in priority order
    pub providers: Vec<ProviderConfig>,
    /// Optional YAML file with bangs, blocklists and weights
    pub preferences: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            search: SearchSettings::default(),
            outgoing: OutgoingSettings::default(),
            providers: default_providers(),
            preferences: None,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (BANGSEARCH_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("BANGSEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("BANGSEARCH_DEADLINE_MS") {
            if let Ok(ms) = val.parse() {
                self.search.deadline_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("BANGSEARCH_DEFAULT_LOCALE") {
            self.search.default_locale = val;
        }
        if let Ok(val) = std::env::var("BANGSEARCH_PREFERENCES_PATH") {
            self.preferences = Some(PathBuf::from(val));
        }
    }

    /// Reject settings the dispatcher cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.search.deadline_ms == 0 {
            bail!("search.deadline_ms must be greater than zero");
        }
        if self.search.deadline_ms > MAX_DEADLINE_MS {
            bail!("search.deadline_ms must be at most {MAX_DEADLINE_MS}");
        }
        self.outgoing.timeout()?;

        let known = ProviderLoader::available_providers();
        let mut names = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                bail!("provider with engine {:?} has no name", provider.engine);
            }
            if !names.insert(provider.name.as_str()) {
                bail!("duplicate provider name: {}", provider.name);
            }
            if !known.contains(&provider.engine.as_str()) {
                bail!(
                    "provider {} uses unknown engine {:?} (known: {})",
                    provider.name,
                    provider.engine,
                    known.join(", ")
                );
            }
            provider.timeout_duration()?;
        }
        Ok(())
    }

    /// Enabled providers in priority order
    pub fn enabled_providers(&self) -> Vec<&ProviderConfig> {
        self.providers.iter().filter(|p| !p.disabled).collect()
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name used in logs
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "bangsearch".to_string(),
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Shared deadline for all providers of one request, in milliseconds
    pub deadline_ms: u64,
    /// Locale used when a request carries none
    pub default_locale: String,
}

impl SearchSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            deadline_ms: crate::DEFAULT_DEADLINE_MS,
            default_locale: "en".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl OutgoingSettings {
    /// Client-wide request timeout
    pub fn timeout(&self) -> Result<Duration> {
        seconds(self.request_timeout).with_context(|| {
            format!(
                "outgoing.request_timeout must be a positive number of seconds, got {}",
                self.request_timeout
            )
        })
    }
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (unique identifier)
    pub name: String,
    /// Adapter to use
    pub engine: String,
    /// Endpoint override
    pub base_url: Option<String>,
    /// Whether provider is disabled
    pub disabled: bool,
    /// Per-provider timeout in seconds
    pub timeout: Option<f64>,
    /// API credential if the provider needs one
    pub api_key: Option<String>,
    /// Markup format to parse, `auto` detects per response
    pub format: FormatSelector,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
            ..Default::default()
        }
    }

    /// Per-provider timeout override, rejecting values a `Duration` cannot hold
    pub fn timeout_duration(&self) -> Result<Option<Duration>> {
        self.timeout
            .map(|value| {
                seconds(value).with_context(|| {
                    format!("provider {} has an invalid timeout: {value}", self.name)
                })
            })
            .transpose()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            engine: String::new(),
            base_url: None,
            disabled: false,
            timeout: None,
            api_key: None,
            format: FormatSelector::Auto,
        }
    }
}

/// Default provider configurations
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new("duckduckgo", "duckduckgo"),
        ProviderConfig::new("bing", "bing"),
        ProviderConfig::new("google", "google"),
    ]
}
