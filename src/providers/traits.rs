//! Provider traits and types

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::network::HttpClient;
use crate::query::Query;
use crate::results::SearchResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Default per-provider timeout when neither the adapter nor config sets one
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP request to be made for a provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers, overriding the client defaults
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// Form body for POST requests
    pub form: Option<Vec<(String, String)>>,
    /// Cookies to send
    pub cookies: HashMap<String, String>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: Vec::new(),
            form: None,
            cookies: HashMap::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a form field (sends the body form-urlencoded)
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Add a cookie
    pub fn cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(key.into(), value.into());
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Unparsed provider answer
#[derive(Debug, Clone)]
pub struct RawProviderResponse {
    /// Provider that was asked
    pub provider: String,
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
    /// Response URL (after redirects)
    pub url: String,
    /// Time from send to full body
    pub elapsed: Duration,
}

impl RawProviderResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// A search provider: request construction, fetching and page parsing
#[async_trait]
pub trait Provider: Send + Sync {
    /// Configured provider name, used in results and error records
    fn name(&self) -> &str;

    /// Time budget for one fetch
    fn timeout(&self) -> Duration {
        DEFAULT_PROVIDER_TIMEOUT
    }

    /// Build the HTTP request for a search
    fn request(&self, query: &Query) -> Result<ProviderRequest, ProviderError>;

    /// Send the request. Non-2xx answers are HTTP errors.
    async fn fetch(
        &self,
        client: &HttpClient,
        query: &Query,
    ) -> Result<RawProviderResponse, ProviderError> {
        let request = self.request(query)?;
        let raw = client.execute(request, self.name(), self.timeout()).await?;

        if raw.is_rate_limited() {
            return Err(ProviderError::http(Some(raw.status), "rate limited"));
        }
        if !raw.is_success() {
            return Err(ProviderError::http(
                Some(raw.status),
                format!("unexpected status from {}", raw.url),
            ));
        }
        Ok(raw)
    }

    /// Parse a fetched page into ranked results
    fn parse(&self, raw: &RawProviderResponse) -> Result<Vec<SearchResult>, ProviderError>;

    /// Apply configuration (called once on startup)
    fn init(&mut self, _config: &ProviderConfig) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Settings every scraping provider carries
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub name: String,
    pub endpoint: String,
    pub format: crate::providers::FormatSelector,
    pub timeout: Duration,
}

impl ScraperSettings {
    pub fn new(name: &str, endpoint: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            format: Default::default(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Apply name, endpoint, format and timeout overrides
    pub fn apply(&mut self, config: &ProviderConfig) -> anyhow::Result<()> {
        if !config.name.is_empty() {
            self.name = config.name.clone();
        }
        if let Some(ref base_url) = config.base_url {
            url::Url::parse(base_url)
                .map_err(|e| anyhow::anyhow!("invalid base_url {base_url:?}: {e}"))?;
            self.endpoint = base_url.clone();
        }
        if let Some(timeout) = config.timeout_duration()? {
            self.timeout = timeout;
        }
        self.format = config.format;
        Ok(())
    }

    /// Page a response was served from, falling back to the endpoint
    pub fn page_url(&self, raw: &RawProviderResponse) -> Result<url::Url, ProviderError> {
        url::Url::parse(&raw.url)
            .or_else(|_| url::Url::parse(&self.endpoint))
            .map_err(|e| ProviderError::parse(format!("{}: bad page URL: {e}", self.name)))
    }
}
