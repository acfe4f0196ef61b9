//! HTTP client for making requests to search providers

use super::user_agent::{accept_html, accept_language, generate_user_agent};
use crate::config::OutgoingSettings;
use crate::error::ProviderError;
use crate::providers::{HttpMethod, ProviderRequest, RawProviderResponse};
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// HTTP client wrapper shared by all providers
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let default_timeout = settings.timeout()?;
        let mut builder = Client::builder()
            .timeout(default_timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout,
            user_agent: generate_user_agent(),
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Client-wide timeout from the outgoing settings
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute a provider request, bounded by `timeout`
    pub async fn execute(
        &self,
        request: ProviderRequest,
        provider: &str,
        timeout: Duration,
    ) -> Result<RawProviderResponse, ProviderError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .timeout(timeout.min(self.default_timeout))
            .headers(self.headers_for(&request)?);

        // Add query parameters
        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        // Add form body
        if let Some(ref form) = request.form {
            req_builder = req_builder.form(form);
        }

        let started = Instant::now();
        let response = req_builder.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await.map_err(transport_error)?;
        let elapsed = started.elapsed();

        debug!(
            provider,
            status,
            bytes = body.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "provider responded"
        );

        Ok(RawProviderResponse {
            provider: provider.to_string(),
            status,
            body,
            url,
            elapsed,
        })
    }

    /// Default browser headers, then configured extras, then the request's own
    fn headers_for(&self, request: &ProviderRequest) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let defaults = [
            ("User-Agent", self.user_agent.clone()),
            ("Accept", accept_html().to_string()),
            ("Accept-Language", accept_language("en")),
            ("DNT", "1".to_string()),
            ("Upgrade-Insecure-Requests", "1".to_string()),
        ];

        let cookie = (!request.cookies.is_empty()).then(|| {
            request
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ")
        });

        let pairs = defaults
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(self.extra_headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .chain(request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .chain(cookie.as_deref().map(|c| ("Cookie", c)));

        for (key, value) in pairs {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ProviderError::http(None, format!("invalid header name {key:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProviderError::http(None, format!("invalid value for {key}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::http(err.status().map(|s| s.as_u16()), err.to_string())
    }
}
