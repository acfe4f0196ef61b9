//! Domain patterns shared by blocklist and weight entries

use super::PreferenceError;
use serde::{Deserialize, Serialize};
use url::Url;

/// A host pattern matching the host itself and all of its subdomains.
///
/// `example.com` matches `example.com` and `www.example.com` but not
/// `badexample.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainPattern(String);

impl DomainPattern {
    /// Parse a pattern.
    ///
    /// Accepts bare hosts, `*.host`, `.host`, and full URLs (reduced to
    /// their host). Matching is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, PreferenceError> {
        let trimmed = raw.trim();

        let host = if trimmed.contains("://") {
            Url::parse(trimmed)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .ok_or_else(|| PreferenceError::InvalidPattern(raw.to_string()))?
        } else {
            trimmed
                .trim_start_matches("*.")
                .trim_start_matches('.')
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string()
        };

        let host = host.trim_end_matches('.').to_lowercase();
        if host.is_empty() || host.contains(char::is_whitespace) || host.contains('*') {
            return Err(PreferenceError::InvalidPattern(raw.to_string()));
        }

        Ok(Self(host))
    }

    /// Check whether a host falls under this pattern
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        host == self.0
            || (host.len() > self.0.len()
                && host.ends_with(&self.0)
                && host.as_bytes()[host.len() - self.0.len() - 1] == b'.')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DomainPattern {
    type Error = PreferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainPattern> for String {
    fn from(pattern: DomainPattern) -> Self {
        pattern.0
    }
}

impl std::fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
