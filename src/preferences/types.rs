//! Per-user preference records

use super::pattern::DomainPattern;
use super::PreferenceError;
use serde::{Deserialize, Serialize};

/// Identity of the user a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a bang belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BangScope {
    Global,
    User(UserId),
}

/// Placeholders recognized in bang URL templates
pub const PLACEHOLDERS: [&str; 2] = ["{query}", "{}"];

/// A `!trigger` shortcut redirecting the whole query to one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bang {
    /// Trigger token without the leading `!`
    pub trigger: String,
    /// Target provider identifier
    pub provider: String,
    /// URL template containing a query placeholder
    pub url_template: String,
    pub scope: BangScope,
}

impl Bang {
    pub fn new(
        trigger: impl Into<String>,
        provider: impl Into<String>,
        url_template: impl Into<String>,
        scope: BangScope,
    ) -> Result<Self, PreferenceError> {
        let trigger = trigger.into();
        let url_template = url_template.into();

        if trigger.is_empty() || trigger.contains(char::is_whitespace) || trigger.contains('!') {
            return Err(PreferenceError::InvalidBang(format!(
                "invalid trigger {trigger:?}"
            )));
        }
        if !PLACEHOLDERS.iter().any(|p| url_template.contains(p)) {
            return Err(PreferenceError::InvalidBang(format!(
                "template for !{trigger} has no query placeholder"
            )));
        }

        Ok(Self {
            trigger,
            provider: provider.into(),
            url_template,
            scope,
        })
    }

    pub fn global(
        trigger: impl Into<String>,
        provider: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Result<Self, PreferenceError> {
        Self::new(trigger, provider, url_template, BangScope::Global)
    }

    pub fn for_user(
        user: &UserId,
        trigger: impl Into<String>,
        provider: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Result<Self, PreferenceError> {
        Self::new(trigger, provider, url_template, BangScope::User(user.clone()))
    }

    pub fn is_user_scoped(&self) -> bool {
        matches!(self.scope, BangScope::User(_))
    }
}

/// A domain whose results are always excluded for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocklistEntry {
    pub user: UserId,
    pub pattern: DomainPattern,
}

impl BlocklistEntry {
    pub fn new(user: &UserId, pattern: &str) -> Result<Self, PreferenceError> {
        Ok(Self {
            user: user.clone(),
            pattern: DomainPattern::parse(pattern)?,
        })
    }
}

/// A score multiplier applied to a domain's results for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub user: UserId,
    pub pattern: DomainPattern,
    /// 1.0 is neutral, above promotes, below demotes
    pub multiplier: f64,
}

impl WeightEntry {
    pub fn new(user: &UserId, pattern: &str, multiplier: f64) -> Result<Self, PreferenceError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(PreferenceError::InvalidMultiplier(multiplier));
        }
        Ok(Self {
            user: user.clone(),
            pattern: DomainPattern::parse(pattern)?,
            multiplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bang_validation() {
        assert!(Bang::global("g", "google", "https://www.google.com/search?q={}").is_ok());
        assert!(Bang::global("g", "google", "https://www.google.com/search?q={query}").is_ok());
        assert!(Bang::global("", "google", "https://x/?q={}").is_err());
        assert!(Bang::global("g g", "google", "https://x/?q={}").is_err());
        assert!(Bang::global("!g", "google", "https://x/?q={}").is_err());
        assert!(Bang::global("g", "google", "https://x/").is_err());
    }

    #[test]
    fn test_weight_rejects_non_positive() {
        let user = UserId::new("alice");
        assert!(WeightEntry::new(&user, "example.com", 0.0).is_err());
        assert!(WeightEntry::new(&user, "example.com", -1.5).is_err());
        assert!(WeightEntry::new(&user, "example.com", f64::NAN).is_err());
        assert!(WeightEntry::new(&user, "example.com", f64::INFINITY).is_err());
        assert!(WeightEntry::new(&user, "example.com", 0.5).is_ok());
    }

    #[test]
    fn test_user_scope() {
        let user = UserId::new("alice");
        let bang = Bang::for_user(&user, "w", "wikipedia", "https://en.wikipedia.org/?search={}").unwrap();
        assert!(bang.is_user_scoped());
        assert_eq!(bang.scope, BangScope::User(user));
    }
}
