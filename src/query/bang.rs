//! Bang resolution: `!trigger rest of query` to a single-provider redirect

use crate::preferences::{Bang, BangScope, PLACEHOLDERS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// `!token` at the start, then optional whitespace-separated remainder
static BANG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^!(\S+)(?:\s+(.*))?$").expect("bang regex is valid"));

/// Where to send the user instead of searching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectDirective {
    /// Fully substituted target URL
    pub url: String,
    /// Provider the bang points at
    pub provider: String,
    /// Trigger that matched, as stored
    pub trigger: String,
}

/// Outcome of bang detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BangResolution {
    Redirect(RedirectDirective),
    /// Not a known bang; search for the original query unchanged
    NoMatch,
}

/// Trigger table for one user
#[derive(Debug, Clone, Default)]
pub struct BangResolver {
    bangs: HashMap<String, Bang>,
}

impl BangResolver {
    /// Build the table; user-scoped bangs win over global ones on collision
    pub fn new(bangs: impl IntoIterator<Item = Bang>) -> Self {
        let (user, global): (Vec<_>, Vec<_>) =
            bangs.into_iter().partition(|b| matches!(b.scope, BangScope::User(_)));

        let mut table = HashMap::new();
        for bang in global.into_iter().chain(user) {
            table.insert(bang.trigger.to_lowercase(), bang);
        }

        Self { bangs: table }
    }

    pub fn len(&self) -> usize {
        self.bangs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bangs.is_empty()
    }

    /// Look up a trigger (without `!`)
    pub fn get(&self, trigger: &str) -> Option<&Bang> {
        self.bangs.get(&trigger.to_lowercase())
    }

    /// Detect a leading bang and build its redirect
    pub fn resolve(&self, query: &str) -> BangResolution {
        let Some(caps) = BANG_RE.captures(query.trim_start()) else {
            return BangResolution::NoMatch;
        };

        let token = &caps[1];
        let Some(bang) = self.get(token) else {
            debug!(token, "unknown bang, searching literally");
            return BangResolution::NoMatch;
        };

        let remainder = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        let url = expand_template(&bang.url_template, remainder);
        debug!(trigger = %bang.trigger, %url, "bang resolved");

        BangResolution::Redirect(RedirectDirective {
            url,
            provider: bang.provider.clone(),
            trigger: bang.trigger.clone(),
        })
    }
}

/// Substitute the percent-encoded query into every placeholder
fn expand_template(template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(query);
    PLACEHOLDERS
        .iter()
        .fold(template.to_string(), |url, placeholder| {
            url.replace(placeholder, &encoded)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::UserId;

    fn resolver() -> BangResolver {
        let alice = UserId::new("alice");
        BangResolver::new(vec![
            Bang::global("g", "google", "https://provider/search?q={}").unwrap(),
            Bang::global("w", "wikipedia", "https://en.wikipedia.org/w/index.php?search={query}")
                .unwrap(),
            Bang::for_user(&alice, "W", "wiktionary", "https://en.wiktionary.org/?search={}")
                .unwrap(),
        ])
    }

    fn redirect_url(resolution: BangResolution) -> String {
        match resolution {
            BangResolution::Redirect(directive) => directive.url,
            BangResolution::NoMatch => panic!("expected a redirect"),
        }
    }

    #[test]
    fn test_bang_redirect_encodes_remainder() {
        let url = redirect_url(resolver().resolve("!g foo bar"));
        assert_eq!(url, "https://provider/search?q=foo%20bar");
    }

    #[test]
    fn test_bang_is_case_insensitive() {
        let url = redirect_url(resolver().resolve("!G rust"));
        assert_eq!(url, "https://provider/search?q=rust");
    }

    #[test]
    fn test_special_characters_are_encoded() {
        let url = redirect_url(resolver().resolve("!g c++ & rust?"));
        assert_eq!(url, "https://provider/search?q=c%2B%2B%20%26%20rust%3F");
    }

    #[test]
    fn test_user_bang_wins_collision() {
        let resolution = resolver().resolve("!w serendipity");
        match resolution {
            BangResolution::Redirect(directive) => {
                assert_eq!(directive.provider, "wiktionary");
                assert_eq!(directive.url, "https://en.wiktionary.org/?search=serendipity");
            }
            BangResolution::NoMatch => panic!("expected a redirect"),
        }
    }

    #[test]
    fn test_bare_bang_resolves_with_empty_query() {
        let url = redirect_url(resolver().resolve("!g"));
        assert_eq!(url, "https://provider/search?q=");
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let url = redirect_url(resolver().resolve("  !g   spaced out  "));
        assert_eq!(url, "https://provider/search?q=spaced%20out");
    }

    #[test]
    fn test_no_match_cases() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("plain query"), BangResolution::NoMatch);
        assert_eq!(resolver.resolve("!unknown query"), BangResolution::NoMatch);
        assert_eq!(resolver.resolve("!"), BangResolution::NoMatch);
        assert_eq!(resolver.resolve("! g foo"), BangResolution::NoMatch);
        assert_eq!(resolver.resolve("foo !g bar"), BangResolution::NoMatch);
        assert_eq!(resolver.resolve("!gfoo bar"), BangResolution::NoMatch);
    }

    #[test]
    fn test_empty_resolver() {
        let resolver = BangResolver::default();
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve("!g foo"), BangResolution::NoMatch);
    }
}
