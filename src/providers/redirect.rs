//! Unwrapping of provider click-tracking links
//!
//! Providers route organic links through their own redirect endpoints
//! (`/l/?uddg=`, `/ck/a?u=a1…`, `/url?q=`). The cleaner resolves an href
//! against the provider page and, when it is such a wrapper, returns the
//! embedded destination decoded exactly once.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use tracing::trace;
use url::Url;

/// How the destination is embedded in the wrapper parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embedding {
    /// Percent-encoded URL
    Percent,
    /// Two-character prefix followed by unpadded base64
    Base64Prefixed,
}

/// One provider redirect endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectWrapper {
    /// Registrable host of the provider. The endpoint also matches on the
    /// host the page was fetched from.
    pub host: &'static str,
    /// Path the endpoint lives under
    pub path_prefix: &'static str,
    /// Query parameter carrying the destination
    pub param: &'static str,
    pub encoding: Embedding,
}

impl RedirectWrapper {
    fn matches(&self, url: &Url, base: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let own_host = host == self.host
            || host.ends_with(&format!(".{}", self.host))
            || base.host_str().is_some_and(|b| b.eq_ignore_ascii_case(&host));

        own_host && url.path().starts_with(self.path_prefix)
    }

    /// Decode the destination, `None` if missing or malformed
    fn unwrap(&self, url: &Url) -> Option<String> {
        let raw = url.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == self.param).then_some(value)
        })?;
        if raw.is_empty() {
            return None;
        }

        let decoded = match self.encoding {
            Embedding::Percent => urlencoding::decode(raw).ok()?.into_owned(),
            Embedding::Base64Prefixed => decode_prefixed_base64(raw)?,
        };

        is_web_url(&decoded).then_some(decoded)
    }
}

fn decode_prefixed_base64(raw: &str) -> Option<String> {
    let payload = raw.get(2..)?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Outcome of cleaning one href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedUrl {
    pub url: String,
    /// The href pointed at a provider redirect endpoint
    pub wrapped: bool,
}

/// Resolve `href` against the provider page and strip any redirect wrapper.
///
/// Absolute non-wrapped hrefs come back unchanged; relative and
/// protocol-relative ones are made absolute. A wrapper whose parameter is
/// missing or does not decode to a web URL is returned as the absolute
/// wrapper URL.
pub fn clean_url(href: &str, base: &Url, wrappers: &[RedirectWrapper]) -> String {
    clean_href(href, base, wrappers).url
}

/// Like [`clean_url`], also reporting whether a wrapper matched
pub fn clean_href(href: &str, base: &Url, wrappers: &[RedirectWrapper]) -> CleanedUrl {
    let href = href.trim();
    let (resolved, was_absolute) = match Url::parse(href) {
        Ok(url) => (url, true),
        Err(_) => match base.join(href) {
            Ok(url) => (url, false),
            Err(_) => {
                return CleanedUrl {
                    url: href.to_string(),
                    wrapped: false,
                }
            }
        },
    };

    if let Some(wrapper) = wrappers.iter().find(|w| w.matches(&resolved, base)) {
        let url = match wrapper.unwrap(&resolved) {
            Some(target) => {
                trace!(wrapper = wrapper.path_prefix, %target, "unwrapped redirect");
                target
            }
            None => {
                trace!(href, "redirect wrapper without usable target");
                resolved.to_string()
            }
        };
        return CleanedUrl { url, wrapped: true };
    }

    let url = if was_absolute {
        href.to_string()
    } else {
        resolved.to_string()
    };
    CleanedUrl { url, wrapped: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDG: RedirectWrapper = RedirectWrapper {
        host: "duckduckgo.com",
        path_prefix: "/l/",
        param: "uddg",
        encoding: Embedding::Percent,
    };

    const BING: RedirectWrapper = RedirectWrapper {
        host: "bing.com",
        path_prefix: "/ck/a",
        param: "u",
        encoding: Embedding::Base64Prefixed,
    };

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_percent_wrapper_on_page_host() {
        let cleaned = clean_url(
            "https://x/l/?uddg=https%3A%2F%2Fexample.org%2Fpage&rut=abc123",
            &base("https://x/"),
            &[DDG],
        );
        assert_eq!(cleaned, "https://example.org/page");
    }

    #[test]
    fn test_protocol_relative_wrapper() {
        let cleaned = clean_url(
            "//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&rut=abc",
            &base("https://html.duckduckgo.com/html/"),
            &[DDG],
        );
        assert_eq!(cleaned, "https://www.rust-lang.org/");
    }

    #[test]
    fn test_relative_wrapper() {
        let cleaned = clean_url(
            "/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De&rut=1",
            &base("https://html.duckduckgo.com/html/"),
            &[DDG],
        );
        assert_eq!(cleaned, "https://example.com/a?b=c&d=e");
    }

    #[test]
    fn test_decodes_exactly_once() {
        // %2520 decodes to %20, which must survive
        let cleaned = clean_url(
            "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%2520b",
            &base("https://html.duckduckgo.com/html/"),
            &[DDG],
        );
        assert_eq!(cleaned, "https://example.com/a%20b");
    }

    #[test]
    fn test_base64_wrapper() {
        // a1 + base64url("https://example.com/page")
        let encoded = URL_SAFE_NO_PAD.encode("https://example.com/page");
        let href = format!("https://www.bing.com/ck/a?!&&p=abc&u=a1{encoded}&ntb=1");
        let cleaned = clean_url(&href, &base("https://www.bing.com/search"), &[BING]);
        assert_eq!(cleaned, "https://example.com/page");
    }

    #[test]
    fn test_malformed_wrapper_falls_back_to_wrapper() {
        let page = base("https://www.bing.com/search");
        let href = "https://www.bing.com/ck/a?u=a1%%%";
        assert_eq!(clean_url(href, &page, &[BING]), href);

        let missing = clean_href("/l/?rut=abc", &base("https://html.duckduckgo.com/"), &[DDG]);
        assert_eq!(missing.url, "https://html.duckduckgo.com/l/?rut=abc");
        assert!(missing.wrapped);
    }

    #[test]
    fn test_unwrapped_links_unchanged() {
        let page = base("https://html.duckduckgo.com/html/");
        assert_eq!(
            clean_url("https://doc.rust-lang.org/book/", &page, &[DDG]),
            "https://doc.rust-lang.org/book/"
        );
        // Same path on a foreign host is not a wrapper
        assert_eq!(
            clean_url("https://example.com/l/?uddg=https%3A%2F%2Fa.org", &page, &[DDG]),
            "https://example.com/l/?uddg=https%3A%2F%2Fa.org"
        );
        assert_eq!(clean_url("/about", &page, &[DDG]), "https://html.duckduckgo.com/about");
        assert!(!clean_href("/about", &page, &[DDG]).wrapped);
    }
}
