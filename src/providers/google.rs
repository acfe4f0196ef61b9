//! Google provider
//!
//! Current pages mark result containers with `data-ved` and put the title
//! in an `h3` inside the link. Older pages use `div.g` with `h3.r a`.
//! Links may go through `/url?q=<target>&sa=…`.

use super::markup::{
    element_text, first_text, parse_markup, selector, within, BlockLayout, MarkupExtractor, MarkupFormat,
    ParseContext, RawEntry,
};
use super::redirect::{Embedding, RedirectWrapper};
use super::traits::*;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::network::accept_language;
use crate::query::Query;
use crate::results::SearchResult;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const ENDPOINT: &str = "https://www.google.com/search";

const WRAPPERS: &[RedirectWrapper] = &[RedirectWrapper {
    host: "google.com",
    path_prefix: "/url",
    param: "q",
    encoding: Embedding::Percent,
}];

static MODERN_MARKER: Lazy<Selector> = Lazy::new(|| selector("div[data-ved] a h3"));
static MODERN_LINK: Lazy<Selector> = Lazy::new(|| selector("div[data-ved] a[href]"));
static CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div[data-ved], div.g"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h3"));
static LINKED_TITLE: Lazy<Selector> = Lazy::new(|| selector("a h3"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| selector(".VwiC3b, [data-sncf], .st"));
static CITE: Lazy<Selector> = Lazy::new(|| selector("cite"));

static LEGACY: Lazy<BlockLayout> = Lazy::new(|| BlockLayout::new("div.g", "h3.r a", ".st", "cite"));

static AD: Lazy<Selector> = Lazy::new(|| selector("[data-text-ad], #tads, .ads-ad"));
static NO_RESULTS: Lazy<Selector> = Lazy::new(|| selector("#topstuff .card-section, .mnr-c"));

/// Google web search
pub struct Google {
    settings: ScraperSettings,
}

impl Google {
    pub fn new() -> Self {
        Self {
            settings: ScraperSettings::new("google", ENDPOINT),
        }
    }

    /// One entry per title link inside a `data-ved` container
    fn extract_modern(document: &Html) -> Vec<RawEntry> {
        document
            .select(&MODERN_LINK)
            .filter_map(|link| {
                let title = link.select(&TITLE).next().map(element_text)?;
                let container = result_container(link);
                Some(RawEntry {
                    title,
                    href: link.value().attr("href").unwrap_or_default().trim().to_string(),
                    display: container.and_then(|c| first_text(c, &CITE)),
                    snippet: container.and_then(|c| first_text(c, &SNIPPET)),
                    is_ad: within(link, &AD),
                })
            })
            .collect()
    }
}

/// Outermost container around `link` that still holds a single result
fn result_container(link: ElementRef<'_>) -> Option<ElementRef<'_>> {
    link.ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|a| CONTAINER.matches(a))
        .take_while(|a| a.select(&LINKED_TITLE).count() <= 1)
        .last()
}

impl Default for Google {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupExtractor for Google {
    fn has_layout(&self, document: &Html, format: MarkupFormat) -> bool {
        match format {
            MarkupFormat::Modern => document.select(&MODERN_MARKER).next().is_some(),
            MarkupFormat::Legacy => LEGACY.is_present(document),
        }
    }

    fn is_empty_page(&self, document: &Html) -> bool {
        document.select(&NO_RESULTS).next().is_some()
    }

    fn extract(&self, document: &Html, format: MarkupFormat) -> Vec<RawEntry> {
        match format {
            MarkupFormat::Modern => Self::extract_modern(document),
            MarkupFormat::Legacy => LEGACY.extract(document, &AD),
        }
    }
}

impl Provider for Google {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest, ProviderError> {
        Ok(ProviderRequest::get(&self.settings.endpoint)
            .param("q", &query.text)
            .param("hl", query.language().unwrap_or("en"))
            .param("num", "10")
            .header("Accept-Language", accept_language(query.locale_or("en")))
            .cookie("CONSENT", "YES+"))
    }

    fn parse(&self, raw: &RawProviderResponse) -> Result<Vec<SearchResult>, ProviderError> {
        let base = self.settings.page_url(raw)?;
        let ctx = ParseContext {
            provider: self.name(),
            base: &base,
            wrappers: WRAPPERS,
            format: self.settings.format,
        };
        parse_markup(self, ctx, &raw.body)
    }

    fn init(&mut self, config: &ProviderConfig) -> anyhow::Result<()> {
        self.settings.apply(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::UserId;

    const MODERN_PAGE: &str = r#"<!DOCTYPE html>
<html><body><div id="search">
<div id="tads"><div data-text-ad="1"><div data-ved="ad1">
  <a href="https://www.googleadservices.com/pagead/aclk?sa=L"><h3>Rust Jobs - Hiring Now</h3></a>
</div></div></div>
<div id="rso">
  <div class="g"><div data-ved="r1"><div data-ved="r1-link">
    <a href="https://www.rust-lang.org/"><h3>Rust Programming Language</h3><cite>https://www.rust-lang.org</cite></a>
  </div><div class="VwiC3b">A language empowering everyone.</div></div></div>
  <div class="g"><div data-ved="r2">
    <a href="/url?q=https://doc.rust-lang.org/book/&amp;sa=U&amp;ved=abc"><h3>The Rust Book</h3></a>
    <div data-sncf="1">Learn Rust.</div>
  </div></div>
  <div class="g"><div data-ved="r3">
    <a href="https://crates.io/"><h3>crates.io</h3></a>
  </div></div>
  <div data-ved="nav"><a href="/search?q=rust&amp;start=10">Next</a></div>
</div>
</div></body></html>"#;

    const LEGACY_PAGE: &str = r#"<html><body>
<div id="ires"><ol>
  <div class="g ads-ad"><h3 class="r"><a href="/aclk?sa=l&amp;adurl=https://ads.example/">Sponsored</a></h3></div>
  <div class="g"><h3 class="r"><a href="/url?q=https%3A%2F%2Fwww.rust-lang.org%2F&amp;sa=U">Rust</a></h3><cite>www.rust-lang.org</cite><span class="st">Fast.</span></div>
  <div class="g"><h3 class="r"><a href="https://doc.rust-lang.org/book/">Book</a></h3></div>
  <div class="g"><h3 class="r"><a href="https://crates.io/">Crates</a></h3></div>
</ol></div>
</body></html>"#;

    fn raw(body: &str) -> RawProviderResponse {
        RawProviderResponse {
            provider: "google".to_string(),
            status: 200,
            body: body.to_string(),
            url: format!("{ENDPOINT}?q=rust"),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_google_request() {
        let query = Query::new("rust programming", UserId::anonymous()).with_locale("de-DE");
        let request = Google::new().request(&query).unwrap();

        assert!(request.url.contains("google.com"));
        assert!(request.params.contains(&("hl".to_string(), "de".to_string())));
        assert!(request.cookies.contains_key("CONSENT"));
    }

    #[test]
    fn test_modern_page() {
        let results = Google::new().parse(&raw(MODERN_PAGE)).unwrap();

        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://www.rust-lang.org/", "https://doc.rust-lang.org/book/", "https://crates.io/"]
        );
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].display_url, "https://www.rust-lang.org");
        assert_eq!(results[0].snippet.as_deref(), Some("A language empowering everyone."));
        assert_eq!(results[1].snippet.as_deref(), Some("Learn Rust."));
        assert_eq!(results[2].snippet, None);
    }

    #[test]
    fn test_legacy_page() {
        let results = Google::new().parse(&raw(LEGACY_PAGE)).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].display_url, "www.rust-lang.org");
        assert_eq!(results[0].snippet.as_deref(), Some("Fast."));
    }

    #[test]
    fn test_no_results_page() {
        let page = r#"<div id="topstuff"><div class="card-section"><p>Your search did not match any documents.</p></div></div>"#;
        assert!(Google::new().parse(&raw(page)).unwrap().is_empty());
    }
}
