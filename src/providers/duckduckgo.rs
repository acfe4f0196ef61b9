//! DuckDuckGo provider
//!
//! Posts to the HTML-only endpoint. Organic links are wrapped in
//! `/l/?uddg=<percent-encoded target>&rut=…`.

use super::markup::{parse_markup, selector, BlockLayout, MarkupExtractor, MarkupFormat, ParseContext, RawEntry};
use super::redirect::{Embedding, RedirectWrapper};
use super::traits::*;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::network::accept_language;
use crate::query::Query;
use crate::results::SearchResult;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;

const ENDPOINT: &str = "https://html.duckduckgo.com/html/";

const WRAPPERS: &[RedirectWrapper] = &[RedirectWrapper {
    host: "duckduckgo.com",
    path_prefix: "/l/",
    param: "uddg",
    encoding: Embedding::Percent,
}];

static MODERN: Lazy<BlockLayout> = Lazy::new(|| {
    BlockLayout::new(
        "article[data-testid]",
        "h2 a[href]",
        "[data-result=\"snippet\"]",
        "[data-testid=\"result-extras-url-link\"]",
    )
});

static LEGACY: Lazy<BlockLayout> = Lazy::new(|| {
    BlockLayout::new("div.result", "a.result__a", ".result__snippet", ".result__url")
});

static AD: Lazy<Selector> = Lazy::new(|| selector("article[data-testid=\"ad\"], .result--ad, .result--ad--small"));
static NO_RESULTS: Lazy<Selector> = Lazy::new(|| selector(".no-results, [data-testid=\"no-results\"]"));

/// DuckDuckGo web search
pub struct DuckDuckGo {
    settings: ScraperSettings,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self {
            settings: ScraperSettings::new("duckduckgo", ENDPOINT),
        }
    }

    /// `kl` region code: `de-CH` becomes `ch-de`, no region means worldwide
    fn region(query: &Query) -> String {
        let locale = query.locale.as_deref().unwrap_or_default().replace('_', "-");
        match locale.split_once('-') {
            Some((lang, region)) if !lang.is_empty() && !region.is_empty() => {
                format!("{}-{}", region.to_lowercase(), lang.to_lowercase())
            }
            _ => "wt-wt".to_string(),
        }
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupExtractor for DuckDuckGo {
    fn has_layout(&self, document: &Html, format: MarkupFormat) -> bool {
        match format {
            MarkupFormat::Modern => MODERN.is_present(document),
            MarkupFormat::Legacy => LEGACY.is_present(document),
        }
    }

    fn is_empty_page(&self, document: &Html) -> bool {
        document.select(&NO_RESULTS).next().is_some()
    }

    fn extract(&self, document: &Html, format: MarkupFormat) -> Vec<RawEntry> {
        match format {
            MarkupFormat::Modern => MODERN.extract(document, &AD),
            MarkupFormat::Legacy => LEGACY.extract(document, &AD),
        }
    }
}

impl Provider for DuckDuckGo {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest, ProviderError> {
        Ok(ProviderRequest::post(&self.settings.endpoint)
            .form_field("q", &query.text)
            .form_field("b", "")
            .form_field("kl", Self::region(query))
            .header("Accept-Language", accept_language(query.locale_or("en"))))
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
