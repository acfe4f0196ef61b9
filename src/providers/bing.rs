//! Bing provider

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

const ENDPOINT: &str = "https://www.bing.com/search";

/// Bing tracks clicks via `/ck/a?…&u=a1<base64url target>`
const WRAPPERS: &[RedirectWrapper] = &[RedirectWrapper {
    host: "bing.com",
    path_prefix: "/ck/a",
    param: "u",
    encoding: Embedding::Base64Prefixed,
}];

static MODERN: Lazy<BlockLayout> = Lazy::new(|| {
    BlockLayout::new(
        "ol#b_results > li.b_algo, ol#b_results > li.b_ad",
        "h2 a",
        ".b_caption p, p.b_lineclamp2, p.b_lineclamp3",
        "cite",
    )
});

static LEGACY: Lazy<BlockLayout> =
    Lazy::new(|| BlockLayout::new("#results li.sa_wr", "h3 a", "p", "cite"));

static AD: Lazy<Selector> = Lazy::new(|| selector("li.b_ad, .sb_add"));
static NO_RESULTS: Lazy<Selector> = Lazy::new(|| selector("li.b_no"));

/// Bing web search
pub struct Bing {
    settings: ScraperSettings,
}

impl Bing {
    pub fn new() -> Self {
        Self {
            settings: ScraperSettings::new("bing", ENDPOINT),
        }
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupExtractor for Bing {
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

impl Provider for Bing {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest, ProviderError> {
        let mut request = ProviderRequest::get(&self.settings.endpoint)
            .param("q", &query.text)
            .header("Accept-Language", accept_language(query.locale_or("en")));

        if let Some(lang) = query.language() {
            request = request.param("setlang", lang);
        }
        Ok(request)
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
