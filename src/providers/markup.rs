//! HTML result page handling shared by all scraping providers

use super::redirect::{clean_href, RedirectWrapper};
use crate::error::ProviderError;
use crate::results::SearchResult;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Result page layout generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupFormat {
    Modern,
    Legacy,
}

/// Configured format: detect per page or force one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSelector {
    #[default]
    Auto,
    Modern,
    Legacy,
}

impl FormatSelector {
    pub fn forced(self) -> Option<MarkupFormat> {
        match self {
            Self::Auto => None,
            Self::Modern => Some(MarkupFormat::Modern),
            Self::Legacy => Some(MarkupFormat::Legacy),
        }
    }
}

/// One result block as found on the page, before cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub href: String,
    /// Display URL text, if the page shows one
    pub display: Option<String>,
    pub snippet: Option<String>,
    pub is_ad: bool,
}

/// Per-provider knowledge of the page layout
pub trait MarkupExtractor {
    /// Whether the page carries the structural marker of `format`
    fn has_layout(&self, document: &Html, format: MarkupFormat) -> bool;

    /// Which layout the page uses, if any is recognized
    fn detect(&self, document: &Html) -> Option<MarkupFormat> {
        [MarkupFormat::Modern, MarkupFormat::Legacy]
            .into_iter()
            .find(|format| self.has_layout(document, *format))
    }

    /// Whether the page is an explicit "no results" page
    fn is_empty_page(&self, document: &Html) -> bool;

    /// Every result block in page order, advertisements included and flagged
    fn extract(&self, document: &Html, format: MarkupFormat) -> Vec<RawEntry>;
}

/// Inputs to [`parse_markup`] that come from the provider instance
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub provider: &'a str,
    /// Page the markup was fetched from
    pub base: &'a Url,
    pub wrappers: &'a [RedirectWrapper],
    pub format: FormatSelector,
}

/// Turn a result page into ranked, cleaned organic results.
///
/// Unrecognized pages are a parse error unless they carry the provider's
/// no-results marker. A forced format must still find its own marker.
pub fn parse_markup<E>(
    extractor: &E,
    ctx: ParseContext<'_>,
    body: &str,
) -> Result<Vec<SearchResult>, ProviderError>
where
    E: MarkupExtractor + ?Sized,
{
    let document = Html::parse_document(body);

    let recognized = match ctx.format.forced() {
        Some(forced) => Some(forced).filter(|f| extractor.has_layout(&document, *f)),
        None => extractor.detect(&document),
    };

    let format = match recognized {
        Some(format) => format,
        None if extractor.is_empty_page(&document) => {
            debug!(provider = ctx.provider, "no results page");
            return Ok(Vec::new());
        }
        None => {
            return Err(ProviderError::parse(format!(
                "{}: unrecognized result page layout",
                ctx.provider
            )))
        }
    };

    let entries = extractor.extract(&document, format);
    let total = entries.len();
    let own_host = ctx.base.host_str().map(str::to_ascii_lowercase);

    let results: Vec<SearchResult> = entries
        .into_iter()
        .filter(|e| !e.is_ad && !e.title.is_empty() && !e.href.is_empty())
        .filter_map(|entry| {
            let cleaned = clean_href(&entry.href, ctx.base, ctx.wrappers);
            let url = cleaned.url;
            let parsed = Url::parse(&url).ok()?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return None;
            }
            let host = parsed.host_str()?.to_ascii_lowercase();
            // A wrapper that failed to decode is kept as its own target
            if !cleaned.wrapped && own_host.as_deref() == Some(host.as_str()) {
                return None;
            }

            let display = entry.display.filter(|d| !d.is_empty()).unwrap_or(host);
            let mut result = SearchResult::new(url, entry.title, ctx.provider).with_display_url(display);
            if let Some(snippet) = entry.snippet.filter(|s| !s.is_empty()) {
                result = result.with_snippet(snippet);
            }
            Some(result)
        })
        .enumerate()
        .map(|(rank, result)| result.with_rank(rank))
        .collect();

    debug!(
        provider = ctx.provider,
        ?format,
        blocks = total,
        kept = results.len(),
        "parsed result page"
    );
    Ok(results)
}

/// Layout where each result is a block holding one title link
pub(crate) struct BlockLayout {
    block: Selector,
    link: Selector,
    snippet: Selector,
    display: Selector,
}

impl BlockLayout {
    pub(crate) fn new(block: &str, link: &str, snippet: &str, display: &str) -> Self {
        Self {
            block: selector(block),
            link: selector(link),
            snippet: selector(snippet),
            display: selector(display),
        }
    }

    pub(crate) fn is_present(&self, document: &Html) -> bool {
        document.select(&self.block).next().is_some()
    }

    /// Blocks without a title link are skipped; blocks inside `ad` are flagged
    pub(crate) fn extract(&self, document: &Html, ad: &Selector) -> Vec<RawEntry> {
        document
            .select(&self.block)
            .filter_map(|block| {
                let link = block.select(&self.link).next()?;
                Some(RawEntry {
                    title: element_text(link),
                    href: link.value().attr("href").unwrap_or_default().trim().to_string(),
                    display: first_text(block, &self.display),
                    snippet: first_text(block, &self.snippet),
                    is_ad: within(block, ad),
                })
            })
            .collect()
    }
}

/// Visible text with whitespace runs collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match below `element`
pub(crate) fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Whether `element` or one of its ancestors matches `selector`
pub(crate) fn within(element: ElementRef<'_>, selector: &Selector) -> bool {
    selector.matches(&element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| selector.matches(&ancestor))
}

/// Build a static selector; only used with literal selector strings
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ListPage;

    impl MarkupExtractor for ListPage {
        fn has_layout(&self, document: &Html, format: MarkupFormat) -> bool {
            let css = match format {
                MarkupFormat::Modern => "ul.modern",
                MarkupFormat::Legacy => "ul.legacy",
            };
            document.select(&selector(css)).next().is_some()
        }

        fn is_empty_page(&self, document: &Html) -> bool {
            document.select(&selector("p.nothing")).next().is_some()
        }

        fn extract(&self, document: &Html, format: MarkupFormat) -> Vec<RawEntry> {
            let css = match format {
                MarkupFormat::Modern => "ul.modern li a",
                MarkupFormat::Legacy => "ul.legacy li a",
            };
            document
                .select(&selector(css))
                .map(|a| RawEntry {
                    title: element_text(a),
                    href: a.value().attr("href").unwrap_or_default().to_string(),
                    is_ad: a.value().attr("data-ad").is_some(),
                    ..Default::default()
                })
                .collect()
        }
    }

    fn parse(body: &str, format: FormatSelector) -> Result<Vec<SearchResult>, ProviderError> {
        let base = Url::parse("https://search.test/results").unwrap();
        let ctx = ParseContext {
            provider: "list",
            base: &base,
            wrappers: &[],
            format,
        };
        parse_markup(&ListPage, ctx, body)
    }

    #[test]
    fn test_filters_and_ranks_entries() {
        let body = r#"<ul class="modern">
            <li><a href="https://a.org/">  A   title </a></li>
            <li><a href="https://ads.org/" data-ad>Ad</a></li>
            <li><a href="">No href</a></li>
            <li><a href="javascript:void(0)">Script</a></li>
            <li><a href="/settings">Own page</a></li>
            <li><a href="https://b.org/x"></a></li>
            <li><a href="https://c.org/">C</a></li>
        </ul>"#;

        let results = parse(body, FormatSelector::Auto).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A title");
        assert_eq!(results[0].display_url, "a.org");
        assert_eq!(results[0].rank, 0);
        assert_eq!(results[1].url, "https://c.org/");
        assert_eq!(results[1].rank, 1);
        assert!(results.iter().all(|r| r.provider == "list" && !r.is_ad));
    }

    #[test]
    fn test_forced_format_skips_detection() {
        let body = r#"<ul class="modern"><li><a href="https://a.org/">A</a></li></ul>
            <ul class="legacy"><li><a href="https://l.org/">L</a></li></ul>"#;

        let auto = parse(body, FormatSelector::Auto).unwrap();
        assert_eq!(auto[0].url, "https://a.org/");

        let legacy = parse(body, FormatSelector::Legacy).unwrap();
        assert_eq!(legacy.len(), 1);
        assert_eq!(legacy[0].url, "https://l.org/");
    }

    #[test]
    fn test_forced_format_requires_its_marker() {
        let modern_only = r#"<ul class="modern"><li><a href="https://a.org/">A</a></li></ul>"#;
        let err = parse(modern_only, FormatSelector::Legacy).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));

        let blocked = "<html><body>Please verify you are human</body></html>";
        assert!(parse(blocked, FormatSelector::Modern).is_err());

        let nothing = r#"<p class="nothing">No results.</p>"#;
        assert!(parse(nothing, FormatSelector::Modern).unwrap().is_empty());
    }

    #[test]
    fn test_undecodable_wrapper_on_own_host_is_kept() {
        let wrappers = [RedirectWrapper {
            host: "search.test",
            path_prefix: "/go",
            param: "to",
            encoding: crate::providers::Embedding::Percent,
        }];
        let base = Url::parse("https://search.test/results").unwrap();
        let ctx = ParseContext {
            provider: "list",
            base: &base,
            wrappers: &wrappers,
            format: FormatSelector::Auto,
        };
        let body = r#"<ul class="modern">
            <li><a href="/go?id=7">Broken wrapper</a></li>
            <li><a href="/go?to=https%3A%2F%2Fb.org%2F">Good wrapper</a></li>
            <li><a href="/prefs">Own page</a></li>
        </ul>"#;

        let results = parse_markup(&ListPage, ctx, body).unwrap();
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://search.test/go?id=7", "https://b.org/"]);
    }

    #[test]
    fn test_unrecognized_page_is_parse_error() {
        let err = parse("<html><body><h1>Blocked</h1></body></html>", FormatSelector::Auto)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn test_no_results_page_is_empty() {
        let results = parse(r#"<p class="nothing">No results.</p>"#, FormatSelector::Auto).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_within_checks_ancestors() {
        let doc = Html::parse_fragment(r#"<div id="ads"><span><a href="/">x</a></span></div>"#);
        let link = doc.select(&selector("a")).next().unwrap();
        assert!(within(link, &selector("#ads")));
        assert!(!within(link, &selector(".organic")));
    }
}
