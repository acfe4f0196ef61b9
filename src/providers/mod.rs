//! Search provider module
//!
//! Defines the Provider trait, the HTML layout handling shared by the
//! scraping providers, and the ordered registry built from settings.

mod loader;
mod markup;
mod redirect;
mod registry;
mod traits;

// Provider implementations
pub mod bing;
pub mod duckduckgo;
pub mod google;

pub use bing::Bing;
pub use duckduckgo::DuckDuckGo;
pub use google::Google;
pub use loader::ProviderLoader;
pub use markup::{parse_markup, FormatSelector, MarkupExtractor, MarkupFormat, ParseContext, RawEntry};
pub use redirect::{clean_href, clean_url, CleanedUrl, Embedding, RedirectWrapper};
pub use registry::ProviderRegistry;
pub use traits::*;
