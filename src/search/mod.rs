//! Search orchestration module
//!
//! Resolves bangs, fans queries out to providers under a shared deadline,
//! and applies per-user reranking to the merged results.

mod dispatcher;
mod executor;
mod models;

pub use dispatcher::Dispatcher;
pub use executor::Search;
pub use models::*;
