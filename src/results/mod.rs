//! Search results module
//!
//! Normalized result types, merging/deduplication, and per-user reranking.

pub mod merge;
pub mod rerank;
mod types;

pub use merge::{dedup_key, merge};
pub use rerank::Reranker;
pub use types::*;
