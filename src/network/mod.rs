//! HTTP networking module
//!
//! Provides the HTTP client providers fetch their result pages with.

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::{accept_language, generate_user_agent};
