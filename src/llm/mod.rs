//! Language model client, retry wrapper, and prompt helpers.

pub mod client;
pub mod json;
pub mod prompt;
pub mod retry;

pub use client::{GroqClient, LanguageModel};
pub use json::extract_json_object;
pub use retry::{RetryingModel, retry_with_backoff};
