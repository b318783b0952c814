//! Batch expense categorization backed by an OpenAI-compatible completion
//! endpoint, degrading to a local keyword classifier whenever the hosted
//! model is unavailable or returns unusable output.

pub mod category;
pub mod categorizer;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod protocol;
pub mod retry;

pub use category::{Category, UnknownCategory};
pub use categorizer::ExpenseCategorizer;
pub use client::CompletionClient;
pub use config::CategorizerConfig;
pub use error::{CategorizeError, Result};
pub use fallback::fallback_category;
pub use retry::{RetryPolicy, Sleep, TokioSleep};
