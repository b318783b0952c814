//! Batch expense categorization over a hosted completion model.

use std::sync::Arc;

use log::error;
use serde_json::Value;

use crate::category::Category;
use crate::client::CompletionClient;
use crate::config::CategorizerConfig;
use crate::error::{CategorizeError, Result};
use crate::fallback::fallback_category;
use crate::protocol::{ChatCompletionRequest, ChatMessage};
use crate::retry::{with_retry, RetryPolicy, Sleep, TokioSleep};

const SYSTEM_PROMPT: &str =
    "You are an expense categorization AI. Always respond with only a JSON array of valid categories.";

// Low temperature biases the model toward deterministic output.
const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 200;

/// Categorizes batches of expense descriptions.
///
/// One remote call per batch; rate limits are retried with backoff, every
/// other failure degrades to the keyword fallback. [`Self::categorize`] never
/// surfaces an error to the caller.
pub struct ExpenseCategorizer {
    client: CompletionClient,
    policy: RetryPolicy,
    sleep: Arc<dyn Sleep>,
}

impl ExpenseCategorizer {
    pub fn new(config: CategorizerConfig) -> Self {
        Self::with_sleep(config, Arc::new(TokioSleep))
    }

    /// Construct with configuration read from the process environment.
    pub fn from_env() -> Self {
        Self::new(CategorizerConfig::from_env())
    }

    /// Construct with a custom backoff sleeper. Tests use this to assert the
    /// retry schedule without waiting it out.
    pub fn with_sleep(config: CategorizerConfig, sleep: Arc<dyn Sleep>) -> Self {
        ExpenseCategorizer {
            client: CompletionClient::new(config),
            policy: RetryPolicy::default(),
            sleep,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Categorize a batch of descriptions in one remote call.
    ///
    /// The output is positionally aligned with the input and contains only
    /// valid [`Category`] values. An empty batch returns immediately without
    /// touching the network.
    pub async fn categorize(&self, descriptions: &[String]) -> Vec<Category> {
        if descriptions.is_empty() {
            return Vec::new();
        }

        match self.categorize_remote(descriptions).await {
            Ok(categories) => categories,
            Err(err) => {
                error!("categorization request failed, using keyword fallback: {err}");
                descriptions
                    .iter()
                    .map(|description| fallback_category(description))
                    .collect()
            }
        }
    }

    async fn categorize_remote(&self, descriptions: &[String]) -> Result<Vec<Category>> {
        let request = ChatCompletionRequest {
            model: self.client.config().model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(descriptions)),
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        };

        let reply = with_retry(self.policy, self.sleep.as_ref(), || {
            self.client.complete(&request)
        })
        .await?;

        let parsed: Value = serde_json::from_str(strip_code_fences(&reply))?;
        let Value::Array(labels) = parsed else {
            return Err(CategorizeError::NotAnArray);
        };

        // Positional reconciliation: a valid label at position i passes
        // through, anything else falls back on that position's description.
        Ok(descriptions
            .iter()
            .enumerate()
            .map(|(i, description)| {
                labels
                    .get(i)
                    .and_then(Value::as_str)
                    .and_then(|label| label.trim().parse::<Category>().ok())
                    .unwrap_or_else(|| fallback_category(description))
            })
            .collect())
    }
}

/// Enumerate the category names and the 1-indexed descriptions for the model.
fn build_prompt(descriptions: &[String]) -> String {
    let categories = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let expenses = descriptions
        .iter()
        .enumerate()
        .map(|(i, description)| format!("{}. {}", i + 1, description))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Categorize each of the following expenses into one of these categories:\n\
         {categories}.\n\n\
         Expenses:\n\
         {expenses}\n\n\
         Return only a JSON array of categories in the same order, e.g. [\"Food\", \"Bills\", \"Other\"]."
    )
}

/// Drop a surrounding ```json / ``` fence if the model added one.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.strip_suffix("```").unwrap_or(rest))
        .unwrap_or(trimmed);
    body.trim()
}
