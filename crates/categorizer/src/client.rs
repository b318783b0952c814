//! HTTP boundary to the OpenAI-compatible completion endpoint.

use log::{debug, error};
use reqwest::{Client, StatusCode};

use crate::config::{CategorizerConfig, APP_TITLE};
use crate::error::{CategorizeError, Result};
use crate::protocol::{ChatCompletionRequest, ChatCompletionResponse};

/// Wrapper over [`reqwest::Client`] that owns the endpoint configuration and
/// classifies responses into [`CategorizeError`] at this boundary, so callers
/// never inspect status codes or transport errors themselves.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    config: CategorizerConfig,
}

impl CompletionClient {
    pub fn new(config: CategorizerConfig) -> Self {
        CompletionClient {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    /// Send one chat completion request and return the trimmed message text.
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(
            "sending completion request to {} ({} messages)",
            url,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", APP_TITLE)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            return Err(CategorizeError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("completion request failed: HTTP {status}: {body}");
            return Err(CategorizeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        if content.is_empty() {
            return Err(CategorizeError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}
