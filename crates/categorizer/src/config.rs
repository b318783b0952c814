use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
const DEFAULT_REFERER: &str = "http://localhost:3000";

/// Fixed application title sent as the `X-Title` attribution header.
pub const APP_TITLE: &str = "ExpenseTracker AI";

/// API key variables, in precedence order. First non-empty wins.
const API_KEY_VARS: &[&str] = &["OPENROUTER_API_KEY", "OPENAI_API_KEY"];

/// Endpoint configuration for the categorizer.
///
/// Passed in explicitly at construction time so tests can point the
/// categorizer at a fake endpoint; [`CategorizerConfig::from_env`] covers the
/// production path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizerConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Sent as the `HTTP-Referer` attribution header.
    pub referer: String,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        CategorizerConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

impl CategorizerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        CategorizerConfig {
            api_key: api_key.into(),
            ..CategorizerConfig::default()
        }
    }

    /// Build configuration from the process environment.
    ///
    /// The API key comes from `OPENROUTER_API_KEY`, falling back to
    /// `OPENAI_API_KEY`; `APP_PUBLIC_URL` overrides the referer header.
    pub fn from_env() -> Self {
        let mut config = CategorizerConfig::default();
        if let Some(api_key) = first_non_empty_env(API_KEY_VARS) {
            config.api_key = api_key;
        }
        if let Ok(url) = std::env::var("APP_PUBLIC_URL") {
            if !url.trim().is_empty() {
                config.referer = url;
            }
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }
}

fn first_non_empty_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    })
}
