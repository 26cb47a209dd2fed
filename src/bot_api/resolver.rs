//! `getMe` lookups against the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{PromotionConfig, mask_token};

/// Why a bot's username could not be determined.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Bot API returned HTTP {status}{}", detail(.description))]
    Status {
        status: u16,
        description: Option<String>,
    },

    #[error("Malformed getMe response: {0}")]
    Malformed(String),
}

fn detail(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Something that can tell which username belongs to a bot token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BotDirectory: Send + Sync {
    /// Returns the public username of the bot owning `token`.
    async fn username(&self, token: &str) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct GetMeResponse {
    result: Option<BotUser>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    description: Option<String>,
}

/// Bot API client used to resolve bot usernames.
#[derive(Debug, Clone)]
pub struct BotResolver {
    http: Client,
    base_url: String,
}

impl BotResolver {
    /// Creates a resolver with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Creates a resolver from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &PromotionConfig) -> Result<Self, LookupError> {
        Self::new(config.api_base_url.clone(), config.lookup_timeout())
    }

    fn get_me_url(&self, token: &str) -> String {
        format!("{}/bot{token}/getMe", self.base_url)
    }
}

#[async_trait]
impl BotDirectory for BotResolver {
    async fn username(&self, token: &str) -> Result<String, LookupError> {
        debug!("Looking up bot {}", mask_token(token));

        let response = self
            .http
            .get(self.get_me_url(token.trim()))
            .send()
            .await
            .map_err(|e| LookupError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.without_url().to_string()))?;

        parse_get_me(status, &body)
    }
}

/// Extracts the username from a `getMe` response.
fn parse_get_me(status: StatusCode, body: &str) -> Result<String, LookupError> {
    if status != StatusCode::OK {
        let description = serde_json::from_str::<ApiErrorBody>(body)
            .unwrap_or_default()
            .description;
        return Err(LookupError::Status {
            status: status.as_u16(),
            description,
        });
    }

    let parsed: GetMeResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    parsed
        .result
        .and_then(|user| user.username)
        .filter(|username| !username.is_empty())
        .ok_or_else(|| LookupError::Malformed("missing result.username".to_owned()))
}
