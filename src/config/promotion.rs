//! Promotion run configuration and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DEFAULT_RANK, MAX_RANK_LENGTH};

/// Offset Telegram adds to channel ids in the Bot API "marked" form.
const MARKED_CHANNEL_OFFSET: i64 = 1_000_000_000_000;

/// Errors that can occur during promotion config validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Bot token at index {index} is empty")]
    EmptyToken { index: usize },

    #[error("Bot token at index {index} ({masked}) is malformed (expected <bot id>:<secret>)")]
    MalformedToken { index: usize, masked: String },

    #[error("Bot token at index {index} ({masked}) is listed more than once")]
    DuplicateToken { index: usize, masked: String },

    #[error("Channel id must not be zero")]
    MissingChannelId,

    #[error("Channel id {0} is out of range")]
    ChannelIdOutOfRange(i64),

    #[error("Admin title is empty")]
    EmptyRank,

    #[error("Admin title exceeds maximum length: {length} > {max_length}")]
    RankTooLong { length: usize, max_length: usize },

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Everything one promotion run needs besides the account credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Target channel or supergroup, bare or in the `-100...` marked form.
    pub channel_id: i64,

    /// Tokens of the bots to promote, processed in order.
    pub bot_tokens: Vec<String>,

    /// Custom admin title given to every promoted bot.
    #[serde(default = "default_rank")]
    pub rank: String,

    /// Pause between consecutive bots, in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// Timeout for each `getMe` lookup, in seconds.
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_rank() -> String {
    DEFAULT_RANK.to_owned()
}

fn default_delay_secs() -> u64 {
    3 // stays under the editAdmin flood threshold
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_owned()
}

impl PromotionConfig {
    /// Creates a config with default pacing and title.
    #[must_use]
    pub fn new(channel_id: i64, bot_tokens: Vec<String>) -> Self {
        Self {
            channel_id,
            bot_tokens,
            rank: default_rank(),
            delay_secs: default_delay_secs(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
            api_base_url: default_api_base_url(),
        }
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checks the channel id and admin title.
    ///
    /// Token problems are not checked here: a bad token only fails its own
    /// promotion, see [`Self::token_problems`].
    ///
    /// # Errors
    ///
    /// Returns the first problem with the target channel or title.
    pub fn validate_target(&self) -> Result<(), ValidationError> {
        if self.channel_id == 0 {
            return Err(ValidationError::MissingChannelId);
        }
        if self.bare_channel_id().is_none() {
            return Err(ValidationError::ChannelIdOutOfRange(self.channel_id));
        }

        let length = self.rank.chars().count();
        if length == 0 {
            return Err(ValidationError::EmptyRank);
        }
        if length > MAX_RANK_LENGTH {
            return Err(ValidationError::RankTooLong {
                length,
                max_length: MAX_RANK_LENGTH,
            });
        }

        Ok(())
    }

    /// Returns one validation result per configured token.
    #[must_use]
    pub fn validate_all(&self) -> Vec<Result<(), ValidationError>> {
        let mut seen = std::collections::HashSet::new();

        self.bot_tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                if token.is_empty() {
                    return Err(ValidationError::EmptyToken { index });
                }
                if !is_well_formed_token(token) {
                    return Err(ValidationError::MalformedToken {
                        index,
                        masked: mask_token(token),
                    });
                }
                if !seen.insert(token) {
                    return Err(ValidationError::DuplicateToken {
                        index,
                        masked: mask_token(token),
                    });
                }
                Ok(())
            })
            .collect()
    }

    /// Returns the validation errors of all tokens that have one.
    #[must_use]
    pub fn token_problems(&self) -> Vec<ValidationError> {
        self.validate_all()
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    /// Returns the channel id as MTProto knows it (without the `-100` prefix).
    #[must_use]
    pub fn bare_channel_id(&self) -> Option<i64> {
        bare_channel_id(self.channel_id)
    }

    /// Pause between consecutive bots.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Timeout for each `getMe` lookup.
    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Returns the number of configured tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bot_tokens.len()
    }

    /// Checks if there are no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bot_tokens.is_empty()
    }

    /// Creates an example configuration for users to reference.
    #[must_use]
    pub fn example() -> Self {
        Self::new(
            -1_001_234_567_890,
            vec![
                "1234567890:AAExampleTokenForTheFirstBot000000000".to_owned(),
                "2345678901:AAExampleTokenForTheSecondBot00000000".to_owned(),
            ],
        )
    }
}

/// Converts a Bot API marked channel id (`-100xxxxxxxxxx`) into the bare id.
///
/// Returns `None` for ids that have no bare form (`i64::MIN`).
#[must_use]
pub fn bare_channel_id(id: i64) -> Option<i64> {
    if id <= -MARKED_CHANNEL_OFFSET {
        id.checked_neg()?.checked_sub(MARKED_CHANNEL_OFFSET)
    } else {
        id.checked_abs()
    }
}

/// Checks the `<bot id>:<secret>` shape of a bot token.
fn is_well_formed_token(token: &str) -> bool {
    match token.split_once(':') {
        Some((id, secret)) => {
            !id.is_empty()
                && id.chars().all(|c| c.is_ascii_digit())
                && !secret.is_empty()
                && secret
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

/// Masks a bot token for logging (keeps only the bot id).
#[must_use]
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) if !id.is_empty() => format!("{id}:***"),
        _ => "***".to_owned(),
    }
}
