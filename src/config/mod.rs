//! Configuration module for the bot promoter.
//!
//! Handles loading and validation of the promotion run configuration
//! and the Telegram API credentials.

mod promotion;
mod settings;

pub use promotion::{PromotionConfig, ValidationError, bare_channel_id, mask_token};
pub use settings::{ConfigError, TelegramConfig};

/// Admin title given to promoted bots unless configured otherwise.
pub const DEFAULT_RANK: &str = "Bot Admin";

/// Maximum length of a custom admin title.
pub const MAX_RANK_LENGTH: usize = 16;
