//! Telegram Bot API access.
//!
//! Only used to find out which username a bot token belongs to.

mod resolver;

pub use resolver::{BotDirectory, BotResolver, LookupError};

#[cfg(test)]
pub use resolver::MockBotDirectory;
