//! Bot Promoter Library
//!
//! Promotes Telegram bots to channel administrators using a user session.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the promotion configuration
//! - Resolving bot usernames through the Bot API
//! - Connecting to Telegram via `MTProto` and resolving entities
//! - Granting the admin rights bundle and tallying the outcomes

pub mod bot_api;
pub mod config;
pub mod promoter;
pub mod telegram;
