//! Telegram client wrapper module.
//!
//! Provides the authenticated user session, entity resolution and the
//! admin rights bundle used when promoting bots.

mod client;
mod entity;
mod rights;
mod session;

pub use client::{PwdToken as PasswordToken, TelegramError, TelegramSession, Token as LoginToken};
pub use entity::{ChannelEntity, UserEntity};
pub use rights::AdminRights;
pub use session::AdminSession;

#[cfg(test)]
pub use session::MockAdminSession;
