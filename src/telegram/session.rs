//! The session capabilities the promoter depends on.

use async_trait::async_trait;

use super::{AdminRights, ChannelEntity, TelegramError, UserEntity};

/// An authenticated user session able to manage channel admins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminSession: Send + Sync {
    /// Resolves a channel or supergroup by its bare id.
    async fn resolve_channel(&self, channel_id: i64) -> Result<ChannelEntity, TelegramError>;

    /// Resolves a user or bot by its public username.
    async fn resolve_user(&self, username: &str) -> Result<UserEntity, TelegramError>;

    /// Grants `rights` with the custom title `rank` to `user` in `channel`.
    async fn grant_admin(
        &self,
        channel: &ChannelEntity,
        user: &UserEntity,
        rights: &AdminRights,
        rank: &str,
    ) -> Result<(), TelegramError>;

    /// Tears the session down.
    fn disconnect(&self);
}
