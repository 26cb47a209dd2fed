//! Telegram user session used to promote bots.

use std::sync::Arc;

use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::peer::Peer;
use grammers_client::{Client, InvocationError, SenderPool, SignInError, sender};
use grammers_session::storages::SqliteSession;
use grammers_tl_types as tl;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{AdminRights, AdminSession, ChannelEntity, UserEntity};
use crate::config::TelegramConfig;

/// Re-export types for external use.
pub use grammers_client::client::{LoginToken as Token, PasswordToken as PwdToken};

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Not authorized. Please sign in first.")]
    NotAuthorized,

    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Password required for 2FA")]
    PasswordRequired(PasswordToken),

    #[error("Invalid password")]
    InvalidPassword(PasswordToken),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Channel {0} not found among this account's dialogs")]
    ChannelNotFound(i64),

    #[error("Username @{0} did not resolve to a user")]
    UserNotFound(String),

    /// An RPC error returned by Telegram; `message` is the raw error text.
    #[error("{message}")]
    Rpc { name: String, code: i32, message: String },

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl TelegramError {
    /// Name of the Telegram RPC error (e.g. `FLOOD_WAIT`), if this is one.
    #[must_use]
    pub fn rpc_name(&self) -> Option<&str> {
        match self {
            Self::Rpc { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let message = err.to_string();

        match err {
            InvocationError::Rpc(rpc) => Self::Rpc {
                name: rpc.name,
                code: rpc.code,
                message,
            },
            _ => Self::Invocation(message),
        }
    }
}

/// Authenticated MTProto session bound to the operator's account.
pub struct TelegramSession {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl TelegramSession {
    /// Opens the session file and connects to Telegram.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be opened or the
    /// connection check fails.
    pub async fn connect(config: &TelegramConfig) -> Result<Self, TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates: _updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let connected = Self {
            client,
            handle: handle.thin,
            _pool_task: pool_task,
        };

        match connected.is_authorized().await {
            Ok(is_authorized) => {
                info!("Connected to Telegram. Authorized: {}", is_authorized);
                Ok(connected)
            }
            Err(e) => {
                connected.handle.quit();
                Err(e)
            }
        }
    }

    /// Checks if the client is authorized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Requests a login code to be sent to the phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn request_login_code(
        &self,
        phone: &str,
        api_hash: &str,
    ) -> Result<LoginToken, TelegramError> {
        info!("Requesting login code for phone: {}...", mask_phone(phone));

        self.client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| TelegramError::SignInFailed(e.to_string()))
    }

    /// Signs in with the login code.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::PasswordRequired`] when 2FA is enabled, or an
    /// error if sign in fails.
    pub async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<(), TelegramError> {
        info!("Signing in with login code...");

        match self.client.sign_in(token, code).await {
            Ok(_user) => Ok(()),
            Err(SignInError::PasswordRequired(password_token)) => {
                debug!("2FA password required, hint: {:?}", password_token.hint());
                Err(TelegramError::PasswordRequired(password_token))
            }
            Err(SignInError::InvalidCode) => {
                Err(TelegramError::SignInFailed("Invalid code".to_owned()))
            }
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    /// Checks the 2FA password.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is invalid.
    pub async fn check_password(
        &self,
        password_token: PasswordToken,
        password: &str,
    ) -> Result<(), TelegramError> {
        info!("Checking 2FA password...");

        match self.client.check_password(password_token, password).await {
            Ok(_user) => Ok(()),
            Err(SignInError::InvalidPassword(token)) => Err(TelegramError::InvalidPassword(token)),
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    async fn ensure_authorized(&self) -> Result<(), TelegramError> {
        if self.is_authorized().await? {
            Ok(())
        } else {
            Err(TelegramError::NotAuthorized)
        }
    }
}

#[async_trait]
impl AdminSession for TelegramSession {
    async fn resolve_channel(&self, channel_id: i64) -> Result<ChannelEntity, TelegramError> {
        self.ensure_authorized().await?;
        debug!("Resolving channel {} from dialogs", channel_id);

        let mut dialogs = self.client.iter_dialogs();
        let mut scanned = 0_usize;

        while let Some(dialog) = dialogs.next().await? {
            scanned += 1;

            let chat = match dialog.peer() {
                Peer::Channel(channel) => tl::enums::Chat::from(channel.raw.clone()),
                Peer::Group(group) => tl::enums::Chat::from(group.raw.clone()),
                _ => continue,
            };

            if let Some(channel) = ChannelEntity::from_chat(&chat, channel_id) {
                info!("Resolved channel \"{}\" after {} dialog(s)", channel.title, scanned);
                return Ok(channel);
            }
        }

        debug!("Channel {} not among {} dialog(s)", channel_id, scanned);
        Err(TelegramError::ChannelNotFound(channel_id))
    }

    async fn resolve_user(&self, username: &str) -> Result<UserEntity, TelegramError> {
        let username = username.trim_start_matches('@');
        debug!("Resolving @{}", username);

        match self.client.resolve_username(username).await? {
            Some(Peer::User(user)) => UserEntity::from_user(&tl::enums::User::from(user.raw))
                .ok_or_else(|| TelegramError::UserNotFound(username.to_owned())),
            _ => Err(TelegramError::UserNotFound(username.to_owned())),
        }
    }

    async fn grant_admin(
        &self,
        channel: &ChannelEntity,
        user: &UserEntity,
        rights: &AdminRights,
        rank: &str,
    ) -> Result<(), TelegramError> {
        debug!(
            "Granting {} admin rights to user {} in channel {}",
            rights.granted_count(),
            user.id,
            channel.id
        );

        let request = tl::functions::channels::EditAdmin {
            channel: channel.to_input_channel(),
            user_id: user.to_input_user(),
            admin_rights: rights.to_tl(),
            rank: rank.to_owned(),
        };

        self.client.invoke(&request).await?;
        Ok(())
    }

    fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

impl std::fmt::Debug for TelegramSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSession").finish_non_exhaustive()
    }
}

/// Masks a phone number for logging (shows last 4 digits).
fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > 4 {
        format!("***{}", &digits[digits.len() - 4..])
    } else {
        "****".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+447587490874"), "***0874");
        assert_eq!(mask_phone("123"), "****");
        assert_eq!(mask_phone("+7 (999) 123-45-67"), "***4567");
    }

    #[test]
    fn test_rpc_name() {
        let err = TelegramError::Rpc {
            name: "ADMIN_RANK_INVALID".to_owned(),
            code: 400,
            message: "rpc error 400: ADMIN_RANK_INVALID".to_owned(),
        };
        assert_eq!(err.rpc_name(), Some("ADMIN_RANK_INVALID"));
        assert_eq!(err.to_string(), "rpc error 400: ADMIN_RANK_INVALID");
        assert_eq!(TelegramError::NotAuthorized.rpc_name(), None);
    }
}
