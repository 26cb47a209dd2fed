//! Promotion run driver.
//!
//! A run is a single pass over the configured tokens:
//! 1. Resolve the target channel (fatal on failure)
//! 2. For each token: look up the username, resolve the bot, grant admin
//! 3. Classify and count the outcome, then pause before the next token
//! 4. Print the summary
//!
//! The session is disconnected exactly once when the run ends, whichever
//! way it ends.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{PromotionOutcome, RunTally};
use crate::bot_api::BotDirectory;
use crate::config::{DEFAULT_RANK, PromotionConfig, mask_token};
use crate::telegram::{AdminRights, AdminSession, ChannelEntity, TelegramError};

/// Promotes a list of bots to admins of one channel.
pub struct Promoter<D, S> {
    /// Resolves bot tokens to usernames.
    directory: D,

    /// Authenticated user session; owned so the run can tear it down.
    session: S,

    rights: AdminRights,
    rank: String,

    /// Pause between consecutive bots.
    delay: Duration,
}

impl<D: BotDirectory, S: AdminSession> Promoter<D, S> {
    /// Creates a promoter with the fixed rights bundle and default title.
    #[must_use]
    pub fn new(directory: D, session: S) -> Self {
        Self {
            directory,
            session,
            rights: AdminRights::BOT_ADMIN,
            rank: DEFAULT_RANK.to_owned(),
            delay: Duration::from_secs(3),
        }
    }

    /// Creates a promoter using the title and pacing from `config`.
    #[must_use]
    pub fn from_config(directory: D, session: S, config: &PromotionConfig) -> Self {
        Self::new(directory, session)
            .with_rank(config.rank.clone())
            .with_delay(config.delay())
    }

    /// Sets the custom admin title.
    #[must_use]
    pub fn with_rank(mut self, rank: String) -> Self {
        self.rank = rank;
        self
    }

    /// Sets the pause between consecutive bots.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs the promotion and disconnects the session afterwards.
    ///
    /// Per-bot failures are counted in the returned tally; only a channel
    /// resolution failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns the channel resolution error; the session is disconnected
    /// in that case too.
    pub async fn run(self, channel_id: i64, tokens: &[String]) -> Result<RunTally, TelegramError> {
        let result = self.promote_all(channel_id, tokens).await;
        self.session.disconnect();
        result
    }

    async fn promote_all(&self, channel_id: i64, tokens: &[String]) -> Result<RunTally, TelegramError> {
        let channel = self.session.resolve_channel(channel_id).await?;

        println!("Channel: {}", channel.title);
        println!("Type: {}\n", channel.kind_label());

        info!(
            "Promoting {} bot(s) in \"{}\" with title \"{}\"",
            tokens.len(),
            channel.title,
            self.rank
        );

        let total = tokens.len();
        let mut tally = RunTally::new();

        for (index, token) in tokens.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                debug!("Waiting {:?} before the next bot", self.delay);
                tokio::time::sleep(self.delay).await;
            }

            let outcome = self.promote_one(index + 1, total, &channel, token).await;
            tally.record(&outcome);
        }

        println!("\n{tally}");
        info!(
            "Run finished: {} succeeded, {} failed",
            tally.succeeded, tally.failed
        );

        Ok(tally)
    }

    async fn promote_one(
        &self,
        position: usize,
        total: usize,
        channel: &ChannelEntity,
        token: &str,
    ) -> PromotionOutcome {
        let username = match self.directory.username(token).await {
            Ok(username) => username,
            Err(e) => {
                warn!("Lookup failed for bot {}: {}", mask_token(token), e);
                println!("[{position}/{total}] ❌ Failed to get bot info: {e}");
                return PromotionOutcome::Failed(e.to_string());
            }
        };

        println!("[{position}/{total}] Promoting @{username}...");

        let result = match self.session.resolve_user(&username).await {
            Ok(user) => {
                if !user.is_bot {
                    warn!("@{} is not flagged as a bot", username);
                }
                self.session
                    .grant_admin(channel, &user, &self.rights, &self.rank)
                    .await
            }
            Err(e) => Err(e),
        };

        let outcome = PromotionOutcome::classify(result);
        match &outcome {
            PromotionOutcome::Promoted => {
                info!("Promoted @{}", username);
                println!("  ✅ Promoted to admin");
            }
            PromotionOutcome::AlreadySatisfied => {
                info!("@{} already has the requested admin status", username);
                println!("  ℹ️  Already admin or needs adjustment");
            }
            PromotionOutcome::Failed(message) => {
                warn!("Failed to promote @{}: {}", username, message);
                println!("  ❌ Error: {message}");
            }
        }

        outcome
    }
}

impl<D, S> std::fmt::Debug for Promoter<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Promoter")
            .field("rank", &self.rank)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot_api::{LookupError, MockBotDirectory};
    use crate::telegram::{MockAdminSession, UserEntity};

    fn channel() -> ChannelEntity {
        ChannelEntity {
            id: 3_232_165_605,
            access_hash: 1,
            title: "Bots HQ".to_owned(),
            broadcast: true,
        }
    }

    fn bot(username: &str) -> UserEntity {
        UserEntity {
            id: 42,
            access_hash: 7,
            username: Some(username.to_owned()),
            is_bot: true,
        }
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| (*t).to_owned()).collect()
    }

    fn rpc(name: &str) -> TelegramError {
        TelegramError::Rpc {
            name: name.to_owned(),
            code: 400,
            message: format!("rpc error 400: {name}"),
        }
    }

    fn promoter(directory: MockBotDirectory, session: MockAdminSession) -> Promoter<MockBotDirectory, MockAdminSession> {
        Promoter::new(directory, session).with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_one_success_one_lookup_failure() {
        let mut directory = MockBotDirectory::new();
        directory
            .expect_username()
            .times(2)
            .returning(|token| match token {
                "tok1" => Ok("alpha".to_owned()),
                _ => Err(LookupError::Status {
                    status: 404,
                    description: Some("Not Found".to_owned()),
                }),
            });

        let mut session = MockAdminSession::new();
        session
            .expect_resolve_channel()
            .times(1)
            .returning(|_| Ok(channel()));
        session
            .expect_resolve_user()
            .times(1)
            .returning(|username| {
                assert_eq!(username, "alpha");
                Ok(bot("alpha"))
            });
        session
            .expect_grant_admin()
            .times(1)
            .returning(|_, _, rights, rank| {
                assert_eq!(*rights, AdminRights::BOT_ADMIN);
                assert_eq!(rank, "Bot Admin");
                Ok(())
            });
        session.expect_disconnect().times(1).return_const(());

        let tally = promoter(directory, session)
            .run(-1_003_232_165_605, &tokens(&["tok1", "tok2"]))
            .await
            .unwrap();

        assert_eq!(tally.succeeded, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.total(), 2);

        let summary = tally.to_string();
        assert!(summary.contains("Successfully promoted: 1"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("Total bots: 2"));
    }

    #[tokio::test]
    async fn test_channel_failure_still_disconnects_once() {
        let mut directory = MockBotDirectory::new();
        directory.expect_username().never();

        let mut session = MockAdminSession::new();
        session
            .expect_resolve_channel()
            .times(1)
            .returning(|id| Err(TelegramError::ChannelNotFound(id)));
        session.expect_resolve_user().never();
        session.expect_grant_admin().never();
        session.expect_disconnect().times(1).return_const(());

        let result = promoter(directory, session)
            .run(123, &tokens(&["tok1"]))
            .await;

        assert!(matches!(result, Err(TelegramError::ChannelNotFound(123))));
    }

    #[tokio::test]
    async fn test_every_token_is_counted_once() {
        let mut directory = MockBotDirectory::new();
        directory
            .expect_username()
            .times(4)
            .returning(|token| Ok(format!("{token}_bot")));

        let mut session = MockAdminSession::new();
        session.expect_resolve_channel().returning(|_| Ok(channel()));
        session
            .expect_resolve_user()
            .times(4)
            .returning(|username| match username {
                "b_bot" => Err(TelegramError::UserNotFound(username.to_owned())),
                _ => Ok(bot(username)),
            });
        session
            .expect_grant_admin()
            .times(3)
            .returning(|_, user, _, _| match user.username.as_deref() {
                Some("a_bot") => Ok(()),
                Some("c_bot") => Err(rpc("USER_ALREADY_PARTICIPANT")),
                _ => Err(rpc("FLOOD_WAIT_X")),
            });
        session.expect_disconnect().times(1).return_const(());

        let tally = promoter(directory, session)
            .run(1, &tokens(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        // a promoted, c already satisfied; b unresolved, d flood-waited
        assert_eq!(tally.succeeded, 2);
        assert_eq!(tally.failed, 2);
        assert_eq!(tally.total(), 4);
    }

    #[tokio::test]
    async fn test_admin_rank_invalid_counts_as_success() {
        let mut directory = MockBotDirectory::new();
        directory
            .expect_username()
            .returning(|_| Ok("alpha".to_owned()));

        let mut session = MockAdminSession::new();
        session.expect_resolve_channel().returning(|_| Ok(channel()));
        session.expect_resolve_user().returning(|_| Ok(bot("alpha")));
        session
            .expect_grant_admin()
            .returning(|_, _, _, _| Err(rpc("ADMIN_RANK_INVALID")));
        session.expect_disconnect().times(1).return_const(());

        let tally = promoter(directory, session)
            .run(1, &tokens(&["tok1"]))
            .await
            .unwrap();

        assert_eq!(tally, RunTally { succeeded: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_empty_token_list() {
        let directory = MockBotDirectory::new();

        let mut session = MockAdminSession::new();
        session.expect_resolve_channel().returning(|_| Ok(channel()));
        session.expect_disconnect().times(1).return_const(());

        let tally = promoter(directory, session).run(1, &[]).await.unwrap();

        assert_eq!(tally.total(), 0);
    }

    #[tokio::test]
    async fn test_from_config_uses_rank() {
        let mut config = PromotionConfig::new(1, tokens(&["tok1"]));
        config.rank = "Helper".to_owned();
        config.delay_secs = 0;

        let mut directory = MockBotDirectory::new();
        directory
            .expect_username()
            .returning(|_| Ok("alpha".to_owned()));

        let mut session = MockAdminSession::new();
        session.expect_resolve_channel().returning(|_| Ok(channel()));
        session.expect_resolve_user().returning(|_| Ok(bot("alpha")));
        session
            .expect_grant_admin()
            .times(1)
            .returning(|_, _, _, rank| {
                assert_eq!(rank, "Helper");
                Ok(())
            });
        session.expect_disconnect().times(1).return_const(());

        let tally = Promoter::from_config(directory, session, &config)
            .run(config.bare_channel_id().unwrap(), &config.bot_tokens)
            .await
            .unwrap();

        assert_eq!(tally.succeeded, 1);
    }

    #[tokio::test]
    async fn test_malformed_token_is_counted_not_fatal() {
        let mut directory = MockBotDirectory::new();
        directory
            .expect_username()
            .times(2)
            .returning(|token| match token {
                "1:abc" => Ok("alpha".to_owned()),
                _ => Err(LookupError::Status {
                    status: 404,
                    description: Some("Not Found".to_owned()),
                }),
            });

        let mut session = MockAdminSession::new();
        session.expect_resolve_channel().returning(|_| Ok(channel()));
        session.expect_resolve_user().times(1).returning(|_| Ok(bot("alpha")));
        session
            .expect_grant_admin()
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        session.expect_disconnect().times(1).return_const(());

        let config = PromotionConfig::new(-1_003_232_165_605, tokens(&["1:abc", "tok2"]));
        assert_eq!(config.token_problems().len(), 1);

        let tally = promoter(directory, session)
            .run(config.bare_channel_id().unwrap(), &config.bot_tokens)
            .await
            .unwrap();

        assert_eq!(tally, RunTally { succeeded: 1, failed: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_pause_between_bots() {
        let mut directory = MockBotDirectory::new();
        directory
            .expect_username()
            .times(3)
            .returning(|token| match token {
                "tok2" => Err(LookupError::Malformed("missing result.username".to_owned())),
                _ => Ok(format!("{token}_bot")),
            });

        let mut session = MockAdminSession::new();
        session.expect_resolve_channel().returning(|_| Ok(channel()));
        session.expect_resolve_user().returning(|username| Ok(bot(username)));
        session
            .expect_grant_admin()
            .times(2)
            .returning(|_, _, _, _| Ok(()));
        session.expect_disconnect().times(1).return_const(());

        let start = tokio::time::Instant::now();
        let tally = Promoter::new(directory, session)
            .run(1, &tokens(&["tok1", "tok2", "tok3"]))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        // two pauses of 3s, none after the last bot
        assert_eq!(tally.total(), 3);
        assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(9), "elapsed {elapsed:?}");
        assert_eq!(elapsed.as_secs() % 3, 0);
    }
}
