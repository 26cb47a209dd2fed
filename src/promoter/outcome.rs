//! Outcome classification and run tallies.

use std::fmt;

use crate::telegram::TelegramError;

/// RPC errors meaning the bot already holds the desired admin status.
pub const ALREADY_SATISFIED_ERRORS: [&str; 2] = ["USER_ALREADY_PARTICIPANT", "ADMIN_RANK_INVALID"];

/// Result of processing one bot token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The bot was promoted.
    Promoted,
    /// Telegram reported the bot is already in the desired state.
    AlreadySatisfied,
    /// The bot could not be promoted; carries the raw error text.
    Failed(String),
}

impl PromotionOutcome {
    /// Classifies the result of resolving and promoting one bot.
    #[must_use]
    pub fn classify(result: Result<(), TelegramError>) -> Self {
        match result {
            Ok(()) => Self::Promoted,
            Err(err) if is_already_satisfied(&err) => Self::AlreadySatisfied,
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// Whether this outcome counts towards the success tally.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Checks whether an error only says the promotion was already in place.
fn is_already_satisfied(err: &TelegramError) -> bool {
    if let Some(name) = err.rpc_name() {
        return ALREADY_SATISFIED_ERRORS.contains(&name);
    }

    // Text matching is brittle; it only covers errors without an RPC name.
    let message = err.to_string();
    ALREADY_SATISFIED_ERRORS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Success and failure counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one processed bot.
    pub fn record(&mut self, outcome: &PromotionOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Number of processed bots.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for RunTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "✅ Successfully promoted: {}", self.succeeded)?;
        writeln!(f, "❌ Failed: {}", self.failed)?;
        writeln!(f, "📊 Total bots: {}", self.total())?;
        write!(f, "{rule}")
    }
}
