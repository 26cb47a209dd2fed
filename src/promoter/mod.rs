//! Bot promotion module.
//!
//! Drives a promotion run: resolves each bot and grants it admin rights
//! in the target channel, counting the outcomes.

mod outcome;
mod runner;

pub use outcome::{ALREADY_SATISFIED_ERRORS, PromotionOutcome, RunTally};
pub use runner::Promoter;
