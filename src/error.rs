use thiserror::Error;

use crate::models::swap::SwapAttemptRecord;

/// Failures reported by a ledger collaborator (reader or submitter).
///
/// `RateLimited` is kept apart from everything else so retry loops can
/// back off without inspecting transport error text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("rate limited by ledger endpoint")] RateLimited,

    #[error("ledger read failed: {0}")] Read(String),

    #[error("transaction submission failed: {0}")] Submission(String),

    #[error("transaction confirmation timed out: {0}")] ConfirmationTimeout(String),
}

impl LedgerError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LedgerError::RateLimited)
    }
}

/// Terminal, decision-relevant failures that cross component boundaries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwapError {
    #[error("invalid input: {0}")] InvalidInput(String),

    #[error("invalid quote: {0}")] InvalidQuote(String),

    #[error("transient read error: {0}")] TransientRead(#[source] LedgerError),

    #[error("swap failed after {} attempts", .attempts.len())] SwapFailed {
        attempts: Vec<SwapAttemptRecord>,
    },
}

pub type SwapResult<T> = std::result::Result<T, SwapError>;
