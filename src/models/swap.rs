use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::fmt;
use std::time::Duration;

/// Result of pricing an exact-in swap against a constant-product curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub input_amount: u64,
    pub output_amount: u64,
    /// Trading fee taken from the input before the curve step
    pub fee_amount: u64,
    /// Input that actually reaches the curve (`input_amount - fee_amount`)
    pub effective_input: u64,
    pub price_impact_bps: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure(String),
    FatalFailure(String),
}

/// What happened on one pass through the swap retry loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapAttemptRecord {
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
    pub transaction_id: Option<Signature>,
}

impl SwapAttemptRecord {
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Success => None,
            AttemptOutcome::RetryableFailure(reason) | AttemptOutcome::FatalFailure(reason) =>
                Some(reason),
        }
    }
}

/// Everything a single end-to-end run needs from its caller
#[derive(Debug, Clone)]
pub struct SwapRequest {
    /// Mint being sold
    pub mint_a: Pubkey,
    /// Mint being bought
    pub mint_b: Pubkey,
    /// Share of the funded balance to sell, 1..=100
    pub sell_percentage: u8,
    pub slippage_bps: u64,
    pub discovery_deadline: Duration,
    pub balance_deadline: Duration,
    pub max_swap_attempts: u32,
}

/// Terminal state of a run. Exactly one is reported per run.
#[derive(Debug, Clone, PartialEq)]
pub enum SwapOutcome {
    Success(Signature),
    PoolNotFound,
    DiscoveryTimeout,
    BalanceTimeout,
    SwapExhausted(Vec<SwapAttemptRecord>),
    ReadFailed(String),
    InvalidInput(String),
}

impl SwapOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SwapOutcome::Success(_))
    }

    /// Process exit code for the binary. Expected absences exit cleanly.
    pub fn exit_code(&self) -> i32 {
        match self {
            SwapOutcome::Success(_) | SwapOutcome::BalanceTimeout | SwapOutcome::PoolNotFound => 0,
            SwapOutcome::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapOutcome::Success(signature) => write!(f, "swap confirmed: {}", signature),
            SwapOutcome::PoolNotFound => write!(f, "no live pool found for the pair"),
            SwapOutcome::DiscoveryTimeout => write!(f, "pool discovery deadline exceeded"),
            SwapOutcome::BalanceTimeout => write!(f, "funds did not arrive before the deadline"),
            SwapOutcome::SwapExhausted(attempts) =>
                write!(f, "swap failed after {} attempts", attempts.len()),
            SwapOutcome::ReadFailed(reason) => write!(f, "ledger read failed: {}", reason),
            SwapOutcome::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
        }
    }
}
