// Re-export core modules
pub mod balance_waiter;
pub mod config;
pub mod curve;
pub mod error;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod pool;
pub mod swap_executor;
pub mod utils;

// Re-export common types and traits
pub use error::{ LedgerError, SwapError, SwapResult };
pub use models::pool::{ canonical_order, PoolConfigCandidate, PoolState, SwapDirection };
pub use models::swap::{ SwapAttemptRecord, SwapOutcome, SwapQuote, SwapRequest };

pub use ledger::{ LedgerReader, TransactionSubmitter, RpcLedger, RpcLedgerConfig };
pub use pool::{ derive_pool_address, PoolCandidateEnumerator, PoolResolver, ResolverConfig };
pub use balance_waiter::{ BalanceWait, BalanceWaiter, WaiterConfig };
pub use curve::quote;
pub use swap_executor::{ ExecutorConfig, SwapExecutor };
pub use orchestrator::{ Orchestrator, OrchestratorConfig };
pub use config::SwapperConfig;
