use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{ sleep, timeout, Instant };

use crate::balance_waiter::{ BalanceWait, BalanceWaiter, WaiterConfig };
use crate::curve;
use crate::error::{ LedgerError, SwapError };
use crate::ledger::{ LedgerReader, TransactionSubmitter };
use crate::models::pool::{ PoolState, SwapDirection };
use crate::models::spl::associated_token_address;
use crate::models::swap::{ SwapOutcome, SwapRequest };
use crate::pool::candidates::PoolCandidateEnumerator;
use crate::pool::resolver::{ PoolResolver, ResolverConfig };
use crate::swap_executor::{ ExecutorConfig, SwapExecutor };
use crate::utils::deadline::Deadline;
use crate::utils::logging;

const COMPONENT: &str = "orchestrator";

/// Knobs for a full run that are not part of an individual request
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub resolver: ResolverConfig,
    pub waiter: WaiterConfig,
    pub executor: ExecutorConfig,
    /// Reuse the discovery snapshot for quoting if it is younger than this
    pub pool_state_max_age: Duration,
    /// Throttled re-reads allowed when refreshing the chosen pool
    pub max_refresh_retries: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            waiter: WaiterConfig::default(),
            executor: ExecutorConfig::default(),
            pool_state_max_age: Duration::ZERO,
            max_refresh_retries: 5,
        }
    }
}

/// Runs discovery, funding wait, quoting and execution for one swap
pub struct Orchestrator {
    reader: Arc<dyn LedgerReader>,
    resolver: PoolResolver,
    waiter: BalanceWaiter,
    executor: SwapExecutor,
    owner: Pubkey,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        reader: Arc<dyn LedgerReader>,
        submitter: Arc<dyn TransactionSubmitter>,
        enumerator: PoolCandidateEnumerator,
        config: OrchestratorConfig
    ) -> Self {
        let program_id = *enumerator.program_id();
        let owner = submitter.payer();

        Self {
            resolver: PoolResolver::new(reader.clone(), enumerator, config.resolver.clone()),
            waiter: BalanceWaiter::new(reader.clone(), config.waiter.clone()),
            executor: SwapExecutor::new(submitter, program_id, config.executor.clone()),
            reader,
            owner,
            config,
        }
    }

    pub fn resolver(&self) -> &PoolResolver {
        &self.resolver
    }

    pub fn waiter(&self) -> &BalanceWaiter {
        &self.waiter
    }

    /// Run one swap end to end and report exactly one terminal outcome.
    ///
    /// Stages run in order and are never retried from here: each stage's own
    /// polling or attempt budget is final.
    pub async fn run_swap(&self, request: &SwapRequest) -> SwapOutcome {
        if let Err(reason) = validate(request) {
            logging::log_activity(COMPONENT, "Rejected request", Some(&reason));
            return SwapOutcome::InvalidInput(reason);
        }
        let SwapRequest { mint_a, mint_b, .. } = request;

        // Stage 1: discovery
        let discovery = timeout(
            request.discovery_deadline,
            self.resolver.resolve_best(mint_a, mint_b)
        ).await;
        let pool = match discovery {
            Err(_) => {
                return self.finish(SwapOutcome::DiscoveryTimeout);
            }
            Ok(Err(e)) => {
                return self.finish(outcome_for_error(e));
            }
            Ok(Ok(None)) => {
                return self.finish(SwapOutcome::PoolNotFound);
            }
            Ok(Ok(Some(pool))) => pool,
        };
        let discovered_at = Instant::now();

        // The side flag follows the resolved pool's own layout
        let direction = match pool.direction_for(mint_a) {
            Some(direction) => direction,
            None => {
                return self.finish(
                    SwapOutcome::InvalidInput(
                        format!("pool {} does not trade {}", pool.address, mint_a)
                    )
                );
            }
        };
        if direction != SwapDirection::for_input(mint_a, mint_b) {
            logging::log_activity(
                COMPONENT,
                "Pool stores the pair in reverse byte order",
                Some(&format!("token0 is {}", pool.keys.token_0_mint))
            );
        }
        logging::log_activity(
            COMPONENT,
            "Using pool",
            Some(&format!("{} direction {:?}", pool.address, direction))
        );

        // Stage 2: wait for funds
        let input_account = associated_token_address(
            &self.owner,
            mint_a,
            &pool.input_token_program(direction)
        );
        let balance = match self.await_funds(&input_account, request.balance_deadline).await {
            Some(balance) => balance,
            None => {
                return self.finish(SwapOutcome::BalanceTimeout);
            }
        };

        let amount_in = (((balance as u128) * (request.sell_percentage as u128)) / 100) as u64;
        if amount_in == 0 {
            return self.finish(
                SwapOutcome::InvalidInput(
                    format!("{}% of balance {} rounds to zero", request.sell_percentage, balance)
                )
            );
        }
        logging::log_activity(
            COMPONENT,
            "Sell amount",
            Some(&format!("{} ({}% of {})", amount_in, request.sell_percentage, balance))
        );

        // Stage 3: quote against fresh reserves
        let pool = if discovered_at.elapsed() < self.config.pool_state_max_age {
            pool
        } else {
            match self.refresh_pool(&pool).await {
                Ok(Some(fresh)) => fresh,
                Ok(None) => {
                    return self.finish(SwapOutcome::PoolNotFound);
                }
                Err(e) => {
                    return self.finish(SwapOutcome::ReadFailed(e.to_string()));
                }
            }
        };
        let (reserve_in, reserve_out) = pool.reserves_for(direction);
        let quote = match curve::quote(amount_in, reserve_in, reserve_out, pool.fee_rate_bps) {
            Ok(quote) => quote,
            Err(e) => {
                return self.finish(outcome_for_error(e));
            }
        };
        logging::log_debug(COMPONENT, "Quote", &quote);

        // Stage 4: execute
        let executed = self.executor.execute(
            &pool,
            &quote,
            direction,
            request.slippage_bps,
            request.max_swap_attempts
        ).await;
        match executed {
            Ok(signature) => self.finish(SwapOutcome::Success(signature)),
            Err(e) => self.finish(outcome_for_error(e)),
        }
    }

    /// Keep polling until funded or the balance deadline passes.
    ///
    /// Read failures other than throttling are logged and polling resumes
    /// after one interval, all under the same deadline.
    async fn await_funds(&self, account: &Pubkey, limit: Duration) -> Option<u64> {
        let deadline = Deadline::after(limit);

        loop {
            match self.waiter.wait_for_non_zero_balance(account, deadline).await {
                Ok(BalanceWait::Funded(balance)) => {
                    return Some(balance);
                }
                Ok(BalanceWait::DeadlineExceeded) => {
                    return None;
                }
                Err(e) => {
                    logging::log_error(COMPONENT, "Balance read failed, still waiting", &e);
                    if deadline.is_expired() {
                        return None;
                    }
                    deadline.sleep(self.config.waiter.poll_interval).await;
                }
            }
        }
    }

    /// Re-read the chosen pool. Never falls back to a different pool.
    async fn refresh_pool(&self, pool: &PoolState) -> Result<Option<PoolState>, LedgerError> {
        let mut throttled = 0;

        loop {
            match self.reader.get_pool_state(&pool.address).await {
                Err(LedgerError::RateLimited) if throttled < self.config.max_refresh_retries => {
                    throttled += 1;
                    logging::log_retry(
                        COMPONENT,
                        "Pool refresh throttled",
                        throttled,
                        &LedgerError::RateLimited
                    );
                    sleep(self.config.resolver.rate_limit_backoff).await;
                }
                other => {
                    return other;
                }
            }
        }
    }

    fn finish(&self, outcome: SwapOutcome) -> SwapOutcome {
        logging::log_activity(COMPONENT, "Run finished", Some(&outcome.to_string()));
        outcome
    }
}

fn validate(request: &SwapRequest) -> Result<(), String> {
    if request.mint_a == request.mint_b {
        return Err(format!("input and output mint are both {}", request.mint_a));
    }
    if request.sell_percentage == 0 || request.sell_percentage > 100 {
        return Err(format!("sell percentage {} is outside 1..=100", request.sell_percentage));
    }
    if request.slippage_bps > curve::BPS_DENOMINATOR {
        return Err(format!("slippage {} bps exceeds 100%", request.slippage_bps));
    }
    if request.max_swap_attempts == 0 {
        return Err("max swap attempts must be at least 1".to_string());
    }
    Ok(())
}

fn outcome_for_error(err: SwapError) -> SwapOutcome {
    match err {
        SwapError::InvalidInput(reason) | SwapError::InvalidQuote(reason) =>
            SwapOutcome::InvalidInput(reason),
        SwapError::TransientRead(e) => SwapOutcome::ReadFailed(e.to_string()),
        SwapError::SwapFailed { attempts } => SwapOutcome::SwapExhausted(attempts),
    }
}
