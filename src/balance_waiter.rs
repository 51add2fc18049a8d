use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ LedgerError, SwapError, SwapResult };
use crate::ledger::{ LedgerReader, OwnedTokenAccount };
use crate::utils::deadline::Deadline;
use crate::utils::logging;

const COMPONENT: &str = "balance";

/// Polling cadence for balance waits
#[derive(Debug, Clone)]
pub struct WaiterConfig {
    /// Delay between ordinary polls
    pub poll_interval: Duration,
    /// Longer delay after the ledger throttles a poll
    pub rate_limit_backoff: Duration,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(2),
        }
    }
}

/// Terminal result of a balance wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceWait {
    Funded(u64),
    DeadlineExceeded,
}

/// Terminal result of waiting for a wallet token to show up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenWait {
    Found(OwnedTokenAccount),
    DeadlineExceeded,
}

/// What one poll told us
enum Poll<T> {
    Ready(T),
    Pending,
    Throttled,
}

/// Polls the ledger until funds appear or a deadline passes
pub struct BalanceWaiter {
    reader: Arc<dyn LedgerReader>,
    config: WaiterConfig,
}

impl BalanceWaiter {
    pub fn new(reader: Arc<dyn LedgerReader>, config: WaiterConfig) -> Self {
        Self { reader, config }
    }

    /// Block until `account` holds a non-zero balance or `deadline` passes.
    ///
    /// A throttled read waits `rate_limit_backoff` and polls again. Any other
    /// read failure is returned as `TransientRead`; the caller decides whether
    /// to keep waiting. A missing account counts as an empty one.
    pub async fn wait_for_non_zero_balance(
        &self,
        account: &Pubkey,
        deadline: Deadline
    ) -> SwapResult<BalanceWait> {
        let reader = self.reader.clone();
        let account = *account;

        self.poll_until(deadline, &format!("Waiting for funds in {}", account), || {
            let reader = reader.clone();
            async move {
                match reader.get_account_balance(&account).await {
                    Ok(Some(balance)) if balance > 0 => Ok(Poll::Ready(BalanceWait::Funded(balance))),
                    Ok(_) => Ok(Poll::Pending),
                    Err(LedgerError::RateLimited) => Ok(Poll::Throttled),
                    Err(e) => Err(e),
                }
            }
        }).await.map(|result| result.unwrap_or(BalanceWait::DeadlineExceeded))
    }

    /// Block until `owner` holds exactly one token whose mint is not `quote_mint`.
    ///
    /// This is how a run learns which token it is supposed to sell when the
    /// caller does not name it.
    pub async fn wait_for_single_token(
        &self,
        owner: &Pubkey,
        quote_mint: &Pubkey,
        deadline: Deadline
    ) -> SwapResult<TokenWait> {
        let reader = self.reader.clone();
        let owner = *owner;
        let quote_mint = *quote_mint;

        self.poll_until(deadline, &format!("Waiting for a token in wallet {}", owner), || {
            let reader = reader.clone();
            async move {
                match reader.get_owned_tokens(&owner).await {
                    Ok(accounts) => {
                        let candidates: Vec<OwnedTokenAccount> = accounts
                            .into_iter()
                            .filter(|account| account.mint != quote_mint)
                            .collect();
                        let mints: HashSet<Pubkey> = candidates
                            .iter()
                            .map(|account| account.mint)
                            .collect();
                        match (mints.len(), candidates.into_iter().next()) {
                            (1, Some(account)) => Ok(Poll::Ready(TokenWait::Found(account))),
                            _ => Ok(Poll::Pending),
                        }
                    }
                    Err(LedgerError::RateLimited) => Ok(Poll::Throttled),
                    Err(e) => Err(e),
                }
            }
        }).await.map(|result| result.unwrap_or(TokenWait::DeadlineExceeded))
    }

    /// Shared bounded-wait loop. `Ok(None)` means the deadline passed.
    async fn poll_until<T, F, Fut>(
        &self,
        deadline: Deadline,
        context: &str,
        mut poll: F
    ) -> SwapResult<Option<T>>
        where F: FnMut() -> Fut, Fut: std::future::Future<Output = Result<Poll<T>, LedgerError>>
    {
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            let wait = match poll().await {
                Ok(Poll::Ready(value)) => {
                    logging::log_stats(COMPONENT, context, &format!("ready after {} polls", polls));
                    return Ok(Some(value));
                }
                Ok(Poll::Pending) => self.config.poll_interval,
                Ok(Poll::Throttled) => {
                    logging::log_retry(COMPONENT, context, polls, &LedgerError::RateLimited);
                    self.config.rate_limit_backoff
                }
                Err(e) => {
                    return Err(SwapError::TransientRead(e));
                }
            };

            if deadline.is_expired() {
                logging::log_activity(
                    COMPONENT,
                    context,
                    Some(&format!("deadline exceeded after {} polls", polls))
                );
                return Ok(None);
            }
            if polls == 1 || polls % 30 == 0 {
                logging::log_activity(COMPONENT, context, Some("not ready yet"));
            }
            deadline.sleep(wait).await;
        }
    }
}
