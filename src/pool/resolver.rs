use futures::future::join_all;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::{ Arc, Mutex };
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{ LedgerError, SwapError, SwapResult };
use crate::ledger::LedgerReader;
use crate::models::pool::{ canonical_order, PoolCandidate, PoolState };
use crate::pool::candidates::PoolCandidateEnumerator;
use crate::utils::logging;

const COMPONENT: &str = "resolver";

/// Configuration for pool discovery
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Wait applied when the ledger throttles a probe
    pub rate_limit_backoff: Duration,
    /// Throttled re-reads allowed per candidate before it is skipped
    pub max_rate_limit_retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rate_limit_backoff: Duration::from_secs(2),
            max_rate_limit_retries: 5,
        }
    }
}

/// Finds live pools for a mint pair by probing every derived candidate address
pub struct PoolResolver {
    reader: Arc<dyn LedgerReader>,
    enumerator: PoolCandidateEnumerator,
    config: ResolverConfig,
    // Key: canonical (token0, token1)
    candidate_cache: Mutex<HashMap<(Pubkey, Pubkey), Arc<Vec<PoolCandidate>>>>,
}

impl PoolResolver {
    pub fn new(
        reader: Arc<dyn LedgerReader>,
        enumerator: PoolCandidateEnumerator,
        config: ResolverConfig
    ) -> Self {
        Self {
            reader,
            enumerator,
            config,
            candidate_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn enumerator(&self) -> &PoolCandidateEnumerator {
        &self.enumerator
    }

    /// Label of a known config address, if it is in the candidate list
    pub fn config_label(&self, config: &Pubkey) -> Option<&str> {
        self.enumerator
            .configs()
            .iter()
            .find(|candidate| candidate.address == *config)
            .map(|candidate| candidate.label.as_str())
    }

    /// Derived candidates for a pair, computed once per run
    pub fn candidates(&self, mint_a: &Pubkey, mint_b: &Pubkey) -> Arc<Vec<PoolCandidate>> {
        let key = canonical_order(mint_a, mint_b);
        if let Ok(mut cache) = self.candidate_cache.lock() {
            return cache
                .entry(key)
                .or_insert_with(|| Arc::new(self.enumerator.candidates(&key.0, &key.1).collect()))
                .clone();
        }
        Arc::new(self.enumerator.candidates(&key.0, &key.1).collect())
    }

    /// Every live pool for the pair, deepest first.
    ///
    /// Depth is the reserve of the byte-smaller mint of the pair.
    ///
    /// All candidates are probed; a candidate that cannot be read is skipped.
    /// Ties keep config list order.
    pub async fn resolve(&self, mint_a: &Pubkey, mint_b: &Pubkey) -> SwapResult<Vec<PoolState>> {
        if mint_a == mint_b {
            return Err(SwapError::InvalidInput(format!("both mints are {}", mint_a)));
        }

        let candidates = self.candidates(mint_a, mint_b);
        logging::log_activity(
            COMPONENT,
            "Probing pool candidates",
            Some(&format!("{} addresses for {} / {}", candidates.len(), mint_a, mint_b))
        );

        // Ranked on the byte-smaller mint's reserve, whichever slot the pool stores it in
        let (token_0, _) = canonical_order(mint_a, mint_b);
        let probes = candidates.iter().map(|candidate| self.probe(candidate));
        let mut found: Vec<(usize, u64, PoolState)> = join_all(probes).await
            .into_iter()
            .zip(candidates.iter())
            .filter_map(|(state, candidate)| {
                state.map(|state| {
                    let depth = state.reserve_of(&token_0).unwrap_or(0);
                    (candidate.config_index, depth, state)
                })
            })
            .collect();

        found.sort_by(|(index_a, depth_a, _), (index_b, depth_b, _)| {
            depth_b.cmp(depth_a).then(index_a.cmp(index_b))
        });

        logging::log_stats(
            COMPONENT,
            "Discovery complete",
            &format!("{} live pools out of {} candidates", found.len(), candidates.len())
        );

        Ok(
            found
                .into_iter()
                .map(|(_, _, state)| state)
                .collect()
        )
    }

    /// The deepest live pool, or `None` when nothing is live
    pub async fn resolve_best(
        &self,
        mint_a: &Pubkey,
        mint_b: &Pubkey
    ) -> SwapResult<Option<PoolState>> {
        let best = self.resolve(mint_a, mint_b).await?.into_iter().next();
        if let Some(pool) = &best {
            logging::log_activity(
                COMPONENT,
                "Best pool",
                Some(
                    &format!(
                        "{} (reserves {} {} / {} {})",
                        pool.address,
                        pool.base_reserve,
                        pool.keys.token_0_mint,
                        pool.quote_reserve,
                        pool.keys.token_1_mint
                    )
                )
            );
        }
        Ok(best)
    }

    async fn probe(&self, candidate: &PoolCandidate) -> Option<PoolState> {
        let mut throttled = 0;

        loop {
            match self.reader.get_pool_state(&candidate.address).await {
                Ok(Some(state)) => {
                    return self.accept(candidate, state);
                }
                Ok(None) => {
                    return None;
                }
                Err(LedgerError::RateLimited) if throttled < self.config.max_rate_limit_retries => {
                    throttled += 1;
                    logging::log_retry(
                        COMPONENT,
                        &format!("Probe of {} throttled", candidate.address),
                        throttled,
                        &LedgerError::RateLimited
                    );
                    sleep(self.config.rate_limit_backoff).await;
                }
                Err(e) => {
                    logging::log_error(
                        COMPONENT,
                        &format!("Skipping candidate {}", candidate.address),
                        &e
                    );
                    return None;
                }
            }
        }
    }

    /// Live state only counts if it matches the seeds the address came from
    fn accept(&self, candidate: &PoolCandidate, state: PoolState) -> Option<PoolState> {
        let matches_seeds =
            state.amm_config == candidate.config.address &&
            state.keys.token_0_mint == candidate.mint_x &&
            state.keys.token_1_mint == candidate.mint_y;

        if !matches_seeds {
            logging::log_debug(COMPONENT, "Pool does not match its derivation seeds", &state);
            return None;
        }

        logging::log_activity(
            COMPONENT,
            "Found pool",
            Some(
                &format!(
                    "{} config {} base {} quote {} fee {} bps",
                    state.address,
                    candidate.config.label,
                    state.base_reserve,
                    state.quote_reserve,
                    state.fee_rate_bps
                )
            )
        );
        Some(state)
    }
}
