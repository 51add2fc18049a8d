use solana_sdk::instruction::{ AccountMeta, Instruction };
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::curve::minimum_output;
use crate::error::{ SwapError, SwapResult };
use crate::ledger::TransactionSubmitter;
use crate::models::pool::{ PoolState, SwapDirection };
use crate::models::raydium::SwapBaseInputArgs;
use crate::models::spl::{
    associated_token_address,
    close_account,
    create_associated_token_account_idempotent,
    NATIVE_MINT,
};
use crate::models::swap::{ AttemptOutcome, SwapAttemptRecord, SwapQuote };
use crate::pool::address::pool_authority;
use crate::utils::logging;

const COMPONENT: &str = "executor";

/// Optional lamport tip added to every swap transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipConfig {
    pub account: Pubkey,
    pub lamports: u64,
}

/// Retry policy and transaction extras for swap execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Delay used instead when the failed attempt was throttled
    pub rate_limit_backoff: Duration,
    pub tip: Option<TipConfig>,
    /// Close the output account after the swap when it holds wrapped SOL
    pub unwrap_native_output: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(2),
            tip: None,
            unwrap_native_output: true,
        }
    }
}

/// Phases of a single swap attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Building,
    Submitting,
    Confirmed,
    Failed,
    Exhausted,
}

/// Everything needed to express one swap on chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    pub program_id: Pubkey,
    pub owner: Pubkey,
    pub direction: SwapDirection,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
    pub tip: Option<TipConfig>,
    pub unwrap_native_output: bool,
}

impl SwapPlan {
    /// Instructions for the swap: output account creation, the swap itself,
    /// then the optional unwrap and tip.
    pub fn instructions(&self, pool: &PoolState) -> SwapResult<Vec<Instruction>> {
        let keys = &pool.keys;
        let (input_mint, output_mint, input_vault, output_vault, input_program, output_program) =
            match self.direction {
                SwapDirection::BaseToQuote =>
                    (
                        keys.token_0_mint,
                        keys.token_1_mint,
                        keys.token_0_vault,
                        keys.token_1_vault,
                        keys.token_0_program,
                        keys.token_1_program,
                    ),
                SwapDirection::QuoteToBase =>
                    (
                        keys.token_1_mint,
                        keys.token_0_mint,
                        keys.token_1_vault,
                        keys.token_0_vault,
                        keys.token_1_program,
                        keys.token_0_program,
                    ),
            };

        let input_account = associated_token_address(&self.owner, &input_mint, &input_program);
        let output_account = associated_token_address(&self.owner, &output_mint, &output_program);

        let data = (SwapBaseInputArgs {
            amount_in: self.amount_in,
            minimum_amount_out: self.minimum_amount_out,
        }).instruction_data()?;

        let swap = Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new_readonly(self.owner, true),
                AccountMeta::new_readonly(pool_authority(&self.program_id), false),
                AccountMeta::new_readonly(pool.amm_config, false),
                AccountMeta::new(pool.address, false),
                AccountMeta::new(input_account, false),
                AccountMeta::new(output_account, false),
                AccountMeta::new(input_vault, false),
                AccountMeta::new(output_vault, false),
                AccountMeta::new_readonly(input_program, false),
                AccountMeta::new_readonly(output_program, false),
                AccountMeta::new_readonly(input_mint, false),
                AccountMeta::new_readonly(output_mint, false),
                AccountMeta::new(keys.observation_key, false)
            ],
            data,
        };

        let mut instructions = vec![
            create_associated_token_account_idempotent(
                &self.owner,
                &self.owner,
                &output_mint,
                &output_program
            ),
            swap
        ];

        if self.unwrap_native_output && output_mint == NATIVE_MINT {
            instructions.push(
                close_account(&output_program, &output_account, &self.owner, &self.owner)
            );
        }

        if let Some(tip) = self.tip {
            instructions.push(system_instruction::transfer(&self.owner, &tip.account, tip.lamports));
        }

        Ok(instructions)
    }
}

/// Submits a priced swap with a bounded number of attempts
pub struct SwapExecutor {
    submitter: Arc<dyn TransactionSubmitter>,
    program_id: Pubkey,
    config: ExecutorConfig,
}

impl SwapExecutor {
    pub fn new(
        submitter: Arc<dyn TransactionSubmitter>,
        program_id: Pubkey,
        config: ExecutorConfig
    ) -> Self {
        Self { submitter, program_id, config }
    }

    /// Build the plan for a quote: minimum output is the quote less `slippage_bps`
    pub fn plan(
        &self,
        quote: &SwapQuote,
        direction: SwapDirection,
        slippage_bps: u64
    ) -> SwapResult<SwapPlan> {
        Ok(SwapPlan {
            program_id: self.program_id,
            owner: self.submitter.payer(),
            direction,
            amount_in: quote.input_amount,
            minimum_amount_out: minimum_output(quote.output_amount, slippage_bps)?,
            tip: self.config.tip,
            unwrap_native_output: self.config.unwrap_native_output,
        })
    }

    /// Submit the swap, retrying failed attempts up to `max_attempts` in total.
    ///
    /// Exhaustion is returned as `SwapFailed` with one record per attempt.
    pub async fn execute(
        &self,
        pool: &PoolState,
        quote: &SwapQuote,
        direction: SwapDirection,
        slippage_bps: u64,
        max_attempts: u32
    ) -> SwapResult<Signature> {
        if max_attempts == 0 {
            return Err(SwapError::InvalidInput("max swap attempts must be at least 1".to_string()));
        }

        let plan = self.plan(quote, direction, slippage_bps)?;
        logging::log_activity(
            COMPONENT,
            "Swapping",
            Some(
                &format!(
                    "{} in, min {} out (quoted {}) via pool {}",
                    plan.amount_in,
                    plan.minimum_amount_out,
                    quote.output_amount,
                    pool.address
                )
            )
        );

        let mut attempts: Vec<SwapAttemptRecord> = Vec::new();
        let mut phase = SwapPhase::Building;

        for attempt_number in 1..=max_attempts {
            debug_assert!(phase == SwapPhase::Building);
            let instructions = match plan.instructions(pool) {
                Ok(instructions) => instructions,
                Err(e) => {
                    attempts.push(SwapAttemptRecord {
                        attempt_number,
                        outcome: AttemptOutcome::FatalFailure(e.to_string()),
                        transaction_id: None,
                    });
                    logging::log_error(COMPONENT, "Could not build swap transaction", &e);
                    return Err(SwapError::SwapFailed { attempts });
                }
            };

            phase = SwapPhase::Submitting;
            logging::log_debug(COMPONENT, "Submitting attempt", &(attempt_number, phase));

            match self.submitter.submit_and_confirm(instructions).await {
                Ok(signature) => {
                    phase = SwapPhase::Confirmed;
                    attempts.push(SwapAttemptRecord {
                        attempt_number,
                        outcome: AttemptOutcome::Success,
                        transaction_id: Some(signature),
                    });
                    logging::log_activity(
                        COMPONENT,
                        "Swap confirmed",
                        Some(&format!("{} (attempt {}, {:?})", signature, attempt_number, phase))
                    );
                    return Ok(signature);
                }
                Err(e) => {
                    phase = SwapPhase::Failed;
                    logging::log_error(
                        COMPONENT,
                        &format!("Swap attempt {}/{} failed", attempt_number, max_attempts),
                        &e
                    );
                    let wait = if e.is_rate_limited() {
                        self.config.rate_limit_backoff
                    } else {
                        self.config.retry_delay
                    };
                    attempts.push(SwapAttemptRecord {
                        attempt_number,
                        outcome: AttemptOutcome::RetryableFailure(e.to_string()),
                        transaction_id: None,
                    });

                    if attempt_number < max_attempts {
                        sleep(wait).await;
                        phase = SwapPhase::Building;
                    }
                }
            }
        }

        phase = SwapPhase::Exhausted;
        logging::log_stats(
            COMPONENT,
            "Swap not executed",
            &format!("{:?} after {} attempts", phase, attempts.len())
        );
        Err(SwapError::SwapFailed { attempts })
    }
}
