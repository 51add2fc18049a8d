/******************************************************************************
 * SWAPPER MAIN ENTRY POINT
 *
 * Discovers the CPMM pool for a token pair, waits for the wallet to be funded
 * and sells a share of the balance, or lists every live pool for a pair.
 ******************************************************************************/

use anyhow::{ Context, Result };
use clap::{ Parser, Subcommand };
use solana_sdk::signature::Keypair;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use swapper::{
    config::{ keypair_from_env, SwapperConfig },
    ledger::{ LedgerReader, RpcLedger, TransactionSubmitter },
    models::pool::{ parse_pubkey, PoolListing },
    models::raydium::CPMM_PROGRAM_ID,
    models::spl::NATIVE_MINT,
    pool::{ default_config_candidates, parse_config_candidates, PoolCandidateEnumerator },
    balance_waiter::TokenWait,
    swap_executor::TipConfig,
    utils::{ deadline::Deadline, logging },
    Orchestrator,
    SwapOutcome,
    SwapRequest,
};

/// Constant-product pool discovery and swap CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Solana RPC URL (defaults to RPC_ENDPOINT)
    #[arg(long)]
    rpc_url: Option<String>,

    /// AMM configs to probe instead of the built-in list (address or address:label)
    #[arg(long, global = true, use_value_delimiter = true, value_delimiter = ',')]
    configs: Option<Vec<String>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the pool, wait for funds and swap
    Swap {
        /// Mint to sell; when omitted, wait for the wallet to hold exactly one other token
        #[arg(long)]
        mint_a: Option<String>,

        /// Mint to buy
        #[arg(long, default_value_t = NATIVE_MINT.to_string())]
        mint_b: String,

        /// Percentage of the funded balance to sell
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=100))]
        sell_percentage: u8,

        /// Accepted shortfall versus the quote, in basis points
        #[arg(long, default_value_t = 50)]
        slippage_bps: u64,

        #[arg(long, default_value_t = 120)]
        discovery_timeout_secs: u64,

        #[arg(long, default_value_t = 3600)]
        balance_timeout_secs: u64,

        /// How long to wait for a token to appear when --mint-a is omitted
        #[arg(long, default_value_t = 3600)]
        token_timeout_secs: u64,

        #[arg(long, default_value_t = 10)]
        max_attempts: u32,

        /// Reuse discovery reserves for quoting if younger than this
        #[arg(long, default_value_t = 0)]
        pool_state_max_age_ms: u64,

        /// Account that receives a lamport tip with every swap transaction
        #[arg(long)]
        tip_account: Option<String>,

        #[arg(long, default_value_t = 1_000_000)]
        tip_lamports: u64,
    },
    /// List every live pool for a pair and write it to a JSON file
    FindPools {
        #[arg(long)]
        mint_a: String,

        #[arg(long, default_value_t = NATIVE_MINT.to_string())]
        mint_b: String,

        #[arg(long, default_value = "pools.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let mut config = SwapperConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }

    let configs = match &cli.configs {
        Some(entries) if !entries.is_empty() => parse_config_candidates(entries)?,
        _ => default_config_candidates()?,
    };
    let enumerator = PoolCandidateEnumerator::new(CPMM_PROGRAM_ID, configs);

    match cli.command {
        Command::Swap {
            mint_a,
            mint_b,
            sell_percentage,
            slippage_bps,
            discovery_timeout_secs,
            balance_timeout_secs,
            token_timeout_secs,
            max_attempts,
            pool_state_max_age_ms,
            tip_account,
            tip_lamports,
        } => {
            let payer = keypair_from_env().context("Failed to load wallet")?;
            let ledger = Arc::new(RpcLedger::new(config.ledger_config(), payer));
            logging::log_activity("main", "Wallet", Some(&ledger.payer().to_string()));
            logging::log_activity("main", "RPC", Some(ledger.rpc_url()));

            let tip = match tip_account {
                Some(account) =>
                    Some(TipConfig {
                        account: parse_pubkey(&account)?,
                        lamports: tip_lamports,
                    }),
                None => None,
            };
            let mut orchestrator_config = config.orchestrator_config(tip);
            orchestrator_config.pool_state_max_age = Duration::from_millis(pool_state_max_age_ms);

            let reader: Arc<dyn LedgerReader> = ledger.clone();
            let submitter: Arc<dyn TransactionSubmitter> = ledger.clone();
            let orchestrator = Orchestrator::new(reader, submitter, enumerator, orchestrator_config);

            let mint_b = parse_pubkey(&mint_b)?;
            let mint_a = match mint_a {
                Some(mint) => parse_pubkey(&mint)?,
                None => {
                    let deadline = Deadline::after(Duration::from_secs(token_timeout_secs));
                    match
                        orchestrator
                            .waiter()
                            .wait_for_single_token(&ledger.payer(), &mint_b, deadline).await?
                    {
                        TokenWait::Found(account) => {
                            logging::log_activity(
                                "main",
                                "Detected token",
                                Some(&format!("{} in {}", account.mint, account.account))
                            );
                            account.mint
                        }
                        TokenWait::DeadlineExceeded => {
                            logging::log_activity("main", "No token arrived", Some("exiting"));
                            return Ok(());
                        }
                    }
                }
            };

            let request = SwapRequest {
                mint_a,
                mint_b,
                sell_percentage,
                slippage_bps,
                discovery_deadline: Duration::from_secs(discovery_timeout_secs),
                balance_deadline: Duration::from_secs(balance_timeout_secs),
                max_swap_attempts: max_attempts,
            };

            let outcome = orchestrator.run_swap(&request).await;
            report(&outcome);
            std::process::exit(outcome.exit_code());
        }
        Command::FindPools { mint_a, mint_b, output } => {
            // Reads only; an ephemeral key stands in when no wallet is configured
            let payer = keypair_from_env().unwrap_or_else(|_| Keypair::new());
            let ledger = Arc::new(RpcLedger::new(config.ledger_config(), payer));
            let resolver = swapper::PoolResolver::new(
                ledger,
                enumerator,
                config.orchestrator_config(None).resolver
            );

            let mint_a = parse_pubkey(&mint_a)?;
            let mint_b = parse_pubkey(&mint_b)?;
            let pools = resolver.resolve(&mint_a, &mint_b).await?;

            let listings: Vec<PoolListing> = pools
                .iter()
                .map(|pool| {
                    PoolListing::from_state(
                        pool,
                        resolver.config_label(&pool.amm_config).unwrap_or("unknown")
                    )
                })
                .collect();
            let json = serde_json::to_string_pretty(&listings).context("Failed to encode pools")?;
            std::fs::write(&output, json).context(
                format!("Failed to write {}", output.display())
            )?;

            logging::log_stats(
                "main",
                "Pools written",
                &format!("{} pools to {}", listings.len(), output.display())
            );
        }
    }

    Ok(())
}

fn report(outcome: &SwapOutcome) {
    match outcome {
        SwapOutcome::SwapExhausted(attempts) => {
            for attempt in attempts {
                logging::log_activity(
                    "main",
                    &format!("Attempt {}", attempt.attempt_number),
                    attempt.failure_reason()
                );
            }
            logging::log_activity("main", "Result", Some(&outcome.to_string()));
        }
        _ => logging::log_activity("main", "Result", Some(&outcome.to_string())),
    }
}
