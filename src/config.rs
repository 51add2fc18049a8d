use anyhow::{ anyhow, Context, Result };
use solana_sdk::signature::Keypair;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::balance_waiter::WaiterConfig;
use crate::ledger::RpcLedgerConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::pool::resolver::ResolverConfig;
use crate::swap_executor::{ ExecutorConfig, TipConfig };

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Runtime configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct SwapperConfig {
    pub rpc_url: String,
    pub poll_interval: Duration,
    pub rate_limit_backoff: Duration,
    pub retry_delay: Duration,
    pub confirm_timeout: Duration,
}

impl SwapperConfig {
    /// Create a new SwapperConfig from environment variables
    pub fn from_env() -> Result<Self> {
        // Public endpoints throttle aggressively; set RPC_ENDPOINT for real use
        let rpc_url = env::var("RPC_ENDPOINT").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        Ok(Self {
            rpc_url,
            poll_interval: Duration::from_millis(env_or("SWAPPER_POLL_INTERVAL_MS", 1000)?),
            rate_limit_backoff: Duration::from_millis(env_or("SWAPPER_RATE_LIMIT_BACKOFF_MS", 2000)?),
            retry_delay: Duration::from_millis(env_or("SWAPPER_RETRY_DELAY_MS", 1000)?),
            confirm_timeout: Duration::from_secs(env_or("SWAPPER_CONFIRM_TIMEOUT_SECS", 60)?),
        })
    }

    pub fn ledger_config(&self) -> RpcLedgerConfig {
        RpcLedgerConfig {
            rpc_url: self.rpc_url.clone(),
            confirm_timeout: self.confirm_timeout,
            ..RpcLedgerConfig::default()
        }
    }

    pub fn orchestrator_config(&self, tip: Option<TipConfig>) -> OrchestratorConfig {
        OrchestratorConfig {
            resolver: ResolverConfig {
                rate_limit_backoff: self.rate_limit_backoff,
                ..ResolverConfig::default()
            },
            waiter: WaiterConfig {
                poll_interval: self.poll_interval,
                rate_limit_backoff: self.rate_limit_backoff,
            },
            executor: ExecutorConfig {
                retry_delay: self.retry_delay,
                rate_limit_backoff: self.rate_limit_backoff,
                tip,
                ..ExecutorConfig::default()
            },
            ..OrchestratorConfig::default()
        }
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T> where T: FromStr, T::Err: std::fmt::Display {
    match env::var(name) {
        Ok(value) => value.parse::<T>().map_err(|e| anyhow!("Invalid {} value: {}", name, e)),
        Err(_) => Ok(default),
    }
}

/// Decode a wallet secret given either as base58 or as a JSON byte array
pub fn parse_keypair(secret: &str) -> Result<Keypair> {
    let secret = secret.trim();
    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret).context("WALLET_SECRET is not a valid JSON byte array")?
    } else {
        bs58::decode(secret).into_vec().context("WALLET_SECRET is not valid base58")?
    };

    Keypair::from_bytes(&bytes).map_err(|e| anyhow!("WALLET_SECRET is not a valid keypair: {}", e))
}

/// Load the wallet keypair from `WALLET_SECRET`
pub fn keypair_from_env() -> Result<Keypair> {
    let secret = env::var("WALLET_SECRET").context("WALLET_SECRET environment variable not set")?;
    parse_keypair(&secret)
}
