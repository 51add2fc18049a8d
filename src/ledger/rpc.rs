use async_trait::async_trait;
use solana_account_decoder::UiAccountData;
use solana_client::{
    client_error::{ ClientError, ClientErrorKind },
    nonblocking::rpc_client::RpcClient,
    rpc_request::{ RpcError, TokenAccountsFilter },
    rpc_response::RpcKeyedAccount,
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{ Keypair, Signature, Signer },
    transaction::Transaction,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::LedgerError;
use crate::ledger::{ LedgerReader, OwnedTokenAccount, TransactionSubmitter };
use crate::models::pool::{ PoolKeys, PoolState };
use crate::models::raydium::{ token_account_amount, AmmConfigAccount, CpmmPoolAccount, CPMM_PROGRAM_ID };
use crate::models::spl::{ TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID };
use crate::utils::deadline::Deadline;
use crate::utils::logging;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Configuration for the RPC-backed ledger
#[derive(Debug, Clone)]
pub struct RpcLedgerConfig {
    /// Solana RPC URL
    pub rpc_url: String,
    /// Commitment used for reads and confirmation
    pub commitment: CommitmentConfig,
    /// How long to wait for a sent transaction to confirm
    pub confirm_timeout: Duration,
    /// Delay between signature status checks
    pub confirm_poll_interval: Duration,
}

impl Default for RpcLedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
            confirm_timeout: Duration::from_secs(60),
            confirm_poll_interval: Duration::from_millis(500),
        }
    }
}

/// Ledger reader and transaction submitter over Solana JSON-RPC
pub struct RpcLedger {
    config: RpcLedgerConfig,
    rpc_client: RpcClient,
    payer: Keypair,
}

impl RpcLedger {
    pub fn new(config: RpcLedgerConfig, payer: Keypair) -> Self {
        let rpc_client = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);

        Self {
            config,
            rpc_client,
            payer,
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    async fn wait_for_confirmation(&self, signature: &Signature) -> Result<(), LedgerError> {
        let deadline = Deadline::after(self.config.confirm_timeout);

        loop {
            match self.rpc_client.get_signature_status(signature).await {
                Ok(Some(Ok(()))) => {
                    return Ok(());
                }
                Ok(Some(Err(e))) => {
                    return Err(LedgerError::Submission(format!("{} failed: {}", signature, e)));
                }
                Ok(None) => {}
                Err(e) => {
                    let err = classify_client_error(&e);
                    if !err.is_rate_limited() {
                        logging::log_error("rpc", "Signature status check failed", &err);
                    }
                }
            }

            if deadline.is_expired() {
                return Err(
                    LedgerError::ConfirmationTimeout(
                        format!(
                            "{} not confirmed within {} ms",
                            signature,
                            self.config.confirm_timeout.as_millis()
                        )
                    )
                );
            }
            deadline.sleep(self.config.confirm_poll_interval).await;
        }
    }
}

#[async_trait]
impl LedgerReader for RpcLedger {
    async fn get_account_balance(&self, account: &Pubkey) -> Result<Option<u64>, LedgerError> {
        let response = self.rpc_client
            .get_account_with_commitment(account, self.config.commitment).await
            .map_err(|e| classify_client_error(&e))?;

        match response.value {
            Some(account_data) => token_balance(account, &account_data).map(Some),
            None => Ok(None),
        }
    }

    async fn get_pool_state(&self, address: &Pubkey) -> Result<Option<PoolState>, LedgerError> {
        let response = self.rpc_client
            .get_account_with_commitment(address, self.config.commitment).await
            .map_err(|e| classify_client_error(&e))?;

        let pool = match response.value {
            Some(account) if account.owner == CPMM_PROGRAM_ID => CpmmPoolAccount::decode(&account.data),
            _ => None,
        };
        let Some(pool) = pool else {
            return Ok(None);
        };

        let related = self.rpc_client
            .get_multiple_accounts(&[pool.amm_config, pool.token_0_vault, pool.token_1_vault]).await
            .map_err(|e| classify_client_error(&e))?;

        let config = related
            .first()
            .and_then(|account| account.as_ref())
            .and_then(|account| AmmConfigAccount::decode(&account.data))
            .ok_or_else(|| LedgerError::Read(format!("missing amm config {}", pool.amm_config)))?;
        let vault_amount = |index: usize, vault: &Pubkey| {
            related
                .get(index)
                .and_then(|account| account.as_ref())
                .and_then(|account| token_account_amount(&account.data))
                .ok_or_else(|| LedgerError::Read(format!("missing pool vault {}", vault)))
        };
        let vault_0 = vault_amount(1, &pool.token_0_vault)?;
        let vault_1 = vault_amount(2, &pool.token_1_vault)?;
        let (base_reserve, quote_reserve) = pool.reserves(vault_0, vault_1);

        Ok(
            Some(PoolState {
                address: *address,
                amm_config: pool.amm_config,
                base_reserve,
                quote_reserve,
                fee_rate_bps: config.fee_rate_bps(),
                keys: PoolKeys {
                    token_0_mint: pool.token_0_mint,
                    token_1_mint: pool.token_1_mint,
                    token_0_vault: pool.token_0_vault,
                    token_1_vault: pool.token_1_vault,
                    token_0_program: pool.token_0_program,
                    token_1_program: pool.token_1_program,
                    observation_key: pool.observation_key,
                },
            })
        )
    }

    async fn get_owned_tokens(&self, owner: &Pubkey) -> Result<Vec<OwnedTokenAccount>, LedgerError> {
        let accounts = self.rpc_client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(TOKEN_PROGRAM_ID)).await
            .map_err(|e| classify_client_error(&e))?;

        Ok(accounts.iter().filter_map(parse_keyed_token_account).collect())
    }
}

#[async_trait]
impl TransactionSubmitter for RpcLedger {
    fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    async fn submit_and_confirm(
        &self,
        instructions: Vec<Instruction>
    ) -> Result<Signature, LedgerError> {
        let blockhash = self.rpc_client
            .get_latest_blockhash().await
            .map_err(|e| classify_client_error(&e))?;

        let transaction = Transaction::new_signed_with_payer(
            &instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash
        );

        let signature = self.rpc_client.send_transaction(&transaction).await.map_err(|e| {
            match classify_client_error(&e) {
                LedgerError::Read(reason) => LedgerError::Submission(reason),
                other => other,
            }
        })?;

        logging::log_activity("rpc", "Transaction sent", Some(&signature.to_string()));
        self.wait_for_confirmation(&signature).await?;
        Ok(signature)
    }
}

/// Map a client error onto the ledger taxonomy using its structured kind
pub fn classify_client_error(err: &ClientError) -> LedgerError {
    let rate_limited = match err.kind() {
        ClientErrorKind::Reqwest(e) =>
            e.status().map(|status| status.as_u16()) == Some(HTTP_TOO_MANY_REQUESTS),
        ClientErrorKind::RpcError(RpcError::RpcResponseError { code, .. }) =>
            *code == i64::from(HTTP_TOO_MANY_REQUESTS),
        _ => false,
    };

    if rate_limited {
        LedgerError::RateLimited
    } else {
        LedgerError::Read(err.to_string())
    }
}

/// Amount held by a token account; anything not owned by a token program is refused
pub fn token_balance(address: &Pubkey, account: &Account) -> Result<u64, LedgerError> {
    if account.owner != TOKEN_PROGRAM_ID && account.owner != TOKEN_2022_PROGRAM_ID {
        return Err(
            LedgerError::Read(format!("{} is owned by {}, not a token program", address, account.owner))
        );
    }
    token_account_amount(&account.data).ok_or_else(||
        LedgerError::Read(format!("{} is too short for a token account", address))
    )
}

/// Pull mint and amount out of a jsonParsed token account
fn parse_keyed_token_account(keyed: &RpcKeyedAccount) -> Option<OwnedTokenAccount> {
    let UiAccountData::Json(parsed) = &keyed.account.data else {
        return None;
    };
    let info = parsed.parsed.get("info")?;
    let mint = Pubkey::from_str(info.get("mint")?.as_str()?).ok()?;
    let amount = info.get("tokenAmount")?.get("amount")?.as_str()?.parse::<u64>().ok()?;

    Some(OwnedTokenAccount {
        account: Pubkey::from_str(&keyed.pubkey).ok()?,
        mint,
        amount,
    })
}
