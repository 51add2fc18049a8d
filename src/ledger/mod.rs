pub mod rpc;

use async_trait::async_trait;
use mockall::automock;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::error::LedgerError;
use crate::models::pool::PoolState;

pub use rpc::{ RpcLedger, RpcLedgerConfig };

/// A token account held by a wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTokenAccount {
    pub account: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

/// Read access to ledger state.
///
/// Absence is reported as `Ok(None)`. Implementations must map throttling to
/// `LedgerError::RateLimited` so callers never look at transport text.
#[automock]
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Token balance of `account`, or `None` if the account does not exist
    async fn get_account_balance(&self, account: &Pubkey) -> Result<Option<u64>, LedgerError>;

    /// Pool snapshot at `address`, or `None` if no pool lives there
    async fn get_pool_state(&self, address: &Pubkey) -> Result<Option<PoolState>, LedgerError>;

    /// Token accounts held by `owner`
    async fn get_owned_tokens(&self, owner: &Pubkey) -> Result<Vec<OwnedTokenAccount>, LedgerError>;
}

/// Signs, broadcasts and waits for finality of a transaction
#[automock]
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Fee payer and signer of submitted transactions
    fn payer(&self) -> Pubkey;

    async fn submit_and_confirm(
        &self,
        instructions: Vec<Instruction>
    ) -> Result<Signature, LedgerError>;
}
