use borsh::{ BorshDeserialize, BorshSerialize };
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

use crate::error::{ SwapError, SwapResult };
use crate::models::pool::pubkey_from_slice;

// Raydium CPMM program and account discriminators
pub const CPMM_PROGRAM_ID: Pubkey = pubkey!("CPMMoo8L3F4NBTegBCKVNunggL7H1ZpdTHKxQB5qKP1C");
pub const POOL_STATE_DISCRIMINATOR: [u8; 8] = [247, 237, 227, 245, 215, 195, 222, 70];
pub const AMM_CONFIG_DISCRIMINATOR: [u8; 8] = [218, 244, 33, 104, 203, 203, 43, 111];
pub const SWAP_BASE_INPUT_DISCRIMINATOR: [u8; 8] = [143, 190, 90, 218, 196, 30, 51, 222];

pub const POOL_SEED: &[u8] = b"pool";
pub const AUTHORITY_SEED: &[u8] = b"vault_and_lp_mint_auth_seed";

pub const POOL_STATE_LEN: usize = 637;

/// On-chain fee rates are expressed per million
pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

// SPL token account layout: mint (32) | owner (32) | amount (8) | ...
const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;

/// Decoded CPMM pool account.
///
/// Field offsets follow the Anchor layout: an 8-byte discriminator, ten
/// pubkeys, five u8 fields, then the u64 counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpmmPoolAccount {
    pub amm_config: Pubkey,
    pub pool_creator: Pubkey,
    pub token_0_vault: Pubkey,
    pub token_1_vault: Pubkey,
    pub lp_mint: Pubkey,
    pub token_0_mint: Pubkey,
    pub token_1_mint: Pubkey,
    pub token_0_program: Pubkey,
    pub token_1_program: Pubkey,
    pub observation_key: Pubkey,
    pub auth_bump: u8,
    pub status: u8,
    pub lp_mint_decimals: u8,
    pub mint_0_decimals: u8,
    pub mint_1_decimals: u8,
    pub lp_supply: u64,
    pub protocol_fees_token_0: u64,
    pub protocol_fees_token_1: u64,
    pub fund_fees_token_0: u64,
    pub fund_fees_token_1: u64,
    pub open_time: u64,
    pub recent_epoch: u64,
}

impl CpmmPoolAccount {
    /// Decode a pool account. Returns `None` when the bytes are not a CPMM pool.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < POOL_STATE_LEN || data[..8] != POOL_STATE_DISCRIMINATOR {
            return None;
        }

        let key = |index: usize| {
            let start = 8 + index * 32;
            pubkey_from_slice(&data[start..start + 32]).ok()
        };
        let byte = |offset: usize| data[offset];
        let word = |index: usize| read_u64(data, 333 + index * 8);

        Some(Self {
            amm_config: key(0)?,
            pool_creator: key(1)?,
            token_0_vault: key(2)?,
            token_1_vault: key(3)?,
            lp_mint: key(4)?,
            token_0_mint: key(5)?,
            token_1_mint: key(6)?,
            token_0_program: key(7)?,
            token_1_program: key(8)?,
            observation_key: key(9)?,
            auth_bump: byte(328),
            status: byte(329),
            lp_mint_decimals: byte(330),
            mint_0_decimals: byte(331),
            mint_1_decimals: byte(332),
            lp_supply: word(0)?,
            protocol_fees_token_0: word(1)?,
            protocol_fees_token_1: word(2)?,
            fund_fees_token_0: word(3)?,
            fund_fees_token_1: word(4)?,
            open_time: word(5)?,
            recent_epoch: word(6)?,
        })
    }

    /// Tradable reserves: vault balances minus fees owed to the protocol and fund
    pub fn reserves(&self, vault_0_amount: u64, vault_1_amount: u64) -> (u64, u64) {
        let fees_0 = self.protocol_fees_token_0.saturating_add(self.fund_fees_token_0);
        let fees_1 = self.protocol_fees_token_1.saturating_add(self.fund_fees_token_1);
        (vault_0_amount.saturating_sub(fees_0), vault_1_amount.saturating_sub(fees_1))
    }
}

/// Leading fields of the CPMM `AmmConfig` account
#[derive(BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct AmmConfigAccount {
    pub bump: u8,
    pub disable_create_pool: bool,
    pub index: u16,
    pub trade_fee_rate: u64,
    pub protocol_fee_rate: u64,
    pub fund_fee_rate: u64,
    pub create_pool_fee: u64,
}

impl AmmConfigAccount {
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < 8 || data[..8] != AMM_CONFIG_DISCRIMINATOR {
            return None;
        }
        let mut body = &data[8..];
        Self::deserialize(&mut body).ok()
    }

    /// Trade fee converted from parts-per-million to basis points
    pub fn fee_rate_bps(&self) -> u64 {
        self.trade_fee_rate / (FEE_RATE_DENOMINATOR / 10_000)
    }
}

/// Arguments of the `swap_base_input` instruction
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapBaseInputArgs {
    pub amount_in: u64,
    pub minimum_amount_out: u64,
}

impl SwapBaseInputArgs {
    /// Discriminator followed by the Borsh-encoded arguments
    pub fn instruction_data(&self) -> SwapResult<Vec<u8>> {
        let mut data = SWAP_BASE_INPUT_DISCRIMINATOR.to_vec();
        self.serialize(&mut data).map_err(|e|
            SwapError::InvalidInput(format!("failed to encode swap arguments: {}", e))
        )?;
        Ok(data)
    }
}

/// Read the amount field of an SPL token account
pub fn token_account_amount(data: &[u8]) -> Option<u64> {
    read_u64(data, TOKEN_ACCOUNT_AMOUNT_OFFSET)
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes: [u8; 8] = data.get(offset..offset + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
