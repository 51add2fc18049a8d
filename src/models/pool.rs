use serde::{ Deserialize, Serialize };
use solana_sdk::pubkey::Pubkey;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{ SwapError, SwapResult };

/// Parse a base58 token or account address
pub fn parse_pubkey(value: &str) -> SwapResult<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|e|
        SwapError::InvalidInput(format!("invalid address {}: {}", value, e))
    )
}

/// Build an address from raw bytes, rejecting anything that is not 32 bytes long
pub fn pubkey_from_slice(bytes: &[u8]) -> SwapResult<Pubkey> {
    Pubkey::try_from(bytes).map_err(|_|
        SwapError::InvalidInput(format!("expected 32-byte identifier, got {} bytes", bytes.len()))
    )
}

/// An AMM configuration a pool may have been created under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolConfigCandidate {
    pub address: Pubkey,
    pub label: String,
}

impl PoolConfigCandidate {
    pub fn new(address: Pubkey, label: impl Into<String>) -> Self {
        Self { address, label: label.into() }
    }
}

/// Order two mints by their raw bytes; the smaller one is token0
pub fn canonical_order(mint_a: &Pubkey, mint_b: &Pubkey) -> (Pubkey, Pubkey) {
    match mint_a.to_bytes().cmp(&mint_b.to_bytes()) {
        Ordering::Greater => (*mint_b, *mint_a),
        _ => (*mint_a, *mint_b),
    }
}

/// Which side of the canonical pair is being sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Selling token0 (base) for token1 (quote)
    BaseToQuote,
    /// Selling token1 (quote) for token0 (base)
    QuoteToBase,
}

impl SwapDirection {
    /// Direction for selling `input_mint` against `other_mint`, from the canonical ordering
    pub fn for_input(input_mint: &Pubkey, other_mint: &Pubkey) -> Self {
        let (token0, _) = canonical_order(input_mint, other_mint);
        if token0 == *input_mint { SwapDirection::BaseToQuote } else { SwapDirection::QuoteToBase }
    }

    pub fn is_base_in(&self) -> bool {
        matches!(self, SwapDirection::BaseToQuote)
    }
}

/// On-chain accounts a swap instruction needs besides the pool itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolKeys {
    pub token_0_mint: Pubkey,
    pub token_1_mint: Pubkey,
    pub token_0_vault: Pubkey,
    pub token_1_vault: Pubkey,
    pub token_0_program: Pubkey,
    pub token_1_program: Pubkey,
    pub observation_key: Pubkey,
}

/// Snapshot of a live pool. Re-read whenever fresh reserves are needed.
///
/// `base_reserve`/`quote_reserve` follow the pool's stored token0/token1,
/// which is not necessarily the byte order of the mints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub address: Pubkey,
    pub amm_config: Pubkey,
    /// Token0 side reserve
    pub base_reserve: u64,
    /// Token1 side reserve
    pub quote_reserve: u64,
    pub fee_rate_bps: u64,
    pub keys: PoolKeys,
}

impl PoolState {
    /// Reserves as (input side, output side) for the given direction
    pub fn reserves_for(&self, direction: SwapDirection) -> (u64, u64) {
        match direction {
            SwapDirection::BaseToQuote => (self.base_reserve, self.quote_reserve),
            SwapDirection::QuoteToBase => (self.quote_reserve, self.base_reserve),
        }
    }

    /// Direction that sells `input_mint` into this pool, from the pool's own
    /// token0/token1 layout. `None` if the pool does not trade that mint.
    pub fn direction_for(&self, input_mint: &Pubkey) -> Option<SwapDirection> {
        if self.keys.token_0_mint == *input_mint {
            Some(SwapDirection::BaseToQuote)
        } else if self.keys.token_1_mint == *input_mint {
            Some(SwapDirection::QuoteToBase)
        } else {
            None
        }
    }

    /// Reserve held on the side of `mint`, if the pool trades it
    pub fn reserve_of(&self, mint: &Pubkey) -> Option<u64> {
        if self.keys.token_0_mint == *mint {
            Some(self.base_reserve)
        } else if self.keys.token_1_mint == *mint {
            Some(self.quote_reserve)
        } else {
            None
        }
    }

    /// Token program owning the mint that is sold in `direction`
    pub fn input_token_program(&self, direction: SwapDirection) -> Pubkey {
        match direction {
            SwapDirection::BaseToQuote => self.keys.token_0_program,
            SwapDirection::QuoteToBase => self.keys.token_1_program,
        }
    }
}

/// One derived address to probe during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCandidate {
    /// Position of the config in the candidate list, used for tie-breaking
    pub config_index: usize,
    pub config: PoolConfigCandidate,
    pub mint_x: Pubkey,
    pub mint_y: Pubkey,
    pub address: Pubkey,
}

/// Flat listing entry for a discovered pool, written out by `find-pools`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolListing {
    pub pool_id: String,
    pub config: String,
    pub config_label: String,
    pub token_0_mint: String,
    pub token_1_mint: String,
    pub base_reserve: String,
    pub quote_reserve: String,
    pub fee_rate_bps: u64,
}

impl PoolListing {
    pub fn from_state(state: &PoolState, config_label: &str) -> Self {
        Self {
            pool_id: state.address.to_string(),
            config: state.amm_config.to_string(),
            config_label: config_label.to_string(),
            token_0_mint: state.keys.token_0_mint.to_string(),
            token_1_mint: state.keys.token_1_mint.to_string(),
            base_reserve: state.base_reserve.to_string(),
            quote_reserve: state.quote_reserve.to_string(),
            fee_rate_bps: state.fee_rate_bps,
        }
    }
}
