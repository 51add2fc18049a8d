use solana_sdk::pubkey::Pubkey;

use crate::error::SwapResult;
use crate::models::pool::pubkey_from_slice;
use crate::models::raydium::{ AUTHORITY_SEED, POOL_SEED };

/// Derive the pool address for one (config, mint order) combination.
///
/// The mint order is part of the seed, so `(x, y)` and `(y, x)` give
/// different addresses. Only a successful read of live state at the address
/// proves which order a pool was actually created with.
pub fn derive_pool_address(
    program_id: &Pubkey,
    config: &Pubkey,
    mint_x: &Pubkey,
    mint_y: &Pubkey
) -> Pubkey {
    Pubkey::find_program_address(
        &[POOL_SEED, config.as_ref(), mint_x.as_ref(), mint_y.as_ref()],
        program_id
    ).0
}

/// Same as [`derive_pool_address`] for raw identifiers, which must be 32 bytes each
pub fn derive_pool_address_from_bytes(
    program_id: &[u8],
    config: &[u8],
    mint_x: &[u8],
    mint_y: &[u8]
) -> SwapResult<Pubkey> {
    Ok(
        derive_pool_address(
            &pubkey_from_slice(program_id)?,
            &pubkey_from_slice(config)?,
            &pubkey_from_slice(mint_x)?,
            &pubkey_from_slice(mint_y)?
        )
    )
}

/// Signing authority the program uses for its vaults
pub fn pool_authority(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[AUTHORITY_SEED], program_id).0
}
