use crate::error::{ SwapError, SwapResult };
use crate::models::swap::SwapQuote;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Price an exact-in swap against a constant-product pool.
///
/// The fee is taken from the input first, then the remainder moves along
/// `reserve_in * reserve_out = k`. Everything is integer math (u128
/// intermediates) so the result tracks the program's own accounting.
pub fn quote(
    input_amount: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_rate_bps: u64
) -> SwapResult<SwapQuote> {
    if input_amount == 0 {
        return Err(SwapError::InvalidQuote("input amount is zero".to_string()));
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(
            SwapError::InvalidQuote(
                format!("pool reserves must be non-zero (in: {}, out: {})", reserve_in, reserve_out)
            )
        );
    }
    if fee_rate_bps >= BPS_DENOMINATOR {
        return Err(
            SwapError::InvalidQuote(format!("fee rate {} bps leaves nothing to trade", fee_rate_bps))
        );
    }

    let fee_amount = (((input_amount as u128) * (fee_rate_bps as u128)) /
        (BPS_DENOMINATOR as u128)) as u64;
    let effective_input = input_amount - fee_amount;

    let reserve_in_wide = reserve_in as u128;
    let reserve_out_wide = reserve_out as u128;
    let invariant = reserve_in_wide * reserve_out_wide;
    let new_reserve_in = reserve_in_wide + (effective_input as u128);
    let new_reserve_out = invariant / new_reserve_in;

    // Floor division can round the remaining reserve down to zero on tiny pools
    let output_amount = (reserve_out_wide - new_reserve_out).min(reserve_out_wide - 1) as u64;

    let price_impact_bps = (((effective_input as u128) * (BPS_DENOMINATOR as u128)) /
        new_reserve_in) as u64;

    Ok(SwapQuote {
        input_amount,
        output_amount,
        fee_amount,
        effective_input,
        price_impact_bps,
    })
}

/// Smallest output still accepted after applying `slippage_bps` to a quote
pub fn minimum_output(output_amount: u64, slippage_bps: u64) -> SwapResult<u64> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(
            SwapError::InvalidInput(format!("slippage {} bps exceeds 100%", slippage_bps))
        );
    }
    let kept = (BPS_DENOMINATOR - slippage_bps) as u128;
    Ok((((output_amount as u128) * kept) / (BPS_DENOMINATOR as u128)) as u64)
}
