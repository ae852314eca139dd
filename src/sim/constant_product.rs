//! Constant-Product Swap Simulation (V2-style pools)
//!
//! Formula: amountOut = (amountIn * (1e6 - feePpm) * reserveOut)
//!                    / (reserveIn * 1e6 + amountIn * (1e6 - feePpm))
//! Post-swap: reserveIn += amountIn, reserveOut -= amountOut (fee stays
//! in the pool, so the product never decreases).
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use super::{leg_result, normalize, LegDirection};
use crate::error::SimError;
use crate::types::{PoolSnapshot, PoolState, SwapLegResult};
use alloy::primitives::U256;

const FEE_DENOMINATOR: u64 = 1_000_000;

pub(crate) fn simulate(
    state: &PoolState,
    fee_ppm: u32,
    direction: LegDirection,
    amount_in: U256,
    invert: bool,
) -> Result<SwapLegResult, SimError> {
    let (reserve0, reserve1) = match state.snapshot {
        PoolSnapshot::ConstantProduct { reserve0, reserve1 } => (reserve0, reserve1),
        _ => return Err(SimError::ZeroLiquidity { pool: state.address }),
    };

    let (reserve_in, reserve_out, dec_in, dec_out) = match direction {
        LegDirection::Forward => (reserve0, reserve1, state.decimals0, state.decimals1),
        LegDirection::Reverse => (reserve1, reserve0, state.decimals1, state.decimals0),
    };

    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(SimError::ZeroLiquidity { pool: state.address });
    }

    let fee_numerator = U256::from(FEE_DENOMINATOR - fee_ppm as u64);
    let arithmetic = || SimError::Arithmetic { pool: state.address };

    let amount_in_with_fee = amount_in.checked_mul(fee_numerator).ok_or_else(arithmetic)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or_else(arithmetic)?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR))
        .ok_or_else(arithmetic)?
        .checked_add(amount_in_with_fee)
        .ok_or_else(arithmetic)?;
    let amount_out = numerator / denominator;

    // Post-swap reserves: the full input (fee included) joins the pool
    let reserve_in_after = reserve_in.checked_add(amount_in).ok_or_else(arithmetic)?;
    let reserve_out_after = reserve_out.checked_sub(amount_out).ok_or_else(arithmetic)?;

    let price_before = normalize(reserve_out, dec_out) / normalize(reserve_in, dec_in);
    let price_after =
        normalize(reserve_out_after, dec_out) / normalize(reserve_in_after, dec_in);

    Ok(leg_result(price_before, price_after, amount_out, invert))
}
