//! Swap Leg Simulation
//!
//! Purpose:
//!     Estimate the outcome of routing an input amount through a single
//!     pool: output amount, price before/after, and price impact. Both
//!     AMM kinds (constant product, concentrated liquidity) produce the
//!     same `SwapLegResult` shape so the engine treats them uniformly.
//!
//! Author: AI-Generated
//! Created: 2026-02-03
//!
//! Notes:
//!     - All reserve/amount arithmetic is U256 in token base units;
//!       f64 appears only in the final price fields.
//!     - Prices are output-per-input, decimal-adjusted; the `invert`
//!       flag flips the ratio for chained legs.

use crate::error::SimError;
use crate::types::{PoolDescriptor, PoolSnapshot, PoolState, SwapLegResult};
use alloy::primitives::U256;

pub mod concentrated;
pub mod constant_product;

/// Which on-chain token is the input of a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegDirection {
    /// token0 in, token1 out
    Forward,
    /// token1 in, token0 out
    Reverse,
}

/// Simulate one swap leg through `state`, dispatching on the AMM kind.
///
/// Fails with `PoolMismatch` if the descriptor's declared pair matches
/// neither the on-chain token order nor its reverse.
pub fn simulate_leg(
    descriptor: &PoolDescriptor,
    state: &PoolState,
    direction: LegDirection,
    amount_in: U256,
    invert: bool,
) -> Result<SwapLegResult, SimError> {
    verify_orientation(descriptor, state)?;

    match state.snapshot {
        PoolSnapshot::ConstantProduct { .. } => {
            constant_product::simulate(state, descriptor.fee_ppm, direction, amount_in, invert)
        }
        PoolSnapshot::ConcentratedLiquidity { .. } => {
            concentrated::simulate(state, descriptor.fee_ppm, direction, amount_in, invert)
        }
    }
}

/// Check that the declared trading pair matches the pool's on-chain
/// tokens in either order.
pub fn verify_orientation(
    descriptor: &PoolDescriptor,
    state: &PoolState,
) -> Result<(), SimError> {
    let aligned =
        descriptor.token_a == state.token0 && descriptor.token_b == state.token1;
    let reversed =
        descriptor.token_a == state.token1 && descriptor.token_b == state.token0;

    if aligned || reversed {
        Ok(())
    } else {
        Err(SimError::PoolMismatch {
            pool: descriptor.address,
            declared_a: descriptor.token_a,
            declared_b: descriptor.token_b,
            token0: state.token0,
            token1: state.token1,
        })
    }
}

/// Convert a U256 to f64 via decimal string parse.
///
/// Handles values beyond u128 range; precision-lossy by nature, which is
/// acceptable at the price display boundary only.
pub(crate) fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

/// Base-unit integer → human-scale decimal: x / 10^d
pub(crate) fn normalize(value: U256, decimals: u8) -> f64 {
    u256_to_f64(value) / 10_f64.powi(decimals as i32)
}

/// Human-scale amount → base-unit integer: x * 10^d
pub fn to_base_units(amount: f64, decimals: u8) -> U256 {
    let scaled = amount * 10_f64.powi(decimals as i32);
    if scaled <= 0.0 {
        return U256::ZERO;
    }
    U256::from(scaled as u128)
}

/// Price impact in percent: |after/before - 1| * 100, never negative
pub(crate) fn price_impact_percent(price_before: f64, price_after: f64) -> f64 {
    if price_before == 0.0 {
        return 0.0;
    }
    ((price_after / price_before) - 1.0).abs() * 100.0
}

/// Assemble the common leg result from computed prices and output
pub(crate) fn leg_result(
    price_before: f64,
    price_after: f64,
    amount_out: U256,
    invert: bool,
) -> SwapLegResult {
    let (before, after) = if invert {
        (
            if price_before == 0.0 { 0.0 } else { 1.0 / price_before },
            if price_after == 0.0 { 0.0 } else { 1.0 / price_after },
        )
    } else {
        (price_before, price_after)
    };

    SwapLegResult {
        price_before: before,
        price_after: after,
        average_price: (before + after) / 2.0,
        price_impact_percent: price_impact_percent(before, after),
        amount_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AmmKind;
    use alloy::primitives::Address;

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    fn state_with_tokens(token0: Address, token1: Address) -> PoolState {
        PoolState {
            address: addr(9),
            token0,
            token1,
            decimals0: 18,
            decimals1: 18,
            snapshot: PoolSnapshot::ConstantProduct {
                reserve0: U256::from(1_000_000u64),
                reserve1: U256::from(1_000_000u64),
            },
            block_height: 1,
        }
    }

    #[test]
    fn test_orientation_aligned_and_reversed() {
        let desc = PoolDescriptor::new(
            addr(9),
            addr(1),
            addr(2),
            AmmKind::V2,
            3000,
            "Test".to_string(),
        );

        assert!(verify_orientation(&desc, &state_with_tokens(addr(1), addr(2))).is_ok());
        assert!(verify_orientation(&desc, &state_with_tokens(addr(2), addr(1))).is_ok());
    }

    #[test]
    fn test_orientation_mismatch() {
        let desc = PoolDescriptor::new(
            addr(9),
            addr(1),
            addr(2),
            AmmKind::V2,
            3000,
            "Test".to_string(),
        );

        let err = verify_orientation(&desc, &state_with_tokens(addr(3), addr(4)));
        assert!(matches!(err, Err(SimError::PoolMismatch { .. })));
    }

    #[test]
    fn test_u256_f64_roundtrip_scale() {
        let one_e18 = U256::from(10u64).pow(U256::from(18));
        assert!((u256_to_f64(one_e18) - 1e18).abs() < 1e6);
        assert!((normalize(one_e18, 18) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(
            to_base_units(1.0, 18),
            U256::from(10u64).pow(U256::from(18))
        );
        assert_eq!(to_base_units(0.0, 18), U256::ZERO);
        assert_eq!(to_base_units(1000.0, 6), U256::from(1_000_000_000u64));
    }

    #[test]
    fn test_impact_never_negative() {
        assert!(price_impact_percent(100.0, 99.0) > 0.0);
        assert!(price_impact_percent(99.0, 100.0) > 0.0);
        assert_eq!(price_impact_percent(100.0, 100.0), 0.0);
        assert_eq!(price_impact_percent(0.0, 100.0), 0.0);
    }
}
