//! Profit Evaluation
//!
//! Combines simulated swap legs, the traded legs' fee schedule, and a
//! USD gas-cost estimate into a profit/ROI verdict for a candidate path.
//!
//! Units: `fee_total` is in percentage points (feeRate * 100 summed over
//! the two traded legs); `price_difference`, `gas_cost_usd` and
//! `profit_usd` share the sell leg's quote-token scale.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use crate::types::SwapLegResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Fixed gas-limit assumption for a three-leg arbitrage transaction
pub const DEFAULT_GAS_LIMIT: u64 = 250_000;

/// Scored outcome of one candidate path
#[derive(Debug, Clone)]
pub struct EvaluatedPath {
    pub price_difference: f64,
    pub fee_total: f64,
    pub gas_cost_usd: f64,
    pub profit_usd: f64,
    pub roi_percent: f64,
    pub price_impact_percent: f64,
    pub is_profitable: bool,
}

/// USD cost of the transaction: gasPriceGwei * gasLimit * tokenUsd / 1e9.
///
/// Computed in `Decimal` and converted to f64 once at the end.
pub fn gas_cost_usd(gas_price_gwei: Decimal, gas_limit: u64, token_usd_price: Decimal) -> f64 {
    let wei_per_gwei = Decimal::from(1_000_000_000u64);
    let cost = gas_price_gwei * Decimal::from(gas_limit) * token_usd_price / wei_per_gwei;
    cost.to_f64().unwrap_or(0.0)
}

/// Score a closed path from its simulated legs.
///
/// `profit_usd = price_difference - gas_cost_usd - fee_total` is a
/// correctness invariant, not just a derivation. The optional
/// intermediate leg contributes to the aggregate price impact (used as a
/// ranking tiebreak) but not to the profit formula.
pub fn evaluate_path(
    sell: &SwapLegResult,
    buy: &SwapLegResult,
    intermediate: Option<&SwapLegResult>,
    fee_rate_b: f64,
    fee_rate_c: f64,
    gas_cost_usd: f64,
    loan_amount: f64,
) -> EvaluatedPath {
    let price_difference = sell.average_price - buy.average_price;
    let fee_total = (fee_rate_b + fee_rate_c) * 100.0;
    let profit_usd = price_difference - gas_cost_usd - fee_total;

    let loan_value = loan_amount * sell.price_before;
    let roi_percent = if loan_value == 0.0 {
        0.0
    } else {
        (price_difference / loan_value) * 100.0
    };

    let price_impact_percent = sell.price_impact_percent
        + buy.price_impact_percent
        + intermediate.map_or(0.0, |leg| leg.price_impact_percent);

    EvaluatedPath {
        price_difference,
        fee_total,
        gas_cost_usd,
        profit_usd,
        roi_percent,
        price_impact_percent,
        is_profitable: profit_usd > 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use rust_decimal_macros::dec;

    fn leg(price_before: f64, average_price: f64, impact: f64) -> SwapLegResult {
        SwapLegResult {
            price_before,
            price_after: average_price * 2.0 - price_before,
            average_price,
            price_impact_percent: impact,
            amount_out: U256::from(1u64),
        }
    }

    #[test]
    fn test_gas_cost_formula() {
        // 30 gwei * 250k gas * $1/token / 1e9 = $0.0075
        let cost = gas_cost_usd(dec!(30), 250_000, dec!(1));
        assert!((cost - 0.0075).abs() < 1e-12);

        // 40 gwei * 250k * $200 = $2.00
        let cost = gas_cost_usd(dec!(40), 250_000, dec!(200));
        assert!((cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_profit_equality_invariant() {
        let sell = leg(400.0, 399.8, 0.05);
        let buy = leg(396.0, 396.1, 0.02);

        let scored = evaluate_path(&sell, &buy, None, 0.0009, 0.0009, 2.0, 1000.0);

        let expected = scored.price_difference - scored.gas_cost_usd - scored.fee_total;
        assert!(
            (scored.profit_usd - expected).abs() < 1e-9,
            "profit must equal priceDifference - gas - fees"
        );
        assert!((scored.fee_total - 0.18).abs() < 1e-12);
        assert!(scored.is_profitable);
    }

    #[test]
    fn test_unprofitable_when_fees_dominate() {
        let sell = leg(100.0, 100.05, 0.01);
        let buy = leg(100.0, 100.0, 0.01);

        // diff 0.05, fees 0.60 points, gas $1
        let scored = evaluate_path(&sell, &buy, None, 0.003, 0.003, 1.0, 1000.0);
        assert!(!scored.is_profitable);
        assert!(scored.profit_usd < 0.0);
    }

    #[test]
    fn test_roi_scaling() {
        let sell = leg(400.0, 400.0, 0.0);
        let buy = leg(396.0, 396.0, 0.0);

        let scored = evaluate_path(&sell, &buy, None, 0.0, 0.0, 0.0, 1000.0);

        // roi = 4 / (1000 * 400) * 100 = 0.001%
        assert!((scored.roi_percent - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_roi_guard_on_zero_loan_value() {
        let sell = leg(0.0, 1.0, 0.0);
        let buy = leg(0.0, 0.5, 0.0);

        let scored = evaluate_path(&sell, &buy, None, 0.0, 0.0, 0.0, 1000.0);
        assert_eq!(scored.roi_percent, 0.0);
    }

    #[test]
    fn test_intermediate_leg_affects_only_impact() {
        let sell = leg(400.0, 399.8, 0.05);
        let buy = leg(396.0, 396.1, 0.02);
        let mid = leg(1.0, 1.0, 0.10);

        let without = evaluate_path(&sell, &buy, None, 0.0009, 0.0009, 2.0, 1000.0);
        let with = evaluate_path(&sell, &buy, Some(&mid), 0.0009, 0.0009, 2.0, 1000.0);

        assert_eq!(without.profit_usd, with.profit_usd);
        assert!(
            (with.price_impact_percent - without.price_impact_percent - 0.10).abs() < 1e-12
        );
    }
}
