//! Core data structures for the arbitrage detection engine
//!
//! Pool descriptors are the immutable inputs; everything downstream
//! (groups, snapshots, swap legs, candidates) is derived per evaluation
//! cycle and never mutated after creation.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// AMM kinds we support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmKind {
    /// Constant-product pools (Uniswap V2 forks)
    V2,
    /// Concentrated-liquidity pools (Uniswap V3 style)
    V3,
}

impl AmmKind {
    /// Returns true if this kind prices from sqrtPriceX96/liquidity
    pub fn is_concentrated(&self) -> bool {
        matches!(self, AmmKind::V3)
    }
}

impl fmt::Display for AmmKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AmmKind::V2 => write!(f, "V2"),
            AmmKind::V3 => write!(f, "V3"),
        }
    }
}

/// Immutable identity of a liquidity pool.
///
/// Identity key is `address`; two descriptors with the same address refer
/// to the same pool regardless of declared token order. Fees are carried
/// in parts-per-million (3000 = 0.30%) so common DEX tiers are exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDescriptor {
    pub address: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub kind: AmmKind,
    pub fee_ppm: u32,
    /// DEX / venue name, carried through to exported candidates
    pub network: String,
}

impl PoolDescriptor {
    pub fn new(
        address: Address,
        token_a: Address,
        token_b: Address,
        kind: AmmKind,
        fee_ppm: u32,
        network: String,
    ) -> Self {
        Self {
            address,
            token_a,
            token_b,
            kind,
            fee_ppm,
            network,
        }
    }

    /// Fee as a fraction (3000 ppm → 0.003)
    pub fn fee_rate(&self) -> f64 {
        self.fee_ppm as f64 / 1_000_000.0
    }

    /// Fee as a percentage (3000 ppm → 0.30)
    pub fn fee_percent(&self) -> f64 {
        self.fee_ppm as f64 / 10_000.0
    }

    /// Canonical bucket key for this pool's token pair
    pub fn pair_key(&self) -> TokenPairKey {
        TokenPairKey::new(self.token_a, self.token_b)
    }
}

/// Order-independent key for a token pair.
///
/// Constructed sorted so `(A, B)` and `(B, A)` collide; `Ord` so grouped
/// maps iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenPairKey {
    pub lower: Address,
    pub upper: Address,
}

impl TokenPairKey {
    pub fn new(a: Address, b: Address) -> Self {
        if a <= b {
            Self { lower: a, upper: b }
        } else {
            Self { lower: b, upper: a }
        }
    }
}

impl fmt::Display for TokenPairKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.lower, self.upper)
    }
}

/// AMM-kind homogeneity of a pool group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Homogeneous(AmmKind),
    Mixed,
}

/// Pools bucketed under one token pair.
///
/// `pools` preserves first-appearance order and is deduplicated by
/// address. A group is eligible for triplet enumeration only when
/// homogeneous with at least 3 distinct pools.
#[derive(Debug, Clone)]
pub struct PoolGroup {
    pub pair_key: TokenPairKey,
    pub pools: Vec<PoolDescriptor>,
    pub kind: GroupKind,
}

impl PoolGroup {
    pub fn is_eligible(&self) -> bool {
        matches!(self.kind, GroupKind::Homogeneous(_)) && self.pools.len() >= 3
    }
}

/// Kind-specific liquidity snapshot of a pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PoolSnapshot {
    /// Flat reserves, token-base-unit integers
    ConstantProduct { reserve0: U256, reserve1: U256 },
    /// Q64.96 sqrt price and in-range liquidity
    ConcentratedLiquidity {
        sqrt_price_x96: U256,
        liquidity: U256,
    },
}

/// Transient pool state fetched fresh each evaluation cycle.
///
/// `token0`/`token1` are the pool's on-chain order, which may differ from
/// the descriptor's declared order. Never cached across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolState {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub decimals0: u8,
    pub decimals1: u8,
    pub snapshot: PoolSnapshot,
    pub block_height: u64,
}

/// Result of simulating one swap leg through a pool.
///
/// Prices are expressed in output-token units per input-token unit,
/// decimal-adjusted; `average_price` is the linear midpoint of before and
/// after (an approximation of the execution price, not exact VWAP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapLegResult {
    pub price_before: f64,
    pub price_after: f64,
    pub average_price: f64,
    pub price_impact_percent: f64,
    pub amount_out: U256,
}

/// A scored three-pool arbitrage path, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageCandidate {
    pub token0: Address,
    pub token1: Address,
    /// Ordered [loan origin, sell pool, buy pool]
    pub pool_path: [Address; 3],
    pub kind: AmmKind,
    pub price_difference: f64,
    /// Sum of the two traded legs' fee rates, in percentage points
    pub fee_total: f64,
    pub gas_cost_usd: f64,
    pub profit_usd: f64,
    pub roi_percent: f64,
    /// Aggregate impact across simulated legs (ranking tiebreak)
    pub price_impact_percent: f64,
    pub is_profitable: bool,
    pub provider: String,
}

/// Which trade orderings of a triplet are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePolicy {
    /// All 6 permutations of the three pools
    #[default]
    All,
    /// Only the 2 permutations keeping the first pool as loan origin
    LoanOriginFixed,
}

/// How a mixed-kind group is handled during enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedKindPolicy {
    /// Abort the whole cycle — no partially-correct output sets
    #[default]
    FailClosed,
    /// Drop the group with a warning and continue
    SkipAndContinue,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    #[test]
    fn test_pair_key_order_independent() {
        let k1 = TokenPairKey::new(addr(1), addr(2));
        let k2 = TokenPairKey::new(addr(2), addr(1));
        assert_eq!(k1, k2);
        assert_eq!(k1.lower, addr(1));
        assert_eq!(k1.upper, addr(2));
    }

    #[test]
    fn test_fee_conversions() {
        let pool = PoolDescriptor::new(
            addr(1),
            addr(2),
            addr(3),
            AmmKind::V2,
            3000,
            "QuickSwap".to_string(),
        );
        assert!((pool.fee_rate() - 0.003).abs() < 1e-12);
        assert!((pool.fee_percent() - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_group_eligibility() {
        let pools: Vec<PoolDescriptor> = (1..=3)
            .map(|n| {
                PoolDescriptor::new(
                    addr(n),
                    addr(10),
                    addr(11),
                    AmmKind::V2,
                    3000,
                    "Test".to_string(),
                )
            })
            .collect();

        let group = PoolGroup {
            pair_key: TokenPairKey::new(addr(10), addr(11)),
            pools: pools.clone(),
            kind: GroupKind::Homogeneous(AmmKind::V2),
        };
        assert!(group.is_eligible());

        let mixed = PoolGroup {
            kind: GroupKind::Mixed,
            ..group.clone()
        };
        assert!(!mixed.is_eligible());

        let small = PoolGroup {
            pools: pools[..2].to_vec(),
            ..group
        };
        assert!(!small.is_eligible());
    }
}
