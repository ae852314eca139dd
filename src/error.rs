//! Error taxonomy for the detection engine
//!
//! External-data failures are typed, never panics. Source and simulation
//! errors are recovered per candidate; only the fail-closed mixed-kind
//! policy and top-level orchestration failures abort a cycle.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use alloy::primitives::Address;
use thiserror::Error;

/// Failures from external data sources (pool state, decimals, gas)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("rpc failure: {0}")]
    Rpc(String),

    #[error("malformed response for pool {pool}: {detail}")]
    Malformed { pool: Address, detail: String },
}

/// Failures during swap-leg simulation
#[derive(Error, Debug)]
pub enum SimError {
    #[error(
        "pool {pool}: declared pair ({declared_a}, {declared_b}) matches neither on-chain order ({token0}, {token1})"
    )]
    PoolMismatch {
        pool: Address,
        declared_a: Address,
        declared_b: Address,
        token0: Address,
        token1: Address,
    },

    #[error("pool {pool}: zero reserves/liquidity")]
    ZeroLiquidity { pool: Address },

    #[error("pool {pool}: swap math overflow")]
    Arithmetic { pool: Address },
}

/// Cycle-level failures from the orchestrator
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("mixed AMM kinds in group {pair}; cycle aborted")]
    MixedKindGroup { pair: String },

    #[error("gas/price lookup failed: {0}")]
    GasLookup(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sim(#[from] SimError),
}
