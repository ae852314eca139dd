//! Triangular DEX Arbitrage Detection Engine
//!
//! Detects three-pool arbitrage cycles within a token pair: group pools,
//! enumerate triplets, simulate the traded legs against fresh on-chain
//! state, and rank profitable candidates after fees and gas.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod metrics;
pub mod sim;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::{load_pools, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, SimError, SourceError};
pub use export::JsonExporter;
pub use metrics::CycleMetrics;
pub use types::{
    AmmKind, ArbitrageCandidate, MixedKindPolicy, PoolDescriptor, PoolSnapshot, PoolState,
    RoutePolicy,
};
