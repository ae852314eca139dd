//! External Data Sources
//!
//! Trait seams the engine consumes: per-cycle pool state and the gas /
//! reference-price oracle. Production implementations live in `rpc` and
//! `gas`; tests substitute in-memory mocks.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

pub mod gas;
pub mod rpc;

use crate::error::SourceError;
use crate::types::{PoolDescriptor, PoolState};
use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::warn;

/// Fallback when a token's decimals cannot be fetched
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Fresh pool state per evaluation cycle. Implementations must not serve
/// snapshots cached from a previous cycle.
#[async_trait]
pub trait PoolDataSource: Send + Sync {
    async fn fetch_pool_state(
        &self,
        descriptor: &PoolDescriptor,
    ) -> Result<PoolState, SourceError>;

    async fn fetch_token_decimals(&self, token: Address) -> Result<u8, SourceError>;

    /// Decimals with the 18-decimal fallback on lookup failure
    async fn token_decimals_or_default(&self, token: Address) -> u8 {
        match self.fetch_token_decimals(token).await {
            Ok(decimals) => decimals,
            Err(e) => {
                warn!(
                    "Failed to fetch decimals for {}, assuming {}: {}",
                    token, DEFAULT_TOKEN_DECIMALS, e
                );
                DEFAULT_TOKEN_DECIMALS
            }
        }
    }
}

/// Current gas price and the USD price of the reference (gas) token
#[async_trait]
pub trait GasOracle: Send + Sync {
    async fn current_gas_price_gwei(&self) -> Result<Decimal, SourceError>;

    async fn reference_token_usd_price(&self) -> Result<Decimal, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDecimalsSource;

    #[async_trait]
    impl PoolDataSource for NoDecimalsSource {
        async fn fetch_pool_state(
            &self,
            descriptor: &PoolDescriptor,
        ) -> Result<PoolState, SourceError> {
            Err(SourceError::Rpc(format!(
                "no state for {}",
                descriptor.address
            )))
        }

        async fn fetch_token_decimals(&self, _token: Address) -> Result<u8, SourceError> {
            Err(SourceError::Rpc("decimals() reverted".to_string()))
        }
    }

    #[tokio::test]
    async fn test_decimals_fallback_to_18() {
        let source = NoDecimalsSource;
        let decimals = source
            .token_decimals_or_default(Address::repeat_byte(1))
            .await;
        assert_eq!(decimals, DEFAULT_TOKEN_DECIMALS);
    }
}
