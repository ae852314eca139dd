//! Gas & Reference Price Oracle
//!
//! Gas price comes straight from the RPC node. The USD price of the
//! gas token is derived from a designated pricing pool quoted in a
//! stablecoin (assumed $1) and cached with a short TTL; on refresh
//! failure a stale value beats no value, and a configured fallback
//! beats both being absent.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use crate::error::SourceError;
use crate::sim::{normalize, u256_to_f64};
use crate::source::{GasOracle, PoolDataSource};
use crate::types::{PoolDescriptor, PoolSnapshot, PoolState};
use alloy::primitives::Address;
use alloy::providers::Provider;
use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Refresh interval for the reference token's USD price
const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(30);

struct CachedPrice {
    price: Decimal,
    fetched_at: Instant,
}

/// Oracle backed by the RPC node and one stablecoin-quoted pricing pool
pub struct RpcGasOracle<P> {
    provider: Arc<P>,
    source: Arc<dyn PoolDataSource>,
    /// Pool pairing the gas token with a $1 stablecoin
    pricing_pool: PoolDescriptor,
    gas_token: Address,
    fallback_usd: Decimal,
    cache: RwLock<Option<CachedPrice>>,
    cache_ttl: Duration,
}

impl<P: Provider + 'static> RpcGasOracle<P> {
    pub fn new(
        provider: Arc<P>,
        source: Arc<dyn PoolDataSource>,
        pricing_pool: PoolDescriptor,
        gas_token: Address,
        fallback_usd: Decimal,
    ) -> Self {
        Self {
            provider,
            source,
            pricing_pool,
            gas_token,
            fallback_usd,
            cache: RwLock::new(None),
            cache_ttl: DEFAULT_PRICE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    async fn fetch_spot_price(&self) -> Result<Decimal, SourceError> {
        let state = self.source.fetch_pool_state(&self.pricing_pool).await?;
        let price =
            spot_price_usd(&state, self.gas_token).ok_or_else(|| SourceError::Malformed {
                pool: self.pricing_pool.address,
                detail: "gas token not in pricing pool or zero price".to_string(),
            })?;
        Decimal::from_f64(price).ok_or_else(|| SourceError::Malformed {
            pool: self.pricing_pool.address,
            detail: format!("non-finite spot price {}", price),
        })
    }
}

#[async_trait]
impl<P: Provider + 'static> GasOracle for RpcGasOracle<P> {
    async fn current_gas_price_gwei(&self) -> Result<Decimal, SourceError> {
        let wei = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| SourceError::Rpc(e.to_string()))?;
        Ok(wei_to_gwei(wei))
    }

    async fn reference_token_usd_price(&self) -> Result<Decimal, SourceError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.cache_ttl {
                return Ok(cached.price);
            }
        }

        match self.fetch_spot_price().await {
            Ok(price) => {
                *self.cache.write().await = Some(CachedPrice {
                    price,
                    fetched_at: Instant::now(),
                });
                Ok(price)
            }
            Err(e) => {
                if let Some(cached) = self.cache.read().await.as_ref() {
                    warn!("Price refresh failed, serving stale value: {}", e);
                    return Ok(cached.price);
                }
                warn!(
                    "Price refresh failed, serving fallback ${}: {}",
                    self.fallback_usd, e
                );
                Ok(self.fallback_usd)
            }
        }
    }
}

fn wei_to_gwei(wei: u128) -> Decimal {
    let wei = Decimal::from_u128(wei).unwrap_or(Decimal::MAX);
    wei / Decimal::from(WEI_PER_GWEI)
}

/// USD spot price of `gas_token` out of a stablecoin-quoted pool state.
///
/// Returns `None` when the token is not in the pool or the implied price
/// is zero.
fn spot_price_usd(state: &PoolState, gas_token: Address) -> Option<f64> {
    let price_token1_per_token0 = match state.snapshot {
        PoolSnapshot::ConstantProduct { reserve0, reserve1 } => {
            let base = normalize(reserve0, state.decimals0);
            if base == 0.0 {
                return None;
            }
            normalize(reserve1, state.decimals1) / base
        }
        PoolSnapshot::ConcentratedLiquidity { sqrt_price_x96, .. } => {
            let sqrt_price = u256_to_f64(sqrt_price_x96) / 2.0_f64.powi(96);
            sqrt_price * sqrt_price
                * 10_f64.powi(state.decimals0 as i32 - state.decimals1 as i32)
        }
    };

    let price = if gas_token == state.token0 {
        price_token1_per_token0
    } else if gas_token == state.token1 {
        if price_token1_per_token0 == 0.0 {
            return None;
        }
        1.0 / price_token1_per_token0
    } else {
        return None;
    };

    if price > 0.0 {
        Some(price)
    } else {
        None
    }
}
