//! RPC Pool State Source
//!
//! Fetches fresh pool state over JSON-RPC each evaluation cycle using
//! alloy `sol!` contract bindings. Token decimals are immutable on-chain
//! so they are cached for the process lifetime; reserves and prices
//! never are.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use crate::error::SourceError;
use crate::source::PoolDataSource;
use crate::types::{AmmKind, PoolDescriptor, PoolSnapshot, PoolState};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::sol;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked);
        function liquidity() external view returns (uint128);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

/// Pool data source backed by an alloy JSON-RPC provider
pub struct RpcPoolSource<P> {
    provider: Arc<P>,
    /// Decimals never change on-chain; cached across cycles
    decimals_cache: DashMap<Address, u8>,
}

impl<P: Provider + 'static> RpcPoolSource<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            decimals_cache: DashMap::new(),
        }
    }

    async fn fetch_v2_state(
        &self,
        descriptor: &PoolDescriptor,
    ) -> Result<PoolState, SourceError> {
        let pool = IUniswapV2Pair::new(descriptor.address, self.provider.clone());

        let reserves_call = pool.getReserves();
        let token0_call = pool.token0();
        let token1_call = pool.token1();
        let (reserves, token0, token1) = tokio::join!(
            reserves_call.call(),
            token0_call.call(),
            token1_call.call(),
        );

        let reserves = reserves.map_err(|e| SourceError::Rpc(e.to_string()))?;
        let token0 = token0.map_err(|e| SourceError::Rpc(e.to_string()))?;
        let token1 = token1.map_err(|e| SourceError::Rpc(e.to_string()))?;

        let block_height = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| SourceError::Rpc(e.to_string()))?;

        let decimals0 = self.token_decimals_or_default(token0).await;
        let decimals1 = self.token_decimals_or_default(token1).await;

        Ok(PoolState {
            address: descriptor.address,
            token0,
            token1,
            decimals0,
            decimals1,
            snapshot: PoolSnapshot::ConstantProduct {
                reserve0: U256::from(reserves.reserve0),
                reserve1: U256::from(reserves.reserve1),
            },
            block_height,
        })
    }

    async fn fetch_v3_state(
        &self,
        descriptor: &PoolDescriptor,
    ) -> Result<PoolState, SourceError> {
        let pool = IUniswapV3Pool::new(descriptor.address, self.provider.clone());

        let slot0_call = pool.slot0();
        let liquidity_call = pool.liquidity();
        let token0_call = pool.token0();
        let token1_call = pool.token1();
        let (slot0, liquidity, token0, token1) = tokio::join!(
            slot0_call.call(),
            liquidity_call.call(),
            token0_call.call(),
            token1_call.call(),
        );

        let slot0 = slot0.map_err(|e| SourceError::Rpc(e.to_string()))?;
        let liquidity = liquidity.map_err(|e| SourceError::Rpc(e.to_string()))?;
        let token0 = token0.map_err(|e| SourceError::Rpc(e.to_string()))?;
        let token1 = token1.map_err(|e| SourceError::Rpc(e.to_string()))?;

        let sqrt_price_x96 = U256::from(slot0.sqrtPriceX96);
        if sqrt_price_x96.is_zero() {
            return Err(SourceError::Malformed {
                pool: descriptor.address,
                detail: "uninitialized pool (zero sqrtPriceX96)".to_string(),
            });
        }

        let block_height = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| SourceError::Rpc(e.to_string()))?;

        let decimals0 = self.token_decimals_or_default(token0).await;
        let decimals1 = self.token_decimals_or_default(token1).await;

        Ok(PoolState {
            address: descriptor.address,
            token0,
            token1,
            decimals0,
            decimals1,
            snapshot: PoolSnapshot::ConcentratedLiquidity {
                sqrt_price_x96,
                liquidity: U256::from(liquidity),
            },
            block_height,
        })
    }
}

#[async_trait]
impl<P: Provider + 'static> PoolDataSource for RpcPoolSource<P> {
    async fn fetch_pool_state(
        &self,
        descriptor: &PoolDescriptor,
    ) -> Result<PoolState, SourceError> {
        match descriptor.kind {
            AmmKind::V2 => self.fetch_v2_state(descriptor).await,
            AmmKind::V3 => self.fetch_v3_state(descriptor).await,
        }
    }

    async fn fetch_token_decimals(&self, token: Address) -> Result<u8, SourceError> {
        if let Some(decimals) = self.decimals_cache.get(&token) {
            return Ok(*decimals);
        }

        let contract = IERC20::new(token, self.provider.clone());
        let decimals = contract
            .decimals()
            .call()
            .await
            .map_err(|e| SourceError::Rpc(e.to_string()))?;

        self.decimals_cache.insert(token, decimals);
        Ok(decimals)
    }
}
