//! Evaluation Cycle Orchestration
//!
//! Purpose:
//!     Drives one full detection cycle: group the descriptor set,
//!     enumerate triplets, fetch fresh pool state, simulate the traded
//!     legs of every route, score them, and return the profitable
//!     candidates ranked best-first.
//!
//! Author: AI-Generated
//! Created: 2026-02-04
//!
//! Notes:
//!     - Per-candidate failures (state fetch, leg simulation, gas lookup)
//!       are recovered: logged, counted, and the candidate skipped. Only
//!       the fail-closed mixed-kind policy aborts a cycle.
//!     - Triplets are evaluated concurrently but collected in input
//!       order, so identical inputs rank identically.

pub mod evaluator;
pub mod grouper;
pub mod triplets;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::metrics::CycleMetrics;
use crate::sim::{simulate_leg, to_base_units, LegDirection};
use crate::source::{GasOracle, PoolDataSource};
use crate::types::{ArbitrageCandidate, PoolDescriptor, PoolState};
use evaluator::evaluate_path;
use futures::stream::{self, StreamExt};
use grouper::group_pools;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use triplets::{enumerate_triplets, route_orders, Triplet};

/// Detection engine over pluggable data sources
pub struct Engine {
    source: Arc<dyn PoolDataSource>,
    oracle: Arc<dyn GasOracle>,
    config: EngineConfig,
}

/// Per-triplet evaluation result, aggregated into cycle metrics
#[derive(Default)]
struct TripletOutcome {
    candidates: Vec<ArbitrageCandidate>,
    routes_evaluated: usize,
    fetch_failures: usize,
    leg_failures: usize,
    gas_failures: usize,
}

impl Engine {
    pub fn new(
        source: Arc<dyn PoolDataSource>,
        oracle: Arc<dyn GasOracle>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            oracle,
            config,
        }
    }

    /// Run one evaluation cycle over the descriptor set.
    ///
    /// Returns profitable candidates ranked best-first; an empty vec when
    /// nothing clears fees and gas.
    pub async fn run_cycle(
        &self,
        pools: &[PoolDescriptor],
        loan_amount: f64,
        metrics: &mut CycleMetrics,
    ) -> Result<Vec<ArbitrageCandidate>, EngineError> {
        metrics.pools_in = pools.len();

        let started = Instant::now();
        let groups = group_pools(pools);
        metrics.grouping_micros = started.elapsed().as_micros();
        metrics.groups = groups.len();
        metrics.eligible_groups = groups.values().filter(|g| g.is_eligible()).count();

        let started = Instant::now();
        let triplets = enumerate_triplets(&groups, self.config.mixed_kind_policy)?;
        metrics.enumeration_micros = started.elapsed().as_micros();
        metrics.triplets = triplets.len();

        let started = Instant::now();
        let outcomes: Vec<TripletOutcome> = stream::iter(triplets)
            .map(|triplet| self.evaluate_triplet(triplet, loan_amount))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;
        metrics.evaluation_micros = started.elapsed().as_micros();

        let mut candidates = Vec::new();
        for outcome in outcomes {
            metrics.routes_evaluated += outcome.routes_evaluated;
            metrics.fetch_failures += outcome.fetch_failures;
            metrics.leg_failures += outcome.leg_failures;
            metrics.gas_failures += outcome.gas_failures;
            candidates.extend(outcome.candidates);
        }
        metrics.candidates = candidates.len();
        metrics.profitable = candidates.iter().filter(|c| c.is_profitable).count();

        let ranked = rank(candidates);
        match ranked.first() {
            Some(best) => info!(
                "Best candidate: path {:?} profit ${:.4} (roi {:.4}%)",
                best.pool_path, best.profit_usd, best.roi_percent
            ),
            None => debug!("No profitable candidates this cycle"),
        }

        Ok(ranked)
    }

    /// Fetch all three pool states, then score every route ordering of
    /// the triplet. Failures are counted, never propagated.
    async fn evaluate_triplet(&self, triplet: Triplet, loan_amount: f64) -> TripletOutcome {
        let mut outcome = TripletOutcome::default();

        let (ra, rb, rc) = tokio::join!(
            self.source.fetch_pool_state(&triplet.pools[0]),
            self.source.fetch_pool_state(&triplet.pools[1]),
            self.source.fetch_pool_state(&triplet.pools[2]),
        );

        let mut states: Vec<PoolState> = Vec::with_capacity(3);
        let mut fetch_failed = false;
        for (pool, result) in triplet.pools.iter().zip([ra, rb, rc]) {
            match result {
                Ok(state) => states.push(state),
                Err(e) => {
                    warn!("Failed to fetch state for pool {}: {}", pool.address, e);
                    fetch_failed = true;
                }
            }
        }
        if fetch_failed {
            outcome.fetch_failures += 1;
            return outcome;
        }

        for order in route_orders(self.config.route_policy) {
            outcome.routes_evaluated += 1;

            let origin = &triplet.pools[order[0]];
            let sell_pool = &triplet.pools[order[1]];
            let buy_pool = &triplet.pools[order[2]];
            let sell_state = &states[order[1]];
            let buy_state = &states[order[2]];

            // Sell leg: token0 in, priced token1-per-token0
            let sell = match simulate_leg(
                sell_pool,
                sell_state,
                LegDirection::Forward,
                to_base_units(loan_amount, sell_state.decimals0),
                false,
            ) {
                Ok(leg) => leg,
                Err(e) => {
                    warn!("Sell leg failed on {}: {}", sell_pool.address, e);
                    outcome.leg_failures += 1;
                    continue;
                }
            };

            // Buy leg: token1 in, inverted to the sell leg's quote scale
            let buy = match simulate_leg(
                buy_pool,
                buy_state,
                LegDirection::Reverse,
                to_base_units(loan_amount, buy_state.decimals1),
                true,
            ) {
                Ok(leg) => leg,
                Err(e) => {
                    warn!("Buy leg failed on {}: {}", buy_pool.address, e);
                    outcome.leg_failures += 1;
                    continue;
                }
            };

            let gas_cost = match self.fetch_gas_cost().await {
                Ok(cost) => cost,
                Err(e) => {
                    warn!("Gas estimate unavailable, skipping route: {}", e);
                    outcome.gas_failures += 1;
                    continue;
                }
            };

            let scored = evaluate_path(
                &sell,
                &buy,
                None,
                sell_pool.fee_rate(),
                buy_pool.fee_rate(),
                gas_cost,
                loan_amount,
            );

            outcome.candidates.push(ArbitrageCandidate {
                token0: sell_state.token0,
                token1: sell_state.token1,
                pool_path: [origin.address, sell_pool.address, buy_pool.address],
                kind: triplet.kind,
                price_difference: scored.price_difference,
                fee_total: scored.fee_total,
                gas_cost_usd: scored.gas_cost_usd,
                profit_usd: scored.profit_usd,
                roi_percent: scored.roi_percent,
                price_impact_percent: scored.price_impact_percent,
                is_profitable: scored.is_profitable,
                provider: sell_pool.network.clone(),
            });
        }

        outcome
    }

    async fn fetch_gas_cost(&self) -> Result<f64, EngineError> {
        let gwei = self
            .oracle
            .current_gas_price_gwei()
            .await
            .map_err(|e| EngineError::GasLookup(e.to_string()))?;
        let usd = self
            .oracle
            .reference_token_usd_price()
            .await
            .map_err(|e| EngineError::GasLookup(e.to_string()))?;
        Ok(evaluator::gas_cost_usd(gwei, self.config.gas_limit, usd))
    }
}

/// Filter to profitable candidates and sort best-first.
///
/// Descending profit; ties prefer lower aggregate impact, then original
/// evaluation order (stable sort).
pub fn rank(candidates: Vec<ArbitrageCandidate>) -> Vec<ArbitrageCandidate> {
    let mut ranked: Vec<ArbitrageCandidate> = candidates
        .into_iter()
        .filter(|c| c.is_profitable)
        .collect();

    ranked.sort_by(|a, b| {
        b.profit_usd
            .partial_cmp(&a.profit_usd)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.price_impact_percent
                    .partial_cmp(&b.price_impact_percent)
                    .unwrap_or(Ordering::Equal)
            })
    });

    ranked
}
