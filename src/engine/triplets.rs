//! Triplet & Route Enumeration
//!
//! For every eligible group (homogeneous kind, ≥3 unique pools), yields
//! all C(n,3) index-ordered pool combinations. Trade-order permutations
//! per triplet are a policy choice, not hardcoded.
//!
//! Enumeration is fully deterministic: identical inputs produce
//! identical triplet order and contents.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::error::EngineError;
use crate::types::{
    AmmKind, GroupKind, MixedKindPolicy, PoolDescriptor, PoolGroup, RoutePolicy, TokenPairKey,
};
use std::collections::BTreeMap;
use tracing::warn;

/// A candidate 3-pool cycle within one token-pair group
#[derive(Debug, Clone)]
pub struct Triplet {
    pub pair_key: TokenPairKey,
    pub kind: AmmKind,
    pub pools: [PoolDescriptor; 3],
}

/// All 6 orderings of a triplet, stable order
const ALL_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// The 2 orderings that keep the first pool as loan origin
const LOAN_ORIGIN_ORDERS: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 1]];

/// Pool orderings to evaluate per triplet under the given policy.
/// Index positions are [loan origin, sell pool, buy pool].
pub fn route_orders(policy: RoutePolicy) -> &'static [[usize; 3]] {
    match policy {
        RoutePolicy::All => &ALL_ORDERS,
        RoutePolicy::LoanOriginFixed => &LOAN_ORIGIN_ORDERS,
    }
}

/// Enumerate all triplets across eligible groups.
///
/// Under `FailClosed`, any mixed-kind group aborts the cycle with no
/// partial output; under `SkipAndContinue` the group is dropped with a
/// warning. Groups with fewer than 3 pools yield nothing.
pub fn enumerate_triplets(
    groups: &BTreeMap<TokenPairKey, PoolGroup>,
    policy: MixedKindPolicy,
) -> Result<Vec<Triplet>, EngineError> {
    let mut triplets = Vec::new();

    for group in groups.values() {
        let kind = match group.kind {
            GroupKind::Homogeneous(kind) => kind,
            GroupKind::Mixed => match policy {
                MixedKindPolicy::FailClosed => {
                    return Err(EngineError::MixedKindGroup {
                        pair: group.pair_key.to_string(),
                    });
                }
                MixedKindPolicy::SkipAndContinue => {
                    warn!(
                        "Skipping mixed-kind group {} ({} pools)",
                        group.pair_key,
                        group.pools.len()
                    );
                    continue;
                }
            },
        };

        let n = group.pools.len();
        if n < 3 {
            continue;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    triplets.push(Triplet {
                        pair_key: group.pair_key,
                        kind,
                        pools: [
                            group.pools[i].clone(),
                            group.pools[j].clone(),
                            group.pools[k].clone(),
                        ],
                    });
                }
            }
        }
    }

    Ok(triplets)
}
