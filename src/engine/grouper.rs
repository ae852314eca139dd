//! Pool Grouping
//!
//! Partitions a descriptor set into token-pair buckets and tags each
//! bucket's AMM-kind homogeneity. Pure function of its input.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::types::{GroupKind, PoolDescriptor, PoolGroup, TokenPairKey};
use std::collections::BTreeMap;

/// Bucket pools by unordered token pair.
///
/// Duplicate submissions of the same pool address merge into one entry;
/// first-appearance order is preserved within each bucket. A bucket that
/// observes more than one AMM kind is tagged `Mixed`.
pub fn group_pools(pools: &[PoolDescriptor]) -> BTreeMap<TokenPairKey, PoolGroup> {
    let mut groups: BTreeMap<TokenPairKey, PoolGroup> = BTreeMap::new();

    for pool in pools {
        let key = pool.pair_key();
        let group = groups.entry(key).or_insert_with(|| PoolGroup {
            pair_key: key,
            pools: Vec::new(),
            kind: GroupKind::Homogeneous(pool.kind),
        });

        // Identity is the pool address; resubmissions merge
        if group.pools.iter().any(|p| p.address == pool.address) {
            continue;
        }

        if let GroupKind::Homogeneous(kind) = group.kind {
            if kind != pool.kind {
                group.kind = GroupKind::Mixed;
            }
        }

        group.pools.push(pool.clone());
    }

    groups
}
