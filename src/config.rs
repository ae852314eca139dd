//! Configuration management
//!
//! Engine tuning knobs plus loading of the pool manifest (a JSON array
//! of pool descriptors) from disk.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use crate::types::{MixedKindPolicy, PoolDescriptor, RoutePolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::evaluator::DEFAULT_GAS_LIMIT;

/// Tuning parameters for one engine instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Gas-limit assumption used for USD cost estimation
    pub gas_limit: u64,
    /// Max triplets evaluated concurrently per cycle
    pub concurrency: usize,
    pub route_policy: RoutePolicy,
    pub mixed_kind_policy: MixedKindPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            concurrency: 8,
            route_policy: RoutePolicy::default(),
            mixed_kind_policy: MixedKindPolicy::default(),
        }
    }
}

/// Load the pool manifest from a JSON file.
pub fn load_pools(path: &Path) -> Result<Vec<PoolDescriptor>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool manifest {}", path.display()))?;
    let pools: Vec<PoolDescriptor> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse pool manifest {}", path.display()))?;
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AmmKind;
    use std::env;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.gas_limit, 250_000);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.route_policy, RoutePolicy::All);
        assert_eq!(config.mixed_kind_policy, MixedKindPolicy::FailClosed);
    }

    #[test]
    fn test_load_pools_roundtrip() {
        let path = env::temp_dir().join("triarb_test_pools.json");
        let json = r#"[
            {
                "address": "0x0101010101010101010101010101010101010101",
                "token_a": "0x0202020202020202020202020202020202020202",
                "token_b": "0x0303030303030303030303030303030303030303",
                "kind": "V2",
                "fee_ppm": 3000,
                "network": "Uniswap V2"
            }
        ]"#;
        fs::write(&path, json).unwrap();

        let pools = load_pools(&path).unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].kind, AmmKind::V2);
        assert_eq!(pools[0].fee_ppm, 3000);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_pools_missing_file() {
        let path = env::temp_dir().join("triarb_test_missing_manifest.json");
        let _ = fs::remove_file(&path);
        assert!(load_pools(&path).is_err());
    }

    #[test]
    fn test_load_pools_malformed_json() {
        let path = env::temp_dir().join("triarb_test_bad_manifest.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_pools(&path).is_err());

        let _ = fs::remove_file(&path);
    }
}
