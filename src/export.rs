//! Candidate Export
//!
//! Persists ranked candidates to a JSON array file so downstream tooling
//! (dashboards, backtests) can consume cycle output. The file is read,
//! extended, and rewritten whole; records accumulate across cycles.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use crate::types::ArbitrageCandidate;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One exported candidate, flattened for external consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub timestamp: DateTime<Utc>,
    pub pool_type: String,
    pub token0: String,
    pub token1: String,
    /// Pool addresses in trade order [loan origin, sell, buy]
    pub path: Vec<String>,
    pub roi: f64,
    pub profit: f64,
    #[serde(rename = "priceDifference")]
    pub price_difference: f64,
    pub pool_fee: f64,
    pub provider: String,
}

impl From<&ArbitrageCandidate> for ExportRecord {
    fn from(candidate: &ArbitrageCandidate) -> Self {
        Self {
            timestamp: Utc::now(),
            pool_type: candidate.kind.to_string(),
            token0: candidate.token0.to_string(),
            token1: candidate.token1.to_string(),
            path: candidate
                .pool_path
                .iter()
                .map(|a| a.to_string())
                .collect(),
            roi: candidate.roi_percent,
            profit: candidate.profit_usd,
            price_difference: candidate.price_difference,
            pool_fee: candidate.fee_total,
            provider: candidate.provider.clone(),
        }
    }
}

/// Accumulating JSON-array exporter
pub struct JsonExporter {
    path: PathBuf,
}

impl JsonExporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append candidates to the export file. Returns how many were
    /// written; an empty input touches nothing.
    pub fn append(&self, candidates: &[ArbitrageCandidate]) -> Result<usize> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let mut records = self.read_all()?;
        records.extend(candidates.iter().map(ExportRecord::from));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create export directory: {:?}", parent)
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&records)
            .context("Failed to serialize export records")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write export file: {:?}", self.path))?;

        Ok(candidates.len())
    }

    /// Read all previously exported records; missing file is empty.
    pub fn read_all(&self) -> Result<Vec<ExportRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read export file: {:?}", self.path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse export file: {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AmmKind;
    use alloy::primitives::Address;
    use std::env;

    fn candidate(profit: f64) -> ArbitrageCandidate {
        ArbitrageCandidate {
            token0: Address::repeat_byte(1),
            token1: Address::repeat_byte(2),
            pool_path: [
                Address::repeat_byte(3),
                Address::repeat_byte(4),
                Address::repeat_byte(5),
            ],
            kind: AmmKind::V2,
            price_difference: 3.6,
            fee_total: 0.18,
            gas_cost_usd: 2.0,
            profit_usd: profit,
            roi_percent: 0.0009,
            price_impact_percent: 0.05,
            is_profitable: profit > 0.0,
            provider: "QuickSwap".to_string(),
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let path = env::temp_dir().join("triarb_export_rw.json");
        let _ = fs::remove_file(&path);

        let exporter = JsonExporter::new(&path);
        let written = exporter.append(&[candidate(1.42)]).unwrap();
        assert_eq!(written, 1);

        let records = exporter.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pool_type, "V2");
        assert_eq!(records[0].path.len(), 3);
        assert!((records[0].profit - 1.42).abs() < 1e-12);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_records_accumulate_across_appends() {
        let path = env::temp_dir().join("triarb_export_accumulate.json");
        let _ = fs::remove_file(&path);

        let exporter = JsonExporter::new(&path);
        exporter.append(&[candidate(1.0)]).unwrap();
        exporter.append(&[candidate(2.0), candidate(3.0)]).unwrap();

        let records = exporter.read_all().unwrap();
        assert_eq!(records.len(), 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_empty_input_touches_nothing() {
        let path = env::temp_dir().join("triarb_export_empty.json");
        let _ = fs::remove_file(&path);

        let exporter = JsonExporter::new(&path);
        assert_eq!(exporter.append(&[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_external_field_naming() {
        let record = ExportRecord::from(&candidate(1.42));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"priceDifference\""));
        assert!(json.contains("\"pool_fee\""));
    }
}
