//! Triangular Arbitrage Detector
//!
//! Main entry point. Loads the pool manifest, connects to the RPC
//! endpoint, and runs the detection engine on a fixed interval:
//! group → enumerate → simulate → score → export.
//!
//! Detection only — no transaction is ever signed or sent.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use alloy::primitives::Address;
use alloy::providers::ProviderBuilder;
use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use triarb::source::gas::RpcGasOracle;
use triarb::source::rpc::RpcPoolSource;
use triarb::source::PoolDataSource;
use triarb::types::{MixedKindPolicy, RoutePolicy};
use triarb::{load_pools, CycleMetrics, Engine, EngineConfig, JsonExporter};

/// Triangular DEX arbitrage detection engine
#[derive(Parser)]
#[command(name = "triarb")]
struct Args {
    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Pool manifest (JSON array of pool descriptors)
    #[arg(long, env = "POOLS_FILE", default_value = "config/pools.json")]
    pools: PathBuf,

    /// Loan notional per route, in the sell leg's input token
    #[arg(long, default_value_t = 1000.0)]
    loan_amount: f64,

    /// Milliseconds between evaluation cycles
    #[arg(long, default_value_t = 3000)]
    interval_ms: u64,

    /// Output file for profitable candidates
    #[arg(long, default_value = "data/candidates.json")]
    export: PathBuf,

    /// Address of a manifest pool pairing the gas token with a stablecoin
    #[arg(long, env = "PRICING_POOL")]
    pricing_pool: String,

    /// Wrapped native (gas) token address
    #[arg(long, env = "GAS_TOKEN")]
    gas_token: String,

    /// USD price served when the pricing pool is unavailable
    #[arg(long, default_value_t = 1.0)]
    gas_token_usd_fallback: f64,

    /// Route orderings per triplet: all | loan_origin_fixed
    #[arg(long, default_value = "all")]
    route_policy: String,

    /// Mixed-kind group handling: fail_closed | skip_and_continue
    #[arg(long, default_value = "fail_closed")]
    mixed_kind_policy: String,

    /// Max concurrent triplet evaluations
    #[arg(long, default_value_t = 8)]
    concurrency: usize,
}

fn parse_route_policy(value: &str) -> Result<RoutePolicy> {
    match value {
        "all" => Ok(RoutePolicy::All),
        "loan_origin_fixed" => Ok(RoutePolicy::LoanOriginFixed),
        other => anyhow::bail!("Unknown route policy '{}'", other),
    }
}

fn parse_mixed_kind_policy(value: &str) -> Result<MixedKindPolicy> {
    match value {
        "fail_closed" => Ok(MixedKindPolicy::FailClosed),
        "skip_and_continue" => Ok(MixedKindPolicy::SkipAndContinue),
        other => anyhow::bail!("Unknown mixed-kind policy '{}'", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = EngineConfig {
        concurrency: args.concurrency,
        route_policy: parse_route_policy(&args.route_policy)?,
        mixed_kind_policy: parse_mixed_kind_policy(&args.mixed_kind_policy)?,
        ..EngineConfig::default()
    };

    let pools = load_pools(&args.pools)?;
    info!(
        "Loaded {} pools from {} (loan {} / cycle every {}ms)",
        pools.len(),
        args.pools.display(),
        args.loan_amount,
        args.interval_ms
    );

    let pricing_pool_address: Address = args
        .pricing_pool
        .parse()
        .context("Invalid pricing pool address")?;
    let gas_token: Address = args.gas_token.parse().context("Invalid gas token address")?;
    let pricing_pool = pools
        .iter()
        .find(|p| p.address == pricing_pool_address)
        .cloned()
        .context("Pricing pool address not found in manifest")?;
    let fallback_usd = Decimal::from_f64(args.gas_token_usd_fallback)
        .context("Invalid gas token fallback price")?;

    let url = args.rpc_url.parse().context("Invalid RPC URL")?;
    let provider = Arc::new(ProviderBuilder::new().connect_http(url));
    info!("Connected to RPC endpoint");

    let source: Arc<dyn PoolDataSource> = Arc::new(RpcPoolSource::new(provider.clone()));
    let oracle = Arc::new(RpcGasOracle::new(
        provider,
        source.clone(),
        pricing_pool,
        gas_token,
        fallback_usd,
    ));
    let engine = Engine::new(source, oracle, config);
    let exporter = JsonExporter::new(&args.export);

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    loop {
        ticker.tick().await;

        let mut metrics = CycleMetrics::new();
        match engine.run_cycle(&pools, args.loan_amount, &mut metrics).await {
            Ok(ranked) => {
                info!("Cycle complete: {}", metrics.summary());
                if !ranked.is_empty() {
                    match exporter.append(&ranked) {
                        Ok(written) => info!("Exported {} candidates", written),
                        Err(e) => error!("Export failed: {:#}", e),
                    }
                }
            }
            Err(e) => error!("Cycle failed: {}", e),
        }
    }
}
