//! `chainwatch`: entrypoint wiring ChainClient, Store, KV, the three
//! monitors, the domain processors, and the AlertRouter together
//! (spec.md §2, SPEC_FULL.md §5).

mod supervisor;

use chain_client::{ChainClient, ChainClientConfig};
use clap::Parser;
use ethers_core::types::Address;
use kv::KvClient;
use monitor::{DexMonitor, DriverConfig, EventMonitorDriver, FactoryMonitor, TransferMonitor};
use processors::{FixedPriceProvider, HttpPriceProvider, PriceProvider, PriceProviderConfig, TokenProcessor, TradeProcessor};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::Store;
use supervisor::Supervisor;
use tracing::info;

#[derive(Parser)]
#[command(name = "chainwatch")]
#[command(about = "Blockchain event-indexing and fan-out engine")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().json().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = config::Config::load(&args.config)?;
    init_logging(&config.log_level);

    info!(network = ?config.network, rpc_url = %config.rpc_url, "starting chainwatch");

    let chain = Arc::new(ChainClient::new(ChainClientConfig {
        rpc_url: config.rpc_url.clone(),
        ws_url: config.ws_url.clone(),
        retry_attempts: config.retry_attempts,
        call_timeout: Duration::from_secs(10),
        max_reconnect_attempts: 10,
        reconnect_backoff_cap: Duration::from_secs(30),
    })?);

    let store = Store::connect(&config.store_dsn).await?;
    let kv = KvClient::connect(&config.kv_url).await?;

    let price_provider: Arc<dyn PriceProvider> = match &config.price_oracle.endpoint {
        Some(_) => Arc::new(HttpPriceProvider::new(PriceProviderConfig {
            endpoint: config.price_oracle.endpoint.clone(),
            fallback_price_usd: rust_decimal::Decimal::try_from(config.price_oracle.fallback_price_usd)
                .unwrap_or(rust_decimal::Decimal::ZERO),
            cache_ttl: Duration::from_secs(config.price_oracle.cache_ttl_secs),
        })),
        None => Arc::new(FixedPriceProvider(
            rust_decimal::Decimal::try_from(config.price_oracle.fallback_price_usd)
                .unwrap_or(rust_decimal::Decimal::ZERO),
        )),
    };

    // Shared between `FactoryMonitor` (which discovers tokens) and
    // `TransferMonitor` (which watches them), seeded from the store's
    // existing registry plus the configured bootstrap list (spec.md §6:
    // "watched-token bootstrap list").
    let mut seed: HashSet<Address> = store.all_token_addresses().await?.into_iter().collect();
    seed.extend(config.watched_tokens.iter().copied());
    let watched_tokens: monitor::factory::TokenWatchSet = Arc::new(parking_lot::RwLock::new(seed));

    let token_processor = TokenProcessor::new(chain.clone(), kv.clone());
    let factory_handler = FactoryMonitor::new(
        chain.clone(),
        store.clone(),
        config.contracts.factory,
        kv.clone(),
        token_processor,
        price_provider.clone(),
        watched_tokens.clone(),
    );

    let trade_processor = TradeProcessor::new(kv.clone(), config.contracts.base_token);
    let known_pairs = store.all_pairs().await?;
    let dex_handler = DexMonitor::new(
        chain.clone(),
        kv.clone(),
        config.contracts.dex_factories.clone(),
        config.contracts.base_token,
        trade_processor,
        price_provider.clone(),
        known_pairs,
    );

    let transfer_handler = TransferMonitor::new(chain.clone(), kv.clone(), watched_tokens.clone());

    let base_driver_config = DriverConfig {
        confirmations: config.confirmations,
        batch_size: config.batch_size,
        retry_attempts: config.retry_attempts,
        retry_delay: Duration::from_millis(config.retry_delay_ms),
        start_block: config.start_block,
        poll_interval: Duration::from_secs(5),
    };

    // `TransferMonitor`'s historical back-fill uses wider windows than the
    // default catch-up batch (spec.md §4.7: "1000-block windows").
    let transfer_driver_config = DriverConfig {
        batch_size: monitor::transfer::HISTORICAL_BACKFILL_WINDOW,
        ..base_driver_config.clone()
    };

    let mut supervisor = Supervisor::new(config.network, kv.clone());

    supervisor.spawn_factory(EventMonitorDriver::new(
        chain.clone(),
        store.clone(),
        kv.clone(),
        factory_handler,
        base_driver_config.clone(),
    ));
    supervisor.spawn_dex(EventMonitorDriver::new(
        chain.clone(),
        store.clone(),
        kv.clone(),
        dex_handler,
        base_driver_config,
    ));
    supervisor.spawn_transfer(EventMonitorDriver::new(
        chain.clone(),
        store.clone(),
        kv.clone(),
        transfer_handler,
        transfer_driver_config,
    ));
    supervisor.spawn_alert_router(alerts::AlertRouter::new(kv.clone(), config.alerts.clone()));
    supervisor.spawn_status_snapshot();

    supervisor.run_until_shutdown().await
}
