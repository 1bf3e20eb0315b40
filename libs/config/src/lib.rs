//! Centralized configuration (spec.md §6).
//!
//! Loaded from a TOML file with `CHAINWATCH_`-prefixed environment variable
//! overrides, mirroring the `config-crate` + `Environment` pattern used
//! throughout this codebase's service layer.

use anyhow::{Context, Result};
use config_crate::{Config as RawConfig, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use types::Address;

/// Which network this instance is watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

/// A single DEX factory this instance discovers pairs from (spec.md §6:
/// "per-contract addresses for factory/staking/treasury/DEX factories
/// with their init-code-hashes and fee tiers").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexFactoryConfig {
    pub name: String,
    pub address: Address,
    pub init_code_hash: String,
    pub fee_bps: u32,
}

/// Contract addresses this instance watches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub factory: Address,
    pub staking: Option<Address>,
    pub treasury: Option<Address>,
    #[serde(default)]
    pub dex_factories: Vec<DexFactoryConfig>,
    /// The wrapped native token used as the common DEX quote (glossary
    /// "Base token").
    pub base_token: Address,
}

/// External USD price oracle for the base token (spec.md §4.11, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOracleConfig {
    pub endpoint: Option<String>,
    pub fallback_price_usd: f64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

/// Top-level configuration, one instance per process (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: Network,
    pub rpc_url: String,
    pub ws_url: Option<String>,
    pub start_block: Option<u64>,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub store_dsn: String,
    pub kv_url: String,
    pub contracts: ContractsConfig,
    /// Bootstrap list of ERC-20 tokens `TransferMonitor` watches from
    /// startup (spec.md §6: "watched-token bootstrap list").
    #[serde(default)]
    pub watched_tokens: Vec<Address>,
    pub price_oracle: PriceOracleConfig,
    #[serde(default)]
    pub alerts: AlertRoutingConfig,
}

/// Fan-out destinations `AlertRouter` drains its queues into (spec.md
/// §4.12). The actual delivery workers (Telegram bot, webhook sender) are
/// external collaborators; this config only says where their queued work
/// lands and which webhook URLs are subscribed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertRoutingConfig {
    #[serde(default)]
    pub webhook_urls: Vec<String>,
}

fn default_confirmations() -> u64 {
    3
}
fn default_batch_size() -> u64 {
    100
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from a TOML file, then apply `CHAINWATCH_`-prefixed env
    /// overrides (e.g. `CHAINWATCH_RPC_URL`, `CHAINWATCH_CONFIRMATIONS`).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = RawConfig::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix("CHAINWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;

        raw.try_deserialize()
            .context("deserializing chainwatch config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> String {
        r#"
            network = "testnet"
            rpc_url = "https://example-rpc"
            store_dsn = "postgres://localhost/chainwatch"
            kv_url = "redis://localhost"

            [contracts]
            factory = "0x0000000000000000000000000000000000000001"
            base_token = "0x0000000000000000000000000000000000000002"

            [price_oracle]
            fallback_price_usd = 1.0
        "#
        .to_string()
    }

    #[test]
    fn loads_defaults_for_omitted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.confirmations, 3);
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.retry_attempts, 3);
        assert_eq!(cfg.retry_delay_ms, 1000);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.contracts.dex_factories.is_empty());
    }

    #[test]
    fn env_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        std::env::set_var("CHAINWATCH__CONFIRMATIONS", "12");
        let cfg = Config::load(&path).unwrap();
        std::env::remove_var("CHAINWATCH__CONFIRMATIONS");

        assert_eq!(cfg.confirmations, 12);
    }
}
