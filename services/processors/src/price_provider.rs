//! Base-token USD price oracle (spec.md §4.11, §6: "external oracle...
//! HTTP GET to a price API with 60s cache and a fixed fallback value").

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::time::{Duration, Instant};

#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn base_token_price_usd(&self) -> Decimal;
}

#[derive(Debug, Clone)]
pub struct PriceProviderConfig {
    pub endpoint: Option<String>,
    pub fallback_price_usd: Decimal,
    pub cache_ttl: Duration,
}

/// Polls `endpoint` (expected to return `{"price": <number>}`), caching
/// the result for `cache_ttl`. Falls back to `fallback_price_usd` on any
/// failure, missing config, or cache miss with the endpoint unreachable.
pub struct HttpPriceProvider {
    client: reqwest::Client,
    config: PriceProviderConfig,
    cache: Mutex<Option<(Instant, Decimal)>>,
}

impl HttpPriceProvider {
    pub fn new(config: PriceProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            cache: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Option<Decimal> {
        let endpoint = self.config.endpoint.as_ref()?;
        let resp = self.client.get(endpoint).send().await.ok()?;
        let body: serde_json::Value = resp.json().await.ok()?;
        let price = body.get("price")?.as_f64()?;
        Decimal::try_from(price).ok()
    }
}

#[async_trait]
impl PriceProvider for HttpPriceProvider {
    async fn base_token_price_usd(&self) -> Decimal {
        if let Some((fetched_at, price)) = *self.cache.lock() {
            if fetched_at.elapsed() < self.config.cache_ttl {
                return price;
            }
        }

        match self.fetch().await {
            Some(price) => {
                *self.cache.lock() = Some((Instant::now(), price));
                price
            }
            None => {
                tracing::warn!("price oracle unavailable, using fallback");
                self.config.fallback_price_usd
            }
        }
    }
}

/// Test double returning a constant price (spec.md §4.8, used by
/// `AnalyticsEngine` tests throughout `processors`).
pub struct FixedPriceProvider(pub Decimal);

#[async_trait]
impl PriceProvider for FixedPriceProvider {
    async fn base_token_price_usd(&self) -> Decimal {
        self.0
    }
}
