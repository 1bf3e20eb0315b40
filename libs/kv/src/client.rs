//! `KvClient`: typed get/set, list/sorted-set/hash ops, and publish, over a
//! `redis::aio::ConnectionManager` (spec.md §4.3).
//!
//! Two logical roles are kept on separate connections — general ops and
//! publish — so a burst of cache writes never queues behind a publish, and
//! vice versa (spec.md §5: "KV client set (separate connections for
//! publish, subscribe, general ops) to avoid blocking publishers on slow
//! subscribers"). The subscribe role is handled separately by
//! [`crate::pubsub::subscribe`], which opens its own raw connection per the
//! same rationale.

use crate::error::Result;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct KvClient {
    general: ConnectionManager,
    publisher: ConnectionManager,
    pub(crate) client: redis::Client,
}

impl KvClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let general = ConnectionManager::new(client.clone()).await?;
        let publisher = ConnectionManager::new(client.clone()).await?;
        Ok(Self { general, publisher, client })
    }

    // -- typed key/value -----------------------------------------------

    pub async fn set_string(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.general.clone();
        match ttl {
            Some(ttl) => conn.set_ex(key, value, ttl.as_secs()).await?,
            None => conn.set(key, value).await?,
        };
        Ok(())
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.general.clone();
        Ok(conn.get(key).await?)
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_string(key, &json, ttl).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_string(key).await? {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    // -- lists ------------------------------------------------------------

    /// Push onto the head of a list, trim to `max_len`, and set a TTL —
    /// the `trades:recent:<pair>` / `trades:token:<token>` pattern
    /// (spec.md §6).
    pub async fn list_push_trim(
        &self,
        key: &str,
        value: &str,
        max_len: isize,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let mut conn = self.general.clone();
        conn.lpush(key, value).await?;
        conn.ltrim(key, 0, max_len - 1).await?;
        if let Some(ttl) = ttl {
            conn.expire(key, ttl.as_secs() as i64).await?;
        }
        Ok(())
    }

    pub async fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.general.clone();
        Ok(conn.lrange(key, start, stop).await?)
    }

    // -- sorted sets -------------------------------------------------------

    pub async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut conn = self.general.clone();
        conn.zadd(key, member, score).await?;
        Ok(())
    }

    pub async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.general.clone();
        Ok(conn.zrange(key, start, stop).await?)
    }

    pub async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.general.clone();
        Ok(conn.zrevrange(key, start, stop).await?)
    }

    /// Members scored within `[min, max]`, in ascending score order — used
    /// by the rolling volume/price windows to read back everything still
    /// inside a window after pruning (spec.md §4.9).
    pub async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        let mut conn = self.general.clone();
        Ok(conn.zrangebyscore(key, min, max).await?)
    }

    /// Drop members scored within `[min, max]` — used to prune entries that
    /// have aged out of a rolling window.
    pub async fn zremrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<()> {
        let mut conn = self.general.clone();
        conn.zremrangebyscore::<_, _, _, ()>(key, min, max).await?;
        Ok(())
    }

    // -- hashes ------------------------------------------------------------

    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.general.clone();
        conn.hset(key, field, value).await?;
        Ok(())
    }

    pub async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.general.clone();
        Ok(conn.hget(key, field).await?)
    }

    pub async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        let mut conn = self.general.clone();
        Ok(conn.hgetall(key).await?)
    }

    pub async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.general.clone();
        conn.sadd(key, member).await?;
        Ok(())
    }

    pub async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.general.clone();
        Ok(conn.smembers(key).await?)
    }

    // -- pub/sub -----------------------------------------------------------

    /// Fire-and-forget publish (spec.md §4.3: "publishes are best-effort").
    /// A failed publish is logged, never surfaced to the caller — a
    /// processor's Store commit has already succeeded by the time it
    /// publishes.
    pub async fn publish(&self, channel: &str, payload: &serde_json::Value) {
        let mut conn = self.publisher.clone();
        let body = match serde_json::to_string(payload) {
            Ok(b) => b,
            Err(e) => {
                warn!(channel, error = %e, "failed to serialize publish payload");
                return;
            }
        };
        if let Err(e) = conn.publish::<_, _, ()>(channel, body).await {
            warn!(channel, error = %e, "best-effort publish failed");
        }
    }

    pub async fn list_push(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.general.clone();
        conn.rpush(key, value).await?;
        Ok(())
    }

    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.general.clone();
        conn.expire::<_, ()>(key, ttl.as_secs() as i64).await?;
        Ok(())
    }
}
