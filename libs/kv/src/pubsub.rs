//! Reconnecting channel subscriber (spec.md §4.3: "subscribe loops
//! reconnect transparently"). Uses a dedicated raw connection per
//! subscription — `redis::aio::ConnectionManager` does not expose a
//! pub/sub message stream — so a slow subscriber only ever blocks its own
//! connection, never the shared general/publish ones.

use crate::client::KvClient;
use chain_client::backoff::rpc_backoff;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

impl KvClient {
    /// Subscribe to `channel`, returning a receiver of raw message bodies.
    /// Reconnects with the same full-jitter backoff schedule `ChainClient`
    /// uses for its streaming reconnect, indefinitely (channel
    /// subscriptions have no cursor to fall back to polling from, unlike
    /// `EventMonitor`'s head subscription).
    pub fn subscribe(&self, channel: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(256);
        let client = self.client.clone();
        let channel = channel.to_string();

        tokio::spawn(async move {
            let mut attempt = 0u32;
            loop {
                match client.get_async_pubsub().await {
                    Ok(mut pubsub) => {
                        if let Err(e) = pubsub.subscribe(&channel).await {
                            warn!(channel = %channel, error = %e, "subscribe failed");
                            attempt += 1;
                            tokio::time::sleep(rpc_backoff(attempt)).await;
                            continue;
                        }
                        attempt = 0;
                        info!(channel = %channel, "subscribed");
                        let mut stream = pubsub.on_message();
                        while let Some(msg) = stream.next().await {
                            let payload: String = match msg.get_payload() {
                                Ok(p) => p,
                                Err(e) => {
                                    warn!(channel = %channel, error = %e, "bad pubsub payload");
                                    continue;
                                }
                            };
                            if tx.send(payload).await.is_err() {
                                return;
                            }
                        }
                        warn!(channel = %channel, "pubsub stream ended, reconnecting");
                    }
                    Err(e) => {
                        warn!(channel = %channel, error = %e, "failed to open pubsub connection");
                    }
                }
                attempt += 1;
                tokio::time::sleep(rpc_backoff(attempt)).await;
            }
        });

        rx
    }
}
