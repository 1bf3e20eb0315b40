use config::AlertRoutingConfig;
use kv::{channels, KvClient};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use types::{Alert, AlertSeverity};

/// Queued Telegram delivery (spec.md §4.12: "telegram queue"). The actual
/// bot is an external collaborator (spec.md §1); this is only the handoff.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct TelegramQueueEntry {
    alert: Alert,
    urgent: bool,
}

pub struct AlertRouter {
    kv: KvClient,
    config: AlertRoutingConfig,
}

impl AlertRouter {
    pub fn new(kv: KvClient, config: AlertRoutingConfig) -> Self {
        Self { kv, config }
    }

    /// Subscribe to the alert firehose and route every alert until
    /// `shutdown` fires. Each severity tier is additive over the one
    /// below it (spec.md §4.12): LOW only ever reaches websocket (already
    /// done upstream), MEDIUM adds webhook, HIGH adds telegram, CRITICAL
    /// additionally logs to the critical-log sink.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut rx = self.kv.subscribe(channels::WEBSOCKET_ALERTS);
        info!("alert router subscribed to {}", channels::WEBSOCKET_ALERTS);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("alert router stopping");
                    return;
                }
                msg = rx.recv() => {
                    let Some(payload) = msg else {
                        warn!("alert router channel closed, stopping");
                        return;
                    };
                    match serde_json::from_str::<Alert>(&payload) {
                        Ok(alert) => self.route(&alert).await,
                        Err(e) => warn!(error = %e, "alert router: malformed alert payload, skipping"),
                    }
                }
            }
        }
    }

    async fn route(&self, alert: &Alert) {
        match alert.severity {
            AlertSeverity::Critical => {
                error!(
                    alert_id = %alert.id,
                    alert_type = ?alert.alert_type,
                    token = %types::addr_key(alert.token_address),
                    message = %alert.message,
                    "CRITICAL alert"
                );
                self.queue_telegram(alert, true).await;
                self.queue_webhooks(alert).await;
            }
            AlertSeverity::High => {
                self.queue_telegram(alert, false).await;
                self.queue_webhooks(alert).await;
            }
            AlertSeverity::Medium => {
                self.queue_webhooks(alert).await;
            }
            AlertSeverity::Low => {
                // Websocket-only; already published upstream.
            }
        }
    }

    async fn queue_telegram(&self, alert: &Alert, urgent: bool) {
        let entry = TelegramQueueEntry { alert: alert.clone(), urgent };
        match serde_json::to_string(&entry) {
            Ok(body) => {
                if let Err(e) = self.kv.list_push(channels::TELEGRAM_ALERTS_LIST, &body).await {
                    warn!(error = %e, alert_id = %alert.id, "failed to queue telegram alert");
                }
            }
            Err(e) => warn!(error = %e, alert_id = %alert.id, "failed to serialize telegram entry"),
        }
    }

    async fn queue_webhooks(&self, alert: &Alert) {
        if self.config.webhook_urls.is_empty() {
            return;
        }
        let payload = match serde_json::to_value(alert) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, alert_id = %alert.id, "failed to serialize webhook payload");
                return;
            }
        };
        for url in &self.config.webhook_urls {
            let entry = channels::WebhookQueueEntry {
                url: url.clone(),
                payload: payload.clone(),
                retries: 0,
            };
            match serde_json::to_string(&entry) {
                Ok(body) => {
                    if let Err(e) = self.kv.list_push(channels::WEBHOOKS_QUEUE_LIST, &body).await {
                        warn!(error = %e, alert_id = %alert.id, url = %url, "failed to queue webhook");
                    }
                }
                Err(e) => warn!(error = %e, alert_id = %alert.id, "failed to serialize webhook entry"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert(severity: AlertSeverity) -> Alert {
        Alert::new(
            types::AlertType::NewToken,
            severity,
            types::Address::zero(),
            "test",
            serde_json::json!({}),
            0,
        )
    }

    #[test]
    fn telegram_entry_round_trips() {
        let alert = sample_alert(AlertSeverity::Critical);
        let entry = TelegramQueueEntry { alert: alert.clone(), urgent: true };
        let json = serde_json::to_string(&entry).unwrap();
        let back: TelegramQueueEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.alert.id, alert.id);
        assert!(back.urgent);
    }
}
