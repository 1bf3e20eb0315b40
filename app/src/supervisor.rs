//! Supervisory wiring (SPEC_FULL.md §5): starts one task per monitor plus
//! the alert router, propagates a shutdown signal to all of them, and
//! emits the once-a-minute status snapshot (spec.md §7).

use alerts::AlertRouter;
use kv::{channels, KvClient};
use monitor::{DexMonitor, EventMonitorDriver, FactoryMonitor, MonitorStatus, TransferMonitor};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// One running monitor, kept only for its status handle and join handle
/// — the driver itself is moved into its task.
struct RunningMonitor {
    name: &'static str,
    status: Arc<parking_lot::RwLock<MonitorStatus>>,
    handle: JoinHandle<()>,
}

pub struct Supervisor {
    network: config::Network,
    kv: KvClient,
    monitors: Vec<RunningMonitor>,
    alert_router_handle: Option<JoinHandle<()>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Supervisor {
    pub fn new(network: config::Network, kv: KvClient) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self { network, kv, monitors: Vec::new(), alert_router_handle: None, shutdown_tx }
    }

    pub fn spawn_factory(&mut self, driver: EventMonitorDriver<FactoryMonitor>) {
        self.spawn_monitor("factory", driver);
    }

    pub fn spawn_dex(&mut self, driver: EventMonitorDriver<DexMonitor>) {
        self.spawn_monitor("dex", driver);
    }

    pub fn spawn_transfer(&mut self, driver: EventMonitorDriver<TransferMonitor>) {
        self.spawn_monitor("transfer", driver);
    }

    fn spawn_monitor<H>(&mut self, name: &'static str, driver: EventMonitorDriver<H>)
    where
        H: monitor::RangeHandler + 'static,
    {
        let status = driver.status();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            // `EventMonitorDriver::run` owns the state machine until
            // shutdown or a fatal error; a fatal error here stops only
            // this monitor (spec.md §7: "A failure in one monitor must
            // not stop the others").
            if let Err(e) = driver.run(shutdown_rx).await {
                tracing::error!(monitor = name, error = %e, "monitor stopped");
            }
        });
        self.monitors.push(RunningMonitor { name, status, handle });
    }

    pub fn spawn_alert_router(&mut self, router: AlertRouter) {
        let shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            router.run(shutdown_rx).await;
        });
        self.alert_router_handle = Some(handle);
    }

    /// Background task publishing `{network, running, current_block,
    /// monitors}` once a minute (spec.md §7), as both a structured log
    /// line and a KV key so it is inspectable without grepping logs
    /// (SPEC_FULL.md §7).
    pub fn spawn_status_snapshot(&self) -> JoinHandle<()> {
        let kv = self.kv.clone();
        let network = self.network;
        let statuses: Vec<(&'static str, Arc<parking_lot::RwLock<MonitorStatus>>)> =
            self.monitors.iter().map(|m| (m.name, m.status.clone())).collect();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => return,
                    _ = interval.tick() => {
                        let mut monitors = HashMap::new();
                        let mut current_block = 0u64;
                        for (name, status) in &statuses {
                            let s = status.read();
                            current_block = current_block.max(s.last_processed_block);
                            monitors.insert(
                                name.to_string(),
                                serde_json::json!({
                                    "running": s.running,
                                    "last_processed_block": s.last_processed_block,
                                }),
                            );
                        }
                        let snapshot = serde_json::json!({
                            "network": network,
                            "running": true,
                            "current_block": current_block,
                            "monitors": monitors,
                        });
                        info!(snapshot = %snapshot, "status snapshot");
                        kv.set_json(channels::STATUS_SNAPSHOT, &snapshot, None).await.ok();
                        kv.set_string(channels::METRICS_TEXT, &monitor::metrics::render(), None).await.ok();
                    }
                }
            }
        })
    }

    /// Wait for `ctrl_c`, propagate shutdown, then drain every monitor
    /// and the alert router to completion (spec.md §5: "stops accepting
    /// new ranges... drains its current in-flight batch... commits or
    /// rolls back... reports stopped").
    pub async fn run_until_shutdown(self) -> anyhow::Result<()> {
        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received, draining monitors");
        let _ = self.shutdown_tx.send(());

        for m in self.monitors {
            if let Err(e) = m.handle.await {
                tracing::warn!(monitor = m.name, error = %e, "monitor task panicked");
            }
        }
        if let Some(handle) = self.alert_router_handle {
            let _ = handle.await;
        }
        info!("all monitors stopped");
        Ok(())
    }
}
