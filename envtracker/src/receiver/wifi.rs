//! Wifi receiver.
//!
//! Runs two tasks once registered: a poll loop that triggers a platform
//! scan every interval, and a forwarder that turns scan-ready notifications
//! into listener dispatches. Capability grants are re-checked on every tick
//! because platforms with runtime grants can revoke them at any moment.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::capability::{self, CapabilityChecker};
use crate::config::WifiParams;
use crate::listener::ListenerRegistry;
use crate::platform::{PlatformVersion, WifiScanSource};
use crate::reading::Reading;

use super::SourceReceiver;

pub(crate) struct WifiReceiver {
    wifi: Arc<dyn WifiScanSource>,
    capabilities: CapabilityChecker,
    version: PlatformVersion,
    listeners: Arc<ListenerRegistry>,
    params: Arc<Mutex<WifiParams>>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl WifiReceiver {
    pub(crate) fn new(
        wifi: Arc<dyn WifiScanSource>,
        capabilities: CapabilityChecker,
        version: PlatformVersion,
        listeners: Arc<ListenerRegistry>,
        params: WifiParams,
    ) -> Self {
        Self {
            wifi,
            capabilities,
            version,
            listeners,
            params: Arc::new(Mutex::new(params)),
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    fn spawn_result_forwarder(&mut self) {
        let mut scan_ready = self.wifi.subscribe_scan_ready();
        let wifi = Arc::clone(&self.wifi);
        let listeners = Arc::clone(&self.listeners);
        let cancel = self.cancel.clone();

        self.tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    result = scan_ready.recv() => match result {
                        Ok(()) => {
                            let reading = Reading::now(wifi.scan_results());
                            debug!(
                                access_points = reading.payload.len(),
                                "Wifi scan completed"
                            );
                            listeners.dispatch_wifi_scans(reading);
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!(missed, "Wifi scan notifications lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        }));
    }

    fn spawn_scan_loop(&mut self) {
        let wifi = Arc::clone(&self.wifi);
        let capabilities = self.capabilities.clone();
        let version = self.version;
        let params = Arc::clone(&self.params);
        let cancel = self.cancel.clone();

        self.tasks.push(tokio::spawn(async move {
            loop {
                // Re-read on every tick so a reload takes effect at the
                // next re-arm without touching this task.
                let interval = params.lock().unwrap().scan_interval();
                let interval_ms = interval.as_millis() as u64;

                if version.requires_runtime_grants()
                    && !capabilities.any_granted(&capability::LOCATION_CAPABILITIES)
                {
                    warn!(
                        retry_ms = interval_ms,
                        "Location capability not granted, skipping wifi scan"
                    );
                } else if capabilities.all_granted(&capability::WIFI_CAPABILITIES) {
                    debug!(interval_ms, "Triggering wifi scan");
                    wifi.trigger_scan();
                }

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }));
    }
}

impl SourceReceiver for WifiReceiver {
    type Params = WifiParams;

    async fn register(&mut self) {
        debug!("Registering wifi receiver");
        self.cancel = CancellationToken::new();
        self.spawn_result_forwarder();
        self.spawn_scan_loop();
    }

    async fn unregister(&mut self) {
        debug!("Unregistering wifi receiver");
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                error!("Wifi receiver task failed: {}", e);
            }
        }
    }

    async fn reload_configuration(&mut self, params: WifiParams) {
        let mut current = self.params.lock().unwrap();
        if *current == params {
            info!("Wifi configuration unchanged, not reloading");
            return;
        }
        debug!(
            scan_interval_ms = params.scan_interval_ms,
            "Reloading wifi configuration"
        );
        *current = params;
    }
}
