//! Cell receiver.
//!
//! A single poll loop queries the modem snapshot every interval and
//! dispatches whatever it saw, empty included, so listeners can tell "no
//! cells visible" apart from "not scanning". The query style is picked once
//! at registration from the platform level: modern platforms use the
//! unified cell-info query, older ones the legacy neighboring-cell query.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::capability::{self, CapabilityChecker};
use crate::config::CellParams;
use crate::listener::ListenerRegistry;
use crate::platform::{CellInfoSource, PlatformVersion};
use crate::reading::Reading;

use super::SourceReceiver;

pub(crate) struct CellReceiver {
    cell: Arc<dyn CellInfoSource>,
    capabilities: CapabilityChecker,
    version: PlatformVersion,
    listeners: Arc<ListenerRegistry>,
    params: Arc<Mutex<CellParams>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl CellReceiver {
    pub(crate) fn new(
        cell: Arc<dyn CellInfoSource>,
        capabilities: CapabilityChecker,
        version: PlatformVersion,
        listeners: Arc<ListenerRegistry>,
        params: CellParams,
    ) -> Self {
        Self {
            cell,
            capabilities,
            version,
            listeners,
            params: Arc::new(Mutex::new(params)),
            cancel: CancellationToken::new(),
            task: None,
        }
    }
}

impl SourceReceiver for CellReceiver {
    type Params = CellParams;

    async fn register(&mut self) {
        debug!("Registering cell receiver");
        self.cancel = CancellationToken::new();

        let modern = self.version.has_modern_cell_info();
        let cell = Arc::clone(&self.cell);
        let capabilities = self.capabilities.clone();
        let version = self.version;
        let listeners = Arc::clone(&self.listeners);
        let params = Arc::clone(&self.params);
        let cancel = self.cancel.clone();

        self.task = Some(tokio::spawn(async move {
            loop {
                let interval = params.lock().unwrap().scan_interval();
                let interval_ms = interval.as_millis() as u64;

                if version.requires_runtime_grants()
                    && !capabilities.any_granted(&capability::LOCATION_CAPABILITIES)
                {
                    warn!(
                        retry_ms = interval_ms,
                        "Location capability not granted, skipping cell scan"
                    );
                } else if modern {
                    let reading = Reading::now(cell.current_cell_info().unwrap_or_default());
                    debug!(
                        cells = reading.payload.len(),
                        interval_ms, "Scanned cell environment"
                    );
                    listeners.dispatch_cell_info(reading);
                } else {
                    let reading = Reading::now(cell.neighboring_cell_info().unwrap_or_default());
                    debug!(
                        cells = reading.payload.len(),
                        interval_ms, "Scanned neighboring cells"
                    );
                    listeners.dispatch_neighbor_cells(reading);
                }

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }));
    }

    async fn unregister(&mut self) {
        debug!("Unregistering cell receiver");
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Cell receiver task failed: {}", e);
            }
        }
    }

    async fn reload_configuration(&mut self, params: CellParams) {
        let mut current = self.params.lock().unwrap();
        if *current == params {
            info!("Cell configuration unchanged, not reloading");
            return;
        }
        debug!(
            scan_interval_ms = params.scan_interval_ms,
            "Reloading cell configuration"
        );
        *current = params;
    }
}
