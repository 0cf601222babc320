//! Bluetooth receiver.
//!
//! Discovery is driven entirely by the platform: it runs rounds at its own
//! pace and hands over one batch per completed round. The receiver just
//! forwards batches to the listener until it is unregistered or the
//! platform ends discovery by closing the channel.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::BluetoothParams;
use crate::listener::ListenerRegistry;
use crate::platform::BluetoothScanSource;
use crate::reading::Reading;

use super::SourceReceiver;

pub(crate) struct BluetoothReceiver {
    bluetooth: Arc<dyn BluetoothScanSource>,
    listeners: Arc<ListenerRegistry>,
    params: BluetoothParams,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl BluetoothReceiver {
    pub(crate) fn new(
        bluetooth: Arc<dyn BluetoothScanSource>,
        listeners: Arc<ListenerRegistry>,
        params: BluetoothParams,
    ) -> Self {
        Self {
            bluetooth,
            listeners,
            params,
            cancel: CancellationToken::new(),
            task: None,
        }
    }
}

impl SourceReceiver for BluetoothReceiver {
    type Params = BluetoothParams;

    async fn register(&mut self) {
        debug!("Registering bluetooth receiver");
        self.cancel = CancellationToken::new();

        let mut batches = self.bluetooth.start_scan();
        let listeners = Arc::clone(&self.listeners);
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    batch = batches.recv() => match batch {
                        Some(entries) => {
                            let reading = Reading::now(entries);
                            debug!(
                                devices = reading.payload.len(),
                                "Bluetooth discovery round completed"
                            );
                            listeners.dispatch_bluetooth_scans(reading);
                        }
                        None => break,
                    },
                }
            }
        }));
    }

    async fn unregister(&mut self) {
        debug!("Unregistering bluetooth receiver");
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Bluetooth receiver task failed: {}", e);
            }
        }
        self.bluetooth.stop_scan();
    }

    async fn reload_configuration(&mut self, params: BluetoothParams) {
        if self.params == params {
            info!("Bluetooth configuration unchanged, not reloading");
            return;
        }
        debug!("Reloading bluetooth configuration");
        self.params = params;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::BluetoothScanListener;
    use crate::platform::BtScanEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct MockBluetooth {
        starts: AtomicUsize,
        stops: AtomicUsize,
        batch_tx: Mutex<Option<mpsc::Sender<Vec<BtScanEntry>>>>,
    }

    impl MockBluetooth {
        fn new() -> Self {
            Self {
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                batch_tx: Mutex::new(None),
            }
        }

        fn push_batch(&self, entries: Vec<BtScanEntry>) {
            let tx = self.batch_tx.lock().unwrap().clone();
            tx.expect("discovery not started")
                .try_send(entries)
                .expect("batch channel full");
        }
    }

    impl BluetoothScanSource for MockBluetooth {
        fn start_scan(&self) -> mpsc::Receiver<Vec<BtScanEntry>> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::channel(8);
            *self.batch_tx.lock().unwrap() = Some(tx);
            rx
        }

        fn stop_scan(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct RecordingBtListener {
        readings: Mutex<Vec<Reading<Vec<BtScanEntry>>>>,
    }

    impl BluetoothScanListener for RecordingBtListener {
        fn on_bluetooth_scans(&self, reading: Reading<Vec<BtScanEntry>>) {
            self.readings.lock().unwrap().push(reading);
        }
    }

    fn entry(address: &str) -> BtScanEntry {
        BtScanEntry {
            address: address.to_string(),
            name: Some("headset".to_string()),
            rssi_dbm: -70,
        }
    }

    async fn wait_for(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not met in time");
    }

    #[tokio::test]
    async fn test_batches_forwarded_to_listener() {
        let bluetooth = Arc::new(MockBluetooth::new());
        let listeners = Arc::new(ListenerRegistry::new());
        let listener = Arc::new(RecordingBtListener {
            readings: Mutex::new(Vec::new()),
        });
        listeners.set_bluetooth_listener(listener.clone());
        let mut receiver =
            BluetoothReceiver::new(bluetooth.clone(), listeners, BluetoothParams::default());

        receiver.register().await;
        bluetooth.push_batch(vec![entry("AA:BB:CC:DD:EE:FF"), entry("11:22:33:44:55:66")]);
        wait_for(|| !listener.readings.lock().unwrap().is_empty()).await;
        receiver.unregister().await;

        let readings = listener.readings.lock().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].payload.len(), 2);
        assert_eq!(readings[0].payload[0].address, "AA:BB:CC:DD:EE:FF");
    }

    #[tokio::test]
    async fn test_unregister_stops_discovery() {
        let bluetooth = Arc::new(MockBluetooth::new());
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver =
            BluetoothReceiver::new(bluetooth.clone(), listeners, BluetoothParams::default());

        receiver.register().await;
        receiver.unregister().await;

        assert_eq!(bluetooth.starts.load(Ordering::SeqCst), 1);
        assert_eq!(bluetooth.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_platform_closing_channel_ends_forwarding() {
        let bluetooth = Arc::new(MockBluetooth::new());
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver =
            BluetoothReceiver::new(bluetooth.clone(), listeners, BluetoothParams::default());

        receiver.register().await;
        // Dropping the sender emulates the platform ending discovery.
        *bluetooth.batch_tx.lock().unwrap() = None;

        tokio::time::timeout(Duration::from_secs(1), receiver.unregister())
            .await
            .expect("unregister did not finish");
    }

    #[tokio::test]
    async fn test_reload_with_unchanged_params_is_noop() {
        let bluetooth = Arc::new(MockBluetooth::new());
        let listeners = Arc::new(ListenerRegistry::new());
        let mut receiver =
            BluetoothReceiver::new(bluetooth.clone(), listeners, BluetoothParams::default());

        receiver.register().await;
        receiver.reload_configuration(BluetoothParams::default()).await;
        receiver.unregister().await;

        assert_eq!(bluetooth.starts.load(Ordering::SeqCst), 1);
    }
}
