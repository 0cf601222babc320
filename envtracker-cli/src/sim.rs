//! Simulated platform backing the demo.
//!
//! Stands in for real radios: wifi scans complete instantly with a plausible
//! set of access points, the modem answers with jittered cells and sometimes
//! nothing at all, location fixes wander around a starting point, and
//! bluetooth discovery turns up a few devices per round. Seeded generators
//! make a run reproducible.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use envtracker::capability::{
    CapabilitySource, BLUETOOTH_SCAN, COARSE_LOCATION, FINE_LOCATION, WIFI_CONTROL, WIFI_STATE,
};
use envtracker::platform::{
    ApScanEntry, BluetoothScanSource, BtScanEntry, CellInfo, CellInfoSource, LocationFix,
    LocationRequest, LocationSource, LocationSubscription, NeighborCellInfo, ProviderKind,
    SubscriptionId, WifiScanSource,
};

const ALL_CAPABILITIES: [&str; 5] = [
    FINE_LOCATION,
    COARSE_LOCATION,
    WIFI_STATE,
    WIFI_CONTROL,
    BLUETOOTH_SCAN,
];

const SSIDS: [&str; 5] = ["backbone", "guest", "workshop", "cafe-terrace", "printer-2g"];

pub struct SimPlatform {
    granted: HashSet<String>,
    rng: Mutex<SmallRng>,
    scan_ready_tx: broadcast::Sender<()>,
    scan_results: Mutex<Vec<ApScanEntry>>,
    next_subscription: AtomicU64,
    location_tasks: Mutex<HashMap<u64, CancellationToken>>,
    discovery: Mutex<Option<CancellationToken>>,
}

impl SimPlatform {
    /// A platform granting every capability except the denied ones.
    ///
    /// A seed of zero picks a random one, anything else reproduces a run.
    pub fn new(denied: &[String], seed: u64) -> Self {
        let granted = ALL_CAPABILITIES
            .iter()
            .map(|c| c.to_string())
            .filter(|c| !denied.contains(c))
            .collect();
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        let (scan_ready_tx, _) = broadcast::channel(16);
        Self {
            granted,
            rng: Mutex::new(rng),
            scan_ready_tx,
            scan_results: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            location_tasks: Mutex::new(HashMap::new()),
            discovery: Mutex::new(None),
        }
    }

    /// An independent generator for a background task, derived from the
    /// shared one so seeded runs stay reproducible.
    fn task_rng(&self) -> SmallRng {
        SmallRng::seed_from_u64(self.rng.lock().unwrap().gen())
    }
}

impl CapabilitySource for SimPlatform {
    fn granted(&self, capability: &str) -> bool {
        self.granted.contains(capability)
    }
}

impl WifiScanSource for SimPlatform {
    fn trigger_scan(&self) {
        let results = {
            let mut rng = self.rng.lock().unwrap();
            let count = rng.gen_range(2..=SSIDS.len());
            SSIDS
                .iter()
                .take(count)
                .enumerate()
                .map(|(i, ssid)| ApScanEntry {
                    ssid: ssid.to_string(),
                    bssid: format!("02:00:00:00:00:{:02x}", i),
                    rssi_dbm: rng.gen_range(-90..=-40),
                    frequency_mhz: if rng.gen_bool(0.5) { 2_437 } else { 5_180 },
                })
                .collect()
        };
        *self.scan_results.lock().unwrap() = results;
        // Nobody listening is fine; the scan result just goes unseen.
        let _ = self.scan_ready_tx.send(());
    }

    fn scan_results(&self) -> Vec<ApScanEntry> {
        self.scan_results.lock().unwrap().clone()
    }

    fn subscribe_scan_ready(&self) -> broadcast::Receiver<()> {
        self.scan_ready_tx.subscribe()
    }
}

impl CellInfoSource for SimPlatform {
    fn current_cell_info(&self) -> Option<Vec<CellInfo>> {
        let mut rng = self.rng.lock().unwrap();
        // The modem occasionally has nothing to report.
        if rng.gen_ratio(1, 8) {
            return None;
        }
        let count: u32 = rng.gen_range(1..=3);
        Some(
            (0..count)
                .map(|i| CellInfo {
                    cell_id: 0x2600 + i,
                    area_code: 262,
                    rssi_dbm: rng.gen_range(-110..=-70),
                    registered: i == 0,
                })
                .collect(),
        )
    }

    fn neighboring_cell_info(&self) -> Option<Vec<NeighborCellInfo>> {
        let mut rng = self.rng.lock().unwrap();
        if rng.gen_ratio(1, 8) {
            return None;
        }
        let count: u32 = rng.gen_range(1..=3);
        Some(
            (0..count)
                .map(|i| NeighborCellInfo {
                    cell_id: 0x2700 + i,
                    area_code: 262,
                    rssi_dbm: rng.gen_range(-110..=-80),
                })
                .collect(),
        )
    }
}

impl LocationSource for SimPlatform {
    fn provider_available(&self, kind: ProviderKind) -> bool {
        kind == ProviderKind::Satellite
    }

    fn subscribe(&self, request: LocationRequest) -> LocationSubscription {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        self.location_tasks.lock().unwrap().insert(id.0, cancel.clone());

        let mut rng = self.task_rng();
        // The distance filter is not simulated; fixes are paced purely by
        // the requested interval.
        let interval = Duration::from_millis(request.min_interval_ms.max(250));
        let provider = request.provider;
        tokio::spawn(async move {
            let mut latitude = 52.520;
            let mut longitude = 13.405;
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                latitude += rng.gen_range(-0.0005..0.0005);
                longitude += rng.gen_range(-0.0005..0.0005);
                let fix = LocationFix {
                    latitude,
                    longitude,
                    altitude_m: 34.0 + rng.gen_range(-2.0..2.0),
                    accuracy_m: rng.gen_range(3.0..15.0),
                    speed_mps: rng.gen_range(0.0..2.0),
                    provider,
                };
                if tx.send(fix).await.is_err() {
                    break;
                }
            }
        });

        LocationSubscription { id, fixes: rx }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(cancel) = self.location_tasks.lock().unwrap().remove(&id.0) {
            cancel.cancel();
        }
    }
}

impl BluetoothScanSource for SimPlatform {
    fn start_scan(&self) -> mpsc::Receiver<Vec<BtScanEntry>> {
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        *self.discovery.lock().unwrap() = Some(cancel.clone());

        let mut rng = self.task_rng();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(3)) => {}
                }
                let count: u8 = rng.gen_range(0..=3);
                let batch = (0..count)
                    .map(|i| BtScanEntry {
                        address: format!(
                            "5C:F3:70:{:02X}:{:02X}:{:02X}",
                            rng.gen::<u8>(),
                            rng.gen::<u8>(),
                            i
                        ),
                        name: if rng.gen_bool(0.4) {
                            Some("earbuds".to_string())
                        } else {
                            None
                        },
                        rssi_dbm: rng.gen_range(-95..=-55),
                    })
                    .collect();
                if tx.send(batch).await.is_err() {
                    break;
                }
            }
        });

        rx
    }

    fn stop_scan(&self) {
        if let Some(cancel) = self.discovery.lock().unwrap().take() {
            cancel.cancel();
        }
    }
}
