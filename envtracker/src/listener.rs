//! Listener traits for tracker callbacks, and the registry that holds them.
//!
//! Hosts observe the tracker entirely through listeners. Data listeners are
//! one per source and survive a stop/start cycle; permission listeners are
//! a list and are cleared when the tracker stops, so each run starts with a
//! clean slate of denial observers.
//!
//! Single-method listeners are implemented by any matching closure:
//!
//! ```
//! use std::sync::Arc;
//! use envtracker::listener::WifiScanListener;
//! use envtracker::platform::ApScanEntry;
//! use envtracker::reading::Reading;
//!
//! let listener: Arc<dyn WifiScanListener> = Arc::new(|reading: Reading<Vec<ApScanEntry>>| {
//!     println!("saw {} access points", reading.payload.len());
//! });
//! # let _ = listener;
//! ```

use std::sync::{Arc, Mutex};

use crate::config::Configuration;
use crate::platform::{ApScanEntry, BtScanEntry, CellInfo, LocationFix, NeighborCellInfo};
use crate::reading::Reading;

/// Told which capabilities blocked a start attempt.
pub trait PermissionListener: Send + Sync {
    fn on_permission_not_granted(&self, capabilities: &[&str]);
}

impl<F> PermissionListener for F
where
    F: Fn(&[&str]) + Send + Sync,
{
    fn on_permission_not_granted(&self, capabilities: &[&str]) {
        self(capabilities)
    }
}

/// Told after a configuration update has been applied to a running tracker.
pub trait ConfigurationChangeListener: Send + Sync {
    fn on_configuration_change(&self, configuration: &Configuration);
}

impl<F> ConfigurationChangeListener for F
where
    F: Fn(&Configuration) + Send + Sync,
{
    fn on_configuration_change(&self, configuration: &Configuration) {
        self(configuration)
    }
}

/// Receives completed wifi scans.
pub trait WifiScanListener: Send + Sync {
    fn on_wifi_scans(&self, reading: Reading<Vec<ApScanEntry>>);
}

impl<F> WifiScanListener for F
where
    F: Fn(Reading<Vec<ApScanEntry>>) + Send + Sync,
{
    fn on_wifi_scans(&self, reading: Reading<Vec<ApScanEntry>>) {
        self(reading)
    }
}

/// Receives cell environment readings.
///
/// Which method fires depends on the platform level: modern platforms
/// deliver [`on_cell_info`], legacy platforms deliver [`on_neighbor_cells`].
/// Both default to doing nothing so an implementor only overrides the one
/// it cares about.
///
/// [`on_cell_info`]: CellScanListener::on_cell_info
/// [`on_neighbor_cells`]: CellScanListener::on_neighbor_cells
pub trait CellScanListener: Send + Sync {
    fn on_cell_info(&self, _reading: Reading<Vec<CellInfo>>) {}

    fn on_neighbor_cells(&self, _reading: Reading<Vec<NeighborCellInfo>>) {}
}

/// Receives location fixes.
pub trait GpsLocationListener: Send + Sync {
    fn on_location(&self, reading: Reading<LocationFix>);
}

impl<F> GpsLocationListener for F
where
    F: Fn(Reading<LocationFix>) + Send + Sync,
{
    fn on_location(&self, reading: Reading<LocationFix>) {
        self(reading)
    }
}

/// Receives bluetooth discovery batches.
pub trait BluetoothScanListener: Send + Sync {
    fn on_bluetooth_scans(&self, reading: Reading<Vec<BtScanEntry>>);
}

impl<F> BluetoothScanListener for F
where
    F: Fn(Reading<Vec<BtScanEntry>>) + Send + Sync,
{
    fn on_bluetooth_scans(&self, reading: Reading<Vec<BtScanEntry>>) {
        self(reading)
    }
}

/// Shared listener storage.
///
/// Receivers look a listener up at dispatch time, so setting one while the
/// tracker runs takes effect on the next reading. Locks are held only to
/// snapshot; listeners are always invoked outside the lock, so a listener
/// may call back into the registry freely.
pub(crate) struct ListenerRegistry {
    permission: Mutex<Vec<Arc<dyn PermissionListener>>>,
    configuration_change: Mutex<Option<Arc<dyn ConfigurationChangeListener>>>,
    wifi: Mutex<Option<Arc<dyn WifiScanListener>>>,
    cell: Mutex<Option<Arc<dyn CellScanListener>>>,
    gps: Mutex<Option<Arc<dyn GpsLocationListener>>>,
    bluetooth: Mutex<Option<Arc<dyn BluetoothScanListener>>>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            permission: Mutex::new(Vec::new()),
            configuration_change: Mutex::new(None),
            wifi: Mutex::new(None),
            cell: Mutex::new(None),
            gps: Mutex::new(None),
            bluetooth: Mutex::new(None),
        }
    }

    pub(crate) fn add_permission_listener(&self, listener: Arc<dyn PermissionListener>) {
        self.permission.lock().unwrap().push(listener);
    }

    pub(crate) fn clear_permission_listeners(&self) {
        self.permission.lock().unwrap().clear();
    }

    pub(crate) fn notify_permission_not_granted(&self, capabilities: &[&str]) {
        let listeners: Vec<_> = self.permission.lock().unwrap().clone();
        for listener in listeners {
            listener.on_permission_not_granted(capabilities);
        }
    }

    pub(crate) fn set_configuration_change_listener(
        &self,
        listener: Arc<dyn ConfigurationChangeListener>,
    ) {
        *self.configuration_change.lock().unwrap() = Some(listener);
    }

    pub(crate) fn notify_configuration_change(&self, configuration: &Configuration) {
        let listener = self.configuration_change.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_configuration_change(configuration);
        }
    }

    pub(crate) fn set_wifi_listener(&self, listener: Arc<dyn WifiScanListener>) {
        *self.wifi.lock().unwrap() = Some(listener);
    }

    pub(crate) fn dispatch_wifi_scans(&self, reading: Reading<Vec<ApScanEntry>>) {
        let listener = self.wifi.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_wifi_scans(reading);
        }
    }

    pub(crate) fn set_cell_listener(&self, listener: Arc<dyn CellScanListener>) {
        *self.cell.lock().unwrap() = Some(listener);
    }

    pub(crate) fn dispatch_cell_info(&self, reading: Reading<Vec<CellInfo>>) {
        let listener = self.cell.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_cell_info(reading);
        }
    }

    pub(crate) fn dispatch_neighbor_cells(&self, reading: Reading<Vec<NeighborCellInfo>>) {
        let listener = self.cell.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_neighbor_cells(reading);
        }
    }

    pub(crate) fn set_gps_listener(&self, listener: Arc<dyn GpsLocationListener>) {
        *self.gps.lock().unwrap() = Some(listener);
    }

    pub(crate) fn dispatch_location(&self, reading: Reading<LocationFix>) {
        let listener = self.gps.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_location(reading);
        }
    }

    pub(crate) fn set_bluetooth_listener(&self, listener: Arc<dyn BluetoothScanListener>) {
        *self.bluetooth.lock().unwrap() = Some(listener);
    }

    pub(crate) fn dispatch_bluetooth_scans(&self, reading: Reading<Vec<BtScanEntry>>) {
        let listener = self.bluetooth.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_bluetooth_scans(reading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ─────────────────────────────────────────────────────────────────────
    // Permission listeners
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_notify_reaches_every_permission_listener() {
        let registry = ListenerRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let count = first.clone();
        registry.add_permission_listener(Arc::new(move |_: &[&str]| {
            count.fetch_add(1, Ordering::SeqCst);
        }));
        let count = second.clone();
        registry.add_permission_listener(Arc::new(move |_: &[&str]| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify_permission_not_granted(&["location.fine"]);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_notify_with_no_listeners_is_noop() {
        let registry = ListenerRegistry::new();

        registry.notify_permission_not_granted(&["location.fine"]);
    }

    #[test]
    fn test_clear_removes_permission_listeners() {
        let registry = ListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let count = calls.clone();
        registry.add_permission_listener(Arc::new(move |_: &[&str]| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        registry.clear_permission_listeners();
        registry.notify_permission_not_granted(&["location.fine"]);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_permission_payload_passed_through() {
        let registry = ListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        registry.add_permission_listener(Arc::new(move |capabilities: &[&str]| {
            sink.lock()
                .unwrap()
                .extend(capabilities.iter().map(|c| c.to_string()));
        }));

        registry.notify_permission_not_granted(&["location.fine", "location.coarse"]);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["location.fine".to_string(), "location.coarse".to_string()]
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Data listeners
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_without_listener_is_noop() {
        let registry = ListenerRegistry::new();

        registry.dispatch_wifi_scans(Reading::now(Vec::new()));
        registry.dispatch_cell_info(Reading::now(Vec::new()));
        registry.dispatch_neighbor_cells(Reading::now(Vec::new()));
        registry.dispatch_bluetooth_scans(Reading::now(Vec::new()));
    }

    #[test]
    fn test_set_wifi_listener_replaces_previous() {
        let registry = ListenerRegistry::new();
        let old = Arc::new(AtomicUsize::new(0));
        let new = Arc::new(AtomicUsize::new(0));

        let count = old.clone();
        registry.set_wifi_listener(Arc::new(move |_: Reading<Vec<ApScanEntry>>| {
            count.fetch_add(1, Ordering::SeqCst);
        }));
        let count = new.clone();
        registry.set_wifi_listener(Arc::new(move |_: Reading<Vec<ApScanEntry>>| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        registry.dispatch_wifi_scans(Reading::now(Vec::new()));

        assert_eq!(old.load(Ordering::SeqCst), 0);
        assert_eq!(new.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cell_listener_default_methods_do_nothing() {
        struct NeighborOnly {
            neighbor_calls: AtomicUsize,
        }

        impl CellScanListener for NeighborOnly {
            fn on_neighbor_cells(&self, _reading: Reading<Vec<NeighborCellInfo>>) {
                self.neighbor_calls.fetch_add(1, Ordering::SeqCst);
            }
        }

        let registry = ListenerRegistry::new();
        let listener = Arc::new(NeighborOnly {
            neighbor_calls: AtomicUsize::new(0),
        });
        registry.set_cell_listener(listener.clone());

        registry.dispatch_cell_info(Reading::now(Vec::new()));
        registry.dispatch_neighbor_cells(Reading::now(Vec::new()));

        assert_eq!(listener.neighbor_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_reenter_registry() {
        let registry = Arc::new(ListenerRegistry::new());
        let inner_calls = Arc::new(AtomicUsize::new(0));

        let reentrant = registry.clone();
        let count = inner_calls.clone();
        registry.set_bluetooth_listener(Arc::new(move |_: Reading<Vec<BtScanEntry>>| {
            // A listener replacing itself must not deadlock on the slot lock.
            let count = count.clone();
            reentrant.set_bluetooth_listener(Arc::new(move |_: Reading<Vec<BtScanEntry>>| {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        registry.dispatch_bluetooth_scans(Reading::now(Vec::new()));
        registry.dispatch_bluetooth_scans(Reading::now(Vec::new()));

        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
    }
}
