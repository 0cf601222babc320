//! Capability-gated supervision of environmental source receivers.
//!
//! [`EnvTracker`] owns one receiver slot per source. Starting checks
//! capabilities up front and registers a receiver for every enabled
//! source; stopping unregisters and drops them all; a configuration update
//! against a running tracker diffs old against new enablement and only
//! touches the sources that changed.

mod builder;
mod error;

pub use builder::EnvTrackerBuilder;
pub use error::TrackerError;

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::capability::{self, CapabilityChecker, CapabilitySource};
use crate::config::{
    BluetoothParams, CellParams, Configuration, GpsParams, WifiParams,
};
use crate::listener::{
    BluetoothScanListener, CellScanListener, ConfigurationChangeListener, GpsLocationListener,
    ListenerRegistry, PermissionListener, WifiScanListener,
};
use crate::platform::{
    BluetoothScanSource, CellInfoSource, LocationSource, PlatformVersion, WifiScanSource,
};
use crate::receiver::{
    apply_source_diff, BluetoothReceiver, CellReceiver, GpsReceiver, SourceReceiver, WifiReceiver,
};

#[derive(Default)]
struct Receivers {
    wifi: Option<WifiReceiver>,
    cell: Option<CellReceiver>,
    gps: Option<GpsReceiver>,
    bluetooth: Option<BluetoothReceiver>,
}

/// Supervises the source receivers against one committed configuration.
///
/// Built through [`EnvTrackerBuilder`]. All methods take `&self`; the
/// tracker is meant to be shared behind an [`Arc`] between the task driving
/// its lifecycle and the listeners observing it.
pub struct EnvTracker {
    capabilities: CapabilityChecker,
    version: PlatformVersion,
    wifi_source: Arc<dyn WifiScanSource>,
    cell_source: Arc<dyn CellInfoSource>,
    location_source: Arc<dyn LocationSource>,
    bluetooth_source: Arc<dyn BluetoothScanSource>,
    listeners: Arc<ListenerRegistry>,
    running: Mutex<bool>,
    configuration: Mutex<Option<Configuration>>,
    receivers: tokio::sync::Mutex<Receivers>,
}

impl std::fmt::Debug for EnvTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvTracker").finish_non_exhaustive()
    }
}

impl EnvTracker {
    pub fn builder() -> EnvTrackerBuilder {
        EnvTrackerBuilder::new()
    }

    pub(crate) fn new(
        capability_source: Arc<dyn CapabilitySource>,
        version: PlatformVersion,
        wifi_source: Arc<dyn WifiScanSource>,
        cell_source: Arc<dyn CellInfoSource>,
        location_source: Arc<dyn LocationSource>,
        bluetooth_source: Arc<dyn BluetoothScanSource>,
        configuration: Option<Configuration>,
    ) -> Self {
        Self {
            capabilities: CapabilityChecker::new(capability_source),
            version,
            wifi_source,
            cell_source,
            location_source,
            bluetooth_source,
            listeners: Arc::new(ListenerRegistry::new()),
            running: Mutex::new(false),
            configuration: Mutex::new(configuration),
            receivers: tokio::sync::Mutex::new(Receivers::default()),
        }
    }

    /// Starts tracking every source the committed configuration enables.
    ///
    /// With no committed configuration, [`Configuration::default`] is
    /// committed first. If any enabled source lacks its capabilities the
    /// start is abandoned before anything registers and the permission
    /// listeners are told which capabilities to request. Starting a running
    /// tracker does nothing.
    pub async fn start(&self) {
        if self.is_running() {
            debug!("Tracker already running");
            return;
        }

        let configuration = {
            let mut committed = self.configuration.lock().unwrap();
            committed.get_or_insert_with(Configuration::default).clone()
        };

        if let Some(source) = self.blocked_source(&configuration) {
            warn!(source, "Capabilities missing, tracker not started");
            self.listeners
                .notify_permission_not_granted(&capability::LOCATION_CAPABILITIES);
            return;
        }

        info!(
            wifi = configuration.using_wifi(),
            cell = configuration.using_cell(),
            gps = configuration.using_gps(),
            bluetooth = configuration.using_bluetooth(),
            "Starting tracker"
        );

        let mut receivers = self.receivers.lock().await;
        if configuration.using_wifi() {
            let mut receiver = self.new_wifi_receiver(configuration.wifi_params());
            receiver.register().await;
            receivers.wifi = Some(receiver);
        }
        if configuration.using_cell() {
            let mut receiver = self.new_cell_receiver(configuration.cell_params());
            receiver.register().await;
            receivers.cell = Some(receiver);
        }
        if configuration.using_gps() {
            let mut receiver = self.new_gps_receiver(configuration.gps_params());
            receiver.register().await;
            receivers.gps = Some(receiver);
        }
        if configuration.using_bluetooth() {
            let mut receiver = self.new_bluetooth_receiver(configuration.bluetooth_params());
            receiver.register().await;
            receivers.bluetooth = Some(receiver);
        }
        drop(receivers);

        *self.running.lock().unwrap() = true;
        info!("Tracker started");
    }

    /// Stops tracking: unregisters and drops every live receiver, then
    /// clears the permission listeners so the next run starts with a clean
    /// slate of denial observers. Data listeners are kept. Stopping a
    /// stopped tracker does nothing.
    pub async fn stop(&self) {
        if !self.is_running() {
            warn!("Tracker not running, nothing to stop");
            return;
        }

        let mut receivers = self.receivers.lock().await;
        if let Some(mut receiver) = receivers.wifi.take() {
            receiver.unregister().await;
        }
        if let Some(mut receiver) = receivers.cell.take() {
            receiver.unregister().await;
        }
        if let Some(mut receiver) = receivers.gps.take() {
            receiver.unregister().await;
        }
        if let Some(mut receiver) = receivers.bluetooth.take() {
            receiver.unregister().await;
        }
        drop(receivers);

        self.listeners.clear_permission_listeners();
        *self.running.lock().unwrap() = false;
        info!("Tracker stopped");
    }

    /// Replaces the committed configuration.
    ///
    /// On a stopped tracker this just commits; the new configuration takes
    /// effect at the next [`start`](EnvTracker::start). On a running
    /// tracker the old and new enablement are diffed per source: newly
    /// enabled sources come up, newly disabled ones go down, and sources
    /// enabled in both get their new parameters without being restarted.
    /// The configuration change listener is notified only when a running
    /// tracker applied the update.
    pub async fn update_configuration(&self, configuration: Configuration) {
        if !self.is_running() {
            debug!("Tracker not running, committing configuration for next start");
            self.set_configuration(configuration);
            return;
        }

        let previous = {
            let committed = self.configuration.lock().unwrap();
            committed.clone().unwrap_or_default()
        };

        debug!("Applying configuration update to running tracker");

        let mut receivers = self.receivers.lock().await;
        apply_source_diff(
            previous.using_wifi(),
            configuration.using_wifi(),
            &mut receivers.wifi,
            configuration.wifi_params(),
            |params| self.new_wifi_receiver(params),
        )
        .await;
        apply_source_diff(
            previous.using_gps(),
            configuration.using_gps(),
            &mut receivers.gps,
            configuration.gps_params(),
            |params| self.new_gps_receiver(params),
        )
        .await;
        apply_source_diff(
            previous.using_cell(),
            configuration.using_cell(),
            &mut receivers.cell,
            configuration.cell_params(),
            |params| self.new_cell_receiver(params),
        )
        .await;
        apply_source_diff(
            previous.using_bluetooth(),
            configuration.using_bluetooth(),
            &mut receivers.bluetooth,
            configuration.bluetooth_params(),
            |params| self.new_bluetooth_receiver(params),
        )
        .await;
        drop(receivers);

        self.set_configuration(configuration.clone());
        self.listeners.notify_configuration_change(&configuration);
    }

    /// Commits a configuration without touching running receivers.
    pub fn set_configuration(&self, configuration: Configuration) {
        *self.configuration.lock().unwrap() = Some(configuration);
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock().unwrap()
    }

    /// Adds a listener told which capabilities blocked a start. The list
    /// is cleared when the tracker stops.
    pub fn add_permission_listener(&self, listener: Arc<dyn PermissionListener>) {
        self.listeners.add_permission_listener(listener);
    }

    pub fn set_configuration_change_listener(
        &self,
        listener: Arc<dyn ConfigurationChangeListener>,
    ) {
        self.listeners.set_configuration_change_listener(listener);
    }

    pub fn set_wifi_scan_listener(&self, listener: Arc<dyn WifiScanListener>) {
        self.listeners.set_wifi_listener(listener);
    }

    pub fn set_cell_scan_listener(&self, listener: Arc<dyn CellScanListener>) {
        self.listeners.set_cell_listener(listener);
    }

    pub fn set_gps_location_listener(&self, listener: Arc<dyn GpsLocationListener>) {
        self.listeners.set_gps_listener(listener);
    }

    pub fn set_bluetooth_scan_listener(&self, listener: Arc<dyn BluetoothScanListener>) {
        self.listeners.set_bluetooth_listener(listener);
    }

    /// First enabled source whose capabilities are missing, in the order
    /// the sources are checked. Platforms without runtime grants never
    /// block.
    fn blocked_source(&self, configuration: &Configuration) -> Option<&'static str> {
        if !self.version.requires_runtime_grants() {
            return None;
        }
        let location = self
            .capabilities
            .any_granted(&capability::LOCATION_CAPABILITIES);

        if configuration.using_wifi()
            && !location
            && !self.capabilities.all_granted(&capability::WIFI_CAPABILITIES)
        {
            return Some("wifi");
        }
        if configuration.using_gps() && !location {
            return Some("gps");
        }
        if configuration.using_bluetooth()
            && !location
            && !self
                .capabilities
                .all_granted(&capability::BLUETOOTH_CAPABILITIES)
        {
            return Some("bluetooth");
        }
        if configuration.using_cell() && !location {
            return Some("cell");
        }
        None
    }

    fn new_wifi_receiver(&self, params: WifiParams) -> WifiReceiver {
        WifiReceiver::new(
            Arc::clone(&self.wifi_source),
            self.capabilities.clone(),
            self.version,
            Arc::clone(&self.listeners),
            params,
        )
    }

    fn new_cell_receiver(&self, params: CellParams) -> CellReceiver {
        CellReceiver::new(
            Arc::clone(&self.cell_source),
            self.capabilities.clone(),
            self.version,
            Arc::clone(&self.listeners),
            params,
        )
    }

    fn new_gps_receiver(&self, params: GpsParams) -> GpsReceiver {
        GpsReceiver::new(
            Arc::clone(&self.location_source),
            Arc::clone(&self.listeners),
            params,
        )
    }

    fn new_bluetooth_receiver(&self, params: BluetoothParams) -> BluetoothReceiver {
        BluetoothReceiver::new(
            Arc::clone(&self.bluetooth_source),
            Arc::clone(&self.listeners),
            params,
        )
    }
}
