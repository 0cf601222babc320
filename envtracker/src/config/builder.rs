//! Tracker configuration and its builder.

use super::params::{BluetoothParams, CellParams, GpsParams, WifiParams};

/// Which sources to track and how each is tuned.
///
/// Immutable once built. The tracker treats a configuration as a value: it
/// commits one, compares old against new on update, and never mutates one
/// in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    use_wifi: bool,
    use_cell: bool,
    use_gps: bool,
    use_bluetooth: bool,
    wifi: WifiParams,
    cell: CellParams,
    gps: GpsParams,
    bluetooth: BluetoothParams,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// A builder seeded with this configuration, for deriving variants.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder {
            use_wifi: self.use_wifi,
            use_cell: self.use_cell,
            use_gps: self.use_gps,
            use_bluetooth: self.use_bluetooth,
            wifi: self.wifi,
            cell: self.cell,
            gps: self.gps,
            bluetooth: self.bluetooth,
        }
    }

    pub fn using_wifi(&self) -> bool {
        self.use_wifi
    }

    pub fn using_cell(&self) -> bool {
        self.use_cell
    }

    pub fn using_gps(&self) -> bool {
        self.use_gps
    }

    pub fn using_bluetooth(&self) -> bool {
        self.use_bluetooth
    }

    pub fn wifi_params(&self) -> WifiParams {
        self.wifi
    }

    pub fn cell_params(&self) -> CellParams {
        self.cell
    }

    pub fn gps_params(&self) -> GpsParams {
        self.gps
    }

    pub fn bluetooth_params(&self) -> BluetoothParams {
        self.bluetooth
    }
}

impl Default for Configuration {
    /// Wifi, cell and gps tracking on with default tuning, bluetooth off.
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builds a [`Configuration`].
///
/// Starts from the defaults, so only deviations need to be spelled out:
///
/// ```
/// use envtracker::config::{Configuration, WifiParams};
///
/// let config = Configuration::builder()
///     .use_gps(false)
///     .wifi(WifiParams::new(2_000))
///     .build();
///
/// assert!(config.using_wifi());
/// assert!(!config.using_gps());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    use_wifi: bool,
    use_cell: bool,
    use_gps: bool,
    use_bluetooth: bool,
    wifi: WifiParams,
    cell: CellParams,
    gps: GpsParams,
    bluetooth: BluetoothParams,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            use_wifi: true,
            use_cell: true,
            use_gps: true,
            use_bluetooth: false,
            wifi: WifiParams::default(),
            cell: CellParams::default(),
            gps: GpsParams::default(),
            bluetooth: BluetoothParams::default(),
        }
    }

    pub fn use_wifi(mut self, enabled: bool) -> Self {
        self.use_wifi = enabled;
        self
    }

    pub fn use_cell(mut self, enabled: bool) -> Self {
        self.use_cell = enabled;
        self
    }

    pub fn use_gps(mut self, enabled: bool) -> Self {
        self.use_gps = enabled;
        self
    }

    pub fn use_bluetooth(mut self, enabled: bool) -> Self {
        self.use_bluetooth = enabled;
        self
    }

    pub fn wifi(mut self, params: WifiParams) -> Self {
        self.wifi = params;
        self
    }

    pub fn cell(mut self, params: CellParams) -> Self {
        self.cell = params;
        self
    }

    pub fn gps(mut self, params: GpsParams) -> Self {
        self.gps = params;
        self
    }

    pub fn bluetooth(mut self, params: BluetoothParams) -> Self {
        self.bluetooth = params;
        self
    }

    pub fn build(self) -> Configuration {
        Configuration {
            use_wifi: self.use_wifi,
            use_cell: self.use_cell,
            use_gps: self.use_gps,
            use_bluetooth: self.use_bluetooth,
            wifi: self.wifi,
            cell: self.cell,
            gps: self.gps,
            bluetooth: self.bluetooth,
        }
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
