//! Per-source tuning parameters and their defaults.

use std::time::Duration;

/// Default wifi scan interval in milliseconds.
pub const DEFAULT_WIFI_SCAN_INTERVAL_MS: u64 = 4_000;

/// Default cell scan interval in milliseconds.
pub const DEFAULT_CELL_SCAN_INTERVAL_MS: u64 = 7_000;

/// Default minimum time between gps fix deliveries in milliseconds.
pub const DEFAULT_GPS_MIN_INTERVAL_MS: u64 = 5_000;

/// Default minimum movement between gps fix deliveries in meters.
pub const DEFAULT_GPS_MIN_DISTANCE_M: f32 = 5.0;

/// How often to trigger wifi scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WifiParams {
    pub scan_interval_ms: u64,
}

impl WifiParams {
    pub fn new(scan_interval_ms: u64) -> Self {
        Self { scan_interval_ms }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}

impl Default for WifiParams {
    fn default() -> Self {
        Self::new(DEFAULT_WIFI_SCAN_INTERVAL_MS)
    }
}

/// How often to query the cellular environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellParams {
    pub scan_interval_ms: u64,
}

impl CellParams {
    pub fn new(scan_interval_ms: u64) -> Self {
        Self { scan_interval_ms }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}

impl Default for CellParams {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SCAN_INTERVAL_MS)
    }
}

/// Delivery thresholds for gps fixes.
///
/// Applied by the platform at subscription time, so changing these forces a
/// resubscribe rather than taking effect in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsParams {
    pub min_interval_ms: u64,
    pub min_distance_m: f32,
}

impl GpsParams {
    pub fn new(min_interval_ms: u64, min_distance_m: f32) -> Self {
        Self {
            min_interval_ms,
            min_distance_m,
        }
    }
}

impl Default for GpsParams {
    fn default() -> Self {
        Self::new(DEFAULT_GPS_MIN_INTERVAL_MS, DEFAULT_GPS_MIN_DISTANCE_M)
    }
}

/// Bluetooth discovery parameters.
///
/// Discovery rounds are paced by the platform, so there is nothing to tune
/// yet. The struct exists so the reload path treats bluetooth like every
/// other source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BluetoothParams {}
