//! Wifi scanning seam.

use tokio::sync::broadcast;

/// One access point observed in a wifi scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ApScanEntry {
    /// Network name as broadcast, possibly empty for hidden networks.
    pub ssid: String,
    /// Access point hardware address.
    pub bssid: String,
    /// Received signal strength.
    pub rssi_dbm: i32,
    /// Channel center frequency.
    pub frequency_mhz: u32,
}

/// Access to the host's wifi scanning machinery.
///
/// Scanning is asynchronous on real platforms: [`trigger_scan`] only asks
/// for a scan, completion arrives later as a scan-ready notification, and
/// [`scan_results`] then returns whatever the last completed scan saw.
///
/// [`trigger_scan`]: WifiScanSource::trigger_scan
/// [`scan_results`]: WifiScanSource::scan_results
pub trait WifiScanSource: Send + Sync {
    /// Asks the platform to begin a scan. Fire and forget.
    fn trigger_scan(&self);

    /// Results of the most recently completed scan.
    fn scan_results(&self) -> Vec<ApScanEntry>;

    /// Subscribes to scan-ready notifications. Each notification means a
    /// scan completed and [`scan_results`](WifiScanSource::scan_results)
    /// holds fresh data. Dropping the receiver ends the subscription.
    fn subscribe_scan_ready(&self) -> broadcast::Receiver<()>;
}
