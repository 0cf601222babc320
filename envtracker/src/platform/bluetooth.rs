//! Bluetooth discovery seam.

use tokio::sync::mpsc;

/// One device observed in a bluetooth discovery round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtScanEntry {
    /// Device hardware address.
    pub address: String,
    /// Advertised name, if the device broadcasts one.
    pub name: Option<String>,
    /// Received signal strength.
    pub rssi_dbm: i32,
}

/// Access to the host's bluetooth discovery machinery.
///
/// Discovery runs in rounds on the platform side; each completed round is
/// delivered as one batch on the returned channel. The platform closes the
/// channel when discovery ends on its side.
pub trait BluetoothScanSource: Send + Sync {
    /// Starts discovery and returns the channel round results arrive on.
    fn start_scan(&self) -> mpsc::Receiver<Vec<BtScanEntry>>;

    /// Stops discovery. Idempotent.
    fn stop_scan(&self);
}
