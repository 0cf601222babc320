//! Host capability grants and the checks receivers gate on.
//!
//! The tracker never talks to a permission system directly. The host hands it
//! a [`CapabilitySource`] and every gate in the crate goes through
//! [`CapabilityChecker`], so tests and simulators can grant or deny
//! capabilities freely.

use std::sync::Arc;

/// Grants access to precise location readings.
pub const FINE_LOCATION: &str = "location.fine";

/// Grants access to coarse (cell/wifi derived) location readings.
pub const COARSE_LOCATION: &str = "location.coarse";

/// Grants read access to wifi radio state and scan results.
pub const WIFI_STATE: &str = "wifi.state";

/// Grants the right to trigger wifi scans.
pub const WIFI_CONTROL: &str = "wifi.control";

/// Grants the right to run bluetooth discovery.
pub const BLUETOOTH_SCAN: &str = "bluetooth.scan";

/// The location pair. Scanning any radio environment reveals location, so
/// most gates accept either of these.
pub const LOCATION_CAPABILITIES: [&str; 2] = [FINE_LOCATION, COARSE_LOCATION];

/// Wifi-specific capabilities that together substitute for a location grant
/// when triggering scans.
pub const WIFI_CAPABILITIES: [&str; 2] = [WIFI_STATE, WIFI_CONTROL];

/// Bluetooth-specific capabilities that together substitute for a location
/// grant when running discovery.
pub const BLUETOOTH_CAPABILITIES: [&str; 1] = [BLUETOOTH_SCAN];

/// Answers whether a single capability is currently granted to this process.
///
/// Implementations must reflect the live grant state on every call. Grants
/// can be revoked at runtime on platforms that support it, which is why
/// receivers re-check before every scan rather than caching the answer.
pub trait CapabilitySource: Send + Sync {
    /// Returns true if `capability` is granted right now.
    fn granted(&self, capability: &str) -> bool;
}

/// Convenience queries over a [`CapabilitySource`].
///
/// Cheap to clone; clones share the underlying source.
#[derive(Clone)]
pub struct CapabilityChecker {
    source: Arc<dyn CapabilitySource>,
}

impl CapabilityChecker {
    /// Creates a checker backed by the given source.
    pub fn new(source: Arc<dyn CapabilitySource>) -> Self {
        Self { source }
    }

    /// Returns true if the single capability is granted.
    pub fn granted(&self, capability: &str) -> bool {
        self.source.granted(capability)
    }

    /// Returns true if at least one of the capabilities is granted.
    ///
    /// An empty slice yields false.
    pub fn any_granted(&self, capabilities: &[&str]) -> bool {
        capabilities.iter().any(|c| self.source.granted(c))
    }

    /// Returns true if every one of the capabilities is granted.
    ///
    /// An empty slice yields true.
    pub fn all_granted(&self, capabilities: &[&str]) -> bool {
        capabilities.iter().all(|c| self.source.granted(c))
    }
}

impl std::fmt::Debug for CapabilityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityChecker").finish_non_exhaustive()
    }
}
