//! Assembles an [`EnvTracker`] from its platform collaborators.

use std::sync::Arc;

use crate::capability::CapabilitySource;
use crate::config::Configuration;
use crate::platform::{
    BluetoothScanSource, CellInfoSource, LocationSource, PlatformVersion, WifiScanSource,
};

use super::error::TrackerError;
use super::EnvTracker;

/// Builder for [`EnvTracker`].
///
/// Every platform seam is required, bluetooth included, even when the
/// configuration leaves that source disabled: a later configuration update
/// may switch any source on, and by then it is too late to ask for the
/// collaborator. The platform version defaults to a current platform and
/// the initial configuration defaults to [`Configuration::default`] at
/// first start.
pub struct EnvTrackerBuilder {
    capability_source: Option<Arc<dyn CapabilitySource>>,
    platform_version: PlatformVersion,
    wifi_source: Option<Arc<dyn WifiScanSource>>,
    cell_source: Option<Arc<dyn CellInfoSource>>,
    location_source: Option<Arc<dyn LocationSource>>,
    bluetooth_source: Option<Arc<dyn BluetoothScanSource>>,
    configuration: Option<Configuration>,
}

impl EnvTrackerBuilder {
    pub fn new() -> Self {
        Self {
            capability_source: None,
            platform_version: PlatformVersion::default(),
            wifi_source: None,
            cell_source: None,
            location_source: None,
            bluetooth_source: None,
            configuration: None,
        }
    }

    pub fn capability_source(mut self, source: Arc<dyn CapabilitySource>) -> Self {
        self.capability_source = Some(source);
        self
    }

    pub fn platform_version(mut self, version: PlatformVersion) -> Self {
        self.platform_version = version;
        self
    }

    pub fn wifi_source(mut self, source: Arc<dyn WifiScanSource>) -> Self {
        self.wifi_source = Some(source);
        self
    }

    pub fn cell_source(mut self, source: Arc<dyn CellInfoSource>) -> Self {
        self.cell_source = Some(source);
        self
    }

    pub fn location_source(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.location_source = Some(source);
        self
    }

    pub fn bluetooth_source(mut self, source: Arc<dyn BluetoothScanSource>) -> Self {
        self.bluetooth_source = Some(source);
        self
    }

    /// Commits an initial configuration, as if
    /// [`EnvTracker::set_configuration`] had been called.
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn build(self) -> Result<EnvTracker, TrackerError> {
        let capability_source = self
            .capability_source
            .ok_or(TrackerError::MissingCollaborator("capability source"))?;
        let wifi_source = self
            .wifi_source
            .ok_or(TrackerError::MissingCollaborator("wifi source"))?;
        let cell_source = self
            .cell_source
            .ok_or(TrackerError::MissingCollaborator("cell source"))?;
        let location_source = self
            .location_source
            .ok_or(TrackerError::MissingCollaborator("location source"))?;
        let bluetooth_source = self
            .bluetooth_source
            .ok_or(TrackerError::MissingCollaborator("bluetooth source"))?;

        Ok(EnvTracker::new(
            capability_source,
            self.platform_version,
            wifi_source,
            cell_source,
            location_source,
            bluetooth_source,
            self.configuration,
        ))
    }
}

impl Default for EnvTrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
