//! Seams between the tracker and the host platform.
//!
//! Each radio or sensor the tracker can supervise is reached through a
//! trait object supplied by the host at construction time. The traits model
//! how real platforms behave (asynchronous wifi scans, snapshot cell
//! queries, push location subscriptions) without binding to any one of
//! them, so a simulator satisfies them just as well as real hardware glue.

pub mod bluetooth;
pub mod cell;
pub mod location;
pub mod version;
pub mod wifi;

pub use bluetooth::{BluetoothScanSource, BtScanEntry};
pub use cell::{CellInfo, CellInfoSource, NeighborCellInfo};
pub use location::{
    LocationFix, LocationRequest, LocationSource, LocationSubscription, ProviderKind,
    SubscriptionId,
};
pub use version::{ApiLevel, PlatformVersion};
pub use wifi::{ApScanEntry, WifiScanSource};
