//! EnvTracker
//!
//! A supervisor for environmental data sources: wifi scans, cellular
//! environment, location fixes and bluetooth discovery. The host supplies
//! the platform seams (capability grants, radios, providers) as trait
//! objects; the tracker gates everything on live capability checks, runs
//! one receiver per enabled source and hands timestamped readings to
//! registered listeners.
//!
//! # Typical use
//!
//! ```ignore
//! use std::sync::Arc;
//! use envtracker::config::Configuration;
//! use envtracker::tracker::EnvTracker;
//!
//! let tracker = EnvTracker::builder()
//!     .capability_source(capabilities)
//!     .wifi_source(wifi)
//!     .cell_source(cell)
//!     .location_source(location)
//!     .bluetooth_source(bluetooth)
//!     .configuration(Configuration::default())
//!     .build()?;
//!
//! tracker.set_wifi_scan_listener(Arc::new(|reading| {
//!     println!("saw {} access points", reading.payload.len());
//! }));
//!
//! tracker.start().await;
//! ```

pub mod capability;
pub mod config;
pub mod listener;
pub mod logging;
pub mod platform;
pub mod reading;
mod receiver;
pub mod tracker;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
