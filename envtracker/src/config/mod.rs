//! Tracker configuration: which sources to track and how each is tuned.
//!
//! A [`Configuration`] is assembled in code through the builder or loaded
//! from an INI file under `~/.envtracker/`. Either way it is an immutable
//! value; the running tracker swaps whole configurations rather than
//! editing one in place.

mod builder;
mod file;
mod params;
mod parser;

pub use builder::{Configuration, ConfigurationBuilder};
pub use file::{
    config_directory, config_file_path, ConfigFileError, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use params::{
    BluetoothParams, CellParams, GpsParams, WifiParams, DEFAULT_CELL_SCAN_INTERVAL_MS,
    DEFAULT_GPS_MIN_DISTANCE_M, DEFAULT_GPS_MIN_INTERVAL_MS, DEFAULT_WIFI_SCAN_INTERVAL_MS,
};
