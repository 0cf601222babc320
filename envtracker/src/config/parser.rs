//! Mapping between INI sections and configuration fields.
//!
//! This is the one place file keys are named. Values overlay the defaults,
//! so a file only has to mention what it changes.
//!
//! ```ini
//! [wifi]
//! enabled = true
//! scan_interval_ms = 4000
//!
//! [cell]
//! enabled = true
//! scan_interval_ms = 7000
//!
//! [gps]
//! enabled = true
//! min_interval_ms = 5000
//! min_distance_m = 5.0
//!
//! [bluetooth]
//! enabled = false
//! ```

use std::str::FromStr;

use ini::Ini;

use super::builder::Configuration;
use super::file::ConfigFileError;
use super::params::{CellParams, GpsParams, WifiParams};

pub(super) fn from_ini(ini: &Ini) -> Result<Configuration, ConfigFileError> {
    let mut builder = Configuration::builder();

    if let Some(section) = ini.section(Some("wifi")) {
        if let Some(value) = section.get("enabled") {
            builder = builder.use_wifi(parse_value("wifi", "enabled", value)?);
        }
        let mut params = WifiParams::default();
        if let Some(value) = section.get("scan_interval_ms") {
            params.scan_interval_ms = parse_interval("wifi", "scan_interval_ms", value)?;
        }
        builder = builder.wifi(params);
    }

    if let Some(section) = ini.section(Some("cell")) {
        if let Some(value) = section.get("enabled") {
            builder = builder.use_cell(parse_value("cell", "enabled", value)?);
        }
        let mut params = CellParams::default();
        if let Some(value) = section.get("scan_interval_ms") {
            params.scan_interval_ms = parse_interval("cell", "scan_interval_ms", value)?;
        }
        builder = builder.cell(params);
    }

    if let Some(section) = ini.section(Some("gps")) {
        if let Some(value) = section.get("enabled") {
            builder = builder.use_gps(parse_value("gps", "enabled", value)?);
        }
        let mut params = GpsParams::default();
        if let Some(value) = section.get("min_interval_ms") {
            params.min_interval_ms = parse_value("gps", "min_interval_ms", value)?;
        }
        if let Some(value) = section.get("min_distance_m") {
            params.min_distance_m = parse_value("gps", "min_distance_m", value)?;
        }
        builder = builder.gps(params);
    }

    if let Some(section) = ini.section(Some("bluetooth")) {
        if let Some(value) = section.get("enabled") {
            builder = builder.use_bluetooth(parse_value("bluetooth", "enabled", value)?);
        }
    }

    Ok(builder.build())
}

pub(super) fn to_ini(config: &Configuration) -> Ini {
    let mut ini = Ini::new();
    ini.with_section(Some("wifi"))
        .set("enabled", config.using_wifi().to_string())
        .set(
            "scan_interval_ms",
            config.wifi_params().scan_interval_ms.to_string(),
        );
    ini.with_section(Some("cell"))
        .set("enabled", config.using_cell().to_string())
        .set(
            "scan_interval_ms",
            config.cell_params().scan_interval_ms.to_string(),
        );
    ini.with_section(Some("gps"))
        .set("enabled", config.using_gps().to_string())
        .set(
            "min_interval_ms",
            config.gps_params().min_interval_ms.to_string(),
        )
        .set(
            "min_distance_m",
            config.gps_params().min_distance_m.to_string(),
        );
    ini.with_section(Some("bluetooth"))
        .set("enabled", config.using_bluetooth().to_string());
    ini
}

fn parse_value<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Scan intervals drive a polling loop, so zero is rejected rather than
/// spinning hot.
fn parse_interval(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    let interval: u64 = parse_value(section, key, value)?;
    if interval == 0 {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::{DEFAULT_GPS_MIN_DISTANCE_M, DEFAULT_WIFI_SCAN_INTERVAL_MS};

    fn load(content: &str) -> Result<Configuration, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        from_ini(&ini)
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let config = load("").unwrap();

        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_partial_file_overlays_defaults() {
        let config = load("[wifi]\nscan_interval_ms = 2000\n\n[gps]\nenabled = false\n").unwrap();

        assert!(config.using_wifi());
        assert_eq!(config.wifi_params().scan_interval_ms, 2_000);
        assert!(!config.using_gps());
        assert_eq!(config.gps_params().min_distance_m, DEFAULT_GPS_MIN_DISTANCE_M);
        assert!(config.using_cell());
    }

    #[test]
    fn test_gps_thresholds_parse() {
        let config = load("[gps]\nmin_interval_ms = 7000\nmin_distance_m = 10.5\n").unwrap();

        assert_eq!(config.gps_params().min_interval_ms, 7_000);
        assert_eq!(config.gps_params().min_distance_m, 10.5);
    }

    #[test]
    fn test_unknown_sections_and_keys_ignored() {
        let config = load("[wifi]\ncolor = blue\n\n[sound]\nvolume = 11\n").unwrap();

        assert_eq!(config.wifi_params().scan_interval_ms, DEFAULT_WIFI_SCAN_INTERVAL_MS);
    }

    #[test]
    fn test_non_numeric_interval_rejected() {
        let err = load("[cell]\nscan_interval_ms = fast\n").unwrap_err();

        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "cell");
                assert_eq!(key, "scan_interval_ms");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = load("[wifi]\nscan_interval_ms = 0\n").unwrap_err();

        match err {
            ConfigFileError::InvalidValue { reason, .. } => {
                assert!(reason.contains("greater than zero"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_values_trimmed_before_parse() {
        let config = load("[wifi]\nenabled =  true \n").unwrap();

        assert!(config.using_wifi());
    }

    #[test]
    fn test_to_ini_writes_every_section() {
        let ini = to_ini(&Configuration::default());

        for section in ["wifi", "cell", "gps", "bluetooth"] {
            assert!(ini.section(Some(section)).is_some(), "missing [{section}]");
        }
        assert_eq!(
            ini.section(Some("bluetooth")).unwrap().get("enabled"),
            Some("false")
        );
    }
}
