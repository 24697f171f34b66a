//! Typed configuration loading.
//!
//! Configuration is loaded from a TOML file plus environment variables
//! prefixed with `RUST_SDR_` (double underscore separating nesting
//! levels, e.g. `RUST_SDR_APPLICATION__LOG_LEVEL=debug`). Every field has
//! a default, so an absent file yields a usable configuration.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::convert::SampleFormat;
use crate::error::SdrResult;

/// Top-level crate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdrConfig {
    /// Application settings.
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Device bring-up settings.
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Device bring-up configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// FPGA master clock rate in Hz; an EEPROM `mcr` field overrides it.
    #[serde(default = "default_master_clock_rate")]
    pub master_clock_rate: f64,
    /// Daughterboard slot names, in bring-up order.
    #[serde(default = "default_dboard_slots")]
    pub dboard_slots: Vec<String>,
    /// Wire format negotiated with the hardware by default.
    #[serde(default = "default_wire_format")]
    pub wire_format: SampleFormat,
    /// Calibration scale factor for the RX path (fixed-point full scale).
    #[serde(default = "default_scale_factor")]
    pub rx_scale_factor: f64,
    /// Calibration scale factor for the TX path.
    #[serde(default = "default_scale_factor")]
    pub tx_scale_factor: f64,
}

fn default_name() -> String {
    "rust_sdr".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_master_clock_rate() -> f64 {
    64e6
}

fn default_dboard_slots() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

fn default_wire_format() -> SampleFormat {
    SampleFormat::Sc16
}

fn default_scale_factor() -> f64 {
    32767.0
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            master_clock_rate: default_master_clock_rate(),
            dboard_slots: default_dboard_slots(),
            wire_format: default_wire_format(),
            rx_scale_factor: default_scale_factor(),
            tx_scale_factor: default_scale_factor(),
        }
    }
}

impl Default for SdrConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl SdrConfig {
    /// Load configuration from `sdr.toml` and the environment.
    pub fn load() -> SdrResult<Self> {
        Self::load_from("sdr.toml")
    }

    /// Load configuration from a specific file path and the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> SdrResult<Self> {
        let config = Figment::from(Serialized::defaults(SdrConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("RUST_SDR_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = SdrConfig::load_from("/nonexistent/sdr.toml").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.device.master_clock_rate, 64e6);
        assert_eq!(config.device.dboard_slots, vec!["A", "B"]);
        assert_eq!(config.device.wire_format, SampleFormat::Sc16);
        assert_eq!(config.device.rx_scale_factor, 32767.0);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[application]\nlog_level = \"debug\"\n\n\
             [device]\nmaster_clock_rate = 52e6\nwire_format = \"sc8\"\ndboard_slots = [\"A\"]"
        )
        .unwrap();
        let config = SdrConfig::load_from(file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.device.master_clock_rate, 52e6);
        assert_eq!(config.device.wire_format, SampleFormat::Sc8);
        assert_eq!(config.device.dboard_slots, vec!["A"]);
        // untouched fields keep their defaults
        assert_eq!(config.device.tx_scale_factor, 32767.0);
    }

    #[test]
    fn bad_toml_surfaces_as_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nmaster_clock_rate = \"fast\"").unwrap();
        let err = SdrConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, crate::SdrError::Config(_)));
    }
}
