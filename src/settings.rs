// src/settings.rs
//
// Application settings, persisted as TOML.
// Every field has a serde default so partial files load cleanly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::controller::{ControllerOptions, ExportFaultPolicy};
use crate::io::serial::{FlowControl, Parity, SerialConfig, DEFAULT_MAX_LINE_LENGTH};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: Parity, // "none" | "odd" | "even"
    #[serde(default)]
    pub flow_control: FlowControl, // "none" | "software" | "hardware"
    #[serde(default = "default_dtr")]
    pub dtr: bool,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    #[serde(default)]
    pub export_fault_policy: ExportFaultPolicy, // "terminate" | "end_session"
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_port() -> String {
    if cfg!(target_os = "windows") {
        "COM9".to_string()
    } else {
        "/dev/ttyUSB0".to_string()
    }
}
fn default_baud_rate() -> u32 {
    921_600
}
fn default_data_bits() -> u8 {
    8
}
fn default_stop_bits() -> u8 {
    1
}
fn default_dtr() -> bool {
    true
}
fn default_read_timeout_ms() -> u64 {
    10
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}
fn default_export_dir() -> PathBuf {
    dirs::document_dir()
        .map(|d| d.join("Tenzr").join("exportedData"))
        .unwrap_or_else(|| PathBuf::from("exportedData"))
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: Parity::default(),
            flow_control: FlowControl::default(),
            dtr: default_dtr(),
            read_timeout_ms: default_read_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_line_length: default_max_line_length(),
            export_dir: default_export_dir(),
            export_fault_policy: ExportFaultPolicy::default(),
            log_dir: None,
        }
    }
}

/// `<config_dir>/tenzr/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tenzr").join("settings.toml"))
}

impl AppSettings {
    /// Load settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            debug!("[settings] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings {}: {}", path.display(), e))?;
        Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse settings {}: {}", path.display(), e))
    }

    /// Load from an explicit path, else the default location, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(p) => Self::load(p),
            None => match default_settings_path() {
                Some(p) => Self::load(&p),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let settings: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        settings.check_line_settings()?;
        Ok(settings)
    }

    /// The serial conversions only know 5-8 data bits and 1-2 stop bits
    fn check_line_settings(&self) -> Result<(), String> {
        if !(5..=8).contains(&self.data_bits) {
            return Err(format!("data_bits must be 5, 6, 7 or 8, got {}", self.data_bits));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(format!("stop_bits must be 1 or 2, got {}", self.stop_bits));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize settings: {}", e))
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
            parity: self.parity,
            flow_control: self.flow_control,
            dtr: self.dtr,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_line_length: self.max_line_length,
            export_fault_policy: self.export_fault_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = AppSettings::from_toml("").unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.baud_rate, 921_600);
        assert_eq!(settings.export_fault_policy, ExportFaultPolicy::Terminate);
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let settings = AppSettings::from_toml(
            r#"
            port = "/dev/ttyACM1"
            baud_rate = 115200
            parity = "even"
            flow_control = "hardware"
            dtr = false
            export_dir = "/tmp/tenzr"
            export_fault_policy = "end_session"
            "#,
        )
        .unwrap();

        assert_eq!(settings.port, "/dev/ttyACM1");
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.parity, Parity::Even);
        assert_eq!(settings.flow_control, FlowControl::Hardware);
        assert!(!settings.dtr);
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/tenzr"));
        assert_eq!(settings.export_fault_policy, ExportFaultPolicy::EndSession);
        assert_eq!(settings.data_bits, 8);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(AppSettings::from_toml("baud_rate = \"fast\"").is_err());
    }

    #[test]
    fn test_out_of_range_line_settings_rejected() {
        let err = AppSettings::from_toml("data_bits = 9").unwrap_err();
        assert!(err.contains("data_bits"));

        let err = AppSettings::from_toml("stop_bits = 3").unwrap_err();
        assert!(err.contains("stop_bits"));

        let settings = AppSettings::from_toml("data_bits = 7\nstop_bits = 2").unwrap();
        assert_eq!(settings.data_bits, 7);
        assert_eq!(settings.stop_bits, 2);
    }

    #[test]
    fn test_load_reports_bad_data_bits_as_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "data_bits = 9\n").unwrap();

        let err = AppSettings::load(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse settings"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut settings = AppSettings::default();
        settings.log_dir = Some(dir.path().join("logs"));
        std::fs::write(&path, settings.to_toml().unwrap()).unwrap();

        assert_eq!(AppSettings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_serial_config_uses_8n1_defaults() {
        let config = AppSettings::default().serial_config();
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.stop_bits, 1);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.read_timeout, Duration::from_millis(10));
    }
}
