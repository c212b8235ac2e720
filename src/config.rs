//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//! Every section and field is optional; missing values take the defaults below.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use crate::crsf::protocol::{
    FrameTypeCodes, CRSF_FRAMETYPE_ATTITUDE, CRSF_FRAMETYPE_BATTERY_SENSOR,
    CRSF_FRAMETYPE_FLIGHT_MODE, CRSF_MAX_FRAME_SIZE, CRSF_MIN_FRAME_SIZE,
};
use crate::error::{Result, TelemetryError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub udp: UdpConfig,
    #[serde(default)]
    pub crsf: CrsfConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// UDP listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UdpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,
}

/// CRSF protocol configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CrsfConfig {
    #[serde(default = "default_battery_frame_type")]
    pub battery_frame_type: u8,

    #[serde(default = "default_attitude_frame_type")]
    pub attitude_frame_type: u8,

    #[serde(default = "default_flight_mode_frame_type")]
    pub flight_mode_frame_type: u8,

    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

/// Telemetry JSONL logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Console display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_display_enabled")]
    pub enabled: bool,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

/// Application log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file, console only when unset
    #[serde(default)]
    pub file_dir: Option<String>,
}

// Default value functions
fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 12345 }
fn default_max_datagram_size() -> usize { 256 }

fn default_battery_frame_type() -> u8 { CRSF_FRAMETYPE_BATTERY_SENSOR }
fn default_attitude_frame_type() -> u8 { CRSF_FRAMETYPE_ATTITUDE }
fn default_flight_mode_frame_type() -> u8 { CRSF_FRAMETYPE_FLIGHT_MODE }
fn default_max_frame_len() -> usize { CRSF_MAX_FRAME_SIZE }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_display_enabled() -> bool { true }
fn default_refresh_interval_ms() -> u64 { 100 }

fn default_log_level() -> String { "info".to_string() }

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_datagram_size: default_max_datagram_size(),
        }
    }
}

impl Default for CrsfConfig {
    fn default() -> Self {
        Self {
            battery_frame_type: default_battery_frame_type(),
            attitude_frame_type: default_attitude_frame_type(),
            flight_mode_frame_type: default_flight_mode_frame_type(),
            max_frame_len: default_max_frame_len(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
            format: default_log_format(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: default_display_enabled(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: None,
        }
    }
}

impl UdpConfig {
    /// Socket address to bind
    ///
    /// # Errors
    ///
    /// Returns error if `bind_address` is not an IP address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            config_error(format!("bind_address '{}' is not an IP address", self.bind_address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl CrsfConfig {
    /// Frame type mapping for the decoder
    pub fn frame_type_codes(&self) -> FrameTypeCodes {
        FrameTypeCodes {
            battery: self.battery_frame_type,
            attitude: self.attitude_frame_type,
            flight_mode: self.flight_mode_frame_type,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_telemetry::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        self.udp.socket_addr()?;

        if self.udp.max_datagram_size < CRSF_MIN_FRAME_SIZE || self.udp.max_datagram_size > 65535 {
            return Err(config_error("max_datagram_size must be between 4 and 65535"));
        }

        if self.crsf.max_frame_len < CRSF_MIN_FRAME_SIZE || self.crsf.max_frame_len > 257 {
            return Err(config_error("max_frame_len must be between 4 and 257"));
        }

        if self.crsf.max_frame_len > self.udp.max_datagram_size {
            return Err(config_error("max_frame_len cannot exceed max_datagram_size"));
        }

        if !self.crsf.frame_type_codes().is_unambiguous() {
            return Err(config_error("battery, attitude and flight mode frame types must differ"));
        }

        // Telemetry logging
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(config_error("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(config_error("log_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(config_error("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(config_error("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(config_error("log format must be 'jsonl' (only supported format)"));
        }

        if self.display.refresh_interval_ms == 0 || self.display.refresh_interval_ms > 60000 {
            return Err(config_error("refresh_interval_ms must be between 1 and 60000"));
        }

        if !["error", "warn", "info", "debug", "trace"].contains(&self.logging.level.as_str()) {
            return Err(config_error("logging level must be one of: error, warn, info, debug, trace"));
        }

        if self.logging.file_dir.as_deref() == Some("") {
            return Err(config_error("logging file_dir cannot be empty"));
        }

        Ok(())
    }
}

fn config_error(msg: impl std::fmt::Display) -> TelemetryError {
    TelemetryError::Config(toml::de::Error::custom(msg))
}
