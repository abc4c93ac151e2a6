//! Configuration for the UTGauge relay
//!
//! Loads configuration from a TOML file. Every key has a default matching the
//! field deployment (gauge on `/dev/ttyUSB0`, autopilot on UDP port 9000), so
//! a file only needs the values that differ.

use crate::error::{Error, Result};
use crate::gauge::constants::{DEFAULT_BAUD_RATE, DEFAULT_MATERIAL};
use crate::gauge::MaterialLibrary;
use crate::telemetry::VALUE_NAME_LEN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gauge: GaugeConfig,
    pub relay: RelayConfig,
    pub telemetry: TelemetryConfig,
    /// Extra materials, name -> sound velocity (m/s)
    pub materials: BTreeMap<String, f64>,
    pub logging: LoggingConfig,
}

/// Gauge serial configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Serial port path
    pub port: String,
    pub baud_rate: u32,
    /// Material being measured, must exist in the material library
    pub material: String,
    /// Poll window of a single serial read
    ///
    /// Frame reads still block indefinitely; this only bounds each
    /// underlying read call.
    pub read_timeout_ms: u64,
}

/// Operating mode of the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Print readings to the console, no telemetry
    Manual,
    /// Handshake with the telemetry peer, then stream readings
    Automatic,
}

/// Relay behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    pub mode: RelayMode,
    /// Also print readings locally in automatic mode
    pub print_locally: bool,
    /// How long to wait for a reply after each handshake probe
    pub probe_interval_ms: u64,
    /// Name of the telemetry value (at most 10 ASCII bytes)
    pub value_name: String,
}

/// Telemetry peer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Where readings are sent
    ///
    /// Examples:
    /// - `0.0.0.0:9000` - local autopilot router
    /// - `192.168.2.1:14550` - ground station
    pub peer_address: String,
    /// Local bind address (port 0 picks any free port)
    pub bind_address: String,
    pub system_id: u8,
    pub component_id: u8,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides
    pub level: String,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            material: DEFAULT_MATERIAL.to_string(),
            read_timeout_ms: 100,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: RelayMode::Automatic,
            print_locally: false,
            probe_interval_ms: 500,
            value_name: "UTGauge".to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            peer_address: "0.0.0.0:9000".to_string(),
            bind_address: "0.0.0.0:0".to_string(),
            system_id: 255,
            component_id: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use utgauge_relay::config::Config;
    ///
    /// let config = Config::load("utgauge.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<()> {
        let library = self.material_library()?;
        if !library.contains(&self.gauge.material) {
            return Err(Error::UnknownMaterial(self.gauge.material.clone()));
        }
        if self.gauge.baud_rate == 0 {
            return Err(Error::Config("gauge.baud_rate must be positive".to_string()));
        }
        if self.relay.probe_interval_ms == 0 {
            return Err(Error::Config(
                "relay.probe_interval_ms must be positive".to_string(),
            ));
        }
        let name = &self.relay.value_name;
        if name.is_empty() || name.len() > VALUE_NAME_LEN || !name.is_ascii() {
            return Err(Error::Config(format!(
                "relay.value_name {:?} must be 1-{} ASCII characters",
                name, VALUE_NAME_LEN
            )));
        }
        Ok(())
    }

    /// Built-in materials plus the configured extras
    pub fn material_library(&self) -> Result<MaterialLibrary> {
        MaterialLibrary::with_extra(
            self.materials
                .iter()
                .map(|(name, &velocity)| (name.clone(), velocity)),
        )
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.gauge.read_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.relay.probe_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gauge.port, "/dev/ttyUSB0");
        assert_eq!(config.gauge.baud_rate, 2400);
        assert_eq!(config.gauge.material, "core ten steel");
        assert_eq!(config.relay.mode, RelayMode::Automatic);
        assert!(!config.relay.print_locally);
        assert_eq!(config.probe_interval(), Duration::from_millis(500));
        assert_eq!(config.relay.value_name, "UTGauge");
        assert_eq!(config.telemetry.peer_address, "0.0.0.0:9000");
        assert_eq!(config.telemetry.system_id, 255);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse(
            r#"
[gauge]
material = "copper"

[relay]
mode = "manual"
"#,
        )
        .unwrap();
        assert_eq!(config.gauge.material, "copper");
        assert_eq!(config.gauge.baud_rate, 2400);
        assert_eq!(config.relay.mode, RelayMode::Manual);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            r#"
[gauge]
port = "/dev/ttyS1"
baud_rate = 9600
material = "pvc"
read_timeout_ms = 250

[relay]
mode = "automatic"
print_locally = true
probe_interval_ms = 200
value_name = "Hull"

[telemetry]
peer_address = "192.168.2.1:14550"
bind_address = "0.0.0.0:14551"
system_id = 1
component_id = 158

[materials]
pvc = 2380.0

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.gauge.port, "/dev/ttyS1");
        assert_eq!(config.read_timeout(), Duration::from_millis(250));
        assert!(config.relay.print_locally);
        assert_eq!(config.telemetry.component_id, 158);
        assert_eq!(
            config.material_library().unwrap().velocity_of("pvc").unwrap(),
            2380.0
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_material_fails_fast() {
        let result = Config::parse("[gauge]\nmaterial = \"cheese\"\n");
        assert!(matches!(result, Err(Error::UnknownMaterial(m)) if m == "cheese"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::parse("[relay]\nprobe_interval_ms = 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("[relay]\nvalue_name = \"WayTooLongName\"\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("[materials]\nfoam = -1.0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("[relay]\nmode = \"sideways\"\n"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gauge]\nport = \"/dev/ttyAMA0\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.gauge.port, "/dev/ttyAMA0");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Config::load("/nonexistent/utgauge.toml"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_toml_round_trip_sections() {
        let toml_string = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_string.contains("[gauge]"));
        assert!(toml_string.contains("[relay]"));
        assert!(toml_string.contains("[telemetry]"));
        assert!(toml_string.contains("mode = \"automatic\""));
    }
}
