//! Message types sent to the telemetry peer

use crate::error::{Error, Result};

/// Maximum length of a named value's name (MAVLink `char[10]`)
pub const VALUE_NAME_LEN: usize = 10;

/// Outbound telemetry messages
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryMessage {
    /// Liveness probe used by the connection handshake
    Ping {
        /// Microseconds since session start
        time_usec: u64,
        seq: u32,
        /// 0 = all systems
        target_system: u8,
        /// 0 = all components
        target_component: u8,
    },
    /// Single named measurement
    NamedValueFloat {
        /// Milliseconds since session start
        time_boot_ms: u32,
        name: String,
        value: f32,
    },
}

impl TelemetryMessage {
    /// Handshake probe addressed to every system and component
    pub fn probe(time_usec: u64) -> Self {
        TelemetryMessage::Ping {
            time_usec,
            seq: 0,
            target_system: 0,
            target_component: 0,
        }
    }

    /// Named value, rejecting names that do not fit the wire field
    pub fn named_value(time_boot_ms: u32, name: &str, value: f32) -> Result<Self> {
        if name.is_empty() || name.len() > VALUE_NAME_LEN || !name.is_ascii() {
            return Err(Error::Encode(format!(
                "value name {:?} must be 1-{} ASCII bytes",
                name, VALUE_NAME_LEN
            )));
        }
        Ok(TelemetryMessage::NamedValueFloat {
            time_boot_ms,
            name: name.to_string(),
            value,
        })
    }

    pub fn is_probe(&self) -> bool {
        matches!(self, TelemetryMessage::Ping { .. })
    }
}
