//! UTGauge relay - ultrasonic thickness gauge decoder and telemetry relay
//!
//! Reads measurement frames from an ultrasonic thickness gauge over a serial
//! link, corrects them for the material being measured, and forwards them to
//! a telemetry peer (MAVLink over UDP) or prints them.
//!
//! ```text
//! serial bytes -> FrameReader -> decode -> Calibrator -> TelemetryRelay -> UDP / console
//! ```

pub mod config;
pub mod error;
pub mod gauge;
pub mod relay;
pub mod telemetry;
pub mod transport;

// Re-export commonly used types
pub use config::{Config, RelayMode};
pub use error::{Error, Result};
pub use gauge::{CalibratedReading, Calibrator, MaterialLibrary, Reading, UtGauge};
pub use relay::{RelaySettings, TelemetryRelay, TelemetrySession};
