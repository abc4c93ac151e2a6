//! Telemetry link to the ground/autopilot peer
//!
//! The relay only needs two primitives from a link: send one message, and wait
//! a bounded time for anything to come back. `TelemetryChannel` captures that;
//! `UdpChannel` speaks MAVLink v1 over UDP and `MockChannel` records traffic
//! for tests.

pub mod mavlink;
pub mod messages;
pub mod mock;
pub mod udp;

pub use messages::{TelemetryMessage, VALUE_NAME_LEN};
pub use mock::MockChannel;
pub use udp::UdpChannel;

use crate::error::Result;
use std::time::Duration;

/// Point-to-point message channel to the telemetry peer
pub trait TelemetryChannel {
    /// Send one message
    fn send(&mut self, msg: &TelemetryMessage) -> Result<()>;

    /// Wait up to `timeout` for any inbound message
    ///
    /// Returns `true` if something arrived. Content is not interpreted.
    fn wait_for_message(&mut self, timeout: Duration) -> Result<bool>;
}
