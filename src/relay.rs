//! Reading relay: gauge readings to the console or a telemetry peer
//!
//! # Modes
//!
//! - **Manual**: each reading is printed as
//!   `"<value> <unit> - <n> echoes"` (or `"no reading"`).
//! - **Automatic**: a PING handshake establishes that the peer is listening,
//!   then every reading is sent as a NAMED_VALUE_FLOAT stamped with
//!   milliseconds since the session started. Invalid readings are sent as
//!   `-1.0`.
//!
//! # Handshake
//!
//! ```text
//! Connecting ──(send PING, wait probe_interval)──┐
//!     ▲                                          │ nothing received
//!     └──────────────────────────────────────────┘
//!     │ any datagram received
//!     ▼
//! Connected ──(stream readings until shutdown)
//! ```
//!
//! The handshake retries forever; the peer may come online at any time.
//! Once connected, a lost peer is not detected.
//!
//! # Shutdown
//!
//! The `running` flag is only checked between iterations. A frame read in
//! progress finishes first.

use crate::config::{Config, RelayMode};
use crate::error::Result;
use crate::gauge::{CalibratedReading, UtGauge, describe, telemetry_value};
use crate::telemetry::{TelemetryChannel, TelemetryMessage};
use crate::transport::Transport;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Handshake state of a telemetry session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Connected,
}

/// Session clock and handshake state
///
/// The boot instant is captured once; every outgoing timestamp is relative
/// to it.
#[derive(Debug, Clone)]
pub struct TelemetrySession {
    boot_time: Instant,
    state: SessionState,
}

impl TelemetrySession {
    pub fn start() -> Self {
        Self {
            boot_time: Instant::now(),
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn elapsed(&self) -> Duration {
        self.boot_time.elapsed()
    }

    /// Microseconds since session start (probe timestamps)
    pub fn elapsed_usec(&self) -> u64 {
        self.elapsed().as_micros() as u64
    }

    /// Milliseconds since session start (value timestamps)
    ///
    /// Wraps after ~49 days, like the 32-bit wire field.
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed().as_millis() as u32
    }

    fn mark_connected(&mut self) {
        self.state = SessionState::Connected;
    }
}

/// Automatic mode settings
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub probe_interval: Duration,
    pub value_name: String,
    pub print_locally: bool,
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            probe_interval: config.probe_interval(),
            value_name: config.relay.value_name.clone(),
            print_locally: config.relay.print_locally,
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_millis(500),
            value_name: "UTGauge".to_string(),
            print_locally: false,
        }
    }
}

/// Relay counters, logged on exit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub probes_sent: u64,
    pub readings: u64,
    pub no_readings: u64,
    pub frames_skipped: u64,
    pub values_sent: u64,
}

/// Moves calibrated readings from a gauge to the configured sink
pub struct TelemetryRelay<C: TelemetryChannel, W: Write> {
    mode: RelayMode,
    channel: Option<C>,
    output: W,
    settings: RelaySettings,
    session: TelemetrySession,
    stats: RelayStats,
}

impl<C: TelemetryChannel, W: Write> TelemetryRelay<C, W> {
    /// Console-only relay, no handshake
    pub fn manual(output: W) -> Self {
        Self {
            mode: RelayMode::Manual,
            channel: None,
            output,
            settings: RelaySettings {
                print_locally: true,
                ..RelaySettings::default()
            },
            session: TelemetrySession::start(),
            stats: RelayStats::default(),
        }
    }

    /// Telemetry relay; the session clock starts now
    pub fn automatic(channel: C, output: W, settings: RelaySettings) -> Self {
        Self {
            mode: RelayMode::Automatic,
            channel: Some(channel),
            output,
            settings,
            session: TelemetrySession::start(),
            stats: RelayStats::default(),
        }
    }

    pub fn mode(&self) -> RelayMode {
        self.mode
    }

    pub fn session(&self) -> &TelemetrySession {
        &self.session
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Probe the peer until it answers
    ///
    /// Returns `Ok(false)` if `running` was cleared before the peer answered.
    /// Manual relays are always connected.
    pub fn connect(&mut self, running: &AtomicBool) -> Result<bool> {
        let Some(channel) = self.channel.as_mut() else {
            return Ok(true);
        };
        if self.session.is_connected() {
            return Ok(true);
        }

        log::info!(
            "Waiting for telemetry peer (probing every {:?})",
            self.settings.probe_interval
        );

        while running.load(Ordering::Relaxed) {
            channel.send(&TelemetryMessage::probe(self.session.elapsed_usec()))?;
            self.stats.probes_sent += 1;
            log::debug!("Probe {} sent", self.stats.probes_sent);

            if channel.wait_for_message(self.settings.probe_interval)? {
                self.session.mark_connected();
                log::info!(
                    "Telemetry peer connected after {} probe(s)",
                    self.stats.probes_sent
                );
                return Ok(true);
            }
        }

        log::info!("Handshake interrupted");
        Ok(false)
    }

    /// Relay one reading
    ///
    /// Frame errors are logged and skipped; transport and channel errors are
    /// returned.
    pub fn step<T: Transport>(&mut self, gauge: &mut UtGauge<T>) -> Result<()> {
        let reading = match gauge.next_reading() {
            Ok(reading) => reading,
            Err(e) if e.is_frame_error() => {
                self.stats.frames_skipped += 1;
                log::warn!("Skipping frame: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match reading {
            Some(_) => self.stats.readings += 1,
            None => self.stats.no_readings += 1,
        }

        if let Some(channel) = self.channel.as_mut() {
            let msg = TelemetryMessage::named_value(
                self.session.elapsed_ms(),
                &self.settings.value_name,
                telemetry_value(reading.as_ref()),
            )?;
            channel.send(&msg)?;
            self.stats.values_sent += 1;
            log::debug!("Sent {:?}", msg);
        }

        if self.settings.print_locally {
            self.print(reading.as_ref())?;
        }
        Ok(())
    }

    /// Handshake if needed, then relay until `running` is cleared
    pub fn run<T: Transport>(
        &mut self,
        gauge: &mut UtGauge<T>,
        running: &AtomicBool,
    ) -> Result<()> {
        if !self.connect(running)? {
            return Ok(());
        }

        log::info!("Relaying readings ({:?} mode)", self.mode);
        while running.load(Ordering::Relaxed) {
            self.step(gauge)?;
        }

        log::info!("Relay stopped: {:?}", self.stats);
        Ok(())
    }

    fn print(&mut self, reading: Option<&CalibratedReading>) -> Result<()> {
        writeln!(self.output, "{}", describe(reading))?;
        self.output.flush()?;
        Ok(())
    }
}
