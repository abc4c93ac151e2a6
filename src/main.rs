//! UTGauge relay daemon
//!
//! Usage:
//! - `utgauge-relay [config.toml]` - mode taken from the config file
//! - `utgauge-relay --config <path>` / `-c <path>`
//! - `utgauge-relay --manual` - print readings instead of sending them
//!
//! Without a config path, `utgauge.toml` is used if present, otherwise the
//! built-in defaults.

use std::env;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use utgauge_relay::config::{Config, RelayMode};
use utgauge_relay::error::{Error, Result};
use utgauge_relay::gauge::{Calibrator, UtGauge};
use utgauge_relay::relay::{RelaySettings, TelemetryRelay};
use utgauge_relay::telemetry::UdpChannel;
use utgauge_relay::transport::SerialTransport;

const DEFAULT_CONFIG_PATH: &str = "utgauge.toml";

/// Command line options (config path and manual override only)
struct Args {
    config_path: Option<String>,
    manual: bool,
}

/// Parse command line arguments.
///
/// Supports:
/// - `utgauge-relay <path>` (positional)
/// - `utgauge-relay --config <path>` / `-c <path>`
/// - `utgauge-relay --manual` / `-m`
fn parse_args() -> Args {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut parsed = Args {
        config_path: None,
        manual: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                parsed.config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--manual" | "-m" => parsed.manual = true,
            arg if !arg.starts_with('-') && parsed.config_path.is_none() => {
                parsed.config_path = Some(arg.to_string());
            }
            arg => eprintln!("Ignoring unknown argument: {}", arg),
        }
        i += 1;
    }

    parsed
}

/// Explicit paths must exist; the default path may be absent
fn load_config(args: &Args) -> Result<Config> {
    match &args.config_path {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    let mut config = load_config(&args)?;
    if args.manual {
        config.relay.mode = RelayMode::Manual;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("UTGauge relay v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Gauge: {} @ {} baud, material {:?}, mode {:?}",
        config.gauge.port,
        config.gauge.baud_rate,
        config.gauge.material,
        config.relay.mode
    );

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let library = config.material_library()?;
    log::debug!(
        "Known materials: {}",
        library.names().collect::<Vec<_>>().join(", ")
    );
    let calibrator = Calibrator::new(library, &config.gauge.material)?;
    let stdout = io::stdout();

    let result = match config.relay.mode {
        RelayMode::Manual => {
            let mut gauge = open_gauge(&config, calibrator)?;
            TelemetryRelay::<UdpChannel, _>::manual(stdout.lock()).run(&mut gauge, &running)
        }
        RelayMode::Automatic => {
            let channel = UdpChannel::connect(
                &config.telemetry.bind_address,
                &config.telemetry.peer_address,
                config.telemetry.system_id,
                config.telemetry.component_id,
            )?;
            log::info!("Streaming to telemetry peer {}", channel.peer());
            let mut relay = TelemetryRelay::automatic(
                channel,
                stdout.lock(),
                RelaySettings::from_config(&config),
            );

            // Handshake before the serial port is opened
            if relay.connect(&running)? {
                let mut gauge = open_gauge(&config, calibrator)?;
                relay.run(&mut gauge, &running)
            } else {
                Ok(())
            }
        }
    };

    if !running.load(Ordering::Relaxed) {
        println!("\nUser quit");
    }
    result
}

fn open_gauge(config: &Config, calibrator: Calibrator) -> Result<UtGauge<SerialTransport>> {
    let transport = SerialTransport::open(
        &config.gauge.port,
        config.gauge.baud_rate,
        config.read_timeout(),
    )?;
    let gauge = UtGauge::new(transport, calibrator);
    log::info!(
        "Gauge open, calibrating for {:?} (factor {:.6})",
        gauge.calibrator().material(),
        gauge.calibrator().factor().value()
    );
    Ok(gauge)
}
