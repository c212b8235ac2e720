//! # CRSF Telemetry
//!
//! Listen for CRSF telemetry datagrams and keep the latest battery,
//! attitude and flight mode values.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crsf_telemetry::config::{Config, DisplayConfig, TelemetryConfig};
use crsf_telemetry::crsf::decoder::FrameDecoder;
use crsf_telemetry::ingest::FrameIngestor;
use crsf_telemetry::logging::init_logging;
use crsf_telemetry::net::{ReceiveLoop, UdpDatagramSource};
use crsf_telemetry::telemetry::{TelemetryLogger, TelemetryReader, TelemetryStore};

/// Main entry point for CRSF Telemetry
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (path from the first argument, defaults otherwise)
///    - Set up logging
///    - Bind the UDP socket
///
/// 2. **Main Loop**
///    - Receive datagrams, validate, decode and store telemetry
///    - Print the snapshot when it changes (display task)
///    - Append snapshots to JSONL files if enabled (logger task)
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded or is invalid
/// - The UDP socket cannot be bound
/// - The telemetry log directory cannot be created
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/crsf-telemetry.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading config from {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);

    info!("CRSF Telemetry v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(TelemetryStore::new());
    let decoder = FrameDecoder::new(config.crsf.frame_type_codes());
    let codes = decoder.codes();
    info!(
        "Frame types: battery=0x{:02X} attitude=0x{:02X} flight_mode=0x{:02X}",
        codes.battery, codes.attitude, codes.flight_mode
    );
    let ingestor = FrameIngestor::new(decoder, Arc::clone(&store))
        .with_max_frame_len(config.crsf.max_frame_len);

    let source = UdpDatagramSource::bind(config.udp.socket_addr()?).await?;
    let mut receive_loop = ReceiveLoop::new(source, ingestor, config.udp.max_datagram_size);

    if config.display.enabled {
        tokio::spawn(display_task(store.subscribe(), config.display.clone()));
    }

    if config.telemetry.enabled {
        let logger = TelemetryLogger::new(&config.telemetry)?;
        tokio::spawn(logger_task(logger, store.subscribe(), config.telemetry.clone()));
    }

    info!("Press Ctrl+C to exit");

    tokio::select! {
        _ = receive_loop.run() => {}

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    let stats = receive_loop.ingestor().stats();
    info!(
        "Total datagrams: {} ({} applied, {} ignored, {} dropped)",
        stats.datagrams, stats.applied, stats.ignored, stats.dropped
    );
    info!("Last telemetry:\n{}", store.read());

    Ok(())
}

/// Print the snapshot at most once per refresh interval, only when it changed
async fn display_task(mut reader: TelemetryReader, config: DisplayConfig) {
    let mut refresh = interval(Duration::from_millis(config.refresh_interval_ms));

    loop {
        refresh.tick().await;
        if reader.has_changed() {
            info!("\n{}", reader.read());
        }
    }
}

/// Append the current snapshot to the JSONL log every log interval
async fn logger_task(mut logger: TelemetryLogger, mut reader: TelemetryReader, config: TelemetryConfig) {
    let mut tick = interval(Duration::from_millis(config.log_interval_ms));

    loop {
        tick.tick().await;
        if let Err(e) = logger.log(&reader.read()) {
            error!("Telemetry logging failed, stopping logger: {}", e);
            break;
        }
    }
}
