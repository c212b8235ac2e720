//! # Network Reception Module
//!
//! Receives CRSF telemetry datagrams over UDP and feeds them to the
//! ingestion pipeline.
//!
//! This module handles:
//! - Binding the UDP listening socket
//! - Receiving one frame per datagram into a reused, explicitly reset buffer
//! - Logging and backing off on receive errors
//! - Periodic status logging

pub mod socket_trait;

use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, info, warn};

use crate::ingest::{FrameIngestor, IngestOutcome};
pub use socket_trait::{DatagramSource, UdpDatagramSource};

/// Delay before the next receive after a socket error
pub const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(1);

/// Number of datagrams between status log messages
const LOG_INTERVAL_DATAGRAMS: u64 = 1000;

/// Receive loop driving datagrams through a [`FrameIngestor`]
pub struct ReceiveLoop<S: DatagramSource> {
    source: S,
    ingestor: FrameIngestor,
    buffer: BytesMut,
    max_datagram_size: usize,
}

impl<S: DatagramSource> std::fmt::Debug for ReceiveLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiveLoop")
            .field("max_datagram_size", &self.max_datagram_size)
            .field("stats", self.ingestor.stats())
            .finish_non_exhaustive()
    }
}

impl<S: DatagramSource> ReceiveLoop<S> {
    /// Create a receive loop
    ///
    /// # Arguments
    ///
    /// * `source` - Datagram source (UDP socket or mock)
    /// * `ingestor` - Pipeline that validates, decodes and stores frames
    /// * `max_datagram_size` - Receive buffer size, longer datagrams are truncated
    pub fn new(source: S, ingestor: FrameIngestor, max_datagram_size: usize) -> Self {
        Self {
            source,
            ingestor,
            buffer: BytesMut::with_capacity(max_datagram_size),
            max_datagram_size,
        }
    }

    /// Ingestion pipeline and its counters
    pub fn ingestor(&self) -> &FrameIngestor {
        &self.ingestor
    }

    /// Receive and process one datagram
    ///
    /// The buffer is cleared and zero-filled before every receive so bytes
    /// from an earlier datagram never show up in a later one.
    ///
    /// # Errors
    ///
    /// Returns the socket error if the receive fails; frame errors are
    /// reported through [`IngestOutcome::Dropped`] instead
    pub async fn run_once(&mut self) -> std::io::Result<IngestOutcome> {
        self.buffer.clear();
        self.buffer.resize(self.max_datagram_size, 0);

        let len = self.source.recv_datagram(&mut self.buffer[..]).await?;
        self.buffer.truncate(len);

        debug!("Received datagram ({} bytes)", len);
        Ok(self.ingestor.ingest(&self.buffer))
    }

    /// Receive datagrams until the task is cancelled
    ///
    /// Socket errors are logged and followed by [`RECV_ERROR_BACKOFF`].
    pub async fn run(&mut self) {
        let mut last_log_count: u64 = 0;

        loop {
            if let Err(e) = self.run_once().await {
                warn!("Error receiving datagram: {}", e);
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                continue;
            }

            let stats = self.ingestor.stats();
            if stats.datagrams - last_log_count >= LOG_INTERVAL_DATAGRAMS {
                info!(
                    "Received {} datagrams ({} applied, {} ignored, {} dropped)",
                    stats.datagrams, stats.applied, stats.ignored, stats.dropped
                );
                last_log_count = stats.datagrams;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::decoder::FrameDecoder;
    use crate::crsf::protocol::FrameKind;
    use crate::crsf::test_frames::build_frame;
    use crate::error::FrameError;
    use crate::telemetry::TelemetryStore;
    use socket_trait::mocks::MockDatagramSource;
    use std::io;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn receive_loop(source: MockDatagramSource) -> (ReceiveLoop<MockDatagramSource>, Arc<TelemetryStore>) {
        let store = Arc::new(TelemetryStore::new());
        let ingestor = FrameIngestor::new(FrameDecoder::default(), Arc::clone(&store));
        (ReceiveLoop::new(source, ingestor, 256), store)
    }

    #[test]
    fn test_constants() {
        assert_eq!(RECV_ERROR_BACKOFF, Duration::from_millis(1));
        assert_eq!(LOG_INTERVAL_DATAGRAMS, 1000);
    }

    #[tokio::test]
    async fn test_run_once_applies_frame() {
        let source = MockDatagramSource::new();
        source.push_datagram(&build_frame(0x08, &[0x00, 0x64, 0x00, 0x0A]));
        let (mut rx_loop, store) = receive_loop(source);

        let outcome = assert_ok!(rx_loop.run_once().await);
        assert_eq!(outcome, IngestOutcome::Applied(FrameKind::Battery));
        assert_eq!(store.read().battery_voltage, 10.0);
    }

    #[tokio::test]
    async fn test_run_once_propagates_socket_error() {
        let source = MockDatagramSource::new();
        source.push_error(io::ErrorKind::ConnectionRefused);
        let (mut rx_loop, _store) = receive_loop(source);

        let err = assert_err!(rx_loop.run_once().await);
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(rx_loop.ingestor().stats().datagrams, 0);
    }

    #[tokio::test]
    async fn test_buffer_reset_between_datagrams() {
        let source = MockDatagramSource::new();
        let long = build_frame(0x21, b"HORIZON\0");
        source.push_datagram(&long);

        // Header of a longer frame without its body: must not pick up stale bytes
        source.push_datagram(&long[..3]);
        let (mut rx_loop, store) = receive_loop(source);

        assert_eq!(assert_ok!(rx_loop.run_once().await), IngestOutcome::Applied(FrameKind::FlightMode));
        assert_eq!(
            assert_ok!(rx_loop.run_once().await),
            IngestOutcome::Dropped(FrameError::Truncated { declared: long.len(), received: 3 })
        );
        assert_eq!(store.read().flight_mode, "HORIZON");
    }

    #[tokio::test]
    async fn test_oversized_datagram_is_truncated_to_buffer() {
        let source = MockDatagramSource::new();
        let mut datagram = build_frame(0x08, &[0x00, 0x64, 0x00, 0x0A]);
        datagram.resize(1024, 0xAA);
        source.push_datagram(&datagram);
        let (mut rx_loop, _store) = receive_loop(source);

        let outcome = assert_ok!(rx_loop.run_once().await);
        assert_eq!(outcome, IngestOutcome::Applied(FrameKind::Battery));
    }

    #[tokio::test]
    async fn test_run_continues_after_errors() {
        let source = MockDatagramSource::new();
        source.push_error(io::ErrorKind::Interrupted);
        source.push_datagram(&[0xC8]);
        source.push_datagram(&build_frame(0x1E, &[0x27, 0x10, 0x27, 0x10, 0x27, 0x10]));
        let (mut rx_loop, store) = receive_loop(source);

        let mut reader = store.subscribe();
        tokio::select! {
            _ = rx_loop.run() => unreachable!("receive loop returned"),
            changed = reader.changed() => assert!(changed),
        }

        assert_eq!(reader.read().yaw, 1.0);
        assert_eq!(rx_loop.ingestor().stats().dropped, 1);
    }
}
