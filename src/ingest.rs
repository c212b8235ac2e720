//! # Frame Ingestion
//!
//! Turns one received datagram into at most one telemetry update.
//!
//! Pipeline: declared length check → slice to the declared length →
//! validate → decode → apply to the store. Every failure is local to the
//! datagram: it is counted, logged and dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::crsf::decoder::FrameDecoder;
use crate::crsf::protocol::{
    DecodeOutcome, FrameKind, CRSF_FRAME_HEADER_OVERHEAD, CRSF_LENGTH_OFFSET,
    CRSF_MAX_FRAME_SIZE, CRSF_MIN_FRAME_SIZE, CRSF_TYPE_OFFSET,
};
use crate::crsf::validator::check_frame;
use crate::error::FrameError;
use crate::telemetry::TelemetryStore;

/// What happened to one datagram
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Zero-length datagram, nothing to do
    Empty,

    /// Frame decoded and applied to the store
    Applied(FrameKind),

    /// Valid frame of a type that is not decoded
    Ignored(u8),

    /// Frame rejected
    Dropped(FrameError),
}

/// Running counters for the ingestion pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub datagrams: u64,
    pub applied: u64,
    pub ignored: u64,
    pub dropped: u64,
    per_kind: HashMap<FrameKind, u64>,
    per_error: HashMap<&'static str, u64>,
}

impl IngestStats {
    /// Frames applied for one kind
    pub fn applied_for(&self, kind: FrameKind) -> u64 {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Frames dropped for one error kind (see [`FrameError::kind`])
    pub fn dropped_for(&self, error_kind: &str) -> u64 {
        self.per_error.get(error_kind).copied().unwrap_or(0)
    }

    fn record(&mut self, outcome: &IngestOutcome) {
        self.datagrams += 1;
        match outcome {
            IngestOutcome::Empty => {}
            IngestOutcome::Applied(kind) => {
                self.applied += 1;
                *self.per_kind.entry(*kind).or_default() += 1;
            }
            IngestOutcome::Ignored(_) => self.ignored += 1,
            IngestOutcome::Dropped(err) => {
                self.dropped += 1;
                *self.per_error.entry(err.kind()).or_default() += 1;
            }
        }
    }
}

/// Single-producer front end of the telemetry store
#[derive(Debug)]
pub struct FrameIngestor {
    decoder: FrameDecoder,
    store: Arc<TelemetryStore>,
    max_frame_len: usize,
    stats: IngestStats,
}

impl FrameIngestor {
    /// Create an ingestor feeding `store`
    pub fn new(decoder: FrameDecoder, store: Arc<TelemetryStore>) -> Self {
        Self {
            decoder,
            store,
            max_frame_len: CRSF_MAX_FRAME_SIZE,
            stats: IngestStats::default(),
        }
    }

    /// Override the largest accepted frame (address through CRC)
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Counters since creation
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Store this ingestor writes to
    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.store
    }

    /// Process one datagram
    ///
    /// The datagram must hold exactly one frame; bytes after the frame's
    /// declared length are ignored and never reach the checksum.
    pub fn ingest(&mut self, datagram: &[u8]) -> IngestOutcome {
        let outcome = match self.process(datagram) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, kind = err.kind(), len = datagram.len(), "Dropping CRSF frame");
                IngestOutcome::Dropped(err)
            }
        };

        self.stats.record(&outcome);
        outcome
    }

    fn process(&self, datagram: &[u8]) -> Result<IngestOutcome, FrameError> {
        if datagram.is_empty() {
            return Ok(IngestOutcome::Empty);
        }

        let frame = self.frame_slice(datagram)?;
        check_frame(frame)?;

        let frame_type = frame[CRSF_TYPE_OFFSET];
        match self.decoder.decode(frame_type, frame)? {
            DecodeOutcome::Update(update) => {
                let kind = update.kind();
                trace!(kind = kind.name(), ?update, "Applying telemetry update");
                self.store.apply_update(update);
                Ok(IngestOutcome::Applied(kind))
            }
            DecodeOutcome::Unrecognized(frame_type) => {
                debug!("Ignoring CRSF frame type 0x{:02X}", frame_type);
                Ok(IngestOutcome::Ignored(frame_type))
            }
        }
    }

    /// Slice the datagram to the length its own header declares
    fn frame_slice<'a>(&self, datagram: &'a [u8]) -> Result<&'a [u8], FrameError> {
        let Some(&length) = datagram.get(CRSF_LENGTH_OFFSET) else {
            return Err(FrameError::TooShort { len: datagram.len() });
        };

        let declared = length as usize + CRSF_FRAME_HEADER_OVERHEAD;
        if declared < CRSF_MIN_FRAME_SIZE {
            return Err(FrameError::TooShort { len: declared });
        }
        if declared > self.max_frame_len {
            return Err(FrameError::Oversized { declared, max: self.max_frame_len });
        }
        if datagram.len() < declared {
            return Err(FrameError::Truncated { declared, received: datagram.len() });
        }

        if datagram.len() > declared {
            trace!("Ignoring {} trailing bytes after frame", datagram.len() - declared);
        }

        Ok(&datagram[..declared])
    }
}
