//! JSONL telemetry logger with file rotation.
//!
//! Each record is one JSON object: an RFC 3339 UTC timestamp followed by the
//! snapshot fields. A new file is opened every `max_records_per_file`
//! records and only the newest `max_files_to_keep` files are retained.
//!
//! File names carry a wall-clock timestamp and a sequence number. Age is
//! decided by the sequence number alone; it continues from the highest one
//! already on disk, so a restart never reuses a name and a clock step does
//! not reorder files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::snapshot::TelemetrySnapshot;
use crate::config::TelemetryConfig;
use crate::error::Result;

const LOG_FILE_PREFIX: &str = "telemetry_";
const LOG_FILE_EXTENSION: &str = "jsonl";

#[derive(Debug, Serialize)]
struct TelemetryRecord<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: &'a TelemetrySnapshot,
}

/// Rotating JSONL writer for telemetry snapshots
#[derive(Debug)]
pub struct TelemetryLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    file_seq: u64,
}

impl TelemetryLogger {
    /// Create a logger, creating the log directory if needed
    ///
    /// No file is opened until the first record is written.
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let log_dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&log_dir)?;

        let file_seq = log_files(&log_dir)?
            .iter()
            .filter_map(|path| file_seq_of(path))
            .max()
            .map_or(0, |seq| seq + 1);

        info!("Telemetry logging to {} (next file #{})", log_dir.display(), file_seq);

        Ok(Self {
            log_dir,
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            writer: None,
            current_path: None,
            records_in_file: 0,
            file_seq,
        })
    }

    /// Append one snapshot, rotating first if the current file is full
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be serialized or written
    pub fn log(&mut self, snapshot: &TelemetrySnapshot) -> Result<()> {
        self.log_at(Utc::now(), snapshot)
    }

    fn log_at(&mut self, timestamp: DateTime<Utc>, snapshot: &TelemetrySnapshot) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate(timestamp)?;
        }

        let record = TelemetryRecord { timestamp, snapshot };
        let line = serde_json::to_string(&record)?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }
        self.records_in_file += 1;

        Ok(())
    }

    /// Path of the file currently being written, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let (path, file) = loop {
            let file_name = format!(
                "{}{}_{:06}.{}",
                LOG_FILE_PREFIX,
                timestamp.format("%Y%m%dT%H%M%S"),
                self.file_seq,
                LOG_FILE_EXTENSION
            );
            let path = self.log_dir.join(file_name);
            self.file_seq += 1;

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Telemetry log {} already exists, skipping", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        };
        debug!("Opened telemetry log {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    /// Delete the oldest log files beyond `max_files_to_keep`
    ///
    /// Oldest means lowest sequence number, not earliest timestamp.
    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort_by_key(|path| file_seq_of(path));
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old telemetry log {}: {}", path.display(), e);
            } else {
                debug!("Removed old telemetry log {}", path.display());
            }
        }

        Ok(())
    }
}

fn log_files(log_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
            && path.extension().is_some_and(|ext| ext == LOG_FILE_EXTENSION);

        if is_log {
            files.push(path);
        }
    }

    Ok(files)
}

/// Sequence number from `telemetry_<timestamp>_<seq>.jsonl`
fn file_seq_of(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let (_, seq) = stem.rsplit_once('_')?;
    seq.parse().ok()
}
