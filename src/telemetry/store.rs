//! Shared telemetry store.
//!
//! One producer (the ingestion loop) applies updates, any number of readers
//! take snapshots. The snapshot lives in a `tokio::sync::watch` channel: an
//! update is applied under the channel's write lock in a single
//! `send_modify` call, so readers see either the whole update or none of it.

use tokio::sync::watch;

use super::snapshot::TelemetrySnapshot;
use crate::crsf::protocol::TelemetryUpdate;

/// Owner of the authoritative [`TelemetrySnapshot`]
#[derive(Debug)]
pub struct TelemetryStore {
    tx: watch::Sender<TelemetrySnapshot>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    /// Create a store holding a zeroed snapshot
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TelemetrySnapshot::default());
        Self { tx }
    }

    /// Merge an update into the snapshot and notify subscribers
    ///
    /// The write lock is held only while the fields are copied.
    pub fn apply_update(&self, update: TelemetryUpdate) {
        self.tx.send_modify(|snapshot| snapshot.apply(update));
    }

    /// Point-in-time copy of the snapshot
    pub fn read(&self) -> TelemetrySnapshot {
        self.tx.borrow().clone()
    }

    /// Reader handle that can also wait for the next update
    pub fn subscribe(&self) -> TelemetryReader {
        TelemetryReader { rx: self.tx.subscribe() }
    }
}

/// Read-only view of a [`TelemetryStore`]
#[derive(Debug, Clone)]
pub struct TelemetryReader {
    rx: watch::Receiver<TelemetrySnapshot>,
}

impl TelemetryReader {
    /// Point-in-time copy of the snapshot, marking it as seen
    pub fn read(&mut self) -> TelemetrySnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// True if an update landed since the last [`read`](Self::read)
    ///
    /// A closed store counts as unchanged.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait until the next update
    ///
    /// Returns `false` once the store has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_store_is_zeroed() {
        let store = TelemetryStore::new();
        assert_eq!(store.read(), TelemetrySnapshot::default());
    }

    #[test]
    fn test_apply_update_is_visible_to_read() {
        let store = TelemetryStore::new();
        store.apply_update(TelemetryUpdate::Battery { voltage: 10.0, current: 1.0 });

        let snapshot = store.read();
        assert_eq!(snapshot.battery_voltage, 10.0);
        assert_eq!(snapshot.battery_current, 1.0);
        assert_eq!(snapshot.pitch, 0.0);
        assert!(snapshot.flight_mode.is_empty());
    }

    #[test]
    fn test_reader_tracks_changes() {
        let store = TelemetryStore::new();
        let mut reader = store.subscribe();
        assert!(!reader.has_changed());

        store.apply_update(TelemetryUpdate::FlightMode("ACRO".to_string()));
        assert!(reader.has_changed());
        assert_eq!(reader.read().flight_mode, "ACRO");
        assert!(!reader.has_changed());
    }

    #[tokio::test]
    async fn test_reader_changed_wakes_on_update() {
        let store = Arc::new(TelemetryStore::new());
        let mut reader = store.subscribe();

        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            writer.apply_update(TelemetryUpdate::Attitude { pitch: 0.5, roll: 0.25, yaw: -0.5 });
        });

        assert!(reader.changed().await);
        assert_eq!(reader.read().roll, 0.25);
    }

    #[tokio::test]
    async fn test_reader_changed_returns_false_when_store_dropped() {
        let store = TelemetryStore::new();
        let mut reader = store.subscribe();
        drop(store);
        assert!(!reader.changed().await);
    }

    #[test]
    fn test_concurrent_reads_never_see_torn_updates() {
        let store = Arc::new(TelemetryStore::new());
        let done = Arc::new(AtomicBool::new(false));

        // Each update keeps voltage == current and pitch == roll == yaw,
        // so a torn read would show unequal fields
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut reads = 0u64;
                    loop {
                        let snapshot = store.read();
                        assert_eq!(snapshot.battery_voltage, snapshot.battery_current);
                        assert_eq!(snapshot.pitch, snapshot.roll);
                        assert_eq!(snapshot.roll, snapshot.yaw);
                        reads += 1;
                        if done.load(Ordering::Relaxed) {
                            break;
                        }
                    }
                    reads
                })
            })
            .collect();

        for i in 0..20_000u32 {
            let value = i as f32;
            store.apply_update(TelemetryUpdate::Battery { voltage: value, current: value });
            store.apply_update(TelemetryUpdate::Attitude { pitch: -value, roll: -value, yaw: -value });
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            let reads = reader.join().expect("reader thread panicked");
            assert!(reads > 0);
        }

        let last = store.read();
        assert_eq!(last.battery_voltage, 19_999.0);
        assert_eq!(last.yaw, -19_999.0);
    }
}
