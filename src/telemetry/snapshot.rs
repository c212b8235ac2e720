//! Latest-known telemetry values.

use std::fmt;

use serde::Serialize;

use crate::crsf::protocol::TelemetryUpdate;

/// Latest decoded value of every telemetry channel
///
/// Starts zeroed with an empty flight mode. Each field is last-write-wins
/// and only changes when a frame of its own type is decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    /// Battery voltage in volts
    pub battery_voltage: f32,

    /// Battery current in amperes
    pub battery_current: f32,

    /// Pitch in radians
    pub pitch: f32,

    /// Roll in radians
    pub roll: f32,

    /// Yaw in radians
    pub yaw: f32,

    /// Flight mode label ("Unknown" when undecodable)
    pub flight_mode: String,
}

impl TelemetrySnapshot {
    /// Merge an update, overwriting only the fields it carries
    pub fn apply(&mut self, update: TelemetryUpdate) {
        match update {
            TelemetryUpdate::Battery { voltage, current } => {
                self.battery_voltage = voltage;
                self.battery_current = current;
            }
            TelemetryUpdate::Attitude { pitch, roll, yaw } => {
                self.pitch = pitch;
                self.roll = roll;
                self.yaw = yaw;
            }
            TelemetryUpdate::FlightMode(label) => {
                self.flight_mode = label;
            }
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Battery: {:.2}V {:.1}A", self.battery_voltage, self.battery_current)?;
        writeln!(f, "Attitude: Pitch={:.2} Roll={:.2} Yaw={:.2}", self.pitch, self.roll, self.yaw)?;
        write!(f, "Flight Mode: {}", self.flight_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_zeroed() {
        let snapshot = TelemetrySnapshot::default();
        assert_eq!(snapshot.battery_voltage, 0.0);
        assert_eq!(snapshot.battery_current, 0.0);
        assert_eq!(snapshot.pitch, 0.0);
        assert_eq!(snapshot.roll, 0.0);
        assert_eq!(snapshot.yaw, 0.0);
        assert!(snapshot.flight_mode.is_empty());
    }

    #[test]
    fn test_apply_only_touches_own_fields() {
        let mut snapshot = TelemetrySnapshot::default();
        snapshot.apply(TelemetryUpdate::Attitude { pitch: 0.1, roll: -0.2, yaw: 1.5 });
        snapshot.apply(TelemetryUpdate::FlightMode("ANGL".to_string()));

        assert_eq!(snapshot.pitch, 0.1);
        assert_eq!(snapshot.roll, -0.2);
        assert_eq!(snapshot.yaw, 1.5);
        assert_eq!(snapshot.flight_mode, "ANGL");
        assert_eq!(snapshot.battery_voltage, 0.0);

        snapshot.apply(TelemetryUpdate::Battery { voltage: 16.8, current: 12.5 });
        assert_eq!(snapshot.battery_voltage, 16.8);
        assert_eq!(snapshot.battery_current, 12.5);
        assert_eq!(snapshot.yaw, 1.5);
        assert_eq!(snapshot.flight_mode, "ANGL");
    }

    #[test]
    fn test_apply_is_last_write_wins() {
        let mut snapshot = TelemetrySnapshot::default();
        snapshot.apply(TelemetryUpdate::FlightMode("ACRO".to_string()));
        snapshot.apply(TelemetryUpdate::FlightMode("Unknown".to_string()));
        assert_eq!(snapshot.flight_mode, "Unknown");
    }

    #[test]
    fn test_display_lines() {
        let snapshot = TelemetrySnapshot {
            battery_voltage: 12.6,
            battery_current: 3.3,
            pitch: -0.1234,
            roll: 0.5,
            yaw: 1.23456,
            flight_mode: "HOR".to_string(),
        };

        let rendered = snapshot.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec![
            "Battery: 12.60V 3.3A",
            "Attitude: Pitch=-0.12 Roll=0.50 Yaw=1.23",
            "Flight Mode: HOR",
        ]);
    }

    #[test]
    fn test_serialize_field_names() {
        let json = serde_json::to_value(TelemetrySnapshot::default()).unwrap();
        for key in ["battery_voltage", "battery_current", "pitch", "roll", "yaw", "flight_mode"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }
}
