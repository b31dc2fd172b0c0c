//! Core track domain types.
//!
//! Defines the entities that flow through the ingestion pipeline: sources,
//! scenes, object classes, positions, and the normalized position updates
//! that adapters publish. These types are the foundation of the hexagonal
//! architecture's inner ring.
//!
//! Exposes two API surfaces:
//! - Rich types (Uuid, DateTime) for domain-internal logic
//! - Lightweight aliases and f64-based structs for ports/adapters boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// Lightweight source identifier used at the ports boundary.
pub type SourceId = String;

/// Lightweight scene identifier used at the ports boundary.
pub type SceneId = String;

/// Unique identifier for a published track.
pub type TrackId = Uuid;

// ────────────────────────────────────────────
// Enums shared across domain and ports
// ────────────────────────────────────────────

/// Object classes an update can carry.
///
/// Classes come from whatever labeling the upstream source ships with its
/// scenes. Anything unrecognized maps to `Unknown` rather than failing the
/// whole poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackClass {
    /// Ground vehicle (the primary class of interest).
    Vehicle,
    /// Fixed-wing or rotary aircraft.
    Aircraft,
    /// Surface vessel.
    Vessel,
    /// Label missing or not recognized.
    Unknown,
}

impl TrackClass {
    /// Parse an upstream label string, mapping unrecognized labels to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "vehicle" | "truck" | "car" | "armor" => Self::Vehicle,
            "aircraft" | "plane" | "helicopter" => Self::Aircraft,
            "vessel" | "ship" | "boat" => Self::Vessel,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for TrackClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vehicle => write!(f, "vehicle"),
            Self::Aircraft => write!(f, "aircraft"),
            Self::Vessel => write!(f, "vessel"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ────────────────────────────────────────────
// Lightweight structs for the ports boundary
// ────────────────────────────────────────────

/// A WGS 84 point in decimal degrees.
///
/// Carried as-is from the source; this crate does no datum or projection
/// conversion. Only range validity is checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees, [-90, 90].
    pub lat_deg: f64,
    /// Longitude in decimal degrees, [-180, 180].
    pub lon_deg: f64,
}

impl Position {
    /// Create a position without validating it.
    pub const fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Check that both coordinates are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lon_deg)
    }

    /// Largest per-axis degree delta to another position.
    ///
    /// Used by the debounce filter as a cheap movement measure. Not a
    /// distance: longitude degrees shrink toward the poles and this
    /// deliberately ignores that.
    pub fn max_axis_delta_deg(&self, other: &Self) -> f64 {
        let d_lat = (self.lat_deg - other.lat_deg).abs();
        let d_lon = (self.lon_deg - other.lon_deg).abs();
        d_lat.max(d_lon)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat_deg, self.lon_deg)
    }
}

/// Normalized position update published by adapters.
///
/// This is the struct the `Adapter` port emits and the `IngestEngine`
/// consumes. It uses `f64`/`String` for frictionless serialization to the
/// JSONL track log and downstream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Unique track identifier assigned at publication.
    pub track_id: TrackId,
    /// Source adapter that produced this update.
    pub source: SourceId,
    /// Classified object type.
    pub class: TrackClass,
    /// Observed position.
    pub position: Position,
    /// Source-reported confidence in [0, 1].
    pub confidence: f64,
    /// Observation timestamp in Unix milliseconds.
    pub timestamp_ms: u64,
    /// Scene the observation came from, if any.
    pub scene_id: Option<SceneId>,
}

impl PositionUpdate {
    /// Create an update with a fresh track id and the current wall clock.
    pub fn now(source: SourceId, class: TrackClass, position: Position) -> Self {
        Self {
            track_id: Uuid::new_v4(),
            source,
            class,
            position,
            confidence: 1.0,
            timestamp_ms: unix_ms(),
            scene_id: None,
        }
    }

    /// Observation time as a chrono timestamp, if representable.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(i64::try_from(self.timestamp_ms).ok()?)
    }
}

/// Current Unix time in milliseconds.
pub fn unix_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(45.0, -122.0).is_valid());
        assert!(Position::new(90.0, 180.0).is_valid());
        assert!(!Position::new(90.1, 0.0).is_valid());
        assert!(!Position::new(0.0, -180.5).is_valid());
        assert!(!Position::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_max_axis_delta() {
        let a = Position::new(10.0, 20.0);
        let b = Position::new(10.5, 20.2);
        let delta = a.max_axis_delta_deg(&b);
        assert!((delta - 0.5).abs() < 1e-9, "Expected 0.5, got {delta}");
    }

    #[test]
    fn test_class_from_label() {
        assert_eq!(TrackClass::from_label("Truck"), TrackClass::Vehicle);
        assert_eq!(TrackClass::from_label("ship"), TrackClass::Vessel);
        assert_eq!(TrackClass::from_label("satellite"), TrackClass::Unknown);
    }

    #[test]
    fn test_update_roundtrip_serde() {
        let update = PositionUpdate::now(
            "osint-test".to_string(),
            TrackClass::Vehicle,
            Position::new(48.85, 2.35),
        );
        let json = serde_json::to_string(&update).unwrap();
        let back: PositionUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, back);
    }
}
