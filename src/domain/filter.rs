//! Update Filter - Per-source Debounce and Staleness Rejection
//!
//! Suppresses position updates that carry no new information: a source
//! re-reporting an object that has barely moved within a short window, or
//! an observation older than what was already admitted for that source.
//! Keeps the track log and downstream broadcast free of churn.

use std::collections::HashMap;

use crate::domain::track::{Position, PositionUpdate, SourceId, TrackClass};

/// Why the filter suppressed an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Position is out of WGS 84 range or non-finite.
    InvalidPosition,
    /// Confidence outside [0, 1].
    InvalidConfidence,
    /// Observation is older than the last admitted one for this key.
    Stale,
    /// Moved less than the configured delta within the quiet interval.
    Duplicate,
}

impl Suppression {
    /// Stable label for metrics and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPosition => "invalid_position",
            Self::InvalidConfidence => "invalid_confidence",
            Self::Stale => "stale",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Last admitted observation per (source, class) key.
#[derive(Debug, Clone, Copy)]
struct LastSeen {
    position: Position,
    timestamp_ms: u64,
}

/// Stateful debounce filter for the ingest pipeline.
///
/// An update is admitted when it is valid and either moved at least
/// `min_move_deg` on some axis since the last admitted observation for its
/// (source, class) key, or at least `min_interval_ms` has elapsed. Older
/// observations than the last admitted one are always rejected.
#[derive(Debug)]
pub struct UpdateFilter {
    /// Minimum per-axis movement in degrees to pass the debounce.
    min_move_deg: f64,
    /// Quiet interval after which any fresh observation passes.
    min_interval_ms: u64,
    /// Last admitted observation per key.
    last_seen: HashMap<(SourceId, TrackClass), LastSeen>,
}

impl UpdateFilter {
    /// Create a filter with the given debounce thresholds.
    pub fn new(min_move_deg: f64, min_interval_ms: u64) -> Self {
        Self {
            min_move_deg,
            min_interval_ms,
            last_seen: HashMap::new(),
        }
    }

    /// Replace thresholds without dropping per-key state (hot-reload path).
    pub fn set_thresholds(&mut self, min_move_deg: f64, min_interval_ms: u64) {
        self.min_move_deg = min_move_deg;
        self.min_interval_ms = min_interval_ms;
    }

    /// Decide whether an update should be admitted.
    ///
    /// Returns `Ok(())` on admission (the filter records the observation),
    /// or the suppression reason otherwise.
    pub fn admit(&mut self, update: &PositionUpdate) -> Result<(), Suppression> {
        self.check(update)?;
        self.record(update);
        Ok(())
    }

    /// Evaluate an update against validity and debounce rules without
    /// recording it.
    pub fn check(&self, update: &PositionUpdate) -> Result<(), Suppression> {
        if !update.position.is_valid() {
            return Err(Suppression::InvalidPosition);
        }
        if !(0.0..=1.0).contains(&update.confidence) || !update.confidence.is_finite() {
            return Err(Suppression::InvalidConfidence);
        }

        let key = (update.source.clone(), update.class);

        if let Some(last) = self.last_seen.get(&key) {
            if update.timestamp_ms < last.timestamp_ms {
                return Err(Suppression::Stale);
            }

            let moved = update.position.max_axis_delta_deg(&last.position);
            let elapsed = update.timestamp_ms - last.timestamp_ms;

            if moved < self.min_move_deg && elapsed < self.min_interval_ms {
                return Err(Suppression::Duplicate);
            }
        }

        Ok(())
    }

    /// Record an observation as admitted for its (source, class) key.
    ///
    /// Callers that persist admitted updates commit here only after the
    /// write succeeded, so a failed write does not debounce the retry.
    pub fn record(&mut self, update: &PositionUpdate) {
        self.last_seen.insert(
            (update.source.clone(), update.class),
            LastSeen {
                position: update.position,
                timestamp_ms: update.timestamp_ms,
            },
        );
    }

    /// Number of (source, class) keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.last_seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::track::{Position, PositionUpdate, TrackClass};

    fn update(lat: f64, lon: f64, ts: u64) -> PositionUpdate {
        let mut u = PositionUpdate::now(
            "osint-1".to_string(),
            TrackClass::Vehicle,
            Position::new(lat, lon),
        );
        u.timestamp_ms = ts;
        u
    }

    #[test]
    fn test_first_update_admitted() {
        let mut filter = UpdateFilter::new(0.001, 60_000);
        assert_eq!(filter.admit(&update(10.0, 20.0, 1_000)), Ok(()));
        assert_eq!(filter.tracked_keys(), 1);
    }

    #[test]
    fn test_near_duplicate_suppressed() {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(10.0, 20.0, 1_000)).unwrap();
        let result = filter.admit(&update(10.0001, 20.0, 2_000));
        assert_eq!(result, Err(Suppression::Duplicate));
    }

    #[test]
    fn test_movement_beats_debounce() {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(10.0, 20.0, 1_000)).unwrap();
        assert_eq!(filter.admit(&update(10.5, 20.0, 2_000)), Ok(()));
    }

    #[test]
    fn test_quiet_interval_beats_debounce() {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(10.0, 20.0, 1_000)).unwrap();
        assert_eq!(filter.admit(&update(10.0, 20.0, 70_000)), Ok(()));
    }

    #[test]
    fn test_stale_rejected() {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(10.0, 20.0, 5_000)).unwrap();
        assert_eq!(
            filter.admit(&update(11.0, 20.0, 4_000)),
            Err(Suppression::Stale)
        );
    }

    #[test]
    fn test_invalid_position_rejected() {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        assert_eq!(
            filter.admit(&update(91.0, 20.0, 1_000)),
            Err(Suppression::InvalidPosition)
        );
        // Rejection must not record state
        assert_eq!(filter.tracked_keys(), 0);
    }

    #[test]
    fn test_sources_tracked_independently() {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(10.0, 20.0, 1_000)).unwrap();

        let mut other = update(10.0, 20.0, 1_500);
        other.source = "osint-2".to_string();
        assert_eq!(filter.admit(&other), Ok(()));
        assert_eq!(filter.tracked_keys(), 2);
    }
}
