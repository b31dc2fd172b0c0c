//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that domain components maintain
//! invariants across random inputs.

use proptest::prelude::*;

use semper_fi::domain::filter::{Suppression, UpdateFilter};
use semper_fi::domain::track::{Position, PositionUpdate, TrackClass};

fn update(lat: f64, lon: f64, ts: u64, confidence: f64) -> PositionUpdate {
    let mut u = PositionUpdate::now(
        "osint-prop".to_string(),
        TrackClass::Vehicle,
        Position::new(lat, lon),
    );
    u.timestamp_ms = ts;
    u.confidence = confidence;
    u
}

// ── Position Validation Properties ──────────────────────────

proptest! {
    /// Any in-range coordinate pair must validate.
    #[test]
    fn position_in_range_is_valid(
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0,
    ) {
        prop_assert!(Position::new(lat, lon).is_valid());
    }

    /// Any out-of-range latitude must fail validation.
    #[test]
    fn position_bad_latitude_is_invalid(
        lat in prop_oneof![90.0001f64..1e6, -1e6f64..-90.0001],
        lon in -180.0f64..=180.0,
    ) {
        prop_assert!(!Position::new(lat, lon).is_valid());
    }

    /// The axis delta is symmetric and non-negative.
    #[test]
    fn axis_delta_symmetric(
        lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
        lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
    ) {
        let a = Position::new(lat1, lon1);
        let b = Position::new(lat2, lon2);
        let d1 = a.max_axis_delta_deg(&b);
        let d2 = b.max_axis_delta_deg(&a);
        prop_assert!(d1 >= 0.0);
        prop_assert!((d1 - d2).abs() < 1e-12);
    }
}

// ── Update Filter Properties ────────────────────────────────

proptest! {
    /// The filter never admits an update with an invalid position,
    /// regardless of thresholds or history.
    #[test]
    fn filter_never_admits_invalid_position(
        lat in 90.0001f64..1e4,
        lon in -180.0f64..=180.0,
        ts in 0u64..10_000_000,
        min_move in 0.0f64..1.0,
    ) {
        let mut filter = UpdateFilter::new(min_move, 60_000);
        let result = filter.admit(&update(lat, lon, ts, 0.5));
        prop_assert_eq!(result, Err(Suppression::InvalidPosition));
        prop_assert_eq!(filter.tracked_keys(), 0);
    }

    /// Confidence outside [0, 1] is always rejected.
    #[test]
    fn filter_rejects_out_of_range_confidence(
        confidence in prop_oneof![1.0001f64..100.0, -100.0f64..-0.0001],
        ts in 0u64..10_000_000,
    ) {
        let mut filter = UpdateFilter::new(0.0, 0);
        let result = filter.admit(&update(10.0, 20.0, ts, confidence));
        prop_assert_eq!(result, Err(Suppression::InvalidConfidence));
    }

    /// A valid first observation for a key is always admitted.
    #[test]
    fn filter_admits_first_valid_update(
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0,
        ts in 0u64..10_000_000,
        conf in 0.0f64..=1.0,
    ) {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        prop_assert_eq!(filter.admit(&update(lat, lon, ts, conf)), Ok(()));
    }

    /// After an admission, an identical observation within the quiet
    /// interval is suppressed, and admitting is idempotent on state.
    #[test]
    fn filter_suppresses_identical_within_interval(
        lat in -89.0f64..=89.0,
        lon in -179.0f64..=179.0,
        ts in 0u64..1_000_000,
        gap in 0u64..59_999,
    ) {
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(lat, lon, ts, 0.5)).unwrap();
        let keys_before = filter.tracked_keys();

        let result = filter.admit(&update(lat, lon, ts + gap, 0.5));
        prop_assert_eq!(result, Err(Suppression::Duplicate));
        prop_assert_eq!(filter.tracked_keys(), keys_before);
    }

    /// An observation older than the last admitted one is never admitted,
    /// no matter how far it moved.
    #[test]
    fn filter_rejects_time_travel(
        lat in -89.0f64..=89.0,
        lon in -179.0f64..=179.0,
        ts in 1u64..1_000_000,
        back in 1u64..1_000_000,
    ) {
        prop_assume!(back <= ts);
        let mut filter = UpdateFilter::new(0.01, 60_000);
        filter.admit(&update(lat, lon, ts, 0.5)).unwrap();

        let result = filter.admit(&update(-lat, lon, ts - back, 0.5));
        prop_assert_eq!(result, Err(Suppression::Stale));
    }
}
