use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("start_time must be before end_time")]
pub struct InvalidRange;

/// Half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Wire form; only becomes a `TimeRange` through `TimeRange::new`.
#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = InvalidRange;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start, raw.end)
    }
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidRange> {
        if start >= end {
            return Err(InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Identical intervals or any true intersection. Back-to-back ranges
    /// (`self.end == other.start`) do not conflict.
    pub fn conflicts_with(&self, other: &TimeRange) -> bool {
        conflicts(self.start, self.end, other.start, other.end)
    }
}

/// Raw form of the overlap predicate, usable on stored rows without
/// re-validating them.
pub fn conflicts(
    existing_start: DateTime<Utc>,
    existing_end: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    (existing_start == start && existing_end == end) || (existing_start < end && existing_end > start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn range(from: (u32, u32), to: (u32, u32)) -> TimeRange {
        TimeRange::new(at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert_eq!(TimeRange::new(at(10, 0), at(10, 0)), Err(InvalidRange));
        assert_eq!(TimeRange::new(at(11, 0), at(10, 0)), Err(InvalidRange));
    }

    #[test]
    fn identical_ranges_conflict() {
        assert!(range((10, 0), (11, 0)).conflicts_with(&range((10, 0), (11, 0))));
    }

    #[test]
    fn partial_and_nested_overlaps_conflict() {
        let base = range((10, 0), (11, 0));
        assert!(base.conflicts_with(&range((10, 30), (11, 30))));
        assert!(base.conflicts_with(&range((9, 30), (10, 1))));
        assert!(base.conflicts_with(&range((10, 15), (10, 45))));
        assert!(base.conflicts_with(&range((9, 0), (12, 0))));
    }

    #[test]
    fn touching_ranges_do_not_conflict() {
        let base = range((10, 0), (11, 0));
        assert!(!base.conflicts_with(&range((11, 0), (12, 0))));
        assert!(!base.conflicts_with(&range((9, 0), (10, 0))));
    }

    #[test]
    fn disjoint_ranges_do_not_conflict() {
        assert!(!range((8, 0), (9, 0)).conflicts_with(&range((13, 0), (14, 0))));
    }

    #[test]
    fn deserializing_checks_the_bounds() {
        let inverted = serde_json::from_str::<TimeRange>(
            r#"{"start":"2030-01-01T11:00:00Z","end":"2030-01-01T10:00:00Z"}"#,
        );
        assert!(inverted.is_err());

        let empty = serde_json::from_str::<TimeRange>(
            r#"{"start":"2030-01-01T10:00:00Z","end":"2030-01-01T10:00:00Z"}"#,
        );
        assert!(empty.is_err());

        let valid = range((10, 0), (11, 0));
        let parsed: TimeRange = serde_json::from_str(&serde_json::to_string(&valid).unwrap()).unwrap();
        assert_eq!(parsed, valid);
    }

    #[test]
    fn predicate_is_symmetric() {
        let a = range((10, 0), (11, 0));
        let b = range((10, 59), (12, 0));
        assert_eq!(a.conflicts_with(&b), b.conflicts_with(&a));
    }
}
