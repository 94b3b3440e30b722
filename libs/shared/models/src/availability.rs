use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_config::OverlapScope;

use crate::interval::{self, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Taken,
    Completed,
    Canceled,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "AVAILABLE",
            AvailabilityStatus::Taken => "TAKEN",
            AvailabilityStatus::Completed => "COMPLETED",
            AvailabilityStatus::Canceled => "CANCELED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AvailabilityStatus::Completed | AvailabilityStatus::Canceled)
    }

    /// Transitions an owner may request directly. TAKEN is entered only by
    /// booking and left back to AVAILABLE only by cancelling the schedule.
    pub fn can_transition_to(&self, next: AvailabilityStatus) -> bool {
        use AvailabilityStatus::*;

        matches!(
            (self, next),
            (Available, Completed) | (Available, Canceled) | (Taken, Completed) | (Taken, Canceled)
        )
    }

    /// Whether a stored availability in this status prevents a new one from
    /// overlapping it.
    pub fn blocks_overlap(&self, scope: OverlapScope) -> bool {
        match scope {
            OverlapScope::All => true,
            OverlapScope::Active => !self.is_terminal(),
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AvailabilityStatus,
    pub created_at: DateTime<Utc>,
}

impl Availability {
    pub fn conflicts_with(&self, range: &TimeRange) -> bool {
        interval::conflicts(self.start_time, self.end_time, range.start(), range.end())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAvailability {
    pub owner_id: Uuid,
    pub range: TimeRange,
    pub status: AvailabilityStatus,
}

impl NewAvailability {
    pub fn into_availability(self, id: Uuid, created_at: DateTime<Utc>) -> Availability {
        Availability {
            id,
            owner_id: self.owner_id,
            start_time: self.range.start(),
            end_time: self.range.end(),
            status: self.status,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AvailabilityStatus::*;

    #[test]
    fn terminal_states_allow_no_transitions() {
        for from in [Completed, Canceled] {
            for to in [Available, Taken, Completed, Canceled] {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn taken_is_not_reachable_by_status_change() {
        for from in [Available, Taken, Completed, Canceled] {
            assert!(!from.can_transition_to(Taken));
        }
    }

    #[test]
    fn open_slots_can_be_closed() {
        assert!(Available.can_transition_to(Canceled));
        assert!(Available.can_transition_to(Completed));
        assert!(Taken.can_transition_to(Completed));
        assert!(Taken.can_transition_to(Canceled));
        assert!(!Taken.can_transition_to(Available));
    }

    #[test]
    fn overlap_scope_decides_which_rows_block() {
        assert!(Canceled.blocks_overlap(OverlapScope::All));
        assert!(!Canceled.blocks_overlap(OverlapScope::Active));
        assert!(!Completed.blocks_overlap(OverlapScope::Active));
        assert!(Taken.blocks_overlap(OverlapScope::Active));
        assert!(Available.blocks_overlap(OverlapScope::Active));
    }

    #[test]
    fn drafts_with_inverted_ranges_are_rejected_on_read() {
        let body = r#"{
            "owner_id": "6f1c0d2e-4a0b-4c47-9a0e-1f8f3c2b7d11",
            "range": { "start": "2030-01-01T11:00:00Z", "end": "2030-01-01T10:00:00Z" },
            "status": "AVAILABLE"
        }"#;
        assert!(serde_json::from_str::<NewAvailability>(body).is_err());
    }

    #[test]
    fn default_status_is_available() {
        assert_eq!(AvailabilityStatus::default(), Available);
    }
}
