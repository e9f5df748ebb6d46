//! Proposed schedule changes and their mechanical classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an item is being moved, classified by the destination day's load
/// at the moment the move is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    /// Destination day had no scheduled items.
    EmptyDay,
    /// Destination day had fewer items than the light-load threshold.
    LightLoad(usize),
    /// Destination day had capacity but a non-trivial load.
    BalanceLoad,
    /// Every day in the horizon was full; forced onto tomorrow.
    Overflow,
}

impl MoveReason {
    /// Classify a move by the destination day's pre-assignment load.
    pub fn classify(destination_load: usize, light_load_threshold: usize) -> Self {
        if destination_load == 0 {
            MoveReason::EmptyDay
        } else if destination_load < light_load_threshold {
            MoveReason::LightLoad(destination_load)
        } else {
            MoveReason::BalanceLoad
        }
    }
}

/// The mechanical facts of a single move, before any rationale text is
/// attached. This is what a [`ReasonGenerator`](super::ReasonGenerator)
/// sees.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    pub item_id: String,
    pub item_title: String,
    pub subject: Option<String>,
    pub original_date: Option<DateTime<Utc>>,
    pub new_date: DateTime<Utc>,
    /// Count of items already on the destination day when the move was
    /// assigned (including moves committed earlier in the same run).
    pub destination_load: usize,
    pub reason: MoveReason,
}

/// A proposed, not-yet-applied date reassignment.
///
/// Nothing is persisted when one of these is produced; it becomes durable
/// only when [`PlanDb::apply_changes`](crate::storage::PlanDb::apply_changes)
/// writes `new_date` back onto the item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleChange {
    pub item_id: String,
    pub item_title: String,
    pub subject: Option<String>,
    pub original_date: Option<DateTime<Utc>>,
    pub new_date: DateTime<Utc>,
    pub kind: MoveReason,
    /// Human-readable justification for the move.
    pub reason: String,
}

impl ScheduleChange {
    pub(crate) fn from_move(mv: PlannedMove, reason: String) -> Self {
        Self {
            item_id: mv.item_id,
            item_title: mv.item_title,
            subject: mv.subject,
            original_date: mv.original_date,
            new_date: mv.new_date,
            kind: mv.reason,
            reason,
        }
    }

    /// Whether this change broke the capacity invariant on purpose.
    pub fn is_overflow(&self) -> bool {
        self.kind == MoveReason::Overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_destination_load() {
        assert_eq!(MoveReason::classify(0, 2), MoveReason::EmptyDay);
        assert_eq!(MoveReason::classify(1, 2), MoveReason::LightLoad(1));
        assert_eq!(MoveReason::classify(2, 2), MoveReason::BalanceLoad);
        assert_eq!(MoveReason::classify(5, 2), MoveReason::BalanceLoad);
    }
}
