//! Rationale generation for schedule changes.
//!
//! The rebalancer computes dates mechanically; turning a move into a
//! human-readable justification is an injected concern so the core stays
//! deterministic and testable. The AI gateway can rephrase reasons after
//! the fact, but every change starts with the template text below.

use super::change::{MoveReason, PlannedMove};

/// Produces the `reason` text attached to a schedule change.
pub trait ReasonGenerator: Send + Sync {
    fn describe(&self, mv: &PlannedMove) -> String;
}

/// Deterministic template-based generator. This is the default and the
/// fallback whenever an external text service is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReasonGenerator;

impl ReasonGenerator for TemplateReasonGenerator {
    fn describe(&self, mv: &PlannedMove) -> String {
        let weekday = mv.new_date.format("%A");
        match mv.reason {
            MoveReason::EmptyDay => {
                format!("Moved to {weekday} as it has no scheduled sessions.")
            }
            MoveReason::LightLoad(n) => {
                format!("Moved to {weekday} which has light load ({n} sessions).")
            }
            MoveReason::BalanceLoad => {
                format!("Moved to {weekday} to balance weekly workload.")
            }
            MoveReason::Overflow => "All days are full. Added to tomorrow with overflow.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn mv(reason: MoveReason) -> PlannedMove {
        PlannedMove {
            item_id: "i1".to_string(),
            item_title: "Essay draft".to_string(),
            subject: None,
            original_date: None,
            // 2026-03-06 is a Friday
            new_date: Utc.with_ymd_and_hms(2026, 3, 6, 10, 0, 0).unwrap(),
            destination_load: 0,
            reason,
        }
    }

    #[test]
    fn empty_day_text() {
        let text = TemplateReasonGenerator.describe(&mv(MoveReason::EmptyDay));
        assert_eq!(text, "Moved to Friday as it has no scheduled sessions.");
    }

    #[test]
    fn light_load_text_includes_count() {
        let text = TemplateReasonGenerator.describe(&mv(MoveReason::LightLoad(1)));
        assert_eq!(text, "Moved to Friday which has light load (1 sessions).");
    }

    #[test]
    fn overflow_text_is_fixed() {
        let text = TemplateReasonGenerator.describe(&mv(MoveReason::Overflow));
        assert_eq!(text, "All days are full. Added to tomorrow with overflow.");
    }
}
