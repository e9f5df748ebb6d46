//! Deterministic fallbacks for gateway-backed features.
//!
//! Whenever the gateway is disabled, unreachable, or returns garbage,
//! callers use these templated equivalents so planning never fails on a
//! network dependency.

use crate::rebalance::ScheduleChange;

use super::{DifficultyAnalysis, ScheduleOptimization};

/// Templated summary over mechanical schedule changes.
pub fn fallback_optimization(changes: &[ScheduleChange]) -> ScheduleOptimization {
    let overall_summary = if changes.is_empty() {
        "Your schedule looks balanced! No changes needed.".to_string()
    } else {
        format!("Redistributed {} tasks from overloaded days.", changes.len())
    };

    ScheduleOptimization {
        reasons: Vec::new(),
        insights: Vec::new(),
        overall_summary,
    }
}

/// Keyword- and duration-based difficulty estimate.
///
/// Scores 1-10: long work is harder, and a few recognizable title
/// keywords shift the estimate. Confidence is deliberately low so callers
/// can tell this apart from a real analysis.
pub fn estimate_difficulty(
    title: &str,
    subject: Option<&str>,
    duration_minutes: i64,
) -> DifficultyAnalysis {
    let mut score: i64 = match duration_minutes {
        m if m >= 120 => 7,
        m if m >= 60 => 5,
        m if m >= 30 => 4,
        _ => 3,
    };

    let lowered = title.to_lowercase();
    if ["exam", "final", "thesis", "proof"].iter().any(|k| lowered.contains(k)) {
        score += 2;
    } else if ["essay", "project", "presentation"].iter().any(|k| lowered.contains(k)) {
        score += 1;
    } else if ["review", "flashcards", "reread"].iter().any(|k| lowered.contains(k)) {
        score -= 1;
    }
    let score = score.clamp(1, 10) as u8;

    let difficulty_label = match score {
        1..=3 => "Easy",
        4..=6 => "Moderate",
        7..=8 => "Hard",
        _ => "Very Hard",
    }
    .to_string();

    DifficultyAnalysis {
        difficulty_score: score,
        difficulty_label,
        reasoning: vec![
            format!(
                "Estimated from the planned duration of {duration_minutes} minutes."
            ),
            format!(
                "Subject '{}' was not analyzed in depth; this is a heuristic estimate.",
                subject.unwrap_or("General")
            ),
        ],
        estimated_time_minutes: duration_minutes.max(15),
        confidence: 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_change_set_reports_balanced() {
        let optimization = fallback_optimization(&[]);
        assert!(optimization.overall_summary.contains("balanced"));
        assert!(optimization.insights.is_empty());
    }

    #[test]
    fn summary_counts_changes() {
        use crate::rebalance::MoveReason;
        use chrono::Utc;

        let change = ScheduleChange {
            item_id: "a".to_string(),
            item_title: "a".to_string(),
            subject: None,
            original_date: None,
            new_date: Utc::now(),
            kind: MoveReason::BalanceLoad,
            reason: String::new(),
        };
        let optimization = fallback_optimization(&[change.clone(), change]);
        assert!(optimization.overall_summary.contains("2 tasks"));
    }

    #[test]
    fn exam_titles_score_higher_than_reviews() {
        let exam = estimate_difficulty("Final exam prep", Some("Maths"), 60);
        let review = estimate_difficulty("Review notes", Some("Maths"), 60);
        assert!(exam.difficulty_score > review.difficulty_score);
        assert_eq!(exam.difficulty_label, "Hard");
    }

    #[test]
    fn score_stays_in_range() {
        let a = estimate_difficulty("Thesis final exam proof", None, 300);
        assert!(a.difficulty_score <= 10);
        let b = estimate_difficulty("Flashcards review", None, 5);
        assert!(b.difficulty_score >= 1);
    }
}
