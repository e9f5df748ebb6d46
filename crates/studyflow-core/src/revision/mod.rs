//! Revision planning.
//!
//! Aggregates a user's work items, missed sessions, and difficulty reviews
//! into per-topic weakness scores and a recommended number of revision
//! sessions. Pure aggregation over caller-supplied slices; no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::plan::{ItemKind, ItemStatus, WorkItem};

/// A stored difficulty rating for a completed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReview {
    pub id: String,
    pub item_id: String,
    pub subject: Option<String>,
    /// 1 (easy) to 5 (very hard).
    pub difficulty_rating: u8,
    pub created_at: DateTime<Utc>,
}

impl TaskReview {
    pub fn new(item_id: impl Into<String>, subject: Option<String>, rating: u8) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            subject,
            difficulty_rating: rating.clamp(1, 5),
            created_at: Utc::now(),
        }
    }
}

/// Per-topic weakness summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicWeakness {
    pub topic: String,
    /// 0 (fine) to 100 (urgent revision).
    pub weakness_score: u32,
    pub missed_sessions: usize,
    pub incomplete_tasks: usize,
    /// Average stored difficulty rating, 0.0 when unrated.
    pub avg_difficulty: f64,
    /// 1-5 suggested revision sessions.
    pub recommended_sessions: u32,
}

/// Topics ordered by descending weakness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionPlan {
    pub topics: Vec<TopicWeakness>,
    pub generated_at: DateTime<Utc>,
}

/// Scoring weights for the weakness composite.
#[derive(Debug, Clone)]
pub struct RevisionWeights {
    pub missed_session: u32,
    pub incomplete_task: u32,
    /// Points per difficulty-rating point above the neutral midpoint (3).
    pub difficulty_point: u32,
}

impl Default for RevisionWeights {
    fn default() -> Self {
        Self {
            missed_session: 15,
            incomplete_task: 10,
            difficulty_point: 20,
        }
    }
}

#[derive(Default)]
struct TopicAccumulator {
    missed_sessions: usize,
    incomplete_tasks: usize,
    rating_sum: u64,
    rating_count: usize,
}

/// Builds revision plans from planning data.
pub struct RevisionPlanner {
    weights: RevisionWeights,
}

impl RevisionPlanner {
    pub fn new() -> Self {
        Self {
            weights: RevisionWeights::default(),
        }
    }

    pub fn with_weights(weights: RevisionWeights) -> Self {
        Self { weights }
    }

    /// Aggregate items and reviews into a plan. Topics with nothing to
    /// revise (score 0) are dropped.
    pub fn build_plan(&self, items: &[WorkItem], reviews: &[TaskReview]) -> RevisionPlan {
        let mut topics: BTreeMap<String, TopicAccumulator> = BTreeMap::new();

        for item in items {
            let acc = topics.entry(item.subject_or_general().to_string()).or_default();
            match (item.kind, item.status) {
                (ItemKind::Session, ItemStatus::Missed) => acc.missed_sessions += 1,
                (ItemKind::Task, ItemStatus::Pending) => acc.incomplete_tasks += 1,
                _ => {}
            }
        }

        for review in reviews {
            let topic = review.subject.as_deref().unwrap_or("General").to_string();
            let acc = topics.entry(topic).or_default();
            acc.rating_sum += u64::from(review.difficulty_rating);
            acc.rating_count += 1;
        }

        let mut scored: Vec<TopicWeakness> = topics
            .into_iter()
            .filter_map(|(topic, acc)| {
                let avg_difficulty = if acc.rating_count > 0 {
                    acc.rating_sum as f64 / acc.rating_count as f64
                } else {
                    0.0
                };

                let mut score = acc.missed_sessions as u32 * self.weights.missed_session
                    + acc.incomplete_tasks as u32 * self.weights.incomplete_task;
                if avg_difficulty > 3.0 {
                    score += ((avg_difficulty - 3.0) * f64::from(self.weights.difficulty_point))
                        .round() as u32;
                }
                let weakness_score = score.min(100);
                if weakness_score == 0 {
                    return None;
                }

                Some(TopicWeakness {
                    topic,
                    weakness_score,
                    missed_sessions: acc.missed_sessions,
                    incomplete_tasks: acc.incomplete_tasks,
                    avg_difficulty,
                    recommended_sessions: (1 + weakness_score / 25).min(5),
                })
            })
            .collect();

        // Descending weakness, topic name as a stable tie-break
        scored.sort_by(|a, b| {
            b.weakness_score
                .cmp(&a.weakness_score)
                .then_with(|| a.topic.cmp(&b.topic))
        });

        RevisionPlan {
            topics: scored,
            generated_at: Utc::now(),
        }
    }
}

impl Default for RevisionPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(subject: &str, kind: ItemKind, status: ItemStatus) -> WorkItem {
        let mut item = WorkItem::new("x", kind).with_subject(subject);
        item.status = status;
        item
    }

    #[test]
    fn missed_sessions_outweigh_incomplete_tasks() {
        let items = vec![
            item("Physics", ItemKind::Session, ItemStatus::Missed),
            item("Physics", ItemKind::Session, ItemStatus::Missed),
            item("History", ItemKind::Task, ItemStatus::Pending),
        ];

        let plan = RevisionPlanner::new().build_plan(&items, &[]);
        assert_eq!(plan.topics[0].topic, "Physics");
        assert_eq!(plan.topics[0].weakness_score, 30);
        assert_eq!(plan.topics[0].missed_sessions, 2);
        assert_eq!(plan.topics[1].topic, "History");
        assert_eq!(plan.topics[1].weakness_score, 10);
    }

    #[test]
    fn hard_reviews_raise_the_score() {
        let items = vec![item("Maths", ItemKind::Task, ItemStatus::Pending)];
        let reviews = vec![
            TaskReview::new("a", Some("Maths".to_string()), 5),
            TaskReview::new("b", Some("Maths".to_string()), 5),
        ];

        let plan = RevisionPlanner::new().build_plan(&items, &reviews);
        let maths = &plan.topics[0];
        assert_eq!(maths.avg_difficulty, 5.0);
        // 1 incomplete task (10) + 2 points above midpoint (40)
        assert_eq!(maths.weakness_score, 50);
        assert_eq!(maths.recommended_sessions, 3);
    }

    #[test]
    fn quiet_topics_are_dropped() {
        let items = vec![item("Art", ItemKind::Task, ItemStatus::Completed)];
        let plan = RevisionPlanner::new().build_plan(&items, &[]);
        assert!(plan.topics.is_empty());
    }

    #[test]
    fn score_is_capped_and_sessions_bounded() {
        let items: Vec<WorkItem> = (0..20)
            .map(|_| item("Chemistry", ItemKind::Session, ItemStatus::Missed))
            .collect();
        let plan = RevisionPlanner::new().build_plan(&items, &[]);
        assert_eq!(plan.topics[0].weakness_score, 100);
        assert_eq!(plan.topics[0].recommended_sessions, 5);
    }
}
