//! Work-item domain model.
//!
//! A [`WorkItem`] is anything the planner schedules: a task with a due date
//! or a study session with a start time. The rebalancer treats both
//! uniformly through `due_or_start`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A task with an optional due date.
    Task,
    /// A study session with an optional start time.
    Session,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Session => "session",
        }
    }
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Task
    }
}

/// Priority of a work item. Orders `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a work item.
///
/// Only `Pending` items are considered by the bulk rebalancer; `Missed`
/// sessions are the input to the single-item replanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Completed,
    Missed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Missed => "missed",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Pending
    }
}

/// A schedulable unit of work.
///
/// Identity is `id`. Everything except `due_or_start`, `status`, and `notes`
/// is immutable after creation; the rebalancer only ever proposes changes to
/// `due_or_start`, and only the apply step writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub subject: Option<String>,
    #[serde(default)]
    pub kind: ItemKind,
    /// Due date (tasks) or start time (sessions). `None` means undated.
    pub due_or_start: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkItem {
    /// Create a new pending item with a fresh UUID.
    pub fn new(title: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            subject: None,
            kind,
            due_or_start: None,
            duration_minutes: 45,
            priority: Priority::default(),
            status: ItemStatus::default(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_or_start = Some(due);
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// UTC calendar day of `due_or_start`, if any.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_or_start.map(|dt| dt.date_naive())
    }

    /// Subject for grouping, defaulting to "General" like the planner's
    /// topic aggregation expects.
    pub fn subject_or_general(&self) -> &str {
        self.subject.as_deref().unwrap_or("General")
    }

    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn item_serialization_round_trip() {
        let item = WorkItem::new("Read chapter 4", ItemKind::Task)
            .with_subject("History")
            .with_due(Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap())
            .with_priority(Priority::High);

        let json = serde_json::to_string(&item).unwrap();
        let decoded: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, item.id);
        assert_eq!(decoded.priority, Priority::High);
        assert_eq!(decoded.due_day(), item.due_day());
    }

    #[test]
    fn undated_item_has_no_due_day() {
        let item = WorkItem::new("Flashcards", ItemKind::Session);
        assert!(item.due_day().is_none());
        assert!(item.is_pending());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
