//! SQLite-based storage for work items, applied schedule changes, and
//! task reviews.
//!
//! Applying schedule changes is the single write path for proposed date
//! moves: one transaction per apply call, updating `due_or_start` in place
//! and appending to the audit log. Callers needing stronger guarantees
//! against concurrent appliers should serialize calls per user.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use super::data_dir;
use super::migrations;
use crate::error::DatabaseError;
use crate::plan::{ItemKind, ItemStatus, Priority, WorkItem};
use crate::rebalance::ScheduleChange;
use crate::revision::TaskReview;

// === Helper Functions ===

/// Parse item kind from database string
fn parse_item_kind(kind_str: &str) -> ItemKind {
    match kind_str {
        "session" => ItemKind::Session,
        _ => ItemKind::Task,
    }
}

/// Parse priority from database string
fn parse_priority(priority_str: &str) -> Priority {
    match priority_str {
        "low" => Priority::Low,
        "high" => Priority::High,
        _ => Priority::Medium,
    }
}

/// Parse item status from database string
fn parse_status(status_str: &str) -> ItemStatus {
    match status_str {
        "completed" => ItemStatus::Completed,
        "missed" => ItemStatus::Missed,
        _ => ItemStatus::Pending,
    }
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse optional datetime; malformed values read back as None.
fn parse_datetime_opt(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Build a WorkItem from a database row
fn row_to_work_item(row: &rusqlite::Row) -> Result<WorkItem, rusqlite::Error> {
    let kind_str: String = row.get(3)?;
    let due_str: Option<String> = row.get(4)?;
    let priority_str: String = row.get(6)?;
    let status_str: String = row.get(7)?;
    let created_str: String = row.get(9)?;

    Ok(WorkItem {
        id: row.get(0)?,
        title: row.get(1)?,
        subject: row.get(2)?,
        kind: parse_item_kind(&kind_str),
        due_or_start: parse_datetime_opt(due_str),
        duration_minutes: row.get(5)?,
        priority: parse_priority(&priority_str),
        status: parse_status(&status_str),
        notes: row.get(8)?,
        created_at: parse_datetime_fallback(&created_str),
    })
}

const ITEM_COLUMNS: &str =
    "id, title, subject, kind, due_or_start, duration_minutes, priority, status, notes, created_at";

/// Plan database handle.
pub struct PlanDb {
    conn: Connection,
}

impl PlanDb {
    /// Open the plan database at `~/.config/studyflow/studyflow.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Self::open_at(&dir.join("studyflow.db"))
    }

    /// Open (and migrate) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Work items ===

    /// Insert a new work item.
    pub fn insert_item(&self, item: &WorkItem) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO work_items (id, title, subject, kind, due_or_start, duration_minutes,
                                     priority, status, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                item.id,
                item.title,
                item.subject,
                item.kind.as_str(),
                item.due_or_start.map(|dt| dt.to_rfc3339()),
                item.duration_minutes,
                item.priority.as_str(),
                item.status.as_str(),
                item.notes,
                item.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a single item by id.
    pub fn get_item(&self, id: &str) -> Result<WorkItem, DatabaseError> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM work_items WHERE id = ?1"),
                [id],
                row_to_work_item,
            )
            .optional()?
            .ok_or_else(|| DatabaseError::NotFound(format!("work item {id}")))
    }

    /// List all items, optionally filtered by status, ordered by date then
    /// insertion order (undated items last).
    pub fn list_items(&self, status: Option<ItemStatus>) -> Result<Vec<WorkItem>, DatabaseError> {
        let order = "ORDER BY due_or_start IS NULL, due_or_start, created_at, rowid";
        let mut items = Vec::new();
        match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM work_items WHERE status = ?1 {order}"
                ))?;
                let rows = stmt.query_map([status.as_str()], row_to_work_item)?;
                for row in rows {
                    items.push(row?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {ITEM_COLUMNS} FROM work_items {order}"))?;
                let rows = stmt.query_map([], row_to_work_item)?;
                for row in rows {
                    items.push(row?);
                }
            }
        }
        Ok(items)
    }

    /// Update an item's status.
    pub fn set_status(&self, id: &str, status: ItemStatus) -> Result<(), DatabaseError> {
        let updated = self.conn.execute(
            "UPDATE work_items SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if updated == 0 {
            return Err(DatabaseError::NotFound(format!("work item {id}")));
        }
        Ok(())
    }

    /// Delete an item.
    pub fn delete_item(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .conn
            .execute("DELETE FROM work_items WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(DatabaseError::NotFound(format!("work item {id}")));
        }
        Ok(())
    }

    // === Schedule changes ===

    /// Apply proposed schedule changes in a single transaction.
    ///
    /// Each change updates the item's `due_or_start` in place, flips a
    /// `missed` item back to `pending`, and appends an audit row. Returns
    /// the number of items updated.
    pub fn apply_changes(&mut self, changes: &[ScheduleChange]) -> Result<usize, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut applied = 0;

        for change in changes {
            let updated = tx.execute(
                "UPDATE work_items
                 SET due_or_start = ?1,
                     status = CASE WHEN status = 'missed' THEN 'pending' ELSE status END
                 WHERE id = ?2",
                params![change.new_date.to_rfc3339(), change.item_id],
            )?;
            if updated == 0 {
                continue; // item deleted since the plan was computed
            }
            applied += updated;

            tx.execute(
                "INSERT INTO schedule_changes (id, item_id, original_date, new_date, reason, applied_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Uuid::new_v4().to_string(),
                    change.item_id,
                    change.original_date.map(|dt| dt.to_rfc3339()),
                    change.new_date.to_rfc3339(),
                    change.reason,
                    now,
                ],
            )?;
        }

        tx.commit()?;
        Ok(applied)
    }

    /// Audit log entries for an item, newest first.
    pub fn change_history(&self, item_id: &str) -> Result<Vec<(DateTime<Utc>, String)>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT applied_at, reason FROM schedule_changes
             WHERE item_id = ?1 ORDER BY applied_at DESC",
        )?;
        let rows = stmt.query_map([item_id], |row| {
            let applied_str: String = row.get(0)?;
            let reason: String = row.get(1)?;
            Ok((parse_datetime_fallback(&applied_str), reason))
        })?;
        let mut history = Vec::new();
        for row in rows {
            history.push(row?);
        }
        Ok(history)
    }

    // === Task reviews ===

    /// Store a difficulty review.
    pub fn insert_review(&self, review: &TaskReview) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO task_reviews (id, item_id, subject, difficulty_rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                review.id,
                review.item_id,
                review.subject,
                review.difficulty_rating,
                review.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List all stored reviews.
    pub fn list_reviews(&self) -> Result<Vec<TaskReview>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, subject, difficulty_rating, created_at FROM task_reviews",
        )?;
        let rows = stmt.query_map([], |row| {
            let created_str: String = row.get(4)?;
            Ok(TaskReview {
                id: row.get(0)?,
                item_id: row.get(1)?,
                subject: row.get(2)?,
                difficulty_rating: row.get(3)?,
                created_at: parse_datetime_fallback(&created_str),
            })
        })?;
        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row?);
        }
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebalance::{RebalanceConfig, Rebalancer};
    use chrono::TimeZone;

    fn dated_item(title: &str, due: DateTime<Utc>) -> WorkItem {
        WorkItem::new(title, ItemKind::Task).with_due(due)
    }

    #[test]
    fn item_round_trip() {
        let db = PlanDb::open_memory().unwrap();
        let due = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let item = dated_item("Read chapter 4", due)
            .with_subject("History")
            .with_priority(Priority::High);

        db.insert_item(&item).unwrap();
        let loaded = db.get_item(&item.id).unwrap();
        assert_eq!(loaded.title, "Read chapter 4");
        assert_eq!(loaded.due_or_start, Some(due));
        assert_eq!(loaded.priority, Priority::High);
        assert_eq!(loaded.status, ItemStatus::Pending);
    }

    #[test]
    fn list_filters_by_status() {
        let db = PlanDb::open_memory().unwrap();
        let due = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let a = dated_item("a", due);
        let b = dated_item("b", due);
        db.insert_item(&a).unwrap();
        db.insert_item(&b).unwrap();
        db.set_status(&b.id, ItemStatus::Completed).unwrap();

        let pending = db.list_items(Some(ItemStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, a.id);
        assert_eq!(db.list_items(None).unwrap().len(), 2);
    }

    #[test]
    fn missing_item_is_not_found() {
        let db = PlanDb::open_memory().unwrap();
        assert!(matches!(
            db.get_item("nope"),
            Err(DatabaseError::NotFound(_))
        ));
        assert!(db.set_status("nope", ItemStatus::Missed).is_err());
    }

    #[test]
    fn apply_changes_moves_dates_and_logs() {
        let mut db = PlanDb::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        for i in 0..5 {
            db.insert_item(&dated_item(&format!("t{i}"), due)).unwrap();
        }
        let items = db.list_items(Some(ItemStatus::Pending)).unwrap();

        let changes = Rebalancer::with_config(RebalanceConfig::default())
            .rebalance(&items, now)
            .unwrap();
        assert_eq!(changes.len(), 2);

        let applied = db.apply_changes(&changes).unwrap();
        assert_eq!(applied, 2);

        let moved = db.get_item(&changes[0].item_id).unwrap();
        assert_eq!(moved.due_or_start, Some(changes[0].new_date));

        let history = db.change_history(&changes[0].item_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].1, changes[0].reason);

        // Applying the same plan again is stable: dates already moved
        let again = db.apply_changes(&changes).unwrap();
        assert_eq!(again, 2);
    }

    #[test]
    fn apply_replan_revives_missed_item() {
        let mut db = PlanDb::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let missed = dated_item("missed session", now - chrono::Duration::days(1));
        db.insert_item(&missed).unwrap();
        db.set_status(&missed.id, ItemStatus::Missed).unwrap();

        let missed = db.get_item(&missed.id).unwrap();
        let change = Rebalancer::new()
            .replan_missed(&missed, &[], now)
            .unwrap();
        db.apply_changes(std::slice::from_ref(&change)).unwrap();

        let revived = db.get_item(&missed.id).unwrap();
        assert_eq!(revived.status, ItemStatus::Pending);
        assert_eq!(revived.due_or_start, Some(change.new_date));
    }

    #[test]
    fn apply_skips_deleted_items() {
        let mut db = PlanDb::open_memory().unwrap();
        let change = ScheduleChange {
            item_id: "gone".to_string(),
            item_title: "gone".to_string(),
            subject: None,
            original_date: None,
            new_date: Utc::now(),
            kind: crate::rebalance::MoveReason::BalanceLoad,
            reason: "x".to_string(),
        };
        assert_eq!(db.apply_changes(&[change]).unwrap(), 0);
    }

    #[test]
    fn reviews_round_trip() {
        let db = PlanDb::open_memory().unwrap();
        let review = TaskReview::new("item-1", Some("Maths".to_string()), 5);
        db.insert_review(&review).unwrap();

        let reviews = db.list_reviews().unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].difficulty_rating, 5);
        assert_eq!(reviews[0].subject.as_deref(), Some("Maths"));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.db");

        let item = WorkItem::new("persisted", ItemKind::Session);
        {
            let db = PlanDb::open_at(&path).unwrap();
            db.insert_item(&item).unwrap();
        }
        let db = PlanDb::open_at(&path).unwrap();
        assert_eq!(db.get_item(&item.id).unwrap().title, "persisted");
    }
}
