//! Database schema migrations for studyflow.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version, 0 for a fresh database.
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// v1: work items, applied-change audit log, and task reviews.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS work_items (
            id               TEXT PRIMARY KEY,
            title            TEXT NOT NULL,
            subject          TEXT,
            kind             TEXT NOT NULL DEFAULT 'task',
            due_or_start     TEXT,
            duration_minutes INTEGER NOT NULL DEFAULT 45,
            priority         TEXT NOT NULL DEFAULT 'medium',
            status           TEXT NOT NULL DEFAULT 'pending',
            notes            TEXT,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schedule_changes (
            id            TEXT PRIMARY KEY,
            item_id       TEXT NOT NULL,
            original_date TEXT,
            new_date      TEXT NOT NULL,
            reason        TEXT NOT NULL,
            applied_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task_reviews (
            id                TEXT PRIMARY KEY,
            item_id           TEXT NOT NULL,
            subject           TEXT,
            difficulty_rating INTEGER NOT NULL,
            created_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_work_items_status ON work_items(status);
        CREATE INDEX IF NOT EXISTS idx_schedule_changes_item ON schedule_changes(item_id);",
    )?;
    set_schema_version(conn, 1)
}
