//! Work item management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use studyflow_core::plan::{ItemKind, ItemStatus, Priority, WorkItem};
use studyflow_core::storage::PlanDb;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new work item
    Add {
        /// Item title
        title: String,
        /// Subject for grouping (e.g. "History")
        #[arg(long)]
        subject: Option<String>,
        /// Due date or session start, RFC 3339 (e.g. 2026-03-02T09:00:00Z)
        #[arg(long)]
        due: Option<String>,
        /// Estimated duration in minutes
        #[arg(long, default_value = "45")]
        duration: i64,
        /// Priority: low, medium, or high
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Kind: task or session
        #[arg(long, default_value = "task")]
        kind: String,
    },
    /// List work items
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Filter by status: pending, completed, or missed
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark an item completed
    Complete {
        /// Item id
        id: String,
    },
    /// Mark a session missed
    Miss {
        /// Item id
        id: String,
    },
    /// Delete an item
    Remove {
        /// Item id
        id: String,
    },
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        _ => Err(format!("unknown priority '{s}' (expected low, medium, or high)")),
    }
}

fn parse_kind(s: &str) -> Result<ItemKind, String> {
    match s {
        "task" => Ok(ItemKind::Task),
        "session" => Ok(ItemKind::Session),
        _ => Err(format!("unknown kind '{s}' (expected task or session)")),
    }
}

fn parse_status(s: &str) -> Result<ItemStatus, String> {
    match s {
        "pending" => Ok(ItemStatus::Pending),
        "completed" => Ok(ItemStatus::Completed),
        "missed" => Ok(ItemStatus::Missed),
        _ => Err(format!(
            "unknown status '{s}' (expected pending, completed, or missed)"
        )),
    }
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TaskAction::Add {
            title,
            subject,
            due,
            duration,
            priority,
            kind,
        } => {
            let mut item = WorkItem::new(title, parse_kind(&kind)?)
                .with_duration(duration)
                .with_priority(parse_priority(&priority)?);
            if let Some(subject) = subject {
                item = item.with_subject(subject);
            }
            if let Some(due) = due {
                let parsed = DateTime::parse_from_rfc3339(&due)
                    .map_err(|e| format!("invalid --due value '{due}': {e}"))?;
                item = item.with_due(parsed.with_timezone(&Utc));
            }

            let db = PlanDb::open()?;
            db.insert_item(&item)?;
            println!("Item created: {}", item.id);
        }
        TaskAction::List { json, status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let db = PlanDb::open()?;
            let items = db.list_items(status)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("no items");
            } else {
                for item in items {
                    let due = item
                        .due_or_start
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "unscheduled".to_string());
                    println!(
                        "{}  [{}] {} ({}, {}, {}m)",
                        item.id,
                        item.status.as_str(),
                        item.title,
                        due,
                        item.priority,
                        item.duration_minutes,
                    );
                }
            }
        }
        TaskAction::Complete { id } => {
            let db = PlanDb::open()?;
            db.set_status(&id, ItemStatus::Completed)?;
            println!("completed {id}");
        }
        TaskAction::Miss { id } => {
            let db = PlanDb::open()?;
            db.set_status(&id, ItemStatus::Missed)?;
            println!("marked {id} as missed");
        }
        TaskAction::Remove { id } => {
            let db = PlanDb::open()?;
            db.delete_item(&id)?;
            println!("removed {id}");
        }
    }
    Ok(())
}
