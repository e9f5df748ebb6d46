//! Revision planning commands.

use clap::Subcommand;
use studyflow_core::storage::PlanDb;
use studyflow_core::RevisionPlanner;

#[derive(Subcommand)]
pub enum RevisionAction {
    /// Build and print a revision plan from stored items and reviews
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RevisionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RevisionAction::Plan { json } => {
            let db = PlanDb::open()?;
            let items = db.list_items(None)?;
            let reviews = db.list_reviews()?;
            let plan = RevisionPlanner::new().build_plan(&items, &reviews);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else if plan.topics.is_empty() {
                println!("nothing to revise");
            } else {
                for topic in &plan.topics {
                    println!(
                        "{}: weakness {} ({} missed, {} open) -> {} session(s)",
                        topic.topic,
                        topic.weakness_score,
                        topic.missed_sessions,
                        topic.incomplete_tasks,
                        topic.recommended_sessions,
                    );
                }
            }
        }
    }
    Ok(())
}
