//! Rebalancing commands: plan proposals, apply them.

use chrono::Utc;
use clap::Subcommand;
use studyflow_core::gateway::{fallback, GatewayClient, ScheduleOptimization};
use studyflow_core::plan::ItemStatus;
use studyflow_core::rebalance::ScheduleChange;
use studyflow_core::storage::{Config, PlanDb};
use studyflow_core::Rebalancer;

#[derive(Subcommand)]
pub enum RebalanceAction {
    /// Compute and print proposed schedule changes without persisting
    Plan {
        /// Ask the AI gateway to phrase reasons and add insights
        #[arg(long)]
        ai: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute the plan and persist the changes
    Apply,
}

pub fn run(action: RebalanceAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let rebalancer = Rebalancer::with_config(config.rebalance_config());

    match action {
        RebalanceAction::Plan { ai, json } => {
            let db = PlanDb::open()?;
            let items = db.list_items(Some(ItemStatus::Pending))?;
            let mut changes: Vec<ScheduleChange> = rebalancer.rebalance(&items, Utc::now())?;

            let optimization: ScheduleOptimization = if ai && config.gateway.enabled {
                let client = GatewayClient::new(config.gateway_config());
                let runtime = tokio::runtime::Runtime::new()?;
                match runtime.block_on(client.optimize_schedule(&items, &changes, Utc::now())) {
                    Ok(optimization) => {
                        optimization.apply_reasons(&mut changes);
                        optimization
                    }
                    Err(e) => {
                        eprintln!("gateway unavailable ({e}); using template reasons");
                        fallback::fallback_optimization(&changes)
                    }
                }
            } else {
                fallback::fallback_optimization(&changes)
            };

            if json {
                let output = serde_json::json!({
                    "changes": changes,
                    "insights": optimization.insights,
                    "summary": optimization.overall_summary,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                if changes.is_empty() {
                    println!("{}", optimization.overall_summary);
                    return Ok(());
                }
                for change in &changes {
                    let from = change
                        .original_date
                        .map(|dt| dt.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "unscheduled".to_string());
                    println!(
                        "{}: {} -> {}  {}",
                        change.item_title,
                        from,
                        change.new_date.format("%Y-%m-%d %H:%M"),
                        change.reason,
                    );
                }
                for insight in &optimization.insights {
                    println!("[{:?}] {}: {}", insight.kind, insight.title, insight.description);
                }
                println!("{}", optimization.overall_summary);
                println!("run `studyflow-cli rebalance apply` to persist these changes");
            }
        }
        RebalanceAction::Apply => {
            let mut db = PlanDb::open()?;
            let items = db.list_items(Some(ItemStatus::Pending))?;
            let changes = rebalancer.rebalance(&items, Utc::now())?;
            let applied = db.apply_changes(&changes)?;
            println!("Applied {applied} schedule changes.");
        }
    }
    Ok(())
}
