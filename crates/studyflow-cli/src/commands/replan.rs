//! Missed-session replanning.

use chrono::Utc;
use studyflow_core::plan::ItemStatus;
use studyflow_core::storage::{Config, PlanDb};
use studyflow_core::Rebalancer;

pub fn run(item_id: &str, apply: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut db = PlanDb::open()?;

    let missed = db.get_item(item_id)?;
    if missed.status != ItemStatus::Missed {
        return Err(format!(
            "item {item_id} is {}, only missed items can be replanned",
            missed.status.as_str()
        )
        .into());
    }

    let upcoming = db.list_items(Some(ItemStatus::Pending))?;
    let rebalancer = Rebalancer::with_config(config.rebalance_config());
    let change = rebalancer.replan_missed(&missed, &upcoming, Utc::now())?;

    println!(
        "{}: rescheduled to {}. {}",
        missed.title,
        change.new_date.format("%Y-%m-%d %H:%M"),
        change.reason,
    );

    if apply {
        db.apply_changes(std::slice::from_ref(&change))?;
        println!("change applied");
    } else {
        println!("run with --apply to persist");
    }
    Ok(())
}
