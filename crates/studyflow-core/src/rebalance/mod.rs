//! Day-capacity rebalancer.
//!
//! Given a snapshot of pending work items, finds overloaded days and
//! proposes moving the excess to the nearest future day with spare
//! capacity. The module provides:
//! - Bulk rebalancing over the whole item set
//! - A single-item variant for replanning missed sessions
//! - An injectable [`ReasonGenerator`] for the justification text
//!
//! Everything here is a pure function of its input: no I/O, no shared
//! state, and re-running on the same snapshot yields the same proposals.
//! Persisting the result is the caller's job (see
//! [`PlanDb::apply_changes`](crate::storage::PlanDb::apply_changes)).

mod change;
mod reason;

pub use change::{MoveReason, PlannedMove, ScheduleChange};
pub use reason::{ReasonGenerator, TemplateReasonGenerator};

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RebalanceError;
use crate::plan::WorkItem;

/// Which items stay when a day is over capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the first `capacity` items in input order, move the rest.
    KeepFirst,
    /// Keep the highest-priority items, move the rest. Stable within
    /// equal priority.
    KeepHighestPriority,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::KeepFirst
    }
}

/// Rebalancer configuration.
#[derive(Debug, Clone)]
pub struct RebalanceConfig {
    /// Maximum items considered acceptable on a single day.
    pub capacity_per_day: usize,
    /// Capacity used by the single-item missed-session replanner.
    pub replan_capacity: usize,
    /// How many days forward to search before forcing overflow.
    pub horizon_days: i64,
    /// Hour of day (UTC) assigned to rescheduled items.
    pub reschedule_hour: u32,
    /// Loads below this count as "light" in reason classification.
    pub light_load_threshold: usize,
    /// Policy for choosing which items leave an overloaded day.
    pub tie_break: TieBreak,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            capacity_per_day: 3,
            replan_capacity: 4,
            horizon_days: 14,
            reschedule_hour: 10,
            light_load_threshold: 2,
            tie_break: TieBreak::default(),
        }
    }
}

impl RebalanceConfig {
    /// Reject unusable settings.
    pub fn validate(&self) -> Result<(), RebalanceError> {
        if self.capacity_per_day == 0 {
            return Err(RebalanceError::InvalidConfiguration {
                message: "capacity_per_day must be at least 1".to_string(),
            });
        }
        if self.replan_capacity == 0 {
            return Err(RebalanceError::InvalidConfiguration {
                message: "replan_capacity must be at least 1".to_string(),
            });
        }
        if self.horizon_days <= 0 {
            return Err(RebalanceError::InvalidConfiguration {
                message: "horizon_days must be positive".to_string(),
            });
        }
        if self.reschedule_hour > 23 {
            return Err(RebalanceError::InvalidConfiguration {
                message: format!("reschedule_hour {} out of range 0-23", self.reschedule_hour),
            });
        }
        Ok(())
    }

    fn reschedule_time(&self) -> Result<NaiveTime, RebalanceError> {
        NaiveTime::from_hms_opt(self.reschedule_hour, 0, 0).ok_or_else(|| {
            RebalanceError::InvalidConfiguration {
                message: format!("reschedule_hour {} out of range 0-23", self.reschedule_hour),
            }
        })
    }
}

/// Count of items scheduled on each UTC calendar day.
///
/// Derived from the item snapshot at the start of a run and incremented as
/// moves are committed within the run. Never persisted. Day granularity is
/// UTC throughout.
#[derive(Debug, Clone, Default)]
pub struct DayBuckets {
    counts: BTreeMap<NaiveDate, usize>,
}

impl DayBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, day: NaiveDate) -> usize {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    pub fn add(&mut self, day: NaiveDate) {
        *self.counts.entry(day).or_insert(0) += 1;
    }

    fn set(&mut self, day: NaiveDate, count: usize) {
        self.counts.insert(day, count);
    }
}

/// Day-capacity rebalancer.
pub struct Rebalancer {
    config: RebalanceConfig,
    reasons: Box<dyn ReasonGenerator>,
}

impl Rebalancer {
    /// Create a rebalancer with default config and template reasons.
    pub fn new() -> Self {
        Self::with_config(RebalanceConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(config: RebalanceConfig) -> Self {
        Self {
            config,
            reasons: Box::new(TemplateReasonGenerator),
        }
    }

    /// Replace the reason generator.
    pub fn with_reason_generator(mut self, reasons: Box<dyn ReasonGenerator>) -> Self {
        self.reasons = reasons;
        self
    }

    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    /// Propose moves for every item on an overloaded day.
    ///
    /// Items are partitioned into day buckets by the date portion of
    /// `due_or_start`; undated items form a bucket of their own and are
    /// treated like any other. For each bucket over capacity, the excess
    /// (per the tie-break policy) is assigned the first day in
    /// `now+1 ..= now+horizon` whose running count is below capacity. If
    /// no day in the horizon has room, the item is forced onto tomorrow
    /// anyway -- no item is ever dropped.
    ///
    /// Nothing is persisted; the returned changes are proposals.
    pub fn rebalance(
        &self,
        items: &[WorkItem],
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduleChange>, RebalanceError> {
        self.config.validate()?;
        let time = self.config.reschedule_time()?;

        let pending: Vec<&WorkItem> = items.iter().filter(|i| i.is_pending()).collect();

        let mut dated: BTreeMap<NaiveDate, Vec<&WorkItem>> = BTreeMap::new();
        let mut undated: Vec<&WorkItem> = Vec::new();
        for item in &pending {
            match item.due_day() {
                Some(day) => dated.entry(day).or_default().push(item),
                None => undated.push(item),
            }
        }

        // Source-day counts are not decremented when items move away;
        // the running count only grows as destinations are assigned.
        let mut buckets = DayBuckets::new();
        for (day, day_items) in &dated {
            buckets.set(*day, day_items.len());
        }

        let mut excess: Vec<&WorkItem> = Vec::new();
        for day_items in dated.values() {
            if day_items.len() > self.config.capacity_per_day {
                excess.extend(self.split_excess(day_items));
            }
        }
        if undated.len() > self.config.capacity_per_day {
            excess.extend(self.split_excess(&undated));
        }

        let mut changes = Vec::with_capacity(excess.len());
        for item in excess {
            let mv = self.place(item, &mut buckets, now, self.config.capacity_per_day, time);
            let reason = self.reasons.describe(&mv);
            changes.push(ScheduleChange::from_move(mv, reason));
        }
        Ok(changes)
    }

    /// Single-item variant for replanning a missed session.
    ///
    /// Same forward scan as [`rebalance`](Self::rebalance) with
    /// `replan_capacity` instead of the bulk capacity. `upcoming` supplies
    /// the existing daily load; the missed item itself is excluded from it.
    pub fn replan_missed(
        &self,
        missed: &WorkItem,
        upcoming: &[WorkItem],
        now: DateTime<Utc>,
    ) -> Result<ScheduleChange, RebalanceError> {
        self.config.validate()?;
        let time = self.config.reschedule_time()?;

        let mut buckets = DayBuckets::new();
        for item in upcoming.iter().filter(|i| i.is_pending() && i.id != missed.id) {
            if let Some(day) = item.due_day() {
                buckets.add(day);
            }
        }

        let mv = self.place(missed, &mut buckets, now, self.config.replan_capacity, time);
        let reason = self.reasons.describe(&mv);
        Ok(ScheduleChange::from_move(mv, reason))
    }

    /// Select the items that leave an overloaded bucket.
    fn split_excess<'a>(&self, day_items: &[&'a WorkItem]) -> Vec<&'a WorkItem> {
        let cap = self.config.capacity_per_day;
        match self.config.tie_break {
            TieBreak::KeepFirst => day_items[cap..].to_vec(),
            TieBreak::KeepHighestPriority => {
                let mut ordered = day_items.to_vec();
                ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
                ordered[cap..].to_vec()
            }
        }
    }

    /// Scan forward from `now` (exclusive) for the first day with spare
    /// capacity, falling back to tomorrow when the horizon is exhausted.
    fn place(
        &self,
        item: &WorkItem,
        buckets: &mut DayBuckets,
        now: DateTime<Utc>,
        capacity: usize,
        time: NaiveTime,
    ) -> PlannedMove {
        for offset in 1..=self.config.horizon_days {
            let day = (now + Duration::days(offset)).date_naive();
            let load = buckets.count(day);
            if load < capacity {
                buckets.add(day);
                return PlannedMove {
                    item_id: item.id.clone(),
                    item_title: item.title.clone(),
                    subject: item.subject.clone(),
                    original_date: item.due_or_start,
                    new_date: day.and_time(time).and_utc(),
                    destination_load: load,
                    reason: MoveReason::classify(load, self.config.light_load_threshold),
                };
            }
        }

        // Deliberate invariant break: always produce a proposal.
        let day = (now + Duration::days(1)).date_naive();
        let load = buckets.count(day);
        buckets.add(day);
        PlannedMove {
            item_id: item.id.clone(),
            item_title: item.title.clone(),
            subject: item.subject.clone(),
            original_date: item.due_or_start,
            new_date: day.and_time(time).and_utc(),
            destination_load: load,
            reason: MoveReason::Overflow,
        }
    }
}

impl Default for Rebalancer {
    fn default() -> Self {
        Self::new()
    }
}
