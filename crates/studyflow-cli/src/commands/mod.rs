pub mod config;
pub mod difficulty;
pub mod rebalance;
pub mod replan;
pub mod revision;
pub mod task;
