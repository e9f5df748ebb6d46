//! # Studyflow Core Library
//!
//! Core business logic for Studyflow, a study-planning tool. All
//! operations are available through the library and a standalone CLI
//! binary built on top of it.
//!
//! ## Architecture
//!
//! - **Rebalancer**: pure, deterministic day-capacity rebalancing over a
//!   snapshot of pending work items, plus a single-item missed-session
//!   replanner
//! - **Storage**: SQLite-based item storage and TOML-based configuration;
//!   proposed schedule changes become durable only through the
//!   transactional apply step
//! - **Gateway**: an external AI collaborator for rationale phrasing and
//!   difficulty analysis, with deterministic fallbacks
//! - **Revision**: per-topic weakness aggregation and session
//!   recommendations
//!
//! ## Key Components
//!
//! - [`Rebalancer`]: the scheduling core
//! - [`PlanDb`]: item and audit-log persistence
//! - [`Config`]: application configuration management
//! - [`GatewayClient`]: AI gateway client

pub mod error;
pub mod gateway;
pub mod plan;
pub mod rebalance;
pub mod revision;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, GatewayError, RebalanceError};
pub use gateway::{DifficultyAnalysis, GatewayClient, GatewayConfig, Insight, ScheduleOptimization};
pub use plan::{ItemKind, ItemStatus, Priority, WorkItem};
pub use rebalance::{
    MoveReason, RebalanceConfig, Rebalancer, ReasonGenerator, ScheduleChange,
    TemplateReasonGenerator, TieBreak,
};
pub use revision::{RevisionPlan, RevisionPlanner, TaskReview, TopicWeakness};
pub use storage::{Config, PlanDb};
