//! The scheduling engine.
//!
//! Pipeline: the EDO planner decides who rests when, the staffing deriver
//! turns team capacity into slot demand, the pair model plus seeded
//! search produce candidate rosters, the rebalancer polishes residual
//! imbalance, and the validator/scorer judge the result. The multi-restart
//! driver runs the whole chain once per seed and keeps the best schedule;
//! the weekend planner runs the same shapes independently over Sat/Sun.
//!
//! # Submodules
//!
//! - [`edo`]: who receives an earned day off in which week
//! - [`staffing`]: per-week per-day slot demand
//! - [`model`] / [`search`]: the weekday constraint model and its solver
//! - [`rebalance`]: post-solve swap repair
//! - [`validate`] / [`score`]: hard-rule re-verification and scalar cost
//! - [`stats`]: per-person counters for exports
//! - [`driver`]: multi-restart orchestration
//! - [`weekend`]: the independent Sat/Sun planner

pub mod driver;
pub mod edo;
pub mod hours;
pub mod model;
pub mod rebalance;
pub mod score;
pub mod search;
pub mod staffing;
pub mod stats;
pub mod validate;
pub mod weekend;

pub use driver::{solve, solve_cancellable, SolveResult, SolveStatus};
pub use edo::build_edo_plan;
pub use score::{score, score_breakdown, ScoreBreakdown};
pub use staffing::derive_staffing;
pub use stats::{person_stats, PersonStats};
pub use validate::{validate, Diagnostics};
pub use weekend::{
    solve_weekends, WeekendLoad, WeekendResult, WeekendSchedule, WeekendStatus,
};
