//! Rotation domain models.
//!
//! Core data types for the weekday rotation and the weekend planner:
//! people, shifts, calendar positions, computed plans, configuration,
//! and the schedule itself. All types are constructed at ingestion or
//! by a solve and never mutated afterwards.

mod config;
mod person;
mod plan;
mod schedule;
mod shift;

pub use config::{
    FairnessCohorts, FairnessScope, InterTeamNightShare, NightFairnessMode, SolveConfig,
    WeekendConfig,
};
pub use person::Person;
pub use plan::{DaySlots, EdoPlan, Slot, StaffingPlan};
pub use schedule::{Schedule, SlotAssignment};
pub use shift::{CalendarPosition, Shift, Weekday};
