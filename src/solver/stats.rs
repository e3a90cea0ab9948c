//! Per-person statistics.
//!
//! Single source of truth for the per-person counters shown in exports
//! and the CLI summary, and used by the rebalancer's gap metrics.

use serde::{Deserialize, Serialize};

use crate::models::{Person, Schedule, Shift};

/// Shift counters and target tracking for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonStats {
    pub name: String,
    pub days: u32,
    pub evenings: u32,
    pub nights: u32,
    pub admin: u32,
    /// Total worked days over the horizon.
    pub total: u32,
    /// Expected workdays: weekly target times weeks, minus EDO days.
    pub target: u32,
    /// `total as i64 - target as i64`.
    pub delta: i64,
    /// EDO days granted over the horizon.
    pub edo_weeks: u32,
}

/// Computes statistics for every person in team order.
pub fn person_stats(schedule: &Schedule, team: &[Person]) -> Vec<PersonStats> {
    team.iter()
        .map(|p| {
            let edo_weeks = schedule.edo_plan.edo_weeks(&p.name);
            let target = (p.workdays_per_week as u32 * schedule.weeks as u32)
                .saturating_sub(edo_weeks);
            let total = schedule.total_worked(&p.name);
            PersonStats {
                name: p.name.clone(),
                days: schedule.count_shifts(&p.name, Shift::Day),
                evenings: schedule.count_shifts(&p.name, Shift::Evening),
                nights: schedule.count_shifts(&p.name, Shift::Night),
                admin: schedule.count_shifts(&p.name, Shift::Admin),
                total,
                target,
                delta: total as i64 - target as i64,
                edo_weeks,
            }
        })
        .collect()
}
