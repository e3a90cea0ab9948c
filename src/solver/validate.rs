//! Schedule validation.
//!
//! Re-verifies every hard invariant on a finished schedule and counts
//! soft violations, producing a [`Diagnostics`] record. The validator
//! never mutates; it works from the schedule alone (plus the team and
//! config for targets and cohort keys).
//!
//! A schedule with duplicates or work-after-night is *invalid*; anything
//! else is valid-with-penalties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    FairnessCohorts, Person, Schedule, Shift, Slot, SolveConfig, Weekday,
};

use super::hours;

/// Validation record for one schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Empty seats against the staffing plan.
    pub vacant_slots: u32,
    /// People assigned twice on the same day.
    pub duplicates_per_day: u32,
    /// Night followed by any work the next weekday (counted only when the
    /// rest rule is enabled; otherwise it is legal).
    pub night_then_work: u32,
    /// Evening followed by Day the next weekday.
    pub evening_to_day: u32,
    /// (person, week) cells where worked days miss the weekly target.
    pub weekly_misses: u32,
    /// People whose horizon total misses the summed target.
    pub horizon_misses: u32,
    /// Rolling 7-day windows above 48 hours.
    pub rolling_48h_violations: u32,
    /// Pair slots staffed by two contractors.
    pub contractor_pairs: u32,
    /// Population standard deviation of night counts per cohort.
    pub per_cohort_night_stddev: BTreeMap<String, f64>,
    /// Population standard deviation of evening counts per cohort.
    pub per_cohort_evening_stddev: BTreeMap<String, f64>,
    /// The unfilled seats, as (week, day, shift, slot_idx).
    pub unfilled: Vec<Slot>,
}

impl Diagnostics {
    /// Whether the schedule satisfies the invalidating hard rules.
    pub fn is_valid(&self) -> bool {
        self.duplicates_per_day == 0 && self.night_then_work == 0
    }

    /// Whether any soft violation was counted.
    pub fn has_soft_violations(&self) -> bool {
        self.vacant_slots > 0
            || self.evening_to_day > 0
            || self.weekly_misses > 0
            || self.horizon_misses > 0
            || self.rolling_48h_violations > 0
            || self.contractor_pairs > 0
    }

    /// Summed night standard deviation across cohorts.
    pub fn night_stddev_total(&self) -> f64 {
        self.per_cohort_night_stddev.values().sum()
    }

    /// Summed evening standard deviation across cohorts.
    pub fn evening_stddev_total(&self) -> f64 {
        self.per_cohort_evening_stddev.values().sum()
    }
}

/// Validates a schedule against the team and config it was solved for.
pub fn validate(schedule: &Schedule, team: &[Person], config: &SolveConfig) -> Diagnostics {
    let mut diag = Diagnostics::default();

    check_coverage(schedule, &mut diag);
    check_duplicates(schedule, team, &mut diag);
    check_rest_rules(schedule, team, config, &mut diag);
    check_targets(schedule, team, &mut diag);
    check_rolling_48h(schedule, team, &mut diag);
    check_contractor_pairs(schedule, team, &mut diag);
    compute_fairness(schedule, team, config, &mut diag);

    debug!(
        vacant = diag.vacant_slots,
        duplicates = diag.duplicates_per_day,
        night_then_work = diag.night_then_work,
        rolling = diag.rolling_48h_violations,
        valid = diag.is_valid(),
        "schedule validated"
    );
    diag
}

/// Seats filled versus the staffing plan.
fn check_coverage(schedule: &Schedule, diag: &mut Diagnostics) {
    for week in 1..=schedule.weeks {
        for day in Weekday::WEEKDAYS {
            for shift in Shift::WORKING {
                let planned = schedule.staffing.slot_count(week, day, shift);
                for slot_idx in 0..planned {
                    let filled = schedule
                        .assignments
                        .iter()
                        .find(|a| {
                            a.week == week
                                && a.day == day
                                && a.shift == shift
                                && a.slot_idx == slot_idx
                        })
                        .map_or(0, |a| a.people.len() as u8);
                    let missing = shift.arity().saturating_sub(filled);
                    if missing > 0 {
                        diag.vacant_slots += missing as u32;
                        diag.unfilled.push(Slot {
                            week,
                            day,
                            shift,
                            slot_idx,
                        });
                    }
                }
            }
        }
    }
}

/// Every person at most once per calendar position.
fn check_duplicates(schedule: &Schedule, team: &[Person], diag: &mut Diagnostics) {
    for week in 1..=schedule.weeks {
        for day in Weekday::WEEKDAYS {
            for person in team {
                let appearances = schedule
                    .day_assignments(week, day)
                    .iter()
                    .filter(|a| a.contains(&person.name))
                    .count() as u32;
                if appearances > 1 {
                    diag.duplicates_per_day += appearances - 1;
                }
            }
        }
    }
}

/// Work after a night, and the evening-into-day sequence.
fn check_rest_rules(
    schedule: &Schedule,
    team: &[Person],
    config: &SolveConfig,
    diag: &mut Diagnostics,
) {
    for person in team {
        for week in 1..=schedule.weeks {
            for day in Weekday::WEEKDAYS {
                let Some(next) = day.next_weekday() else {
                    continue;
                };
                let today = schedule.shift_on(&person.name, week, day);
                let tomorrow = schedule.shift_on(&person.name, week, next);
                if config.rest_after_night
                    && today == Shift::Night
                    && tomorrow.is_working()
                {
                    diag.night_then_work += 1;
                }
                if today == Shift::Evening && tomorrow == Shift::Day {
                    diag.evening_to_day += 1;
                }
            }
        }
    }
}

/// Weekly and horizon workday targets.
fn check_targets(schedule: &Schedule, team: &[Person], diag: &mut Diagnostics) {
    for person in team {
        let mut horizon_target = 0u32;
        let mut horizon_actual = 0u32;
        for week in 1..=schedule.weeks {
            let edo = u32::from(schedule.edo_plan.is_recipient(&person.name, week));
            let target = (person.workdays_per_week as u32).saturating_sub(edo);
            let actual = schedule.worked_in_week(&person.name, week);
            if actual != target {
                diag.weekly_misses += 1;
            }
            horizon_target += target;
            horizon_actual += actual;
        }
        if horizon_actual != horizon_target {
            diag.horizon_misses += 1;
        }
    }
}

/// Rolling-48h windows, via the same routine the objective uses.
fn check_rolling_48h(schedule: &Schedule, team: &[Person], diag: &mut Diagnostics) {
    for person in team {
        let timeline = hours::weekday_timeline(schedule.weeks, |w, d| {
            schedule.shift_on(&person.name, w, d)
        });
        diag.rolling_48h_violations += hours::rolling_excess(&timeline).len() as u32;
    }
}

/// Contractors never paired together.
fn check_contractor_pairs(schedule: &Schedule, team: &[Person], diag: &mut Diagnostics) {
    let is_contractor = |name: &str| {
        team.iter()
            .any(|p| p.name == name && p.is_contractor)
    };
    for a in &schedule.assignments {
        if a.shift.arity() == 2
            && a.people.len() == 2
            && a.people.iter().all(|n| is_contractor(n))
        {
            diag.contractor_pairs += 1;
        }
    }
}

/// Per-cohort night and evening standard deviations.
fn compute_fairness(
    schedule: &Schedule,
    team: &[Person],
    config: &SolveConfig,
    diag: &mut Diagnostics,
) {
    let mut cohorts: BTreeMap<String, Vec<&Person>> = BTreeMap::new();
    for p in team {
        let key = match config.fairness_cohorts {
            FairnessCohorts::None => "all".to_string(),
            FairnessCohorts::ByWorkdays => p.workdays_cohort(),
            FairnessCohorts::ByTeam => p.team_cohort(),
        };
        cohorts.entry(key).or_default().push(p);
    }

    for (key, members) in cohorts {
        let nights: Vec<f64> = members
            .iter()
            .map(|p| schedule.count_shifts(&p.name, Shift::Night) as f64)
            .collect();
        let evenings: Vec<f64> = members
            .iter()
            .map(|p| schedule.count_shifts(&p.name, Shift::Evening) as f64)
            .collect();
        diag.per_cohort_night_stddev
            .insert(key.clone(), population_stddev(&nights));
        diag.per_cohort_evening_stddev
            .insert(key, population_stddev(&evenings));
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySlots, EdoPlan, SlotAssignment, StaffingPlan};

    fn two_person_team() -> Vec<Person> {
        vec![
            Person::new("Alice").with_workdays(2),
            Person::new("Bob").with_workdays(2),
        ]
    }

    fn one_night_staffing() -> StaffingPlan {
        let mut staffing = StaffingPlan::new(1);
        staffing.set_day(
            1,
            Weekday::Mon,
            DaySlots {
                night_pairs: 1,
                ..Default::default()
            },
        );
        staffing
    }

    fn schedule_with(assignments: Vec<SlotAssignment>, staffing: StaffingPlan) -> Schedule {
        let people = vec!["Alice".to_string(), "Bob".to_string()];
        Schedule::new(1, assignments, &people, EdoPlan::default(), staffing, 0)
    }

    #[test]
    fn test_filled_night_is_clean() {
        let schedule = schedule_with(
            vec![SlotAssignment {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0,
                people: vec!["Alice".into(), "Bob".into()],
            }],
            one_night_staffing(),
        );
        let diag = validate(&schedule, &two_person_team(), &SolveConfig::default());
        assert_eq!(diag.vacant_slots, 0);
        assert!(diag.is_valid());
    }

    #[test]
    fn test_vacant_seats_counted_with_positions() {
        let schedule = schedule_with(
            vec![SlotAssignment {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0,
                people: vec!["Alice".into()],
            }],
            one_night_staffing(),
        );
        let diag = validate(&schedule, &two_person_team(), &SolveConfig::default());
        assert_eq!(diag.vacant_slots, 1);
        assert_eq!(
            diag.unfilled,
            vec![Slot {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0
            }]
        );
    }

    #[test]
    fn test_night_then_work_invalidates() {
        let mut staffing = one_night_staffing();
        staffing.set_day(
            1,
            Weekday::Tue,
            DaySlots {
                day_pairs: 1,
                ..Default::default()
            },
        );
        let schedule = schedule_with(
            vec![
                SlotAssignment {
                    week: 1,
                    day: Weekday::Mon,
                    shift: Shift::Night,
                    slot_idx: 0,
                    people: vec!["Alice".into(), "Bob".into()],
                },
                SlotAssignment {
                    week: 1,
                    day: Weekday::Tue,
                    shift: Shift::Day,
                    slot_idx: 0,
                    people: vec!["Alice".into(), "Bob".into()],
                },
            ],
            staffing,
        );
        let diag = validate(&schedule, &two_person_team(), &SolveConfig::default());
        assert_eq!(diag.night_then_work, 2);
        assert!(!diag.is_valid());

        // With the rest rule off, the same schedule is legal.
        let relaxed = SolveConfig::default().with_rest_after_night(false);
        let diag = validate(&schedule, &two_person_team(), &relaxed);
        assert_eq!(diag.night_then_work, 0);
        assert!(diag.is_valid());
    }

    #[test]
    fn test_weekly_and_horizon_misses() {
        // Both people target 2 workdays but work 1.
        let schedule = schedule_with(
            vec![SlotAssignment {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0,
                people: vec!["Alice".into(), "Bob".into()],
            }],
            one_night_staffing(),
        );
        let diag = validate(&schedule, &two_person_team(), &SolveConfig::default());
        assert_eq!(diag.weekly_misses, 2);
        assert_eq!(diag.horizon_misses, 2);
    }

    #[test]
    fn test_contractor_pair_detected() {
        let mut team = two_person_team();
        team[0].is_contractor = true;
        team[1].is_contractor = true;
        let schedule = schedule_with(
            vec![SlotAssignment {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0,
                people: vec!["Alice".into(), "Bob".into()],
            }],
            one_night_staffing(),
        );
        let diag = validate(&schedule, &team, &SolveConfig::default());
        assert_eq!(diag.contractor_pairs, 1);
    }

    #[test]
    fn test_stddev_per_cohort() {
        // Alice works the night, Bob does not: stddev of [1, 0] is 0.5.
        let schedule = schedule_with(
            vec![SlotAssignment {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0,
                people: vec!["Alice".into()],
            }],
            one_night_staffing(),
        );
        let diag = validate(&schedule, &two_person_team(), &SolveConfig::default());
        let std = diag.per_cohort_night_stddev.get("2j").copied().unwrap();
        assert!((std - 0.5).abs() < 1e-9);
        assert!((diag.night_stddev_total() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_population_stddev() {
        assert_eq!(population_stddev(&[]), 0.0);
        assert_eq!(population_stddev(&[3.0]), 0.0);
        assert!((population_stddev(&[1.0, 1.0, 1.0]) - 0.0).abs() < 1e-12);
        assert!((population_stddev(&[0.0, 2.0]) - 1.0).abs() < 1e-12);
    }
}
