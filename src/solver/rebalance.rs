//! Post-solve rebalancing.
//!
//! Greedy transfer search that repairs residual imbalance the main search
//! left behind: for each metric (nights, evenings, total workdays) it
//! moves one slot at a time from the most over-served person to the most
//! under-served eligible person, keeping a transfer only when the
//! objective strictly decreases. Hard rules are re-checked through the
//! same eligibility oracle the solver uses, so the rebalancer can never
//! introduce a duplicate, a coverage loss, or work after a night.

use tracing::debug;

use crate::models::Shift;

use super::model::{PairModel, Roster};

/// Metrics the rebalancer equalises, in sweep order.
const METRICS: [Metric; 3] = [Metric::Nights, Metric::Evenings, Metric::Workdays];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Nights,
    Evenings,
    Workdays,
}

impl Metric {
    fn value(self, roster: &Roster, p: usize) -> f64 {
        match self {
            Metric::Nights => roster.count_shift(p, Shift::Night) as f64,
            Metric::Evenings => roster.count_shift(p, Shift::Evening) as f64,
            Metric::Workdays => roster.total_worked(p) as f64,
        }
    }

    /// Whether a slot of `shift` moves this metric.
    fn covers(self, shift: Shift) -> bool {
        match self {
            Metric::Nights => shift == Shift::Night,
            Metric::Evenings => shift == Shift::Evening,
            Metric::Workdays => shift.is_working(),
        }
    }
}

/// Runs at most `max_steps` accepted transfers; returns how many applied.
pub fn rebalance(model: &PairModel, roster: &mut Roster, max_steps: u32) -> u32 {
    if max_steps == 0 {
        return 0;
    }

    let mut applied = 0u32;
    let mut best = model.evaluate(roster);

    while applied < max_steps {
        let mut stepped = false;
        for metric in METRICS {
            if applied >= max_steps {
                break;
            }
            if let Some(cost) = transfer_once(model, roster, metric, &best) {
                best = cost;
                applied += 1;
                stepped = true;
            }
        }
        if !stepped {
            break;
        }
    }

    debug!(applied, "rebalance finished");
    applied
}

/// One transfer attempt for one metric: donors in descending fair-share
/// gap, receivers ascending; the first strictly improving feasible
/// transfer wins.
fn transfer_once(
    model: &PairModel,
    roster: &mut Roster,
    metric: Metric,
    best: &super::model::CostBreakdown,
) -> Option<super::model::CostBreakdown> {
    let n = model.team.len();
    let total_workdays: f64 = model
        .team
        .iter()
        .map(|p| p.workdays_per_week as f64)
        .sum();
    if total_workdays == 0.0 {
        return None;
    }

    let values: Vec<f64> = (0..n).map(|p| metric.value(roster, p)).collect();
    let total: f64 = values.iter().sum();
    // Fair share proportional to contractual workdays.
    let gap = |p: usize| {
        values[p] - total * (model.team[p].workdays_per_week as f64) / total_workdays
    };

    let mut donors: Vec<usize> = (0..n).collect();
    donors.sort_by(|&a, &b| gap(b).partial_cmp(&gap(a)).unwrap_or(std::cmp::Ordering::Equal));
    let mut receivers: Vec<usize> = (0..n).collect();
    receivers.sort_by(|&a, &b| gap(a).partial_cmp(&gap(b)).unwrap_or(std::cmp::Ordering::Equal));

    for &donor in &donors {
        if gap(donor) <= 0.0 {
            break;
        }
        for &receiver in &receivers {
            if receiver == donor || gap(receiver) >= gap(donor) {
                continue;
            }
            for (slot_id, slot) in model.slots().iter().enumerate() {
                if !metric.covers(slot.shift) {
                    continue;
                }
                for seat in 0..slot.arity() as usize {
                    if roster.occupant(slot_id, seat) != Some(donor) {
                        continue;
                    }
                    model.unassign(roster, slot_id, seat);
                    if model.eligible(roster, receiver, slot) {
                        model.assign(roster, slot_id, seat, receiver);
                        let cost = model.evaluate(roster);
                        if cost.total() < best.total() {
                            return Some(cost);
                        }
                        model.unassign(roster, slot_id, seat);
                    }
                    model.assign(roster, slot_id, seat, donor);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Person, SolveConfig};
    use crate::solver::search::{run, Deadline};
    use crate::solver::{derive_staffing, edo::build_edo_plan};
    use std::time::Duration;

    fn team(n: usize, workdays: u8) -> Vec<Person> {
        (0..n)
            .map(|i| Person::new(format!("P{i:02}")).with_workdays(workdays))
            .collect()
    }

    #[test]
    fn test_zero_steps_is_a_no_op() {
        let team = team(8, 4);
        let config = SolveConfig::default().with_weeks(2).with_edo(false);
        let edo = build_edo_plan(&team, &config);
        let staffing = derive_staffing(&team, 2, &edo);
        let model = PairModel::build(&team, &config, &staffing, &edo);
        let mut roster = model.empty_roster();

        assert_eq!(rebalance(&model, &mut roster, 0), 0);
    }

    #[test]
    fn test_rebalance_never_worsens_cost() {
        let team = team(9, 4);
        let config = SolveConfig::default().with_weeks(2).with_edo(false);
        let edo = build_edo_plan(&team, &config);
        let staffing = derive_staffing(&team, 2, &edo);
        let model = PairModel::build(&team, &config, &staffing, &edo);

        let outcome = run(&model, 11, &Deadline::after(Duration::from_secs(30)));
        let mut roster = outcome.roster;
        let before = model.evaluate(&roster).total();

        rebalance(&model, &mut roster, 50);
        let after = model.evaluate(&roster).total();
        assert!(after <= before);
    }

    #[test]
    fn test_rebalance_preserves_hard_rules() {
        let team = team(10, 4);
        let config = SolveConfig::default().with_weeks(2).with_edo(false);
        let edo = build_edo_plan(&team, &config);
        let staffing = derive_staffing(&team, 2, &edo);
        let model = PairModel::build(&team, &config, &staffing, &edo);

        let outcome = run(&model, 2, &Deadline::after(Duration::from_secs(30)));
        let mut roster = outcome.roster;
        let vacant_before = model.evaluate(&roster).vacant_seats;

        rebalance(&model, &mut roster, 100);

        // Coverage is untouched and the rest rule still holds.
        assert_eq!(model.evaluate(&roster).vacant_seats, vacant_before);
        for p in 0..team.len() {
            for week in 1..=2u8 {
                assert!(roster.worked_in_week(p, week) <= model.weekly_cap(p, week));
                for day in crate::models::Weekday::WEEKDAYS {
                    if roster.cell(p, week, day) == Some(Shift::Night) {
                        if let Some(next) = day.next_weekday() {
                            assert!(roster.cell(p, week, next).is_none());
                        }
                    }
                }
            }
        }
    }
}
