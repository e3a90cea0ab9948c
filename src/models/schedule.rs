//! Schedule (solution) model.
//!
//! A schedule binds calendar positions to shifts and people, with pair
//! arity respected, and carries the plans and seed that produced it.
//! Non-working days are decorated with `Off`, `Edo`, or `EdoConflict` in
//! the person-day matrix so exports show the full grid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EdoPlan, Shift, StaffingPlan, Weekday};

/// One filled (or partially filled) slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub week: u8,
    pub day: Weekday,
    pub shift: Shift,
    pub slot_idx: u8,
    /// Assigned people; length is at most the shift arity. A pair slot with
    /// a single name is half-vacant.
    pub people: Vec<String>,
}

impl SlotAssignment {
    /// Whether `name` occupies this slot.
    pub fn contains(&self, name: &str) -> bool {
        self.people.iter().any(|p| p == name)
    }

    /// Unfilled seats on this slot.
    pub fn vacant_seats(&self) -> u8 {
        self.shift.arity().saturating_sub(self.people.len() as u8)
    }
}

/// A complete weekday schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Horizon length in weeks.
    pub weeks: u8,
    /// Slot assignments, sorted by (week, day, shift, slot_idx).
    pub assignments: Vec<SlotAssignment>,
    /// Person-day matrix including Off/Edo/EdoConflict decoration.
    matrix: BTreeMap<(String, u8, Weekday), Shift>,
    /// The EDO allocation used by this solve.
    pub edo_plan: EdoPlan,
    /// The staffing demand used by this solve.
    pub staffing: StaffingPlan,
    /// The RNG seed that produced this schedule.
    pub seed: u64,
}

impl Schedule {
    /// Builds a schedule from its parts. Assignments are sorted; the matrix
    /// is decorated for every (person, week, weekday) cell.
    pub fn new(
        weeks: u8,
        mut assignments: Vec<SlotAssignment>,
        people: &[String],
        edo_plan: EdoPlan,
        staffing: StaffingPlan,
        seed: u64,
    ) -> Self {
        assignments.sort_by_key(|a| (a.week, a.day, a.shift, a.slot_idx));

        let mut matrix = BTreeMap::new();
        for a in &assignments {
            for name in &a.people {
                matrix.insert((name.clone(), a.week, a.day), a.shift);
            }
        }
        for name in people {
            for week in 1..=weeks {
                for day in Weekday::WEEKDAYS {
                    matrix
                        .entry((name.clone(), week, day))
                        .or_insert(Shift::Off);
                }
            }
        }
        decorate_edo(&mut matrix, people, weeks, &edo_plan);

        Self {
            weeks,
            assignments,
            matrix,
            edo_plan,
            staffing,
            seed,
        }
    }

    /// Rebuilds a schedule from exported rows (assignments plus decorated
    /// non-working cells). Used by the CSV boundary.
    pub fn from_parts(
        weeks: u8,
        mut assignments: Vec<SlotAssignment>,
        matrix: BTreeMap<(String, u8, Weekday), Shift>,
        seed: u64,
    ) -> Self {
        assignments.sort_by_key(|a| (a.week, a.day, a.shift, a.slot_idx));
        Self {
            weeks,
            assignments,
            matrix,
            edo_plan: EdoPlan::default(),
            staffing: StaffingPlan::default(),
            seed,
        }
    }

    /// The shift of `name` on (week, day); `Off` when unknown.
    pub fn shift_on(&self, name: &str, week: u8, day: Weekday) -> Shift {
        self.matrix
            .get(&(name.to_string(), week, day))
            .copied()
            .unwrap_or(Shift::Off)
    }

    /// The full person-day matrix.
    pub fn matrix(&self) -> &BTreeMap<(String, u8, Weekday), Shift> {
        &self.matrix
    }

    /// All assignments on one day.
    pub fn day_assignments(&self, week: u8, day: Weekday) -> Vec<&SlotAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.week == week && a.day == day)
            .collect()
    }

    /// Counts shifts of a kind for a person.
    pub fn count_shifts(&self, name: &str, shift: Shift) -> u32 {
        self.assignments
            .iter()
            .filter(|a| a.shift == shift && a.contains(name))
            .count() as u32
    }

    /// Total worked days for a person over the horizon.
    pub fn total_worked(&self, name: &str) -> u32 {
        self.assignments
            .iter()
            .filter(|a| a.contains(name))
            .count() as u32
    }

    /// Worked days for a person in one week.
    pub fn worked_in_week(&self, name: &str, week: u8) -> u32 {
        Weekday::WEEKDAYS
            .iter()
            .filter(|&&d| self.shift_on(name, week, d).is_working())
            .count() as u32
    }

    /// Names working Night on (week, Fri), for feeding the weekend planner.
    pub fn friday_night_workers(&self, week: u8) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| a.week == week && a.day == Weekday::Fri && a.shift == Shift::Night)
            .flat_map(|a| a.people.iter().cloned())
            .collect()
    }

    /// Total vacant seats across all slots.
    pub fn vacant_seats(&self) -> u32 {
        self.assignments
            .iter()
            .map(|a| a.vacant_seats() as u32)
            .sum()
    }
}

/// Overlays EDO decoration on the matrix.
///
/// For each recipient week: a free fixed day becomes `Edo`; a working
/// fixed day pushes the marker to the first otherwise-Off day as
/// `EdoConflict`; without a fixed day the first Off day becomes `Edo`.
fn decorate_edo(
    matrix: &mut BTreeMap<(String, u8, Weekday), Shift>,
    people: &[String],
    weeks: u8,
    edo_plan: &EdoPlan,
) {
    for name in people {
        for week in 1..=weeks {
            if !edo_plan.is_recipient(name, week) {
                continue;
            }
            let free = |m: &BTreeMap<(String, u8, Weekday), Shift>, d: Weekday| {
                m.get(&(name.clone(), week, d))
                    .is_none_or(|s| !s.is_working())
            };
            match edo_plan.fixed_day(name) {
                Some(fixed) if free(matrix, fixed) => {
                    matrix.insert((name.clone(), week, fixed), Shift::Edo);
                }
                Some(_) => {
                    // Fixed day is worked: surface the conflict on the first
                    // free day so the manager can see the miss.
                    if let Some(d) = Weekday::WEEKDAYS.into_iter().find(|&d| free(matrix, d)) {
                        matrix.insert((name.clone(), week, d), Shift::EdoConflict);
                    }
                }
                None => {
                    if let Some(d) = Weekday::WEEKDAYS.into_iter().find(|&d| free(matrix, d)) {
                        matrix.insert((name.clone(), week, d), Shift::Edo);
                    }
                }
            }
        }
    }
}
