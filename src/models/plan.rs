//! Computed per-solve plans: EDO allocation and staffing demand.
//!
//! Both are derived once per solve from the team and config
//! (see [`crate::solver::edo`] and [`crate::solver::staffing`]) and are
//! immutable thereafter.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{CalendarPosition, Shift, Weekday};

/// EDO allocation: who receives an earned day off in which week, and the
/// preferred fixed day per person (empty where the solver chooses).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdoPlan {
    /// Week (1-based) to the set of recipient names.
    pub recipients: BTreeMap<u8, BTreeSet<String>>,
    /// Person to their fixed EDO day, where one is set.
    pub fixed: BTreeMap<String, Weekday>,
}

impl EdoPlan {
    /// Whether `name` receives an EDO in `week`.
    pub fn is_recipient(&self, name: &str, week: u8) -> bool {
        self.recipients
            .get(&week)
            .is_some_and(|set| set.contains(name))
    }

    /// The fixed EDO day for `name`, if any.
    pub fn fixed_day(&self, name: &str) -> Option<Weekday> {
        self.fixed.get(name).copied()
    }

    /// Number of recipients in `week`.
    pub fn recipient_count(&self, week: u8) -> usize {
        self.recipients.get(&week).map_or(0, BTreeSet::len)
    }

    /// Number of EDO weeks granted to `name` over the horizon.
    pub fn edo_weeks(&self, name: &str) -> u32 {
        self.recipients
            .values()
            .filter(|set| set.contains(name))
            .count() as u32
    }

    /// Total EDO days over the horizon.
    pub fn total_days(&self) -> usize {
        self.recipients.values().map(BTreeSet::len).sum()
    }
}

/// Slot counts for one day: how many pairs of each pair shift and how many
/// solo Admin slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub day_pairs: u8,
    pub evening_pairs: u8,
    pub night_pairs: u8,
    pub admin_solo: u8,
}

impl DaySlots {
    /// Slot count for a shift kind.
    pub fn count(&self, shift: Shift) -> u8 {
        match shift {
            Shift::Day => self.day_pairs,
            Shift::Evening => self.evening_pairs,
            Shift::Night => self.night_pairs,
            Shift::Admin => self.admin_solo,
            Shift::Off | Shift::Edo | Shift::EdoConflict => 0,
        }
    }

    /// People demanded by this day (pairs count twice).
    pub fn person_demand(&self) -> u32 {
        2 * (self.day_pairs as u32 + self.evening_pairs as u32 + self.night_pairs as u32)
            + self.admin_solo as u32
    }
}

/// One concrete slot: a (week, day, shift, index) whose arity follows the
/// shift kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub week: u8,
    pub day: Weekday,
    pub shift: Shift,
    pub slot_idx: u8,
}

impl Slot {
    /// People per slot.
    pub fn arity(&self) -> u8 {
        self.shift.arity()
    }

    /// The calendar position of this slot.
    pub fn position(&self) -> CalendarPosition {
        CalendarPosition::new(self.week, self.day)
    }
}

/// Staffing demand: per week, per weekday, per shift slot counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingPlan {
    pub weeks: u8,
    slots: BTreeMap<(u8, Weekday), DaySlots>,
}

impl StaffingPlan {
    pub fn new(weeks: u8) -> Self {
        Self {
            weeks,
            slots: BTreeMap::new(),
        }
    }

    /// Sets the slot counts for one day.
    pub fn set_day(&mut self, week: u8, day: Weekday, slots: DaySlots) {
        self.slots.insert((week, day), slots);
    }

    /// Slot counts for one day (all-zero if never set).
    pub fn day(&self, week: u8, day: Weekday) -> DaySlots {
        self.slots.get(&(week, day)).copied().unwrap_or_default()
    }

    /// Slot count for (week, day, shift).
    pub fn slot_count(&self, week: u8, day: Weekday, shift: Shift) -> u8 {
        self.day(week, day).count(shift)
    }

    /// People demanded in one week.
    pub fn week_demand(&self, week: u8) -> u32 {
        Weekday::WEEKDAYS
            .iter()
            .map(|&d| self.day(week, d).person_demand())
            .sum()
    }

    /// Enumerates every slot in deterministic order: by week, day, then
    /// Night before Day before Evening before Admin. Nights come first so
    /// the construction pass settles the most constrained seats early.
    pub fn slots(&self) -> Vec<Slot> {
        let mut out = Vec::new();
        for week in 1..=self.weeks {
            for day in Weekday::WEEKDAYS {
                let ds = self.day(week, day);
                for (shift, count) in [
                    (Shift::Night, ds.night_pairs),
                    (Shift::Day, ds.day_pairs),
                    (Shift::Evening, ds.evening_pairs),
                    (Shift::Admin, ds.admin_solo),
                ] {
                    for slot_idx in 0..count {
                        out.push(Slot {
                            week,
                            day,
                            shift,
                            slot_idx,
                        });
                    }
                }
            }
        }
        out
    }
}
