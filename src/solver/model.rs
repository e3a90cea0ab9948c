//! Pair-based weekday constraint model.
//!
//! Bridges the rotation domain to the seeded search engine. The model is
//! assembled by named constraint-builder routines (`add_coverage`,
//! `add_workday_targets`, `add_edo`, ...) over a mutable builder, then
//! frozen: it exposes an eligibility oracle for the hard rules and a
//! weighted objective for the soft terms.
//!
//! Hard rules are never violated by construction or by any search move;
//! soft terms are priced into [`CostBreakdown`] with the weights below.

use crate::models::{
    EdoPlan, FairnessCohorts, FairnessScope, InterTeamNightShare, NightFairnessMode, Person, Shift,
    Slot, SlotAssignment, SolveConfig, StaffingPlan, Weekday,
};

use super::hours;

/// Coverage deficit, per empty seat.
pub const W_VACANT: i64 = 10;
/// Hours above 48 in a sliding 7-day window, per hour.
pub const W_ROLLING: i64 = 100;
/// Night spread (max−min per cohort).
pub const W_NIGHT_SPREAD: i64 = 10;
/// Evening spread (max−min per cohort).
pub const W_EVENING_SPREAD: i64 = 3;
/// Weekly |actual − target| per person.
pub const W_WORKDAY_DEV: i64 = 5;
/// Evening followed by Day the next weekday.
pub const W_EVENING_TO_DAY: i64 = 1;
/// Pair slot staffed by two contractors.
pub const W_CONTRACTOR_PAIR: i64 = 50;
/// Evening given to a no-evening person.
pub const W_NO_EVENING: i64 = 3;
/// Bonus per night given to a prefers-night person.
pub const W_PREFERS_NIGHT: i64 = 1;
/// Inter-team night-share deviation.
pub const W_TEAM_SHARE: i64 = 5;

/// Soft-term tally for one candidate roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostBreakdown {
    pub vacant_seats: u32,
    pub rolling_excess_hours: u32,
    pub night_spread: u32,
    pub evening_spread: u32,
    pub workday_deviation: u32,
    pub evening_to_day: u32,
    pub contractor_pairs: u32,
    pub no_evening_violations: u32,
    pub prefers_night_nights: u32,
    pub team_share_deviation: u32,
}

impl CostBreakdown {
    /// The weighted objective. Lower is better; the prefers-night bonus
    /// can push it below zero.
    pub fn total(&self) -> i64 {
        W_VACANT * self.vacant_seats as i64
            + W_ROLLING * self.rolling_excess_hours as i64
            + W_NIGHT_SPREAD * self.night_spread as i64
            + W_EVENING_SPREAD * self.evening_spread as i64
            + W_WORKDAY_DEV * self.workday_deviation as i64
            + W_EVENING_TO_DAY * self.evening_to_day as i64
            + W_CONTRACTOR_PAIR * self.contractor_pairs as i64
            + W_NO_EVENING * self.no_evening_violations as i64
            + W_TEAM_SHARE * self.team_share_deviation as i64
            - W_PREFERS_NIGHT * self.prefers_night_nights as i64
    }
}

/// A working assignment grid plus seat occupancy, mutated by the search.
#[derive(Debug, Clone)]
pub struct Roster {
    weeks: u8,
    n_people: usize,
    /// Working shift per (person, weekday-index), `None` when off.
    cells: Vec<Option<Shift>>,
    /// Occupants per slot seat, parallel to `PairModel::slots`.
    seats: Vec<[Option<usize>; 2]>,
}

impl Roster {
    fn new(weeks: u8, n_people: usize, n_slots: usize) -> Self {
        Self {
            weeks,
            n_people,
            cells: vec![None; n_people * weeks as usize * 5],
            seats: vec![[None, None]; n_slots],
        }
    }

    #[inline]
    fn cell_index(&self, p: usize, week: u8, day: Weekday) -> usize {
        p * self.weeks as usize * 5 + (week as usize - 1) * 5 + day.index()
    }

    /// The working shift of person `p` on (week, day), if any.
    #[inline]
    pub fn cell(&self, p: usize, week: u8, day: Weekday) -> Option<Shift> {
        self.cells[self.cell_index(p, week, day)]
    }

    /// The occupant of a seat.
    #[inline]
    pub fn occupant(&self, slot_id: usize, seat: usize) -> Option<usize> {
        self.seats[slot_id][seat]
    }

    /// Worked days of `p` in `week`.
    pub fn worked_in_week(&self, p: usize, week: u8) -> u32 {
        Weekday::WEEKDAYS
            .iter()
            .filter(|&&d| self.cell(p, week, d).is_some())
            .count() as u32
    }

    /// Count of a shift kind for `p` over the horizon.
    pub fn count_shift(&self, p: usize, shift: Shift) -> u32 {
        let base = p * self.weeks as usize * 5;
        self.cells[base..base + self.weeks as usize * 5]
            .iter()
            .filter(|&&c| c == Some(shift))
            .count() as u32
    }

    /// Total worked days for `p`.
    pub fn total_worked(&self, p: usize) -> u32 {
        let base = p * self.weeks as usize * 5;
        self.cells[base..base + self.weeks as usize * 5]
            .iter()
            .filter(|c| c.is_some())
            .count() as u32
    }
}

/// The weekday constraint model.
pub struct PairModel<'a> {
    pub team: &'a [Person],
    pub config: &'a SolveConfig,
    pub staffing: &'a StaffingPlan,
    pub edo_plan: &'a EdoPlan,
    slots: Vec<Slot>,
    /// Per-person per-week hard workday cap: the raw contractual count,
    /// lowered by one only for a five-day person whose EDO week has no
    /// fixed day (the one case where the raw cap alone would not leave a
    /// free weekday).
    weekly_cap: Vec<Vec<u32>>,
    /// Per-person per-week soft target: the contractual count minus any
    /// EDO granted that week. Missing it is priced, never forbidden.
    weekly_target: Vec<Vec<u32>>,
    /// Per-person night cap over the horizon.
    night_cap: Vec<u32>,
    /// Fairness cohorts: (key, member indices).
    cohorts: Vec<(String, Vec<usize>)>,
    /// Team groups for the inter-team night-share term.
    teams: Vec<(String, Vec<usize>)>,
    total_workdays: u32,
}

impl<'a> PairModel<'a> {
    /// Assembles the model from its parts.
    pub fn build(
        team: &'a [Person],
        config: &'a SolveConfig,
        staffing: &'a StaffingPlan,
        edo_plan: &'a EdoPlan,
    ) -> Self {
        let mut model = Self {
            team,
            config,
            staffing,
            edo_plan,
            slots: Vec::new(),
            weekly_cap: Vec::new(),
            weekly_target: Vec::new(),
            night_cap: Vec::new(),
            cohorts: Vec::new(),
            teams: Vec::new(),
            total_workdays: team.iter().map(|p| p.workdays_per_week as u32).sum(),
        };
        model.add_coverage();
        model.add_workday_targets();
        model.add_edo();
        model.add_night_caps();
        model.add_fairness_groups();
        model
    }

    /// Coverage: one seat list per planned slot.
    fn add_coverage(&mut self) {
        self.slots = self.staffing.slots();
    }

    /// Workday targets: the hard cap and the soft target both start at
    /// the raw contractual count.
    fn add_workday_targets(&mut self) {
        self.weekly_cap = self
            .team
            .iter()
            .map(|p| vec![p.workdays_per_week as u32; self.config.weeks as usize])
            .collect();
        self.weekly_target = self.weekly_cap.clone();
    }

    /// EDO: a recipient week lowers the soft target by one. The hard cap
    /// stays at the raw count, except for a five-day person with no fixed
    /// day: there the raw cap alone would not keep a weekday free, so the
    /// cap drops to four. Fixed-day recipients already get their free day
    /// through the fixed-day exclusion, and anyone below five days cannot
    /// fill the week in the first place.
    fn add_edo(&mut self) {
        for (i, p) in self.team.iter().enumerate() {
            for week in 1..=self.config.weeks {
                if !self.edo_plan.is_recipient(&p.name, week) {
                    continue;
                }
                let w = week as usize - 1;
                self.weekly_target[i][w] = self.weekly_target[i][w].saturating_sub(1);
                if p.workdays_per_week == 5 && self.edo_plan.fixed_day(&p.name).is_none() {
                    self.weekly_cap[i][w] -= 1;
                }
            }
        }
    }

    /// Night caps over the horizon.
    fn add_night_caps(&mut self) {
        self.night_cap = self.team.iter().map(|p| p.night_cap()).collect();
    }

    /// Groups for the spread terms and the inter-team night share.
    fn add_fairness_groups(&mut self) {
        self.cohorts = group_by(self.team, |p| match self.config.fairness_cohorts {
            FairnessCohorts::None => "all".to_string(),
            FairnessCohorts::ByWorkdays => p.workdays_cohort(),
            FairnessCohorts::ByTeam => p.team_cohort(),
        });
        self.teams = group_by(self.team, |p| {
            p.team.clone().unwrap_or_else(|| "no_team".to_string())
        });
    }

    /// All slots, in construction order (nights first within each day).
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// An empty roster sized to this model.
    pub fn empty_roster(&self) -> Roster {
        Roster::new(self.config.weeks, self.team.len(), self.slots.len())
    }

    /// The hard weekly workday cap for person `p` in `week`.
    pub fn weekly_cap(&self, p: usize, week: u8) -> u32 {
        self.weekly_cap[p][week as usize - 1]
    }

    /// The soft weekly workday target for person `p` in `week`.
    pub fn weekly_target(&self, p: usize, week: u8) -> u32 {
        self.weekly_target[p][week as usize - 1]
    }

    /// Whether person `p` may take `seat`-mate-independent occupancy of
    /// `slot` without violating any hard rule: one shift per day, the
    /// weekly cap, rest after night, night limits, the consecutive-day
    /// limit, and the fixed EDO day.
    pub fn eligible(&self, roster: &Roster, p: usize, slot: &Slot) -> bool {
        // At most one shift per person per day.
        if roster.cell(p, slot.week, slot.day).is_some() {
            return false;
        }
        // Hard weekly workday cap.
        if roster.worked_in_week(p, slot.week) >= self.weekly_cap(p, slot.week) {
            return false;
        }
        // Rest after night, both directions, never across weeks.
        if self.config.rest_after_night {
            if let Some(prev) = prev_weekday(slot.day) {
                if roster.cell(p, slot.week, prev) == Some(Shift::Night) {
                    return false;
                }
            }
            if slot.shift == Shift::Night {
                if let Some(next) = slot.day.next_weekday() {
                    if roster.cell(p, slot.week, next).is_some() {
                        return false;
                    }
                }
            }
        }
        if slot.shift == Shift::Night {
            // Horizon night cap.
            if roster.count_shift(p, Shift::Night) >= self.night_cap[p] {
                return false;
            }
            // Consecutive-night limit on the flattened weekday timeline.
            if self.night_run_with(roster, p, slot) > self.config.max_nights_sequence {
                return false;
            }
        }
        // Consecutive worked-day limit. A weekday run never exceeds five,
        // so the check only matters for tighter limits.
        if (self.config.max_consecutive_days as usize) < Weekday::WEEKDAYS.len()
            && self.work_run_with(roster, p, slot) > self.config.max_consecutive_days
        {
            return false;
        }
        // The fixed EDO day is never worked in a recipient week.
        let person = &self.team[p];
        if self.edo_plan.is_recipient(&person.name, slot.week)
            && self.edo_plan.fixed_day(&person.name) == Some(slot.day)
        {
            return false;
        }
        true
    }

    /// Length of the consecutive-night run through `slot` if `p` worked it.
    /// Weekday indices are flattened, so a Friday night and the following
    /// Monday night count as consecutive.
    fn night_run_with(&self, roster: &Roster, p: usize, slot: &Slot) -> u32 {
        let total = self.config.weeks as usize * 5;
        let at = (slot.week as usize - 1) * 5 + slot.day.index();
        let night_at = |idx: usize| {
            let week = (idx / 5) as u8 + 1;
            let day = Weekday::WEEKDAYS[idx % 5];
            roster.cell(p, week, day) == Some(Shift::Night)
        };

        let mut run = 1u32;
        let mut i = at;
        while i > 0 && night_at(i - 1) {
            run += 1;
            i -= 1;
        }
        let mut j = at + 1;
        while j < total && night_at(j) {
            run += 1;
            j += 1;
        }
        run
    }

    /// Length of the consecutive worked-day run through `slot` if `p`
    /// worked it. Runs are week-local: the free weekend always breaks
    /// them, so a Friday and the following Monday are never consecutive.
    fn work_run_with(&self, roster: &Roster, p: usize, slot: &Slot) -> u32 {
        let days = Weekday::WEEKDAYS;
        let at = slot.day.index();
        let mut run = 1u32;
        let mut i = at;
        while i > 0 && roster.cell(p, slot.week, days[i - 1]).is_some() {
            run += 1;
            i -= 1;
        }
        let mut j = at + 1;
        while j < days.len() && roster.cell(p, slot.week, days[j]).is_some() {
            run += 1;
            j += 1;
        }
        run
    }

    /// Seats a person. Callers must have checked [`eligible`](Self::eligible).
    pub fn assign(&self, roster: &mut Roster, slot_id: usize, seat: usize, p: usize) {
        let slot = self.slots[slot_id];
        debug_assert!(roster.seats[slot_id][seat].is_none());
        roster.seats[slot_id][seat] = Some(p);
        let idx = roster.cell_index(p, slot.week, slot.day);
        roster.cells[idx] = Some(slot.shift);
    }

    /// Clears a seat and returns its previous occupant.
    pub fn unassign(&self, roster: &mut Roster, slot_id: usize, seat: usize) -> Option<usize> {
        let slot = self.slots[slot_id];
        let p = roster.seats[slot_id][seat].take()?;
        let idx = roster.cell_index(p, slot.week, slot.day);
        roster.cells[idx] = None;
        Some(p)
    }

    /// Evaluates every soft term on the roster.
    pub fn evaluate(&self, roster: &Roster) -> CostBreakdown {
        let mut cost = CostBreakdown::default();

        // Coverage deficit.
        for (slot_id, slot) in self.slots.iter().enumerate() {
            let occupied = (0..slot.arity() as usize)
                .filter(|&s| roster.seats[slot_id][s].is_some())
                .count() as u8;
            cost.vacant_seats += (slot.arity() - occupied) as u32;

            // Contractor pairing.
            if slot.arity() == 2 {
                let both_contractors = roster.seats[slot_id]
                    .iter()
                    .flatten()
                    .filter(|&&p| self.team[p].is_contractor)
                    .count()
                    == 2;
                if both_contractors {
                    cost.contractor_pairs += 1;
                }
            }
        }

        let nights: Vec<u32> = (0..roster.n_people)
            .map(|p| roster.count_shift(p, Shift::Night))
            .collect();
        let evenings: Vec<u32> = (0..roster.n_people)
            .map(|p| roster.count_shift(p, Shift::Evening))
            .collect();

        for (p, person) in self.team.iter().enumerate() {
            // Rolling 48h: shared routine with the validator.
            let timeline = hours::weekday_timeline(self.config.weeks, |w, d| {
                roster.cell(p, w, d).unwrap_or(Shift::Off)
            });
            cost.rolling_excess_hours += hours::total_excess_hours(&timeline);

            // Weekly target deviation.
            for week in 1..=self.config.weeks {
                let target = self.weekly_target(p, week);
                let actual = roster.worked_in_week(p, week);
                cost.workday_deviation += target.abs_diff(actual);
            }

            // Evening followed by Day.
            for week in 1..=self.config.weeks {
                for day in Weekday::WEEKDAYS {
                    if roster.cell(p, week, day) == Some(Shift::Evening) {
                        if let Some(next) = day.next_weekday() {
                            if roster.cell(p, week, next) == Some(Shift::Day) {
                                cost.evening_to_day += 1;
                            }
                        }
                    }
                }
            }

            if person.no_evening {
                cost.no_evening_violations += evenings[p];
            }
            if person.prefers_night {
                cost.prefers_night_nights += nights[p];
            }
        }

        cost.night_spread = self.spread_term(
            self.config.night_fairness,
            &nights,
            self.config.night_fairness_mode,
        );
        cost.evening_spread =
            self.spread_term(self.config.evening_fairness, &evenings, NightFairnessMode::Count);
        cost.team_share_deviation = self.team_share_term(&nights);

        cost
    }

    /// Summed max−min spread over the groups the scope selects.
    fn spread_term(&self, scope: FairnessScope, counts: &[u32], mode: NightFairnessMode) -> u32 {
        let value = |p: usize| match mode {
            NightFairnessMode::Count => counts[p],
            // Nights per contractual workday, in integer tenths.
            NightFairnessMode::Rate => {
                counts[p] * 10 / (self.team[p].workdays_per_week.max(1) as u32)
            }
        };
        let spread_of = |members: &[usize]| {
            let (mut lo, mut hi) = (u32::MAX, 0u32);
            for &p in members {
                let v = value(p);
                lo = lo.min(v);
                hi = hi.max(v);
            }
            if members.len() > 1 {
                hi - lo
            } else {
                0
            }
        };
        match scope {
            FairnessScope::Off => 0,
            FairnessScope::Global => spread_of(&(0..self.team.len()).collect::<Vec<_>>()),
            FairnessScope::Cohort => self
                .cohorts
                .iter()
                .map(|(_, members)| spread_of(members))
                .sum(),
        }
    }

    /// Deviation of per-team night totals from their fair share.
    fn team_share_term(&self, nights: &[u32]) -> u32 {
        if self.config.inter_team_night_share == InterTeamNightShare::Off || self.teams.len() < 2 {
            return 0;
        }
        let total_nights: u32 = nights.iter().sum();
        let mut deviation = 0u32;
        for (_, members) in &self.teams {
            let team_nights: u32 = members.iter().map(|&p| nights[p]).sum();
            let target = match self.config.inter_team_night_share {
                InterTeamNightShare::Proportional => {
                    let team_wd: u32 = members
                        .iter()
                        .map(|&p| self.team[p].workdays_per_week as u32)
                        .sum();
                    if self.total_workdays == 0 {
                        0
                    } else {
                        (total_nights * team_wd + self.total_workdays / 2) / self.total_workdays
                    }
                }
                InterTeamNightShare::Global => {
                    let n = self.team.len() as u32;
                    (total_nights * members.len() as u32 + n / 2) / n
                }
                InterTeamNightShare::Off => unreachable!(),
            };
            deviation += team_nights.abs_diff(target);
        }
        deviation
    }

    /// Converts a roster's seat occupancy into schedule assignments.
    pub fn to_assignments(&self, roster: &Roster) -> Vec<SlotAssignment> {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot_id, slot)| SlotAssignment {
                week: slot.week,
                day: slot.day,
                shift: slot.shift,
                slot_idx: slot.slot_idx,
                people: (0..slot.arity() as usize)
                    .filter_map(|s| roster.seats[slot_id][s])
                    .map(|p| self.team[p].name.clone())
                    .collect(),
            })
            .collect()
    }
}

/// The weekday before `day` within the same week, if any.
fn prev_weekday(day: Weekday) -> Option<Weekday> {
    match day {
        Weekday::Tue => Some(Weekday::Mon),
        Weekday::Wed => Some(Weekday::Tue),
        Weekday::Thu => Some(Weekday::Wed),
        Weekday::Fri => Some(Weekday::Thu),
        _ => None,
    }
}

fn group_by(team: &[Person], key: impl Fn(&Person) -> String) -> Vec<(String, Vec<usize>)> {
    let mut groups: std::collections::BTreeMap<String, Vec<usize>> = Default::default();
    for (i, p) in team.iter().enumerate() {
        groups.entry(key(p)).or_default().push(i);
    }
    groups.into_iter().collect()
}
