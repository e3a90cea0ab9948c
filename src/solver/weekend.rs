//! Weekend planner.
//!
//! Independent of the weekday engine: Saturday and Sunday each demand one
//! Day pair (10h) and one Night pair (12h). A person holding both halves
//! of the same day is a 24h worker; 12h and 24h workers mix freely on a
//! pair, and partners may change between the two halves.
//!
//! Coverage is hard. Per-weekend hours are capped at 24, which also rules
//! out any work the day after a 24h Saturday. The stricter house rules
//! (no Sunday Day after Saturday Night, no back-to-back nights, the
//! weekends-per-month cap, the Friday-night handoff) are config-driven;
//! the handoff list is empty by default so the weekend plan stays
//! decoupled from the weekday plan.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SolveError;
use crate::models::{Person, Shift, SlotAssignment, Weekday, WeekendConfig};
use crate::validation::validate_team;

use super::search::Deadline;

/// Weekend hours cap per person.
const MAX_WEEKEND_HOURS: u32 = 24;

/// Soft weights.
const W_SHIFT_SPREAD: i64 = 10;
const W_SHIFT_TARGET: i64 = 10;
const W_24H_BALANCE: i64 = 5;
const W_SPLIT_WEEKEND: i64 = 5;
const W_CONSECUTIVE_WEEKENDS: i64 = 50;
const W_PAIR_REPEAT: i64 = 2;

/// Terminal status of a weekend solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekendStatus {
    Feasible,
    Infeasible,
}

/// A person's load on one weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekendLoad {
    Off,
    /// One 10h or 12h shift, or one on each day.
    Hours12,
    /// Day plus Night on the same day.
    Hours24,
}

/// A complete Sat/Sun schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekendSchedule {
    pub weeks: u8,
    /// Slot assignments over Sat/Sun, same shape as the weekday output.
    pub assignments: Vec<SlotAssignment>,
    pub seed: u64,
}

impl WeekendSchedule {
    /// Whether `name` works (week, day, shift).
    pub fn works(&self, name: &str, week: u8, day: Weekday, shift: Shift) -> bool {
        self.assignments
            .iter()
            .any(|a| a.week == week && a.day == day && a.shift == shift && a.contains(name))
    }

    /// Hours worked by `name` on the weekend of `week`.
    pub fn weekend_hours(&self, name: &str, week: u8) -> u32 {
        self.assignments
            .iter()
            .filter(|a| a.week == week && a.contains(name))
            .map(|a| a.shift.hours())
            .sum()
    }

    /// The load class of `name` on the weekend of `week`.
    pub fn load(&self, name: &str, week: u8) -> WeekendLoad {
        let worked_24h = Weekday::WEEKEND.iter().any(|&day| {
            self.works(name, week, day, Shift::Day) && self.works(name, week, day, Shift::Night)
        });
        if worked_24h {
            WeekendLoad::Hours24
        } else if self.weekend_hours(name, week) > 0 {
            WeekendLoad::Hours12
        } else {
            WeekendLoad::Off
        }
    }

    /// Total weekend shifts of `name` over the horizon.
    pub fn shift_count(&self, name: &str) -> u32 {
        self.assignments
            .iter()
            .filter(|a| a.contains(name))
            .count() as u32
    }
}

/// Outcome of a weekend solve.
#[derive(Debug, Clone)]
pub struct WeekendResult {
    pub schedule: Option<WeekendSchedule>,
    pub status: WeekendStatus,
    pub score: i64,
    pub seed_used: u64,
}

/// Solves the weekend rotation for the weekend-available part of the team.
pub fn solve_weekends(
    team: &[Person],
    config: &WeekendConfig,
) -> Result<WeekendResult, SolveError> {
    config.validate()?;
    if let Err(errors) = validate_team(team) {
        return Err(SolveError::Input(crate::error::InputError::Csv(
            errors[0].message.clone(),
        )));
    }

    let pool: Vec<&Person> = team.iter().filter(|p| p.available_weekends).collect();
    let seed = if config.seed == 0 {
        rand::rng().random()
    } else {
        config.seed
    };

    if pool.len() < 4 {
        // Fewer than four people cannot staff both pairs of a day under
        // the 24h cap.
        info!(pool = pool.len(), "weekend pool too small");
        return Ok(WeekendResult {
            schedule: None,
            status: WeekendStatus::Infeasible,
            score: i64::MAX,
            seed_used: seed,
        });
    }
    let model = WeekendModel::new(&pool, config);

    let deadline = Deadline::after(Duration::from_secs(config.time_limit_seconds));
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut grid = model.empty_grid();

    model.construct(&mut grid, &mut rng);
    let cost = model.improve(&mut grid, &deadline);

    if model.vacant_seats(&grid) > 0 {
        return Ok(WeekendResult {
            schedule: None,
            status: WeekendStatus::Infeasible,
            score: i64::MAX,
            seed_used: seed,
        });
    }

    let schedule = model.to_schedule(&grid, seed);
    debug!(score = cost, "weekend solve finished");
    Ok(WeekendResult {
        schedule: Some(schedule),
        status: WeekendStatus::Feasible,
        score: cost,
        seed_used: seed,
    })
}

/// One weekend slot: (week, Sat|Sun, Day|Night), always a pair.
#[derive(Debug, Clone, Copy)]
struct WSlot {
    week: u8,
    day: Weekday,
    shift: Shift,
}

struct WeekendModel<'a> {
    pool: Vec<&'a Person>,
    config: &'a WeekendConfig,
    slots: Vec<WSlot>,
    max_weekends: u32,
}

/// Seat occupancy, parallel to `WeekendModel::slots`.
type Grid = Vec<[Option<usize>; 2]>;

impl<'a> WeekendModel<'a> {
    fn new(pool: &[&'a Person], config: &'a WeekendConfig) -> Self {
        let mut slots = Vec::new();
        for week in 1..=config.weeks {
            for day in Weekday::WEEKEND {
                for shift in [Shift::Day, Shift::Night] {
                    slots.push(WSlot { week, day, shift });
                }
            }
        }
        let max_weekends = config
            .max_weekends_per_month
            .map(|per_month| {
                let months = (config.weeks as f64 / 4.0).max(1.0);
                (per_month as f64 * months) as u32
            })
            .unwrap_or(u32::MAX);
        Self {
            pool: pool.to_vec(),
            config,
            slots,
            max_weekends,
        }
    }

    fn empty_grid(&self) -> Grid {
        vec![[None, None]; self.slots.len()]
    }

    fn works(&self, grid: &Grid, p: usize, week: u8, day: Weekday, shift: Shift) -> bool {
        self.slots.iter().enumerate().any(|(i, s)| {
            s.week == week
                && s.day == day
                && s.shift == shift
                && grid[i].iter().any(|&o| o == Some(p))
        })
    }

    fn weekend_hours(&self, grid: &Grid, p: usize, week: u8) -> u32 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, s)| s.week == week && grid[*i].iter().any(|&o| o == Some(p)))
            .map(|(_, s)| s.shift.hours())
            .sum()
    }

    fn weekends_worked(&self, grid: &Grid, p: usize) -> u32 {
        (1..=self.config.weeks)
            .filter(|&w| self.weekend_hours(grid, p, w) > 0)
            .count() as u32
    }

    /// Hard rules: the weekend hours cap (which also bars any work the day
    /// after a 24h block), the optional rest rules, the weekends cap, and
    /// the Friday-night handoff.
    fn eligible(&self, grid: &Grid, p: usize, slot: &WSlot) -> bool {
        if self.works(grid, p, slot.week, slot.day, slot.shift) {
            return false;
        }
        if self.weekend_hours(grid, p, slot.week) + slot.shift.hours() > MAX_WEEKEND_HOURS {
            return false;
        }
        if self.config.rest_after_saturday_night {
            let sat_night_blocks_sun_day = slot.day == Weekday::Sun
                && slot.shift == Shift::Day
                && self.works(grid, p, slot.week, Weekday::Sat, Shift::Night);
            let sun_day_blocks_sat_night = slot.day == Weekday::Sat
                && slot.shift == Shift::Night
                && self.works(grid, p, slot.week, Weekday::Sun, Shift::Day);
            if sat_night_blocks_sun_day || sun_day_blocks_sat_night {
                return false;
            }
        }
        if self.config.forbid_consecutive_nights
            && slot.shift == Shift::Night
            && Weekday::WEEKEND
                .iter()
                .any(|&d| d != slot.day && self.works(grid, p, slot.week, d, Shift::Night))
        {
            return false;
        }
        if slot.day == Weekday::Sat
            && slot.shift == Shift::Day
            && self
                .config
                .friday_night_workers
                .get(&slot.week)
                .is_some_and(|names| names.contains(&self.pool[p].name))
        {
            return false;
        }
        if self.weekend_hours(grid, p, slot.week) == 0
            && self.weekends_worked(grid, p) >= self.max_weekends
        {
            return false;
        }
        true
    }

    fn construct(&self, grid: &mut Grid, rng: &mut SmallRng) {
        for slot_id in 0..self.slots.len() {
            let slot = self.slots[slot_id];
            for seat in 0..2 {
                if grid[slot_id][seat].is_some() {
                    continue;
                }
                // Weekend-frugal ranking: finish the weekends of people
                // already on duty before drafting fresh ones, so the
                // weekends-per-month budget is not burned in the first
                // weeks; ties go to the lightest total load.
                let candidate = (0..self.pool.len())
                    .filter(|&p| self.eligible(grid, p, &slot))
                    .min_by_key(|&p| {
                        let fresh = u32::from(self.weekend_hours(grid, p, slot.week) == 0);
                        let shifts: u32 = (1..=self.config.weeks)
                            .map(|w| self.weekend_hours(grid, p, w) / 10)
                            .sum();
                        (fresh, shifts, rng.random_range(0..8u32))
                    });
                if let Some(p) = candidate {
                    grid[slot_id][seat] = Some(p);
                }
            }
        }
    }

    /// Replacement and exchange sweeps, mirroring the weekday search.
    fn improve(&self, grid: &mut Grid, deadline: &Deadline) -> i64 {
        let mut best = self.cost(grid);
        let mut improved = true;

        'outer: while improved && !deadline.should_stop() {
            improved = false;

            for slot_id in 0..self.slots.len() {
                if deadline.should_stop() {
                    break 'outer;
                }
                let slot = self.slots[slot_id];
                for seat in 0..2 {
                    let incumbent = grid[slot_id][seat];
                    grid[slot_id][seat] = None;
                    let mut restored = incumbent;
                    for q in 0..self.pool.len() {
                        if incumbent == Some(q) || !self.eligible(grid, q, &slot) {
                            continue;
                        }
                        grid[slot_id][seat] = Some(q);
                        let cost = self.cost(grid);
                        if cost < best {
                            best = cost;
                            improved = true;
                            restored = Some(q);
                            break;
                        }
                        grid[slot_id][seat] = None;
                    }
                    grid[slot_id][seat] = restored;
                }
            }

            for s1 in 0..self.slots.len() {
                for s2 in (s1 + 1)..self.slots.len() {
                    if deadline.should_stop() {
                        break 'outer;
                    }
                    for seat1 in 0..2 {
                        for seat2 in 0..2 {
                            if let Some(cost) =
                                self.try_exchange(grid, (s1, seat1), (s2, seat2), best)
                            {
                                best = cost;
                                improved = true;
                            }
                        }
                    }
                }
            }
        }
        best
    }

    fn try_exchange(
        &self,
        grid: &mut Grid,
        (s1, seat1): (usize, usize),
        (s2, seat2): (usize, usize),
        best: i64,
    ) -> Option<i64> {
        let p = grid[s1][seat1]?;
        let q = grid[s2][seat2]?;
        if p == q {
            return None;
        }
        grid[s1][seat1] = None;
        grid[s2][seat2] = None;

        if self.eligible(grid, q, &self.slots[s1]) {
            grid[s1][seat1] = Some(q);
            if self.eligible(grid, p, &self.slots[s2]) {
                grid[s2][seat2] = Some(p);
                let cost = self.cost(grid);
                if cost < best {
                    return Some(cost);
                }
                grid[s2][seat2] = None;
            }
            grid[s1][seat1] = None;
        }

        grid[s1][seat1] = Some(p);
        grid[s2][seat2] = Some(q);
        None
    }

    fn vacant_seats(&self, grid: &Grid) -> u32 {
        grid.iter()
            .map(|seats| seats.iter().filter(|o| o.is_none()).count() as u32)
            .sum()
    }

    /// Soft objective. Coverage is hard, but an empty seat still carries a
    /// dominating penalty here so the improvement sweeps pull every
    /// reachable fill before the feasibility check.
    fn cost(&self, grid: &Grid) -> i64 {
        let n = self.pool.len();
        let mut shifts = vec![0u32; n];
        let mut count_24h = vec![0u32; n];
        let mut cost = 1_000 * self.vacant_seats(grid) as i64;

        // Pair repetition.
        let mut pair_counts: std::collections::BTreeMap<(usize, usize), i64> = Default::default();
        for seats in grid.iter() {
            if let [Some(a), Some(b)] = seats {
                let key = (*a.min(b), *a.max(b));
                *pair_counts.entry(key).or_default() += 1;
            }
        }
        for &times in pair_counts.values() {
            cost += W_PAIR_REPEAT * (times - 1).max(0);
        }

        for seats in grid.iter() {
            for &occupant in seats.iter().flatten() {
                shifts[occupant] += 1;
            }
        }

        let mut prev_worked: Vec<bool> = vec![false; n];
        for week in 1..=self.config.weeks {
            for p in 0..n {
                let hours = self.weekend_hours(grid, p, week);
                let worked = hours > 0;

                let is_24h = Weekday::WEEKEND.iter().any(|&d| {
                    self.works(grid, p, week, d, Shift::Day)
                        && self.works(grid, p, week, d, Shift::Night)
                });
                if is_24h {
                    count_24h[p] += 1;
                }

                // Working both days without a 24h block splits the weekend.
                let both_days = Weekday::WEEKEND.iter().all(|&d| {
                    self.works(grid, p, week, d, Shift::Day)
                        || self.works(grid, p, week, d, Shift::Night)
                });
                if both_days && !is_24h {
                    cost += W_SPLIT_WEEKEND;
                }

                if worked && prev_worked[p] {
                    cost += W_CONSECUTIVE_WEEKENDS;
                }
                prev_worked[p] = worked;
            }
        }

        // Spread and proportional targets.
        let total_shifts: u32 = shifts.iter().sum();
        let total_workdays: u32 = self.pool.iter().map(|p| p.workdays_per_week as u32).sum();
        if n > 1 {
            let spread = |values: &[u32]| {
                values.iter().copied().max().unwrap_or(0)
                    - values.iter().copied().min().unwrap_or(0)
            };
            cost += W_SHIFT_SPREAD * spread(&shifts) as i64;
            cost += W_24H_BALANCE * spread(&count_24h) as i64;
        }
        if total_workdays > 0 {
            for p in 0..n {
                let target = (total_shifts * self.pool[p].workdays_per_week as u32
                    + total_workdays / 2)
                    / total_workdays;
                cost += W_SHIFT_TARGET * shifts[p].abs_diff(target) as i64;
            }
        }

        cost
    }

    fn to_schedule(&self, grid: &Grid, seed: u64) -> WeekendSchedule {
        let mut assignments: Vec<SlotAssignment> = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| SlotAssignment {
                week: slot.week,
                day: slot.day,
                shift: slot.shift,
                slot_idx: 0,
                people: grid[i]
                    .iter()
                    .flatten()
                    .map(|&p| self.pool[p].name.clone())
                    .collect(),
            })
            .collect();
        assignments.sort_by_key(|a| (a.week, a.day, a.shift, a.slot_idx));
        WeekendSchedule {
            weeks: self.config.weeks,
            assignments,
            seed,
        }
    }
}
