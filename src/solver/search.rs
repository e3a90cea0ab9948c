//! Seeded construction and local improvement for the weekday model.
//!
//! One attempt = one seed. A randomized greedy pass fills every seat in
//! deterministic slot order (nights first within each day, since the rest
//! rule makes them the binding choice), then steepest-descent replacement
//! moves run sweep by sweep until a full sweep finds no strict
//! improvement. The RNG only jitters tie-breaks during construction, so a
//! finished attempt is a pure function of its seed whenever the deadline
//! is not hit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::{Shift, Slot};

use super::model::{CostBreakdown, PairModel, Roster};

/// A cooperative deadline shared between the driver and its attempts.
///
/// Attempts poll it between slots during sweeps, comfortably under the
/// 100ms responsiveness bound.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            cancel: None,
        }
    }

    /// Attaches an external cancel flag.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Whether the wall-clock budget is spent.
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Whether an external cancellation was requested.
    pub fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Expired or cancelled.
    pub fn should_stop(&self) -> bool {
        self.cancelled() || self.expired()
    }
}

/// Result of one search attempt.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub roster: Roster,
    pub cost: CostBreakdown,
    pub sweeps: u32,
    pub deadline_hit: bool,
    pub cancelled: bool,
}

/// Runs one seeded attempt: construction, then improvement sweeps.
pub fn run(model: &PairModel, seed: u64, deadline: &Deadline) -> SearchOutcome {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut roster = model.empty_roster();

    construct(model, &mut roster, &mut rng);
    let (cost, sweeps) = improve(model, &mut roster, deadline);

    debug!(
        seed,
        sweeps,
        total = cost.total(),
        vacant = cost.vacant_seats,
        "attempt finished"
    );

    SearchOutcome {
        roster,
        cost,
        sweeps,
        deadline_hit: deadline.expired(),
        cancelled: deadline.cancelled(),
    }
}

/// Greedy seat filling.
///
/// Night seats go to the person with the fewest nights so far, breaking
/// ties toward people already deep into their week (they must bank their
/// rest day while they still can); other seats go to the person furthest
/// below their weekly target. Both rankings carry a small seeded jitter
/// so distinct seeds explore distinct ties.
fn construct(model: &PairModel, roster: &mut Roster, rng: &mut SmallRng) {
    for (slot_id, slot) in model.slots().iter().enumerate() {
        for seat in 0..slot.arity() as usize {
            let seatmate_contractor = (0..slot.arity() as usize)
                .filter(|&s| s != seat)
                .filter_map(|s| roster.occupant(slot_id, s))
                .any(|q| model.team[q].is_contractor);

            let candidate = (0..model.team.len())
                .filter(|&p| model.eligible(roster, p, slot))
                .min_by_key(|&p| rank(model, roster, p, slot, seatmate_contractor, rng));

            if let Some(p) = candidate {
                model.assign(roster, slot_id, seat, p);
            }
        }
    }
}

/// Construction ranking; lower is better.
fn rank(
    model: &PairModel,
    roster: &Roster,
    p: usize,
    slot: &Slot,
    seatmate_contractor: bool,
    rng: &mut SmallRng,
) -> (i64, i64) {
    let person = &model.team[p];
    let jitter = rng.random_range(0..8i64);

    let mut key = if slot.shift == Shift::Night {
        let nights = roster.count_shift(p, Shift::Night) as i64;
        let worked = roster.worked_in_week(p, slot.week) as i64;
        let preference = if person.prefers_night { -1 } else { 0 };
        16 * nights + preference - worked
    } else {
        let remaining = model.weekly_target(p, slot.week) as i64
            - roster.worked_in_week(p, slot.week) as i64;
        -remaining
    };

    // Soft avoidance, strong enough to lose every tie but still usable
    // when nobody else is eligible.
    if slot.shift == Shift::Evening && person.no_evening {
        key += 1_000;
    }
    if seatmate_contractor && person.is_contractor {
        key += 1_000;
    }

    (key, jitter)
}

/// Steepest-descent sweeps over two move kinds.
///
/// Replacement: re-seat one slot with a different eligible person (or fill
/// a vacancy). Exchange: swap the occupants of two seats when both remain
/// eligible cross-wise — this is what untangles weekly-cap deadlocks that
/// single replacements cannot reach (everyone at their cap, but on the
/// wrong days). The first strictly improving change is kept. Sweeps repeat
/// until one passes with no improvement, the deadline expires, or
/// cancellation is observed. Vacancies are never created by a move, only
/// inherited from construction.
fn improve(model: &PairModel, roster: &mut Roster, deadline: &Deadline) -> (CostBreakdown, u32) {
    let mut best = model.evaluate(roster);
    let mut sweeps = 0u32;
    let mut improved = true;

    'outer: while improved && !deadline.should_stop() {
        improved = false;
        sweeps += 1;

        // Replacement and fill moves.
        for (slot_id, slot) in model.slots().iter().enumerate() {
            if deadline.should_stop() {
                break 'outer;
            }
            for seat in 0..slot.arity() as usize {
                let incumbent = roster.occupant(slot_id, seat);
                if let Some(p) = incumbent {
                    model.unassign(roster, slot_id, seat);
                    match try_candidates(model, roster, slot_id, slot, seat, &best, Some(p)) {
                        Some(cost) => {
                            best = cost;
                            improved = true;
                        }
                        None => model.assign(roster, slot_id, seat, p),
                    }
                } else if let Some(cost) =
                    try_candidates(model, roster, slot_id, slot, seat, &best, None)
                {
                    best = cost;
                    improved = true;
                }
            }
        }

        // Exchange moves.
        let n_slots = model.slots().len();
        for s1 in 0..n_slots {
            for s2 in (s1 + 1)..n_slots {
                if deadline.should_stop() {
                    break 'outer;
                }
                for seat1 in 0..model.slots()[s1].arity() as usize {
                    for seat2 in 0..model.slots()[s2].arity() as usize {
                        if let Some(cost) =
                            try_exchange(model, roster, (s1, seat1), (s2, seat2), &best)
                        {
                            best = cost;
                            improved = true;
                        }
                    }
                }
            }
        }
    }

    (best, sweeps)
}

/// Tries every eligible person in an empty seat; keeps the first strict
/// improvement over `best` and reports its cost. `skip` excludes the seat's
/// previous occupant (re-seating them is a no-op).
fn try_candidates(
    model: &PairModel,
    roster: &mut Roster,
    slot_id: usize,
    slot: &Slot,
    seat: usize,
    best: &CostBreakdown,
    skip: Option<usize>,
) -> Option<CostBreakdown> {
    for q in 0..model.team.len() {
        if Some(q) == skip || !model.eligible(roster, q, slot) {
            continue;
        }
        model.assign(roster, slot_id, seat, q);
        let cost = model.evaluate(roster);
        if cost.total() < best.total() {
            return Some(cost);
        }
        model.unassign(roster, slot_id, seat);
    }
    None
}

/// Swaps the occupants of two seats if both directions stay hard-feasible
/// and the result strictly improves on `best`; restores the roster
/// otherwise.
fn try_exchange(
    model: &PairModel,
    roster: &mut Roster,
    (s1, seat1): (usize, usize),
    (s2, seat2): (usize, usize),
    best: &CostBreakdown,
) -> Option<CostBreakdown> {
    let p = roster.occupant(s1, seat1)?;
    let q = roster.occupant(s2, seat2)?;
    if p == q {
        return None;
    }
    let slot1 = model.slots()[s1];
    let slot2 = model.slots()[s2];

    model.unassign(roster, s1, seat1);
    model.unassign(roster, s2, seat2);

    if model.eligible(roster, q, &slot1) {
        model.assign(roster, s1, seat1, q);
        if model.eligible(roster, p, &slot2) {
            model.assign(roster, s2, seat2, p);
            let cost = model.evaluate(roster);
            if cost.total() < best.total() {
                return Some(cost);
            }
            model.unassign(roster, s2, seat2);
        }
        model.unassign(roster, s1, seat1);
    }

    model.assign(roster, s1, seat1, p);
    model.assign(roster, s2, seat2, q);
    None
}
