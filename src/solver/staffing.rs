//! Staffing derivation.
//!
//! Computes the per-week, per-day slot map from team capacity and the EDO
//! plan. Night coverage is constant (one pair per weekday); an Admin day
//! absorbs an odd person-day; the remaining capacity becomes Day/Evening
//! pairs spread round-robin across the week, Day slots before Evening
//! slots, so consecutive pairs land on different days.

use tracing::{debug, warn};

use crate::models::{DaySlots, EdoPlan, Person, StaffingPlan, Weekday};

/// Person-days consumed each week by the constant Night coverage
/// (5 weekdays, one pair each).
const NIGHT_PERSON_DAYS: u32 = 10;

/// Derives the staffing plan for the horizon.
///
/// Per week:
/// 1. person-days = Σ workdays_per_week − EDO recipients that week
/// 2. if odd, reserve one Admin solo on Monday and subtract 1
/// 3. reserve one Night pair per weekday (10 person-days)
/// 4. distribute the remainder as Day/Evening pairs, round-robin over
///    `(Day, Mon..Fri)` then `(Evening, Mon..Fri)`, cycling
pub fn derive_staffing(people: &[Person], weeks: u8, edo_plan: &EdoPlan) -> StaffingPlan {
    let total_workdays: u32 = people.iter().map(|p| p.workdays_per_week as u32).sum();
    let mut plan = StaffingPlan::new(weeks);

    for week in 1..=weeks {
        let edo_count = edo_plan.recipient_count(week) as u32;
        let person_days = total_workdays.saturating_sub(edo_count);

        let admin = if person_days % 2 == 1 { 1u8 } else { 0 };
        let after_admin = person_days - admin as u32;
        let remainder = after_admin.saturating_sub(NIGHT_PERSON_DAYS);
        let extra_pairs = (remainder / 2) as usize;

        // Sequence index i lands on day i % 5; the first full lap is Day,
        // the second Evening, then the cycle repeats.
        let mut day_pairs = [0u8; 5];
        let mut evening_pairs = [0u8; 5];
        for i in 0..extra_pairs {
            let day = i % 5;
            if (i / 5) % 2 == 0 {
                day_pairs[day] += 1;
            } else {
                evening_pairs[day] += 1;
            }
        }

        for (d, day) in Weekday::WEEKDAYS.into_iter().enumerate() {
            plan.set_day(
                week,
                day,
                DaySlots {
                    day_pairs: day_pairs[d],
                    evening_pairs: evening_pairs[d],
                    night_pairs: 1,
                    admin_solo: if d == 0 { admin } else { 0 },
                },
            );
        }

        let demand = plan.week_demand(week);
        debug!(week, person_days, demand, "staffing derived");
        if demand > person_days {
            warn!(
                week,
                shortfall = demand - person_days,
                "week is understaffed; vacancies expected"
            );
        }
    }

    plan
}
