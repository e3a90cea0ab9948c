//! EDO (earned day off) planning.
//!
//! Eligible people are grouped by workday cohort, each cohort is split in
//! half, and the halves alternate by week parity, so every eligible person
//! receives an EDO every other week. The plan fixes *who* gets an EDO in
//! which week; *which day* is either the person's fixed preference or left
//! to the solver, which must keep at least one day of that week free.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{EdoPlan, Person, SolveConfig};

/// Builds the EDO allocation for the horizon.
///
/// Within each workdays cohort, names are sorted and the first ⌈n/2⌉
/// receive EDO on odd weeks, the rest on even weeks. Over `W` weeks each
/// eligible person therefore receives ⌈W/2⌉ or ⌊W/2⌋ days.
///
/// Fixed days come from the per-person preference, falling back to
/// `config.edo_fixed_day_global`. With `edo_enabled` off, the plan is
/// empty and EDO-eligible people are scheduled like everyone else.
pub fn build_edo_plan(people: &[Person], config: &SolveConfig) -> EdoPlan {
    let mut plan = EdoPlan::default();
    if !config.edo_enabled {
        return plan;
    }

    // Group eligible people by workdays cohort.
    let mut groups: BTreeMap<u8, Vec<&str>> = BTreeMap::new();
    for p in people {
        if p.edo_eligible {
            groups
                .entry(p.workdays_per_week)
                .or_default()
                .push(&p.name);
        }
    }

    for (wd, mut names) in groups {
        names.sort_unstable();
        let half = names.len().div_ceil(2);
        let (first_half, second_half) = names.split_at(half);
        debug!(
            cohort = %format!("{wd}j"),
            first = first_half.len(),
            second = second_half.len(),
            "EDO cohort split"
        );

        for week in 1..=config.weeks {
            let recipients = if week % 2 == 1 { first_half } else { second_half };
            plan.recipients
                .entry(week)
                .or_default()
                .extend(recipients.iter().map(|n| n.to_string()));
        }
    }

    for p in people {
        if !p.edo_eligible {
            continue;
        }
        let fixed = p.edo_fixed_day.or(config.edo_fixed_day_global);
        if let Some(day) = fixed.filter(|d| d.is_weekday()) {
            plan.fixed.insert(p.name.clone(), day);
        }
    }

    debug!(
        total_days = plan.total_days(),
        weeks = config.weeks,
        "EDO plan built"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;

    fn eligible_team(n: usize) -> Vec<Person> {
        (0..n)
            .map(|i| {
                Person::new(format!("P{i:02}"))
                    .with_workdays(4)
                    .with_edo_eligible()
            })
            .collect()
    }

    #[test]
    fn test_halves_alternate_by_parity() {
        let team = eligible_team(8);
        let config = SolveConfig::default().with_weeks(4);
        let plan = build_edo_plan(&team, &config);

        assert_eq!(plan.recipient_count(1), 4);
        assert_eq!(plan.recipient_count(2), 4);
        // Odd and even weeks are disjoint.
        let odd = plan.recipients.get(&1).unwrap();
        let even = plan.recipients.get(&2).unwrap();
        assert!(odd.is_disjoint(even));
        // Parity repeats.
        assert_eq!(plan.recipients.get(&1), plan.recipients.get(&3));
        assert_eq!(plan.recipients.get(&2), plan.recipients.get(&4));
    }

    #[test]
    fn test_every_other_week_count() {
        let team = eligible_team(6);
        for weeks in [1u8, 2, 5, 8] {
            let config = SolveConfig::default().with_weeks(weeks);
            let plan = build_edo_plan(&team, &config);
            let lo = (weeks as u32) / 2;
            let hi = (weeks as u32).div_ceil(2);
            for p in &team {
                let got = plan.edo_weeks(&p.name);
                assert!(
                    got == lo || got == hi,
                    "{} got {got} EDO weeks over {weeks} weeks",
                    p.name
                );
            }
        }
    }

    #[test]
    fn test_odd_cohort_rounds_first_half_up() {
        let team = eligible_team(5);
        let config = SolveConfig::default().with_weeks(2);
        let plan = build_edo_plan(&team, &config);
        assert_eq!(plan.recipient_count(1), 3);
        assert_eq!(plan.recipient_count(2), 2);
    }

    #[test]
    fn test_ineligible_people_never_receive() {
        let mut team = eligible_team(2);
        team.push(Person::new("NoEdo").with_workdays(5));
        let config = SolveConfig::default().with_weeks(4);
        let plan = build_edo_plan(&team, &config);
        assert_eq!(plan.edo_weeks("NoEdo"), 0);
    }

    #[test]
    fn test_disabled_edo_yields_empty_plan() {
        let team = eligible_team(4);
        let config = SolveConfig::default().with_weeks(4).with_edo(false);
        let plan = build_edo_plan(&team, &config);
        assert_eq!(plan.total_days(), 0);
        assert!(plan.fixed.is_empty());
    }

    #[test]
    fn test_global_fixed_day_fills_unset_preferences() {
        let mut team = eligible_team(2);
        team[0].edo_fixed_day = Some(Weekday::Mon);
        let mut config = SolveConfig::default().with_weeks(2);
        config.edo_fixed_day_global = Some(Weekday::Fri);

        let plan = build_edo_plan(&team, &config);
        assert_eq!(plan.fixed_day("P00"), Some(Weekday::Mon));
        assert_eq!(plan.fixed_day("P01"), Some(Weekday::Fri));
    }

    #[test]
    fn test_cohorts_split_independently() {
        let mut team = eligible_team(4);
        team.extend(
            (0..4).map(|i| {
                Person::new(format!("Q{i}"))
                    .with_workdays(5)
                    .with_edo_eligible()
            }),
        );
        let config = SolveConfig::default().with_weeks(2);
        let plan = build_edo_plan(&team, &config);
        // Two from each cohort per week.
        assert_eq!(plan.recipient_count(1), 4);
        assert_eq!(plan.recipient_count(2), 4);
    }
}
