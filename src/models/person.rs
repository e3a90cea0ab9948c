//! Person model.
//!
//! A team member with their contractual and preference attributes.
//! Immutable after ingestion; the engine never mutates people.

use serde::{Deserialize, Serialize};

use super::Weekday;

/// A team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier within the team. Non-empty.
    pub name: String,
    /// Contractual workdays per week, 0..=5.
    pub workdays_per_week: u8,
    /// Prefers night shifts (small objective bonus per night).
    pub prefers_night: bool,
    /// Should not be assigned evening shifts (soft).
    pub no_evening: bool,
    /// Cap on nights over the horizon. `None` = unlimited.
    pub max_nights: Option<u32>,
    /// Eligible for the earned-day-off rotation.
    pub edo_eligible: bool,
    /// Preferred fixed EDO day, Monday..Friday.
    pub edo_fixed_day: Option<Weekday>,
    /// Team tag for cohort grouping and inter-team fairness.
    pub team: Option<String>,
    /// External contractor. Contractors are not paired together.
    pub is_contractor: bool,
    /// Available for the weekend planner.
    pub available_weekends: bool,
}

impl Person {
    /// Creates a person with the given name and full-time defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workdays_per_week: 5,
            prefers_night: false,
            no_evening: false,
            max_nights: None,
            edo_eligible: false,
            edo_fixed_day: None,
            team: None,
            is_contractor: false,
            available_weekends: true,
        }
    }

    /// Sets the weekly workday target.
    pub fn with_workdays(mut self, workdays_per_week: u8) -> Self {
        self.workdays_per_week = workdays_per_week;
        self
    }

    /// Marks a night preference.
    pub fn with_prefers_night(mut self) -> Self {
        self.prefers_night = true;
        self
    }

    /// Marks an evening exclusion.
    pub fn with_no_evening(mut self) -> Self {
        self.no_evening = true;
        self
    }

    /// Caps nights over the horizon.
    pub fn with_max_nights(mut self, max_nights: u32) -> Self {
        self.max_nights = Some(max_nights);
        self
    }

    /// Enters the EDO rotation.
    pub fn with_edo_eligible(mut self) -> Self {
        self.edo_eligible = true;
        self
    }

    /// Sets the preferred fixed EDO day.
    pub fn with_edo_fixed_day(mut self, day: Weekday) -> Self {
        self.edo_fixed_day = Some(day);
        self
    }

    /// Sets the team tag.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Marks the person as an external contractor.
    pub fn with_contractor(mut self) -> Self {
        self.is_contractor = true;
        self
    }

    /// Removes the person from the weekend pool.
    pub fn without_weekends(mut self) -> Self {
        self.available_weekends = false;
        self
    }

    /// Cohort key when grouping by workdays (e.g. `"4j"`).
    pub fn workdays_cohort(&self) -> String {
        format!("{}j", self.workdays_per_week)
    }

    /// Cohort key when grouping by team; falls back to the workdays cohort
    /// for people without a team tag.
    pub fn team_cohort(&self) -> String {
        match &self.team {
            Some(t) if !t.is_empty() => t.clone(),
            _ => self.workdays_cohort(),
        }
    }

    /// The effective night cap, saturating to `u32::MAX` when unlimited.
    pub fn night_cap(&self) -> u32 {
        self.max_nights.unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_builder() {
        let p = Person::new("Alice")
            .with_workdays(4)
            .with_prefers_night()
            .with_max_nights(6)
            .with_edo_eligible()
            .with_edo_fixed_day(Weekday::Wed)
            .with_team("bloc-a");

        assert_eq!(p.name, "Alice");
        assert_eq!(p.workdays_per_week, 4);
        assert!(p.prefers_night);
        assert!(!p.no_evening);
        assert_eq!(p.max_nights, Some(6));
        assert!(p.edo_eligible);
        assert_eq!(p.edo_fixed_day, Some(Weekday::Wed));
        assert_eq!(p.team.as_deref(), Some("bloc-a"));
        assert!(p.available_weekends);
    }

    #[test]
    fn test_cohort_keys() {
        let p = Person::new("A").with_workdays(4);
        assert_eq!(p.workdays_cohort(), "4j");
        assert_eq!(p.team_cohort(), "4j");

        let q = Person::new("B").with_workdays(5).with_team("bloc-b");
        assert_eq!(q.team_cohort(), "bloc-b");
    }

    #[test]
    fn test_night_cap_defaults_unlimited() {
        assert_eq!(Person::new("A").night_cap(), u32::MAX);
        assert_eq!(Person::new("A").with_max_nights(3).night_cap(), 3);
    }
}
