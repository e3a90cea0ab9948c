//! Solver configuration.
//!
//! `SolveConfig` drives the weekday engine; `WeekendConfig` drives the
//! independent weekend planner. Both validate their ranges up front so a
//! bad config is an input error, never a mid-solve surprise.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::InputError;

use super::Weekday;

/// How people are grouped into fairness cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FairnessCohorts {
    /// A single group.
    None,
    /// Group by `workdays_per_week`.
    #[default]
    ByWorkdays,
    /// Group by team tag (untagged people fall back to their workdays cohort).
    ByTeam,
}

/// Scope of a spread term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FairnessScope {
    /// Term disabled.
    Off,
    /// One group spanning the whole team.
    Global,
    /// One group per cohort.
    #[default]
    Cohort,
}

/// Absolute or proportional night fairness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NightFairnessMode {
    /// Spread of raw night counts.
    #[default]
    Count,
    /// Spread of nights per contractual workday, scaled to integer tenths.
    Rate,
}

/// Inter-team night-share fairness term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterTeamNightShare {
    /// Term disabled.
    Off,
    /// Team targets proportional to summed workdays.
    #[default]
    Proportional,
    /// Team targets proportional to headcount.
    Global,
}

/// Configuration for the weekday solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Horizon length, 1..=24 weeks.
    pub weeks: u8,
    /// Multi-restart attempts, 1..=50.
    pub tries: u32,
    /// Base RNG seed. 0 means: draw one from OS entropy.
    pub seed: u64,
    /// Per-attempt wall-clock budget.
    pub time_limit_seconds: u64,
    /// Enforce the rest day after a night shift.
    pub rest_after_night: bool,
    /// Enable the EDO machinery. When off, EDO-eligible people are treated
    /// like everyone else and no EDO days are granted.
    pub edo_enabled: bool,
    /// Global fixed EDO day, used where the per-person preference is unset.
    pub edo_fixed_day_global: Option<Weekday>,
    /// Cohort definition for fairness terms.
    pub fairness_cohorts: FairnessCohorts,
    /// Scope of the night spread term.
    pub night_fairness: FairnessScope,
    /// Absolute counts or workday-proportional rates for night spread.
    pub night_fairness_mode: NightFairnessMode,
    /// Scope of the evening spread term.
    pub evening_fairness: FairnessScope,
    /// Extra fairness term on per-team night totals.
    pub inter_team_night_share: InterTeamNightShare,
    /// Maximum consecutive nights per person, counted on the flattened
    /// weekday timeline (applies across week boundaries).
    pub max_nights_sequence: u32,
    /// Maximum consecutive worked days per person. Runs are broken by the
    /// free weekend, so values of five or more never bind on a weekday
    /// rotation.
    pub max_consecutive_days: u32,
    /// Local-swap budget of the post-rebalancer; 0 disables it.
    pub post_rebalance_steps: u32,
    /// Elevate staffing deficits from soft to hard: any unfilled slot
    /// makes the attempt infeasible.
    pub impose_targets: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            weeks: 4,
            tries: 2,
            seed: 0,
            time_limit_seconds: 30,
            rest_after_night: true,
            edo_enabled: true,
            edo_fixed_day_global: None,
            fairness_cohorts: FairnessCohorts::ByWorkdays,
            night_fairness: FairnessScope::Cohort,
            night_fairness_mode: NightFairnessMode::Count,
            evening_fairness: FairnessScope::Cohort,
            inter_team_night_share: InterTeamNightShare::Proportional,
            max_nights_sequence: 3,
            max_consecutive_days: 6,
            post_rebalance_steps: 200,
            impose_targets: false,
        }
    }
}

impl SolveConfig {
    /// Sets the horizon length.
    pub fn with_weeks(mut self, weeks: u8) -> Self {
        self.weeks = weeks;
        self
    }

    /// Sets the number of restart attempts.
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the per-attempt time budget.
    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.time_limit_seconds = seconds;
        self
    }

    /// Enables or disables rest-after-night.
    pub fn with_rest_after_night(mut self, on: bool) -> Self {
        self.rest_after_night = on;
        self
    }

    /// Enables or disables the EDO machinery.
    pub fn with_edo(mut self, on: bool) -> Self {
        self.edo_enabled = on;
        self
    }

    /// Sets the rebalancer step budget.
    pub fn with_post_rebalance_steps(mut self, steps: u32) -> Self {
        self.post_rebalance_steps = steps;
        self
    }

    /// Checks documented option ranges.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.weeks == 0 || self.weeks > 24 {
            return Err(InputError::ConfigOutOfRange {
                field: "weeks",
                value: self.weeks.to_string(),
                range: "1..=24",
            });
        }
        if self.tries == 0 || self.tries > 50 {
            return Err(InputError::ConfigOutOfRange {
                field: "tries",
                value: self.tries.to_string(),
                range: "1..=50",
            });
        }
        if self.time_limit_seconds == 0 {
            return Err(InputError::ConfigOutOfRange {
                field: "time_limit_seconds",
                value: "0".into(),
                range: ">= 1",
            });
        }
        if self.max_consecutive_days == 0 {
            return Err(InputError::ConfigOutOfRange {
                field: "max_consecutive_days",
                value: "0".into(),
                range: ">= 1",
            });
        }
        // A night run is a worked-day run, so the tighter limit wins.
        if self.max_nights_sequence > self.max_consecutive_days {
            return Err(InputError::ConfigOutOfRange {
                field: "max_nights_sequence",
                value: self.max_nights_sequence.to_string(),
                range: "<= max_consecutive_days",
            });
        }
        if let Some(d) = self.edo_fixed_day_global {
            if !d.is_weekday() {
                return Err(InputError::ConfigOutOfRange {
                    field: "edo_fixed_day_global",
                    value: d.token().into(),
                    range: "Lun..Ven",
                });
            }
        }
        Ok(())
    }
}

/// Configuration for the weekend planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendConfig {
    /// Horizon length, 1..=24 weeks.
    pub weeks: u8,
    /// RNG seed. 0 means: draw one from OS entropy.
    pub seed: u64,
    /// Wall-clock budget.
    pub time_limit_seconds: u64,
    /// Saturday Night forbids Sunday Day.
    pub rest_after_saturday_night: bool,
    /// Saturday Night forbids Sunday Night.
    pub forbid_consecutive_nights: bool,
    /// Cap on worked weekends, expressed per month (4 weeks).
    pub max_weekends_per_month: Option<u8>,
    /// People who work Friday Night in the weekday plan, per week.
    /// When provided, they are barred from Saturday Day that week.
    /// Empty by default: the weekend plan is decoupled from the weekday plan.
    pub friday_night_workers: BTreeMap<u8, BTreeSet<String>>,
}

impl Default for WeekendConfig {
    fn default() -> Self {
        Self {
            weeks: 4,
            seed: 0,
            time_limit_seconds: 30,
            rest_after_saturday_night: true,
            forbid_consecutive_nights: true,
            max_weekends_per_month: Some(2),
            friday_night_workers: BTreeMap::new(),
        }
    }
}

impl WeekendConfig {
    /// Sets the horizon length.
    pub fn with_weeks(mut self, weeks: u8) -> Self {
        self.weeks = weeks;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks documented option ranges.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.weeks == 0 || self.weeks > 24 {
            return Err(InputError::ConfigOutOfRange {
                field: "weeks",
                value: self.weeks.to_string(),
                range: "1..=24",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolveConfig::default().validate().is_ok());
        assert!(WeekendConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weeks_range() {
        assert!(SolveConfig::default().with_weeks(0).validate().is_err());
        assert!(SolveConfig::default().with_weeks(25).validate().is_err());
        assert!(SolveConfig::default().with_weeks(24).validate().is_ok());
    }

    #[test]
    fn test_tries_range() {
        assert!(SolveConfig::default().with_tries(0).validate().is_err());
        assert!(SolveConfig::default().with_tries(51).validate().is_err());
        assert!(SolveConfig::default().with_tries(50).validate().is_ok());
    }

    #[test]
    fn test_night_sequence_cannot_exceed_consecutive_days() {
        let mut cfg = SolveConfig::default();
        cfg.max_consecutive_days = 2;
        assert!(cfg.validate().is_err());
        cfg.max_nights_sequence = 2;
        assert!(cfg.validate().is_ok());
        cfg.max_consecutive_days = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_global_edo_day_must_be_weekday() {
        let mut cfg = SolveConfig::default();
        cfg.edo_fixed_day_global = Some(Weekday::Sat);
        assert!(cfg.validate().is_err());
        cfg.edo_fixed_day_global = Some(Weekday::Wed);
        assert!(cfg.validate().is_ok());
    }
}
