//! Schedule scoring.
//!
//! Reduces a [`Diagnostics`] record to a scalar cost; lower is better.
//! The weights track the search objective so the post-hoc score and the
//! model agree up to the pair-channelling terms.

use serde::{Deserialize, Serialize};

use super::validate::Diagnostics;

/// Score weights. Mirrors the soft-objective table of the pair model.
pub const W_VACANT: f64 = 10.0;
pub const W_DUPLICATE: f64 = 5.0;
pub const W_NIGHT_THEN_WORK: f64 = 3.0;
pub const W_EVENING_TO_DAY: f64 = 1.0;
pub const W_WEEKLY_MISS: f64 = 2.0;
pub const W_HORIZON_MISS: f64 = 2.0;
pub const W_ROLLING_48H: f64 = 100.0;
pub const W_NIGHT_STDDEV: f64 = 10.0;
pub const W_EVENING_STDDEV: f64 = 3.0;

/// Weighted component values, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub vacant: f64,
    pub duplicates: f64,
    pub night_then_work: f64,
    pub evening_to_day: f64,
    pub weekly_misses: f64,
    pub horizon_misses: f64,
    pub rolling_48h: f64,
    pub night_stddev: f64,
    pub evening_stddev: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.vacant
            + self.duplicates
            + self.night_then_work
            + self.evening_to_day
            + self.weekly_misses
            + self.horizon_misses
            + self.rolling_48h
            + self.night_stddev
            + self.evening_stddev
    }
}

/// Scores a validation record. Lower is better; zero means no penalty.
pub fn score(diag: &Diagnostics) -> f64 {
    score_breakdown(diag).total()
}

/// Scores a validation record, keeping the per-term contributions.
pub fn score_breakdown(diag: &Diagnostics) -> ScoreBreakdown {
    ScoreBreakdown {
        vacant: W_VACANT * diag.vacant_slots as f64,
        duplicates: W_DUPLICATE * diag.duplicates_per_day as f64,
        night_then_work: W_NIGHT_THEN_WORK * diag.night_then_work as f64,
        evening_to_day: W_EVENING_TO_DAY * diag.evening_to_day as f64,
        weekly_misses: W_WEEKLY_MISS * diag.weekly_misses as f64,
        horizon_misses: W_HORIZON_MISS * diag.horizon_misses as f64,
        rolling_48h: W_ROLLING_48H * diag.rolling_48h_violations as f64,
        night_stddev: W_NIGHT_STDDEV * diag.night_stddev_total(),
        evening_stddev: W_EVENING_STDDEV * diag.evening_stddev_total(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_schedule_scores_zero() {
        let diag = Diagnostics::default();
        assert_eq!(score(&diag), 0.0);
    }

    #[test]
    fn test_weights_applied() {
        let diag = Diagnostics {
            vacant_slots: 2,
            duplicates_per_day: 1,
            night_then_work: 1,
            evening_to_day: 3,
            weekly_misses: 2,
            horizon_misses: 1,
            rolling_48h_violations: 1,
            ..Default::default()
        };
        // 20 + 5 + 3 + 3 + 4 + 2 + 100 = 137
        assert_eq!(score(&diag), 137.0);
    }

    #[test]
    fn test_stddev_terms() {
        let mut diag = Diagnostics::default();
        diag.per_cohort_night_stddev.insert("4j".into(), 0.5);
        diag.per_cohort_night_stddev.insert("5j".into(), 0.5);
        diag.per_cohort_evening_stddev.insert("4j".into(), 1.0);
        // 10 * (0.5 + 0.5) + 3 * 1.0
        assert!((score(&diag) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_total_matches_score() {
        let diag = Diagnostics {
            vacant_slots: 1,
            rolling_48h_violations: 2,
            ..Default::default()
        };
        let breakdown = score_breakdown(&diag);
        assert_eq!(breakdown.total(), score(&diag));
        assert_eq!(breakdown.vacant, 10.0);
        assert_eq!(breakdown.rolling_48h, 200.0);
    }
}
