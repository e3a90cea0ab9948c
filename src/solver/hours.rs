//! Rolling-48h window arithmetic.
//!
//! The labour rule caps hours at 48 over any 7 consecutive calendar days.
//! The window slides through weekends, which contribute 0 hours, and never
//! wraps past the end of the horizon.
//!
//! One routine backs both the search objective and the validator, so the
//! two can never disagree on what counts as a violation. The flat-timeline
//! formulation replaces an older per-week modulo indexing that miscounted
//! windows starting mid-week.

use crate::models::{CalendarPosition, Shift, Weekday};

/// Hours allowed in any 7-day window.
pub const MAX_ROLLING_HOURS: u32 = 48;

/// Window length in calendar days.
pub const WINDOW_DAYS: usize = 7;

/// A window exceeding the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowExcess {
    /// Timeline index of the window's first day.
    pub start: usize,
    /// Hours above the cap.
    pub hours_over: u32,
}

/// Builds the flat per-person calendar timeline of length `7 * weeks`.
///
/// Weekday entries hold the shift's hours; weekend entries hold 0.
pub fn weekday_timeline(weeks: u8, shift_at: impl Fn(u8, Weekday) -> Shift) -> Vec<u32> {
    let mut timeline = vec![0u32; weeks as usize * 7];
    for week in 1..=weeks {
        for day in Weekday::WEEKDAYS {
            let idx = CalendarPosition::new(week, day).timeline_index();
            timeline[idx] = shift_at(week, day).hours();
        }
    }
    timeline
}

/// Slides a 7-day window over the timeline and reports every window whose
/// total exceeds [`MAX_ROLLING_HOURS`].
pub fn rolling_excess(timeline: &[u32]) -> Vec<WindowExcess> {
    if timeline.len() < WINDOW_DAYS {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut sum: u32 = timeline[..WINDOW_DAYS].iter().sum();
    for start in 0..=(timeline.len() - WINDOW_DAYS) {
        if start > 0 {
            sum = sum - timeline[start - 1] + timeline[start + WINDOW_DAYS - 1];
        }
        if sum > MAX_ROLLING_HOURS {
            out.push(WindowExcess {
                start,
                hours_over: sum - MAX_ROLLING_HOURS,
            });
        }
    }
    out
}

/// Total excess hours across all violating windows.
pub fn total_excess_hours(timeline: &[u32]) -> u32 {
    rolling_excess(timeline).iter().map(|w| w.hours_over).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_nights_exactly_48h_is_clean() {
        // Night = 12h, Mon..Thu.
        let mut timeline = vec![0u32; 14];
        for d in 0..4 {
            timeline[d] = 12;
        }
        assert!(rolling_excess(&timeline).is_empty());
        assert_eq!(total_excess_hours(&timeline), 0);
    }

    #[test]
    fn test_fifth_night_overflows_the_monday_window() {
        // Night Mon..Fri: 60h in the window starting Monday. The window
        // starting Tuesday holds 4 nights = 48h, which is still legal.
        let mut timeline = vec![0u32; 14];
        for d in 0..5 {
            timeline[d] = 12;
        }
        let excess = rolling_excess(&timeline);
        assert_eq!(excess.len(), 1);
        assert_eq!(excess[0].start, 0);
        assert_eq!(excess[0].hours_over, 12);
    }

    #[test]
    fn test_window_slides_through_the_weekend() {
        // 10h Thu + Fri of week 1 and Mon..Wed of week 2: the window
        // starting Thursday spans the weekend and totals 50h.
        let mut timeline = vec![0u32; 14];
        timeline[3] = 10;
        timeline[4] = 10;
        timeline[7] = 10;
        timeline[8] = 10;
        timeline[9] = 10;
        let excess = rolling_excess(&timeline);
        assert_eq!(excess.len(), 1);
        assert_eq!(excess[0].start, 3);
        assert_eq!(excess[0].hours_over, 2);
    }

    #[test]
    fn test_windows_starting_mid_week_are_counted() {
        // The legacy modulo indexing missed these: violation only visible
        // from a Wednesday start.
        let mut timeline = vec![0u32; 14];
        timeline[2] = 12; // Wed
        timeline[3] = 12; // Thu
        timeline[4] = 12; // Fri
        timeline[7] = 12; // Mon
        timeline[8] = 12; // Tue
        let excess = rolling_excess(&timeline);
        assert_eq!(excess.len(), 1);
        assert_eq!(excess[0].start, 2);
        assert_eq!(excess[0].hours_over, 12);
    }

    #[test]
    fn test_short_timeline_has_no_windows() {
        assert!(rolling_excess(&[12; 6]).is_empty());
    }

    #[test]
    fn test_timeline_builder_zeroes_weekends() {
        let timeline = weekday_timeline(2, |_, _| Shift::Day);
        assert_eq!(timeline.len(), 14);
        assert_eq!(timeline[0], 10); // Mon
        assert_eq!(timeline[4], 10); // Fri
        assert_eq!(timeline[5], 0); // Sat
        assert_eq!(timeline[6], 0); // Sun
        assert_eq!(timeline[7], 10); // Mon week 2
    }
}
