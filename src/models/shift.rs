//! Shift and weekday types.
//!
//! `Shift` is a closed variant set with exhaustive matching at every
//! consumption site. Hours, pair arity, and boundary codes live here so
//! the rest of the engine never hard-codes them.
//!
//! Boundary codes are single letters (`J`/`S`/`N`/`A`/`OFF`/`EDO`/`EDO*`);
//! day tokens are the French abbreviations (`Lun`..`Dim`), with English
//! `Mon`..`Sun` accepted on parse for interoperability.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Monday through Friday, in calendar order.
    pub const WEEKDAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Saturday and Sunday.
    pub const WEEKEND: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

    /// Zero-based index within the calendar week (Mon = 0 .. Sun = 6).
    pub fn index(self) -> usize {
        match self {
            Weekday::Mon => 0,
            Weekday::Tue => 1,
            Weekday::Wed => 2,
            Weekday::Thu => 3,
            Weekday::Fri => 4,
            Weekday::Sat => 5,
            Weekday::Sun => 6,
        }
    }

    /// The canonical (French) token for this day.
    pub fn token(self) -> &'static str {
        match self {
            Weekday::Mon => "Lun",
            Weekday::Tue => "Mar",
            Weekday::Wed => "Mer",
            Weekday::Thu => "Jeu",
            Weekday::Fri => "Ven",
            Weekday::Sat => "Sam",
            Weekday::Sun => "Dim",
        }
    }

    /// Parses a day token. French tokens are canonical; English three-letter
    /// tokens are accepted as well. Matching is case-insensitive.
    pub fn parse(token: &str) -> Option<Weekday> {
        match token.trim().to_ascii_lowercase().as_str() {
            "lun" | "mon" => Some(Weekday::Mon),
            "mar" | "tue" => Some(Weekday::Tue),
            "mer" | "wed" => Some(Weekday::Wed),
            "jeu" | "thu" => Some(Weekday::Thu),
            "ven" | "fri" => Some(Weekday::Fri),
            "sam" | "sat" => Some(Weekday::Sat),
            "dim" | "sun" => Some(Weekday::Sun),
            _ => None,
        }
    }

    /// The next weekday within the same week, or `None` after Friday.
    ///
    /// Deliberately does not wrap: the rest-after-night rule never crosses
    /// the weekday-week boundary.
    pub fn next_weekday(self) -> Option<Weekday> {
        match self {
            Weekday::Mon => Some(Weekday::Tue),
            Weekday::Tue => Some(Weekday::Wed),
            Weekday::Wed => Some(Weekday::Thu),
            Weekday::Thu => Some(Weekday::Fri),
            _ => None,
        }
    }

    /// Whether this is a Monday-to-Friday day.
    pub fn is_weekday(self) -> bool {
        self.index() < 5
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A shift kind.
///
/// Day/Evening/Night consume pair slots (two people); Admin consumes a
/// single slot; Off/Edo/EdoConflict consume none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shift {
    /// Day shift, 10h, pair.
    Day,
    /// Evening shift, 10h, pair.
    Evening,
    /// Night shift, 12h, pair.
    Night,
    /// Admin day, 8h, solo.
    Admin,
    /// Not working.
    Off,
    /// Earned day off.
    Edo,
    /// EDO granted on a different day than the requested fixed day.
    EdoConflict,
}

impl Shift {
    /// The pair shifts, in slot-enumeration order.
    pub const PAIR_SHIFTS: [Shift; 3] = [Shift::Day, Shift::Evening, Shift::Night];

    /// Every working shift kind.
    pub const WORKING: [Shift; 4] = [Shift::Day, Shift::Evening, Shift::Night, Shift::Admin];

    /// Hours contributed to the rolling-48h window.
    pub fn hours(self) -> u32 {
        match self {
            Shift::Day | Shift::Evening => 10,
            Shift::Night => 12,
            Shift::Admin => 8,
            Shift::Off | Shift::Edo | Shift::EdoConflict => 0,
        }
    }

    /// People per slot: 2 for pair shifts, 1 for Admin, 0 otherwise.
    pub fn arity(self) -> u8 {
        match self {
            Shift::Day | Shift::Evening | Shift::Night => 2,
            Shift::Admin => 1,
            Shift::Off | Shift::Edo | Shift::EdoConflict => 0,
        }
    }

    /// Whether this shift counts as a worked day.
    pub fn is_working(self) -> bool {
        self.arity() > 0
    }

    /// The boundary code for this shift.
    pub fn code(self) -> &'static str {
        match self {
            Shift::Day => "J",
            Shift::Evening => "S",
            Shift::Night => "N",
            Shift::Admin => "A",
            Shift::Off => "OFF",
            Shift::Edo => "EDO",
            Shift::EdoConflict => "EDO*",
        }
    }

    /// Parses a boundary code (case-insensitive).
    pub fn parse_code(code: &str) -> Option<Shift> {
        match code.trim().to_ascii_uppercase().as_str() {
            "J" => Some(Shift::Day),
            "S" => Some(Shift::Evening),
            "N" => Some(Shift::Night),
            "A" => Some(Shift::Admin),
            "OFF" => Some(Shift::Off),
            "EDO" => Some(Shift::Edo),
            "EDO*" => Some(Shift::EdoConflict),
            _ => None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A calendar position: week (1-based) and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarPosition {
    pub week: u8,
    pub day: Weekday,
}

impl CalendarPosition {
    pub fn new(week: u8, day: Weekday) -> Self {
        Self { week, day }
    }

    /// Zero-based index on the flat 7-days-per-week calendar timeline.
    pub fn timeline_index(self) -> usize {
        (self.week as usize - 1) * 7 + self.day.index()
    }
}

impl fmt::Display for CalendarPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{} {}", self.week, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_tokens_round_trip() {
        for d in Weekday::WEEKDAYS.into_iter().chain(Weekday::WEEKEND) {
            assert_eq!(Weekday::parse(d.token()), Some(d));
        }
    }

    #[test]
    fn test_weekday_english_tokens() {
        assert_eq!(Weekday::parse("Mon"), Some(Weekday::Mon));
        assert_eq!(Weekday::parse("sun"), Some(Weekday::Sun));
        assert_eq!(Weekday::parse("FRI"), Some(Weekday::Fri));
        assert_eq!(Weekday::parse("nonsense"), None);
    }

    #[test]
    fn test_next_weekday_stops_at_friday() {
        assert_eq!(Weekday::Mon.next_weekday(), Some(Weekday::Tue));
        assert_eq!(Weekday::Thu.next_weekday(), Some(Weekday::Fri));
        assert_eq!(Weekday::Fri.next_weekday(), None);
        assert_eq!(Weekday::Sat.next_weekday(), None);
    }

    #[test]
    fn test_shift_hours_and_arity() {
        assert_eq!(Shift::Day.hours(), 10);
        assert_eq!(Shift::Evening.hours(), 10);
        assert_eq!(Shift::Night.hours(), 12);
        assert_eq!(Shift::Admin.hours(), 8);
        assert_eq!(Shift::Off.hours(), 0);
        assert_eq!(Shift::Edo.hours(), 0);

        assert_eq!(Shift::Day.arity(), 2);
        assert_eq!(Shift::Admin.arity(), 1);
        assert_eq!(Shift::EdoConflict.arity(), 0);
    }

    #[test]
    fn test_shift_codes_round_trip() {
        for s in [
            Shift::Day,
            Shift::Evening,
            Shift::Night,
            Shift::Admin,
            Shift::Off,
            Shift::Edo,
            Shift::EdoConflict,
        ] {
            assert_eq!(Shift::parse_code(s.code()), Some(s));
        }
        assert_eq!(Shift::parse_code("edo*"), Some(Shift::EdoConflict));
        assert_eq!(Shift::parse_code("X"), None);
    }

    #[test]
    fn test_timeline_index() {
        assert_eq!(CalendarPosition::new(1, Weekday::Mon).timeline_index(), 0);
        assert_eq!(CalendarPosition::new(1, Weekday::Sun).timeline_index(), 6);
        assert_eq!(CalendarPosition::new(2, Weekday::Mon).timeline_index(), 7);
        assert_eq!(CalendarPosition::new(3, Weekday::Wed).timeline_index(), 16);
    }
}
