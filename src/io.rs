//! CSV boundary.
//!
//! Team rosters come in as CSV with a required `name` column; numeric and
//! boolean cells that fail to parse are loud, typed errors carrying the
//! row index and the offending value — never a silent fallback. Schedules
//! go out (and come back) in long form, one row per person-day, using the
//! boundary shift codes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::InputError;
use crate::models::{Person, Schedule, Shift, SlotAssignment, Weekday};

/// Column order for team CSV output.
const TEAM_COLUMNS: [&str; 11] = [
    "name",
    "workdays_per_week",
    "weeks_pattern",
    "prefers_night",
    "no_evening",
    "max_nights",
    "edo_eligible",
    "edo_fixed_day",
    "team",
    "available_weekends",
    "is_contractor",
];

/// Reads a team from CSV.
///
/// Required column: `name`. Recognised numeric/boolean columns:
/// `workdays_per_week`, `weeks_pattern`, `prefers_night`, `no_evening`,
/// `max_nights`, `edo_eligible`, `is_contractor`, `available_weekends`;
/// optional strings `edo_fixed_day` (Lun..Ven) and `team`. Booleans are
/// 0/1 (true/false accepted). Empty cells take the field default;
/// anything else that fails to parse is an error with its row index.
/// `weeks_pattern` is validated but not retained.
pub fn read_team<R: Read>(reader: R) -> Result<Vec<Person>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| InputError::Csv(e.to_string()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let name_col = column("name").ok_or_else(|| InputError::MissingColumn("name".into()))?;

    let mut people = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (i, record) in csv_reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| InputError::Csv(e.to_string()))?;
        let cell = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("").trim();

        let name = cell(Some(name_col)).to_string();
        if name.is_empty() {
            return Err(InputError::EmptyName { row });
        }
        if !seen.insert(name.clone()) {
            return Err(InputError::DuplicateName(name));
        }

        let workdays = parse_int(cell(column("workdays_per_week")), 5, row, "workdays_per_week")?;
        if !(0..=5).contains(&workdays) {
            return Err(InputError::WorkdaysOutOfRange {
                name,
                value: workdays,
            });
        }
        // Pattern cycles are not part of the engine; the column is still
        // checked so a bad cell fails loudly.
        let pattern = parse_int(cell(column("weeks_pattern")), 1, row, "weeks_pattern")?;
        if pattern < 1 {
            return Err(InputError::BadToken {
                row,
                column: "weeks_pattern".into(),
                value: pattern.to_string(),
            });
        }

        let max_nights = match cell(column("max_nights")) {
            "" => None,
            value => Some(parse_int(value, 0, row, "max_nights")? as u32),
        };
        let edo_fixed_day = match cell(column("edo_fixed_day")) {
            "" => None,
            value => Some(Weekday::parse(value).ok_or_else(|| InputError::UnknownDay {
                row,
                value: value.to_string(),
            })?),
        };
        let team = match cell(column("team")) {
            "" => None,
            value => Some(value.to_string()),
        };

        people.push(Person {
            name,
            workdays_per_week: workdays as u8,
            prefers_night: parse_bool(cell(column("prefers_night")), false, row, "prefers_night")?,
            no_evening: parse_bool(cell(column("no_evening")), false, row, "no_evening")?,
            max_nights,
            edo_eligible: parse_bool(cell(column("edo_eligible")), false, row, "edo_eligible")?,
            edo_fixed_day,
            team,
            is_contractor: parse_bool(cell(column("is_contractor")), false, row, "is_contractor")?,
            available_weekends: parse_bool(
                cell(column("available_weekends")),
                true,
                row,
                "available_weekends",
            )?,
        });
    }

    Ok(people)
}

/// Reads a team from a CSV file.
pub fn load_team_csv(path: impl AsRef<Path>) -> Result<Vec<Person>, InputError> {
    let file = File::open(path.as_ref()).map_err(|e| InputError::Csv(e.to_string()))?;
    read_team(file)
}

/// Writes a team as CSV, booleans encoded 0/1.
pub fn write_team<W: Write>(people: &[Person], writer: W) -> Result<(), InputError> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(TEAM_COLUMNS)
        .map_err(|e| InputError::Csv(e.to_string()))?;
    for p in people {
        let workdays = p.workdays_per_week.to_string();
        let max_nights = p.max_nights.map(|n| n.to_string()).unwrap_or_default();
        w.write_record([
            p.name.as_str(),
            workdays.as_str(),
            "1",
            bool01(p.prefers_night),
            bool01(p.no_evening),
            max_nights.as_str(),
            bool01(p.edo_eligible),
            p.edo_fixed_day.map(|d| d.token()).unwrap_or(""),
            p.team.as_deref().unwrap_or(""),
            bool01(p.available_weekends),
            bool01(p.is_contractor),
        ])
        .map_err(|e| InputError::Csv(e.to_string()))?;
    }
    w.flush().map_err(|e| InputError::Csv(e.to_string()))?;
    Ok(())
}

/// Serialises a schedule to long-form CSV: one row per person-day, with
/// `slot` filled on working rows and empty on Off/EDO rows.
pub fn schedule_to_csv(schedule: &Schedule) -> Result<String, InputError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["name", "week", "day", "shift", "slot"])
        .map_err(|e| InputError::Csv(e.to_string()))?;

    for a in &schedule.assignments {
        let week = a.week.to_string();
        let slot = a.slot_idx.to_string();
        for name in &a.people {
            w.write_record([
                name.as_str(),
                week.as_str(),
                a.day.token(),
                a.shift.code(),
                slot.as_str(),
            ])
            .map_err(|e| InputError::Csv(e.to_string()))?;
        }
    }
    for ((name, week, day), shift) in schedule.matrix() {
        if !shift.is_working() {
            let week = week.to_string();
            w.write_record([name.as_str(), week.as_str(), day.token(), shift.code(), ""])
                .map_err(|e| InputError::Csv(e.to_string()))?;
        }
    }

    let bytes = w
        .into_inner()
        .map_err(|e| InputError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| InputError::Csv(e.to_string()))
}

/// Parses a schedule previously written by [`schedule_to_csv`].
///
/// Rebuilds the slot assignments and the decorated person-day matrix.
/// The computed plans are not part of the serialised form.
pub fn schedule_from_csv<R: Read>(reader: R) -> Result<Schedule, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut matrix: BTreeMap<(String, u8, Weekday), Shift> = BTreeMap::new();
    let mut slots: BTreeMap<(u8, Weekday, Shift, u8), Vec<String>> = BTreeMap::new();
    let mut weeks = 0u8;

    for (i, record) in csv_reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| InputError::Csv(e.to_string()))?;
        let field = |idx: usize, column: &str| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| InputError::BadToken {
                    row,
                    column: column.into(),
                    value: String::new(),
                })
        };

        let name = field(0, "name")?.to_string();
        let week = parse_int(field(1, "week")?, 0, row, "week")? as u8;
        let day_token = field(2, "day")?;
        let day = Weekday::parse(day_token).ok_or_else(|| InputError::UnknownDay {
            row,
            value: day_token.to_string(),
        })?;
        let shift_code = field(3, "shift")?;
        let shift = Shift::parse_code(shift_code).ok_or_else(|| InputError::BadToken {
            row,
            column: "shift".into(),
            value: shift_code.to_string(),
        })?;

        weeks = weeks.max(week);
        matrix.insert((name.clone(), week, day), shift);

        if shift.is_working() {
            let slot_idx = parse_int(field(4, "slot")?, 0, row, "slot")? as u8;
            slots
                .entry((week, day, shift, slot_idx))
                .or_default()
                .push(name);
        }
    }

    let assignments = slots
        .into_iter()
        .map(|((week, day, shift, slot_idx), people)| SlotAssignment {
            week,
            day,
            shift,
            slot_idx,
            people,
        })
        .collect();

    Ok(Schedule::from_parts(weeks, assignments, matrix, 0))
}

fn bool01(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_int(value: &str, default: i64, row: usize, column: &str) -> Result<i64, InputError> {
    if value.is_empty() {
        return Ok(default);
    }
    value.parse().map_err(|_| InputError::BadToken {
        row,
        column: column.into(),
        value: value.to_string(),
    })
}

fn parse_bool(value: &str, default: bool, row: usize, column: &str) -> Result<bool, InputError> {
    match value.to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(InputError::BadToken {
            row,
            column: column.into(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdoPlan, StaffingPlan};

    const SAMPLE: &str = "\
name,workdays_per_week,prefers_night,no_evening,edo_eligible,is_contractor,available_weekends,max_nights,edo_fixed_day,team
Alice,4,1,0,1,0,1,6,Mer,bloc-a
Bob,5,0,1,0,1,0,,,
";

    #[test]
    fn test_read_team() {
        let people = read_team(SAMPLE.as_bytes()).unwrap();
        assert_eq!(people.len(), 2);

        let alice = &people[0];
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.workdays_per_week, 4);
        assert!(alice.prefers_night);
        assert!(alice.edo_eligible);
        assert_eq!(alice.max_nights, Some(6));
        assert_eq!(alice.edo_fixed_day, Some(Weekday::Wed));
        assert_eq!(alice.team.as_deref(), Some("bloc-a"));

        let bob = &people[1];
        assert!(bob.no_evening);
        assert!(bob.is_contractor);
        assert!(!bob.available_weekends);
        assert_eq!(bob.max_nights, None);
        assert_eq!(bob.edo_fixed_day, None);
    }

    #[test]
    fn test_load_team_csv_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let people = load_team_csv(&path).unwrap();
        assert_eq!(people.len(), 2);
    }

    #[test]
    fn test_missing_name_column() {
        let err = read_team("person,workdays_per_week\nAlice,4\n".as_bytes()).unwrap_err();
        assert_eq!(err, InputError::MissingColumn("name".into()));
    }

    #[test]
    fn test_bad_numeric_token_fails_loudly() {
        let csv = "name,workdays_per_week\nAlice,quatre\n";
        let err = read_team(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            InputError::BadToken {
                row: 1,
                column: "workdays_per_week".into(),
                value: "quatre".into(),
            }
        );
    }

    #[test]
    fn test_bad_boolean_token_fails_loudly() {
        let csv = "name,prefers_night\nAlice,maybe\n";
        let err = read_team(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::BadToken { row: 1, .. }));
    }

    #[test]
    fn test_unknown_day_token() {
        let csv = "name,edo_fixed_day\nAlice,Noday\n";
        let err = read_team(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownDay {
                row: 1,
                value: "Noday".into()
            }
        );
    }

    #[test]
    fn test_english_day_tokens_accepted() {
        let csv = "name,edo_fixed_day\nAlice,Wed\n";
        let people = read_team(csv.as_bytes()).unwrap();
        assert_eq!(people[0].edo_fixed_day, Some(Weekday::Wed));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let csv = "name\nAlice\nAlice\n";
        let err = read_team(csv.as_bytes()).unwrap_err();
        assert_eq!(err, InputError::DuplicateName("Alice".into()));
    }

    #[test]
    fn test_out_of_range_workdays_rejected() {
        let csv = "name,workdays_per_week\nAlice,7\n";
        let err = read_team(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::WorkdaysOutOfRange { .. }));
    }

    #[test]
    fn test_team_round_trip() {
        let people = read_team(SAMPLE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_team(&people, &mut buffer).unwrap();
        let back = read_team(buffer.as_slice()).unwrap();
        assert_eq!(people, back);
    }

    #[test]
    fn test_schedule_round_trip() {
        let people = vec!["Alice".to_string(), "Bob".to_string()];
        let mut edo = EdoPlan::default();
        edo.recipients.entry(1).or_default().insert("Bob".into());

        let assignments = vec![
            SlotAssignment {
                week: 1,
                day: Weekday::Mon,
                shift: Shift::Night,
                slot_idx: 0,
                people: vec!["Alice".into(), "Bob".into()],
            },
            SlotAssignment {
                week: 1,
                day: Weekday::Wed,
                shift: Shift::Day,
                slot_idx: 1,
                people: vec!["Alice".into()],
            },
        ];
        let schedule = Schedule::new(1, assignments, &people, edo, StaffingPlan::new(1), 7);

        let csv = schedule_to_csv(&schedule).unwrap();
        let back = schedule_from_csv(csv.as_bytes()).unwrap();

        assert_eq!(back.weeks, schedule.weeks);
        assert_eq!(back.assignments, schedule.assignments);
        assert_eq!(back.matrix(), schedule.matrix());
        // Bob's EDO decoration survives the trip as a matrix cell.
        assert_eq!(back.shift_on("Bob", 1, Weekday::Tue), Shift::Edo);
    }
}
