//! Input validation for rotation problems.
//!
//! Checks structural integrity of the team before solving. Detects:
//! - Empty team
//! - Duplicate person names
//! - Empty names
//! - Workday targets outside 0..=5
//! - Fixed EDO days outside Monday..Friday
//!
//! All issues are collected and returned together; callers decide whether
//! to abort on the first or report them all.

use std::collections::HashSet;

use crate::models::Person;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The team has no members.
    EmptyTeam,
    /// Two people share the same name.
    DuplicateName,
    /// A person's name is blank.
    EmptyName,
    /// `workdays_per_week` outside 0..=5.
    WorkdaysOutOfRange,
    /// A fixed EDO day that is not a Monday..Friday weekday.
    InvalidEdoDay,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a team before solving.
///
/// Checks:
/// 1. The team is non-empty
/// 2. Every name is non-blank
/// 3. Names are unique
/// 4. Workday targets are within 0..=5
/// 5. Fixed EDO days fall on weekdays
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_team(people: &[Person]) -> ValidationResult {
    let mut errors = Vec::new();

    if people.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyTeam,
            "team has no members",
        ));
    }

    let mut names = HashSet::new();
    for p in people {
        if p.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                "person with empty name",
            ));
        } else if !names.insert(p.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("duplicate person name: {}", p.name),
            ));
        }

        if p.workdays_per_week > 5 {
            errors.push(ValidationError::new(
                ValidationErrorKind::WorkdaysOutOfRange,
                format!(
                    "{}: workdays_per_week {} is out of range 0..=5",
                    p.name, p.workdays_per_week
                ),
            ));
        }

        if let Some(day) = p.edo_fixed_day {
            if !day.is_weekday() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidEdoDay,
                    format!("{}: EDO fixed day {} is not a weekday", p.name, day),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
