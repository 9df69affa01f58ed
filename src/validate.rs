//! Pre-mutation checks on the values typed into the task form.
//!
//! Everything here is pure; the current date is passed in so callers (and
//! tests) decide what "today" means.

use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::domain::task::{DUE_DATE_FORMAT, NewTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Due date must be strictly after today.
    #[default]
    FutureOnly,
    AnyDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Priority,
    DueDate,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "task name",
            Field::Priority => "priority",
            Field::DueDate => "due date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill in all task details ({} is missing)", .0.label())]
    MissingField(Field),
    #[error("invalid due date `{0}`; please use yyyy-mm-dd")]
    BadDateFormat(String),
    #[error("due date {0} must be a future date")]
    PastDueDate(String),
}

/// Parses `yyyy-mm-dd`. The shape is checked byte by byte first because the
/// `[year]` component would otherwise accept a leading sign.
pub fn parse_due_date(text: &str) -> Option<Date> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    Date::parse(text, DUE_DATE_FORMAT)
        .ok()
        .filter(|date| date.year() >= 1)
}

/// True iff `text` is a calendar date written exactly as `yyyy-mm-dd`.
pub fn validate_date(text: &str) -> bool {
    parse_due_date(text).is_some()
}

/// A due date of today is already too late.
pub fn validate_future_date(date: Date, today: Date) -> bool {
    date > today
}

pub fn validate_fields(
    name: &str,
    priority: &str,
    due_date: &str,
    policy: DatePolicy,
    today: Date,
) -> Result<NewTask, ValidationError> {
    let name = name.trim();
    let priority = priority.trim();
    let due_text = due_date.trim();

    for (field, value) in [
        (Field::Name, name),
        (Field::Priority, priority),
        (Field::DueDate, due_text),
    ] {
        if value.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    let due_date =
        parse_due_date(due_text).ok_or_else(|| ValidationError::BadDateFormat(due_text.into()))?;

    if policy == DatePolicy::FutureOnly && !validate_future_date(due_date, today) {
        return Err(ValidationError::PastDueDate(due_text.into()));
    }

    Ok(NewTask {
        name: name.to_owned(),
        priority: priority.to_owned(),
        due_date,
    })
}

/// Local calendar date, or the UTC one when the local offset can't be read.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2026 - 10 - 19);

    #[test]
    fn accepts_only_exact_iso_dates() {
        assert!(validate_date("2030-01-01"));
        assert!(validate_date("2028-02-29"));
        assert!(!validate_date("2027-02-29"));
        assert!(!validate_date("2030-1-1"));
        assert!(!validate_date("01/01/2030"));
        assert!(!validate_date("2030-01-01T00:00"));
        assert!(!validate_date(""));
    }

    #[test]
    fn rejects_signed_and_zero_years() {
        assert!(!validate_date("+2030-01-01"));
        assert!(!validate_date("-2030-01-01"));
        assert!(!validate_date("+02030-01-01"));
        assert!(!validate_date("20300-01-01"));
        assert!(!validate_date("0000-01-01"));
        assert!(!validate_date("２０３０-01-01"));
        assert!(validate_date("0001-01-01"));

        let err = validate_fields("Old", "Low", "-2030-01-01", DatePolicy::AnyDate, TODAY)
            .unwrap_err();
        assert_eq!(err, ValidationError::BadDateFormat("-2030-01-01".into()));
    }

    #[test]
    fn future_means_strictly_after_today() {
        assert!(validate_future_date(date!(2026 - 10 - 20), TODAY));
        assert!(!validate_future_date(TODAY, TODAY));
        assert!(!validate_future_date(date!(2020 - 01 - 01), TODAY));
    }

    #[test]
    fn reports_first_missing_field() {
        let err = validate_fields("", "High", "", DatePolicy::FutureOnly, TODAY).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(Field::Name));

        let err = validate_fields("Pay rent", "  ", "2030-01-01", DatePolicy::FutureOnly, TODAY)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField(Field::Priority));

        let err = validate_fields("Pay rent", "High", "", DatePolicy::AnyDate, TODAY).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(Field::DueDate));
    }

    #[test]
    fn rejects_malformed_date() {
        let err = validate_fields("Pay rent", "High", "next week", DatePolicy::AnyDate, TODAY)
            .unwrap_err();
        assert_eq!(err, ValidationError::BadDateFormat("next week".into()));
    }

    #[test]
    fn past_dates_depend_on_policy() {
        let err = validate_fields("Pay rent", "High", "2026-10-19", DatePolicy::FutureOnly, TODAY)
            .unwrap_err();
        assert_eq!(err, ValidationError::PastDueDate("2026-10-19".into()));

        let ok = validate_fields("Pay rent", "High", "2026-10-19", DatePolicy::AnyDate, TODAY)
            .unwrap();
        assert_eq!(ok.due_date(), TODAY);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let ok = validate_fields(" Pay rent ", "High", " 2030-01-01", DatePolicy::FutureOnly, TODAY)
            .unwrap();
        assert_eq!(ok.name(), "Pay rent");
        assert_eq!(ok.due_date(), date!(2030 - 01 - 01));
    }
}
