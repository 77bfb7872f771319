//! Nth-weekday-of-month date resolution.
//!
//! Transition rules name a recurring civil-calendar event ("second Sunday of
//! March", "last Sunday of October") rather than a fixed date. This module
//! turns such a rule into the concrete [`NaiveDate`] for a given year.
//!
//! Weekdays are ordinal indexes with `0 = Sunday` through `6 = Saturday`.
//! Occurrences `1..=4` count forward from the first of the month; occurrence
//! [`LAST_WEEK`] walks backward from the last day of the month. The two are
//! separate algorithms: "last" is not "5th, clamped".

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{Result, ZoneError};

/// The `week_of_month` value meaning "last occurrence in the month".
pub const LAST_WEEK: u32 = 5;

const DAYS_PER_WEEK: i64 = 7;

/// Resolve "the `week_of_month`th `day_of_week` of `month`" in `year`.
///
/// # Arguments
///
/// * `year` — Calendar year
/// * `month` — Month, `1..=12`
/// * `day_of_week` — Weekday index, `0` (Sunday) through `6` (Saturday)
/// * `week_of_month` — `1..=4` for the Nth occurrence, `5` for the last one
///
/// # Errors
///
/// Returns [`ZoneError::InvalidTransitionRule`] if any argument is out of
/// range, if the year is outside the supported calendar, or if the resolved
/// date would fall outside `month`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use zone_rules::resolver::resolve_relative_date;
///
/// // Second Sunday of March 2024: US spring-forward.
/// let date = resolve_relative_date(2024, 3, 0, 2).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
/// ```
pub fn resolve_relative_date(
    year: i32,
    month: u32,
    day_of_week: u32,
    week_of_month: u32,
) -> Result<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(ZoneError::InvalidTransitionRule(format!(
            "month {month} is not in 1..=12"
        )));
    }
    let target = weekday_from_index(day_of_week)?;

    match week_of_month {
        1..=4 => nth_weekday(year, month, target, week_of_month),
        LAST_WEEK => last_weekday(year, month, target),
        other => Err(ZoneError::InvalidTransitionRule(format!(
            "week of month {other} is not in 1..=5"
        ))),
    }
}

/// Map a `0 = Sunday` weekday index to a [`Weekday`].
pub fn weekday_from_index(index: u32) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ZoneError::InvalidTransitionRule(format!(
            "day of week {other} is not in 0..=6"
        ))),
    }
}

/// Forward from the first of the month to the `occurrence`th `target`.
fn nth_weekday(year: i32, month: u32, target: Weekday, occurrence: u32) -> Result<NaiveDate> {
    let first = first_of_month(year, month)?;
    let delta = (target.num_days_from_sunday() as i64
        - first.weekday().num_days_from_sunday() as i64)
        .rem_euclid(DAYS_PER_WEEK)
        + DAYS_PER_WEEK * (occurrence as i64 - 1);

    let date = first
        .checked_add_signed(Duration::days(delta))
        .ok_or_else(|| out_of_calendar(year, month))?;
    if date.month() != month {
        return Err(ZoneError::InvalidTransitionRule(format!(
            "occurrence {occurrence} of {target} does not exist in {year}-{month:02}"
        )));
    }
    Ok(date)
}

/// Backward from the last day of the month to the most recent `target`.
fn last_weekday(year: i32, month: u32, target: Weekday) -> Result<NaiveDate> {
    let last = last_of_month(year, month)?;
    let delta = (last.weekday().num_days_from_sunday() as i64
        - target.num_days_from_sunday() as i64)
        .rem_euclid(DAYS_PER_WEEK);

    last.checked_sub_signed(Duration::days(delta))
        .ok_or_else(|| out_of_calendar(year, month))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| out_of_calendar(year, month))
}

fn last_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let (ny, nm) = if month == 12 {
        let next = year
            .checked_add(1)
            .ok_or_else(|| out_of_calendar(year, month))?;
        (next, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|first_next| first_next.pred_opt())
        .ok_or_else(|| out_of_calendar(year, month))
}

fn out_of_calendar(year: i32, month: u32) -> ZoneError {
    ZoneError::InvalidTransitionRule(format!(
        "{year}-{month:02} is outside the supported calendar range"
    ))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_second_sunday_of_march_2024() {
        assert_eq!(resolve_relative_date(2024, 3, 0, 2).unwrap(), ymd(2024, 3, 10));
    }

    #[test]
    fn test_first_sunday_of_november_2024() {
        assert_eq!(resolve_relative_date(2024, 11, 0, 1).unwrap(), ymd(2024, 11, 3));
    }

    #[test]
    fn test_last_sunday_of_october_2024() {
        assert_eq!(resolve_relative_date(2024, 10, 0, 5).unwrap(), ymd(2024, 10, 27));
    }

    #[test]
    fn test_last_sunday_of_march_2024() {
        // EU spring-forward.
        assert_eq!(resolve_relative_date(2024, 3, 0, 5).unwrap(), ymd(2024, 3, 31));
    }

    #[test]
    fn test_first_day_is_target_weekday() {
        // September 1, 2024 is a Sunday: zero forward offset.
        assert_eq!(resolve_relative_date(2024, 9, 0, 1).unwrap(), ymd(2024, 9, 1));
        assert_eq!(resolve_relative_date(2024, 9, 0, 4).unwrap(), ymd(2024, 9, 22));
    }

    #[test]
    fn test_last_day_is_target_weekday() {
        // March 31, 2024 is a Sunday: zero backward offset.
        assert_eq!(resolve_relative_date(2024, 3, 0, 5).unwrap(), ymd(2024, 3, 31));
        // Saturday before it.
        assert_eq!(resolve_relative_date(2024, 3, 6, 5).unwrap(), ymd(2024, 3, 30));
    }

    #[test]
    fn test_last_differs_from_fourth_when_five_occurrences() {
        // March 2024 has five Sundays.
        let fourth = resolve_relative_date(2024, 3, 0, 4).unwrap();
        let last = resolve_relative_date(2024, 3, 0, 5).unwrap();
        assert_eq!(fourth, ymd(2024, 3, 24));
        assert_eq!(last, ymd(2024, 3, 31));
    }

    #[test]
    fn test_last_in_february_leap_year() {
        // Feb 29, 2024 is a Thursday.
        assert_eq!(resolve_relative_date(2024, 2, 4, 5).unwrap(), ymd(2024, 2, 29));
        assert_eq!(resolve_relative_date(2023, 2, 4, 5).unwrap(), ymd(2023, 2, 23));
    }

    #[test]
    fn test_december_last_weekday_crosses_year_lookup() {
        // Dec 31, 2024 is a Tuesday; last Sunday is the 29th.
        assert_eq!(resolve_relative_date(2024, 12, 0, 5).unwrap(), ymd(2024, 12, 29));
    }

    #[test]
    fn test_every_weekday_resolves_into_month() {
        for month in 1..=12 {
            for dow in 0..=6 {
                for week in 1..=5 {
                    let date = resolve_relative_date(2025, month, dow, week).unwrap();
                    assert_eq!(date.month(), month);
                    assert_eq!(date.weekday().num_days_from_sunday(), dow);
                }
            }
        }
    }

    #[test]
    fn test_invalid_week_of_month() {
        let err = resolve_relative_date(2024, 3, 0, 6).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidTransitionRule(_)));
        let err = resolve_relative_date(2024, 3, 0, 0).unwrap_err();
        assert!(err.to_string().contains("week of month 0"), "got: {err}");
    }

    #[test]
    fn test_invalid_month() {
        let err = resolve_relative_date(2024, 13, 0, 1).unwrap_err();
        assert!(err.to_string().contains("month 13"), "got: {err}");
        assert!(resolve_relative_date(2024, 0, 0, 1).is_err());
    }

    #[test]
    fn test_invalid_day_of_week() {
        let err = resolve_relative_date(2024, 3, 7, 1).unwrap_err();
        assert!(err.to_string().contains("day of week 7"), "got: {err}");
    }

    #[test]
    fn test_year_outside_calendar() {
        let err = resolve_relative_date(i32::MAX, 3, 0, 1).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidTransitionRule(_)));
    }

    #[test]
    fn test_last_of_december_at_year_limit() {
        let err = resolve_relative_date(i32::MAX, 12, 0, LAST_WEEK).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidTransitionRule(_)));
        assert!(resolve_relative_date(i32::MIN, 12, 0, LAST_WEEK).is_err());
    }

    #[test]
    fn test_weekday_from_index_sunday_first() {
        assert_eq!(weekday_from_index(0).unwrap(), Weekday::Sun);
        assert_eq!(weekday_from_index(6).unwrap(), Weekday::Sat);
    }
}
