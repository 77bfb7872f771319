//! Zone rule data model.
//!
//! A [`ZoneRule`] is the immutable, validated form of one zone's standard and
//! daylight offsets plus its two yearly transitions. It is built from a raw
//! [`ZoneRecord`], the serde-facing shape supplied by whatever source the
//! caller reads rules from (JSON, the bundled table, a decoded TZI blob).
//!
//! # Offsets
//!
//! Offsets follow the Windows "bias" convention: the bias is what you add to
//! local time to reach UTC.
//!
//! - standard time: `local = utc - standard_offset`
//! - daylight time: `local = utc - (standard_offset + daylight_delta)`
//!
//! US Eastern therefore carries `standard_offset = +300 min` and
//! `daylight_delta = -60 min`. Zero and positive deltas are valid and are
//! used as given.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZoneError};
use crate::resolver::{resolve_relative_date, weekday_from_index, LAST_WEEK};

// ── Transition rules ────────────────────────────────────────────────────────

/// Which occurrence of a weekday within its month a transition falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekOfMonth {
    /// The Nth occurrence, `1..=4`.
    Nth(u8),
    /// The last occurrence in the month, whether that is the 4th or 5th.
    Last,
}

impl WeekOfMonth {
    /// Parse the raw `1..=5` encoding, where `5` means last.
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            1..=4 => Ok(WeekOfMonth::Nth(raw as u8)),
            LAST_WEEK => Ok(WeekOfMonth::Last),
            other => Err(ZoneError::InvalidTransitionRule(format!(
                "week of month {other} is not in 1..=5"
            ))),
        }
    }

    /// The raw `1..=5` encoding.
    pub fn to_raw(self) -> u32 {
        match self {
            WeekOfMonth::Nth(n) => n as u32,
            WeekOfMonth::Last => LAST_WEEK,
        }
    }
}

/// A recurring yearly event: "week `week` `day_of_week` of `month` at
/// `time_of_day`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionRule {
    month: u32,
    day_of_week: Weekday,
    week: WeekOfMonth,
    time_of_day: NaiveTime,
}

impl TransitionRule {
    /// Build a validated transition rule from its raw fields.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidTransitionRule`] if `month` is not in
    /// `1..=12`, `day_of_week` not in `0..=6`, or `week` not in `1..=5`.
    pub fn new(month: u32, day_of_week: u32, week: u32, time_of_day: NaiveTime) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ZoneError::InvalidTransitionRule(format!(
                "month {month} is not in 1..=12"
            )));
        }
        Ok(Self {
            month,
            day_of_week: weekday_from_index(day_of_week)?,
            week: WeekOfMonth::from_raw(week)?,
            time_of_day,
        })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    pub fn week(&self) -> WeekOfMonth {
        self.week
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    /// The calendar date this rule falls on in `year`.
    pub fn date_in(&self, year: i32) -> Result<NaiveDate> {
        resolve_relative_date(
            year,
            self.month,
            self.day_of_week.num_days_from_sunday(),
            self.week.to_raw(),
        )
    }

    /// The local civil timestamp this rule falls on in `year`.
    pub fn datetime_in(&self, year: i32) -> Result<NaiveDateTime> {
        Ok(self.date_in(year)?.and_time(self.time_of_day))
    }

    fn to_record(self) -> TransitionRecord {
        TransitionRecord {
            month: self.month,
            day_of_week: self.day_of_week.num_days_from_sunday(),
            week: self.week.to_raw(),
            time_of_day: self.time_of_day,
        }
    }
}

/// The pair of transitions of a zone that observes daylight saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DstTransitions {
    /// When daylight time ends.
    pub standard: TransitionRule,
    /// When daylight time begins.
    pub daylight: TransitionRule,
}

// ── Zone rule ───────────────────────────────────────────────────────────────

/// One zone's offsets and transition conditions.
///
/// Constructed through [`ZoneRule::from_record`] (or deserialized from a
/// [`ZoneRecord`]) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ZoneRecord", into = "ZoneRecord")]
pub struct ZoneRule {
    index: i32,
    display_name: String,
    standard_name: String,
    daylight_name: String,
    standard_offset: Duration,
    daylight_delta: Duration,
    transitions: Option<DstTransitions>,
}

impl ZoneRule {
    /// Validate a raw record and build a rule from it.
    ///
    /// A record observes DST iff its daylight transition has a non-zero
    /// month. Both transitions must then be present; a record with only one
    /// side is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidRuleData`] for inconsistent transition
    /// presence, or [`ZoneError::InvalidTransitionRule`] if a present
    /// transition has out-of-range fields.
    pub fn from_record(record: ZoneRecord) -> Result<Self> {
        let daylight = record.daylight_transition.filter(|t| t.month != 0);
        let standard = record.standard_transition.filter(|t| t.month != 0);

        let transitions = match (daylight, standard) {
            (Some(daylight), Some(standard)) => Some(DstTransitions {
                standard: standard.to_rule().map_err(|e| in_zone(&record.display_name, e))?,
                daylight: daylight.to_rule().map_err(|e| in_zone(&record.display_name, e))?,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ZoneError::InvalidRuleData(format!(
                    "'{}': daylight transition without a standard transition",
                    record.display_name
                )));
            }
            (None, Some(_)) => {
                return Err(ZoneError::InvalidRuleData(format!(
                    "'{}': standard transition without a daylight transition",
                    record.display_name
                )));
            }
        };

        Ok(Self {
            index: record.index,
            display_name: record.display_name,
            standard_name: record.standard_name,
            daylight_name: record.daylight_name,
            standard_offset: Duration::minutes(record.bias_minutes as i64),
            daylight_delta: Duration::minutes(record.daylight_delta_minutes as i64),
            transitions,
        })
    }

    /// A rule that never observes DST, `bias_minutes` west of UTC.
    pub fn fixed(
        index: i32,
        display_name: impl Into<String>,
        standard_name: impl Into<String>,
        bias_minutes: i32,
    ) -> Self {
        let standard_name = standard_name.into();
        Self {
            index,
            display_name: display_name.into(),
            daylight_name: standard_name.clone(),
            standard_name,
            standard_offset: Duration::minutes(bias_minutes as i64),
            daylight_delta: Duration::zero(),
            transitions: None,
        }
    }

    /// Source priority key; lower sorts first.
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn standard_name(&self) -> &str {
        &self.standard_name
    }

    pub fn daylight_name(&self) -> &str {
        &self.daylight_name
    }

    /// The standard-time bias: `local = utc - standard_offset`.
    pub fn standard_offset(&self) -> Duration {
        self.standard_offset
    }

    /// Added to the bias while daylight time is in effect.
    pub fn daylight_delta(&self) -> Duration {
        self.daylight_delta
    }

    pub fn supports_dst(&self) -> bool {
        self.transitions.is_some()
    }

    pub fn transitions(&self) -> Option<&DstTransitions> {
        self.transitions.as_ref()
    }

    /// When daylight time ends, if the zone observes it.
    pub fn standard_transition(&self) -> Option<&TransitionRule> {
        self.transitions.as_ref().map(|t| &t.standard)
    }

    /// When daylight time begins, if the zone observes it.
    pub fn daylight_transition(&self) -> Option<&TransitionRule> {
        self.transitions.as_ref().map(|t| &t.daylight)
    }
}

impl fmt::Display for ZoneRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

impl TryFrom<ZoneRecord> for ZoneRule {
    type Error = ZoneError;

    fn try_from(record: ZoneRecord) -> Result<Self> {
        ZoneRule::from_record(record)
    }
}

impl From<ZoneRule> for ZoneRecord {
    fn from(rule: ZoneRule) -> Self {
        // Both offsets are only ever built from whole `i32` minutes.
        ZoneRecord {
            index: rule.index,
            display_name: rule.display_name,
            standard_name: rule.standard_name,
            daylight_name: rule.daylight_name,
            bias_minutes: rule.standard_offset.num_minutes() as i32,
            daylight_delta_minutes: rule.daylight_delta.num_minutes() as i32,
            standard_transition: rule.transitions.map(|t| t.standard.to_record()),
            daylight_transition: rule.transitions.map(|t| t.daylight.to_record()),
        }
    }
}

fn in_zone(display_name: &str, err: ZoneError) -> ZoneError {
    match err {
        ZoneError::InvalidTransitionRule(msg) => {
            ZoneError::InvalidTransitionRule(format!("'{display_name}': {msg}"))
        }
        other => other,
    }
}

// ── Raw records ─────────────────────────────────────────────────────────────

/// A raw zone record as supplied by a rule source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Source priority key; the store sorts ascending on it.
    #[serde(default)]
    pub index: i32,
    pub display_name: String,
    pub standard_name: String,
    pub daylight_name: String,
    /// Minutes to add to standard local time to get UTC.
    pub bias_minutes: i32,
    /// Minutes added to the bias while daylight time is in effect.
    #[serde(default)]
    pub daylight_delta_minutes: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_transition: Option<TransitionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daylight_transition: Option<TransitionRecord>,
}

/// A raw transition descriptor. `month == 0` means "no transition".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub month: u32,
    pub day_of_week: u32,
    pub week: u32,
    pub time_of_day: NaiveTime,
}

impl TransitionRecord {
    fn to_rule(self) -> Result<TransitionRule> {
        TransitionRule::new(self.month, self.day_of_week, self.week, self.time_of_day)
    }

    /// Build a time of day from SYSTEMTIME-style components.
    pub fn time_from_parts(hour: u32, minute: u32, second: u32, milli: u32) -> Result<NaiveTime> {
        NaiveTime::from_hms_milli_opt(hour, minute, second, milli).ok_or_else(|| {
            ZoneError::InvalidTransitionRule(format!(
                "time of day {hour:02}:{minute:02}:{second:02}.{milli:03} is invalid"
            ))
        })
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let which = match self.week {
            WeekOfMonth::Nth(1) => "first".to_string(),
            WeekOfMonth::Nth(2) => "second".to_string(),
            WeekOfMonth::Nth(3) => "third".to_string(),
            WeekOfMonth::Nth(n) => format!("{n}th"),
            WeekOfMonth::Last => "last".to_string(),
        };
        write!(
            f,
            "{which} {} of month {} at {:02}:{:02}",
            self.day_of_week,
            self.month,
            self.time_of_day.hour(),
            self.time_of_day.minute()
        )
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
