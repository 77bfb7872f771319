//! Daylight-saving intervals and DST-active determination.
//!
//! A zone's DST interval for a year is the pair of naive local timestamps at
//! which daylight time begins and ends. Deciding whether a timestamp is inside
//! that interval needs different edge arithmetic depending on whether the
//! timestamp is local civil time or UTC:
//!
//! - From local time, the window opens `daylight_delta` late (after the
//!   skipped spring-forward band) and closes at the unadjusted end, so the
//!   repeated fall-back hour reads as daylight time.
//! - From UTC, both edges are shifted by the standard offset and the end is
//!   additionally pulled back by `daylight_delta`, which moves the ambiguous
//!   band to the end of the window.
//!
//! The two must stay asymmetric; a single symmetric formula changes the
//! offsets reported at the transition edges.
//!
//! When the daylight start falls later in the year than its end (southern
//! hemisphere), DST spans the year boundary and the window test becomes
//! "after start OR before end".

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::Serialize;

use crate::error::{Result, ZoneError};
use crate::rule::ZoneRule;

/// The DST interval of one zone for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaylightTime {
    /// Local civil time at which daylight time begins.
    pub start: NaiveDateTime,
    /// Local civil time at which daylight time ends.
    pub end: NaiveDateTime,
    /// The zone's daylight delta, in the bias convention of [`ZoneRule`].
    #[serde(serialize_with = "serialize_minutes")]
    pub delta: Duration,
}

impl DaylightTime {
    /// Whether daylight time spans the year boundary (southern hemisphere).
    pub fn wraps_year(&self) -> bool {
        self.start > self.end
    }
}

/// Compute the DST interval of `rule` for `year`.
///
/// Returns `Ok(None)` for a zone that does not observe DST; its transitions
/// are never resolved.
///
/// # Errors
///
/// Returns [`ZoneError::InvalidTransitionRule`] if either transition cannot
/// be resolved in `year`.
///
/// # Examples
///
/// ```
/// use zone_rules::{daylight_time, RuleStore};
///
/// let store = RuleStore::bundled().unwrap();
/// let eastern = store.find("Eastern Standard Time").unwrap();
/// let dst = daylight_time(2024, eastern).unwrap().unwrap();
/// assert_eq!(dst.start.to_string(), "2024-03-10 02:00:00");
/// assert_eq!(dst.end.to_string(), "2024-11-03 02:00:00");
/// ```
pub fn daylight_time(year: i32, rule: &ZoneRule) -> Result<Option<DaylightTime>> {
    let Some(transitions) = rule.transitions() else {
        return Ok(None);
    };

    Ok(Some(DaylightTime {
        start: transitions.daylight.datetime_in(year)?,
        end: transitions.standard.datetime_in(year)?,
        delta: rule.daylight_delta(),
    }))
}

/// Whether `local` (a local civil timestamp in `rule`'s zone) is in DST.
///
/// The skipped spring-forward band reads as standard time; the repeated
/// fall-back band reads as daylight time.
pub fn is_dst_from_local(local: NaiveDateTime, rule: &ZoneRule) -> Result<bool> {
    let Some(dst) = daylight_time(local.year(), rule)? else {
        return Ok(false);
    };

    let window_start = shift(dst.start, -dst.delta)?;
    let window_end = dst.end;

    Ok(in_window(local, window_start, window_end))
}

/// Whether `utc` (a reference timestamp) is in DST for `rule`'s zone.
///
/// The interval is resolved for the UTC timestamp's own year. Within a few
/// hours of January 1st this can pick the neighbouring year's interval for
/// zones whose local date differs; that only matters for rules with a
/// transition at the very start or end of the year.
pub fn is_dst_from_utc(utc: NaiveDateTime, rule: &ZoneRule) -> Result<bool> {
    let Some(dst) = daylight_time(utc.year(), rule)? else {
        return Ok(false);
    };

    let offset = -rule.standard_offset();
    let window_start = shift(dst.start, -offset)?;
    let window_end = shift(shift(dst.end, -offset)?, dst.delta)?;

    Ok(in_window(utc, window_start, window_end))
}

/// Hemisphere-aware half-open window test.
fn in_window(t: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    if start > end {
        t >= start || t < end
    } else {
        t >= start && t < end
    }
}

pub(crate) fn shift(t: NaiveDateTime, by: Duration) -> Result<NaiveDateTime> {
    t.checked_add_signed(by)
        .ok_or_else(|| ZoneError::OutOfRange(format!("{t} shifted by {}m", by.num_minutes())))
}

fn serialize_minutes<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_minutes())
}

// ── Tests ───────────────────────────────────────────────────────────────────
