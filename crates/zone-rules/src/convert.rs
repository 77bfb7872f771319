//! UTC offsets and conversions between local civil time and UTC.
//!
//! Every offset returned here is **local minus UTC**: the amount to add to a
//! UTC timestamp to get local time (US Eastern in winter is `-05:00`). The
//! same convention is used in both directions:
//!
//! - [`to_utc`]: `utc = local - utc_offset_from_local(local)`
//! - [`to_local`]: `local = utc + utc_offset_from_utc(utc)`
//!
//! Zone-to-zone conversion always pivots through UTC ([`convert`]).
//!
//! Off the transition bands `to_local(to_utc(t)) == t`. Inside them civil
//! time itself is lossy: a skipped spring-forward time comes back an hour
//! later, and the second pass through a repeated fall-back hour comes back as
//! the first.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::dst::{is_dst_from_local, is_dst_from_utc, shift};
use crate::error::Result;
use crate::rule::ZoneRule;

/// The UTC offset in effect at local civil time `local`.
pub fn utc_offset_from_local(local: NaiveDateTime, rule: &ZoneRule) -> Result<Duration> {
    let dst = is_dst_from_local(local, rule)?;
    Ok(offset_for(rule, dst))
}

/// The UTC offset in effect at reference time `utc`.
pub fn utc_offset_from_utc(utc: NaiveDateTime, rule: &ZoneRule) -> Result<Duration> {
    let dst = is_dst_from_utc(utc, rule)?;
    Ok(offset_for(rule, dst))
}

fn offset_for(rule: &ZoneRule, dst: bool) -> Duration {
    let base = -rule.standard_offset();
    if dst {
        base - rule.daylight_delta()
    } else {
        base
    }
}

/// Convert a local civil timestamp in `rule`'s zone to UTC.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDateTime;
/// use zone_rules::{to_utc, RuleStore};
///
/// let store = RuleStore::bundled().unwrap();
/// let eastern = store.find("Eastern Standard Time").unwrap();
/// let local: NaiveDateTime = "2024-07-04T12:00:00".parse().unwrap();
/// assert_eq!(to_utc(local, eastern).unwrap().to_string(), "2024-07-04 16:00:00");
/// ```
pub fn to_utc(local: NaiveDateTime, rule: &ZoneRule) -> Result<NaiveDateTime> {
    let offset = utc_offset_from_local(local, rule)?;
    shift(local, -offset)
}

/// Convert a UTC timestamp to local civil time in `rule`'s zone.
pub fn to_local(utc: NaiveDateTime, rule: &ZoneRule) -> Result<NaiveDateTime> {
    let offset = utc_offset_from_utc(utc, rule)?;
    shift(utc, offset)
}

/// Convert a local timestamp in `source`'s zone to local time in `dest`'s
/// zone, via UTC.
pub fn convert(local: NaiveDateTime, source: &ZoneRule, dest: &ZoneRule) -> Result<NaiveDateTime> {
    to_local(to_utc(local, source)?, dest)
}

// ── zone_time ───────────────────────────────────────────────────────────────

/// An instant expressed in a zone, with its offset metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneTime {
    /// The instant in UTC (`YYYY-MM-DDTHH:MM:SS`).
    pub utc: String,
    /// Local civil time in the zone.
    pub local: String,
    /// Display name of the zone.
    pub zone: String,
    /// Standard or daylight name, whichever is in effect.
    pub abbreviation: String,
    /// Local minus UTC (e.g., "-04:00").
    pub utc_offset: String,
    /// Whether daylight time is in effect.
    pub dst_active: bool,
}

/// Describe the instant `utc` in `rule`'s zone.
pub fn zone_time(utc: NaiveDateTime, rule: &ZoneRule) -> Result<ZoneTime> {
    let dst_active = is_dst_from_utc(utc, rule)?;
    let offset = offset_for(rule, dst_active);
    let local = shift(utc, offset)?;

    let abbreviation = if dst_active {
        rule.daylight_name()
    } else {
        rule.standard_name()
    };

    Ok(ZoneTime {
        utc: format_timestamp(&utc),
        local: format_timestamp(&local),
        zone: rule.display_name().to_string(),
        abbreviation: abbreviation.to_string(),
        utc_offset: format_utc_offset(offset),
        dst_active,
    })
}

/// Format an offset as `±HH:MM`.
pub fn format_utc_offset(offset: Duration) -> String {
    let minutes = offset.num_minutes();
    let sign = if minutes >= 0 { "+" } else { "-" };
    let abs = minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

// ── Tests ───────────────────────────────────────────────────────────────────
