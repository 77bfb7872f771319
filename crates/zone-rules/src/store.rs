//! The rule store: an immutable, ordered collection of zone rules.
//!
//! A [`RuleStore`] is built once from some source of [`ZoneRecord`]s and then
//! only read. It is `Send + Sync`; share it by reference or wrap it in an
//! `Arc` and hand it to whatever needs conversions. There is no global table.
//!
//! Records are sorted by their source `index` (stable, ascending) before they
//! are exposed, so the order never depends on how the source enumerated them.
//! Duplicate display names are resolved at load time on that same key: the
//! lowest index wins, and later duplicates are dropped with a warning.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::convert;
use crate::error::{Result, ZoneError};
use crate::rule::{ZoneRecord, ZoneRule};

const BUNDLED_ZONES: &str = include_str!("../data/zones.json");

/// An ordered, read-only set of zone rules keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    zones: Vec<ZoneRule>,
}

impl RuleStore {
    /// Validate, order, and deduplicate `records` into a store.
    ///
    /// # Errors
    ///
    /// Returns the first [`ZoneError::InvalidRuleData`] or
    /// [`ZoneError::InvalidTransitionRule`] raised by a record.
    pub fn load<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = ZoneRecord>,
    {
        let mut zones = records
            .into_iter()
            .map(|record| {
                let name = record.display_name.clone();
                ZoneRule::from_record(record).inspect_err(|e| {
                    warn!(zone = %name, error = %e, "rejecting zone record");
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable: equal indexes keep source order.
        zones.sort_by_key(ZoneRule::index);

        let mut seen = HashSet::new();
        zones.retain(|zone| {
            let fresh = seen.insert(zone.display_name().to_string());
            if !fresh {
                warn!(
                    zone = zone.display_name(),
                    index = zone.index(),
                    "dropping duplicate zone display name"
                );
            }
            fresh
        });

        debug!(count = zones.len(), "loaded zone rules");
        Ok(Self { zones })
    }

    /// Load a store from a JSON array of [`ZoneRecord`]s.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<ZoneRecord> = serde_json::from_str(json)
            .map_err(|e| ZoneError::Source(format!("invalid zone JSON: {e}")))?;
        Self::load(records)
    }

    /// Load a store from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ZoneError::Source(format!("'{}': {e}", path.display())))?;
        debug!(path = %path.display(), "reading zone rules");
        Self::from_json(&json)
    }

    /// The built-in table of common Windows zones.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_ZONES)
    }

    /// Look up a zone by exact display name. Never errors.
    pub fn find(&self, display_name: &str) -> Option<&ZoneRule> {
        self.zones.iter().find(|z| z.display_name() == display_name)
    }

    /// Like [`find`](Self::find), but a missing zone is a
    /// [`ZoneError::RuleNotFound`].
    pub fn require(&self, display_name: &str) -> Result<&ZoneRule> {
        self.find(display_name)
            .ok_or_else(|| ZoneError::RuleNotFound(format!("'{display_name}'")))
    }

    /// All zones in priority order.
    pub fn zones(&self) -> &[ZoneRule] {
        &self.zones
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ZoneRule> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    // ── Name-based conversion ───────────────────────────────────────────

    /// Convert local time in the named zone to UTC.
    pub fn to_utc(&self, local: NaiveDateTime, zone: &str) -> Result<NaiveDateTime> {
        convert::to_utc(local, self.require(zone)?)
    }

    /// Convert UTC to local time in the named zone.
    pub fn to_local(&self, utc: NaiveDateTime, zone: &str) -> Result<NaiveDateTime> {
        convert::to_local(utc, self.require(zone)?)
    }

    /// Convert local time in zone `from` to local time in zone `to`.
    pub fn convert(&self, local: NaiveDateTime, from: &str, to: &str) -> Result<NaiveDateTime> {
        let source = self.require(from)?;
        let dest = self.require(to)?;
        convert::convert(local, source, dest)
    }
}

impl<'a> IntoIterator for &'a RuleStore {
    type Item = &'a ZoneRule;
    type IntoIter = std::slice::Iter<'a, ZoneRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fixed(index: i32, name: &str, bias: i32) -> ZoneRecord {
        ZoneRecord {
            index,
            display_name: name.to_string(),
            standard_name: name.to_string(),
            daylight_name: name.to_string(),
            bias_minutes: bias,
            daylight_delta_minutes: 0,
            standard_transition: None,
            daylight_transition: None,
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_load_sorts_by_index() {
        let store = RuleStore::load(vec![
            fixed(30, "C", 0),
            fixed(10, "A", 0),
            fixed(20, "B", 0),
        ])
        .unwrap();
        let names: Vec<_> = store.iter().map(ZoneRule::display_name).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_load_dedups_on_lowest_index() {
        let store = RuleStore::load(vec![
            fixed(50, "Dup", 120),
            fixed(5, "Dup", 60),
            fixed(10, "Other", 0),
        ])
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("Dup").unwrap().index(), 5);
    }

    #[test]
    fn test_load_equal_index_keeps_source_order() {
        let store = RuleStore::load(vec![fixed(1, "Dup", 120), fixed(1, "Dup", 60)]).unwrap();
        assert_eq!(store.find("Dup").unwrap().standard_offset().num_minutes(), 120);
    }

    #[test]
    fn test_load_rejects_inconsistent_record() {
        let mut bad = fixed(1, "Bad", 0);
        bad.daylight_transition = Some(crate::rule::TransitionRecord {
            month: 3,
            day_of_week: 0,
            week: 2,
            time_of_day: "02:00:00".parse().unwrap(),
        });
        let err = RuleStore::load(vec![fixed(0, "Good", 0), bad]).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidRuleData(_)));
        assert!(err.to_string().contains("'Bad'"), "got: {err}");
    }

    #[test]
    fn test_load_stops_at_first_rejected_record() {
        let mut first = fixed(0, "First", 0);
        first.daylight_transition = Some(crate::rule::TransitionRecord {
            month: 3,
            day_of_week: 9,
            week: 2,
            time_of_day: "02:00:00".parse().unwrap(),
        });
        first.standard_transition = first.daylight_transition;
        let mut second = fixed(1, "Second", 0);
        second.standard_transition = first.standard_transition;

        let err = RuleStore::load(vec![first, second]).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidTransitionRule(_)));
        assert!(err.to_string().contains("'First'"), "got: {err}");
    }

    #[test]
    fn test_find_missing_is_none() {
        let store = RuleStore::bundled().unwrap();
        assert!(store.find("Nonexistent Zone").is_none());
    }

    #[test]
    fn test_require_missing_is_error() {
        let store = RuleStore::bundled().unwrap();
        let err = store.require("Nonexistent Zone").unwrap_err();
        assert!(err.to_string().contains("Zone not found"), "got: {err}");
    }

    #[test]
    fn test_bundled_contains_eastern() {
        let store = RuleStore::bundled().unwrap();
        let eastern = store.find("Eastern Standard Time").unwrap();
        assert_eq!(eastern.daylight_name(), "Eastern Daylight Time");
        assert!(eastern.supports_dst());
        assert!(!store.find("India Standard Time").unwrap().supports_dst());
    }

    #[test]
    fn test_bundled_is_ordered() {
        let store = RuleStore::bundled().unwrap();
        assert!(store.zones().windows(2).all(|w| w[0].index() <= w[1].index()));
    }

    #[test]
    fn test_bundled_resolves_every_year() {
        let store = RuleStore::bundled().unwrap();
        for zone in &store {
            for year in 1990..=2060 {
                crate::dst::daylight_time(year, zone).unwrap();
            }
        }
    }

    #[test]
    fn test_from_json_invalid() {
        let err = RuleStore::from_json("{not json").unwrap_err();
        assert!(matches!(err, ZoneError::Source(_)));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = RuleStore::from_path("/nonexistent/zones.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/zones.json"), "got: {err}");
    }

    #[test]
    fn test_name_based_convert() {
        let store = RuleStore::bundled().unwrap();
        let out = store
            .convert(at("2024-06-01T20:00:00"), "Central Standard Time", "Eastern Standard Time")
            .unwrap();
        assert_eq!(out, at("2024-06-01T21:00:00"));
        assert!(store
            .convert(at("2024-06-01T20:00:00"), "Central Standard Time", "Mars")
            .is_err());
    }

    #[test]
    fn test_name_based_to_utc_and_to_local() {
        let store = RuleStore::bundled().unwrap();
        let utc = store.to_utc(at("2024-01-10T09:00:00"), "Tokyo Standard Time").unwrap();
        assert_eq!(utc, at("2024-01-10T00:00:00"));
        let local = store.to_local(utc, "W. Europe Standard Time").unwrap();
        assert_eq!(local, at("2024-01-10T01:00:00"));
    }

    #[test]
    fn test_shared_across_threads() {
        let store = Arc::new(RuleStore::bundled().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let local = at("2024-07-01T12:00:00") + chrono::Duration::hours(i);
                    store.to_utc(local, "Pacific Standard Time").unwrap()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let expected = at("2024-07-01T19:00:00") + chrono::Duration::hours(i as i64);
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
