//! # zone-rules
//!
//! Deterministic daylight-saving rule engine for Windows-style zone rules.
//!
//! A zone is described by a standard bias, a daylight delta, and two yearly
//! transitions of the form "Nth (or last) weekday of a month at a time of
//! day". This crate resolves those transitions for any year, decides whether
//! a local or UTC timestamp falls in daylight time, and converts timestamps
//! between local civil time, UTC, and other zones. Every function is a pure
//! computation over its inputs; the only state is the read-only
//! [`RuleStore`] the caller builds once and passes around.
//!
//! ## Modules
//!
//! - [`rule`] — Zone and transition rule data model, raw records
//! - [`resolver`] — Nth-weekday-of-month date resolution
//! - [`dst`] — Yearly DST intervals and DST-active determination
//! - [`convert`] — UTC offsets, local↔UTC and zone↔zone conversion
//! - [`store`] — Ordered rule store with lookup by display name
//! - [`tzi`] — Decoder for the Windows `REG_TZI_FORMAT` blob
//! - [`error`] — Error types

pub mod convert;
pub mod dst;
pub mod error;
pub mod resolver;
pub mod rule;
pub mod store;
pub mod tzi;

pub use convert::{
    convert, format_utc_offset, to_local, to_utc, utc_offset_from_local, utc_offset_from_utc,
    zone_time, ZoneTime,
};
pub use dst::{daylight_time, is_dst_from_local, is_dst_from_utc, DaylightTime};
pub use error::{Result, ZoneError};
pub use resolver::resolve_relative_date;
pub use rule::{DstTransitions, TransitionRecord, TransitionRule, WeekOfMonth, ZoneRecord, ZoneRule};
pub use store::RuleStore;
pub use tzi::Tzi;
