//! Decoder for the Windows `REG_TZI_FORMAT` blob.
//!
//! Windows stores each zone's offsets and transition dates as a 44-byte
//! little-endian structure:
//!
//! | offset | field          | type         |
//! |--------|----------------|--------------|
//! | 0      | `Bias`         | `i32`        |
//! | 4      | `StandardBias` | `i32`        |
//! | 8      | `DaylightBias` | `i32`        |
//! | 12     | `StandardDate` | `SYSTEMTIME` |
//! | 28     | `DaylightDate` | `SYSTEMTIME` |
//!
//! A `SYSTEMTIME` is eight `u16`s: year, month, day-of-week, day, hour,
//! minute, second, milliseconds. For recurring rules the year is zero and
//! "day" is the week-of-month (`1..=5`, `5` = last).
//!
//! Reading the blob out of the registry is the caller's business; this
//! module only decodes bytes into a [`ZoneRecord`].

use chrono::NaiveTime;

use crate::error::{Result, ZoneError};
use crate::rule::{TransitionRecord, ZoneRecord};

/// Size of a `REG_TZI_FORMAT` blob in bytes.
pub const TZI_LEN: usize = 44;

/// A decoded `SYSTEMTIME` transition descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemTime {
    pub year: u16,
    pub month: u16,
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub milliseconds: u16,
}

/// A decoded `REG_TZI_FORMAT` blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tzi {
    pub bias: i32,
    pub standard_bias: i32,
    pub daylight_bias: i32,
    pub standard_date: SystemTime,
    pub daylight_date: SystemTime,
}

impl Tzi {
    /// Decode a 44-byte blob.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidRuleData`] if `bytes` is not exactly
    /// [`TZI_LEN`] long.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != TZI_LEN {
            return Err(ZoneError::InvalidRuleData(format!(
                "TZI blob is {} bytes, expected {TZI_LEN}",
                bytes.len()
            )));
        }

        Ok(Self {
            bias: read_i32(bytes, 0),
            standard_bias: read_i32(bytes, 4),
            daylight_bias: read_i32(bytes, 8),
            standard_date: read_systemtime(bytes, 12),
            daylight_date: read_systemtime(bytes, 28),
        })
    }

    /// Encode back into the 44-byte layout.
    pub fn encode(&self) -> [u8; TZI_LEN] {
        let mut out = [0u8; TZI_LEN];
        out[0..4].copy_from_slice(&self.bias.to_le_bytes());
        out[4..8].copy_from_slice(&self.standard_bias.to_le_bytes());
        out[8..12].copy_from_slice(&self.daylight_bias.to_le_bytes());
        write_systemtime(&mut out, 12, &self.standard_date);
        write_systemtime(&mut out, 28, &self.daylight_date);
        out
    }
}

impl SystemTime {
    /// Interpret this as a recurring transition. Month zero means none.
    fn to_transition(self) -> Result<Option<TransitionRecord>> {
        if self.month == 0 {
            return Ok(None);
        }
        let time_of_day: NaiveTime = TransitionRecord::time_from_parts(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
            self.milliseconds as u32,
        )?;
        Ok(Some(TransitionRecord {
            month: self.month as u32,
            day_of_week: self.day_of_week as u32,
            week: self.day as u32,
            time_of_day,
        }))
    }
}

impl ZoneRecord {
    /// Build a record from a decoded TZI blob and the zone's names.
    ///
    /// `StandardBias` is ignored: Windows zones carry zero there and the
    /// standard offset is `Bias` alone.
    pub fn from_tzi(
        index: i32,
        display_name: impl Into<String>,
        standard_name: impl Into<String>,
        daylight_name: impl Into<String>,
        tzi: &Tzi,
    ) -> Result<Self> {
        Ok(Self {
            index,
            display_name: display_name.into(),
            standard_name: standard_name.into(),
            daylight_name: daylight_name.into(),
            bias_minutes: tzi.bias,
            daylight_delta_minutes: tzi.daylight_bias,
            standard_transition: tzi.standard_date.to_transition()?,
            daylight_transition: tzi.daylight_date.to_transition()?,
        })
    }
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_systemtime(bytes: &[u8], at: usize) -> SystemTime {
    SystemTime {
        year: read_u16(bytes, at),
        month: read_u16(bytes, at + 2),
        day_of_week: read_u16(bytes, at + 4),
        day: read_u16(bytes, at + 6),
        hour: read_u16(bytes, at + 8),
        minute: read_u16(bytes, at + 10),
        second: read_u16(bytes, at + 12),
        milliseconds: read_u16(bytes, at + 14),
    }
}

fn write_systemtime(out: &mut [u8; TZI_LEN], at: usize, st: &SystemTime) {
    let fields = [
        st.year,
        st.month,
        st.day_of_week,
        st.day,
        st.hour,
        st.minute,
        st.second,
        st.milliseconds,
    ];
    for (i, field) in fields.iter().enumerate() {
        out[at + i * 2..at + i * 2 + 2].copy_from_slice(&field.to_le_bytes());
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
