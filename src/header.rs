//! Canonical trace header, the Seismic Unix vocabulary every reader maps into
//! and every writer maps out of.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::data::{ByteOrder, Value};
use crate::error::{Result, TraceError};
use crate::schema::SU_TRACE_HEADER;

/// Number of canonical fields.
pub const FIELD_COUNT: usize = 90;

/// Ordered name -> value mapping over the 90 canonical fields. Every field is
/// present and starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceHeader {
    values: [i64; FIELD_COUNT],
}

impl Default for TraceHeader {
    fn default() -> Self {
        Self {
            values: [0; FIELD_COUNT],
        }
    }
}

impl TraceHeader {
    /// An all-zero header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical field names in header order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        SU_TRACE_HEADER.fields.iter().map(|f| f.name)
    }

    pub fn index_of(name: &str) -> Option<usize> {
        SU_TRACE_HEADER.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(name: &str) -> bool {
        Self::index_of(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        Self::index_of(name).map(|i| self.values[i])
    }

    /// Set a canonical field, unknown names are rejected.
    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        let i = Self::index_of(name)
            .ok_or_else(|| TraceError::InvalidArgument(format!("unknown header field `{}`", name)))?;
        self.values[i] = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        Self::names().zip(self.values.iter().copied())
    }

    pub fn tracl(&self) -> i64 {
        self.values[0]
    }

    /// Sample count, negative values read as zero.
    pub fn ns(&self) -> usize {
        self.get("ns").map_or(0, |v| v.max(0) as usize)
    }

    pub fn time(&self) -> AcquisitionTime {
        let get = |name| self.get(name).unwrap_or(0);
        AcquisitionTime {
            year: get("year"),
            day: get("day"),
            hour: get("hour"),
            minute: get("minute"),
            second: get("second"),
        }
    }

    pub fn set_time(&mut self, time: &AcquisitionTime) {
        for (name, value) in [
            ("year", time.year),
            ("day", time.day),
            ("hour", time.hour),
            ("minute", time.minute),
            ("second", time.second),
        ] {
            if let Some(i) = Self::index_of(name) {
                self.values[i] = value;
            }
        }
    }

    /// Decode a 240-byte trace header block.
    pub fn decode(frame: &[u8], base: usize, order: ByteOrder) -> Result<Self> {
        let schema = SU_TRACE_HEADER.with_order(order);
        let mut header = Self::new();
        for (i, desc) in schema.fields.iter().enumerate() {
            header.values[i] = schema.decode_field(desc, frame, base)?.as_i64().unwrap_or(0);
        }
        Ok(header)
    }

    /// Encode as a 240-byte trace header block.
    pub fn encode(&self, order: ByteOrder) -> Result<Vec<u8>> {
        SU_TRACE_HEADER
            .with_order(order)
            .encode_with(|desc| Value::Int(self.get(desc.name).unwrap_or(0)))
    }
}

impl Serialize for TraceHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Cumulative days before each month. Leap years are not modelled.
pub const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 1-based month number of an abbreviation, case-insensitive.
pub fn month_number(name: &str) -> Option<usize> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i + 1)
}

/// Day of year for a 1-based month and day of month.
pub fn day_of_year(month: usize, day: i64) -> Option<i64> {
    match month {
        1..=12 => Some(DAYS_BEFORE_MONTH[month - 1] + day),
        _ => None,
    }
}

/// Month abbreviation and day of month for a day of year. Days past the end
/// of December stay in December (366 is `Dec 32`).
pub fn split_day_of_year(day: i64) -> Option<(&'static str, i64)> {
    if day < 1 {
        return None;
    }
    let month = DAYS_BEFORE_MONTH
        .iter()
        .rposition(|&before| before < day)?;
    Some((MONTHS[month], day - DAYS_BEFORE_MONTH[month]))
}

/// Acquisition timestamp in the canonical header's terms.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcquisitionTime {
    pub year: i64,
    /// Day of year, see [`DAYS_BEFORE_MONTH`].
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

impl AcquisitionTime {
    pub fn from_parts(year: i64, month: usize, day: i64, hour: i64, minute: i64, second: i64) -> Self {
        Self {
            year,
            day: day_of_year(month, day).unwrap_or(day),
            hour,
            minute,
            second,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Current local time.
    #[cfg(feature = "chrono")]
    pub fn now() -> Self {
        chrono::Local::now().naive_local().into()
    }

    #[cfg(feature = "chrono")]
    pub fn to_naive(&self) -> Option<chrono::NaiveDateTime> {
        let (month, day) = split_day_of_year(self.day)?;
        let month = month_number(month)?;
        chrono::NaiveDate::from_ymd_opt(
            i32::try_from(self.year).ok()?,
            month as u32,
            u32::try_from(day).ok()?,
        )?
        .and_hms_opt(
            u32::try_from(self.hour).ok()?,
            u32::try_from(self.minute).ok()?,
            u32::try_from(self.second).ok()?,
        )
    }
}

impl fmt::Display for AcquisitionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match split_day_of_year(self.day) {
            Some((month, day)) => write!(
                f,
                "{:02}/{}/{:04} {:02}:{:02}:{:02}",
                day, month, self.year, self.hour, self.minute, self.second
            ),
            None => write!(
                f,
                "{:04}-{:03} {:02}:{:02}:{:02}",
                self.year, self.day, self.hour, self.minute, self.second
            ),
        }
    }
}

#[cfg(feature = "chrono")]
use chrono::{Datelike, Timelike};
#[cfg(feature = "chrono")]
impl From<chrono::NaiveDateTime> for AcquisitionTime {
    fn from(t: chrono::NaiveDateTime) -> Self {
        AcquisitionTime::from_parts(
            t.year() as i64,
            t.month() as usize,
            t.day() as i64,
            t.hour() as i64,
            t.minute() as i64,
            t.second() as i64,
        )
    }
}
