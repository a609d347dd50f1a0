//! Per-format trace-framing walkers, plus the SEG-2 writer.

pub mod dzt;
pub mod imagenix;
pub mod seg2;
pub mod segy;
pub mod sick;
pub mod su;

use crate::data::Value;
use crate::error::{Result, TraceError};
use crate::schema::lookup;

/// Trimmed text of a decoded character field, empty when absent.
pub(crate) fn text<'a>(fields: &'a [(&'static str, Value)], name: &str) -> &'a str {
    lookup(fields, name)
        .and_then(Value::as_text)
        .map(|s| s.trim_matches(|c: char| c == '\0' || c.is_whitespace()))
        .unwrap_or("")
}

/// Integer view of a decoded numeric field.
pub(crate) fn int(fields: &[(&'static str, Value)], name: &str) -> Option<i64> {
    lookup(fields, name).and_then(Value::as_i64)
}

/// Split `src` into exactly `N` trimmed parts.
pub(crate) fn numbers<'a, const N: usize>(
    src: &'a str,
    sep: char,
    format: &'static str,
    offset: usize,
) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = src.split(sep).map(str::trim).collect();
    <[&str; N]>::try_from(parts).map_err(|parts| {
        TraceError::malformed(
            format,
            offset,
            format!("expected {} parts separated by {:?}, got {:?}", N, sep, parts),
        )
    })
}

/// `HH:MM:SS`, seconds may carry a fraction which is dropped.
pub(crate) fn clock(src: &str, format: &'static str, offset: usize) -> Result<(i64, i64, i64)> {
    let [h, m, s] = numbers::<3>(src, ':', format, offset)?;
    let bad = || TraceError::malformed(format, offset, format!("bad time {:?}", src));
    Ok((
        h.parse().map_err(|_| bad())?,
        m.parse().map_err(|_| bad())?,
        s.parse::<f64>().map_err(|_| bad())?.trunc() as i64,
    ))
}

/// `DD<sep>Mon<sep>YYYY` to (year, day of year).
pub(crate) fn date(src: &str, sep: char, format: &'static str, offset: usize) -> Result<(i64, i64)> {
    let [d, mon, y] = numbers::<3>(src, sep, format, offset)?;
    let bad = || TraceError::malformed(format, offset, format!("bad date {:?}", src));
    let month = crate::header::month_number(mon).ok_or_else(bad)?;
    let day: i64 = d.parse().map_err(|_| bad())?;
    let year: i64 = y.parse().map_err(|_| bad())?;
    Ok((year, crate::header::day_of_year(month, day).ok_or_else(bad)?))
}
