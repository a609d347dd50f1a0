//! SICK laser swath ASCII lines: 8 header columns then range samples, one
//! scan per line.

use crate::error::{Result, TraceError};
use crate::header::{day_of_year, TraceHeader};
use crate::options::ReadOptions;
use crate::record::TraceStream;
use crate::schema::SICK_COLUMNS;
use crate::Format;

pub const FORMAT: &str = "sick";

pub fn read(buf: &[u8], opts: &ReadOptions) -> Result<TraceStream> {
    let src = std::str::from_utf8(buf)
        .map_err(|e| TraceError::malformed(FORMAT, e.valid_up_to(), "not valid text"))?;

    let mut stream = TraceStream::new(Format::Sick);
    let mut previous: Option<&str> = None;
    let mut offset = 0;
    for (i, raw) in src.split_inclusive('\n').enumerate() {
        let line_offset = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split(opts.delimiter).map(str::trim).collect();
        let key = tokens[0];
        let first = previous.is_none();
        let repeated = previous == Some(key);
        previous = Some(key);
        if first || repeated {
            continue;
        }
        let bad = |detail: String| TraceError::malformed(FORMAT, line_offset, format!("line {}: {}", i + 1, detail));
        let key_value: f64 = key.parse().map_err(|_| bad(format!("reference key {:?}", key)))?;
        if key_value <= opts.key_threshold {
            continue;
        }
        if tokens.len() < SICK_COLUMNS.len() {
            return Err(bad(format!("{} columns, the scan header needs {}", tokens.len(), SICK_COLUMNS.len())));
        }

        let mut columns = [0.0f64; 8];
        for (slot, (name, token)) in columns.iter_mut().zip(SICK_COLUMNS.iter().zip(&tokens)) {
            *slot = token.parse().map_err(|_| bad(format!("{} {:?}", name, token)))?;
        }
        let samples = tokens
            .get(SICK_COLUMNS.len()..tokens.len() - 1)
            .unwrap_or(&[])
            .iter()
            .map(|t| t.parse::<f32>().map_err(|_| bad(format!("sample {:?}", t))))
            .collect::<Result<Vec<f32>>>()?;

        let [_, year, month, day, hour, minute, second, _] = columns.map(|c| c.trunc() as i64);
        let mut header = TraceHeader::new();
        header.set("ns", samples.len() as i64)?;
        header.set("year", year)?;
        header.set("day", day_of_year(month as usize, day).unwrap_or(day))?;
        header.set("hour", hour)?;
        header.set("minute", minute)?;
        header.set("second", second)?;
        log::trace!("sick: line {} key {} with {} samples", i + 1, key, samples.len());
        stream.push(header, samples)?;
    }
    Ok(stream)
}
