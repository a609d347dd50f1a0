//! Imagenix sonar records: a 112-byte header tagged `81e`, `851` or `852`,
//! a signed 8-bit echo block sized by the `IPX`/`IMX`/`IGX` data tag, zero
//! fill and one terminator byte.

use crate::data::{latin1, read_samples, ByteOrder, SampleFormat, Value};
use crate::error::{Result, TraceError};
use crate::formats::{clock, date, int, text};
use crate::header::TraceHeader;
use crate::options::ReadOptions;
use crate::record::TraceStream;
use crate::schema::{Schema, IM81E_HEADER, IM851_HEADER, IM852_HEADER};
use crate::Format;

pub const FORMAT: &str = "im";
pub const HEADER_LEN: usize = 112;

const DATA_TAG: usize = 100;

/// (tag, echo bytes, zero fill)
const DATA_LAYOUTS: [(&str, usize, usize); 3] = [("IPX", 0, 15), ("IMX", 252, 19), ("IGX", 500, 27)];

fn tag(buf: &[u8], offset: usize) -> Result<String> {
    buf.get(offset..offset + 3)
        .map(latin1)
        .ok_or_else(|| TraceError::out_of_bounds(FORMAT, "tag", offset, 3, buf.len().saturating_sub(offset)))
}

/// Header table selected by the record tag at `pos`.
pub fn record_schema(buf: &[u8], pos: usize) -> Result<Schema> {
    let found = tag(buf, pos)?;
    match found.to_ascii_lowercase().as_str() {
        "81e" => Ok(IM81E_HEADER),
        "851" => Ok(IM851_HEADER),
        "852" => Ok(IM852_HEADER),
        _ => Err(TraceError::UnknownFormat {
            format: FORMAT,
            tag: found,
            offset: pos,
        }),
    }
}

/// Echo bytes and zero fill for the data tag of the record at `pos`.
fn data_layout(buf: &[u8], pos: usize) -> Result<(usize, usize)> {
    let found = tag(buf, pos + DATA_TAG)?;
    DATA_LAYOUTS
        .iter()
        .find(|(t, _, _)| *t == found)
        .map(|&(_, data, fill)| (data, fill))
        .ok_or(TraceError::UnknownFormat {
            format: FORMAT,
            tag: found,
            offset: pos + DATA_TAG,
        })
}

/// Every named vendor field of the record header at `pos`, bit-packed ones
/// included.
pub fn decode_record_header(buf: &[u8], pos: usize) -> Result<Vec<(&'static str, Value)>> {
    let schema = record_schema(buf, pos)?;
    let end = (pos + HEADER_LEN).min(buf.len());
    schema.decode(&buf[pos..end], pos)
}

pub fn read(buf: &[u8], opts: &ReadOptions) -> Result<TraceStream> {
    let mut stream = TraceStream::new(Format::Imagenix);
    let mut last_text = String::new();
    let mut pos = 0;
    while pos < buf.len() {
        if buf.len() - pos < HEADER_LEN {
            log::warn!("im: ignoring {} trailing bytes", buf.len() - pos);
            break;
        }
        let (data, fill) = data_layout(buf, pos)?;
        let stride = HEADER_LEN + data + fill + 1;
        if pos + stride > buf.len() {
            log::warn!("im: ignoring {} trailing bytes", buf.len() - pos);
            break;
        }
        let fields = decode_record_header(buf, pos)?;
        let header = map_header(&fields, data, pos, opts)?;
        let samples = read_samples(
            buf,
            pos + HEADER_LEN,
            data,
            SampleFormat::I8,
            ByteOrder::Big,
            FORMAT,
        )?;

        let header_text = text(&fields, "header_text");
        if !header_text.is_empty() && header_text != last_text {
            stream.annotate("header_text", header_text);
            last_text = header_text.to_string();
        }
        log::trace!("im: record {} at byte {}, {} echo bytes", stream.len() + 1, pos, data);
        stream.push(header, samples)?;
        pos += stride;
    }
    Ok(stream)
}

fn map_header(
    fields: &[(&'static str, Value)],
    ns: usize,
    pos: usize,
    opts: &ReadOptions,
) -> Result<TraceHeader> {
    let mut header = TraceHeader::new();
    header.set("ns", ns as i64)?;
    header.set("gain", int(fields, "gain").unwrap_or(0))?;

    let (hour, minute, second) = clock(text(fields, "time"), FORMAT, pos + 20)?;
    let (year, day) = date(text(fields, "date"), '-', FORMAT, pos + 8)?;
    header.set("year", year)?;
    header.set("day", day)?;
    header.set("hour", hour)?;
    header.set("minute", minute)?;
    header.set("second", second)?;

    let velocity = match int(fields, "water_velocity") {
        Some(v) if v != 0 => v as f64,
        _ => opts.water_velocity,
    };
    let range = int(fields, "range").unwrap_or(0) as f64;
    let dt = if ns == 0 || velocity == 0.0 {
        0
    } else {
        ((2.0 * range / velocity) / ns as f64 * 1e6).trunc() as i64
    };
    header.set("dt", dt)?;
    Ok(header)
}
