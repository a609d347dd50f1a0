//! GSSI radar `.dzt`: one 128-byte file header, then headerless scans of
//! `ns` unsigned samples starting at `data_offset`.

use crate::data::{latin1, read_samples, ByteOrder, SampleFormat, Value};
use crate::error::{Result, TraceError};
use crate::formats::{int, text};
use crate::header::{day_of_year, AcquisitionTime, TraceHeader};
use crate::record::TraceStream;
use crate::schema::{lookup, DZT_DATE, DZT_HEADER};
use crate::Format;

pub const FORMAT: &str = "dzt";

const DATE_CREATED: usize = 32;

pub fn read(buf: &[u8]) -> Result<TraceStream> {
    let fields = DZT_HEADER.decode(buf, 0)?;
    let float = |name| lookup(&fields, name).and_then(Value::as_f64).unwrap_or(0.0);

    let ns = int(&fields, "ns").unwrap_or(0) as usize;
    if ns == 0 {
        return Err(TraceError::malformed(FORMAT, 4, "scans hold no samples"));
    }
    let fmt = match int(&fields, "data_bits") {
        Some(8) => SampleFormat::U8,
        Some(16) => SampleFormat::U16,
        Some(32) => SampleFormat::U32,
        other => {
            return Err(TraceError::unsupported(
                FORMAT,
                format!("{:?} bits per sample", other),
            ))
        }
    };
    let data_offset = int(&fields, "data_offset").unwrap_or(0) as usize;

    let mut template = TraceHeader::new();
    template.set("ns", ns as i64)?;
    template.set("dt", (1000.0 * float("range_ns") / ns as f64).trunc() as i64)?;
    template.set("gelev", float("range").trunc() as i64)?;
    template.set("selev", float("dia_const").trunc() as i64)?;
    template.set_time(&creation_time(buf)?);

    let mut stream = TraceStream::new(Format::Dzt);
    for key in ["antenna", "file_name"] {
        let value = text(&fields, key);
        if !value.is_empty() {
            stream.annotate(key, value);
        }
    }
    annotate_text_block(buf, &fields, &mut stream);

    let band = ns * fmt.width();
    let mut pos = data_offset;
    log::debug!("dzt: {} samples of {:?} per scan from byte {}", ns, fmt, pos);
    while pos + band <= buf.len() {
        let samples = read_samples(buf, pos, ns, fmt, ByteOrder::Little, FORMAT)?;
        log::trace!("dzt: scan {} at byte {}", stream.len() + 1, pos);
        stream.push(template.clone(), samples)?;
        pos += band;
    }
    if pos < buf.len() {
        log::warn!("dzt: ignoring {} trailing bytes", buf.len() - pos);
    }
    Ok(stream)
}

/// Creation timestamp packed in the header's `date_c` word.
pub fn creation_time(buf: &[u8]) -> Result<AcquisitionTime> {
    let word = buf
        .get(DATE_CREATED..DATE_CREATED + 4)
        .ok_or_else(|| TraceError::out_of_bounds(FORMAT, "date_c", DATE_CREATED, 4, buf.len()))?;
    let mut window = [0u8; 4];
    window.copy_from_slice(word);
    window.reverse();

    let date = DZT_DATE.decode(&window, DATE_CREATED)?;
    let get = |name| int(&date, name).unwrap_or(0);
    let month = get("month");
    let day = match day_of_year(month as usize, get("day")) {
        Some(day) => day,
        None => {
            log::warn!("dzt: month {} out of range, day of year left as day of month", month);
            get("day")
        }
    };
    Ok(AcquisitionTime {
        year: get("year"),
        day,
        hour: get("hour"),
        minute: get("minute"),
        second: get("second"),
    })
}

fn annotate_text_block(buf: &[u8], fields: &[(&'static str, Value)], stream: &mut TraceStream) {
    let offset = int(fields, "text_offset").unwrap_or(0) as usize;
    let size = int(fields, "text_size").unwrap_or(0) as usize;
    if size == 0 {
        return;
    }
    match buf.get(offset..offset + size) {
        Some(block) => {
            let block = latin1(block);
            let block = block.trim_matches(|c: char| c == '\0' || c.is_whitespace());
            if !block.is_empty() {
                stream.annotate("text", block);
            }
        }
        None => log::warn!("dzt: text block {}+{} past end of file", offset, size),
    }
}
