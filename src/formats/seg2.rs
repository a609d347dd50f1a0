//! SEG-2: pointer-indexed trace blocks with length-prefixed `KEY value`
//! strings. Reading maps the keyword strings onto canonical fields through
//! [`SEG2_KEYWORDS`]; writing renders them back.

use std::collections::HashMap;
use std::io::Write;

use crate::data::{field, latin1, read_samples, write_samples, ByteOrder, Encoding, SampleFormat, Value};
use crate::error::{Result, TraceError};
use crate::formats::{clock, date, int};
use crate::header::{split_day_of_year, AcquisitionTime, TraceHeader};
use crate::options::WriteOptions;
use crate::record::{Trace, TraceStream};
use crate::schema::{Placement, Seg2Keyword, SEG2_FILE_DESCRIPTOR, SEG2_KEYWORDS, SEG2_TRACE_DESCRIPTOR};
use crate::Format;

pub const FORMAT: &str = "sg2";

const FILE_ID: i64 = 0x3a55;
const FILE_ID_SWAPPED: i64 = 0x553a;
const TRACE_ID: i64 = 0x4422;
const DESCRIPTOR_LEN: usize = 32;
const MIN_POINTER_BLOCK: usize = 4224;
const MIN_TRACE_BLOCK: usize = 484;
/// Coordinates in SEG-2 text are metres, canonical ones centimetres.
pub const SCALCO: i64 = 100;

const ACQUISITION_DATE: &str = "ACQUISITION_DATE";
const ACQUISITION_TIME: &str = "ACQUISITION_TIME";

pub fn read(buf: &[u8]) -> Result<TraceStream> {
    let descriptor = SEG2_FILE_DESCRIPTOR.decode(buf, 0)?;
    match int(&descriptor, "file_id") {
        Some(FILE_ID) => {}
        Some(FILE_ID_SWAPPED) => {
            return Err(TraceError::unsupported(FORMAT, "big-endian SEG-2 files"));
        }
        _ => {
            return Err(TraceError::UnknownFormat {
                format: FORMAT,
                tag: latin1(&buf[..2]),
                offset: 0,
            })
        }
    }
    let traces = int(&descriptor, "traces").unwrap_or(0) as usize;
    let pointer_block = int(&descriptor, "pointer_block_size").unwrap_or(0) as usize;
    log::debug!("sg2: {} traces, {} byte pointer block", traces, pointer_block);

    let file_strings = read_strings(buf, DESCRIPTOR_LEN + pointer_block)?;
    let mut stream = TraceStream::new(Format::Seg2);
    for (key, value) in &file_strings {
        stream.annotate(key.as_str(), value.as_str());
    }

    for i in 0..traces {
        let at = DESCRIPTOR_LEN + 4 * i;
        let pointer = field(4, at, "trace_pointer", Encoding::I32)
            .decode(buf, 0, ByteOrder::Little, FORMAT)?
            .as_i64()
            .unwrap_or(0);
        let pointer = usize::try_from(pointer)
            .map_err(|_| TraceError::malformed(FORMAT, at, format!("trace pointer {}", pointer)))?;
        let trace = read_trace(buf, pointer, &file_strings)?;
        log::trace!("sg2: trace {} at byte {}", i + 1, pointer);
        stream.push(trace.header, trace.samples)?;
    }
    Ok(stream)
}

fn read_trace(buf: &[u8], pointer: usize, file_strings: &[(String, String)]) -> Result<Trace> {
    let block = buf
        .get(pointer..)
        .ok_or_else(|| TraceError::out_of_bounds(FORMAT, "trace_descriptor", pointer, DESCRIPTOR_LEN, 0))?;
    let descriptor = SEG2_TRACE_DESCRIPTOR.decode(block, pointer)?;
    let get = |name| int(&descriptor, name).unwrap_or(0);

    if get("block_id") != TRACE_ID {
        return Err(TraceError::UnknownFormat {
            format: FORMAT,
            tag: format!("{:#06x}", get("block_id")),
            offset: pointer,
        });
    }
    let fmt = match get("sample_code") {
        1 => SampleFormat::U16,
        2 => SampleFormat::U32,
        3 => return Err(TraceError::unsupported(FORMAT, "20-bit packed samples (code 3)")),
        4 => SampleFormat::F32,
        5 => SampleFormat::F64,
        code => return Err(TraceError::unsupported(FORMAT, format!("sample code {}", code))),
    };
    let ns = usize::try_from(get("ns"))
        .map_err(|_| TraceError::malformed(FORMAT, pointer + 8, format!("{} samples", get("ns"))))?;
    if get("data_size") != (ns * fmt.width()) as i64 {
        log::warn!(
            "sg2: trace at byte {} declares {} data bytes for {} samples",
            pointer,
            get("data_size"),
            ns
        );
    }

    let trace_strings = read_strings(buf, pointer + DESCRIPTOR_LEN)?;
    let samples = read_samples(
        buf,
        pointer + get("block_size") as usize,
        ns,
        fmt,
        ByteOrder::Little,
        FORMAT,
    )?;
    let header = map_keywords(file_strings, &trace_strings, ns, pointer)?;
    Ok(Trace { header, samples })
}

/// Read a chain of length-prefixed strings starting at `pos`, up to the zero
/// length terminator. NOTE strings are split into one pair per line.
pub fn read_strings(buf: &[u8], mut pos: usize) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    loop {
        if pos + 2 > buf.len() {
            log::debug!("sg2: string chain at byte {} runs to end of file", pos);
            break;
        }
        let len = u16::from_le_bytes([buf[pos], buf[pos + 1]]) as usize;
        if len == 0 {
            break;
        }
        if len < 3 {
            return Err(TraceError::malformed(FORMAT, pos, format!("string length {}", len)));
        }
        let raw = buf
            .get(pos + 2..pos + len - 1)
            .ok_or_else(|| TraceError::out_of_bounds(FORMAT, "string", pos + 2, len - 3, buf.len() - pos - 2))?;
        let text = latin1(raw);
        let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        match text
            .strip_prefix("NOTE")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            Some(note) => {
                for line in note.lines() {
                    if let Some(pair) = split_pair(line) {
                        pairs.push(pair);
                    }
                }
            }
            None => pairs.extend(split_pair(text)),
        }
        pos += len;
    }
    Ok(pairs)
}

fn split_pair(line: &str) -> Option<(String, String)> {
    let line = line.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if line.is_empty() {
        return None;
    }
    let (key, value) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Some((key.to_string(), value.trim().to_string()))
}

/// Keyword state for one trace (table defaults, file strings, then the trace's
/// own strings) mapped onto a canonical header.
fn map_keywords(
    file_strings: &[(String, String)],
    trace_strings: &[(String, String)],
    ns: usize,
    pointer: usize,
) -> Result<TraceHeader> {
    let mut state: HashMap<&str, &str> = SEG2_KEYWORDS.iter().map(|k| (k.keyword, k.default)).collect();
    for (key, value) in file_strings.iter().chain(trace_strings) {
        state.insert(key.as_str(), value.as_str());
    }

    let mut header = TraceHeader::new();
    for row in SEG2_KEYWORDS
        .iter()
        .filter(|k| k.placement.contains(Placement::TRACE) && !k.targets.is_empty())
    {
        let raw = state.get(row.keyword).copied().unwrap_or(row.default);
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        for (i, target) in row.targets.iter().enumerate() {
            let value = if raw.trim() == "NONE" || row.scale == 0 {
                0
            } else {
                match tokens.get(i).and_then(|t| parse_scaled(t, row.scale)) {
                    Some(v) => v,
                    None => {
                        log::warn!("sg2: {} value {:?} is not numeric, using 0", row.keyword, raw);
                        0
                    }
                }
            };
            header.set(target, value)?;
        }
    }

    let mut time = AcquisitionTime::default();
    if let Some(text) = state.get(ACQUISITION_DATE) {
        match date(text, '/', FORMAT, pointer) {
            Ok((year, day)) => {
                time.year = year;
                time.day = day;
            }
            Err(e) => log::warn!("sg2: {}", e),
        }
    }
    if let Some(text) = state.get(ACQUISITION_TIME) {
        match clock(text, FORMAT, pointer) {
            Ok((hour, minute, second)) => {
                time.hour = hour;
                time.minute = minute;
                time.second = second;
            }
            Err(e) => log::warn!("sg2: {}", e),
        }
    }
    header.set_time(&time);
    header.set("scalco", SCALCO)?;
    header.set("ns", ns as i64)?;
    Ok(header)
}

fn decimals(scale: i64) -> usize {
    let (mut s, mut k) = (scale, 0);
    while s >= 10 && s % 10 == 0 {
        s /= 10;
        k += 1;
    }
    k
}

/// `value / scale` as text with one decimal per power of ten in `scale`,
/// using integer arithmetic (`-8500`, 100 -> `-85.00`).
pub fn render_scaled(value: i64, scale: i64) -> String {
    let k = decimals(scale);
    if k == 0 {
        return value.to_string();
    }
    let p = 10u64.pow(k as u32);
    let abs = value.unsigned_abs();
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}.{:0width$}", sign, abs / p, abs % p, width = k)
}

/// Inverse of [`render_scaled`]: `text x scale`, rounded.
pub fn parse_scaled(text: &str, scale: i64) -> Option<i64> {
    let v: f64 = text.trim().parse().ok()?;
    let scaled = (v * scale as f64).round();
    scaled.is_finite().then_some(scaled as i64)
}

/// Text of a keyword row for one trace.
fn render(row: &Seg2Keyword, header: &TraceHeader) -> String {
    let values: Vec<i64> = row.targets.iter().map(|t| header.get(t).unwrap_or(0)).collect();
    let first = values.first().copied().unwrap_or(0);
    match row.keyword {
        "DESCALING_FACTOR" => match first {
            0 | 36 => "4.270400E-005".to_string(),
            24 => "1.698500E-004".to_string(),
            v => v.to_string(),
        },
        "FIXED_GAIN" => format!("{} DB", if first == 0 { 36 } else { first }),
        _ if row.default == "NONE" && values.iter().all(|v| *v == 0) => "NONE".to_string(),
        _ => values
            .iter()
            .map(|v| render_scaled(*v, row.scale))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn clean(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() || (c as u32) > 0xff { ' ' } else { c })
        .collect()
}

/// One byte per char, anything past Latin-1 becomes a space.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| if (c as u32) > 0xff { b' ' } else { c as u8 }).collect()
}

fn push_string(out: &mut Vec<u8>, text: &str) -> Result<()> {
    let bytes = encode_latin1(&clean(text));
    let len = u16::try_from(bytes.len() + 3).map_err(|_| TraceError::FieldOverflow {
        format: FORMAT,
        field: "string".into(),
        value: format!("{} bytes", bytes.len()),
    })?;
    out.extend(len.to_le_bytes());
    out.extend(bytes);
    out.push(0);
    Ok(())
}

fn push_note(out: &mut Vec<u8>, lines: &[(String, String)]) -> Result<()> {
    let mut body = String::from("NOTE \n");
    for (key, value) in lines {
        body.push_str(&format!(" {} {} \n", clean(key).replace(' ', "_"), clean(value)));
    }
    let body = encode_latin1(&body);
    let len = u16::try_from(body.len() + 5).map_err(|_| TraceError::FieldOverflow {
        format: FORMAT,
        field: "NOTE".into(),
        value: format!("{} bytes", body.len()),
    })?;
    out.extend(len.to_le_bytes());
    out.extend(body);
    out.extend(b"\n\0\0");
    Ok(())
}

/// Zero terminator, then zeros to the next 4-byte boundary.
fn terminate(out: &mut Vec<u8>) {
    out.extend([0, 0]);
    let padded = (out.len() + 3) / 4 * 4;
    out.resize(padded, 0);
}

fn base_interval(stream: &TraceStream) -> String {
    let gx = stream.header("gx");
    if gx.len() < 2 {
        return "1.00".to_string();
    }
    let scalco = match stream.traces()[0].header.get("scalco").unwrap_or(0) {
        0 => 1,
        s => s,
    };
    let hundredths = gx[1]
        .checked_sub(gx[0])
        .and_then(|d| d.checked_mul(100))
        .and_then(|d| d.checked_div(scalco));
    match hundredths {
        Some(0) => "1.00".to_string(),
        Some(h) => render_scaled(h, 100),
        None => {
            log::warn!("sg2: receiver spacing {} to {} overflows, BASE_INTERVAL 1.00", gx[0], gx[1]);
            "1.00".to_string()
        }
    }
}

#[cfg(feature = "chrono")]
fn fallback_time() -> AcquisitionTime {
    AcquisitionTime::now()
}

#[cfg(not(feature = "chrono"))]
fn fallback_time() -> AcquisitionTime {
    AcquisitionTime::default()
}

fn acquisition_time(stream: &TraceStream, opts: &WriteOptions) -> AcquisitionTime {
    opts.acquisition_time
        .or_else(|| {
            stream
                .traces()
                .first()
                .map(|t| t.header.time())
                .filter(|t| !t.is_zero())
        })
        .unwrap_or_else(fallback_time)
}

fn file_header(stream: &TraceStream, opts: &WriteOptions) -> Result<Vec<u8>> {
    let overflow = |field: &str, value: usize| TraceError::FieldOverflow {
        format: FORMAT,
        field: field.into(),
        value: value.to_string(),
    };
    let traces = stream.len();
    let pointer_block = MIN_POINTER_BLOCK.max(4 * traces);
    let traces16 = u16::try_from(traces).map_err(|_| overflow("traces", traces))?;
    let pointer16 = u16::try_from(pointer_block).map_err(|_| overflow("pointer_block_size", pointer_block))?;

    let mut out = SEG2_FILE_DESCRIPTOR.encode_with(|d| match d.name {
        "file_id" => Value::Int(FILE_ID),
        "revision" => Value::Int(1),
        "pointer_block_size" => Value::Int(pointer16 as i64),
        "traces" => Value::Int(traces16 as i64),
        "terminators" => Value::Bytes(vec![0, 0, 0, 1, b'\n', 0]),
        _ => Value::Int(0),
    })?;
    out.resize(DESCRIPTOR_LEN + pointer_block, 0);

    let time = acquisition_time(stream, opts);
    let (month, day) = split_day_of_year(time.day).unwrap_or(("Jan", time.day));
    push_string(&mut out, &format!("{} {:02}/{}/{:04}", ACQUISITION_DATE, day, month, time.year))?;
    push_string(
        &mut out,
        &format!("{} {:02}:{:02}:{:02}", ACQUISITION_TIME, time.hour, time.minute, time.second),
    )?;

    let file_rows = SEG2_KEYWORDS.iter().filter(|k| !k.placement.contains(Placement::TRACE));
    let mut note = Vec::new();
    for row in file_rows {
        let value = match row.keyword {
            "BASE_INTERVAL" => base_interval(stream),
            _ => stream.annotation(row.keyword).unwrap_or(row.default).to_string(),
        };
        if row.placement.contains(Placement::STRUCTURED) {
            push_string(&mut out, &format!("{} {}", row.keyword, value))?;
        } else {
            note.push((row.keyword.to_string(), value));
        }
    }
    note.extend(
        stream
            .text()
            .iter()
            .filter(|(k, _)| k != ACQUISITION_DATE && k != ACQUISITION_TIME)
            .filter(|(k, _)| SEG2_KEYWORDS.iter().all(|row| row.keyword != k))
            .cloned(),
    );
    push_note(&mut out, &note)?;
    terminate(&mut out);
    Ok(out)
}

fn trace_block(trace: &Trace, code: i64, width: usize) -> Result<Vec<u8>> {
    let ns = trace.samples.len();
    let mut strings = Vec::new();
    let mut note = Vec::new();
    for row in SEG2_KEYWORDS.iter().filter(|k| k.placement.contains(Placement::TRACE)) {
        let value = render(row, &trace.header);
        if row.placement.contains(Placement::STRUCTURED) {
            push_string(&mut strings, &format!("{} {}", row.keyword, value))?;
        } else {
            note.push((row.keyword.to_string(), value));
        }
    }
    push_note(&mut strings, &note)?;

    let needed = DESCRIPTOR_LEN + strings.len() + 2;
    let size = if needed <= MIN_TRACE_BLOCK {
        MIN_TRACE_BLOCK
    } else {
        (needed + 3) / 4 * 4
    };
    let size16 = u16::try_from(size).map_err(|_| TraceError::FieldOverflow {
        format: FORMAT,
        field: "block_size".into(),
        value: size.to_string(),
    })?;

    let mut block = SEG2_TRACE_DESCRIPTOR.encode_with(|d| match d.name {
        "block_id" => Value::Int(TRACE_ID),
        "block_size" => Value::Int(size16 as i64),
        "data_size" => Value::Int((ns * width) as i64),
        "ns" => Value::Int(ns as i64),
        "sample_code" => Value::Int(code),
        _ => Value::Int(0),
    })?;
    block.extend(strings);
    block.resize(size, 0);
    Ok(block)
}

/// Write `stream` as SEG-2. Descriptor blocks are built first so the pointer
/// table is known, then each trace is streamed.
pub fn write<W: Write>(stream: &TraceStream, opts: &WriteOptions, out: &mut W) -> Result<()> {
    let (code, fmt) = match opts.seg2_samples {
        SampleFormat::F32 => (4, SampleFormat::F32),
        SampleFormat::F64 => (5, SampleFormat::F64),
        other => {
            return Err(TraceError::unsupported(
                FORMAT,
                format!("writing {:?} samples", other),
            ))
        }
    };
    let mut header = file_header(stream, opts)?;
    let blocks = stream
        .iter()
        .map(|t| trace_block(t, code, fmt.width()))
        .collect::<Result<Vec<_>>>()?;

    let mut pointer = header.len();
    for (i, (block, trace)) in blocks.iter().zip(stream.iter()).enumerate() {
        let slot = field(4, DESCRIPTOR_LEN + 4 * i, "trace_pointer", Encoding::I32);
        let bytes = slot.encode(&Value::Int(pointer as i64), ByteOrder::Little, FORMAT)?;
        header[slot.offset..slot.offset + 4].copy_from_slice(&bytes);
        pointer += block.len() + trace.samples.len() * fmt.width();
    }

    out.write_all(&header)?;
    for (block, trace) in blocks.iter().zip(stream.iter()) {
        out.write_all(block)?;
        out.write_all(&write_samples(&trace.samples, fmt, ByteOrder::Little)?)?;
    }
    log::debug!("sg2: wrote {} traces, {} bytes", stream.len(), pointer);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn stream(n: usize) -> TraceStream {
        let mut s = TraceStream::new(Format::Su);
        for i in 0..n {
            let mut h = TraceHeader::new();
            h.set("ns", 3).unwrap();
            h.set("dt", 125).unwrap();
            h.set("sx", -8500).unwrap();
            h.set("gx", 500 * i as i64).unwrap();
            h.set("scalco", 100).unwrap();
            h.set("igc", 24).unwrap();
            h.set("lcutf", 10).unwrap();
            h.set("lcuts", 12).unwrap();
            h.set_time(&AcquisitionTime::from_parts(2016, 2, 1, 9, 5, 7));
            s.push(h, vec![i as f32, 0.5, -1.0]).unwrap();
        }
        s
    }

    fn to_bytes(s: &TraceStream, opts: &WriteOptions) -> Vec<u8> {
        let mut out = Vec::new();
        write(s, opts, &mut out).unwrap();
        out
    }

    #[test]
    fn scaled_text() {
        assert_eq!(render_scaled(-8500, 100), "-85.00");
        assert_eq!(parse_scaled("-85.00", 100), Some(-8500));
        assert_eq!(render_scaled(125, 1_000_000), "0.000125");
        assert_eq!(parse_scaled("0.000125", 1_000_000), Some(125));
        assert_eq!(render_scaled(-5, 100), "-0.05");
        assert_eq!(render_scaled(7, 1), "7");
        assert_eq!(render_scaled(7, 0), "7");
        assert_eq!(parse_scaled("abc", 1), None);
    }

    #[test]
    fn keyword_rendering() {
        let mut h = TraceHeader::new();
        let row = |k| crate::schema::seg2_keyword(k).unwrap();
        assert_eq!(render(row("FIXED_GAIN"), &h), "36 DB");
        assert_eq!(render(row("DESCALING_FACTOR"), &h), "4.270400E-005");
        assert_eq!(render(row("RAW_RECORD"), &h), "NONE");
        assert_eq!(render(row("LOW_CUT_FILTER"), &h), "0 0");
        h.set("igc", 24).unwrap();
        h.set("stacktr", 3).unwrap();
        assert_eq!(render(row("FIXED_GAIN"), &h), "24 DB");
        assert_eq!(render(row("DESCALING_FACTOR"), &h), "1.698500E-004");
        assert_eq!(render(row("RAW_RECORD"), &h), "3");
    }

    #[test]
    fn round_trip() {
        let s = stream(3);
        let bytes = to_bytes(&s, &WriteOptions::new());
        assert_eq!(&bytes[..2], b"U:");
        let back = read(&bytes).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.header("sx"), vec![-8500; 3]);
        assert_eq!(back.header("gx"), vec![0, 500, 1000]);
        assert_eq!(back.header("dt"), vec![125; 3]);
        assert_eq!(back.header("igc"), vec![24; 3]);
        assert_eq!(back.header("lcuts"), vec![12; 3]);
        assert_eq!(back.header("day"), vec![32; 3]);
        assert_eq!(back.header("scalco"), vec![100; 3]);
        assert_eq!(back.traces()[2].samples, vec![2.0, 0.5, -1.0]);
        assert_eq!(back.annotation("BASE_INTERVAL"), Some("5.00"));
        assert_eq!(back.annotation("ACQUISITION_DATE"), Some("01/Feb/2016"));
        assert_eq!(back.annotation("COMPANY"), Some("Geometrics"));

        let again = read(&to_bytes(&back, &WriteOptions::new())).unwrap();
        assert_eq!(again.traces(), back.traces());
    }

    #[test]
    fn layout() {
        let bytes = to_bytes(&stream(1), &WriteOptions::new().seg2_samples(SampleFormat::F64));
        let pointer = i32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]) as usize;
        assert_eq!(pointer % 4, 0);
        assert_eq!(&bytes[pointer..pointer + 2], &[0x22, 0x44]);
        let block = u16::from_le_bytes([bytes[pointer + 2], bytes[pointer + 3]]) as usize;
        assert!(block >= MIN_TRACE_BLOCK && block % 4 == 0);
        assert_eq!(bytes[pointer + 12], 5);
        assert_eq!(bytes.len(), pointer + block + 3 * 8);
        assert_eq!(read(&bytes).unwrap().traces()[0].samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn rejects_20_bit_and_foreign_ids() {
        let mut bytes = to_bytes(&stream(1), &WriteOptions::new());
        let pointer = i32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]) as usize;
        bytes[pointer + 12] = 3;
        assert!(matches!(read(&bytes), Err(TraceError::UnsupportedEncoding { .. })));
        bytes[pointer] = 0;
        assert!(matches!(read(&bytes), Err(TraceError::UnknownFormat { .. })));
        bytes[0..2].copy_from_slice(b":U");
        assert!(matches!(read(&bytes), Err(TraceError::UnsupportedEncoding { .. })));
        bytes[0..2].copy_from_slice(b"XX");
        assert!(matches!(read(&bytes), Err(TraceError::UnknownFormat { offset: 0, .. })));
    }

    #[test]
    fn base_interval_overflow() {
        let mut s = stream(2);
        s.set_header("gx", vec![0i64, i64::MAX / 10]).unwrap();
        assert_eq!(base_interval(&s), "1.00");
        assert!(read(&to_bytes(&s, &WriteOptions::new())).is_ok());
        s.set_header("gx", vec![i64::MIN, 1i64]).unwrap();
        assert_eq!(base_interval(&s), "1.00");
        s.set_header("gx", vec![0i64, 250]).unwrap();
        assert_eq!(base_interval(&s), "2.50");
    }

    /// Rewrite the single trace of `bytes` as integer samples of `code`.
    fn integer_samples(mut bytes: Vec<u8>, code: u8, raw: &[u8]) -> Vec<u8> {
        let pointer = i32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]) as usize;
        let block = u16::from_le_bytes([bytes[pointer + 2], bytes[pointer + 3]]) as usize;
        bytes[pointer + 4..pointer + 8].copy_from_slice(&(raw.len() as u32).to_le_bytes());
        bytes[pointer + 12] = code;
        bytes.truncate(pointer + block);
        bytes.extend_from_slice(raw);
        bytes
    }

    #[test]
    fn unsigned_integer_samples() {
        let bytes = to_bytes(&stream(1), &WriteOptions::new());

        let raw: Vec<u8> = [7u16, 0, 65535].iter().flat_map(|v| v.to_le_bytes()).collect();
        let back = read(&integer_samples(bytes.clone(), 1, &raw)).unwrap();
        assert_eq!(back.traces()[0].samples, vec![7.0, 0.0, 65535.0]);
        assert_eq!(back.header("ns"), vec![3]);

        let raw: Vec<u8> = [1u32, 70000, 4_000_000].iter().flat_map(|v| v.to_le_bytes()).collect();
        let back = read(&integer_samples(bytes, 2, &raw)).unwrap();
        assert_eq!(back.traces()[0].samples, vec![1.0, 70000.0, 4_000_000.0]);
    }

    #[test]
    fn strings_and_notes() {
        let mut buf = Vec::new();
        push_string(&mut buf, "COMPANY Acme Surveys").unwrap();
        push_note(&mut buf, &[("SHOT_INCREMENT".into(), "2.50".into()), ("OPERATOR".into(), "J Doe".into())]).unwrap();
        terminate(&mut buf);
        let pairs = read_strings(&buf, 0).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("COMPANY".to_string(), "Acme Surveys".to_string()),
                ("SHOT_INCREMENT".to_string(), "2.50".to_string()),
                ("OPERATOR".to_string(), "J Doe".to_string()),
            ]
        );
    }

    #[test]
    fn trace_strings_override_file_strings() {
        let file = vec![("SOURCE_LOCATION".to_string(), "1.00".to_string())];
        let trace = vec![("SOURCE_LOCATION".to_string(), "2.50".to_string())];
        assert_eq!(map_keywords(&file, &[], 0, 0).unwrap().get("sx"), Some(100));
        assert_eq!(map_keywords(&file, &trace, 0, 0).unwrap().get("sx"), Some(250));
        // table default when nothing overrides
        assert_eq!(map_keywords(&[], &[], 0, 0).unwrap().get("sx"), Some(-8500));
        let bad = vec![("DELAY".to_string(), "soon".to_string())];
        assert_eq!(map_keywords(&[], &bad, 0, 0).unwrap().get("tstat"), Some(0));
    }
}
