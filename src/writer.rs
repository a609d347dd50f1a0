//! Canonical stream to target bytes. Output is streamed trace by trace.

use std::io::Write;

use crate::data::{write_samples, ByteOrder, Encoding, SampleFormat, Value};
use crate::error::{Result, TraceError};
use crate::formats::seg2;
use crate::header::TraceHeader;
use crate::options::WriteOptions;
use crate::record::{Trace, TraceStream};
use crate::schema::{segy_mandatory, SEGY_FILE_HEADER};
use crate::Format;

/// Write `stream` in `format`. DZT, Imagenix and SICK are read-only.
pub fn write<W: Write>(stream: &TraceStream, format: Format, opts: &WriteOptions, out: &mut W) -> Result<()> {
    log::debug!(
        "writing {} traces read as {} to {}",
        stream.len(),
        stream.format(),
        format
    );
    match format {
        Format::Su => {
            fixed_stride(stream, format)?;
            for trace in stream {
                write_trace(trace, ByteOrder::Little, out)?;
            }
            Ok(())
        }
        Format::Segy => write_segy(stream, opts, out),
        Format::Seg2 => seg2::write(stream, opts, out),
        Format::Dat => write_dat(stream, out),
        Format::Dzt | Format::Imagenix | Format::Sick => {
            Err(TraceError::unsupported(format.tag(), "format is read-only"))
        }
    }
}

/// [`write`] into a fresh buffer.
pub fn to_bytes(stream: &TraceStream, format: Format, opts: &WriteOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write(stream, format, opts, &mut out)?;
    Ok(out)
}

/// SU trace: 240-byte header then `f32` samples.
fn write_trace<W: Write>(trace: &Trace, order: ByteOrder, out: &mut W) -> Result<()> {
    out.write_all(&trace.header.encode(order)?)?;
    out.write_all(&write_samples(&trace.samples, SampleFormat::F32, order)?)?;
    Ok(())
}

/// Binary file header: first trace's value for fields it shares with the
/// canonical vocabulary, then the mandatory defaults, then zero.
pub fn segy_file_header(stream: &TraceStream, order: ByteOrder) -> Result<Vec<u8>> {
    let first = stream.traces().first().map(|t| &t.header);
    SEGY_FILE_HEADER.with_order(order).encode_with(|d| {
        if d.encoding == Encoding::Blob {
            return Value::Bytes(Vec::new());
        }
        if d.name == "data_sample_format_code" {
            return Value::Int(5);
        }
        let carried = first
            .filter(|_| TraceHeader::contains(d.name))
            .and_then(|h| h.get(d.name))
            .filter(|v| *v != 0);
        Value::Int(carried.or_else(|| segy_mandatory(d.name)).unwrap_or(0))
    })
}

/// SU and SEG-Y readers size every trace by the first one, so a stream
/// with mixed sample counts cannot be written to them.
fn fixed_stride(stream: &TraceStream, format: Format) -> Result<()> {
    let mut traces = stream.iter();
    let ns = match traces.next() {
        Some(first) => first.samples.len(),
        None => return Ok(()),
    };
    match traces.find(|t| t.samples.len() != ns) {
        Some(t) => Err(TraceError::InvalidArgument(format!(
            "{}: trace {} has {} samples, trace 1 has {}",
            format,
            t.tracl(),
            t.samples.len(),
            ns
        ))),
        None => Ok(()),
    }
}

fn write_segy<W: Write>(stream: &TraceStream, opts: &WriteOptions, out: &mut W) -> Result<()> {
    fixed_stride(stream, Format::Segy)?;
    out.write_all(&segy_file_header(stream, opts.byte_order)?)?;
    let trid = segy_mandatory("trid").unwrap_or(1);
    for trace in stream {
        if trace.header.get("trid") == Some(0) {
            let mut header = trace.header.clone();
            header.set("trid", trid)?;
            out.write_all(&header.encode(opts.byte_order)?)?;
            out.write_all(&write_samples(&trace.samples, SampleFormat::F32, opts.byte_order)?)?;
        } else {
            write_trace(trace, opts.byte_order, out)?;
        }
    }
    Ok(())
}

/// One CRLF-terminated line of space separated samples per trace.
fn write_dat<W: Write>(stream: &TraceStream, out: &mut W) -> Result<()> {
    for trace in stream {
        let line = trace
            .samples
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(" ");
        write!(out, "{}\r\n", line)?;
    }
    Ok(())
}
