//! Seismic Unix: 240-byte little-endian trace headers, each followed by `ns`
//! IEEE floats. No file header.

use crate::data::{read_samples, ByteOrder, SampleFormat};
use crate::error::{Result, TraceError};
use crate::header::TraceHeader;
use crate::record::TraceStream;
use crate::Format;

pub const FORMAT: &str = "su";
pub const TRACE_HEADER_LEN: usize = 240;

pub fn read(buf: &[u8]) -> Result<TraceStream> {
    let mut stream = TraceStream::new(Format::Su);
    if buf.is_empty() {
        return Ok(stream);
    }
    let ns = TraceHeader::decode(buf, 0, ByteOrder::Little)?.ns();
    read_traces(
        buf,
        0,
        ns,
        SampleFormat::F32,
        ByteOrder::Little,
        FORMAT,
        &mut stream,
    )?;
    Ok(stream)
}

/// Walk fixed-stride SU trace blocks from `start` until less than one full
/// stride remains. Every trace must declare `ns` samples, a zero `ns` in a
/// trace header is taken as `ns`.
pub(crate) fn read_traces(
    buf: &[u8],
    start: usize,
    ns: usize,
    fmt: SampleFormat,
    order: ByteOrder,
    format: &'static str,
    stream: &mut TraceStream,
) -> Result<()> {
    let stride = TRACE_HEADER_LEN + ns * fmt.width();
    log::debug!("{}: {} samples of {:?} per trace, stride {}", format, ns, fmt, stride);
    let mut pos = start;
    while pos + stride <= buf.len() {
        let mut header = TraceHeader::decode(&buf[pos..pos + TRACE_HEADER_LEN], pos, order)?;
        match header.ns() {
            0 => header.set("ns", ns as i64)?,
            n if n == ns => {}
            n => {
                return Err(TraceError::malformed(
                    format,
                    pos + 114,
                    format!("trace declares {} samples, the file uses {}", n, ns),
                ))
            }
        }
        let samples = read_samples(buf, pos + TRACE_HEADER_LEN, ns, fmt, order, format)?;
        log::trace!("{}: trace {} at byte {}", format, stream.len() + 1, pos);
        stream.push(header, samples)?;
        pos += stride;
    }
    if pos < buf.len() {
        log::warn!("{}: ignoring {} trailing bytes", format, buf.len() - pos);
    }
    Ok(())
}
