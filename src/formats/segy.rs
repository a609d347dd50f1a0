//! SEG-Y: 3600-byte file header (textual blob plus binary table) followed by
//! SU-layout trace headers and samples.

use crate::data::{ByteOrder, SampleFormat};
use crate::error::{Result, TraceError};
use crate::formats::{int, su};
use crate::options::ReadOptions;
use crate::record::TraceStream;
use crate::schema::SEGY_FILE_HEADER;
use crate::Format;

pub const FORMAT: &str = "sgy";

/// Sample format of a binary header `data_sample_format_code`.
pub fn sample_format(code: i64) -> Result<SampleFormat> {
    match code {
        1 => Ok(SampleFormat::Ibm32),
        2 => Ok(SampleFormat::I32),
        3 => Ok(SampleFormat::I16),
        5 => Ok(SampleFormat::F32),
        8 => Ok(SampleFormat::I8),
        other => Err(TraceError::unsupported(
            FORMAT,
            format!("data sample format code {}", other),
        )),
    }
}

pub fn read(buf: &[u8], opts: &ReadOptions) -> Result<TraceStream> {
    let schema = SEGY_FILE_HEADER.with_order(opts.byte_order);
    let file_header = schema.decode(buf, 0)?;
    let ns = int(&file_header, "ns").unwrap_or(0) as usize;
    let fmt = sample_format(int(&file_header, "data_sample_format_code").unwrap_or(0))?;

    log::debug!(
        "sgy: job {:?}, line {:?}, {:?} byte order",
        int(&file_header, "job_id"),
        int(&file_header, "line_nr"),
        opts.byte_order
    );

    let mut stream = TraceStream::new(Format::Segy);
    su::read_traces(
        buf,
        schema.size,
        ns,
        fmt,
        opts.byte_order,
        FORMAT,
        &mut stream,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Value;
    use crate::header::TraceHeader;

    fn file(order: ByteOrder, code: i64, ns: i64, body: &[u8]) -> Vec<u8> {
        let mut buf = SEGY_FILE_HEADER
            .with_order(order)
            .encode_with(|d| match d.name {
                "ns" => Value::Int(ns),
                "data_sample_format_code" => Value::Int(code),
                _ => Value::Int(0),
            })
            .unwrap();
        buf.extend_from_slice(body);
        buf
    }

    #[test]
    fn big_endian_ibm() {
        let mut h = TraceHeader::new();
        h.set("ns", 1).unwrap();
        h.set("trid", 1).unwrap();
        let mut body = h.encode(ByteOrder::Big).unwrap();
        body.extend([0x42, 0x64, 0, 0]);
        let buf = file(ByteOrder::Big, 1, 1, &body);
        let s = read(&buf, &ReadOptions::new().byte_order(ByteOrder::Big)).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.traces()[0].samples, vec![100.0]);
        assert_eq!(s.header("trid"), vec![1]);
    }

    #[test]
    fn integer_sample_codes() {
        let mut h = TraceHeader::new();
        h.set("ns", 3).unwrap();
        let header = h.encode(ByteOrder::Little).unwrap();
        let cases: [(i64, Vec<u8>, [f32; 3]); 3] = [
            (2, [-70000i32, 0, 70000].iter().flat_map(|v| v.to_le_bytes()).collect(), [-70000.0, 0.0, 70000.0]),
            (3, [-300i16, 1, 300].iter().flat_map(|v| v.to_le_bytes()).collect(), [-300.0, 1.0, 300.0]),
            (8, vec![0x80, 0x00, 0x7f], [-128.0, 0.0, 127.0]),
        ];
        for (code, raw, expected) in cases {
            let mut body = header.clone();
            body.extend(&raw);
            body.extend(&header);
            body.extend(&raw);
            let s = read(&file(ByteOrder::Little, code, 3, &body), &ReadOptions::new()).unwrap();
            assert_eq!(s.len(), 2, "code {}", code);
            assert_eq!(s.traces()[1].samples, expected, "code {}", code);
            assert_eq!(s.header("tracl"), vec![1, 2]);
        }
    }

    #[test]
    fn unsupported_code() {
        let buf = file(ByteOrder::Little, 4, 1, &[]);
        assert!(matches!(
            read(&buf, &ReadOptions::new()),
            Err(TraceError::UnsupportedEncoding { .. })
        ));
    }

    #[test]
    fn short_file_header() {
        assert!(matches!(
            read(&[0u8; 3000], &ReadOptions::new()),
            Err(TraceError::OutOfBounds { .. })
        ));
    }
}
