use traceio::formats::imagenix;
use traceio::schema::DZT_HEADER;
use traceio::*;

fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// 128-byte radar header, 8-bit scans of `ns` samples, 2016-02-01 09:05:07.
fn dzt(ns: i64, scans: &[&[u8]]) -> Vec<u8> {
    let date: u32 = (2016 - 1980) << 25 | 2 << 21 | 1 << 16 | 9 << 11 | 5 << 5 | 7;
    let mut buf = DZT_HEADER
        .encode_with(|d| match (d.name, d.encoding) {
            ("ns", _) => Value::Int(ns),
            ("data_bits", _) => Value::Int(8),
            ("data_offset", _) => Value::Int(128),
            ("range_ns", _) => Value::Float(40.0),
            ("range", _) => Value::Float(3.9),
            ("dia_const", _) => Value::Float(6.5),
            ("date_c", _) => Value::Bytes(date.to_le_bytes().to_vec()),
            ("antenna", _) => Value::Text("SIR 200MHz".into()),
            (_, Encoding::Text(_)) => Value::Text(String::new()),
            _ => Value::Int(0),
        })
        .unwrap();
    for scan in scans {
        buf.extend_from_slice(scan);
    }
    buf
}

/// 81e record with an IMX (252 byte) echo block counting up from 0.
fn imagenix_record(tag: &str) -> Vec<u8> {
    let mut rec = vec![0u8; 112 + 252 + 19 + 1];
    rec[..3].copy_from_slice(tag.as_bytes());
    rec[8..19].copy_from_slice(b"29-Feb-2016");
    rec[20..28].copy_from_slice(b"23:59:58");
    rec[39] = 12;
    rec[100..103].copy_from_slice(b"IMX");
    rec[107] = 10;
    for (i, b) in rec[112..112 + 252].iter_mut().enumerate() {
        *b = i as u8;
    }
    rec[47..55].copy_from_slice(b"survey 7");
    *rec.last_mut().unwrap() = 0xfc;
    rec
}

#[test]
fn read_dzt() {
    init_logger();
    let buf = dzt(4, &[&[1, 2, 3, 4], &[5, 6, 7, 8], &[9, 10, 11, 12]]);
    let stream = read(&buf, Format::Dzt, &ReadOptions::new()).unwrap();
    assert_eq!(stream.format(), Format::Dzt);
    assert_eq!(stream.header("tracl"), vec![1, 2, 3]);
    assert_eq!(stream.header("dt"), vec![10000; 3]);
    assert_eq!(stream.header("gelev"), vec![3; 3]);
    assert_eq!(stream.header("selev"), vec![6; 3]);
    assert_eq!(stream.traces()[2].samples, vec![9.0, 10.0, 11.0, 12.0]);
    for trace in &stream {
        assert_eq!(trace.header.ns(), trace.samples.len());
    }
    let time = stream.traces()[0].header.time();
    assert_eq!(time, AcquisitionTime::from_parts(2016, 2, 1, 9, 5, 7));
    assert_eq!(time.to_string(), "01/Feb/2016 09:05:07");
    assert_eq!(stream.annotation("antenna"), Some("SIR 200MHz"));

    let summary = stream.summary();
    assert_eq!(summary["format"], "dzt");
    assert_eq!(summary["traces"], 3);
    assert_eq!(summary["samples"], 12);
}

#[test]
fn read_imagenix() {
    init_logger();
    let mut buf = imagenix_record("81e");
    buf.extend(imagenix_record("81E"));
    let stream = read(&buf, Format::Imagenix, &ReadOptions::new()).unwrap();
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.header("ns"), vec![252, 252]);
    assert_eq!(stream.header("gain"), vec![12, 12]);
    // 29 Feb maps through the non-leap table
    assert_eq!(stream.header("day"), vec![60, 60]);
    assert_eq!(stream.header("second"), vec![58, 58]);
    // (2 * 10 / 1500) / 252 * 1e6
    assert_eq!(stream.header("dt"), vec![52, 52]);
    // echo bytes are signed
    assert_eq!(stream.traces()[0].samples[127], 127.0);
    assert_eq!(stream.traces()[0].samples[128], -128.0);

    assert_eq!(stream.text().len(), 1);
    assert_eq!(stream.annotation("header_text"), Some("survey 7"));

    let fields = imagenix::decode_record_header(&buf, 0).unwrap();
    assert!(fields.iter().any(|(name, _)| *name == "data_bits"));
}

#[test]
fn imagenix_unknown_record() {
    init_logger();
    let mut buf = imagenix_record("81e");
    buf.extend(imagenix_record("9zz"));
    match read(&buf, Format::Imagenix, &ReadOptions::new()) {
        Err(TraceError::UnknownFormat { tag, offset, .. }) => {
            assert_eq!(tag, "9zz");
            assert_eq!(offset, 112 + 252 + 19 + 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn read_sick() {
    init_logger();
    let swath = "\
12,2016,2,1,0,0,0,0,5,5,5,0
9001,2016,2,1,10,20,30,250,1.25,2.5,0
9001,2016,2,1,10,20,31,0,9,9,0
9002,2016,2,1,10,20,32,0,3.75,5,0
";
    let stream = read(swath.as_bytes(), Format::Sick, &ReadOptions::new()).unwrap();
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.header("tracl"), vec![1, 2]);
    assert_eq!(stream.header("second"), vec![30, 32]);
    assert_eq!(stream.header("day"), vec![32, 32]);
    assert_eq!(stream.traces()[1].samples, vec![3.75, 5.0]);

    let opts = ReadOptions::from_json(r#"{"key_threshold": 9001.5}"#).unwrap();
    assert_eq!(read(swath.as_bytes(), Format::Sick, &opts).unwrap().len(), 1);
}

#[test]
fn structural_errors_abort() {
    init_logger();
    let buf = dzt(4, &[&[1, 2, 3, 4]]);
    assert!(matches!(
        read(&buf[..100], Format::Dzt, &ReadOptions::new()),
        Err(TraceError::OutOfBounds { .. })
    ));
    assert!(matches!(
        read(&[0u8; 10], Format::Seg2, &ReadOptions::new()),
        Err(TraceError::OutOfBounds { .. })
    ));
    assert!(read(&[], Format::Su, &ReadOptions::new()).unwrap().is_empty());
}

#[test]
fn seg2_20_bit_samples() {
    init_logger();
    let mut header = TraceHeader::new();
    header.set("ns", 2).unwrap();
    let stream = TraceStream::from_parts(
        Format::Su,
        vec![Trace::new(header, vec![1.0, 2.0]).unwrap()],
        Vec::new(),
    )
    .unwrap();
    let mut bytes = to_bytes(&stream, Format::Seg2, &WriteOptions::new()).unwrap();
    let pointer = i32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]) as usize;
    assert_eq!(bytes[pointer + 12], 4);
    bytes[pointer + 12] = 3;
    match read(&bytes, Format::Seg2, &ReadOptions::new()) {
        Err(TraceError::UnsupportedEncoding { format, detail }) => {
            assert_eq!(format, "sg2");
            assert!(detail.contains("20-bit"));
        }
        other => panic!("unexpected {:?}", other),
    }
}
