use traceio::*;

fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Four shots along a line, 2.5 m receiver spacing, coordinates in cm.
fn survey() -> TraceStream {
    let mut stream = TraceStream::new(Format::Su);
    for i in 0..4i64 {
        let mut h = TraceHeader::new();
        h.set("ns", 5).unwrap();
        h.set("dt", 250).unwrap();
        h.set("scalco", 100).unwrap();
        h.set("sx", -8500).unwrap();
        h.set("gx", 250 * i).unwrap();
        h.set("offset", 8500 + 250 * i).unwrap();
        h.set("igc", 36).unwrap();
        h.set_time(&AcquisitionTime::from_parts(2021, 7, 14, 16, 45, 3));
        let samples = (0..5).map(|s| (s as f32 - 2.0) * (i + 1) as f32).collect();
        stream.push(h, samples).unwrap();
    }
    stream.annotate("OBSERVER", "K. Lindqvist");
    stream.annotate("weather", "light rain");
    stream
}

fn find(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn same_format_round_trips() {
    init_logger();
    let stream = survey();
    for format in [Format::Su, Format::Segy] {
        let bytes = to_bytes(&stream, format, &WriteOptions::new()).unwrap();
        let back = read(&bytes, format, &ReadOptions::new()).unwrap();
        let mut expected = stream.traces().to_vec();
        if format == Format::Segy {
            for t in &mut expected {
                t.header.set("trid", 1).unwrap();
            }
        }
        assert_eq!(back.traces(), expected.as_slice(), "{}", format);
    }
}

#[test]
fn seg2_round_trip() {
    init_logger();
    let stream = survey();
    let bytes = to_bytes(&stream, Format::Seg2, &WriteOptions::new()).unwrap();
    assert!(find(&bytes, b"SOURCE_LOCATION -85.00\0"));
    assert!(find(&bytes, b"RECEIVER_LOCATION 7.50\0"));
    assert!(find(&bytes, b"SAMPLE_INTERVAL 0.000250\0"));
    assert!(find(&bytes, b"ACQUISITION_DATE 14/Jul/2021\0"));
    assert!(find(&bytes, b"OBSERVER K. Lindqvist\0"));
    assert!(find(&bytes, b" BASE_INTERVAL 2.50 \n"));
    assert!(find(&bytes, b" weather light rain \n"));

    let back = read(&bytes, Format::Seg2, &ReadOptions::new()).unwrap();
    assert_eq!(back.len(), 4);
    assert_eq!(back.header("tracl"), vec![1, 2, 3, 4]);
    for name in ["ns", "dt", "sx", "gx", "scalco", "igc", "year", "day", "hour", "minute", "second"] {
        assert_eq!(back.header(name), stream.header(name), "{}", name);
    }
    for (a, b) in back.iter().zip(&stream) {
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.header.ns(), a.samples.len());
    }
    assert_eq!(back.annotation("weather"), Some("light rain"));
    assert_eq!(back.annotation("BASE_INTERVAL"), Some("2.50"));
}

#[test]
fn seg2_acquisition_time_option() {
    init_logger();
    let opts = WriteOptions::new().acquisition_time(AcquisitionTime {
        year: 2016,
        day: 32,
        hour: 6,
        minute: 0,
        second: 59,
    });
    let bytes = to_bytes(&survey(), Format::Seg2, &opts).unwrap();
    assert!(find(&bytes, b"ACQUISITION_DATE 01/Feb/2016\0"));
    assert!(find(&bytes, b"ACQUISITION_TIME 06:00:59\0"));
    let back = read(&bytes, Format::Seg2, &ReadOptions::new()).unwrap();
    assert_eq!(back.header("day"), vec![32; 4]);
    assert_eq!(back.header("second"), vec![59; 4]);
}

#[test]
fn radar_to_segy() {
    init_logger();
    let mut scans = Vec::new();
    for i in 0..6u16 {
        scans.extend((0..8u16).flat_map(|s| (1000 * i + s).to_le_bytes()));
    }
    let mut header = vec![0u8; 128];
    header[2..4].copy_from_slice(&128u16.to_le_bytes());
    header[4..6].copy_from_slice(&8u16.to_le_bytes());
    header[6..8].copy_from_slice(&16u16.to_le_bytes());
    header[26..30].copy_from_slice(&20.0f32.to_le_bytes());
    header.extend(scans);

    let radar = read(&header, Format::Dzt, &ReadOptions::new()).unwrap();
    assert_eq!(radar.len(), 6);
    let bytes = to_bytes(&radar, Format::Segy, &WriteOptions::new()).unwrap();
    let seismic = read(&bytes, Format::Segy, &ReadOptions::new()).unwrap();
    assert_eq!(seismic.header("ns"), vec![8; 6]);
    assert_eq!(seismic.header("dt"), vec![2500; 6]);
    assert_eq!(seismic.header("trid"), vec![1; 6]);
    assert_eq!(seismic.traces()[5].samples[7], 5007.0);
}

#[test]
fn dat_output() {
    init_logger();
    let mut out = Vec::new();
    write(&survey(), Format::Dat, &WriteOptions::new(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "-4.0 -2.0 0.0 2.0 4.0");
}

#[test]
fn write_and_read_files() {
    init_logger();
    let path = std::env::temp_dir().join(format!("traceio-{}.sg2", std::process::id()));
    write_file(&survey(), &path, Format::Seg2, &WriteOptions::new().seg2_samples(SampleFormat::F64)).unwrap();
    let back = read_file(&path, Format::Seg2, &ReadOptions::new()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(back.len(), 4);

    let missing = read_file(&path, Format::Seg2, &ReadOptions::new()).unwrap_err();
    assert!(missing.to_string().contains("cannot read"));
}

#[test]
fn unwritable_targets() {
    init_logger();
    let err = to_bytes(&survey(), Format::Imagenix, &WriteOptions::new()).unwrap_err();
    assert!(matches!(err, TraceError::UnsupportedEncoding { format: "im", .. }));

    let mut h = TraceHeader::new();
    h.set("ns", 1).unwrap();
    h.set("dt", 70_000).unwrap();
    let stream = TraceStream::from_parts(Format::Su, vec![Trace::new(h, vec![0.0]).unwrap()], Vec::new()).unwrap();
    assert!(matches!(
        to_bytes(&stream, Format::Su, &WriteOptions::new()),
        Err(TraceError::FieldOverflow { .. })
    ));
}

#[test]
fn ragged_swath_needs_per_trace_target() {
    init_logger();
    let swath = "\
1,2016,2,1,0,0,0,0,0
9001,2016,2,1,10,20,30,0,1,2,3,0
9002,2016,2,1,10,20,31,0,4,5,0
";
    let stream = read(swath.as_bytes(), Format::Sick, &ReadOptions::new()).unwrap();
    assert_eq!(stream.header("ns"), vec![3, 2]);
    for format in [Format::Su, Format::Segy] {
        match to_bytes(&stream, format, &WriteOptions::new()) {
            Err(TraceError::InvalidArgument(detail)) => assert!(detail.contains("trace 2"), "{}", detail),
            other => panic!("{}: unexpected {:?}", format, other),
        }
    }
    let bytes = to_bytes(&stream, Format::Seg2, &WriteOptions::new()).unwrap();
    let back = read(&bytes, Format::Seg2, &ReadOptions::new()).unwrap();
    assert_eq!(back.header("ns"), vec![3, 2]);
    assert_eq!(back.traces()[1].samples, vec![4.0, 5.0]);
}

#[test]
fn extreme_receiver_positions() {
    init_logger();
    let mut stream = survey();
    stream.set_header("gx", vec![0i64, i64::MAX / 10, 0, 0]).unwrap();
    let bytes = to_bytes(&stream, Format::Seg2, &WriteOptions::new()).unwrap();
    assert!(find(&bytes, b" BASE_INTERVAL 1.00 \n"));
}
