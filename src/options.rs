//! Reader and writer knobs. Both load from JSON with every key optional.

use serde::{Deserialize, Serialize};

use crate::data::{ByteOrder, SampleFormat};
use crate::error::{Result, TraceError};
use crate::header::AcquisitionTime;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReadOptions {
    /// SICK column separator.
    pub delimiter: char,
    /// SICK lines whose reference key is not above this are dropped.
    pub key_threshold: f64,
    /// Sonar water velocity (m/s) when the record carries none.
    pub water_velocity: f64,
    /// Byte order of SEG-Y binary headers and samples.
    pub byte_order: ByteOrder,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            key_threshold: 9000.0,
            water_velocity: 1500.0,
            byte_order: ByteOrder::Little,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TraceError::InvalidArgument(format!("read options: {}", e)))
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn key_threshold(mut self, threshold: f64) -> Self {
        self.key_threshold = threshold;
        self
    }

    pub fn water_velocity(mut self, velocity: f64) -> Self {
        self.water_velocity = velocity;
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WriteOptions {
    /// SEG-2 sample encoding, `F32` or `F64`.
    pub seg2_samples: SampleFormat,
    /// SEG-2 acquisition timestamp, overrides the first trace's fields.
    pub acquisition_time: Option<AcquisitionTime>,
    /// Byte order of SEG-Y output.
    pub byte_order: ByteOrder,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            seg2_samples: SampleFormat::F32,
            acquisition_time: None,
            byte_order: ByteOrder::Little,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TraceError::InvalidArgument(format!("write options: {}", e)))
    }

    pub fn seg2_samples(mut self, fmt: SampleFormat) -> Self {
        self.seg2_samples = fmt;
        self
    }

    pub fn acquisition_time(mut self, time: impl Into<AcquisitionTime>) -> Self {
        self.acquisition_time = Some(time.into());
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let r = ReadOptions::new();
        assert_eq!(r.delimiter, ',');
        assert_eq!(r.key_threshold, 9000.0);
        assert_eq!(r.water_velocity, 1500.0);
        assert_eq!(WriteOptions::new().seg2_samples, SampleFormat::F32);
    }

    #[test]
    fn partial_json() {
        let r = ReadOptions::from_json(r#"{"delimiter": ";", "byte_order": "Big"}"#).unwrap();
        assert_eq!(r.delimiter, ';');
        assert_eq!(r.byte_order, ByteOrder::Big);
        assert_eq!(r.key_threshold, 9000.0);
        let w = WriteOptions::from_json(
            r#"{"seg2_samples": "F64", "acquisition_time": {"year": 2020, "day": 32, "hour": 1, "minute": 2, "second": 3}}"#,
        )
        .unwrap();
        assert_eq!(w.seg2_samples, SampleFormat::F64);
        assert_eq!(w.acquisition_time.unwrap().day, 32);
        assert!(ReadOptions::from_json("{\"delimiter\": 3}").is_err());
    }

    #[test]
    fn builders() {
        let w = WriteOptions::new()
            .seg2_samples(SampleFormat::F64)
            .acquisition_time(AcquisitionTime::from_parts(2020, 1, 2, 3, 4, 5));
        assert_eq!(w.acquisition_time.unwrap().day, 2);
        let r = ReadOptions::new().delimiter(';').key_threshold(0.0).water_velocity(1480.0);
        assert_eq!(r.water_velocity, 1480.0);
    }
}
