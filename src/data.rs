//! Primitive codec: typed reads and writes at descriptor offsets, and sample
//! block decoding.

use serde::{Deserialize, Serialize};

use crate::bits::{BitCommand, BitOrder};
use crate::error::{Result, TraceError};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Filler byte of a fixed-length character field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
    Nul,
    Space,
}

impl Pad {
    fn byte(self) -> u8 {
        match self {
            Pad::Nul => 0,
            Pad::Space => b' ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    F32,
    F64,
    /// Fixed-length character array, decoded without trimming.
    Text(Pad),
    /// Raw bytes, reserved or opaque.
    Blob,
    /// Symbolic bit command evaluated over the field's byte window.
    Bits(&'static str),
}

/// `(length, offset, name, encoding)` of one header field.
///
/// |   length   |   offset   |    name    |  encoding  |
/// |------------|------------|------------|------------|
/// | bytes read | from frame | join key   | [`Encoding`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub len: usize,
    pub offset: usize,
    pub name: &'static str,
    pub encoding: Encoding,
}

/// Shorthand used by the static tables in [`crate::schema`].
pub(crate) const fn field(
    len: usize,
    offset: usize,
    name: &'static str,
    encoding: Encoding,
) -> FieldDescriptor {
    FieldDescriptor {
        len,
        offset,
        name,
        encoding,
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Integer view, floats truncate toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Bytes to text, one char per byte, so arbitrary bytes survive a round trip.
pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

macro_rules! read_prim {
    ($bytes:expr, $typ:ident, $order:expr) => {{
        let mut raw = [0u8; core::mem::size_of::<$typ>()];
        raw.copy_from_slice($bytes);
        match $order {
            ByteOrder::Little => <$typ>::from_le_bytes(raw),
            ByteOrder::Big => <$typ>::from_be_bytes(raw),
        }
    }};
}

macro_rules! write_prim {
    ($value:expr, $order:expr) => {
        match $order {
            ByteOrder::Little => $value.to_le_bytes().to_vec(),
            ByteOrder::Big => $value.to_be_bytes().to_vec(),
        }
    };
}

impl FieldDescriptor {
    /// Decode this field from `frame`; `base` is the absolute position of
    /// `frame` in the source buffer and only feeds error messages.
    pub fn decode(
        &self,
        frame: &[u8],
        base: usize,
        order: ByteOrder,
        format: &'static str,
    ) -> Result<Value> {
        let end = self.offset + self.len;
        if end > frame.len() {
            return Err(TraceError::out_of_bounds(
                format,
                self.name,
                base + self.offset,
                self.len,
                frame.len().saturating_sub(self.offset),
            ));
        }
        let bytes = &frame[self.offset..end];
        let value = match self.encoding {
            Encoding::I8 => Value::Int(bytes[0] as i8 as i64),
            Encoding::U8 => Value::Int(bytes[0] as i64),
            Encoding::I16 => Value::Int(read_prim!(bytes, i16, order) as i64),
            Encoding::U16 => Value::Int(read_prim!(bytes, u16, order) as i64),
            Encoding::I32 => Value::Int(read_prim!(bytes, i32, order) as i64),
            Encoding::U32 => Value::Int(read_prim!(bytes, u32, order) as i64),
            Encoding::I64 => Value::Int(read_prim!(bytes, i64, order)),
            Encoding::F32 => Value::Float(read_prim!(bytes, f32, order) as f64),
            Encoding::F64 => Value::Float(read_prim!(bytes, f64, order)),
            Encoding::Text(_) => Value::Text(latin1(bytes)),
            Encoding::Blob => Value::Bytes(bytes.to_vec()),
            Encoding::Bits(cmd) => {
                let value = BitCommand::parse(cmd)?
                    .eval(bytes, BitOrder::Lsb0)
                    .map_err(|e| match e {
                        TraceError::UnsupportedEncoding { detail, .. } => {
                            TraceError::unsupported(format, format!("{}: {}", self.name, detail))
                        }
                        other => other,
                    })?;
                Value::Int(value)
            }
        };
        log::trace!("{}: {} @{} = {:?}", format, self.name, base + self.offset, value);
        Ok(value)
    }

    /// Exact inverse of [`FieldDescriptor::decode`] for primitive encodings,
    /// always `self.len` bytes long.
    pub fn encode(&self, value: &Value, order: ByteOrder, format: &'static str) -> Result<Vec<u8>> {
        let overflow = || TraceError::FieldOverflow {
            format,
            field: self.name.to_string(),
            value: format!("{:?}", value),
        };
        let int = || value.as_i64().ok_or_else(overflow);
        let float = || value.as_f64().ok_or_else(overflow);
        let bytes = match self.encoding {
            Encoding::I8 => vec![i8::try_from(int()?).map_err(|_| overflow())? as u8],
            Encoding::U8 => vec![u8::try_from(int()?).map_err(|_| overflow())?],
            Encoding::I16 => write_prim!(i16::try_from(int()?).map_err(|_| overflow())?, order),
            Encoding::U16 => write_prim!(u16::try_from(int()?).map_err(|_| overflow())?, order),
            Encoding::I32 => write_prim!(i32::try_from(int()?).map_err(|_| overflow())?, order),
            Encoding::U32 => write_prim!(u32::try_from(int()?).map_err(|_| overflow())?, order),
            Encoding::I64 => write_prim!(int()?, order),
            Encoding::F32 => write_prim!(float()? as f32, order),
            Encoding::F64 => write_prim!(float()?, order),
            Encoding::Text(pad) => {
                let text = value.as_text().ok_or_else(overflow)?;
                let mut out = Vec::with_capacity(self.len);
                for c in text.chars() {
                    out.push(u8::try_from(c as u32).map_err(|_| overflow())?);
                }
                if out.len() > self.len {
                    return Err(overflow());
                }
                out.resize(self.len, pad.byte());
                out
            }
            Encoding::Blob => match value {
                Value::Bytes(b) if b.len() == self.len => b.clone(),
                _ => vec![0; self.len],
            },
            Encoding::Bits(cmd) => {
                return Err(TraceError::unsupported(
                    format,
                    format!("{}: bit command {} is decode only", self.name, cmd),
                ))
            }
        };
        debug_assert_eq!(bytes.len(), self.len);
        Ok(bytes)
    }
}

/// Per-sample encodings found in trace data blocks.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
    /// IBM System/360 single precision float.
    Ibm32,
}

impl SampleFormat {
    pub fn width(self) -> usize {
        match self {
            SampleFormat::I8 | SampleFormat::U8 => 1,
            SampleFormat::I16 | SampleFormat::U16 => 2,
            SampleFormat::I32 | SampleFormat::U32 | SampleFormat::F32 | SampleFormat::Ibm32 => 4,
            SampleFormat::F64 => 8,
        }
    }
}

fn ibm_to_f32(word: u32) -> f32 {
    let sign = if word >> 31 == 1 { -1.0 } else { 1.0 };
    let exponent = ((word >> 24) & 0x7f) as i32 - 64;
    let mantissa = (word & 0x00ff_ffff) as f64 / (1u32 << 24) as f64;
    (sign * mantissa * 16f64.powi(exponent)) as f32
}

macro_rules! decode_samples {
    ($data:expr, $typ:ident, $order:expr) => {
        $data
            .chunks_exact(core::mem::size_of::<$typ>())
            .map(|b| read_prim!(b, $typ, $order) as f32)
            .collect()
    };
}

/// Decode `count` samples starting at `offset`.
pub fn read_samples(
    buf: &[u8],
    offset: usize,
    count: usize,
    fmt: SampleFormat,
    order: ByteOrder,
    format: &'static str,
) -> Result<Vec<f32>> {
    let len = count * fmt.width();
    let data = buf
        .get(offset..offset + len)
        .ok_or_else(|| {
            TraceError::out_of_bounds(
                format,
                "samples",
                offset,
                len,
                buf.len().saturating_sub(offset),
            )
        })?;
    let samples = match fmt {
        SampleFormat::I8 => data.iter().map(|&b| b as i8 as f32).collect(),
        SampleFormat::U8 => data.iter().map(|&b| b as f32).collect(),
        SampleFormat::I16 => decode_samples!(data, i16, order),
        SampleFormat::U16 => decode_samples!(data, u16, order),
        SampleFormat::I32 => decode_samples!(data, i32, order),
        SampleFormat::U32 => decode_samples!(data, u32, order),
        SampleFormat::F32 => decode_samples!(data, f32, order),
        SampleFormat::F64 => decode_samples!(data, f64, order),
        SampleFormat::Ibm32 => data
            .chunks_exact(4)
            .map(|b| ibm_to_f32(read_prim!(b, u32, order)))
            .collect(),
    };
    Ok(samples)
}

/// Encode samples as IEEE floats for the writers.
pub fn write_samples(samples: &[f32], fmt: SampleFormat, order: ByteOrder) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(samples.len() * fmt.width());
    match fmt {
        SampleFormat::F32 => samples.iter().for_each(|s| out.extend(write_prim!(s, order))),
        SampleFormat::F64 => samples
            .iter()
            .for_each(|s| out.extend(write_prim!(*s as f64, order))),
        other => {
            return Err(TraceError::unsupported(
                "samples",
                format!("writing {:?} samples", other),
            ))
        }
    }
    Ok(out)
}
