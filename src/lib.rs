#![deny(unsafe_code)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use bitflags::bitflags;
use serde::{Serialize, Serializer};

pub use bits::{BitCommand, BitOrder};
pub use data::{ByteOrder, Encoding, FieldDescriptor, Pad, SampleFormat, Value};
pub use error::{Result, TraceError};
pub use header::{AcquisitionTime, TraceHeader};
pub use options::{ReadOptions, WriteOptions};
pub use record::{HeaderValues, Trace, TraceSelector, TraceStream};
pub use schema::Schema;
pub use writer::to_bytes;

pub mod bits;
mod data;
mod error;
pub mod formats;
mod header;
mod options;
mod record;
pub mod schema;
mod writer;

bitflags! {
    /// What the crate can do with a format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
    }
}

/// Supported trace file layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Seismic Unix
    Su,
    Segy,
    Seg2,
    /// GSSI ground-penetrating radar
    Dzt,
    /// Imagenix sonar (`81e`, `851`, `852` records)
    Imagenix,
    /// SICK laser swath text
    Sick,
    /// Plain text samples, one line per trace
    Dat,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Su,
        Format::Segy,
        Format::Seg2,
        Format::Dzt,
        Format::Imagenix,
        Format::Sick,
        Format::Dat,
    ];

    /// Short tag, also the conventional file extension.
    pub fn tag(self) -> &'static str {
        match self {
            Format::Su => formats::su::FORMAT,
            Format::Segy => formats::segy::FORMAT,
            Format::Seg2 => formats::seg2::FORMAT,
            Format::Dzt => formats::dzt::FORMAT,
            Format::Imagenix => formats::imagenix::FORMAT,
            Format::Sick => formats::sick::FORMAT,
            Format::Dat => "dat",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Format::Su | Format::Segy | Format::Seg2 => Access::READ | Access::WRITE,
            Format::Dzt | Format::Imagenix | Format::Sick => Access::READ,
            Format::Dat => Access::WRITE,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Format::ALL
            .into_iter()
            .find(|f| f.tag() == lower)
            .ok_or_else(|| TraceError::InvalidArgument(format!("unknown format {:?}", s)))
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Decode a whole in-memory file.
pub fn read(bytes: &[u8], format: Format, opts: &ReadOptions) -> Result<TraceStream> {
    log::debug!("reading {} bytes as {}", bytes.len(), format);
    match format {
        Format::Su => formats::su::read(bytes),
        Format::Segy => formats::segy::read(bytes, opts),
        Format::Seg2 => formats::seg2::read(bytes),
        Format::Dzt => formats::dzt::read(bytes),
        Format::Imagenix => formats::imagenix::read(bytes, opts),
        Format::Sick => formats::sick::read(bytes, opts),
        Format::Dat => Err(TraceError::unsupported(format.tag(), "format is write-only")),
    }
}

/// Encode `stream` as `format` into `out`.
pub fn write<W: Write>(stream: &TraceStream, format: Format, opts: &WriteOptions, out: &mut W) -> Result<()> {
    writer::write(stream, format, opts, out)
}

pub fn read_file(path: impl AsRef<Path>, format: Format, opts: &ReadOptions) -> anyhow::Result<TraceStream> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    read(&bytes, format, opts).with_context(|| format!("cannot decode {} as {}", path.display(), format))
}

pub fn write_file(
    stream: &TraceStream,
    path: impl AsRef<Path>,
    format: Format,
    opts: &WriteOptions,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(stream, format, opts, &mut out).with_context(|| format!("cannot write {} as {}", path.display(), format))?;
    out.flush()?;
    Ok(())
}
