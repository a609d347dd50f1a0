use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraceError>;

/// Everything that can go wrong while decoding or encoding a trace file.
///
/// Decode-time structural errors abort the whole read, no partial stream is
/// returned.
#[derive(Debug, Error)]
pub enum TraceError {
    /// A field or sample block reaches past the end of the buffer.
    #[error("{format}: field `{field}` at byte {offset} needs {len} bytes, only {available} available")]
    OutOfBounds {
        format: &'static str,
        field: String,
        offset: usize,
        len: usize,
        available: usize,
    },

    /// Valid-looking input using a sub-format that is not implemented.
    #[error("{format}: unsupported encoding: {detail}")]
    UnsupportedEncoding { format: &'static str, detail: String },

    /// A mutation utility was called with the wrong cardinality or an unknown field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The signature bytes match no known reader.
    #[error("{format}: unknown format tag {tag:?} at byte {offset}")]
    UnknownFormat {
        format: &'static str,
        tag: String,
        offset: usize,
    },

    /// Text or structure inside an otherwise framed block does not parse.
    #[error("{format}: malformed input at byte {offset}: {detail}")]
    Malformed {
        format: &'static str,
        offset: usize,
        detail: String,
    },

    /// A canonical value does not fit the width of its target field.
    #[error("{format}: value {value} does not fit field `{field}`")]
    FieldOverflow {
        format: &'static str,
        field: String,
        value: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TraceError {
    pub(crate) fn out_of_bounds(
        format: &'static str,
        field: &str,
        offset: usize,
        len: usize,
        available: usize,
    ) -> Self {
        TraceError::OutOfBounds {
            format,
            field: field.to_string(),
            offset,
            len,
            available,
        }
    }

    pub(crate) fn unsupported(format: &'static str, detail: impl Into<String>) -> Self {
        TraceError::UnsupportedEncoding {
            format,
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(format: &'static str, offset: usize, detail: impl Into<String>) -> Self {
        TraceError::Malformed {
            format,
            offset,
            detail: detail.into(),
        }
    }
}
