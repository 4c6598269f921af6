//! Error types for decoding and decoder dispatch.

use crate::rowstream::row::RowAccessError;

/// Errors raised while decoding raw record values into rows.
///
/// Dispatch failures (`NoDecoderAccepted`, `UnknownStreamSuffix`,
/// `UnknownContainerType`) are propagated to the caller of `decode`; skipping
/// them silently would hide a real format incompatibility. The row file
/// reader demotes them to a soft end-of-stream instead of crashing.
#[derive(Debug)]
pub enum CodecError {
    /// No registered decoder accepted the value.
    NoDecoderAccepted { kind: &'static str },
    /// The source name's suffix matches no registered stream decoder.
    UnknownStreamSuffix { suffix: String },
    /// The container decoder was handed a value it cannot pass through.
    UnknownContainerType { kind: &'static str },
    /// A frame or payload that cannot be decoded (truncation, bad tag, bad
    /// UTF-8, oversized length).
    CorruptFrame { message: String },
    Io(std::io::Error),
    Row(RowAccessError),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::NoDecoderAccepted { kind } => {
                write!(f, "no decoder accepted value of kind {}", kind)
            }
            CodecError::UnknownStreamSuffix { suffix } => {
                write!(f, "no stream decoder registered for suffix '{}'", suffix)
            }
            CodecError::UnknownContainerType { kind } => {
                write!(f, "value of kind {} is not a known container type", kind)
            }
            CodecError::CorruptFrame { message } => write!(f, "corrupt frame: {}", message),
            CodecError::Io(err) => write!(f, "io error: {}", err),
            CodecError::Row(err) => write!(f, "row error: {}", err),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(err) => Some(err),
            CodecError::Row(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err)
    }
}

impl From<RowAccessError> for CodecError {
    fn from(err: RowAccessError) -> Self {
        CodecError::Row(err)
    }
}
