//! Error types for byte sources and the row file reader.

use crate::rowstream::codec::CodecError;

/// A failure at the byte-source boundary.
///
/// Messages are always a single line: the origin libraries contaminate error
/// text with multi-line detail, so everything after the first line is
/// truncated before it is surfaced.
#[derive(Debug)]
pub struct ByteSourceError {
    message: String,
}

impl ByteSourceError {
    pub fn new(message: impl AsRef<str>) -> Self {
        ByteSourceError {
            message: first_line(message.as_ref()).to_string(),
        }
    }

    pub fn from_io(op: &str, path: &str, err: &std::io::Error) -> Self {
        ByteSourceError::new(format!("{} {}: {}", op, path, err))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ByteSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ByteSourceError {}

/// The first line of `message`, with trailing whitespace removed.
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}

/// Errors surfaced by the row file reader.
#[derive(Debug)]
pub enum ReaderError {
    /// `next_row` was called after the sequence was exhausted.
    EndOfSequence,
    Source(ByteSourceError),
    Codec(CodecError),
}

impl std::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::EndOfSequence => write!(f, "no rows remain in the sequence"),
            ReaderError::Source(err) => write!(f, "byte source error: {}", err),
            ReaderError::Codec(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ReaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Source(err) => Some(err),
            ReaderError::Codec(err) => Some(err),
            ReaderError::EndOfSequence => None,
        }
    }
}

impl From<ByteSourceError> for ReaderError {
    fn from(err: ByteSourceError) -> Self {
        ReaderError::Source(err)
    }
}

impl From<CodecError> for ReaderError {
    fn from(err: CodecError) -> Self {
        ReaderError::Codec(err)
    }
}
