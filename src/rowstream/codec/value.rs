//! The tagged decode input handed to the decoder chain.

use std::fmt;
use std::io::Read;

use crate::rowstream::row::Row;

use super::envelope::EnvelopeEvent;
use super::tree::TreeDocument;

/// An owned byte stream plus the source name it was opened from.
///
/// The source name carries the suffix hint used for stream-decoder dispatch.
pub struct ByteStream {
    source_name: String,
    inner: Box<dyn Read + Send>,
}

impl ByteStream {
    pub fn new(source_name: impl Into<String>, inner: Box<dyn Read + Send>) -> Self {
        ByteStream {
            source_name: source_name.into(),
            inner,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn into_inner(self) -> Box<dyn Read + Send> {
        self.inner
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("source_name", &self.source_name)
            .finish_non_exhaustive()
    }
}

/// A raw record value awaiting decoding, one variant per wire shape.
///
/// Replaces runtime-type sniffing: the byte-source boundary attaches the
/// format tag, and each decoder's `accept` matches on it.
#[derive(Debug)]
pub enum RecordValue {
    /// One structured binary envelope.
    Envelope(EnvelopeEvent),
    /// A stream of framed structured envelopes.
    Stream(ByteStream),
    /// One self-describing (tree-shaped) document.
    Tree(TreeDocument),
    /// One delimited text line.
    Text(String),
    /// An opaque byte payload.
    Raw(Vec<u8>),
    /// An already-decoded row, passed through unchanged.
    Row(Row),
}

impl RecordValue {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordValue::Envelope(_) => "envelope",
            RecordValue::Stream(_) => "stream",
            RecordValue::Tree(_) => "tree",
            RecordValue::Text(_) => "text",
            RecordValue::Raw(_) => "raw",
            RecordValue::Row(_) => "row",
        }
    }
}
