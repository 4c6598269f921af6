//! Decoder traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::Rows;

use super::error::CodecError;
use super::parser::RowParser;
use super::value::{ByteStream, RecordValue};

/// Rows produced per decode step by the buffered stream readers. Caps the
/// number of rows held in memory regardless of consumer pace.
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

/// A format-specific converter from raw record values to rows.
///
/// `decode` must only be called with values `accept` returned true for; the
/// parser guarantees this. An `Ok` result with zero rows means "recognized
/// format, zero records" and is not an error.
#[async_trait]
pub trait RowDecoder: Send + Sync {
    /// Whether this decoder understands `value`.
    fn accept(&self, value: &RecordValue) -> bool;

    /// Decodes `value` into zero or more rows, consulting `registry` for
    /// column names and ordering.
    async fn decode(
        &self,
        registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError>;
}

/// A decoder that can open a whole byte stream for incremental decoding.
///
/// Stream decoders are dispatched by source-name suffix rather than content
/// sniffing, since probing a whole-stream format is not cheap.
pub trait StreamRowDecoder: Send + Sync {
    /// Whether this decoder claims `suffix` (the part after the last `.`).
    fn accepts_suffix(&self, suffix: &str) -> bool;

    /// Opens `stream` for incremental decoding.
    fn open_reader(
        &self,
        parser: &RowParser,
        registry: Arc<dyn SchemaRegistry>,
        stream: ByteStream,
    ) -> Result<Box<dyn BufferedRowsReader>, CodecError>;
}

/// Pulls the next batch of rows from an underlying stream.
///
/// One call is one decode step: it may produce many rows (up to the reader's
/// buffer cap) from a single underlying read. `Ok(None)` signals end of
/// stream; dropping the reader releases the underlying byte source.
#[async_trait]
pub trait BufferedRowsReader: Send {
    async fn read_next(&mut self) -> Result<Option<Rows>, CodecError>;
}
