//! Streaming decode of framed envelope files.

use std::io::BufReader;
use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::Rows;

use super::envelope::{EnvelopeDecoder, EnvelopeEventReader};
use super::error::CodecError;
use super::parser::RowParser;
use super::traits::{BufferedRowsReader, RowDecoder, StreamRowDecoder, DEFAULT_BUFFER_SIZE};
use super::value::{ByteStream, RecordValue};

/// Source-name suffix claimed by the envelope stream format.
pub const ENVELOPE_SUFFIX: &str = "evt";

/// Decoder for whole streams of framed envelopes.
///
/// Each frame is delegated to the single-envelope column logic; stream
/// exhaustion is the termination signal, not an explicit record count.
#[derive(Debug, Default)]
pub struct EnvelopeStreamDecoder;

impl EnvelopeStreamDecoder {
    pub fn new() -> Self {
        EnvelopeStreamDecoder
    }
}

#[async_trait]
impl RowDecoder for EnvelopeStreamDecoder {
    fn accept(&self, value: &RecordValue) -> bool {
        matches!(value, RecordValue::Stream(_))
    }

    async fn decode(
        &self,
        registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError> {
        let stream = match value {
            RecordValue::Stream(stream) => stream,
            other => return Err(CodecError::NoDecoderAccepted { kind: other.kind() }),
        };

        let mut reader = EnvelopeEventReader::new(BufReader::new(stream.into_inner()));
        let mut rows = Rows::new();

        while let Some(event) = reader.read_event()? {
            rows.add(EnvelopeDecoder::event_to_row(registry, event).await?);
        }

        Ok(rows)
    }
}

impl StreamRowDecoder for EnvelopeStreamDecoder {
    fn accepts_suffix(&self, suffix: &str) -> bool {
        suffix == ENVELOPE_SUFFIX
    }

    fn open_reader(
        &self,
        _parser: &RowParser,
        registry: Arc<dyn SchemaRegistry>,
        stream: ByteStream,
    ) -> Result<Box<dyn BufferedRowsReader>, CodecError> {
        Ok(Box::new(BufferedEnvelopeReader {
            registry,
            reader: EnvelopeEventReader::new(BufReader::new(stream.into_inner())),
        }))
    }
}

/// Incremental envelope reader capped at a fixed number of rows per step.
struct BufferedEnvelopeReader {
    registry: Arc<dyn SchemaRegistry>,
    reader: EnvelopeEventReader<BufReader<Box<dyn std::io::Read + Send>>>,
}

#[async_trait]
impl BufferedRowsReader for BufferedEnvelopeReader {
    async fn read_next(&mut self) -> Result<Option<Rows>, CodecError> {
        let mut rows = Rows::new();

        while rows.len() < DEFAULT_BUFFER_SIZE {
            match self.reader.read_event()? {
                Some(event) => {
                    rows.add(EnvelopeDecoder::event_to_row(self.registry.as_ref(), event).await?)
                }
                None => break,
            }
        }

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }
}
