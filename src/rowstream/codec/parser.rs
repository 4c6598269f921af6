//! Decoder dispatch.

use std::sync::Arc;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::Rows;

use super::container::ContainerDecoder;
use super::envelope::EnvelopeDecoder;
use super::envelope_stream::EnvelopeStreamDecoder;
use super::error::CodecError;
use super::text::{LineStreamDecoder, TextDecoder};
use super::traits::{BufferedRowsReader, RowDecoder, StreamRowDecoder};
use super::tree::{TreeDecoder, TreeStreamDecoder};
use super::value::{ByteStream, RecordValue};

/// Routes raw record values to the first decoder that accepts them.
///
/// Registration order is part of the deployment contract: when two decoders
/// could structurally accept the same value, the earlier one wins. The
/// default order is `[Envelope, EnvelopeStream, Tree, Text, Container]`; the
/// container decoder is deliberately last because it is the most generic.
///
/// Cloning a parser is cheap: the decoder lists are shared.
#[derive(Clone)]
pub struct RowParser {
    decoders: Vec<Arc<dyn RowDecoder>>,
    stream_decoders: Vec<Arc<dyn StreamRowDecoder>>,
}

impl RowParser {
    /// Builds a parser over explicit, ordered decoder lists.
    pub fn new(
        decoders: Vec<Arc<dyn RowDecoder>>,
        stream_decoders: Vec<Arc<dyn StreamRowDecoder>>,
    ) -> Self {
        RowParser {
            decoders,
            stream_decoders,
        }
    }

    /// Builds a parser with the documented default decoder order.
    pub fn with_default_decoders() -> Self {
        RowParser::new(
            vec![
                Arc::new(EnvelopeDecoder::new()),
                Arc::new(EnvelopeStreamDecoder::new()),
                Arc::new(TreeDecoder::new()),
                Arc::new(TextDecoder::new()),
                Arc::new(ContainerDecoder::new()),
            ],
            vec![
                Arc::new(EnvelopeStreamDecoder::new()),
                Arc::new(TreeStreamDecoder::new()),
                Arc::new(LineStreamDecoder::new()),
            ],
        )
    }

    /// Decodes one raw value through the first accepting decoder.
    pub async fn decode(
        &self,
        registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError> {
        for decoder in &self.decoders {
            if decoder.accept(&value) {
                return decoder.decode(registry, value).await;
            }
        }

        Err(CodecError::NoDecoderAccepted { kind: value.kind() })
    }

    /// Opens a byte stream for incremental decoding, picking the stream
    /// decoder from the source name's suffix.
    pub fn open_stream(
        &self,
        registry: Arc<dyn SchemaRegistry>,
        stream: ByteStream,
    ) -> Result<Box<dyn BufferedRowsReader>, CodecError> {
        let suffix = source_suffix(stream.source_name()).to_string();

        for decoder in &self.stream_decoders {
            if decoder.accepts_suffix(&suffix) {
                return decoder.open_reader(self, registry, stream);
            }
        }

        Err(CodecError::UnknownStreamSuffix { suffix })
    }

    /// Decodes a whole byte stream to completion.
    pub async fn decode_stream(
        &self,
        registry: Arc<dyn SchemaRegistry>,
        stream: ByteStream,
    ) -> Result<Rows, CodecError> {
        let mut reader = self.open_stream(registry, stream)?;
        let mut rows = Rows::new();

        while let Some(batch) = reader.read_next().await? {
            rows.add_all(batch);
        }

        Ok(rows)
    }
}

/// The part of `source_name` after the last `.`, or the empty string.
fn source_suffix(source_name: &str) -> &str {
    match source_name.rsplit_once('.') {
        Some((_, suffix)) => suffix,
        None => "",
    }
}
