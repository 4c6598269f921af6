//! The batched lazy row iterator.
//!
//! [`RowFileReader`] turns a byte stream plus a decoder chain into a
//! pull-based sequence of rows. One underlying decode step may produce many
//! rows; they are held in a small internal queue and handed out one at a
//! time, so memory stays bounded by a single decode step regardless of how
//! fast the consumer drains.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::codec::{
    BufferedRowsReader, ByteStream, CodecError, ContainerDecoder, RowParser,
};
use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::{Row, Rows};

use super::error::ReaderError;
use super::traits::ByteSource;

/// Pull-based, single-consumer iterator over the rows of one source.
///
/// `has_next` is idempotent: any number of calls without an intervening
/// `next_row` observe the same state. A read or decode failure is demoted to
/// a soft end of stream: the failure is logged, the source is released, and
/// `has_next` returns false from then on; one corrupt record must not crash
/// an otherwise-valid read. `close` is idempotent and releases the
/// underlying byte source exactly once.
pub struct RowFileReader {
    source_name: String,
    reader: Option<Box<dyn BufferedRowsReader>>,
    buffered: Rows,
    next: Option<Row>,
}

impl RowFileReader {
    pub fn new(source_name: impl Into<String>, reader: Box<dyn BufferedRowsReader>) -> Self {
        RowFileReader {
            source_name: source_name.into(),
            reader: Some(reader),
            buffered: Rows::new(),
            next: None,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether another row is available, fetching one if needed.
    pub async fn has_next(&mut self) -> bool {
        if self.next.is_none() {
            self.next = self.fetch().await;
        }

        self.next.is_some()
    }

    /// The next row. Fails with [`ReaderError::EndOfSequence`] once the
    /// sequence is exhausted.
    pub async fn next_row(&mut self) -> Result<Row, ReaderError> {
        self.has_next().await;

        self.next.take().ok_or(ReaderError::EndOfSequence)
    }

    /// Releases the underlying byte source. Safe to call at any point, any
    /// number of times; no read happens afterwards.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            log::debug!("closed row reader for {}", self.source_name);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Drains the remaining rows into a vector, closing the reader.
    pub async fn collect_rows(&mut self) -> Vec<Row> {
        let mut rows = Vec::new();

        while self.has_next().await {
            if let Some(row) = self.next.take() {
                rows.push(row);
            }
        }

        rows
    }

    async fn fetch(&mut self) -> Option<Row> {
        loop {
            if let Some(row) = self.buffered.poll() {
                return Some(row);
            }

            let reader = self.reader.as_mut()?;

            match reader.read_next().await {
                // An empty batch is a recognized decode step with zero
                // records; keep pulling until rows or end of stream.
                Ok(Some(batch)) => self.buffered.add_all(batch),
                Ok(None) => {
                    self.close();
                    return None;
                }
                Err(err) => {
                    log::info!(
                        "failure reading {}, skipping rest of file: {}",
                        self.source_name,
                        err
                    );
                    self.close();
                    return None;
                }
            }
        }
    }
}

impl Drop for RowFileReader {
    fn drop(&mut self) {
        self.close();
    }
}

/// Raw-contents reader: every line surfaces as an ad-hoc single-column row
/// without format decoding.
struct RawLineReader {
    reader: BufReader<Box<dyn Read + Send>>,
}

impl RawLineReader {
    fn new(stream: Box<dyn Read + Send>) -> Self {
        RawLineReader {
            reader: BufReader::new(stream),
        }
    }
}

#[async_trait]
impl BufferedRowsReader for RawLineReader {
    async fn read_next(&mut self) -> Result<Option<Rows>, CodecError> {
        let mut line = String::new();

        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);

        let mut rows = Rows::new();
        rows.add(ContainerDecoder::raw_row(trimmed.as_bytes().to_vec())?);

        Ok(Some(rows))
    }
}

/// Builds row file readers from a parser, a registry and a byte source.
pub struct RowFileReaderFactory {
    parser: RowParser,
    registry: Arc<dyn SchemaRegistry>,
}

impl RowFileReaderFactory {
    pub fn new(parser: RowParser, registry: Arc<dyn SchemaRegistry>) -> Self {
        RowFileReaderFactory { parser, registry }
    }

    /// Opens `path` on `source` for decoded row iteration.
    ///
    /// The stream decoder is chosen from the path's suffix; an unrecognized
    /// suffix is an error, not a guess.
    pub async fn build(
        &self,
        source: &dyn ByteSource,
        path: &str,
    ) -> Result<RowFileReader, ReaderError> {
        let stream = source.open_for_read(path).await?;
        let reader = self
            .parser
            .open_stream(Arc::clone(&self.registry), ByteStream::new(path, stream))?;

        Ok(RowFileReader::new(path, reader))
    }

    /// Opens `path` for raw-contents iteration: one ad-hoc row per line, no
    /// format decoding.
    pub async fn build_raw(
        &self,
        source: &dyn ByteSource,
        path: &str,
    ) -> Result<RowFileReader, ReaderError> {
        let stream = source.open_for_read(path).await?;

        Ok(RowFileReader::new(path, Box::new(RawLineReader::new(stream))))
    }
}
