//! Delimited text records.

use std::io::{BufRead, BufReader};
use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::{ColumnKey, Row, RowSchema, RowValue, Rows};

use super::error::CodecError;
use super::parser::RowParser;
use super::traits::{BufferedRowsReader, RowDecoder, StreamRowDecoder};
use super::value::{ByteStream, RecordValue};

/// Record-type tag carried by text rows.
pub const TEXT_TYPE: &str = "Text";

const DELIMITER: char = '\t';

/// Decoder for tab-delimited text lines.
///
/// Columns are positional, named `col-<i>`.
#[derive(Debug, Default)]
pub struct TextDecoder;

impl TextDecoder {
    pub fn new() -> Self {
        TextDecoder
    }

    fn line_to_row(line: &str) -> Result<Row, CodecError> {
        let columns: Vec<&str> = line.split(DELIMITER).collect();

        let keys = (0..columns.len())
            .map(|i| ColumnKey::new(format!("col-{}", i)))
            .collect();
        let values = columns
            .into_iter()
            .map(|c| RowValue::Text(c.to_string()))
            .collect();

        let schema = RowSchema::new(TEXT_TYPE, keys)?;

        Ok(Row::new(Arc::new(schema), values))
    }
}

#[async_trait]
impl RowDecoder for TextDecoder {
    fn accept(&self, value: &RecordValue) -> bool {
        matches!(value, RecordValue::Text(_))
    }

    async fn decode(
        &self,
        _registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError> {
        let line = match value {
            RecordValue::Text(line) => line,
            other => return Err(CodecError::NoDecoderAccepted { kind: other.kind() }),
        };

        let mut rows = Rows::new();
        rows.add(Self::line_to_row(&line)?);

        Ok(rows)
    }
}

/// Stream decoder for line-oriented text sources.
///
/// Reads one line per decode step and routes it back through the parser's
/// decoder chain, so a deployment can override what a "line" decodes to.
#[derive(Debug)]
pub struct LineStreamDecoder {
    suffixes: Vec<String>,
}

impl LineStreamDecoder {
    pub fn new() -> Self {
        LineStreamDecoder {
            suffixes: vec!["tsv".to_string(), "txt".to_string(), "log".to_string()],
        }
    }

    pub fn with_suffixes(suffixes: Vec<String>) -> Self {
        LineStreamDecoder { suffixes }
    }
}

impl Default for LineStreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRowDecoder for LineStreamDecoder {
    fn accepts_suffix(&self, suffix: &str) -> bool {
        self.suffixes.iter().any(|s| s == suffix)
    }

    fn open_reader(
        &self,
        parser: &RowParser,
        registry: Arc<dyn SchemaRegistry>,
        stream: ByteStream,
    ) -> Result<Box<dyn BufferedRowsReader>, CodecError> {
        Ok(Box::new(LineReader {
            parser: parser.clone(),
            registry,
            reader: BufReader::new(stream.into_inner()),
        }))
    }
}

struct LineReader {
    parser: RowParser,
    registry: Arc<dyn SchemaRegistry>,
    reader: BufReader<Box<dyn std::io::Read + Send>>,
}

#[async_trait]
impl BufferedRowsReader for LineReader {
    async fn read_next(&mut self) -> Result<Option<Rows>, CodecError> {
        let mut line = String::new();

        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);

        let rows = self
            .parser
            .decode(
                self.registry.as_ref(),
                RecordValue::Text(trimmed.to_string()),
            )
            .await?;

        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_line_splits_into_positional_columns() {
        let row = TextDecoder::line_to_row("a\tb\tc").unwrap();

        assert_eq!(row.len(), 3);
        assert_eq!(
            row.get(&ColumnKey::new("col-0")).unwrap(),
            &RowValue::Text("a".to_string())
        );
        assert_eq!(
            row.get(&ColumnKey::new("col-1")).unwrap(),
            &RowValue::Text("b".to_string())
        );
        assert_eq!(
            row.get(&ColumnKey::new("col-2")).unwrap(),
            &RowValue::Text("c".to_string())
        );
        assert_eq!(row.type_name(), TEXT_TYPE);
    }

    #[test]
    fn line_without_delimiter_is_one_column() {
        let row = TextDecoder::line_to_row("plain").unwrap();

        assert_eq!(row.len(), 1);
        assert_eq!(
            row.get(&ColumnKey::new("col-0")).unwrap(),
            &RowValue::Text("plain".to_string())
        );
    }
}
