//! Self-describing (tree-shaped) records.
//!
//! A tree document is a JSON object whose members name their own columns.
//! Documents arrive one per line (`jsonl`): each line is an object of the
//! form `{"type": "<name>", "data": {...}}`; when the `type` member is
//! absent the placeholder type is used, and when `data` is absent the
//! remaining members form the payload.

use std::io::{BufRead, BufReader};
use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::{ColumnKey, Row, RowSchema, RowValue, Rows, AD_HOC_TYPE};

use super::error::CodecError;
use super::parser::RowParser;
use super::traits::{BufferedRowsReader, RowDecoder, StreamRowDecoder, DEFAULT_BUFFER_SIZE};
use super::value::{ByteStream, RecordValue};

/// Source-name suffix claimed by the tree document stream format.
pub const TREE_SUFFIX: &str = "jsonl";

const TYPE_MEMBER: &str = "type";
const DATA_MEMBER: &str = "data";

/// One self-describing record: a type name plus a payload node with named
/// children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeDocument {
    pub type_name: String,
    pub root: serde_json::Value,
}

impl TreeDocument {
    pub fn new(type_name: impl Into<String>, root: serde_json::Value) -> Self {
        TreeDocument {
            type_name: type_name.into(),
            root,
        }
    }

    /// Parses one serialized document line.
    pub fn from_json_str(line: &str) -> Result<Self, CodecError> {
        let parsed: serde_json::Value =
            serde_json::from_str(line).map_err(|e| CodecError::CorruptFrame {
                message: format!("invalid tree document: {}", e),
            })?;

        let serde_json::Value::Object(mut members) = parsed else {
            return Err(CodecError::CorruptFrame {
                message: "tree document is not an object".to_string(),
            });
        };

        let type_name = match members.remove(TYPE_MEMBER) {
            Some(serde_json::Value::String(name)) => name,
            _ => AD_HOC_TYPE.to_string(),
        };

        let root = match members.remove(DATA_MEMBER) {
            Some(data) => data,
            None => serde_json::Value::Object(members),
        };

        Ok(TreeDocument { type_name, root })
    }
}

/// Decoder for self-describing records.
#[derive(Debug, Default)]
pub struct TreeDecoder;

impl TreeDecoder {
    pub fn new() -> Self {
        TreeDecoder
    }

    /// Builds the row for one document.
    ///
    /// Without a registry schema every child becomes a column, in the
    /// payload's own member order. With a schema, exactly the schema-declared
    /// names are emitted in schema order, substituting a null node for a
    /// missing child.
    pub(crate) async fn document_to_row(
        registry: &dyn SchemaRegistry,
        document: TreeDocument,
    ) -> Result<Row, CodecError> {
        let TreeDocument { type_name, root } = document;

        let serde_json::Value::Object(children) = root else {
            return Err(CodecError::CorruptFrame {
                message: format!("payload of type {} has no named children", type_name),
            });
        };

        let schema_fields = registry.resolve(&type_name).await;

        let (keys, values) = match schema_fields {
            None => {
                let mut keys = Vec::with_capacity(children.len());
                let mut values = Vec::with_capacity(children.len());

                for (name, child) in children {
                    keys.push(ColumnKey::new(name));
                    values.push(RowValue::Node(child));
                }

                (keys, values)
            }
            Some(schema_fields) => {
                let mut children = children;
                let mut keys = Vec::with_capacity(schema_fields.len());
                let mut values = Vec::with_capacity(schema_fields.len());

                for schema_field in schema_fields.iter() {
                    keys.push(ColumnKey::new(schema_field.name.clone()));
                    values.push(RowValue::Node(
                        children
                            .remove(&schema_field.name)
                            .unwrap_or(serde_json::Value::Null),
                    ));
                }

                (keys, values)
            }
        };

        let schema = RowSchema::new(type_name, keys)?;

        Ok(Row::new(Arc::new(schema), values))
    }
}

#[async_trait]
impl RowDecoder for TreeDecoder {
    fn accept(&self, value: &RecordValue) -> bool {
        matches!(value, RecordValue::Tree(_))
    }

    async fn decode(
        &self,
        registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError> {
        let document = match value {
            RecordValue::Tree(document) => document,
            other => return Err(CodecError::NoDecoderAccepted { kind: other.kind() }),
        };

        let mut rows = Rows::new();
        rows.add(Self::document_to_row(registry, document).await?);

        Ok(rows)
    }
}

/// Stream decoder for line-delimited tree documents.
#[derive(Debug, Default)]
pub struct TreeStreamDecoder;

impl TreeStreamDecoder {
    pub fn new() -> Self {
        TreeStreamDecoder
    }
}

impl StreamRowDecoder for TreeStreamDecoder {
    fn accepts_suffix(&self, suffix: &str) -> bool {
        suffix == TREE_SUFFIX
    }

    fn open_reader(
        &self,
        _parser: &RowParser,
        registry: Arc<dyn SchemaRegistry>,
        stream: ByteStream,
    ) -> Result<Box<dyn BufferedRowsReader>, CodecError> {
        Ok(Box::new(BufferedTreeReader {
            registry,
            reader: BufReader::new(stream.into_inner()),
        }))
    }
}

/// Incremental tree document reader capped at a fixed number of rows per step.
struct BufferedTreeReader {
    registry: Arc<dyn SchemaRegistry>,
    reader: BufReader<Box<dyn std::io::Read + Send>>,
}

#[async_trait]
impl BufferedRowsReader for BufferedTreeReader {
    async fn read_next(&mut self) -> Result<Option<Rows>, CodecError> {
        let mut rows = Rows::new();

        while rows.len() < DEFAULT_BUFFER_SIZE {
            let mut line = String::new();

            if self.reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                continue;
            }

            let document = TreeDocument::from_json_str(trimmed)?;
            rows.add(TreeDecoder::document_to_row(self.registry.as_ref(), document).await?);
        }

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }
}
