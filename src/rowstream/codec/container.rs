//! Generic container records.
//!
//! The catch-all tail of the decoder chain: opaque byte payloads surface as a
//! single-column raw row, already-decoded rows pass through unchanged, and
//! anything else is an unknown container type.

use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::{ColumnKey, Row, RowSchema, RowValue, Rows, AD_HOC_TYPE, RAW_RECORD_COLUMN};

use super::error::CodecError;
use super::traits::RowDecoder;
use super::value::RecordValue;

/// Decoder for opaque byte payloads and pre-built rows.
#[derive(Debug, Default)]
pub struct ContainerDecoder;

impl ContainerDecoder {
    pub fn new() -> Self {
        ContainerDecoder
    }

    /// Wraps an opaque payload as a one-column ad-hoc row.
    pub fn raw_row(payload: Vec<u8>) -> Result<Row, CodecError> {
        let schema = RowSchema::new(AD_HOC_TYPE, vec![ColumnKey::new(RAW_RECORD_COLUMN)])?;

        Ok(Row::new(Arc::new(schema), vec![RowValue::Raw(payload)]))
    }
}

#[async_trait]
impl RowDecoder for ContainerDecoder {
    fn accept(&self, value: &RecordValue) -> bool {
        matches!(value, RecordValue::Raw(_) | RecordValue::Row(_))
    }

    async fn decode(
        &self,
        _registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError> {
        let mut rows = Rows::new();

        match value {
            RecordValue::Raw(payload) => rows.add(Self::raw_row(payload)?),
            RecordValue::Row(row) => rows.add(row),
            other => {
                return Err(CodecError::UnknownContainerType {
                    kind: other.kind(),
                })
            }
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowstream::registry::NullRegistry;
    use crate::rowstream::codec::tree::TreeDocument;

    #[tokio::test]
    async fn raw_payload_becomes_single_record_column() {
        let decoder = ContainerDecoder::new();
        let value = RecordValue::Raw(b"opaque".to_vec());

        assert!(decoder.accept(&value));

        let mut rows = decoder.decode(&NullRegistry, value).await.unwrap();
        let row = rows.poll().unwrap();

        assert_eq!(row.type_name(), AD_HOC_TYPE);
        assert_eq!(
            row.get(&ColumnKey::new(RAW_RECORD_COLUMN)).unwrap(),
            &RowValue::Raw(b"opaque".to_vec())
        );
    }

    #[tokio::test]
    async fn prebuilt_row_passes_through() {
        let decoder = ContainerDecoder::new();
        let row = ContainerDecoder::raw_row(b"x".to_vec()).unwrap();

        let mut rows = decoder
            .decode(&NullRegistry, RecordValue::Row(row.clone()))
            .await
            .unwrap();

        assert_eq!(rows.poll().unwrap(), row);
    }

    #[tokio::test]
    async fn non_container_value_is_unknown() {
        let decoder = ContainerDecoder::new();
        let value = RecordValue::Tree(TreeDocument::new("t", serde_json::json!({})));

        assert!(!decoder.accept(&value));
        assert!(matches!(
            decoder.decode(&NullRegistry, value).await,
            Err(CodecError::UnknownContainerType { .. })
        ));
    }
}
