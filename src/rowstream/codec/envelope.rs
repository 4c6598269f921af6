//! Structured binary envelopes.
//!
//! The collector frames each record as a length-prefixed envelope: a `u32`
//! big-endian payload length followed by the payload, which carries the
//! record-type name and an ordered list of `(field id, value)` pairs. The
//! reader decodes frames incrementally so a stream of envelopes can be
//! consumed without buffering the whole file; the writer emits the identical
//! framing for re-serialization and tests.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use async_trait::async_trait;

use crate::rowstream::registry::SchemaRegistry;
use crate::rowstream::row::{ColumnKey, DataItem, Row, RowSchema, RowValue, Rows};

use super::error::CodecError;
use super::traits::RowDecoder;
use super::value::RecordValue;

/// Upper bound on a single frame's payload length. Anything larger is treated
/// as a corrupt length prefix rather than an allocation request.
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// One field of an envelope payload: a small integer id plus a scalar value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeField {
    pub id: i16,
    pub item: DataItem,
}

impl EnvelopeField {
    pub fn new(id: i16, item: DataItem) -> Self {
        EnvelopeField { id, item }
    }
}

/// One decoded envelope: the record-type name and its ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeEvent {
    pub type_name: String,
    pub fields: Vec<EnvelopeField>,
}

impl EnvelopeEvent {
    pub fn new(type_name: impl Into<String>, fields: Vec<EnvelopeField>) -> Self {
        EnvelopeEvent {
            type_name: type_name.into(),
            fields,
        }
    }
}

/// Incremental reader of framed envelopes from a byte stream.
pub struct EnvelopeEventReader<R: Read> {
    inner: R,
}

impl<R: Read> EnvelopeEventReader<R> {
    pub fn new(inner: R) -> Self {
        EnvelopeEventReader { inner }
    }

    /// Reads the next envelope, or `None` at a clean end of stream.
    ///
    /// A stream ending mid-frame is a [`CodecError::CorruptFrame`].
    pub fn read_event(&mut self) -> Result<Option<EnvelopeEvent>, CodecError> {
        let mut len_buf = [0u8; 4];

        match read_full(&mut self.inner, &mut len_buf)? {
            0 => return Ok(None),
            4 => {}
            n => {
                return Err(corrupt(format!(
                    "stream ended after {} byte(s) of a frame length",
                    n
                )))
            }
        }

        let len = u32::from_be_bytes(len_buf);
        if len > MAX_FRAME_LEN {
            return Err(corrupt(format!("frame length {} exceeds maximum", len)));
        }

        let mut payload = vec![0u8; len as usize];
        self.inner
            .read_exact(&mut payload)
            .map_err(|e| corrupt(format!("truncated frame payload: {}", e)))?;

        parse_payload(&payload).map(Some)
    }
}

fn parse_payload(payload: &[u8]) -> Result<EnvelopeEvent, CodecError> {
    let mut cursor = Cursor::new(payload);

    let name_len = cursor.read_u16()? as usize;
    let name_bytes = cursor.read_bytes(name_len)?;
    let type_name = String::from_utf8(name_bytes.to_vec())
        .map_err(|e| corrupt(format!("type name is not valid utf-8: {}", e)))?;

    let field_count = cursor.read_u16()? as usize;
    let mut fields = Vec::with_capacity(field_count);

    for _ in 0..field_count {
        let id = cursor.read_i16()?;
        let tag = cursor.read_u8()?;

        let item = match tag {
            DataItem::TAG_NULL => DataItem::Null,
            DataItem::TAG_BOOLEAN => DataItem::Boolean(cursor.read_u8()? != 0),
            DataItem::TAG_BYTE => DataItem::Byte(cursor.read_u8()? as i8),
            DataItem::TAG_SHORT => DataItem::Short(cursor.read_i16()?),
            DataItem::TAG_INTEGER => {
                DataItem::Integer(i32::from_be_bytes(cursor.read_array()?))
            }
            DataItem::TAG_LONG => DataItem::Long(i64::from_be_bytes(cursor.read_array()?)),
            DataItem::TAG_DOUBLE => {
                DataItem::Double(f64::from_be_bytes(cursor.read_array()?))
            }
            DataItem::TAG_TEXT => {
                let len = cursor.read_u32()? as usize;
                let bytes = cursor.read_bytes(len)?;
                DataItem::Text(
                    String::from_utf8(bytes.to_vec())
                        .map_err(|e| corrupt(format!("text value is not valid utf-8: {}", e)))?,
                )
            }
            DataItem::TAG_BYTES => {
                let len = cursor.read_u32()? as usize;
                DataItem::Bytes(cursor.read_bytes(len)?.to_vec())
            }
            other => return Err(corrupt(format!("unknown value tag {}", other))),
        };

        fields.push(EnvelopeField::new(id, item));
    }

    Ok(EnvelopeEvent { type_name, fields })
}

/// Writer emitting the same framing the reader consumes.
pub struct EnvelopeWriter<W: Write> {
    inner: W,
}

impl<W: Write> EnvelopeWriter<W> {
    pub fn new(inner: W) -> Self {
        EnvelopeWriter { inner }
    }

    pub fn write_event(&mut self, event: &EnvelopeEvent) -> Result<(), CodecError> {
        let mut payload = Vec::new();

        let name = event.type_name.as_bytes();
        payload.extend_from_slice(&(name.len() as u16).to_be_bytes());
        payload.extend_from_slice(name);
        payload.extend_from_slice(&(event.fields.len() as u16).to_be_bytes());

        for field in &event.fields {
            payload.extend_from_slice(&field.id.to_be_bytes());
            payload.push(field.item.type_tag());

            match &field.item {
                DataItem::Null => {}
                DataItem::Boolean(b) => payload.push(*b as u8),
                DataItem::Byte(v) => payload.push(*v as u8),
                DataItem::Short(v) => payload.extend_from_slice(&v.to_be_bytes()),
                DataItem::Integer(v) => payload.extend_from_slice(&v.to_be_bytes()),
                DataItem::Long(v) => payload.extend_from_slice(&v.to_be_bytes()),
                DataItem::Double(v) => payload.extend_from_slice(&v.to_be_bytes()),
                DataItem::Text(s) => {
                    payload.extend_from_slice(&(s.len() as u32).to_be_bytes());
                    payload.extend_from_slice(s.as_bytes());
                }
                DataItem::Bytes(b) => {
                    payload.extend_from_slice(&(b.len() as u32).to_be_bytes());
                    payload.extend_from_slice(b);
                }
            }
        }

        self.inner
            .write_all(&(payload.len() as u32).to_be_bytes())?;
        self.inner.write_all(&payload)?;

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Decoder for a single structured envelope.
#[derive(Debug, Default)]
pub struct EnvelopeDecoder;

impl EnvelopeDecoder {
    pub fn new() -> Self {
        EnvelopeDecoder
    }

    /// Builds the row for one envelope.
    ///
    /// With a registry schema, exactly the schema's fields are emitted in
    /// schema order: payload fields are matched by id, ids missing from the
    /// payload surface as null values, and payload fields outside the schema
    /// are dropped. Without a schema, every payload field becomes a column
    /// named by its stringified field id.
    pub(crate) async fn event_to_row(
        registry: &dyn SchemaRegistry,
        event: EnvelopeEvent,
    ) -> Result<Row, CodecError> {
        let schema_fields = registry.resolve(&event.type_name).await;

        let (keys, values) = match schema_fields {
            None => {
                let mut keys = Vec::with_capacity(event.fields.len());
                let mut values = Vec::with_capacity(event.fields.len());

                for field in event.fields {
                    keys.push(ColumnKey::new(field.id.to_string()));
                    values.push(RowValue::Item(field.item));
                }

                (keys, values)
            }
            Some(schema_fields) => {
                let mut by_id: HashMap<i16, DataItem> = event
                    .fields
                    .into_iter()
                    .map(|field| (field.id, field.item))
                    .collect();

                let mut keys = Vec::with_capacity(schema_fields.len());
                let mut values = Vec::with_capacity(schema_fields.len());

                for schema_field in schema_fields.iter() {
                    keys.push(ColumnKey::new(schema_field.name.clone()));
                    values.push(RowValue::Item(
                        by_id.remove(&schema_field.id).unwrap_or(DataItem::Null),
                    ));
                }

                (keys, values)
            }
        };

        let schema = RowSchema::new(event.type_name, keys)?;

        Ok(Row::new(Arc::new(schema), values))
    }
}

#[async_trait]
impl RowDecoder for EnvelopeDecoder {
    fn accept(&self, value: &RecordValue) -> bool {
        matches!(value, RecordValue::Envelope(_))
    }

    async fn decode(
        &self,
        registry: &dyn SchemaRegistry,
        value: RecordValue,
    ) -> Result<Rows, CodecError> {
        let event = match value {
            RecordValue::Envelope(event) => event,
            other => return Err(CodecError::NoDecoderAccepted { kind: other.kind() }),
        };

        let mut rows = Rows::new();
        rows.add(Self::event_to_row(registry, event).await?);

        Ok(rows)
    }
}

fn corrupt(message: String) -> CodecError {
    CodecError::CorruptFrame { message }
}

/// Reads as many bytes as available up to the buffer size; returns how many
/// were read. Distinguishes a clean EOF (0) from a truncated read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, CodecError> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }

    Ok(filled)
}

/// Bounds-checked big-endian cursor over a frame payload.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| corrupt("payload shorter than declared field".to_string()))?;

        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }
}
