//! Tests for structured envelope decoding, with and without a registry
//! schema, plus the wire round trip.

use std::sync::Arc;

use rowstream::rowstream::codec::{
    EnvelopeDecoder, EnvelopeEvent, EnvelopeEventReader, EnvelopeField, EnvelopeStreamDecoder,
    EnvelopeWriter, RecordValue, RowDecoder,
};
use rowstream::rowstream::registry::{
    InMemoryRegistry, NullRegistry, SchemaField, SchemaFieldType,
};
use rowstream::rowstream::row::{ColumnKey, DataItem, RowValue};

fn three_field_registry() -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    registry.register(
        "T",
        vec![
            SchemaField::new(1, "first", SchemaFieldType::String),
            SchemaField::new(2, "second", SchemaFieldType::String),
            SchemaField::new(3, "third", SchemaFieldType::String),
        ],
    );
    registry
}

fn sparse_event() -> EnvelopeEvent {
    EnvelopeEvent::new(
        "T",
        vec![
            EnvelopeField::new(1, DataItem::Text("x".to_string())),
            EnvelopeField::new(3, DataItem::Text("y".to_string())),
        ],
    )
}

#[tokio::test]
async fn test_schema_order_with_missing_field_nulled() {
    let registry = three_field_registry();
    let decoder = EnvelopeDecoder::new();

    let mut rows = decoder
        .decode(&registry, RecordValue::Envelope(sparse_event()))
        .await
        .unwrap();

    let row = rows.poll().unwrap();
    assert!(rows.poll().is_none());

    assert_eq!(row.len(), 3);
    assert_eq!(row.schema().field_name_by_position(0), "first");
    assert_eq!(row.schema().field_name_by_position(1), "second");
    assert_eq!(row.schema().field_name_by_position(2), "third");

    assert_eq!(
        row.get(&ColumnKey::new("first")).unwrap(),
        &RowValue::Item(DataItem::Text("x".to_string()))
    );
    assert_eq!(
        row.get(&ColumnKey::new("second")).unwrap(),
        &RowValue::Item(DataItem::Null)
    );
    assert_eq!(
        row.get(&ColumnKey::new("third")).unwrap(),
        &RowValue::Item(DataItem::Text("y".to_string()))
    );
}

#[tokio::test]
async fn test_schema_always_yields_schema_arity() {
    let registry = three_field_registry();
    let decoder = EnvelopeDecoder::new();

    let single_field = EnvelopeEvent::new(
        "T",
        vec![EnvelopeField::new(2, DataItem::Long(7))],
    );

    let mut rows = decoder
        .decode(&registry, RecordValue::Envelope(single_field))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    // Three schema fields, so three columns, however sparse the payload.
    assert_eq!(row.len(), 3);
    assert!(row.get(&ColumnKey::new("first")).unwrap().is_null());
    assert!(row.get(&ColumnKey::new("third")).unwrap().is_null());
}

#[tokio::test]
async fn test_payload_fields_outside_schema_are_dropped() {
    let registry = three_field_registry();
    let decoder = EnvelopeDecoder::new();

    let with_stranger = EnvelopeEvent::new(
        "T",
        vec![
            EnvelopeField::new(1, DataItem::Text("x".to_string())),
            EnvelopeField::new(9, DataItem::Text("unlisted".to_string())),
        ],
    );

    let mut rows = decoder
        .decode(&registry, RecordValue::Envelope(with_stranger))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    assert_eq!(row.len(), 3);
    assert!(!row.has_key(&ColumnKey::new("9")));
}

#[tokio::test]
async fn test_without_registry_columns_named_by_field_id() {
    let decoder = EnvelopeDecoder::new();

    let mut rows = decoder
        .decode(&NullRegistry, RecordValue::Envelope(sparse_event()))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    assert_eq!(row.len(), 2);
    assert_eq!(
        row.get(&ColumnKey::new("1")).unwrap(),
        &RowValue::Item(DataItem::Text("x".to_string()))
    );
    assert_eq!(
        row.get(&ColumnKey::new("3")).unwrap(),
        &RowValue::Item(DataItem::Text("y".to_string()))
    );
}

#[tokio::test]
async fn test_registry_matching_is_case_insensitive() {
    let registry = three_field_registry();
    let decoder = EnvelopeDecoder::new();

    let lowercase_type = EnvelopeEvent::new(
        "t",
        vec![EnvelopeField::new(1, DataItem::Text("x".to_string()))],
    );

    let mut rows = decoder
        .decode(&registry, RecordValue::Envelope(lowercase_type))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    assert_eq!(row.len(), 3);
    assert_eq!(row.schema().field_name_by_position(0), "first");
}

fn every_item_event() -> EnvelopeEvent {
    EnvelopeEvent::new(
        "AllTypes",
        vec![
            EnvelopeField::new(1, DataItem::Null),
            EnvelopeField::new(2, DataItem::Boolean(true)),
            EnvelopeField::new(3, DataItem::Byte(-4)),
            EnvelopeField::new(4, DataItem::Short(-1000)),
            EnvelopeField::new(5, DataItem::Integer(123_456)),
            EnvelopeField::new(6, DataItem::Long(-9_876_543_210)),
            EnvelopeField::new(7, DataItem::Double(3.5)),
            EnvelopeField::new(8, DataItem::Text("héllo".to_string())),
            EnvelopeField::new(9, DataItem::Bytes(vec![0, 1, 254, 255])),
        ],
    )
}

#[tokio::test]
async fn test_writer_reader_round_trip_for_every_value_type() {
    let event = every_item_event();

    let mut writer = EnvelopeWriter::new(Vec::new());
    writer.write_event(&event).unwrap();
    let encoded = writer.into_inner();

    let mut reader = EnvelopeEventReader::new(&encoded[..]);
    let restored = reader.read_event().unwrap().unwrap();
    assert!(reader.read_event().unwrap().is_none());

    assert_eq!(restored, event);

    // Decoding the original and the restored event yields equal rows.
    let decoder = EnvelopeDecoder::new();
    let mut original_rows = decoder
        .decode(&NullRegistry, RecordValue::Envelope(event))
        .await
        .unwrap();
    let mut restored_rows = decoder
        .decode(&NullRegistry, RecordValue::Envelope(restored))
        .await
        .unwrap();

    assert_eq!(original_rows.poll().unwrap(), restored_rows.poll().unwrap());
}

#[tokio::test]
async fn test_stream_decoder_drains_all_frames() {
    let mut writer = EnvelopeWriter::new(Vec::new());
    for _ in 0..3 {
        writer.write_event(&sparse_event()).unwrap();
    }
    let encoded = writer.into_inner();

    let decoder = EnvelopeStreamDecoder::new();
    let stream = RecordValue::Stream(rowstream::ByteStream::new(
        "batch.evt",
        Box::new(std::io::Cursor::new(encoded)),
    ));

    let rows = decoder.decode(&NullRegistry, stream).await.unwrap();

    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_empty_stream_is_zero_rows_not_an_error() {
    let decoder = EnvelopeStreamDecoder::new();
    let stream = RecordValue::Stream(rowstream::ByteStream::new(
        "empty.evt",
        Box::new(std::io::Cursor::new(Vec::new())),
    ));

    let rows = decoder.decode(&NullRegistry, stream).await.unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_row_json_uses_schema_names() {
    let registry = Arc::new(three_field_registry());
    let decoder = EnvelopeDecoder::new();

    let mut rows = decoder
        .decode(registry.as_ref(), RecordValue::Envelope(sparse_event()))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    let json = row.to_json();
    assert_eq!(json["first"], "x");
    assert_eq!(json["second"], serde_json::Value::Null);
    assert_eq!(json["third"], "y");
}
