//! Tests for self-describing (tree-shaped) record decoding.

use rowstream::rowstream::codec::{RecordValue, RowDecoder, TreeDecoder, TreeDocument};
use rowstream::rowstream::registry::{
    InMemoryRegistry, NullRegistry, SchemaField, SchemaFieldType,
};
use rowstream::rowstream::row::{ColumnKey, RowValue};

fn event_registry() -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    registry.register(
        "PageView",
        vec![
            SchemaField::new(1, "eventDate", SchemaFieldType::Date),
            SchemaField::new(2, "field1", SchemaFieldType::String),
            SchemaField::new(3, "field2", SchemaFieldType::String),
        ],
    );
    registry
}

fn page_view() -> TreeDocument {
    TreeDocument::new(
        "PageView",
        serde_json::json!({
            "eventDate": "2011-01-01",
            "eventGranularity": "HOURLY",
            "field1": "hello",
            "field2": "world"
        }),
    )
}

#[tokio::test]
async fn test_without_registry_every_child_becomes_a_column() {
    let decoder = TreeDecoder::new();

    let mut rows = decoder
        .decode(&NullRegistry, RecordValue::Tree(page_view()))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    // All fields survive, including the envelope metadata ones, in the
    // payload's own member order.
    assert_eq!(row.len(), 4);
    assert_eq!(row.schema().field_name_by_position(0), "eventDate");
    assert_eq!(row.schema().field_name_by_position(1), "eventGranularity");
    assert_eq!(row.schema().field_name_by_position(2), "field1");
    assert_eq!(row.schema().field_name_by_position(3), "field2");

    assert_eq!(
        row.get(&ColumnKey::new("eventGranularity")).unwrap(),
        &RowValue::Node(serde_json::json!("HOURLY"))
    );
}

#[tokio::test]
async fn test_with_registry_only_schema_fields_in_schema_order() {
    let registry = event_registry();
    let decoder = TreeDecoder::new();

    let mut rows = decoder
        .decode(&registry, RecordValue::Tree(page_view()))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    assert_eq!(row.len(), 3);
    assert_eq!(row.schema().field_name_by_position(0), "eventDate");
    assert_eq!(row.schema().field_name_by_position(1), "field1");
    assert_eq!(row.schema().field_name_by_position(2), "field2");
    assert!(!row.has_key(&ColumnKey::new("eventGranularity")));
}

#[tokio::test]
async fn test_missing_schema_child_is_null_not_omitted() {
    let registry = event_registry();
    let decoder = TreeDecoder::new();

    let partial = TreeDocument::new(
        "PageView",
        serde_json::json!({"field1": "only-one"}),
    );

    let mut rows = decoder
        .decode(&registry, RecordValue::Tree(partial))
        .await
        .unwrap();
    let row = rows.poll().unwrap();

    assert_eq!(row.len(), 3);
    assert_eq!(
        row.get(&ColumnKey::new("eventDate")).unwrap(),
        &RowValue::Node(serde_json::Value::Null)
    );
    assert_eq!(
        row.get(&ColumnKey::new("field1")).unwrap(),
        &RowValue::Node(serde_json::json!("only-one"))
    );
}

#[tokio::test]
async fn test_non_object_payload_is_a_decode_failure() {
    let decoder = TreeDecoder::new();
    let scalar = TreeDocument::new("PageView", serde_json::json!(42));

    let result = decoder
        .decode(&NullRegistry, RecordValue::Tree(scalar))
        .await;

    assert!(result.is_err());
}

#[test]
fn test_document_line_parsing() {
    let doc =
        TreeDocument::from_json_str(r#"{"type": "Click", "data": {"x": 1, "y": 2}}"#).unwrap();

    assert_eq!(doc.type_name, "Click");
    assert_eq!(doc.root, serde_json::json!({"x": 1, "y": 2}));
}

#[test]
fn test_document_without_type_falls_back_to_placeholder() {
    let doc = TreeDocument::from_json_str(r#"{"x": 1}"#).unwrap();

    assert_eq!(doc.type_name, "ad-hoc");
    assert_eq!(doc.root, serde_json::json!({"x": 1}));
}

#[test]
fn test_document_without_data_uses_remaining_members() {
    let doc = TreeDocument::from_json_str(r#"{"type": "Click", "x": 1}"#).unwrap();

    assert_eq!(doc.type_name, "Click");
    assert_eq!(doc.root, serde_json::json!({"x": 1}));
}

#[test]
fn test_invalid_json_line_is_rejected() {
    assert!(TreeDocument::from_json_str("{not json").is_err());
    assert!(TreeDocument::from_json_str("[1, 2]").is_err());
}
