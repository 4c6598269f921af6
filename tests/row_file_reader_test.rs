//! Tests for the batched lazy row iterator: idempotent hasNext, resource
//! safety, soft EOF on corruption, and end-to-end file reading.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use rowstream::rowstream::codec::{
    BufferedRowsReader, CodecError, EnvelopeEvent, EnvelopeField, EnvelopeWriter, RowParser,
};
use rowstream::rowstream::datasource::{
    LocalFileSystem, ReaderError, RowFileReader, RowFileReaderFactory,
};
use rowstream::rowstream::registry::{
    InMemoryRegistry, NullRegistry, SchemaField, SchemaFieldType,
};
use rowstream::rowstream::row::{ColumnKey, DataItem, Row, RowSchema, RowValue, Rows};

fn tick_row(i: i64) -> Row {
    let schema = RowSchema::new("Tick", vec![ColumnKey::new("n")]).unwrap();
    Row::new(
        Arc::new(schema),
        vec![RowValue::Item(DataItem::Long(i))],
    )
}

/// A scripted source of row batches with call accounting.
struct ScriptedReader {
    batches: Vec<Result<Option<Rows>, CodecError>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl BufferedRowsReader for ScriptedReader {
    async fn read_next(&mut self) -> Result<Option<Rows>, CodecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.batches.is_empty() {
            Ok(None)
        } else {
            self.batches.remove(0)
        }
    }
}

fn scripted(
    batches: Vec<Result<Option<Rows>, CodecError>>,
) -> (RowFileReader, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let reader = RowFileReader::new(
        "scripted",
        Box::new(ScriptedReader {
            batches,
            calls: Arc::clone(&calls),
        }),
    );
    (reader, calls)
}

fn batch_of(count: i64) -> Result<Option<Rows>, CodecError> {
    let mut rows = Rows::new();
    for i in 0..count {
        rows.add(tick_row(i));
    }
    Ok(Some(rows))
}

#[tokio::test]
async fn test_has_next_is_idempotent() {
    let (mut reader, calls) = scripted(vec![batch_of(1)]);

    assert!(reader.has_next().await);
    assert!(reader.has_next().await);
    assert!(reader.has_next().await);

    // The single batch was fetched once; repeats observed the pending row.
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    reader.next_row().await.unwrap();
    assert!(!reader.has_next().await);
}

#[tokio::test]
async fn test_one_decode_step_feeds_many_next_calls() {
    let (mut reader, calls) = scripted(vec![batch_of(4)]);

    for i in 0..4 {
        let row = reader.next_row().await.unwrap();
        assert_eq!(
            row.get(&ColumnKey::new("n")).unwrap(),
            &RowValue::Item(DataItem::Long(i))
        );
    }

    assert!(!reader.has_next().await);
    // One call produced the batch, one observed end of stream.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_next_after_exhaustion_is_end_of_sequence() {
    let (mut reader, _) = scripted(vec![batch_of(1)]);

    reader.next_row().await.unwrap();

    assert!(matches!(
        reader.next_row().await,
        Err(ReaderError::EndOfSequence)
    ));
}

#[tokio::test]
async fn test_empty_batches_are_skipped_not_terminal() {
    let (mut reader, _) = scripted(vec![Ok(Some(Rows::new())), batch_of(1)]);

    assert!(reader.has_next().await);
    reader.next_row().await.unwrap();
    assert!(!reader.has_next().await);
}

#[tokio::test]
async fn test_close_is_idempotent_and_stops_reading() {
    let (mut reader, calls) = scripted(vec![batch_of(3)]);

    reader.close();
    reader.close();

    assert!(reader.is_closed());
    assert!(!reader.has_next().await);
    assert!(matches!(
        reader.next_row().await,
        Err(ReaderError::EndOfSequence)
    ));
    // No read ever reached the underlying source.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_decode_failure_is_soft_eof() {
    let (mut reader, _) = scripted(vec![
        batch_of(2),
        Err(CodecError::CorruptFrame {
            message: "truncated".to_string(),
        }),
        batch_of(2),
    ]);

    assert!(reader.next_row().await.is_ok());
    assert!(reader.next_row().await.is_ok());

    // The failure closes the source instead of propagating; the trailing
    // batch is never reached.
    assert!(!reader.has_next().await);
    assert!(reader.is_closed());
}

fn write_envelope_file(dir: &std::path::Path, name: &str, count: i64) -> String {
    let mut writer = EnvelopeWriter::new(Vec::new());
    for i in 0..count {
        writer
            .write_event(&EnvelopeEvent::new(
                "Tick",
                vec![
                    EnvelopeField::new(1, DataItem::Long(i)),
                    EnvelopeField::new(2, DataItem::Text(format!("tick-{}", i))),
                ],
            ))
            .unwrap();
    }

    let path = dir.join(name);
    std::fs::write(&path, writer.into_inner()).unwrap();
    path.to_str().unwrap().to_string()
}

fn tick_registry() -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    registry.register(
        "Tick",
        vec![
            SchemaField::new(1, "sequence", SchemaFieldType::Long),
            SchemaField::new(2, "label", SchemaFieldType::String),
        ],
    );
    registry
}

#[tokio::test]
async fn test_envelope_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_envelope_file(dir.path(), "ticks.evt", 5);

    let factory = RowFileReaderFactory::new(
        RowParser::with_default_decoders(),
        Arc::new(tick_registry()),
    );
    let fs = LocalFileSystem::new();

    let mut reader = factory.build(&fs, &path).await.unwrap();
    let rows = reader.collect_rows().await;

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].schema().field_name_by_position(0), "sequence");
    assert_eq!(
        rows[4].get(&ColumnKey::new("label")).unwrap(),
        &RowValue::Item(DataItem::Text("tick-4".to_string()))
    );
    assert!(reader.is_closed());
}

#[tokio::test]
async fn test_corrupt_tail_stops_the_file_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_envelope_file(dir.path(), "ticks.evt", 2);

    // Append garbage that parses as an over-long length prefix.
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap();
    file.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
    drop(file);

    let factory = RowFileReaderFactory::new(
        RowParser::with_default_decoders(),
        Arc::new(NullRegistry),
    );
    let fs = LocalFileSystem::new();

    let mut reader = factory.build(&fs, &path).await.unwrap();
    let rows = reader.collect_rows().await;

    // The corrupt tail lands in the same decode step as the valid frames, so
    // the whole file degrades to soft EOF without an error escaping.
    assert!(rows.len() <= 2);
    assert!(reader.is_closed());
}

#[tokio::test]
async fn test_jsonl_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clicks.jsonl");
    std::fs::write(
        &path,
        concat!(
            "{\"type\": \"Click\", \"data\": {\"x\": 1, \"y\": 2}}\n",
            "\n",
            "{\"type\": \"Click\", \"data\": {\"x\": 3, \"y\": 4}}\n",
        ),
    )
    .unwrap();

    let factory = RowFileReaderFactory::new(
        RowParser::with_default_decoders(),
        Arc::new(NullRegistry),
    );
    let fs = LocalFileSystem::new();

    let mut reader = factory
        .build(&fs, path.to_str().unwrap())
        .await
        .unwrap();
    let rows = reader.collect_rows().await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].type_name(), "Click");
    assert_eq!(
        rows[1].get(&ColumnKey::new("x")).unwrap(),
        &RowValue::Node(serde_json::json!(3))
    );
}

#[tokio::test]
async fn test_raw_mode_wraps_each_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opaque.bin");
    std::fs::write(&path, "first line\nsecond line\n").unwrap();

    let factory = RowFileReaderFactory::new(
        RowParser::with_default_decoders(),
        Arc::new(NullRegistry),
    );
    let fs = LocalFileSystem::new();

    let mut reader = factory
        .build_raw(&fs, path.to_str().unwrap())
        .await
        .unwrap();
    let rows = reader.collect_rows().await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].type_name(), "ad-hoc");
    assert_eq!(
        rows[0].get(&ColumnKey::new("record")).unwrap(),
        &RowValue::Raw(b"first line".to_vec())
    );
}

#[tokio::test]
async fn test_unrecognized_suffix_fails_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.unknown");
    std::fs::write(&path, "payload").unwrap();

    let factory = RowFileReaderFactory::new(
        RowParser::with_default_decoders(),
        Arc::new(NullRegistry),
    );
    let fs = LocalFileSystem::new();

    let result = factory.build(&fs, path.to_str().unwrap()).await;

    assert!(matches!(
        result,
        Err(ReaderError::Codec(CodecError::UnknownStreamSuffix { .. }))
    ));
}

#[tokio::test]
async fn test_batch_cap_bounds_one_decode_step() {
    let dir = tempfile::tempdir().unwrap();
    // More events than one decode step may buffer.
    let path = write_envelope_file(dir.path(), "many.evt", 1005);

    let factory = RowFileReaderFactory::new(
        RowParser::with_default_decoders(),
        Arc::new(NullRegistry),
    );
    let fs = LocalFileSystem::new();

    let mut reader = factory.build(&fs, &path).await.unwrap();

    let mut count = 0;
    while reader.has_next().await {
        reader.next_row().await.unwrap();
        count += 1;
    }

    assert_eq!(count, 1005);
}
