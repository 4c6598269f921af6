//! # rowstream
//!
//! Decodes the heterogeneous record files produced by an upstream collection
//! pipeline into a uniform, columnar row representation that downstream
//! tooling can render, filter, or re-serialize as JSON.
//!
//! Records arrive in several incompatible wire shapes (length-prefixed
//! structured binary envelopes, raw envelope streams, newline-delimited text,
//! and generic container payloads) and are decoded without knowing up front
//! which shape a given byte source uses. Column names are optionally enriched
//! from an external, eventually-consistent schema registry.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rowstream::rowstream::codec::RowParser;
//! use rowstream::rowstream::datasource::{LocalFileSystem, RowFileReaderFactory};
//! use rowstream::rowstream::registry::NullRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let parser = RowParser::with_default_decoders();
//!     let factory = RowFileReaderFactory::new(parser, Arc::new(NullRegistry));
//!     let fs = LocalFileSystem::new();
//!
//!     let mut reader = factory.build(&fs, "/data/events/2011-01-01.evt").await?;
//!
//!     while reader.has_next().await {
//!         let row = reader.next_row().await?;
//!         println!("{}", row.to_json());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod rowstream;

// Re-export the main API at the crate root for easy access
pub use rowstream::codec::{
    ByteStream, CodecError, EnvelopeEvent, EnvelopeEventReader, EnvelopeField, EnvelopeWriter,
    RecordValue, RowDecoder, RowParser,
};
pub use rowstream::datasource::{
    ByteSource, ByteSourceError, LocalFileSystem, PathStat, ReaderError, RowFileReader,
    RowFileReaderFactory,
};
pub use rowstream::registry::{
    HttpSchemaRegistry, InMemoryRegistry, NullRegistry, RegistryConfig, SchemaField,
    SchemaFieldType, SchemaRegistry, SchemaSnapshotStore,
};
pub use rowstream::row::{
    ColumnKey, ColumnKeyBuilder, DataItem, Row, RowAccessError, RowSchema, RowValue, Rows,
};
