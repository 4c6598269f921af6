//! Schema registry: resolving record-type names to ordered field schemas.
//!
//! Decoders consult a [`SchemaRegistry`] to enrich column naming. The
//! production implementation ([`HttpSchemaRegistry`]) talks to a remote
//! service and keeps an in-memory cache mirrored to a disk snapshot; the
//! in-memory implementations back tests and registry-less operation.

pub mod client;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod types;

pub use client::{HttpSchemaRegistry, RegistryConfig};
pub use error::{RegistryError, SnapshotError};
pub use memory::{InMemoryRegistry, NullRegistry};
pub use snapshot::{SchemaSnapshotStore, SNAPSHOT_VERSION};
pub use types::{SchemaField, SchemaFieldType};

use std::sync::Arc;

use async_trait::async_trait;

/// Resolves record-type names to their ordered field schemas.
///
/// `resolve` returns `None` when no schema is known for the type, never an
/// error. Decoders treat `None` as "name columns positionally".
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// The ordered field schema for `type_name`, if one is known.
    ///
    /// Matching is case-insensitive on the type name.
    async fn resolve(&self, type_name: &str) -> Option<Arc<Vec<SchemaField>>>;

    /// The registry's preferred casing for `type_name`.
    async fn canonical_name(&self, type_name: &str) -> Option<String>;

    /// All record-type names the registry knows.
    async fn all_types(&self) -> Vec<String>;
}
