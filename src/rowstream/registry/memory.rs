//! In-memory registry implementations.
//!
//! [`InMemoryRegistry`] serves a fixed schema set (tests, offline tooling);
//! [`NullRegistry`] resolves nothing, which drives every decoder down its
//! schema-less naming path.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::types::SchemaField;
use super::SchemaRegistry;

/// A registry backed by a fixed, in-process schema map.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    schemas: HashMap<String, Arc<Vec<SchemaField>>>,
    canonical: HashMap<String, String>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        InMemoryRegistry::default()
    }

    /// Registers `fields` under `type_name`, replacing any previous entry.
    pub fn register(&mut self, type_name: impl Into<String>, fields: Vec<SchemaField>) {
        let type_name = type_name.into();
        self.canonical
            .insert(type_name.to_lowercase(), type_name.clone());
        self.schemas.insert(type_name, Arc::new(fields));
    }
}

#[async_trait]
impl SchemaRegistry for InMemoryRegistry {
    async fn resolve(&self, type_name: &str) -> Option<Arc<Vec<SchemaField>>> {
        let canonical = self.canonical.get(&type_name.to_lowercase())?;
        self.schemas.get(canonical).cloned()
    }

    async fn canonical_name(&self, type_name: &str) -> Option<String> {
        self.canonical.get(&type_name.to_lowercase()).cloned()
    }

    async fn all_types(&self) -> Vec<String> {
        self.canonical.values().cloned().collect()
    }
}

/// A registry that knows no schemas.
#[derive(Debug, Default)]
pub struct NullRegistry;

#[async_trait]
impl SchemaRegistry for NullRegistry {
    async fn resolve(&self, _type_name: &str) -> Option<Arc<Vec<SchemaField>>> {
        None
    }

    async fn canonical_name(&self, _type_name: &str) -> Option<String> {
        None
    }

    async fn all_types(&self) -> Vec<String> {
        Vec::new()
    }
}
