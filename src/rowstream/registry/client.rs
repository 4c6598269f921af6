//! HTTP schema registry client.
//!
//! Resolves a record-type name to its ordered field schema against a remote
//! registry service, caching results in memory and mirroring them to a disk
//! snapshot. A registry outage degrades column naming to whatever is cached;
//! it never breaks decoding, so `resolve` cannot fail.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{RegistryError, SnapshotError};
use super::snapshot::SchemaSnapshotStore;
use super::types::{SchemaDescription, SchemaField, TypeListing};
use super::SchemaRegistry;

/// Configuration for [`HttpSchemaRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the schema service, without a trailing slash.
    pub base_url: String,
    /// Path of the disk snapshot file.
    pub state_file: std::path::PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RegistryConfig {
    pub fn new(base_url: impl Into<String>, state_file: impl Into<std::path::PathBuf>) -> Self {
        RegistryConfig {
            base_url: base_url.into(),
            state_file: state_file.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Schema registry client with an in-memory cache and disk snapshot fallback.
///
/// Type names are matched case-insensitively: a canonical map translates any
/// casing to the registry's preferred one, and the schema cache is keyed by
/// the canonical name. The canonical map is replaced wholesale on refresh so
/// readers never see a partial update.
pub struct HttpSchemaRegistry {
    base_url: String,
    http: reqwest::Client,
    canonical: RwLock<HashMap<String, String>>,
    schema_cache: RwLock<HashMap<String, Arc<Vec<SchemaField>>>>,
    snapshot: SchemaSnapshotStore,
}

impl HttpSchemaRegistry {
    /// Builds a client, loading the disk snapshot before any remote call so
    /// the registry is immediately useful offline.
    ///
    /// An incompatible snapshot version is fatal; any other load failure is
    /// logged and treated as an empty cache.
    pub async fn connect(config: RegistryConfig) -> Result<Self, RegistryError> {
        let snapshot = SchemaSnapshotStore::new(&config.state_file)?;

        let loaded = match snapshot.load_state().await {
            Ok(schemas) => schemas,
            Err(err @ SnapshotError::IncompatibleVersion { .. }) => return Err(err.into()),
            Err(err) => {
                log::warn!(
                    "failed to load schema snapshot from {}: {}",
                    config.state_file.display(),
                    err
                );
                HashMap::new()
            }
        };

        let canonical: HashMap<String, String> = loaded
            .keys()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::Http {
                url: config.base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(HttpSchemaRegistry {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            canonical: RwLock::new(canonical),
            schema_cache: RwLock::new(loaded),
            snapshot,
        })
    }

    /// Refreshes the canonical-name map from the type listing endpoint.
    ///
    /// Returns whether the refresh succeeded. On failure the previous map
    /// stays in place.
    async fn update_canonical_map(&self) -> bool {
        let url = format!("{}/schemas", self.base_url);

        let listing = match self.fetch_json::<Vec<TypeListing>>(&url).await {
            Ok(listing) => listing,
            Err(err) => {
                log::warn!("error updating canonical type map: {}", err);
                return false;
            }
        };

        if listing.is_empty() {
            log::info!("type listing from {} was empty; keeping previous map", url);
            return false;
        }

        let replacement: HashMap<String, String> = listing
            .into_iter()
            .map(|entry| (entry.name.to_lowercase(), entry.name))
            .collect();

        *self.canonical.write().await = replacement;

        true
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, RegistryError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RegistryError::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::UnexpectedPayload {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    /// Maps `type_name` to its canonical casing, refreshing the canonical map
    /// once if the name is unknown. Falls back to the name as given.
    async fn canonicalize(&self, type_name: &str) -> String {
        let lower = type_name.to_lowercase();

        if let Some(canonical) = self.canonical.read().await.get(&lower) {
            return canonical.clone();
        }

        self.update_canonical_map().await;

        match self.canonical.read().await.get(&lower) {
            Some(canonical) => canonical.clone(),
            None => {
                log::info!("unable to get canonical type for {}", type_name);
                type_name.to_string()
            }
        }
    }

    async fn fetch_and_cache(&self, canonical: &str) {
        let url = format!("{}/schema/{}", self.base_url, canonical);

        let description = match self.fetch_json::<SchemaDescription>(&url).await {
            Ok(description) => description,
            Err(err) => {
                log::warn!(
                    "unable to contact schema registry at {}; using cached schema for {}: {}",
                    self.base_url,
                    canonical,
                    err
                );
                return;
            }
        };

        if description.fields.is_empty() {
            return;
        }

        let fields = Arc::new(description.fields);

        let persisted_view = {
            let mut cache = self.schema_cache.write().await;
            cache.insert(canonical.to_string(), fields);
            cache.clone()
        };

        if let Err(err) = self.snapshot.save_state(&persisted_view).await {
            log::warn!(
                "failed to persist schema snapshot to {}: {}",
                self.snapshot.path().display(),
                err
            );
        }
    }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn resolve(&self, type_name: &str) -> Option<Arc<Vec<SchemaField>>> {
        let lower = type_name.to_lowercase();

        // Cache hit on an already-canonicalized name needs no remote call.
        if let Some(canonical) = self.canonical.read().await.get(&lower) {
            if let Some(fields) = self.schema_cache.read().await.get(canonical) {
                return Some(fields.clone());
            }
        }

        let canonical = self.canonicalize(type_name).await;
        self.fetch_and_cache(&canonical).await;

        self.schema_cache.read().await.get(&canonical).cloned()
    }

    async fn canonical_name(&self, type_name: &str) -> Option<String> {
        if !self.update_canonical_map().await {
            log::info!(
                "unable to update canonical map; name for {} may be stale",
                type_name
            );
        }

        self.canonical
            .read()
            .await
            .get(&type_name.to_lowercase())
            .cloned()
    }

    async fn all_types(&self) -> Vec<String> {
        self.update_canonical_map().await;

        let mut types: Vec<String> = self.canonical.read().await.values().cloned().collect();
        types.sort();
        types
    }
}
