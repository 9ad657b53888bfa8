//! Entity catalog contract and the per-build grounding cache.
//!
//! A catalog resolves raw identifiers (`hsa:1956`, `cpd:C00002`) into
//! [`EntityRecord`]s. Catalogs may be slow or network-backed; the cache makes
//! sure each identifier is requested at most once per build and wraps every
//! batch in a fixed retry budget.

use crate::error::BuildError;
use crate::model::GroundedTerm;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Local identifier (`1956`, `C00002`), without the organism/db prefix.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub db_links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<GroundedTerm>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbols: None,
            db_links: BTreeMap::new(),
            grounding: None,
        }
    }

    pub fn primary_symbol(&self) -> Option<&str> {
        self.symbols
            .as_ref()
            .and_then(|s| s.first())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Local part of a raw identifier: `hsa:1956` → `1956`.
pub fn local_id(raw: &str) -> &str {
    raw.rsplit_once(':').map_or(raw, |(_, id)| id)
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unreachable: {0}")]
    Unreachable(String),

    #[error("catalog returned no record for {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

pub trait EntityCatalog {
    /// Resolve a batch of raw identifiers. Must be idempotent. Records for
    /// identifiers the catalog does not know may simply be absent.
    fn resolve(&self, ids: &[String]) -> Result<Vec<EntityRecord>, CatalogError>;

    /// Largest batch a single `resolve` call accepts.
    fn batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }
}

/// In-memory catalog keyed by local id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: HashMap<String, EntityRecord>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: EntityRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<EntityRecord> for MemoryCatalog {
    fn from_iter<T: IntoIterator<Item = EntityRecord>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

impl EntityCatalog for MemoryCatalog {
    fn resolve(&self, ids: &[String]) -> Result<Vec<EntityRecord>, CatalogError> {
        Ok(ids
            .iter()
            .filter_map(|raw| self.records.get(local_id(raw)).cloned())
            .collect())
    }
}

// ============================================================================
// Retry + cache
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Single attempt, no delay.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay_ms: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 3_000,
        }
    }
}

/// Records fetched during one build, keyed by local id.
///
/// Owned by the caller of a single build so nothing leaks across pathways
/// unless the caller passes the same cache again on purpose.
#[derive(Debug, Clone, Default)]
pub struct GroundingCache {
    records: HashMap<String, EntityRecord>,
    lookups: usize,
}

impl GroundingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of catalog calls that succeeded through this cache.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn get(&self, raw_id: &str) -> Option<&EntityRecord> {
        self.records.get(local_id(raw_id))
    }

    pub fn contains(&self, raw_id: &str) -> bool {
        self.records.contains_key(local_id(raw_id))
    }

    /// Fetch every identifier not yet cached, in batches of
    /// `catalog.batch_size()`, retrying each batch per `retry`.
    pub fn ensure(
        &mut self,
        raw_ids: &[String],
        catalog: &dyn EntityCatalog,
        retry: &RetryPolicy,
    ) -> Result<(), BuildError> {
        let unseen: IndexSet<&String> = raw_ids.iter().filter(|id| !self.contains(id)).collect();
        if unseen.is_empty() {
            return Ok(());
        }
        let unseen: Vec<String> = unseen.into_iter().cloned().collect();
        let batch_size = catalog.batch_size().max(1);

        for batch in unseen.chunks(batch_size) {
            let records = fetch_batch(batch, catalog, retry)?;
            self.lookups += 1;
            for record in records {
                self.records.insert(record.id.clone(), record);
            }
        }
        tracing::debug!(
            fetched = unseen.len(),
            cached = self.records.len(),
            "grounding cache filled"
        );
        Ok(())
    }

    /// Records for `raw_ids`, in order. Every id must already be cached.
    pub fn records_for(&self, raw_ids: &[String]) -> Result<Vec<&EntityRecord>, BuildError> {
        raw_ids
            .iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| BuildError::Unresolved(id.clone()))
            })
            .collect()
    }
}

fn fetch_batch(
    batch: &[String],
    catalog: &dyn EntityCatalog,
    retry: &RetryPolicy,
) -> Result<Vec<EntityRecord>, BuildError> {
    let attempts = retry.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = catalog
            .resolve(batch)
            .and_then(|records| require_coverage(batch, records));
        match result {
            Ok(records) => return Ok(records),
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    attempts,
                    batch = batch.len(),
                    error = %err,
                    "catalog lookup failed; retrying"
                );
                std::thread::sleep(retry.delay());
            }
            Err(err) => {
                return Err(BuildError::Catalog {
                    attempts,
                    source: err,
                })
            }
        }
    }
}

fn require_coverage(
    batch: &[String],
    records: Vec<EntityRecord>,
) -> Result<Vec<EntityRecord>, CatalogError> {
    let missing: Vec<String> = batch
        .iter()
        .filter(|raw| !records.iter().any(|r| r.id == local_id(raw)))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(records)
    } else {
        Err(CatalogError::Missing(missing))
    }
}
