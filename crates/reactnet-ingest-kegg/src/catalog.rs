//! Entity catalogs backed by KEGG flat-file records.
//!
//! - [`BundleCatalog`]: records loaded up front from local flat-file text
//!   (offline runs, fixtures, CI).
//! - [`RestCatalog`] (`rest` feature): `GET <base>/get/<id>+<id>...` against
//!   the KEGG REST API, one request per batch.

use crate::flatfile::{parse_records, FlatFileError};
use reactnet_graph::{CatalogError, EntityCatalog, EntityRecord, MemoryCatalog, DEFAULT_BATCH_SIZE};
use std::path::Path;

pub const KEGG_REST_BASE: &str = "https://rest.kegg.jp";

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to read catalog bundle {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog bundle {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: FlatFileError,
    },
}

/// Offline catalog built from one or more flat-file bundles.
#[derive(Debug, Clone, Default)]
pub struct BundleCatalog {
    records: MemoryCatalog,
    batch_size: Option<usize>,
}

impl BundleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Result<Self, FlatFileError> {
        let mut catalog = Self::new();
        catalog.add_text(text)?;
        Ok(catalog)
    }

    /// Add every record in `text`; later records replace earlier ones.
    pub fn add_text(&mut self, text: &str) -> Result<usize, FlatFileError> {
        let records = parse_records(text)?;
        let added = records.len();
        for record in records {
            self.records.insert(record);
        }
        Ok(added)
    }

    pub fn add_file(&mut self, path: &Path) -> Result<usize, BundleError> {
        let text = std::fs::read_to_string(path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let added = self.add_text(&text).map_err(|source| BundleError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), records = added, "loaded catalog bundle");
        Ok(added)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EntityCatalog for BundleCatalog {
    fn resolve(&self, ids: &[String]) -> Result<Vec<EntityRecord>, CatalogError> {
        self.records.resolve(ids)
    }

    fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }
}

/// `<base>/get/<id1>+<id2>+...`
pub fn get_url(base: &str, ids: &[String]) -> String {
    format!("{}/get/{}", base.trim_end_matches('/'), ids.join("+"))
}

#[cfg(feature = "rest")]
pub use rest::RestCatalog;

#[cfg(feature = "rest")]
mod rest {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Live KEGG REST catalog. Retries are the caller's concern
    /// (`GroundingCache` wraps every batch in its retry policy).
    pub struct RestCatalog {
        client: Client,
        base_url: String,
        batch_size: usize,
    }

    impl RestCatalog {
        pub fn new(base_url: impl Into<String>, batch_size: usize) -> Result<Self, CatalogError> {
            let client = Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("reactnet/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| CatalogError::Unreachable(format!("failed to build http client: {e}")))?;
            Ok(Self {
                client,
                base_url: base_url.into(),
                batch_size: batch_size.max(1),
            })
        }
    }

    impl EntityCatalog for RestCatalog {
        fn resolve(&self, ids: &[String]) -> Result<Vec<EntityRecord>, CatalogError> {
            let url = get_url(&self.base_url, ids);
            tracing::debug!(%url, ids = ids.len(), "KEGG REST get");
            let resp = self
                .client
                .get(&url)
                .send()
                .map_err(|e| CatalogError::Unreachable(format!("{url}: {e}")))?;

            // KEGG answers 404 when none of the ids exist.
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            if !resp.status().is_success() {
                return Err(CatalogError::Unreachable(format!(
                    "{url}: http {}",
                    resp.status()
                )));
            }
            let text = resp
                .text()
                .map_err(|e| CatalogError::Unreachable(format!("{url}: {e}")))?;
            parse_records(&text).map_err(|e| CatalogError::Malformed(e.to_string()))
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }
    }
}
