//! `reactnet` configuration file (JSON). Every field is optional; command-line
//! flags override file values.
//!
//! ```json
//! {
//!   "catalog": {
//!     "batch_size": 10,
//!     "retry": { "attempts": 3, "delay_ms": 3000 },
//!     "rest_base_url": "https://rest.kegg.jp"
//!   },
//!   "family": { "table": "famplex/relations.csv" }
//! }
//! ```

use anyhow::{Context, Result};
use reactnet_graph::{BuildOptions, RetryPolicy, DEFAULT_BATCH_SIZE};
use reactnet_ingest_kegg::KEGG_REST_BASE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactnetConfig {
    pub catalog: CatalogConfig,
    pub family: FamilyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub batch_size: usize,
    pub retry: RetryPolicy,
    pub rest_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
            rest_base_url: KEGG_REST_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyConfig {
    /// FamPlex `relations.csv`.
    pub table: Option<PathBuf>,
}

impl ReactnetConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// File values when `path` is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            retry: self.catalog.retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ReactnetConfig =
            serde_json::from_str(r#"{"catalog": {"retry": {"attempts": 5}}}"#).unwrap();
        assert_eq!(config.catalog.retry.attempts, 5);
        assert_eq!(config.catalog.retry.delay_ms, 3_000);
        assert_eq!(config.catalog.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.catalog.rest_base_url, KEGG_REST_BASE);
        assert!(config.family.table.is_none());
    }

    #[test]
    fn missing_file_has_context() {
        let err = ReactnetConfig::load(Path::new("/nonexistent/reactnet.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
