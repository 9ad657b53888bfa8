//! KEGG ingestion for reactnet.
//!
//! - `kgml`: KGML pathway files → [`reactnet_graph::SourcePathway`]
//! - `flatfile`: KEGG DBGET flat-file records → entity records
//! - `catalog`: entity catalogs over flat-file bundles (and KEGG REST with the
//!   `rest` feature)
//! - `famplex`: FamPlex `relations.csv` as a family ontology

pub mod catalog;
pub mod famplex;
pub mod flatfile;
pub mod kgml;

pub use catalog::{get_url, BundleCatalog, BundleError, KEGG_REST_BASE};
#[cfg(feature = "rest")]
pub use catalog::RestCatalog;
pub use famplex::{FamilyTable, FamilyTableError};
pub use flatfile::{parse_records, FlatFileError};
pub use kgml::{parse_kgml, read_kgml, KgmlError};
