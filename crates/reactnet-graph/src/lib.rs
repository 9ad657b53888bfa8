//! reactnet-graph: pathway → reaction network rewriting.
//!
//! Pipeline stages, each usable on its own:
//! - `builder`: source entries/relations → [`PathwayGraph`] (catalog naming,
//!   family enrichment, group construction)
//! - `flatten`: member edges moved onto their group
//! - `rewrite`: activated/modified intermediates (`a_X`, `u_X`) inserted and
//!   downstream edges rerouted
//! - `linearize`: deterministic ordering and reaction text
//!
//! [`convert`] runs all four.
//!
//! ## Ordering
//!
//! Nodes and edges live in insertion-ordered maps, so every stage is
//! deterministic for a given input: the same pathway always yields the same
//! bytes.

pub mod builder;
pub mod catalog;
pub mod error;
pub mod family;
pub mod flatten;
pub mod graph;
pub mod linearize;
pub mod model;
pub mod pipeline;
pub mod rewrite;
pub mod source;

pub use builder::{BuildOptions, BuiltPathway, GraphBuilder};
pub use catalog::{
    local_id, CatalogError, EntityCatalog, EntityRecord, GroundingCache, MemoryCatalog,
    RetryPolicy, DEFAULT_BATCH_SIZE,
};
pub use error::BuildError;
pub use family::{covering_parent, FamilyOntology};
pub use flatten::{flatten_groups, Flattened};
pub use graph::{EdgeKey, ExportEdge, GraphExport, PathwayGraph};
pub use linearize::{linearize, Reactions, Statement};
pub use model::{
    EdgeAttrs, EntryKind, GroundedTerm, Node, Polarity, RelationClass, SubtypeKind, SubtypeLabel,
};
pub use pipeline::{convert, Conversion};
pub use rewrite::{rewrite, RewriteAction, RewriteOutcome};
pub use source::{SourceEntry, SourcePathway, SourceRelation};
