//! End-to-end conversion: build → flatten → rewrite → linearize.

use crate::builder::{BuildOptions, BuiltPathway, GraphBuilder};
use crate::catalog::{EntityCatalog, GroundingCache};
use crate::error::BuildError;
use crate::family::FamilyOntology;
use crate::flatten::{flatten_groups, Flattened};
use crate::graph::{EdgeKey, PathwayGraph};
use crate::linearize::{linearize, Reactions};
use crate::rewrite::rewrite;
use crate::source::SourcePathway;

/// Every intermediate product of one conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub built: BuiltPathway,
    pub flattened: Flattened,
    /// The rewritten reaction network (after isolate pruning).
    pub rewritten: PathwayGraph,
    pub removed_edges: Vec<EdgeKey>,
    pub reactions: Reactions,
}

pub fn convert(
    source: &SourcePathway,
    cache: &mut GroundingCache,
    catalog: &dyn EntityCatalog,
    family: Option<&dyn FamilyOntology>,
    options: &BuildOptions,
) -> Result<Conversion, BuildError> {
    let mut builder = GraphBuilder::new(catalog).with_options(options.clone());
    if let Some(family) = family {
        builder = builder.with_family(family);
    }
    let built = builder.build(source, cache)?;
    let flattened = flatten_groups(&built.graph);
    let outcome = rewrite(&flattened.graph);
    let reactions = linearize(&outcome.graph);

    Ok(Conversion {
        built,
        flattened,
        rewritten: outcome.graph,
        removed_edges: outcome.removed_edges,
        reactions,
    })
}
