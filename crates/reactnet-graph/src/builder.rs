//! Pathway graph builder: source records → [`PathwayGraph`].
//!
//! Order of work:
//! 1. fetch catalog records for every gene/compound identifier (batched),
//! 2. build gene/compound/map/ortholog nodes (with family enrichment),
//! 3. build groups from already-built members,
//! 4. insert nodes in source order, then relations as edges.

use crate::catalog::{EntityCatalog, EntityRecord, GroundingCache, RetryPolicy};
use crate::error::BuildError;
use crate::family::{covering_parent, FamilyOntology};
use crate::graph::PathwayGraph;
use crate::model::{EdgeAttrs, EntryKind, GroundedTerm, Node, LEVEL_SCALE};
use crate::source::{SourceEntry, SourcePathway};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    pub retry: RetryPolicy,
}

pub struct GraphBuilder<'a> {
    catalog: &'a dyn EntityCatalog,
    family: Option<&'a dyn FamilyOntology>,
    options: BuildOptions,
}

/// A built graph plus the entry-id → node-key mapping used to build it.
#[derive(Debug, Clone)]
pub struct BuiltPathway {
    pub graph: PathwayGraph,
    pub entry_keys: IndexMap<String, String>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(catalog: &'a dyn EntityCatalog) -> Self {
        Self {
            catalog,
            family: None,
            options: BuildOptions::default(),
        }
    }

    pub fn with_family(mut self, family: &'a dyn FamilyOntology) -> Self {
        self.family = Some(family);
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(
        &self,
        source: &SourcePathway,
        cache: &mut GroundingCache,
    ) -> Result<BuiltPathway, BuildError> {
        let identifiers: Vec<String> = source
            .entries
            .iter()
            .filter(|e| e.kind.is_catalogued())
            .flat_map(|e| e.identifiers.iter().cloned())
            .collect();
        cache.ensure(&identifiers, self.catalog, &self.options.retry)?;

        let mut built: HashMap<&str, Node> = HashMap::new();
        for entry in source.entries.iter().filter(|e| e.kind != EntryKind::Group) {
            let node = self.entity_node(entry, cache)?;
            built.insert(entry.id.as_str(), node);
        }
        for entry in source.entries.iter().filter(|e| e.kind == EntryKind::Group) {
            let node = group_node(entry, &built)?;
            built.insert(entry.id.as_str(), node);
        }

        let mut graph = PathwayGraph::new();
        let mut entry_keys = IndexMap::new();
        for entry in &source.entries {
            if let Some(node) = built.remove(entry.id.as_str()) {
                entry_keys.insert(entry.id.clone(), node.key.clone());
                graph.add_node(node);
            }
        }

        for relation in &source.relations {
            let key_of = |id: &str| {
                entry_keys
                    .get(id)
                    .cloned()
                    .ok_or_else(|| BuildError::UnknownEntry {
                        source_id: relation.source.clone(),
                        target_id: relation.target.clone(),
                        missing: id.to_string(),
                    })
            };
            let source_key = key_of(&relation.source)?;
            let target_key = key_of(&relation.target)?;
            let attrs = EdgeAttrs::from_relation(relation.class, &relation.subtypes);
            graph.add_edge(source_key, target_key, attrs);
        }

        info!(
            pathway = %source.name,
            entries = source.entries.len(),
            relations = source.relations.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built pathway graph"
        );
        Ok(BuiltPathway { graph, entry_keys })
    }

    fn entity_node(&self, entry: &SourceEntry, cache: &GroundingCache) -> Result<Node, BuildError> {
        let mut node = Node {
            key: entry.label.clone(),
            entry_id: Some(entry.id.clone()),
            kind: entry.kind,
            level: entry.x as f64 / LEVEL_SCALE,
            name: entry.label.clone(),
            identifiers: entry.identifiers.clone(),
            members: Vec::new(),
            grounded: Vec::new(),
            parent: None,
        };
        if !entry.kind.is_catalogued() {
            return Ok(node);
        }

        let records = cache.records_for(&entry.identifiers)?;
        node.name = join(records.iter().map(|r| r.name.as_str()), "_");
        node.grounded = unique_groundings(records.iter().copied());

        let display = match entry.kind {
            EntryKind::Gene => join(records.iter().filter_map(|r| r.primary_symbol()), "_"),
            _ => node.name.clone(),
        };
        if !display.is_empty() {
            node.key = display;
        }

        if entry.identifiers.len() > 1 {
            if let Some(family) = self.family {
                if let Some(parent) = covering_parent(&node.grounded, family) {
                    let renamed = family.display_name(&parent);
                    debug!(entry = %entry.id, from = %node.key, to = %renamed, "family rename");
                    node.key = renamed.clone();
                    node.parent = Some(renamed);
                }
            }
        }
        Ok(node)
    }
}

fn group_node(entry: &SourceEntry, built: &HashMap<&str, Node>) -> Result<Node, BuildError> {
    let members: Vec<&Node> = entry
        .members
        .iter()
        .map(|id| {
            built
                .get(id.as_str())
                .ok_or_else(|| BuildError::UnbuiltMember {
                    group: entry.id.clone(),
                    member: id.clone(),
                })
        })
        .collect::<Result<_, _>>()?;

    let mut grounded: Vec<GroundedTerm> = Vec::new();
    for term in members.iter().flat_map(|m| m.grounded.iter()) {
        if !grounded.contains(term) {
            grounded.push(term.clone());
        }
    }

    let key = join(members.iter().map(|m| m.key.as_str()), "_");
    Ok(Node {
        key: if key.is_empty() { entry.label.clone() } else { key },
        entry_id: Some(entry.id.clone()),
        kind: EntryKind::Group,
        level: entry.x as f64 / LEVEL_SCALE,
        name: join(members.iter().map(|m| m.name.as_str()), "+"),
        identifiers: members
            .iter()
            .flat_map(|m| m.identifiers.iter().cloned())
            .collect(),
        members: members.iter().map(|m| m.key.clone()).collect(),
        grounded,
        parent: None,
    })
}

fn unique_groundings<'r>(records: impl Iterator<Item = &'r EntityRecord>) -> Vec<GroundedTerm> {
    let mut out: Vec<GroundedTerm> = Vec::new();
    for term in records.filter_map(|r| r.grounding.as_ref()) {
        if !out.contains(term) {
            out.push(term.clone());
        }
    }
    out
}

fn join<'s>(parts: impl Iterator<Item = &'s str>, sep: &str) -> String {
    parts.collect::<Vec<_>>().join(sep)
}
