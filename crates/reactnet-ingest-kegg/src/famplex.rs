//! FamPlex `relations.csv` family table.
//!
//! Each row is `child_ns,child_id,isa|partof,parent_ns,parent_id`, e.g.
//! `HGNC,MAPK1,isa,FPLX,ERK`. Both relation kinds are treated as "belongs to".

use reactnet_graph::{FamilyOntology, GroundedTerm};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FamilyTableError {
    #[error("failed to read family table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected 5 comma-separated fields, got `{text}`")]
    Malformed { line: usize, text: String },

    #[error("line {line}: unknown relation `{relation}` (expected isa or partof)")]
    UnknownRelation { line: usize, relation: String },
}

#[derive(Debug, Clone, Default)]
pub struct FamilyTable {
    parents: HashMap<GroundedTerm, Vec<GroundedTerm>>,
    children: HashMap<GroundedTerm, Vec<GroundedTerm>>,
}

impl FamilyTable {
    pub fn load(path: &Path) -> Result<Self, FamilyTableError> {
        let text = std::fs::read_to_string(path).map_err(|source| FamilyTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), terms = table.parents.len(), "loaded family table");
        Ok(table)
    }

    pub fn parse(text: &str) -> Result<Self, FamilyTableError> {
        let mut table = Self::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let [child_ns, child_id, relation, parent_ns, parent_id] = fields[..] else {
                return Err(FamilyTableError::Malformed {
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            if relation != "isa" && relation != "partof" {
                return Err(FamilyTableError::UnknownRelation {
                    line: idx + 1,
                    relation: relation.to_string(),
                });
            }
            table.insert(
                GroundedTerm::new(child_ns, child_id),
                GroundedTerm::new(parent_ns, parent_id),
            );
        }
        Ok(table)
    }

    pub fn insert(&mut self, child: GroundedTerm, parent: GroundedTerm) {
        let parents = self.parents.entry(child.clone()).or_default();
        if !parents.contains(&parent) {
            parents.push(parent.clone());
        }
        let children = self.children.entry(parent).or_default();
        if !children.contains(&child) {
            children.push(child);
        }
    }

    pub fn len(&self) -> usize {
        self.parents.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl FamilyOntology for FamilyTable {
    fn is_member(&self, term: &GroundedTerm) -> bool {
        self.parents.contains_key(term) || self.children.contains_key(term)
    }

    /// First parent listed in the table.
    fn parent_of(&self, term: &GroundedTerm) -> Option<GroundedTerm> {
        self.parents.get(term)?.first().cloned()
    }

    /// Direct children only; members of sub-families are not included.
    fn children_of(&self, term: &GroundedTerm) -> BTreeSet<GroundedTerm> {
        self.children
            .get(term)
            .map(|children| children.iter().cloned().collect())
            .unwrap_or_default()
    }
}
