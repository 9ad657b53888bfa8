//! Source records: the parsed entries and relations a pathway reader hands to
//! the graph builder. Readers (KGML, JSON fixtures, …) live outside this crate.

use crate::model::{EntryKind, RelationClass, SubtypeLabel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePathway {
    /// Pathway identifier, e.g. `path:hsa04012`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub entries: Vec<SourceEntry>,
    #[serde(default)]
    pub relations: Vec<SourceRelation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub kind: EntryKind,
    /// Space-separated identifiers from the source, split.
    #[serde(default)]
    pub identifiers: Vec<String>,
    /// Raw graphics label.
    #[serde(default)]
    pub label: String,
    /// Member entry ids (groups only), in source order.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRelation {
    pub source: String,
    pub target: String,
    pub class: RelationClass,
    #[serde(default)]
    pub subtypes: Vec<SubtypeLabel>,
}

impl SourcePathway {
    pub fn entry(&self, id: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}
