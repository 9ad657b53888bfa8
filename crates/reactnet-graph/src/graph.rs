//! Insertion-ordered directed graph.
//!
//! Every ordering decision downstream (level ties, edge ties) falls back to
//! insertion order, so both nodes and edges live in `IndexMap`s:
//! - re-inserting an existing node/edge replaces its attributes in place,
//! - removal preserves the relative order of everything else,
//! - re-adding a removed edge appends it at the end.
//!
//! At most one edge exists per ordered `(source, target)` pair.

use crate::model::{EdgeAttrs, Node};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
}

impl EdgeKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathwayGraph {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<EdgeKey, EdgeAttrs>,
}

impl PathwayGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Insert or replace a node. Returns `true` if the key was new.
    pub fn add_node(&mut self, node: Node) -> bool {
        self.nodes.insert(node.key.clone(), node).is_none()
    }

    pub fn contains_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Position of a node in insertion order.
    pub fn node_index(&self, key: &str) -> Option<usize> {
        self.nodes.get_index_of(key)
    }

    /// Insert or replace the edge `source -> target`.
    ///
    /// Both endpoints are expected to exist already; the graph does not
    /// create nodes implicitly.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        attrs: EdgeAttrs,
    ) -> bool {
        let key = EdgeKey::new(source, target);
        debug_assert!(
            self.nodes.contains_key(&key.source) && self.nodes.contains_key(&key.target),
            "edge {key} references a missing node"
        );
        self.edges.insert(key, attrs).is_none()
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edge(source, target).is_some()
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeAttrs> {
        self.edges.get(&EdgeKey::new(source, target))
    }

    pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<EdgeAttrs> {
        self.edges.shift_remove(key)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeAttrs)> {
        self.edges.iter()
    }

    /// Outgoing edges of `key`, in insertion order.
    pub fn outgoing<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = (&'a EdgeKey, &'a EdgeAttrs)> + 'a {
        self.edges.iter().filter(move |(e, _)| e.source == key)
    }

    /// Incoming edges of `key`, in insertion order.
    pub fn incoming<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = (&'a EdgeKey, &'a EdgeAttrs)> + 'a {
        self.edges.iter().filter(move |(e, _)| e.target == key)
    }

    pub fn degree(&self, key: &str) -> usize {
        self.edges
            .keys()
            .filter(|e| e.source == key || e.target == key)
            .count()
    }

    /// Remove every node without an incident edge. Returns the removed keys.
    pub fn remove_isolates(&mut self) -> Vec<String> {
        let connected: HashSet<&str> = self
            .edges
            .keys()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();
        let isolated: Vec<String> = self
            .nodes
            .keys()
            .filter(|k| !connected.contains(k.as_str()))
            .cloned()
            .collect();
        for key in &isolated {
            self.nodes.shift_remove(key);
        }
        isolated
    }

    /// Serializable structural view for rendering collaborators.
    pub fn to_export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes.values().cloned().collect(),
            edges: self
                .edges
                .iter()
                .map(|(key, attrs)| ExportEdge {
                    source: key.source.clone(),
                    target: key.target.clone(),
                    attrs: attrs.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<Node>,
    pub edges: Vec<ExportEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEdge {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub attrs: EdgeAttrs,
}

impl GraphExport {
    /// Rebuild a graph from an export, preserving node and edge order.
    pub fn into_graph(self) -> PathwayGraph {
        let mut graph = PathwayGraph::new();
        for node in self.nodes {
            graph.add_node(node);
        }
        for edge in self.edges {
            graph.add_edge(edge.source, edge.target, edge.attrs);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, Node};

    fn node(key: &str) -> Node {
        let mut n = Node::intermediate(key, 0.0);
        n.kind = EntryKind::Gene;
        n
    }

    fn graph(keys: &[&str], edges: &[(&str, &str)]) -> PathwayGraph {
        let mut g = PathwayGraph::new();
        for k in keys {
            g.add_node(node(k));
        }
        for (s, t) in edges {
            g.add_edge(*s, *t, EdgeAttrs::transition());
        }
        g
    }

    #[test]
    fn reinserting_edge_keeps_position() {
        let mut g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let mut attrs = EdgeAttrs::transition();
        attrs.indirect = true;
        assert!(!g.add_edge("A", "B", attrs));
        let order: Vec<String> = g.edges().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["A -> B", "B -> C"]);
        assert!(g.edge("A", "B").unwrap().indirect);
    }

    #[test]
    fn removed_then_readded_edge_moves_to_end() {
        let mut g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        g.remove_edge(&EdgeKey::new("A", "B"));
        g.add_edge("A", "B", EdgeAttrs::transition());
        let order: Vec<String> = g.edges().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["B -> C", "A -> B"]);
    }

    #[test]
    fn remove_isolates_keeps_connected_order() {
        let mut g = graph(&["A", "X", "B", "Y", "C"], &[("A", "B"), ("B", "C")]);
        let removed = g.remove_isolates();
        assert_eq!(removed, vec!["X", "Y"]);
        let keys: Vec<&str> = g.nodes().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn outgoing_and_incoming_follow_insertion_order() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "C"), ("B", "C"), ("A", "B"), ("C", "D")],
        );
        let out: Vec<&str> = g.outgoing("A").map(|(k, _)| k.target.as_str()).collect();
        assert_eq!(out, vec!["C", "B"]);
        let inc: Vec<&str> = g.incoming("C").map(|(k, _)| k.source.as_str()).collect();
        assert_eq!(inc, vec!["A", "B"]);
        assert_eq!(g.degree("C"), 3);
    }

    #[test]
    fn export_roundtrip_preserves_order() {
        let g = graph(&["B", "A"], &[("B", "A"), ("A", "B")]);
        let json = serde_json::to_string(&g.to_export()).unwrap();
        let back: GraphExport = serde_json::from_str(&json).unwrap();
        let g2 = back.into_graph();
        let keys: Vec<&str> = g2.nodes().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        let edges: Vec<String> = g2.edges().map(|(k, _)| k.to_string()).collect();
        assert_eq!(edges, vec!["B -> A", "A -> B"]);
    }
}
