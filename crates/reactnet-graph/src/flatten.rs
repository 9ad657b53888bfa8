//! Group flattening: edges touching a group member are moved onto the group.
//!
//! The member → group table is built before any edge moves, and both
//! endpoints of an edge are mapped through it, so an edge between members of
//! two different groups ends up as one group → group edge whatever order the
//! groups are visited in.
//!
//! Limitation: a member listed by two groups maps to the group visited last.

use crate::graph::{EdgeKey, PathwayGraph};
use crate::model::EntryKind;
use indexmap::{IndexMap, IndexSet};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Flattened {
    pub graph: PathwayGraph,
    /// Member-incident edges removed from the graph.
    pub moved: Vec<EdgeKey>,
    /// Nodes dropped because flattening left them without edges.
    pub pruned: Vec<String>,
}

pub fn flatten_groups(graph: &PathwayGraph) -> Flattened {
    let groups: Vec<(&str, &[String])> = graph
        .nodes()
        .filter(|n| n.kind == EntryKind::Group)
        .map(|n| (n.key.as_str(), n.members.as_slice()))
        .collect();

    let mut member_of: IndexMap<&str, &str> = IndexMap::new();
    for (group, members) in &groups {
        for member in members.iter() {
            if member.as_str() != *group {
                member_of.insert(member.as_str(), *group);
            }
        }
    }

    // Nested groups resolve to the outermost group; the step bound guards
    // against membership cycles.
    let resolve = |key: &str| -> String {
        let mut current = key;
        for _ in 0..=member_of.len() {
            match member_of.get(current) {
                Some(group) => current = *group,
                None => break,
            }
        }
        current.to_string()
    };

    let mut output = graph.clone();
    let mut moved: IndexSet<EdgeKey> = IndexSet::new();
    for (_, members) in &groups {
        for member in members.iter() {
            let incident = graph.incoming(member).chain(graph.outgoing(member));
            for (key, attrs) in incident {
                if moved.contains(key) {
                    continue;
                }
                let source = resolve(&key.source);
                let target = resolve(&key.target);
                if source != target {
                    output.add_edge(source, target, attrs.clone());
                }
                moved.insert(key.clone());
            }
        }
    }

    for key in &moved {
        output.remove_edge(key);
    }
    let pruned = output.remove_isolates();

    info!(
        groups = groups.len(),
        moved = moved.len(),
        pruned = pruned.len(),
        "flattened group edges"
    );
    Flattened {
        graph: output,
        moved: moved.into_iter().collect(),
        pruned,
    }
}
