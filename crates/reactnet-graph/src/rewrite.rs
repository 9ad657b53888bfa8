//! Reaction rewrite engine.
//!
//! Every edge of the flattened graph is classified into a [`RewriteAction`]
//! first; the plan is then applied to an owned copy. Reads (target levels,
//! downstream edges to move) always go to the unmodified snapshot, writes go
//! to the copy, and removals are deferred until the whole plan has run.
//!
//! | rule | edge | effect |
//! |------|------|--------|
//! | keep | gene expression, dissociation | none |
//! | ubiquitinate | ubiquitination | `u_T` + `T -> u_T`; original kept |
//! | deactivate | dephosphorylation, inhibition | `S -> a_T`, `a_T -> T`, drop `S -> T`; on −1 move `T`'s outputs to `a_T` |
//! | activate | everything else | `a_T` + `T -> a_T`; on +1 move `T`'s outputs to `a_T` |

use crate::graph::{EdgeKey, PathwayGraph};
use crate::model::{
    EdgeAttrs, Node, Polarity, RelationClass, SubtypeKind, ACTIVE_PREFIX,
    INTERMEDIATE_LEVEL_OFFSET, UBIQUITINATED_PREFIX,
};
use indexmap::IndexSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteAction {
    Keep,
    Ubiquitinate,
    /// Reroute the edge onto `a_T`; `propagate` moves `T`'s outgoing edges too.
    Deactivate { propagate: bool },
    /// Attach `a_T` to `T`; `propagate` moves `T`'s outgoing edges onto it.
    Activate { propagate: bool },
}

pub fn classify(attrs: &EdgeAttrs) -> RewriteAction {
    if attrs.relation_class == Some(RelationClass::GeneExpression) {
        return RewriteAction::Keep;
    }
    match attrs.subtype {
        SubtypeKind::Ubiquitination => RewriteAction::Ubiquitinate,
        SubtypeKind::Dephosphorylation | SubtypeKind::Inhibition => RewriteAction::Deactivate {
            propagate: attrs.polarity == Some(Polarity::Negative),
        },
        SubtypeKind::Dissociation => RewriteAction::Keep,
        // Already structural.
        SubtypeKind::Transition => RewriteAction::Keep,
        SubtypeKind::Activation
        | SubtypeKind::Expression
        | SubtypeKind::Repression
        | SubtypeKind::IndirectEffect
        | SubtypeKind::StateChange
        | SubtypeKind::BindingAssociation
        | SubtypeKind::Phosphorylation
        | SubtypeKind::Glycosylation
        | SubtypeKind::Methylation
        | SubtypeKind::MissingInteraction
        | SubtypeKind::Compound
        | SubtypeKind::HiddenCompound
        | SubtypeKind::Bind
        | SubtypeKind::Empty => RewriteAction::Activate {
            propagate: attrs.polarity == Some(Polarity::Positive),
        },
    }
}

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub graph: PathwayGraph,
    /// Edges removed before isolate pruning, in the order they were marked.
    pub removed_edges: Vec<EdgeKey>,
    pub pruned: Vec<String>,
}

/// Edges are visited grouped by source node, sources in node order. That
/// order decides which intermediates appear first and so how the linearizer
/// breaks level ties.
pub fn rewrite(snapshot: &PathwayGraph) -> RewriteOutcome {
    let plan: Vec<(EdgeKey, RewriteAction)> = snapshot
        .nodes()
        .flat_map(|node| snapshot.outgoing(&node.key))
        .map(|(key, attrs)| (key.clone(), classify(attrs)))
        .collect();

    let mut engine = Engine {
        snapshot,
        output: snapshot.clone(),
        removed: IndexSet::new(),
    };
    for (edge, action) in &plan {
        engine.apply(edge, *action);
    }

    let Engine {
        mut output,
        removed,
        ..
    } = engine;
    for key in &removed {
        output.remove_edge(key);
    }
    let pruned = output.remove_isolates();

    info!(
        edges = plan.len(),
        removed = removed.len(),
        pruned = pruned.len(),
        nodes = output.node_count(),
        "rewrote reaction network"
    );
    RewriteOutcome {
        graph: output,
        removed_edges: removed.into_iter().collect(),
        pruned,
    }
}

struct Engine<'s> {
    snapshot: &'s PathwayGraph,
    output: PathwayGraph,
    removed: IndexSet<EdgeKey>,
}

impl Engine<'_> {
    fn apply(&mut self, edge: &EdgeKey, action: RewriteAction) {
        debug!(source = %edge.source, target = %edge.target, ?action, "rewrite");
        let target = edge.target.as_str();
        match action {
            RewriteAction::Keep => {}
            RewriteAction::Ubiquitinate => {
                if let Some((modified, true)) = self.ensure_intermediate(UBIQUITINATED_PREFIX, target) {
                    self.output.add_edge(target, modified, EdgeAttrs::transition());
                }
            }
            RewriteAction::Deactivate { propagate } => {
                let Some((active, _)) = self.ensure_intermediate(ACTIVE_PREFIX, target) else {
                    return;
                };
                if let Some(attrs) = self.snapshot.edge(&edge.source, target) {
                    self.output
                        .add_edge(edge.source.clone(), active.clone(), attrs.clone());
                }
                self.output
                    .add_edge(active.clone(), target, EdgeAttrs::transition());
                self.removed.insert(edge.clone());
                if propagate {
                    self.move_outgoing(target, &active);
                }
            }
            RewriteAction::Activate { propagate } => {
                let Some((active, created)) = self.ensure_intermediate(ACTIVE_PREFIX, target) else {
                    return;
                };
                if created {
                    self.output
                        .add_edge(target, active.clone(), EdgeAttrs::transition());
                }
                if propagate {
                    self.move_outgoing(target, &active);
                }
            }
        }
    }

    /// `prefix + target`, created if missing. Returns the key and whether it
    /// was created by this call; `None` if `target` is not in the snapshot.
    fn ensure_intermediate(&mut self, prefix: &str, target: &str) -> Option<(String, bool)> {
        let level = self.snapshot.node(target)?.level;
        let key = format!("{prefix}{target}");
        if self.output.contains_node(&key) {
            return Some((key, false));
        }
        self.output
            .add_node(Node::intermediate(key.clone(), level + INTERMEDIATE_LEVEL_OFFSET));
        Some((key, true))
    }

    /// Copy every snapshot edge leaving `from` onto `onto`, marking the
    /// originals for removal.
    fn move_outgoing(&mut self, from: &str, onto: &str) {
        for (key, attrs) in self.snapshot.outgoing(from) {
            self.output
                .add_edge(onto.to_string(), key.target.clone(), attrs.clone());
            self.removed.insert(key.clone());
        }
    }
}
