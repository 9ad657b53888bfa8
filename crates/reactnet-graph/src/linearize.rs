//! Reaction linearizer: deterministic ordering plus templated reaction text.
//!
//! Nodes are ordered by `level` (ties keep insertion order) and edges by the
//! position of their source node (ties keep insertion order). Each edge then
//! produces zero, one or two statements; the reverse "companion" statements
//! for activation and phosphorylation are emitted once per distinct text.

use crate::graph::{EdgeKey, PathwayGraph};
use crate::model::{
    EdgeAttrs, Polarity, RelationClass, SubtypeKind, ACTIVE_PREFIX, UBIQUITINATED_PREFIX,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    /// `false` only for the `is degraded` line, which historically carries no
    /// line break and runs into the following statement when rendered.
    pub terminated: bool,
}

/// Ordered reaction statements for one network.
#[derive(Debug, Clone, Default)]
pub struct Reactions {
    statements: Vec<Statement>,
    companions: HashSet<String>,
}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(|s| s.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Concatenate every statement, each followed by `\n` unless unterminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            out.push_str(&statement.text);
            if statement.terminated {
                out.push('\n');
            }
        }
        out
    }

    fn push(&mut self, text: String) {
        self.statements.push(Statement {
            text,
            terminated: true,
        });
    }

    fn push_unterminated(&mut self, text: String) {
        self.statements.push(Statement {
            text,
            terminated: false,
        });
    }

    /// Append a companion line unless the same text was already emitted.
    fn push_companion(&mut self, text: String) {
        if self.companions.insert(text.clone()) {
            self.push(text);
        }
    }
}

impl fmt::Display for Reactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Node keys by ascending level; equal levels keep insertion order.
pub fn sort_nodes(graph: &PathwayGraph) -> Vec<&str> {
    let mut nodes: Vec<_> = graph.nodes().collect();
    nodes.sort_by(|a, b| a.level.total_cmp(&b.level));
    nodes.into_iter().map(|n| n.key.as_str()).collect()
}

/// Edges ordered by the sorted position of their source node.
pub fn sort_edges(graph: &PathwayGraph) -> Vec<(&EdgeKey, &EdgeAttrs)> {
    let position: HashMap<&str, usize> = sort_nodes(graph)
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key, i))
        .collect();
    let mut edges: Vec<_> = graph.edges().collect();
    edges.sort_by_key(|(key, _)| {
        position
            .get(key.source.as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });
    edges
}

pub fn linearize(graph: &PathwayGraph) -> Reactions {
    let mut reactions = Reactions::new();
    for (key, attrs) in sort_edges(graph) {
        emit(&mut reactions, &key.source, &key.target, attrs);
    }
    tracing::info!(
        edges = graph.edge_count(),
        statements = reactions.len(),
        "linearized reactions"
    );
    reactions
}

fn emit(out: &mut Reactions, source: &str, target: &str, attrs: &EdgeAttrs) {
    match attrs.subtype {
        SubtypeKind::Transition => return,
        SubtypeKind::Bind => {
            out.push(format!("{source} binds {target} <-> {source}_{target}"));
            return;
        }
        _ => {}
    }

    match attrs.relation_class {
        Some(RelationClass::GeneExpression) => match attrs.polarity {
            Some(Polarity::Positive) => out.push(format!("{source} transcribes {target}")),
            Some(Polarity::Negative) => out.push(format!("{source} degrades {target}")),
            None => {}
        },
        Some(RelationClass::ProteinProtein) => emit_protein(out, source, target, attrs),
        Some(RelationClass::ProteinCompound)
        | Some(RelationClass::EnzymeEnzyme)
        | Some(RelationClass::MapLink)
        | None => {}
    }
}

fn emit_protein(out: &mut Reactions, source: &str, target: &str, attrs: &EdgeAttrs) {
    match attrs.subtype {
        SubtypeKind::Phosphorylation => {
            let product = format!("{ACTIVE_PREFIX}{target}");
            out.push(format!("{source} phosphorylates {target} -> {product}"));
            out.push_companion(format!("{product} is dephosphorylated -> {target}"));
        }
        SubtypeKind::Dephosphorylation => {
            let product = strip_modification_marks(target);
            out.push(format!("{source} dephosphorylates {target} -> {product}"));
        }
        SubtypeKind::Ubiquitination => {
            let product = format!("{UBIQUITINATED_PREFIX}{target}");
            out.push(format!("{source} ubiquitinates {target} -> {product}"));
            out.push_unterminated(format!("{product} is degraded"));
        }
        SubtypeKind::Dissociation => {}
        _ if attrs.polarity == Some(Polarity::Positive)
            || attrs.subtype == SubtypeKind::BindingAssociation =>
        {
            let product = format!("{ACTIVE_PREFIX}{target}");
            out.push(format!("{source} activates {target} -> {product}"));
            out.push_companion(format!("{product} is deactivated -> {target}"));
        }
        _ if attrs.polarity == Some(Polarity::Negative) => {
            let product = strip_activation_marks(target);
            out.push(format!("{source} deactivates {target} -> {product}"));
        }
        _ => {}
    }
}

/// Product of a deactivation: `target` with every leading and trailing `a`
/// and `_` character removed.
///
/// Known defect, kept for output compatibility: this is a character-set
/// strip, not prefix removal, so `a_aldosterone` becomes `ldosterone` and a
/// name ending in `a` loses that letter.
pub fn strip_activation_marks(target: &str) -> &str {
    target.trim_matches(|c: char| c == 'a' || c == '_')
}

/// Product of a dephosphorylation: `target` without surrounding `*` marks.
pub fn strip_modification_marks(target: &str) -> &str {
    target.trim_matches('*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, Node, SubtypeLabel};
    use crate::rewrite::rewrite;

    fn node(key: &str, level: f64) -> Node {
        let mut n = Node::intermediate(key, level);
        n.kind = EntryKind::Gene;
        n
    }

    fn rel(class: RelationClass, subtype: &str) -> EdgeAttrs {
        EdgeAttrs::from_relation(class, &[SubtypeLabel::new(subtype, "-->")])
    }

    fn pp(subtype: &str) -> EdgeAttrs {
        rel(RelationClass::ProteinProtein, subtype)
    }

    fn graph(nodes: &[(&str, f64)], edges: &[(&str, &str, EdgeAttrs)]) -> PathwayGraph {
        let mut g = PathwayGraph::new();
        for (key, level) in nodes {
            g.add_node(node(key, *level));
        }
        for (s, t, a) in edges {
            g.add_edge(*s, *t, a.clone());
        }
        g
    }

    #[test]
    fn nodes_sort_by_level_with_stable_ties() {
        let g = graph(&[("C", 2.0), ("A", 1.0), ("B", 1.0), ("D", 0.5)], &[]);
        assert_eq!(sort_nodes(&g), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn edges_follow_source_position() {
        let g = graph(
            &[("late", 3.0), ("early", 1.0), ("x", 5.0), ("y", 6.0)],
            &[
                ("late", "x", pp("activation")),
                ("early", "y", pp("activation")),
                ("early", "x", pp("activation")),
            ],
        );
        let order: Vec<String> = sort_edges(&g).iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["early -> y", "early -> x", "late -> x"]);
    }

    #[test]
    fn scenario_phosphorylation() {
        let g = graph(&[("A", 0.0), ("B", 1.0)], &[("A", "B", pp("phosphorylation"))]);
        let reactions = linearize(&rewrite(&g).graph);
        assert_eq!(
            reactions.lines().collect::<Vec<_>>(),
            vec!["A phosphorylates B -> a_B", "a_B is dephosphorylated -> B"]
        );
    }

    #[test]
    fn scenario_inhibition_reroutes_text() {
        let g = graph(
            &[("C", 0.0), ("D", 1.0), ("E", 2.0)],
            &[("C", "D", pp("inhibition")), ("D", "E", pp("activation"))],
        );
        let reactions = linearize(&rewrite(&g).graph);
        assert_eq!(
            reactions.lines().collect::<Vec<_>>(),
            vec![
                "C deactivates a_D -> D",
                "a_D activates E -> a_E",
                "a_E is deactivated -> E",
            ]
        );
    }

    #[test]
    fn companion_lines_are_deduplicated() {
        let g = graph(
            &[("A", 0.0), ("B", 0.1), ("T", 1.0)],
            &[("A", "T", pp("activation")), ("B", "T", pp("binding/association"))],
        );
        let reactions = linearize(&g);
        assert_eq!(
            reactions.lines().collect::<Vec<_>>(),
            vec![
                "A activates T -> a_T",
                "a_T is deactivated -> T",
                "B activates T -> a_T",
            ]
        );
    }

    #[test]
    fn degraded_line_is_unterminated() {
        let g = graph(
            &[("E3", 0.0), ("P", 1.0), ("Q", 2.0)],
            &[("E3", "P", pp("ubiquitination")), ("P", "Q", pp("inhibition"))],
        );
        let reactions = linearize(&g);
        assert_eq!(
            reactions.render(),
            "E3 ubiquitinates P -> u_P\nu_P is degradedP deactivates Q -> Q\n"
        );
        assert!(!reactions.statements()[1].terminated);
    }

    #[test]
    fn gene_expression_uses_polarity() {
        let g = graph(
            &[("TF", 0.0), ("G1", 1.0), ("G2", 1.0)],
            &[
                ("TF", "G1", rel(RelationClass::GeneExpression, "expression")),
                ("TF", "G2", rel(RelationClass::GeneExpression, "repression")),
            ],
        );
        assert_eq!(
            linearize(&g).lines().collect::<Vec<_>>(),
            vec!["TF transcribes G1", "TF degrades G2"]
        );
    }

    #[test]
    fn bind_and_silent_rows() {
        let g = graph(
            &[("A", 0.0), ("B", 1.0), ("C", 2.0), ("X", 3.0)],
            &[
                ("A", "B", pp("bind")),
                ("B", "C", pp("dissociation")),
                ("C", "X", rel(RelationClass::ProteinCompound, "activation")),
                ("X", "A", EdgeAttrs::transition()),
            ],
        );
        assert_eq!(
            linearize(&g).lines().collect::<Vec<_>>(),
            vec!["A binds B <-> A_B"]
        );
    }

    #[test]
    fn dephosphorylation_strips_stars() {
        let g = graph(
            &[("PP2A", 0.0), ("*MEK*", 1.0)],
            &[("PP2A", "*MEK*", pp("dephosphorylation"))],
        );
        assert_eq!(
            linearize(&g).lines().collect::<Vec<_>>(),
            vec!["PP2A dephosphorylates *MEK* -> MEK"]
        );
    }

    #[test]
    fn activation_strip_is_a_character_strip() {
        assert_eq!(strip_activation_marks("a_D"), "D");
        assert_eq!(strip_activation_marks("a_aldosterone"), "ldosterone");
        assert_eq!(strip_activation_marks("actina"), "ctin");
        assert_eq!(strip_activation_marks("PIK3CA"), "PIK3CA");
    }

    #[test]
    fn output_is_deterministic() {
        let g = graph(
            &[("A", 0.0), ("B", 1.0), ("C", 1.0), ("D", 2.0)],
            &[
                ("A", "B", pp("phosphorylation")),
                ("A", "C", pp("inhibition")),
                ("C", "D", pp("activation")),
                ("B", "D", pp("ubiquitination")),
            ],
        );
        let first = linearize(&rewrite(&g).graph).render();
        let second = linearize(&rewrite(&g).graph).render();
        assert_eq!(first, second);
    }
}
