//! Family/ontology collaborator used to rename multi-gene entries after the
//! family they jointly belong to (e.g. `MAPK1_MAPK3` → `ERK`).

use crate::model::GroundedTerm;
use std::collections::BTreeSet;

pub trait FamilyOntology {
    fn is_member(&self, term: &GroundedTerm) -> bool;

    /// The first parent of `term`, or `None` if it has none.
    fn parent_of(&self, term: &GroundedTerm) -> Option<GroundedTerm>;

    /// Terms directly below `term`.
    fn children_of(&self, term: &GroundedTerm) -> BTreeSet<GroundedTerm>;

    fn display_name(&self, term: &GroundedTerm) -> String {
        term.id.clone()
    }
}

/// The parent term covering *all* of `grounded`, judged from the first term.
/// Partial coverage or an unknown first term yields `None`.
pub fn covering_parent(
    grounded: &[GroundedTerm],
    ontology: &dyn FamilyOntology,
) -> Option<GroundedTerm> {
    let first = grounded.first()?;
    if !ontology.is_member(first) {
        return None;
    }
    let parent = ontology.parent_of(first)?;
    let children = ontology.children_of(&parent);
    grounded
        .iter()
        .all(|term| children.contains(term))
        .then_some(parent)
}
