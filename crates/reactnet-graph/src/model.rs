//! Pathway data model: entry kinds, relation classes, interaction subtypes and
//! the attribute sets carried by graph nodes and edges.
//!
//! Subtype labels are a closed enum so every consumer (rewrite engine,
//! linearizer) has to decide explicitly what a new label means.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal pixels per ordering level (`level = x / LEVEL_SCALE`).
pub const LEVEL_SCALE: f64 = 150.0;

/// Level offset of a synthetic `a_`/`u_` node relative to its target.
pub const INTERMEDIATE_LEVEL_OFFSET: f64 = 60.0 / LEVEL_SCALE;

/// Prefix of activated/bound intermediate nodes.
pub const ACTIVE_PREFIX: &str = "a_";

/// Prefix of ubiquitinated intermediate nodes.
pub const UBIQUITINATED_PREFIX: &str = "u_";

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Gene,
    Compound,
    Group,
    Map,
    Ortholog,
    Other,
    /// Synthetic node introduced by the rewrite engine.
    Intermediate,
}

impl EntryKind {
    /// Parse a KGML `entry/@type` value. Unknown types (`enzyme`, `reaction`,
    /// `brite`, …) map to [`EntryKind::Other`].
    pub fn from_kgml(s: &str) -> Self {
        match s.trim() {
            "gene" => Self::Gene,
            "compound" => Self::Compound,
            "group" => Self::Group,
            "map" => Self::Map,
            "ortholog" => Self::Ortholog,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gene => "gene",
            Self::Compound => "compound",
            Self::Group => "group",
            Self::Map => "map",
            Self::Ortholog => "ortholog",
            Self::Other => "other",
            Self::Intermediate => "intermediate",
        }
    }

    /// Entries whose identifiers are resolved through the entity catalog.
    pub fn is_catalogued(self) -> bool {
        matches!(self, Self::Gene | Self::Compound)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized identifier, e.g. `HGNC:EGFR` or `FPLX:ERK`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroundedTerm {
    pub namespace: String,
    pub id: String,
}

impl GroundedTerm {
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Parse `namespace:id`. The id may itself contain `:`.
    pub fn parse(s: &str) -> Option<Self> {
        let (namespace, id) = s.split_once(':')?;
        let (namespace, id) = (namespace.trim(), id.trim());
        if namespace.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self::new(namespace, id))
    }
}

impl fmt::Display for GroundedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.id)
    }
}

/// A graph node: a pathway entry or a synthetic intermediate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Graph identity (display name for pathway entries, `a_X`/`u_X` for
    /// intermediates).
    pub key: String,
    /// Source entry id; `None` for intermediates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    pub kind: EntryKind,
    pub level: f64,
    /// Long-form name (joined catalog names, or the raw label).
    pub name: String,
    /// Raw source identifiers (`hsa:1956`, `cpd:C00002`, …).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,
    /// Node keys of group members; empty unless `kind == Group`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounded: Vec<GroundedTerm>,
    /// Family term this entry was renamed to during enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Node {
    pub fn intermediate(key: impl Into<String>, level: f64) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            entry_id: None,
            kind: EntryKind::Intermediate,
            level,
            identifiers: Vec::new(),
            members: Vec::new(),
            grounded: Vec::new(),
            parent: None,
        }
    }
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationClass {
    /// `PPrel`
    ProteinProtein,
    /// `GErel`
    GeneExpression,
    /// `PCrel`
    ProteinCompound,
    /// `ECrel`
    EnzymeEnzyme,
    /// `maplink`
    MapLink,
}

impl RelationClass {
    pub fn from_kgml(s: &str) -> Option<Self> {
        match s.trim() {
            "PPrel" => Some(Self::ProteinProtein),
            "GErel" => Some(Self::GeneExpression),
            "PCrel" => Some(Self::ProteinCompound),
            "ECrel" => Some(Self::EnzymeEnzyme),
            "maplink" => Some(Self::MapLink),
            _ => None,
        }
    }

    pub fn kgml_name(self) -> &'static str {
        match self {
            Self::ProteinProtein => "PPrel",
            Self::GeneExpression => "GErel",
            Self::ProteinCompound => "PCrel",
            Self::EnzymeEnzyme => "ECrel",
            Self::MapLink => "maplink",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtypeKind {
    Activation,
    Expression,
    Repression,
    Inhibition,
    IndirectEffect,
    StateChange,
    BindingAssociation,
    Phosphorylation,
    Dephosphorylation,
    Glycosylation,
    Ubiquitination,
    Methylation,
    Dissociation,
    MissingInteraction,
    Compound,
    HiddenCompound,
    /// Complex formation; not emitted by KGML but accepted from curated input.
    Bind,
    /// Synthetic edge between an entity and its intermediate form.
    Transition,
    Empty,
}

impl SubtypeKind {
    /// Parse a subtype label. Accepts both the KGML spelling
    /// (`binding/association`, `indirect effect`) and the kebab-case form.
    pub fn from_label(label: &str) -> Option<Self> {
        let kind = match label.trim() {
            "activation" => Self::Activation,
            "expression" => Self::Expression,
            "repression" => Self::Repression,
            "inhibition" => Self::Inhibition,
            "indirect effect" | "indirect-effect" => Self::IndirectEffect,
            "state change" | "state-change" => Self::StateChange,
            "binding/association" | "binding-association" => Self::BindingAssociation,
            "phosphorylation" => Self::Phosphorylation,
            "dephosphorylation" => Self::Dephosphorylation,
            "glycosylation" => Self::Glycosylation,
            "ubiquitination" => Self::Ubiquitination,
            "methylation" => Self::Methylation,
            "dissociation" => Self::Dissociation,
            "missing interaction" | "missing-interaction" => Self::MissingInteraction,
            "compound" => Self::Compound,
            "hidden compound" | "hidden-compound" => Self::HiddenCompound,
            "bind" => Self::Bind,
            _ => return None,
        };
        Some(kind)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Expression => "expression",
            Self::Repression => "repression",
            Self::Inhibition => "inhibition",
            Self::IndirectEffect => "indirect effect",
            Self::StateChange => "state change",
            Self::BindingAssociation => "binding/association",
            Self::Phosphorylation => "phosphorylation",
            Self::Dephosphorylation => "dephosphorylation",
            Self::Glycosylation => "glycosylation",
            Self::Ubiquitination => "ubiquitination",
            Self::Methylation => "methylation",
            Self::Dissociation => "dissociation",
            Self::MissingInteraction => "missing interaction",
            Self::Compound => "compound",
            Self::HiddenCompound => "hidden compound",
            Self::Bind => "bind",
            Self::Transition => "transition",
            Self::Empty => "",
        }
    }
}

impl fmt::Display for SubtypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// A raw `<subtype name=… value=…/>` pair as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtypeLabel {
    pub name: String,
    pub value: String,
}

impl SubtypeLabel {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attributes of one directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    /// `None` for synthetic transition edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_class: Option<RelationClass>,
    pub subtype: SubtypeKind,
    /// `None` for synthetic transition edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    #[serde(default)]
    pub indirect: bool,
    /// Entry id of the mediating compound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<SubtypeLabel>,
}

impl EdgeAttrs {
    pub fn transition() -> Self {
        Self {
            relation_class: None,
            subtype: SubtypeKind::Transition,
            polarity: None,
            indirect: false,
            compound_ref: None,
            subtypes: Vec::new(),
        }
    }

    /// Fold the subtype labels of one relation, in document order, into a
    /// single attribute set. Each recognized label replaces the subtype; only
    /// some labels touch the polarity. Unknown labels are kept in `subtypes`
    /// but otherwise ignored.
    pub fn from_relation(class: RelationClass, labels: &[SubtypeLabel]) -> Self {
        let mut attrs = Self {
            relation_class: Some(class),
            subtype: SubtypeKind::Empty,
            polarity: Some(Polarity::Positive),
            indirect: false,
            compound_ref: None,
            subtypes: labels.to_vec(),
        };

        for label in labels {
            let Some(kind) = SubtypeKind::from_label(&label.name) else {
                continue;
            };
            attrs.subtype = kind;
            match kind {
                SubtypeKind::Compound | SubtypeKind::HiddenCompound => {
                    attrs.polarity = Some(Polarity::Positive);
                    attrs.compound_ref = Some(label.value.clone());
                }
                SubtypeKind::Activation
                | SubtypeKind::Expression
                | SubtypeKind::Dissociation
                | SubtypeKind::MissingInteraction => {
                    attrs.polarity = Some(Polarity::Positive);
                }
                SubtypeKind::Inhibition | SubtypeKind::Repression => {
                    attrs.polarity = Some(Polarity::Negative);
                }
                SubtypeKind::IndirectEffect => {
                    attrs.polarity = Some(Polarity::Positive);
                    attrs.indirect = true;
                }
                SubtypeKind::StateChange
                | SubtypeKind::BindingAssociation
                | SubtypeKind::Phosphorylation
                | SubtypeKind::Dephosphorylation
                | SubtypeKind::Glycosylation
                | SubtypeKind::Ubiquitination
                | SubtypeKind::Methylation
                | SubtypeKind::Bind => {}
                SubtypeKind::Transition | SubtypeKind::Empty => {}
            }
        }

        attrs
    }

    pub fn is_transition(&self) -> bool {
        self.subtype == SubtypeKind::Transition
    }
}
