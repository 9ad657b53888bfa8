//! KGML reader.
//!
//! Reads the subset of KEGG Markup Language the graph builder needs:
//!
//! ```text
//! <pathway name="path:hsa04012" title="ErbB signaling pathway">
//!   <entry id="1" name="hsa:1956" type="gene">
//!     <graphics name="EGFR, ERBB..." x="150" y="300"/>
//!   </entry>
//!   <entry id="4" name="undefined" type="group">
//!     <component id="2"/>
//!   </entry>
//!   <relation entry1="1" entry2="2" type="PPrel">
//!     <subtype name="activation" value="-->"/>
//!   </relation>
//! </pathway>
//! ```
//!
//! `<reaction>` elements and graphics styling are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reactnet_graph::{EntryKind, RelationClass, SourceEntry, SourcePathway, SourceRelation, SubtypeLabel};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum KgmlError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed KGML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("entry {entry}: invalid coordinate `{value}`")]
    InvalidCoordinate { entry: String, value: String },

    #[error("relation {source_id} -> {target_id}: unknown relation type `{kind}`")]
    UnknownRelationType {
        source_id: String,
        target_id: String,
        kind: String,
    },

    #[error("document has no <pathway> root element")]
    MissingPathway,
}

pub fn read_kgml(path: &Path) -> Result<SourcePathway, KgmlError> {
    let text = std::fs::read_to_string(path).map_err(|source| KgmlError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_kgml(&text)
}

pub fn parse_kgml(xml: &str) -> Result<SourcePathway, KgmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut pathway: Option<SourcePathway> = None;
    let mut entry: Option<SourceEntry> = None;
    let mut relation: Option<SourceRelation> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"pathway" => pathway = Some(pathway_header(&e)?),
                b"entry" => entry = Some(entry_header(&e)?),
                b"relation" => relation = Some(relation_header(&e)?),
                _ => element_body(&e, entry.as_mut(), relation.as_mut())?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"pathway" => pathway = Some(pathway_header(&e)?),
                b"entry" => push_entry(pathway.as_mut(), entry_header(&e)?)?,
                b"relation" => push_relation(pathway.as_mut(), relation_header(&e)?)?,
                _ => element_body(&e, entry.as_mut(), relation.as_mut())?,
            },
            Event::End(e) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(done) = entry.take() {
                        push_entry(pathway.as_mut(), done)?;
                    }
                }
                b"relation" => {
                    if let Some(done) = relation.take() {
                        push_relation(pathway.as_mut(), done)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let pathway = pathway.ok_or(KgmlError::MissingPathway)?;
    tracing::debug!(
        pathway = %pathway.name,
        entries = pathway.entries.len(),
        relations = pathway.relations.len(),
        "parsed KGML"
    );
    Ok(pathway)
}

fn push_entry(pathway: Option<&mut SourcePathway>, entry: SourceEntry) -> Result<(), KgmlError> {
    pathway
        .ok_or(KgmlError::MissingPathway)?
        .entries
        .push(entry);
    Ok(())
}

fn push_relation(
    pathway: Option<&mut SourcePathway>,
    relation: SourceRelation,
) -> Result<(), KgmlError> {
    pathway
        .ok_or(KgmlError::MissingPathway)?
        .relations
        .push(relation);
    Ok(())
}

/// `<graphics>`, `<component>` and `<subtype>` inside the open entry/relation.
fn element_body(
    e: &BytesStart<'_>,
    entry: Option<&mut SourceEntry>,
    relation: Option<&mut SourceRelation>,
) -> Result<(), KgmlError> {
    match (e.name().as_ref(), entry, relation) {
        (b"graphics", Some(entry), _) => {
            // Only the first graphics element positions the entry.
            if entry.label.is_empty() {
                if let Some(name) = attr(e, "name")? {
                    entry.label = name;
                }
                if let Some(x) = attr(e, "x")? {
                    entry.x = coordinate(&entry.id, &x)?;
                }
                if let Some(y) = attr(e, "y")? {
                    entry.y = coordinate(&entry.id, &y)?;
                }
            }
        }
        (b"component", Some(entry), _) => {
            entry.members.push(required(e, "component", "id")?);
        }
        (b"subtype", _, Some(relation)) => {
            relation.subtypes.push(SubtypeLabel::new(
                required(e, "subtype", "name")?,
                attr(e, "value")?.unwrap_or_default(),
            ));
        }
        _ => {}
    }
    Ok(())
}

fn pathway_header(e: &BytesStart<'_>) -> Result<SourcePathway, KgmlError> {
    Ok(SourcePathway {
        name: attr(e, "name")?.unwrap_or_default(),
        title: attr(e, "title")?.unwrap_or_default(),
        ..SourcePathway::default()
    })
}

fn entry_header(e: &BytesStart<'_>) -> Result<SourceEntry, KgmlError> {
    let kind = EntryKind::from_kgml(&required(e, "entry", "type")?);
    let name = attr(e, "name")?.unwrap_or_default();
    let identifiers = match kind {
        // Group entries carry `name="undefined"`.
        EntryKind::Group => Vec::new(),
        _ => name.split_whitespace().map(str::to_string).collect(),
    };
    Ok(SourceEntry {
        id: required(e, "entry", "id")?,
        kind,
        identifiers,
        label: String::new(),
        members: Vec::new(),
        x: 0,
        y: 0,
    })
}

fn relation_header(e: &BytesStart<'_>) -> Result<SourceRelation, KgmlError> {
    let source = required(e, "relation", "entry1")?;
    let target = required(e, "relation", "entry2")?;
    let kind = required(e, "relation", "type")?;
    let class = RelationClass::from_kgml(&kind).ok_or_else(|| KgmlError::UnknownRelationType {
        source_id: source.clone(),
        target_id: target.clone(),
        kind,
    })?;
    Ok(SourceRelation {
        source,
        target,
        class,
        subtypes: Vec::new(),
    })
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, KgmlError> {
    for attribute in e.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_ref() == name.as_bytes() {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required(
    e: &BytesStart<'_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, KgmlError> {
    attr(e, attribute)?.ok_or(KgmlError::MissingAttribute { element, attribute })
}

fn coordinate(entry: &str, value: &str) -> Result<i64, KgmlError> {
    value
        .trim()
        .parse()
        .map_err(|_| KgmlError::InvalidCoordinate {
            entry: entry.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERBB: &str = r##"<?xml version="1.0"?>
<!DOCTYPE pathway SYSTEM "https://www.kegg.jp/kegg/xml/KGML_v0.7.2_.dtd">
<pathway name="path:hsa04012" org="hsa" number="04012" title="ErbB signaling pathway">
    <entry id="1" name="hsa:1956" type="gene" link="https://www.kegg.jp/dbget-bin/www_bget?hsa:1956">
        <graphics name="EGFR, ERBB, ERBB1..." fgcolor="#000000" bgcolor="#BFFFBF"
             type="rectangle" x="150" y="300" width="46" height="17"/>
    </entry>
    <entry id="2" name="hsa:2885" type="gene">
        <graphics name="GRB2, ASH..." x="300" y="300"/>
    </entry>
    <entry id="3" name="hsa:6654 hsa:6655" type="gene">
        <graphics name="SOS1, GF1..." x="300" y="320"/>
    </entry>
    <entry id="4" name="undefined" type="group">
        <graphics fgcolor="#000000" bgcolor="#FFFFFF" type="rectangle" x="300" y="310"/>
        <component id="2"/>
        <component id="3"/>
    </entry>
    <entry id="5" name="path:hsa04010" type="map">
        <graphics name="MAPK signaling pathway" x="600" y="300"/>
    </entry>
    <relation entry1="1" entry2="2" type="PPrel">
        <subtype name="activation" value="--&gt;"/>
        <subtype name="phosphorylation" value="+p"/>
    </relation>
    <relation entry1="4" entry2="5" type="maplink"/>
    <reaction id="9" name="rn:R00001" type="irreversible">
        <substrate id="10" name="cpd:C00002"/>
    </reaction>
</pathway>
"##;

    #[test]
    fn parses_entries_and_relations() {
        let pathway = parse_kgml(ERBB).unwrap();
        assert_eq!(pathway.name, "path:hsa04012");
        assert_eq!(pathway.title, "ErbB signaling pathway");
        assert_eq!(pathway.entries.len(), 5);

        let sos = pathway.entry("3").unwrap();
        assert_eq!(sos.identifiers, vec!["hsa:6654", "hsa:6655"]);
        assert_eq!(sos.label, "SOS1, GF1...");
        assert_eq!((sos.x, sos.y), (300, 320));

        let group = pathway.entry("4").unwrap();
        assert_eq!(group.kind, EntryKind::Group);
        assert!(group.identifiers.is_empty());
        assert_eq!(group.members, vec!["2", "3"]);

        assert_eq!(pathway.entry("5").unwrap().kind, EntryKind::Map);
    }

    #[test]
    fn keeps_subtypes_in_document_order() {
        let pathway = parse_kgml(ERBB).unwrap();
        assert_eq!(pathway.relations.len(), 2);
        let first = &pathway.relations[0];
        assert_eq!(first.class, RelationClass::ProteinProtein);
        assert_eq!(
            first.subtypes,
            vec![
                SubtypeLabel::new("activation", "-->"),
                SubtypeLabel::new("phosphorylation", "+p"),
            ]
        );
        let second = &pathway.relations[1];
        assert_eq!(second.class, RelationClass::MapLink);
        assert!(second.subtypes.is_empty());
    }

    #[test]
    fn rejects_unknown_relation_type() {
        let xml = r#"<pathway name="p"><relation entry1="1" entry2="2" type="XYrel"/></pathway>"#;
        let err = parse_kgml(xml).unwrap_err();
        assert!(matches!(err, KgmlError::UnknownRelationType { kind, .. } if kind == "XYrel"));
    }

    #[test]
    fn rejects_bad_coordinates() {
        let xml = r#"<pathway name="p">
            <entry id="1" name="hsa:1" type="gene"><graphics name="A" x="left" y="0"/></entry>
        </pathway>"#;
        assert!(matches!(
            parse_kgml(xml).unwrap_err(),
            KgmlError::InvalidCoordinate { .. }
        ));
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(matches!(
            parse_kgml("<?xml version=\"1.0\"?>").unwrap_err(),
            KgmlError::MissingPathway
        ));
    }
}
