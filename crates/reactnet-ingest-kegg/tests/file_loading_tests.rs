use reactnet_graph::{EntityCatalog, EntryKind, FamilyOntology, GroundedTerm};
use reactnet_ingest_kegg::{read_kgml, BundleCatalog, FamilyTable, KgmlError};
use std::fs;
use tempfile::tempdir;

const KGML: &str = r#"<?xml version="1.0"?>
<pathway name="path:hsa04010" title="MAPK signaling pathway">
    <entry id="7" name="hsa:5594 hsa:5595" type="gene">
        <graphics name="MAPK1, ERK..." x="750" y="200"/>
    </entry>
    <entry id="8" name="cpd:C00002" type="compound">
        <graphics name="C00002" x="600" y="220"/>
    </entry>
    <relation entry1="8" entry2="7" type="PCrel">
        <subtype name="compound" value="8"/>
    </relation>
</pathway>
"#;

const BUNDLE: &str = "\
ENTRY       5594              CDS       T01001
SYMBOL      MAPK1, ERK
NAME        (RefSeq) mitogen-activated protein kinase 1
///
ENTRY       5595              CDS       T01001
SYMBOL      MAPK3, ERK1
NAME        (RefSeq) mitogen-activated protein kinase 3
///
";

#[test]
fn reads_inputs_from_disk() {
    let dir = tempdir().unwrap();
    let kgml = dir.path().join("hsa04010.xml");
    let bundle = dir.path().join("genes.txt");
    let relations = dir.path().join("relations.csv");
    fs::write(&kgml, KGML).unwrap();
    fs::write(&bundle, BUNDLE).unwrap();
    fs::write(&relations, "HGNC,MAPK1,isa,FPLX,ERK\nHGNC,MAPK3,isa,FPLX,ERK\n").unwrap();

    let pathway = read_kgml(&kgml).unwrap();
    assert_eq!(pathway.entries.len(), 2);
    assert_eq!(pathway.entries[1].kind, EntryKind::Compound);
    assert_eq!(pathway.relations[0].subtypes[0].value, "8");

    let mut catalog = BundleCatalog::new();
    assert_eq!(catalog.add_file(&bundle).unwrap(), 2);
    let records = catalog
        .resolve(&["hsa:5595".to_string()])
        .unwrap();
    assert_eq!(records[0].primary_symbol(), Some("MAPK3"));

    let table = FamilyTable::load(&relations).unwrap();
    assert_eq!(
        table.parent_of(&GroundedTerm::new("HGNC", "MAPK3")),
        Some(GroundedTerm::new("FPLX", "ERK"))
    );
}

#[test]
fn missing_kgml_reports_io_error() {
    let dir = tempdir().unwrap();
    let err = read_kgml(&dir.path().join("absent.xml")).unwrap_err();
    assert!(matches!(err, KgmlError::Io { .. }));
}
