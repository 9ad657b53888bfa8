//! KEGG DBGET flat-file records (the body of `https://rest.kegg.jp/get/...`).
//!
//! Only the fields entity naming needs are read: `ENTRY`, `NAME` (first line,
//! trailing `;` dropped), `SYMBOL` (`, `-separated) and `DBLINKS` with its
//! indented continuation lines. `///` closes a record.

use reactnet_graph::{EntityRecord, GroundedTerm};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum FlatFileError {
    #[error("line {line}: `{field}` outside of an ENTRY record")]
    FieldOutsideRecord { line: usize, field: String },

    #[error("line {line}: malformed ENTRY line `{text}`")]
    MalformedEntry { line: usize, text: String },

    #[error("record `{0}` is not terminated by `///`")]
    Unterminated(String),
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ENTRY\s+(\S+)").expect("static regex"))
}

fn db_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:DBLINKS)?\s+([^:]+?):\s+(\S+)").expect("static regex"))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    DbLinks,
}

pub fn parse_records(text: &str) -> Result<Vec<EntityRecord>, FlatFileError> {
    let mut records = Vec::new();
    let mut current: Option<EntityRecord> = None;
    let mut section = Section::Other;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("///") {
            if let Some(record) = current.take() {
                records.push(ground(record));
            }
            section = Section::Other;
            continue;
        }

        if line.starts_with("ENTRY") {
            if let Some(open) = current.take() {
                return Err(FlatFileError::Unterminated(open.id));
            }
            let id = entry_re()
                .captures(line)
                .and_then(|c| c.get(1))
                .ok_or_else(|| FlatFileError::MalformedEntry {
                    line: line_no,
                    text: line.to_string(),
                })?;
            current = Some(EntityRecord::new(id.as_str(), id.as_str()));
            section = Section::Other;
            continue;
        }

        let continuation = line.starts_with(char::is_whitespace);
        let Some(record) = current.as_mut() else {
            return Err(FlatFileError::FieldOutsideRecord {
                line: line_no,
                field: line.split_whitespace().next().unwrap_or_default().to_string(),
            });
        };

        if continuation {
            if section == Section::DbLinks {
                push_db_link(record, line);
            }
            continue;
        }

        section = Section::Other;
        if let Some(rest) = field_value(line, "NAME") {
            record.name = rest.trim_end_matches(';').to_string();
        } else if let Some(rest) = field_value(line, "SYMBOL") {
            record.symbols = Some(rest.split(", ").map(|s| s.trim().to_string()).collect());
        } else if line.starts_with("DBLINKS") {
            push_db_link(record, line);
            section = Section::DbLinks;
        }
    }

    if let Some(open) = current {
        return Err(FlatFileError::Unterminated(open.id));
    }
    Ok(records)
}

/// Value of a `FIELD      value` line, if `line` carries `field`.
fn field_value<'l>(line: &'l str, field: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(field)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

fn push_db_link(record: &mut EntityRecord, line: &str) {
    if let Some(caps) = db_link_re().captures(line) {
        record
            .db_links
            .insert(caps[1].trim().to_string(), caps[2].to_string());
    }
}

/// Genes ground to their first HGNC symbol, compounds to their ChEBI link.
fn ground(mut record: EntityRecord) -> EntityRecord {
    record.grounding = match record.primary_symbol() {
        Some(symbol) => Some(GroundedTerm::new("HGNC", symbol)),
        None => record
            .db_links
            .get("ChEBI")
            .map(|id| GroundedTerm::new("ChEBI", id.as_str())),
    };
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENES: &str = "\
ENTRY       1956              CDS       T01001
SYMBOL      EGFR, ERBB, ERBB1, HER1
NAME        (RefSeq) epidermal growth factor receptor
ORTHOLOGY   K04361  epidermal growth factor receptor [EC:2.7.10.1]
DBLINKS     NCBI-GeneID: 1956
            NCBI-ProteinID: NP_005219
            HGNC: 3236
            Ensembl: ENSG00000146648
STRUCTURE   PDB: 1IVO 1M14
///
ENTRY       5594              CDS       T01001
SYMBOL      MAPK1, ERK, ERK-2
NAME        (RefSeq) mitogen-activated protein kinase 1
///
";

    const COMPOUND: &str = "\
ENTRY       C00002                      Compound
NAME        ATP;
            Adenosine 5'-triphosphate
FORMULA     C10H16N5O13P3
DBLINKS     CAS: 56-65-5
            PubChem: 3304
            ChEBI: 15422
///
";

    #[test]
    fn parses_gene_records() {
        let records = parse_records(GENES).unwrap();
        assert_eq!(records.len(), 2);

        let egfr = &records[0];
        assert_eq!(egfr.id, "1956");
        assert_eq!(egfr.name, "(RefSeq) epidermal growth factor receptor");
        assert_eq!(egfr.primary_symbol(), Some("EGFR"));
        assert_eq!(egfr.symbols.as_ref().unwrap().len(), 4);
        assert_eq!(egfr.db_links.get("HGNC").map(String::as_str), Some("3236"));
        assert_eq!(egfr.db_links.len(), 4);
        assert_eq!(egfr.grounding, Some(GroundedTerm::new("HGNC", "EGFR")));

        assert!(records[1].db_links.is_empty());
    }

    #[test]
    fn parses_compound_records() {
        let records = parse_records(COMPOUND).unwrap();
        let atp = &records[0];
        assert_eq!(atp.id, "C00002");
        assert_eq!(atp.name, "ATP");
        assert!(atp.symbols.is_none());
        assert_eq!(atp.grounding, Some(GroundedTerm::new("ChEBI", "15422")));
    }

    #[test]
    fn unterminated_record_is_an_error() {
        let err = parse_records("ENTRY       1956   CDS\nNAME        x\n").unwrap_err();
        assert!(matches!(err, FlatFileError::Unterminated(id) if id == "1956"));
    }

    #[test]
    fn field_before_entry_is_an_error() {
        let err = parse_records("NAME        x\n///\n").unwrap_err();
        assert!(matches!(err, FlatFileError::FieldOutsideRecord { line: 1, .. }));
    }
}
