use crate::catalog::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("entity catalog failed after {attempts} attempt(s): {source}")]
    Catalog {
        attempts: u32,
        #[source]
        source: CatalogError,
    },

    #[error("no catalog record for identifier `{0}`")]
    Unresolved(String),

    #[error("relation {source_id} -> {target_id} references unknown entry `{missing}`")]
    UnknownEntry {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("group `{group}` references member `{member}` that is not a built entry")]
    UnbuiltMember { group: String, member: String },
}
