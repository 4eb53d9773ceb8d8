use serde::{Deserialize, Serialize};

/// Column list and primary key of the destination table.
///
/// Returned by `GET /table-schema`, or synthesized from a source header when
/// the caller wants to upload into a table shaped like the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub attributes: Vec<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl TableSchema {
    /// Builds a schema whose attributes are the given header, with no key.
    pub fn from_header(table: impl Into<String>, header: &[String]) -> Self {
        Self {
            table: table.into(),
            attributes: header.to_vec(),
            primary_key: Vec::new(),
        }
    }

    pub fn is_primary_key(&self, attribute: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == attribute)
    }

    /// Primary key rendered for display, `"None"` when the table has no key.
    pub fn primary_key_label(&self) -> String {
        if self.primary_key.is_empty() {
            "None".to_string()
        } else {
            self.primary_key.join(", ")
        }
    }
}
