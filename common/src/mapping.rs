//! Target attribute to source field associations.
//!
//! Each target attribute maps to nothing (the column is left out of the
//! upload), to `AUTO` (the server generates it) or to a source field name.
//! Field names are not validated against the current header: a stale name
//! simply resolves to no value when the payload is built.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::model::schema::TableSchema;

/// Wire value of the auto-generate option.
pub const AUTO: &str = "__AUTO__";

/// What one target attribute is mapped to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MappingTarget {
    #[default]
    Empty,
    Auto,
    Field(String),
}

impl MappingTarget {
    /// Decodes the value of a mapping selector: `""`, `AUTO`, or a field.
    pub fn from_value(value: &str) -> Self {
        match value {
            "" => MappingTarget::Empty,
            AUTO => MappingTarget::Auto,
            field => MappingTarget::Field(field.to_string()),
        }
    }

    /// Inverse of `from_value`.
    pub fn as_value(&self) -> &str {
        match self {
            MappingTarget::Empty => "",
            MappingTarget::Auto => AUTO,
            MappingTarget::Field(field) => field,
        }
    }

    /// Source field, for attributes that take part in the upload.
    pub fn field(&self) -> Option<&str> {
        match self {
            MappingTarget::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MappingTarget::Empty)
    }
}

/// Lower-cases and drops whitespace and underscores.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Mapping of one source against the current target schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnMapping {
    entries: HashMap<String, MappingTarget>,
}

impl ColumnMapping {
    pub fn set(&mut self, attribute: &str, target: MappingTarget) {
        self.entries.insert(attribute.to_string(), target);
    }

    /// Current target; attributes never set read as `Empty`.
    pub fn get(&self, attribute: &str) -> &MappingTarget {
        const EMPTY: &MappingTarget = &MappingTarget::Empty;
        self.entries.get(attribute).unwrap_or(EMPTY)
    }

    /// Whether the attribute has an entry at all, even an empty one.
    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fills in attributes that have no entry yet: the identically named
    /// source field when the header has one, else `Empty`.
    pub fn seed_defaults(&mut self, attributes: &[String], header: &[String]) {
        for attribute in attributes {
            if self.entries.contains_key(attribute) {
                continue;
            }
            let target = if header.contains(attribute) {
                MappingTarget::Field(attribute.clone())
            } else {
                MappingTarget::Empty
            };
            self.entries.insert(attribute.clone(), target);
        }
    }

    /// Maps every still-empty attribute to the first source field with the
    /// same normalized name. Existing mappings, including `AUTO`, are kept.
    /// Returns the number of new matches.
    pub fn auto_map(&mut self, attributes: &[String], header: &[String]) -> usize {
        let normalized: Vec<(String, &String)> =
            header.iter().map(|h| (normalize_name(h), h)).collect();
        let mut matched = 0;
        for attribute in attributes {
            if !self.get(attribute).is_empty() {
                continue;
            }
            let wanted = normalize_name(attribute);
            if let Some((_, field)) = normalized.iter().find(|(n, _)| *n == wanted) {
                self.entries
                    .insert(attribute.clone(), MappingTarget::Field((*field).clone()));
                matched += 1;
            }
        }
        debug!("auto-map matched {} of {} attributes", matched, attributes.len());
        matched
    }

    /// Percentage of attributes mapped to a source field, rounded.
    pub fn match_rate(&self, attributes: &[String]) -> u32 {
        if attributes.is_empty() {
            return 0;
        }
        let mapped = self.included_attributes(attributes).len();
        ((mapped as f64 * 100.0) / attributes.len() as f64).round() as u32
    }

    /// Attributes, in schema order, mapped to a source field.
    pub fn included_attributes(&self, attributes: &[String]) -> Vec<String> {
        attributes
            .iter()
            .filter(|a| self.get(a).field().is_some())
            .cloned()
            .collect()
    }

    /// Primary-key attributes mapped to a source field. Empty when every key
    /// column is left to the server.
    pub fn mapped_primary_key(&self, schema: &TableSchema) -> Vec<String> {
        self.included_attributes(&schema.primary_key)
    }

    /// Target attribute to source field, for included attributes only.
    pub fn field_pairs(&self, attributes: &[String]) -> BTreeMap<String, String> {
        attributes
            .iter()
            .filter_map(|a| Some((a.clone(), self.get(a).field()?.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("First_Name"), "firstname");
        assert_eq!(normalize_name(" first name "), "firstname");
        assert_eq!(normalize_name("FIRST-NAME"), "first-name");
    }

    #[test]
    fn selector_values_round_trip() {
        for value in ["", AUTO, "email"] {
            assert_eq!(MappingTarget::from_value(value).as_value(), value);
        }
    }

    #[test]
    fn seeding_uses_exact_names_only() {
        let mut mapping = ColumnMapping::default();
        mapping.seed_defaults(&names(&["id", "FullName"]), &names(&["id", "full_name"]));
        assert_eq!(mapping.get("id"), &MappingTarget::Field("id".to_string()));
        assert_eq!(mapping.get("FullName"), &MappingTarget::Empty);
        assert!(mapping.contains("FullName"));
    }

    #[test]
    fn seeding_keeps_existing_entries() {
        let mut mapping = ColumnMapping::default();
        mapping.set("id", MappingTarget::Auto);
        mapping.seed_defaults(&names(&["id"]), &names(&["id"]));
        assert_eq!(mapping.get("id"), &MappingTarget::Auto);
    }

    #[test]
    fn auto_map_fills_only_empty_attributes() {
        let attributes = names(&["user_id", "FullName", "email", "id"]);
        let header = names(&["UserId", "full name", "Email", "e_mail", "ID"]);
        let mut mapping = ColumnMapping::default();
        mapping.set("email", MappingTarget::Field("e_mail".to_string()));
        mapping.set("id", MappingTarget::Auto);

        assert_eq!(mapping.auto_map(&attributes, &header), 2);
        assert_eq!(mapping.get("user_id").field(), Some("UserId"));
        assert_eq!(mapping.get("FullName").field(), Some("full name"));
        assert_eq!(mapping.get("email").field(), Some("e_mail"));
        assert_eq!(mapping.get("id"), &MappingTarget::Auto);
        assert_eq!(mapping.auto_map(&attributes, &header), 0);
    }

    #[test]
    fn match_rate_ignores_auto_and_empty() {
        let attributes = names(&["a", "b", "c"]);
        let mut mapping = ColumnMapping::default();
        assert_eq!(mapping.match_rate(&[]), 0);
        mapping.set("a", MappingTarget::Field("x".to_string()));
        mapping.set("b", MappingTarget::Auto);
        assert_eq!(mapping.match_rate(&attributes), 33);
        mapping.set("c", MappingTarget::Field("y".to_string()));
        assert_eq!(mapping.match_rate(&attributes), 67);
    }

    #[test]
    fn primary_key_excludes_auto() {
        let schema = TableSchema {
            table: "users".to_string(),
            attributes: names(&["id", "tenant", "name"]),
            primary_key: names(&["id", "tenant"]),
        };
        let mut mapping = ColumnMapping::default();
        mapping.set("id", MappingTarget::Auto);
        mapping.set("tenant", MappingTarget::Field("Tenant".to_string()));
        assert_eq!(mapping.mapped_primary_key(&schema), names(&["tenant"]));
        assert_eq!(
            mapping.field_pairs(&schema.attributes).into_iter().collect::<Vec<_>>(),
            vec![("tenant".to_string(), "Tenant".to_string())]
        );
    }
}
