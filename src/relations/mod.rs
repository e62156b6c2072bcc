//! Heuristic cross-collection reference detection.
//!
//! References are inferred from field-naming conventions alone: an
//! identifier-typed field whose name ends in `Id`/`_id` (or an array of
//! identifiers ending in `Ids`/`_ids`) pointing at a known collection whose
//! name is the pluralized base noun. Best effort by design: no foreign-key
//! integrity is checked, so false positives and negatives both occur.
use crate::schema::{SchemaSet, TypeTag, ID_FIELD};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod inflect;

/// Cardinality of an inferred reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationType {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:1")]
    ManyToOne,
    #[serde(rename = "N:M")]
    ManyToMany,
}

/// A directed, heuristically inferred edge between two collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source_collection: String,
    pub target_collection: String,
    pub source_field: String,
    pub target_field: String,
    pub relation_type: RelationType,
}

/// Reference suffixes, longest first so `_ids` wins over `Id`.
const REF_SUFFIXES: [(&str, bool); 4] =
    [("_ids", true), ("Ids", true), ("_id", false), ("Id", false)];

/// Map a field name to the collection it would reference, with a flag for
/// plural (array-shaped) suffixes. `userId` → `users`, `tag_ids` → `tags`.
fn reference_target(field: &str) -> Option<(String, bool)> {
    for (suffix, plural) in REF_SUFFIXES {
        if let Some(base) = field.strip_suffix(suffix) {
            if base.is_empty() {
                return None;
            }
            return Some((inflect::pluralize(base), plural));
        }
    }
    None
}

/// Detect relationships across all merged schemas.
///
/// Scans source fields only (never the target side), in schema-set order then
/// field order, so the result is deterministic for fixed input. The known
/// collection set is exactly the schema set's names.
#[must_use]
pub fn detect(schemas: &SchemaSet) -> Vec<Relationship> {
    let known: HashSet<&str> = schemas.names().collect();
    let mut relationships = Vec::new();

    for (collection, schema) in schemas.iter() {
        for field in &schema.fields {
            // The primary identifier is never a reference source.
            if field.path == ID_FIELD {
                continue;
            }
            let Some((target, plural_suffix)) = reference_target(&field.path) else {
                continue;
            };
            if !known.contains(target.as_str()) {
                continue;
            }
            let relation_type = match field.type_tag {
                // The collection holding the field is the many side.
                TypeTag::ObjectId => RelationType::ManyToOne,
                TypeTag::Array
                    if plural_suffix && field.item_type == Some(TypeTag::ObjectId) =>
                {
                    RelationType::ManyToMany
                }
                _ => continue,
            };
            relationships.push(Relationship {
                source_collection: collection.to_string(),
                target_collection: target,
                source_field: field.path.clone(),
                target_field: ID_FIELD.to_string(),
                relation_type,
            });
        }
    }
    relationships
}
