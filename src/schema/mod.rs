//! Schema inference over sampled documents.
//!
//! This module defines the structural type tags (`TypeTag`), the per-document
//! analyzer that flattens a document into dotted-path field descriptors, the
//! last-write-wins merger that folds a sample into one `Schema` per
//! collection, and `SchemaSet`, the ordered collection-name → schema mapping
//! produced by an extraction run.
//!
//! You typically obtain schemas via `SchemaSet::extract_from_source` and then
//! pass them to `crate::relations::detect` and `crate::erd`.
use crate::errors::ErdError;
use crate::source::DocumentSource;
use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Conventional name of the primary identifier field.
pub const ID_FIELD: &str = "_id";

/// Per-collection sample bound used for diagram/relationship inference.
pub const ERD_SAMPLE_LIMIT: usize = 10;
/// Per-collection sample bound used for standalone schema extraction.
pub const SCHEMA_SAMPLE_LIMIT: usize = 100;

/// Maximum nesting depth the analyzer descends into. Documents are not
/// depth-bounded at the source, so recursion is.
pub const MAX_DEPTH: usize = 32;

/// Structural type tag of one field position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
    Null,
    Array,
    Object,
}

impl TypeTag {
    /// Classify a single value. Total: every `serde_json::Value` maps to a tag.
    ///
    /// Checks are ordered from most to least specific: null, then the store
    /// identifier wrapper, then the date wrapper, then array, then plain
    /// object, then the value's primitive kind. Identifier and date values
    /// arrive as Extended-JSON wrappers (`{"$oid": ...}`, `{"$date": ...}`).
    #[must_use]
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Object(map) => extended_tag(map).unwrap_or(Self::Object),
            Value::Array(_) => Self::Array,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
        }
    }
}

fn extended_tag(map: &Map<String, Value>) -> Option<TypeTag> {
    if map.len() != 1 {
        return None;
    }
    if map.get("$oid").is_some_and(Value::is_string) {
        return Some(TypeTag::ObjectId);
    }
    if map.contains_key("$date") {
        return Some(TypeTag::Date);
    }
    None
}

/// One structural position within a collection's documents.
///
/// `path` is dotted; a `[]` segment suffix marks descent into the first
/// element of an array of objects (e.g. `items[].sku`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub path: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Tag of the array's first element; absent when the array was empty in
    /// every sampled document. Only set for `array` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<TypeTag>,
    /// True only for the primary identifier field. Not derived from presence
    /// statistics.
    pub required: bool,
}

impl Field {
    fn simple(path: String, type_tag: TypeTag) -> Self {
        Self { path, type_tag, item_type: None, required: false }
    }

    fn identifier(path: String) -> Self {
        Self { path, type_tag: TypeTag::ObjectId, item_type: None, required: true }
    }
}

/// Insertion-ordered path → field mapping.
///
/// Re-inserting an existing path replaces the descriptor but keeps the
/// position of its first observation, which gives the merger its
/// last-write-wins semantics without disturbing field order.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    order: Vec<String>,
    entries: HashMap<String, Field>,
}

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field) {
        if !self.entries.contains_key(&field.path) {
            self.order.push(field.path.clone());
        }
        self.entries.insert(field.path.clone(), field);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Field> {
        self.entries.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume the map, yielding fields in first-observation order.
    #[must_use]
    pub fn into_fields(mut self) -> Vec<Field> {
        self.order
            .iter()
            .filter_map(|path| self.entries.remove(path))
            .collect()
    }
}

/// Analyze one document into `fields`, prefixing every path with `prefix`
/// (pass `""` at the top level). Non-object documents contribute nothing.
///
/// This is a single-document pass; combining passes across a sample is the
/// merger's job.
pub fn analyze_document(doc: &Value, prefix: &str, fields: &mut FieldMap) {
    walk(doc, prefix, fields, 0);
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn walk(value: &Value, prefix: &str, fields: &mut FieldMap, depth: usize) {
    let Value::Object(map) = value else { return };
    for (key, value) in map {
        let path = join(prefix, key);

        // The identifier field keeps its tag regardless of observed shape.
        if key == ID_FIELD {
            fields.insert(Field::identifier(path));
            continue;
        }

        match TypeTag::classify(value) {
            TypeTag::Array => {
                let mut item_type = None;
                if let Some(first) = value.as_array().and_then(|items| items.first()) {
                    let tag = TypeTag::classify(first);
                    if tag == TypeTag::Object && depth < MAX_DEPTH {
                        walk(first, &format!("{path}[]"), fields, depth + 1);
                    }
                    item_type = Some(tag);
                }
                fields.insert(Field { path, type_tag: TypeTag::Array, item_type, required: false });
            }
            TypeTag::Object => {
                fields.insert(Field::simple(path.clone(), TypeTag::Object));
                if depth < MAX_DEPTH {
                    walk(value, &path, fields, depth + 1);
                }
            }
            tag => fields.insert(Field::simple(path, tag)),
        }
    }
}

/// Merged schema of one collection: field descriptors in first-observation
/// order across the sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Fold per-document field maps in sampled order. For a path observed in
    /// several documents, the descriptor from the last document wins.
    #[must_use]
    pub fn merge(maps: impl IntoIterator<Item = FieldMap>) -> Self {
        let mut merged = FieldMap::new();
        for map in maps {
            for field in map.into_fields() {
                merged.insert(field);
            }
        }
        Self { fields: merged.into_fields() }
    }

    /// Analyze and merge a document sample. Zero documents yield an empty
    /// schema.
    #[must_use]
    pub fn from_documents(docs: &[Value]) -> Self {
        Self::merge(docs.iter().map(|doc| {
            let mut fields = FieldMap::new();
            analyze_document(doc, "", &mut fields);
            fields
        }))
    }

    #[must_use]
    pub fn field(&self, path: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.path == path)
    }
}

/// Ordered collection-name → schema mapping for one extraction run.
///
/// Serializes as a JSON map preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    entries: Vec<(String, Schema)>,
}

impl SchemaSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = schema;
        } else {
            self.entries.push((name, schema));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sample and analyze collections from `source`.
    ///
    /// `collections` limits the run to the given names (in the given order);
    /// `None` or an empty slice means every collection the source knows.
    /// Collections are fetched and analyzed independently in parallel; a
    /// failed sample degrades that collection to an empty schema and records
    /// a warning instead of aborting its siblings.
    ///
    /// # Errors
    /// Returns `ErdError::Source` if the source cannot list its collections.
    pub fn extract_from_source(
        source: &dyn DocumentSource,
        collections: Option<&[String]>,
        limit: usize,
    ) -> Result<Extraction, ErdError> {
        let names: Vec<String> = match collections {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => source.collection_names()?,
        };

        // Fan out per collection; each sample is analyzed into its own
        // isolated field map, so no shared state is touched.
        let analyzed: Vec<(String, Schema, Option<String>)> = names
            .into_par_iter()
            .map(|name| match source.sample(&name, limit) {
                Ok(docs) => (name, Schema::from_documents(&docs), None),
                Err(e) => {
                    let warning = format!("sampling collection '{name}' failed: {e}");
                    (name, Schema::default(), Some(warning))
                }
            })
            .collect();

        let mut schemas = Self::new();
        let mut warnings = Vec::new();
        for (name, schema, warning) in analyzed {
            schemas.insert(name, schema);
            warnings.extend(warning);
        }
        Ok(Extraction { schemas, warnings })
    }
}

impl Serialize for SchemaSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, schema) in &self.entries {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

/// Result of an extraction run: the schemas plus per-collection warnings for
/// samples that failed.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub schemas: SchemaSet,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_orders_specialized_before_generic() {
        assert_eq!(TypeTag::classify(&Value::Null), TypeTag::Null);
        assert_eq!(
            TypeTag::classify(&json!({"$oid": "507f1f77bcf86cd799439011"})),
            TypeTag::ObjectId
        );
        assert_eq!(
            TypeTag::classify(&json!({"$date": "2024-01-01T00:00:00Z"})),
            TypeTag::Date
        );
        assert_eq!(TypeTag::classify(&json!([1, 2])), TypeTag::Array);
        assert_eq!(TypeTag::classify(&json!({"a": 1})), TypeTag::Object);
        assert_eq!(TypeTag::classify(&json!(true)), TypeTag::Boolean);
        assert_eq!(TypeTag::classify(&json!(3.5)), TypeTag::Number);
        assert_eq!(TypeTag::classify(&json!("x")), TypeTag::String);
    }

    #[test]
    fn classify_rejects_wrapper_lookalikes() {
        // Extra keys or a non-string $oid payload make it a plain object.
        assert_eq!(
            TypeTag::classify(&json!({"$oid": "abc", "other": 1})),
            TypeTag::Object
        );
        assert_eq!(TypeTag::classify(&json!({"$oid": 42})), TypeTag::Object);
    }

    #[test]
    fn analyzer_flattens_nested_objects() {
        let doc = json!({
            "_id": {"$oid": "507f1f77bcf86cd799439011"},
            "name": "Ada",
            "address": {"city": "London", "zip": "N1"}
        });
        let mut fields = FieldMap::new();
        analyze_document(&doc, "", &mut fields);

        let id = fields.get("_id").unwrap();
        assert_eq!(id.type_tag, TypeTag::ObjectId);
        assert!(id.required);
        assert_eq!(fields.get("address").unwrap().type_tag, TypeTag::Object);
        assert_eq!(fields.get("address.city").unwrap().type_tag, TypeTag::String);
        assert_eq!(fields.get("address.zip").unwrap().type_tag, TypeTag::String);
        assert!(!fields.get("name").unwrap().required);
    }

    #[test]
    fn analyzer_descends_into_first_array_element_only() {
        let doc = json!({
            "items": [
                {"sku": "a-1", "qty": 2},
                {"sku": "b-2", "price": 9.5}
            ]
        });
        let mut fields = FieldMap::new();
        analyze_document(&doc, "", &mut fields);

        let items = fields.get("items").unwrap();
        assert_eq!(items.type_tag, TypeTag::Array);
        assert_eq!(items.item_type, Some(TypeTag::Object));
        assert_eq!(fields.get("items[].sku").unwrap().type_tag, TypeTag::String);
        assert_eq!(fields.get("items[].qty").unwrap().type_tag, TypeTag::Number);
        // Second element is never inspected.
        assert!(fields.get("items[].price").is_none());
    }

    #[test]
    fn analyzer_records_empty_array_without_item_type() {
        let doc = json!({"tags": []});
        let mut fields = FieldMap::new();
        analyze_document(&doc, "", &mut fields);
        let tags = fields.get("tags").unwrap();
        assert_eq!(tags.type_tag, TypeTag::Array);
        assert_eq!(tags.item_type, None);
    }

    #[test]
    fn analyzer_marks_scalar_array_items() {
        let doc = json!({"tags": ["a", "b"]});
        let mut fields = FieldMap::new();
        analyze_document(&doc, "", &mut fields);
        let tags = fields.get("tags").unwrap();
        assert_eq!(tags.item_type, Some(TypeTag::String));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn analyzer_forces_identifier_shape_for_id_field() {
        // Even a plain-string _id is reported as the identifier type.
        let doc = json!({"_id": "not-an-oid"});
        let mut fields = FieldMap::new();
        analyze_document(&doc, "", &mut fields);
        let id = fields.get("_id").unwrap();
        assert_eq!(id.type_tag, TypeTag::ObjectId);
        assert!(id.required);
    }

    #[test]
    fn analyzer_bounds_recursion_depth() {
        let mut doc = json!({"leaf": 1});
        for _ in 0..(MAX_DEPTH + 8) {
            doc = json!({"inner": doc});
        }
        let mut fields = FieldMap::new();
        analyze_document(&doc, "", &mut fields);
        // Terminates, and no path ever exceeds the bound.
        assert!(fields.len() <= MAX_DEPTH + 2);
    }

    #[test]
    fn merge_is_last_write_wins_with_stable_order() {
        let docs = vec![
            json!({"a": "text", "b": 1}),
            json!({"b": true, "c": "later"}),
            json!({"a": 42}),
        ];
        let schema = Schema::from_documents(&docs);

        let paths: Vec<&str> = schema.fields.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
        assert_eq!(schema.field("a").unwrap().type_tag, TypeTag::Number);
        assert_eq!(schema.field("b").unwrap().type_tag, TypeTag::Boolean);
        assert_eq!(schema.field("c").unwrap().type_tag, TypeTag::String);
    }

    #[test]
    fn merge_covers_every_sampled_key() {
        let docs = vec![json!({"a": 1}), json!({"b": 2}), json!({"c": {"d": 3}})];
        let schema = Schema::from_documents(&docs);
        for path in ["a", "b", "c", "c.d"] {
            assert!(schema.field(path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn empty_sample_yields_empty_schema() {
        assert_eq!(Schema::from_documents(&[]), Schema::default());
    }

    #[test]
    fn schema_set_serializes_in_insertion_order() {
        let mut set = SchemaSet::new();
        set.insert("zebra", Schema::default());
        set.insert("apple", Schema::default());
        let out = serde_json::to_string(&set).unwrap();
        let zebra = out.find("zebra").unwrap();
        let apple = out.find("apple").unwrap();
        assert!(zebra < apple);
    }
}
