//! ERD assembly and rendering.
//!
//! Converts `{schemas, relationships}` into a renderer-facing node/link graph
//! and serializes it either as structured JSON or as Mermaid `erDiagram`
//! text. Both renditions are byte-for-byte reproducible: entities follow
//! schema-set insertion order, fields follow schema order, and links follow
//! detection order.
use crate::errors::ErdError;
use crate::relations::{self, RelationType, Relationship};
use crate::schema::{SchemaSet, TypeTag};
use crate::source::DocumentSource;
use serde::Serialize;
use std::fmt::Write as _;

/// Output format of an inference run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErdFormat {
    Mermaid,
    Json,
}

/// One entity in the renderer-facing graph.
#[derive(Debug, Clone, Serialize)]
pub struct ErdNode {
    pub id: String,
    pub name: String,
    pub fields: Vec<ErdField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErdField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    pub required: bool,
}

/// One inferred reference in the renderer-facing graph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErdLink {
    pub source: String,
    pub target: String,
    pub source_field: String,
    pub target_field: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

/// Node/link graph decoupled from the engine's internal schema shape.
#[derive(Debug, Clone, Serialize)]
pub struct ErdData {
    pub nodes: Vec<ErdNode>,
    pub links: Vec<ErdLink>,
}

impl ErdData {
    /// Wrap schemas as nodes and relationships as links, preserving order.
    #[must_use]
    pub fn assemble(schemas: &SchemaSet, relationships: &[Relationship]) -> Self {
        let nodes = schemas
            .iter()
            .map(|(name, schema)| ErdNode {
                id: name.to_string(),
                name: name.to_string(),
                fields: schema
                    .fields
                    .iter()
                    .map(|f| ErdField {
                        name: f.path.clone(),
                        type_tag: f.type_tag,
                        required: f.required,
                    })
                    .collect(),
            })
            .collect();
        let links = relationships
            .iter()
            .map(|rel| ErdLink {
                source: rel.source_collection.clone(),
                target: rel.target_collection.clone(),
                source_field: rel.source_field.clone(),
                target_field: rel.target_field.clone(),
                relation_type: rel.relation_type,
            })
            .collect();
        Self { nodes, links }
    }
}

/// Diagram-text vocabulary for a type tag.
fn erd_type(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::String | TypeTag::ObjectId => "string",
        TypeTag::Number => "number",
        TypeTag::Boolean => "boolean",
        TypeTag::Date => "datetime",
        TypeTag::Array => "array",
        TypeTag::Object => "object",
        TypeTag::Null => "any",
    }
}

/// Mermaid cardinality symbol for a relation type.
fn relation_symbol(relation_type: RelationType) -> &'static str {
    match relation_type {
        RelationType::OneToOne => "||--||",
        RelationType::OneToMany => "||--o{",
        RelationType::ManyToOne => "}o--||",
        RelationType::ManyToMany => "}o--o{",
    }
}

/// Deterministic Mermaid `erDiagram` serializer.
#[derive(Debug, Default)]
pub struct MermaidGenerator;

impl MermaidGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Render the diagram text. The identifier field's type carries a `!`
    /// marker; all ordering follows the input's insertion order.
    #[must_use]
    pub fn generate(&self, schemas: &SchemaSet, relationships: &[Relationship]) -> String {
        let mut out = String::from("erDiagram\n");
        for (name, schema) in schemas.iter() {
            let _ = writeln!(out, "  {name} {{");
            for field in &schema.fields {
                let mark = if field.required { "!" } else { "" };
                let _ = writeln!(out, "    {}{mark} {}", erd_type(field.type_tag), field.path);
            }
            out.push_str("  }\n");
        }
        for rel in relationships {
            let _ = writeln!(
                out,
                "  {} {} {} : \"{}\"",
                rel.source_collection,
                relation_symbol(rel.relation_type),
                rel.target_collection,
                rel.source_field
            );
        }
        out
    }
}

/// Summary counts attached to every successful report.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Stats {
    pub collections: usize,
    pub relationships: usize,
}

/// Successful inference report. Serializes to the structured output envelope:
/// `{success, format, diagram|schemas, relationships?, stats}`.
#[derive(Debug, Serialize)]
pub struct ErdReport {
    pub success: bool,
    pub format: ErdFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<SchemaSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    pub stats: Stats,
    /// Per-collection sampling warnings; surfaced on stderr, not in the
    /// serialized envelope.
    #[serde(skip_serializing)]
    pub warnings: Vec<String>,
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub success: bool,
    pub error: String,
}

impl ErrorReport {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into() }
    }
}

/// Run the full inference pipeline: sample, analyze, merge, detect, render.
///
/// `collections` of `None` (or empty) analyzes every collection known to the
/// source; `limit` bounds the per-collection sample.
///
/// # Errors
/// Returns `ErdError::Source` when the source cannot list its collections.
/// Per-collection sampling failures degrade to empty schemas and are reported
/// through `ErdReport::warnings`.
pub fn generate(
    source: &dyn DocumentSource,
    collections: Option<&[String]>,
    format: ErdFormat,
    limit: usize,
) -> Result<ErdReport, ErdError> {
    let extraction = SchemaSet::extract_from_source(source, collections, limit)?;
    let relationships = relations::detect(&extraction.schemas);
    let stats = Stats {
        collections: extraction.schemas.len(),
        relationships: relationships.len(),
    };
    let report = match format {
        ErdFormat::Mermaid => ErdReport {
            success: true,
            format,
            diagram: Some(MermaidGenerator::new().generate(&extraction.schemas, &relationships)),
            schemas: None,
            relationships: None,
            stats,
            warnings: extraction.warnings,
        },
        ErdFormat::Json => ErdReport {
            success: true,
            format,
            diagram: None,
            schemas: Some(extraction.schemas),
            relationships: Some(relationships),
            stats,
            warnings: extraction.warnings,
        },
    };
    Ok(report)
}

/// Extract merged schemas only, without relationship detection. Same
/// envelope as [`generate`] minus `diagram` and `relationships`.
///
/// # Errors
/// Returns `ErdError::Source` when the source cannot list its collections.
pub fn extract_schemas(
    source: &dyn DocumentSource,
    collections: Option<&[String]>,
    limit: usize,
) -> Result<ErdReport, ErdError> {
    let extraction = SchemaSet::extract_from_source(source, collections, limit)?;
    let stats = Stats { collections: extraction.schemas.len(), relationships: 0 };
    Ok(ErdReport {
        success: true,
        format: ErdFormat::Json,
        diagram: None,
        schemas: Some(extraction.schemas),
        relationships: None,
        stats,
        warnings: extraction.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, ID_FIELD};
    use serde_json::json;

    fn oid() -> serde_json::Value {
        json!({"$oid": "507f1f77bcf86cd799439011"})
    }

    fn users_orders() -> SchemaSet {
        let mut set = SchemaSet::new();
        set.insert(
            "users",
            Schema::from_documents(&[json!({"_id": oid(), "email": "a@b.c"})]),
        );
        set.insert(
            "orders",
            Schema::from_documents(&[json!({"_id": oid(), "userId": oid(), "status": "open"})]),
        );
        set
    }

    #[test]
    fn mermaid_matches_expected_grammar() {
        let schemas = users_orders();
        let rels = relations::detect(&schemas);
        let diagram = MermaidGenerator::new().generate(&schemas, &rels);
        let expected = concat!(
            "erDiagram\n",
            "  users {\n",
            "    string! _id\n",
            "    string email\n",
            "  }\n",
            "  orders {\n",
            "    string! _id\n",
            "    string userId\n",
            "    string status\n",
            "  }\n",
            "  orders }o--|| users : \"userId\"\n",
        );
        assert_eq!(diagram, expected);
    }

    #[test]
    fn mermaid_rendering_is_byte_identical_across_runs() {
        let schemas = users_orders();
        let rels = relations::detect(&schemas);
        let generator = MermaidGenerator::new();
        assert_eq!(generator.generate(&schemas, &rels), generator.generate(&schemas, &rels));
    }

    #[test]
    fn mermaid_renders_empty_entity_block() {
        let mut schemas = SchemaSet::new();
        schemas.insert("empty", Schema::default());
        let diagram = MermaidGenerator::new().generate(&schemas, &[]);
        assert_eq!(diagram, "erDiagram\n  empty {\n  }\n");
    }

    #[test]
    fn type_vocabulary_is_fixed() {
        assert_eq!(erd_type(TypeTag::ObjectId), "string");
        assert_eq!(erd_type(TypeTag::Date), "datetime");
        assert_eq!(erd_type(TypeTag::Null), "any");
        assert_eq!(erd_type(TypeTag::Number), "number");
        assert_eq!(erd_type(TypeTag::Array), "array");
    }

    #[test]
    fn relation_symbols_cover_all_cardinalities() {
        assert_eq!(relation_symbol(RelationType::OneToOne), "||--||");
        assert_eq!(relation_symbol(RelationType::OneToMany), "||--o{");
        assert_eq!(relation_symbol(RelationType::ManyToOne), "}o--||");
        assert_eq!(relation_symbol(RelationType::ManyToMany), "}o--o{");
    }

    #[test]
    fn assemble_wraps_schemas_and_relationships() {
        let schemas = users_orders();
        let rels = relations::detect(&schemas);
        let data = ErdData::assemble(&schemas, &rels);

        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[0].name, "users");
        assert_eq!(data.nodes[0].fields[0].name, ID_FIELD);
        assert!(data.nodes[0].fields[0].required);
        assert_eq!(data.links.len(), 1);
        assert_eq!(data.links[0].source, "orders");
        assert_eq!(data.links[0].target_field, ID_FIELD);
    }

    #[test]
    fn json_report_envelope_shape() {
        let schemas = users_orders();
        let rels = relations::detect(&schemas);
        let report = ErdReport {
            success: true,
            format: ErdFormat::Json,
            diagram: None,
            schemas: Some(schemas),
            relationships: Some(rels),
            stats: Stats { collections: 2, relationships: 1 },
            warnings: vec!["not serialized".into()],
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["format"], json!("json"));
        assert_eq!(value["stats"]["collections"], json!(2));
        assert_eq!(value["stats"]["relationships"], json!(1));
        assert_eq!(value["relationships"][0]["relationType"], json!("N:1"));
        assert!(value.get("diagram").is_none());
        assert!(value.get("warnings").is_none());
    }
}
