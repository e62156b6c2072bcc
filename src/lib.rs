//! docstore-erd — schema and ERD inference for schema-less document stores
//!
//! Sample documents per collection, infer per-field structural types
//! (including nested and array-of-object shapes), merge observations into one
//! schema per collection, detect cross-collection references from
//! field-naming conventions, and render the result as a Mermaid `erDiagram`
//! or structured JSON.
//!
//! # Features
//! - Recursive document analysis with dotted paths (`address.city`,
//!   `items[].sku`) over a fixed structural type-tag set
//! - Last-write-wins schema merging with stable field order
//! - Naming-convention reference detection (`userId` → `users`) with naive
//!   English pluralization
//! - Deterministic Mermaid and JSON rendering
//! - Pluggable document sources: JSON/NDJSON directories, in-memory fixtures
//!
//! # Quickstart (Library)
//! ```
//! use docstore_erd::erd::{self, ErdFormat};
//! use docstore_erd::schema::ERD_SAMPLE_LIMIT;
//! use docstore_erd::source::MemorySource;
//! use serde_json::json;
//!
//! let mut source = MemorySource::new();
//! source.insert("users", vec![json!({"_id": {"$oid": "507f1f77bcf86cd799439011"}, "email": "a@b.c"})]);
//! source.insert("orders", vec![json!({"_id": {"$oid": "507f191e810c19729de860ea"}, "userId": {"$oid": "507f1f77bcf86cd799439011"}})]);
//!
//! let report = erd::generate(&source, None, ErdFormat::Mermaid, ERD_SAMPLE_LIMIT).expect("generate erd");
//! assert!(report.diagram.unwrap().contains("orders }o--|| users"));
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! docstore-erd erd --path ./dump --format mermaid
//! docstore-erd schema --path ./dump --collections users,orders --out schemas.json
//! ```
//!
//! Inference is sample-based and heuristic: it guarantees neither completeness
//! nor referential correctness.
pub mod app;
pub mod cli;
pub mod erd;
pub mod errors;
pub mod relations;
pub mod schema;
pub mod source;
pub mod utils;
