//! Document sources: where samples come from.
//!
//! The engine only ever sees the `DocumentSource` trait; the backends here
//! cover a directory of JSON/NDJSON files (one file per collection) and an
//! in-memory fixture source.
use crate::errors::SourceError;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

/// A named store of loosely structured records.
///
/// `Sync` so extraction can fan out across collections; implementations must
/// not rely on call ordering between collections.
pub trait DocumentSource: Sync {
    /// All collection names the source knows, in a stable order.
    ///
    /// # Errors
    /// Returns `SourceError` if the store cannot be enumerated.
    fn collection_names(&self) -> Result<Vec<String>, SourceError>;

    /// Up to `limit` documents from `collection`, in store-default order.
    ///
    /// # Errors
    /// Returns `SourceError` if the collection is unknown or unreadable.
    fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Value>, SourceError>;
}

const DOC_EXTENSIONS: [&str; 2] = ["json", "ndjson"];

/// Directory-backed source: each collection is a `<name>.json` file (a JSON
/// array, or a single document) or a `<name>.ndjson` file (one document per
/// line) directly under the root. Discovery respects `.gitignore`/`.ignore`;
/// global git excludes are disabled for determinism.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_file(&self, name: &str) -> Option<PathBuf> {
        DOC_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl DocumentSource for JsonDirSource {
    fn collection_names(&self) -> Result<Vec<String>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("source directory not found: {}", self.root.display()),
            )));
        }
        let mut walker = ignore::WalkBuilder::new(&self.root);
        walker
            .follow_links(false)
            .max_depth(Some(1))
            .git_global(false)
            .git_exclude(false)
            .parents(true);
        let mut names = Vec::new();
        for entry in walker.build().flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| DOC_EXTENSIONS.contains(&ext));
            if matches {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Value>, SourceError> {
        let Some(path) = self.collection_file(collection) else {
            return Err(SourceError::UnknownCollection(collection.to_string()));
        };
        let data = std::fs::read_to_string(&path)?;

        if path.extension().is_some_and(|ext| ext == "ndjson") {
            let mut docs = Vec::new();
            for line in data.lines() {
                if docs.len() == limit {
                    break;
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let doc = serde_json::from_str(line)
                    .map_err(|source| SourceError::Json { file: path.clone(), source })?;
                docs.push(doc);
            }
            return Ok(docs);
        }

        let value: Value = serde_json::from_str(&data)
            .map_err(|source| SourceError::Json { file: path.clone(), source })?;
        Ok(match value {
            Value::Array(items) => items.into_iter().take(limit).collect(),
            single => vec![single],
        })
    }
}

/// In-memory source with insertion-ordered collections. Intended for library
/// embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: Vec<(String, Vec<Value>)>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection.
    pub fn insert(&mut self, name: impl Into<String>, docs: Vec<Value>) {
        let name = name.into();
        if let Some(slot) = self.collections.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = docs;
        } else {
            self.collections.push((name, docs));
        }
    }
}

impl DocumentSource for MemorySource {
    fn collection_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.collections.iter().map(|(n, _)| n.clone()).collect())
    }

    fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Value>, SourceError> {
        self.collections
            .iter()
            .find(|(n, _)| n == collection)
            .map(|(_, docs)| docs.iter().take(limit).cloned().collect())
            .ok_or_else(|| SourceError::UnknownCollection(collection.to_string()))
    }
}
