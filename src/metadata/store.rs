use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::foundation::error::{RegenError, RegenResult};

/// One `(trait_type, value)` pair, trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Category name, e.g. `Background`.
    pub trait_type: String,
    /// Value within the category, e.g. `Blue#3`.
    pub value: String,
}

impl Attribute {
    /// Build an attribute, trimming both sides.
    pub fn new(trait_type: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            trait_type: trait_type.as_ref().trim().to_string(),
            value: value.as_ref().trim().to_string(),
        }
    }

    /// Attributes with an empty type or value never produce a layer.
    pub fn is_blank(&self) -> bool {
        self.trait_type.is_empty() || self.value.is_empty()
    }
}

/// A parsed per-item metadata document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Identity: the source file stem. Output is written as `<id>.png`.
    pub id: String,
    /// File the record was read from.
    pub source: PathBuf,
    /// Attributes in document order.
    pub attributes: Vec<Attribute>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    attributes: Option<Vec<RawAttribute>>,
}

#[derive(Deserialize)]
struct RawAttribute {
    #[serde(default)]
    trait_type: TraitText,
    #[serde(default)]
    value: TraitText,
}

/// Attribute text as it appears in the wild: strings, but also numeric and boolean traits.
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum TraitText {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    #[default]
    Null,
}

impl TraitText {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
            Self::Null => String::new(),
        }
    }
}

impl MetadataRecord {
    /// Read and parse a metadata file.
    pub fn from_path(path: impl AsRef<Path>) -> RegenResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read metadata '{}'", path.display()))?;
        Self::from_json_slice(record_id(path), path, &bytes)
    }

    /// Parse a metadata document. The root must be a JSON object whose optional `attributes` field
    /// is a list of `{ "trait_type": .., "value": .. }` objects.
    pub fn from_json_slice(
        id: impl Into<String>,
        source: impl Into<PathBuf>,
        bytes: &[u8],
    ) -> RegenResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| RegenError::metadata(format!("invalid JSON: {e}")))?;
        if !value.is_object() {
            return Err(RegenError::metadata("document root must be an object"));
        }
        let doc = RawDocument::deserialize(value)
            .map_err(|e| RegenError::metadata(format!("unexpected document shape: {e}")))?;

        let attributes = doc
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(|a| Attribute::new(a.trait_type.into_string(), a.value.into_string()))
            .collect();

        Ok(Self {
            id: id.into(),
            source: source.into(),
            attributes,
        })
    }

    /// Source file name, used in log lines.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Metadata records discovered in one directory.
#[derive(Clone, Debug, Default)]
pub struct MetadataStore {
    records: Vec<MetadataRecord>,
    ignored: Vec<PathBuf>,
}

impl MetadataStore {
    /// Parse every regular file in `dir` (not recursive).
    ///
    /// Files that are not metadata documents are set aside in [`MetadataStore::ignored`] rather
    /// than reported. Records are ordered by numeric id first, then by name.
    #[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn discover(dir: impl AsRef<Path>) -> RegenResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(RegenError::validation(format!(
                "metadata directory '{}' does not exist or is not a directory",
                dir.display()
            )));
        }

        let mut store = Self::default();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read metadata directory '{}'", dir.display()))?;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    tracing::debug!(%err, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            match MetadataRecord::from_path(&path) {
                Ok(record) => store.records.push(record),
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "not a metadata document");
                    store.ignored.push(path);
                }
            }
        }

        store
            .records
            .sort_by(|a, b| order_key(&a.id).cmp(&order_key(&b.id)).then(a.source.cmp(&b.source)));
        store.ignored.sort();

        tracing::debug!(
            records = store.records.len(),
            ignored = store.ignored.len(),
            "discovered metadata"
        );
        Ok(store)
    }

    /// Parsed records in processing order.
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    /// Consume the store, yielding its records.
    pub fn into_records(self) -> Vec<MetadataRecord> {
        self.records
    }

    /// Files that were present but did not parse as metadata.
    pub fn ignored(&self) -> &[PathBuf] {
        &self.ignored
    }

    /// Number of parsed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` when no file parsed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn record_id(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn order_key(id: &str) -> (u8, u64, &str) {
    match id.parse::<u64>() {
        Ok(n) => (0, n, id),
        Err(_) => (1, 0, id),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/store.rs"]
mod tests;
