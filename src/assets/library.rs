use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::{
    assets::{LayerImage, decode::decode_layer},
    foundation::error::{RegenError, RegenResult},
    matching::normalize::{NormalizedKey, normalize},
};

/// File extensions (compared case-insensitively) treated as layer images.
pub const LAYER_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One image file discovered under the library root.
#[derive(Clone, Debug)]
pub struct LayerEntry {
    /// Name of the directory that directly contains the file.
    pub folder: String,
    /// File name without extension.
    pub stem: String,
    /// Absolute path to the file.
    pub path: PathBuf,
    key: NormalizedKey,
}

impl LayerEntry {
    /// Normalized file stem used for matching.
    pub fn key(&self) -> &NormalizedKey {
        &self.key
    }
}

#[derive(Clone, Debug)]
struct TypeFolder {
    name: String,
    key: NormalizedKey,
    files: Vec<LayerEntry>,
}

/// Which search stage produced a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchScope {
    /// Found inside a folder whose name matches the trait type.
    Folder,
    /// Found by the recursive scan of the whole library.
    Global,
}

/// How the file stem matched the trait value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    /// Normalized stem equals the normalized value.
    Exact,
    /// Normalized stem contains the normalized value.
    Contains,
}

/// Result of [`LayerLibrary::locate`].
#[derive(Clone, Copy, Debug)]
pub struct LayerMatch<'a> {
    /// The matched file.
    pub entry: &'a LayerEntry,
    /// Search stage that found it.
    pub scope: MatchScope,
    /// Match strength.
    pub kind: MatchKind,
}

/// Index of a layer directory with fuzzy `(trait type, trait value)` lookup.
///
/// The directory is scanned once at construction; lookups run against the in-memory index and
/// return the same file a fresh scan would, as long as the directory does not change.
#[derive(Clone, Debug)]
pub struct LayerLibrary {
    root: PathBuf,
    folders: Vec<TypeFolder>,
    all: Vec<LayerEntry>,
}

impl LayerLibrary {
    /// Scan `root`: its immediate subdirectories become type folders, and every image file below it
    /// joins the global fallback index. Entries are kept in file-name order.
    #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> RegenResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(RegenError::validation(format!(
                "layer directory '{}' does not exist or is not a directory",
                root.display()
            )));
        }
        let root = std::path::absolute(root)
            .with_context(|| format!("resolve layer directory '{}'", root.display()))?;

        let mut folders = Vec::new();
        for dir in walk(&root, 1).filter(|d| d.file_type().is_dir()) {
            let files = walk(dir.path(), 1)
                .filter(|f| f.file_type().is_file())
                .filter_map(|f| layer_entry(f.path()))
                .collect();
            let name = dir.file_name().to_string_lossy().into_owned();
            folders.push(TypeFolder {
                key: normalize(&name),
                name,
                files,
            });
        }

        let all = walk(&root, usize::MAX)
            .filter(|f| f.file_type().is_file())
            .filter_map(|f| layer_entry(f.path()))
            .collect::<Vec<_>>();

        tracing::debug!(
            folders = folders.len(),
            files = all.len(),
            "indexed layer library"
        );
        Ok(Self { root, folders, all })
    }

    /// Library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the immediate subdirectories, in search order.
    pub fn folder_names(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(|f| f.name.as_str())
    }

    /// Every image file in the library, in global search order.
    pub fn entries(&self) -> &[LayerEntry] {
        &self.all
    }

    /// Find the file for a trait without decoding it.
    ///
    /// Search order, first hit wins:
    /// 1. files directly inside folders whose normalized name contains the normalized type, exact
    ///    stem match before substring match;
    /// 2. every file in the library, exact before substring, ignoring the type.
    ///
    /// Substring matching only ever looks for the value inside the file stem. A value that
    /// normalizes to nothing is contained in every stem and takes the first candidate.
    pub fn locate(&self, trait_type: &str, trait_value: &str) -> Option<LayerMatch<'_>> {
        let type_key = normalize(trait_type);
        let value_key = normalize(trait_value);

        let type_key = &type_key;
        let scoped = move || {
            self.folders
                .iter()
                .filter(move |f| f.key.contains(type_key))
                .flat_map(|f| f.files.iter())
        };
        if let Some((entry, kind)) = best_match(scoped, &value_key) {
            return Some(LayerMatch {
                entry,
                scope: MatchScope::Folder,
                kind,
            });
        }

        best_match(|| self.all.iter(), &value_key).map(|(entry, kind)| LayerMatch {
            entry,
            scope: MatchScope::Global,
            kind,
        })
    }

    /// Locate and decode the layer for a trait. `Ok(None)` is a miss.
    pub fn resolve(&self, trait_type: &str, trait_value: &str) -> RegenResult<Option<LayerImage>> {
        let Some(hit) = self.locate(trait_type, trait_value) else {
            return Ok(None);
        };
        tracing::debug!(
            trait_type,
            trait_value,
            path = %hit.entry.path.display(),
            scope = ?hit.scope,
            kind = ?hit.kind,
            "resolved layer"
        );
        decode_layer(&hit.entry.path).map(Some)
    }
}

fn best_match<'a, I>(
    candidates: impl Fn() -> I,
    value_key: &NormalizedKey,
) -> Option<(&'a LayerEntry, MatchKind)>
where
    I: Iterator<Item = &'a LayerEntry>,
{
    if let Some(e) = candidates().find(|e| e.key == *value_key) {
        return Some((e, MatchKind::Exact));
    }
    candidates()
        .find(|e| e.key.contains(value_key))
        .map(|e| (e, MatchKind::Contains))
}

/// Entries below `dir` in file-name order, following symlinks. Unreadable entries are skipped.
fn walk(dir: &Path, max_depth: usize) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|item| match item {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable layer library entry");
                None
            }
        })
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_layer_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            LAYER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn layer_entry(path: &Path) -> Option<LayerEntry> {
    if !is_layer_file(path) {
        return None;
    }
    let stem = path.file_stem()?.to_string_lossy().into_owned();
    let folder = path
        .parent()
        .map(file_name_lossy)
        .unwrap_or_default();
    Some(LayerEntry {
        key: normalize(&stem),
        folder,
        stem,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/library.rs"]
mod tests;
