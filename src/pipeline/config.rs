use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::{
        core::Canvas,
        error::{RegenError, RegenResult},
    },
    render::compositor::ResizeFilter,
};

fn default_overwrite() -> bool {
    true
}

/// Inputs for one regeneration run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Directory holding one metadata document per item.
    pub metadata_dir: PathBuf,
    /// Root of the layer library, searched recursively.
    pub layer_dir: PathBuf,
    /// Destination directory, created when missing.
    pub out_dir: PathBuf,
    /// Output canvas size.
    #[serde(default)]
    pub canvas: Canvas,
    /// Filter used to fit layers to the canvas.
    #[serde(default)]
    pub filter: ResizeFilter,
    /// Replace existing `<id>.png` files. When `false`, such records are skipped.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

impl RunConfig {
    /// Config with default canvas (1000x1000), Lanczos3 resampling and overwrite enabled.
    pub fn new(
        metadata_dir: impl Into<PathBuf>,
        layer_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            layer_dir: layer_dir.into(),
            out_dir: out_dir.into(),
            canvas: Canvas::default(),
            filter: ResizeFilter::default(),
            overwrite: true,
        }
    }

    /// Load a JSON config file. Relative directories are resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> RegenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut cfg: Self = serde_json::from_str(&text).map_err(|e| {
            RegenError::validation(format!("parse config '{}': {e}", path.display()))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for dir in [&mut cfg.metadata_dir, &mut cfg.layer_dir, &mut cfg.out_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(cfg)
    }

    /// Check that inputs exist and the canvas is in bounds. The output directory is not checked;
    /// it is created when the run starts.
    pub fn validate(&self) -> RegenResult<()> {
        for (name, dir) in [("metadata", &self.metadata_dir), ("layer", &self.layer_dir)] {
            if !dir.is_dir() {
                return Err(RegenError::validation(format!(
                    "{name} directory '{}' does not exist or is not a directory",
                    dir.display()
                )));
            }
        }
        if self.out_dir.as_os_str().is_empty() {
            return Err(RegenError::validation("output directory must be set"));
        }
        self.canvas.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
