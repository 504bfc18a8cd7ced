use std::path::Path;

use anyhow::Context;

use crate::{assets::LayerImage, foundation::error::RegenResult};

/// Decode a layer file from disk, sniffing the real format when the extension lies.
pub fn decode_layer(path: &Path) -> RegenResult<LayerImage> {
    let dyn_img = image::ImageReader::open(path)
        .with_context(|| format!("open layer '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff layer format '{}'", path.display()))?
        .decode()
        .with_context(|| format!("decode layer '{}'", path.display()))?;
    Ok(prepare(dyn_img))
}

/// Decode a layer from in-memory encoded bytes.
pub fn decode_layer_bytes(bytes: &[u8]) -> RegenResult<LayerImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode layer from memory")?;
    Ok(prepare(dyn_img))
}

fn prepare(dyn_img: image::DynamicImage) -> LayerImage {
    LayerImage {
        rgba8: dyn_img.to_rgba8(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
