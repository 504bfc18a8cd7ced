use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::foundation::{
    core::Canvas,
    error::{RegenError, RegenResult},
};

/// Destination for rendered records.
///
/// Ordering contract: `begin` is called once before the first `write`; writes arrive in record
/// order from a single thread.
pub trait OutputSink: Send {
    /// Prepare the destination. Failure here is fatal for the run.
    fn begin(&mut self, canvas: Canvas) -> RegenResult<()>;
    /// Return `true` when output for `id` is already present.
    fn contains(&self, id: &str) -> bool;
    /// Store the finished image for `id`, returning the written file name.
    ///
    /// Errors that leave the destination unusable are reported as [`RegenError::Output`].
    fn write(&mut self, id: &str, image: &RgbaImage) -> RegenResult<String>;
}

/// Output file name for a record identity.
pub fn output_file_name(id: &str) -> String {
    format!("{id}.png")
}

/// Sink writing `<id>.png` files into a directory, creating it if needed.
#[derive(Clone, Debug)]
pub struct PngDirSink {
    dir: PathBuf,
}

impl PngDirSink {
    /// Create a sink targeting `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for PngDirSink {
    fn begin(&mut self, _canvas: Canvas) -> RegenResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            RegenError::output(format!(
                "create output directory '{}': {e}",
                self.dir.display()
            ))
        })
    }

    fn contains(&self, id: &str) -> bool {
        self.dir.join(output_file_name(id)).is_file()
    }

    fn write(&mut self, id: &str, image: &RgbaImage) -> RegenResult<String> {
        let name = output_file_name(id);
        let path = self.dir.join(&name);
        let res = image::save_buffer_with_format(
            &path,
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        );
        match res {
            Ok(()) => Ok(name),
            Err(e) if !self.dir.is_dir() => Err(RegenError::output(format!(
                "output directory '{}' is gone: {e}",
                self.dir.display()
            ))),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("write png '{}'", path.display()))
                .into()),
        }
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemorySink {
    canvas: Option<Canvas>,
    images: Vec<(String, RgbaImage)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas captured by `begin`, if any.
    pub fn canvas(&self) -> Option<Canvas> {
        self.canvas
    }

    /// Stored images in write order.
    pub fn images(&self) -> &[(String, RgbaImage)] {
        &self.images
    }

    /// Look up a stored image by record identity.
    pub fn get(&self, id: &str) -> Option<&RgbaImage> {
        self.images
            .iter()
            .find(|(stored, _)| stored == id)
            .map(|(_, img)| img)
    }
}

impl OutputSink for InMemorySink {
    fn begin(&mut self, canvas: Canvas) -> RegenResult<()> {
        self.canvas = Some(canvas);
        self.images.clear();
        Ok(())
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn write(&mut self, id: &str, image: &RgbaImage) -> RegenResult<String> {
        self.images.push((id.to_string(), image.clone()));
        Ok(output_file_name(id))
    }
}
