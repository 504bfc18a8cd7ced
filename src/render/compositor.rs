use image::{Rgba32FImage, RgbaImage, imageops::FilterType};

use crate::{
    assets::{LayerImage, library::LayerLibrary},
    foundation::{
        core::Canvas,
        error::{RegenError, RegenResult},
    },
    metadata::store::{Attribute, MetadataRecord},
    render::composite::{clamp_premul, over_in_place, premultiply, unpremultiply},
};

/// Resampling filter used to fit layers to the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest neighbour; exact for pixel art.
    Nearest,
    /// Bilinear.
    Triangle,
    /// Bicubic.
    CatmullRom,
    /// Windowed sinc, radius 3.
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Output of [`Compositor::render`].
#[derive(Clone, Debug)]
pub struct Composite {
    /// Finished canvas, straight-alpha RGBA8, exactly canvas-sized.
    pub image: RgbaImage,
    /// Number of layers drawn.
    pub layers_applied: usize,
    /// Number of attributes that resolved to no layer.
    pub misses: usize,
}

/// Stacks resolved layers onto a transparent canvas in attribute order.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    canvas: Canvas,
    filter: ResizeFilter,
}

impl Compositor {
    /// Create a compositor for a fixed canvas size.
    pub fn new(canvas: Canvas, filter: ResizeFilter) -> RegenResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(RegenError::render("canvas must be non-empty"));
        }
        Ok(Self { canvas, filter })
    }

    /// Canvas size every render produces.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Render one record.
    ///
    /// Attributes are applied in document order; blank attributes are skipped, and attributes the
    /// library cannot resolve are reported through `on_miss` and otherwise ignored. Decode failures
    /// of a resolved layer are errors.
    pub fn render(
        &self,
        record: &MetadataRecord,
        library: &LayerLibrary,
        on_miss: &mut dyn FnMut(&Attribute),
    ) -> RegenResult<Composite> {
        let mut frame = self.blank();
        let mut layers_applied = 0;
        let mut misses = 0;

        for attr in &record.attributes {
            if attr.is_blank() {
                continue;
            }
            match library.resolve(&attr.trait_type, &attr.value)? {
                Some(layer) => {
                    self.apply(&mut frame, &layer)?;
                    layers_applied += 1;
                }
                None => {
                    misses += 1;
                    on_miss(attr);
                }
            }
        }

        Ok(Composite {
            image: finish(frame),
            layers_applied,
            misses,
        })
    }

    /// Composite already-decoded layers, bottom first.
    pub fn render_layers<'a>(
        &self,
        layers: impl IntoIterator<Item = &'a LayerImage>,
    ) -> RegenResult<RgbaImage> {
        let mut frame = self.blank();
        for layer in layers {
            self.apply(&mut frame, layer)?;
        }
        Ok(finish(frame))
    }

    fn blank(&self) -> Rgba32FImage {
        Rgba32FImage::new(self.canvas.width, self.canvas.height)
    }

    fn apply(&self, frame: &mut Rgba32FImage, layer: &LayerImage) -> RegenResult<()> {
        if layer.width() == 0 || layer.height() == 0 {
            return Err(RegenError::layer("layer image has zero size"));
        }
        let premul = Rgba32FImage::from_fn(layer.width(), layer.height(), |x, y| {
            image::Rgba(premultiply(layer.rgba8.get_pixel(x, y).0))
        });
        if layer.width() == self.canvas.width && layer.height() == self.canvas.height {
            return over_in_place(frame, &premul);
        }
        // Resample in premultiplied space.
        let mut fitted = image::imageops::resize(
            &premul,
            self.canvas.width,
            self.canvas.height,
            self.filter.filter_type(),
        );
        for px in fitted.pixels_mut() {
            clamp_premul(&mut px.0);
        }
        over_in_place(frame, &fitted)
    }
}

fn finish(frame: Rgba32FImage) -> RgbaImage {
    RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
        image::Rgba(unpremultiply(frame.get_pixel(x, y).0))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
