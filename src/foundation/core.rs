use crate::foundation::error::{RegenError, RegenResult};

/// Premultiplied RGBA pixel with channels in `0.0..=1.0`.
pub type RgbaF32Premul = [f32; 4];

/// Smallest accepted canvas side in pixels.
pub const MIN_CANVAS_SIDE: u32 = 64;
/// Largest accepted canvas side in pixels.
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Output canvas dimensions shared by every record in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
        }
    }
}

impl Canvas {
    /// Create a canvas, rejecting sides outside `64..=8192`.
    pub fn new(width: u32, height: u32) -> RegenResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Check both sides against the accepted bounds.
    pub fn validate(&self) -> RegenResult<()> {
        for (name, side) in [("width", self.width), ("height", self.height)] {
            if !(MIN_CANVAS_SIDE..=MAX_CANVAS_SIDE).contains(&side) {
                return Err(RegenError::validation(format!(
                    "canvas {name} must be in {MIN_CANVAS_SIDE}..={MAX_CANVAS_SIDE}, got {side}"
                )));
            }
        }
        Ok(())
    }
}
