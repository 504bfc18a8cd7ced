/// Premultiplied source-over blending.
pub mod composite;
/// Layer stacking onto a fixed canvas.
pub mod compositor;
