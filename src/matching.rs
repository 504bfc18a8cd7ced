/// Trait and file name normalization.
pub mod normalize;
