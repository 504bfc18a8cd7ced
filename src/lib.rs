//! Regen rebuilds composite images for an NFT-style collection from its per-token metadata.
//!
//! Each metadata record lists `trait_type`/`value` attributes. Every attribute is matched
//! against a directory of layer images by fuzzy name comparison, the matched layers are
//! stacked bottom-to-top on a fixed canvas, and the result is written as `<id>.png`.
//!
//! - Scan a collection with [`MetadataStore`]
//! - Index layer art with [`LayerLibrary`]
//! - Run a whole batch with [`GenerationPipeline`], or in the background with [`RegenWorker`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Layer discovery, matching and decoding.
pub mod assets;
/// Output sinks for finished records.
pub mod encode;
/// Shared value types and the crate error.
pub mod foundation;
/// Name normalization for fuzzy trait matching.
pub mod matching;
/// Metadata discovery and parsing.
pub mod metadata;
/// Batch orchestration.
pub mod pipeline;
/// Layer compositing.
pub mod render;

pub use crate::assets::LayerImage;
pub use crate::assets::library::{LayerEntry, LayerLibrary, LayerMatch, MatchKind, MatchScope};
pub use crate::encode::sink::{InMemorySink, OutputSink, PngDirSink};
pub use crate::foundation::core::{Canvas, RgbaF32Premul};
pub use crate::foundation::error::{RegenError, RegenResult};
pub use crate::matching::normalize::{NormalizedKey, normalize};
pub use crate::metadata::store::{Attribute, MetadataRecord, MetadataStore};
pub use crate::pipeline::config::RunConfig;
pub use crate::pipeline::events::{EventLog, LogLine, RunEvent, RunObserver, Severity};
pub use crate::pipeline::run::{
    CancelToken, GenerationPipeline, PipelineState, RunOutcome, RunSummary, percent,
};
pub use crate::pipeline::worker::RegenWorker;
pub use crate::render::compositor::{Composite, Compositor, ResizeFilter};
