//! # Composition Engine
//!
//! Aligns the visual track to the narration, optionally overlays a caption,
//! and encodes the result to MP4 with ffmpeg.

pub mod caption;
pub mod command;
pub mod engine;
pub mod plan;

// Re-exports for convenience
pub use caption::Caption;
pub use command::FfmpegCommand;
pub use engine::{CompositionEngine, EncodedVideo};
pub use plan::AlignmentPlan;
