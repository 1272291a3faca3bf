//! # Visual Sources
//!
//! Acquires the picture that sits behind the narration: either a still image
//! downloaded from a URL and resized to the output height, or a local
//! background video whose duration is probed so it can be looped.

pub mod loader;
pub mod types;

pub use loader::{ImageDownloader, VisualLoader};
pub use types::{VideoParams, VisualSource};
