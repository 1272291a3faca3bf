//! # Narration Audio
//!
//! Measures the synthesized narration so the visual track can be aligned to
//! it. WAV files are read with `hound`; compressed formats (MP3 from the TTS
//! API, AAC, FLAC, OGG) are probed with Symphonia without decoding samples.

pub mod loader;
pub mod types;

pub use loader::AudioLoader;
pub use types::{AudioFormat, AudioInfo};
