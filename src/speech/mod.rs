//! # Narration Synthesis
//!
//! Turns narration text into audio bytes through a text-to-speech service.
//! The [`SpeechSynthesizer`] trait is the seam the pipeline depends on;
//! [`ElevenLabsClient`] is the production implementation.

pub mod elevenlabs;
pub mod text;

pub use elevenlabs::ElevenLabsClient;
pub use text::prepare_text_for_tts;

use async_trait::async_trait;

use crate::error::Result;

/// A text-to-speech backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// File extension of the audio this backend returns
    fn audio_extension(&self) -> &str {
        "mp3"
    }

    /// Synthesize `text` and return the encoded audio bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
