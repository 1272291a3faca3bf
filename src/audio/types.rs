use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Duration and stream layout of a narration file
#[derive(Debug, Clone)]
pub struct AudioInfo {
    /// Duration in seconds
    pub duration: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo, 0 = not reported)
    pub channels: u16,

    /// Original file path
    pub file_path: PathBuf,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioInfo {
    /// Number of video frames needed to cover the narration at `fps`
    pub fn frames_at(&self, fps: f64) -> u64 {
        (self.duration * fps).ceil() as u64
    }
}

/// Audio file format information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Codec description for compressed formats
    pub compression: Option<String>,
}
