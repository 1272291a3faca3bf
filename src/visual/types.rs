use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// A visual asset ready to be composed under the narration
#[derive(Debug, Clone, PartialEq)]
pub enum VisualSource {
    /// A still image, held for the whole narration
    StillImage {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    /// A local video clip, looped until it covers the narration
    BackgroundVideo {
        path: PathBuf,
        duration: f64,
        width: u32,
        height: u32,
    },
}

impl VisualSource {
    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        match self {
            Self::StillImage { path, .. } | Self::BackgroundVideo { path, .. } => path,
        }
    }

    /// Native duration of the asset; `None` for stills
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::StillImage { .. } => None,
            Self::BackgroundVideo { duration, .. } => Some(*duration),
        }
    }

    /// Resolution (width, height)
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            Self::StillImage { width, height, .. } | Self::BackgroundVideo { width, height, .. } => {
                (*width, *height)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::StillImage { .. } => "image",
            Self::BackgroundVideo { .. } => "video",
        }
    }
}

/// Width that keeps the aspect ratio at `target_height`, rounded to an even
/// number because yuv420p needs even dimensions
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    if height == 0 {
        return 2;
    }
    let exact = width as f64 * target_height as f64 / height as f64;
    let even = ((exact / 2.0).round() as u32) * 2;
    even.max(2)
}

/// Output encoding parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    /// Target frame rate for output
    pub fps: f64,

    /// Video codec to use for output
    pub codec: String,

    /// Audio codec to use for output
    pub audio_codec: String,

    /// Pixel format of the encoded stream
    pub pixel_format: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 24.0,
            codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            pixel_format: "yuv420p".to_string(),
            quality: 60,
        }
    }
}

impl VideoParams {
    /// Map the 0-100 quality scale onto x264's CRF range
    pub fn crf(&self) -> u8 {
        (51 - ((self.quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.fps > 0.0 && self.fps <= 120.0) {
            return Err(ConfigError::InvalidValue {
                key: "video.fps".to_string(),
                value: self.fps.to_string()
            }.into());
        }

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.quality".to_string(),
                value: self.quality.to_string()
            }.into());
        }

        if self.codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "video.codec".to_string(),
                value: format!("{}/{}", self.codec, self.audio_codec)
            }.into());
        }

        Ok(())
    }
}
