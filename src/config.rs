use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    visual::VideoParams,
};

/// Image used when a request names neither an image nor a background video
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/720x480.png?text=News";

/// Main configuration for news-reel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP endpoint settings
    pub server: ServerConfig,

    /// Headline and article source settings
    pub news: NewsConfig,

    /// Text-to-speech settings
    pub speech: SpeechConfig,

    /// Background visual settings
    pub visual: VisualConfig,

    /// Output encoding parameters
    pub video: VideoParams,

    /// Composition settings
    pub composition: CompositionConfig,

    /// Where finished videos land
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Fill in API keys that are not already set in the file
    pub fn with_api_keys(mut self, news_api_key: Option<String>, speech_api_key: Option<String>) -> Self {
        if let Some(key) = news_api_key.filter(|k| !k.trim().is_empty()) {
            self.news.api_key = Some(key);
        }
        if let Some(key) = speech_api_key.filter(|k| !k.trim().is_empty()) {
            self.speech.api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.news.validate()?;
        self.speech.validate()?;
        self.visual.validate()?;
        self.video.validate()?;
        self.composition.validate()?;
        Ok(())
    }
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Timeout for every outbound HTTP call, in seconds
    pub upstream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            upstream_timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "server.bind".to_string(),
                value: self.bind.clone()
            }.into());
        }

        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.upstream_timeout_secs".to_string(),
                value: "0".to_string()
            }.into());
        }

        Ok(())
    }
}

/// News source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// NewsAPI key
    pub api_key: Option<String>,

    /// NewsAPI base URL
    pub base_url: String,

    /// Two-letter country code for top headlines
    pub country: String,

    /// Scrape the full article page when the headline links to one
    pub scrape_articles: bool,

    /// Sentences kept when summarizing an article (0 disables summarizing)
    pub summary_sentences: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org".to_string(),
            country: "us".to_string(),
            scrape_articles: true,
            summary_sentences: 3,
        }
    }
}

impl NewsConfig {
    fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "news.base_url".to_string(),
                value: self.base_url.clone()
            }.into());
        }

        if self.country.len() != 2 {
            return Err(ConfigError::InvalidValue {
                key: "news.country".to_string(),
                value: self.country.clone()
            }.into());
        }

        Ok(())
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// ElevenLabs API key
    pub api_key: Option<String>,

    /// ElevenLabs base URL
    pub base_url: String,

    /// Voice used for narration
    pub voice_id: String,

    /// Synthesis model
    pub model_id: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.elevenlabs.io".to_string(),
            voice_id: "alloy".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
        }
    }
}

impl SpeechConfig {
    fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "speech.base_url".to_string(),
                value: self.base_url.clone()
            }.into());
        }

        if self.voice_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "speech.voice_id".to_string(),
                value: self.voice_id.clone()
            }.into());
        }

        Ok(())
    }
}

/// Background visual configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Image used when the request does not name one
    pub default_image_url: String,

    /// Local background video used instead of the default image
    pub background_video: Option<PathBuf>,

    /// Output frame height; width follows the source aspect ratio
    pub target_height: u32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            background_video: None,
            target_height: 720,
        }
    }
}

impl VisualConfig {
    fn validate(&self) -> Result<()> {
        if self.target_height == 0 || self.target_height % 2 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "visual.target_height".to_string(),
                value: self.target_height.to_string()
            }.into());
        }

        if url::Url::parse(&self.default_image_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "visual.default_image_url".to_string(),
                value: self.default_image_url.clone()
            }.into());
        }

        Ok(())
    }
}

/// Composition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Burn the title into the video as a caption
    pub caption: bool,

    /// Caption font size in pixels
    pub caption_font_size: u32,

    /// Caption text colour (ffmpeg colour syntax)
    pub caption_font_color: String,

    /// Caption backdrop colour (ffmpeg colour syntax)
    pub caption_box_color: String,

    /// Captions longer than this are cut at a word boundary
    pub caption_max_chars: usize,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            caption: false,
            caption_font_size: 36,
            caption_font_color: "white".to_string(),
            caption_box_color: "black@0.5".to_string(),
            caption_max_chars: 120,
        }
    }
}

impl CompositionConfig {
    fn validate(&self) -> Result<()> {
        if self.caption_font_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "composition.caption_font_size".to_string(),
                value: "0".to_string()
            }.into());
        }

        if self.caption_max_chars == 0 {
            return Err(ConfigError::InvalidValue {
                key: "composition.caption_max_chars".to_string(),
                value: "0".to_string()
            }.into());
        }

        Ok(())
    }
}

/// Output location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `video_<id>.mp4` files
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("news_reel.toml");

        let mut original_config = Config::default();
        original_config.visual.background_video = Some(PathBuf::from("/srv/loop.mp4"));

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config.server.bind, loaded_config.server.bind);
        assert_eq!(original_config.video.fps, loaded_config.video.fps);
        assert_eq!(loaded_config.visual.background_video, Some(PathBuf::from("/srv/loop.mp4")));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[speech]\nvoice_id = \"rachel\"\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.speech.voice_id, "rachel");
        assert_eq!(config.speech.model_id, "eleven_monolingual_v1");
        assert_eq!(config.visual.target_height, 720);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/definitely/not/here.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_keys_from_environment_values() {
        let config = Config::default().with_api_keys(Some("news".into()), Some("  ".into()));
        assert_eq!(config.news.api_key.as_deref(), Some("news"));
        assert!(config.speech.api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.visual.target_height = 721;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.bind = "not an address".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.video.fps = 0.0;
        assert!(config.validate().is_err());
    }
}
