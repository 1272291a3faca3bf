use thiserror::Error;

/// Main error type for the news-reel library
#[derive(Error, Debug)]
pub enum NewsReelError {
    #[error("News source error: {0}")]
    Source(#[from] SourceError),

    #[error("Speech synthesis error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Visual source error: {0}")]
    Visual(#[from] VisualError),

    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Headline and article fetching errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("News API returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("No usable content from {origin}")]
    Empty { origin: String },

    #[error("Invalid source URL: {url}")]
    InvalidUrl { url: String },
}

/// Text-to-speech errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("TTS API returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("TTS API returned an empty audio body")]
    EmptyAudio,

    #[error("Nothing to narrate: text is empty")]
    EmptyText,
}

/// Narration audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Image and background video errors
#[derive(Error, Debug)]
pub enum VisualError {
    #[error("Image download from {url} returned status {status}")]
    Upstream { url: String, status: u16 },

    #[error("Failed to decode image from {origin}: {reason}")]
    DecodeFailed { origin: String, reason: String },

    #[error("Static asset not found: {path}")]
    MissingAsset { path: String },

    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed { path: String, reason: String },
}

/// Composition-specific errors
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("Encoder not available: {tool}")]
    EncoderUnavailable { tool: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Output generation failed: {reason}")]
    OutputFailed { reason: String },

    #[error("Invalid composition parameters: {details}")]
    InvalidParameters { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using NewsReelError
pub type Result<T> = std::result::Result<T, NewsReelError>;

impl NewsReelError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether this error came from a failed call to an external service or tool
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Source(SourceError::Upstream { .. })
                | Self::Source(SourceError::Empty { .. })
                | Self::Speech(SpeechError::Upstream { .. })
                | Self::Speech(SpeechError::EmptyAudio)
                | Self::Visual(VisualError::Upstream { .. })
                | Self::Visual(VisualError::MissingAsset { .. })
                | Self::Composition(CompositionError::EncoderUnavailable { .. })
                | Self::Composition(CompositionError::EncodingFailed { .. })
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Speech(SpeechError::Upstream { .. }) | Self::Speech(SpeechError::EmptyAudio) => {
                "Failed to generate speech".to_string()
            }
            Self::Source(SourceError::Empty { .. }) => {
                "No news content available to narrate".to_string()
            }
            Self::Visual(VisualError::MissingAsset { path }) => {
                format!("Background asset '{}' is missing", path)
            }
            Self::Composition(CompositionError::EncoderUnavailable { tool }) => {
                format!("'{}' is not installed on the server", tool)
            }
            Self::Config(ConfigError::MissingKey { key }) => {
                format!("Server is missing configuration for '{}'", key)
            }
            _ => self.to_string(),
        }
    }
}
