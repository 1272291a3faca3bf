//! The per-request job and the request/response shapes around it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::VisualConfig;
use crate::source::Headline;

/// Narration used when a request carries neither content nor title
pub const FALLBACK_TEXT: &str = "No content provided";

/// Longest title derived from narration text
const DERIVED_TITLE_CHARS: usize = 80;

/// Body of `POST /generate-video`; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// Query of `GET /generate-video`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadlineQuery {
    pub short: Option<String>,
}

impl HeadlineQuery {
    /// `?short`, `?short=1`, `?short=true`, `?short=yes` all select the headline-only narration
    pub fn is_short(&self) -> bool {
        match self.short.as_deref().map(str::trim) {
            None => false,
            Some(value) => matches!(
                value.to_ascii_lowercase().as_str(),
                "" | "1" | "true" | "yes" | "on"
            ),
        }
    }
}

/// Where the picture for a job comes from
#[derive(Debug, Clone, PartialEq)]
pub enum VisualRef {
    Image { url: String },
    Video { path: PathBuf },
}

/// Transient bundle of text and artifact paths for one request
#[derive(Debug, Clone)]
pub struct MediaJob {
    pub id: Uuid,
    pub title: String,
    pub source_text: String,
    pub visual: VisualRef,
    pub audio_path: Option<PathBuf>,
    pub video_path: Option<PathBuf>,
}

impl MediaJob {
    fn new(title: String, source_text: String, visual: VisualRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            source_text,
            visual,
            audio_path: None,
            video_path: None,
        }
    }

    /// Job for caller-supplied text
    pub fn from_request(request: &GenerateRequest, visual: &VisualConfig) -> Self {
        let title = non_blank(request.title.as_deref());
        let source_text = non_blank(request.content.as_deref())
            .or_else(|| title.clone())
            .unwrap_or_else(|| FALLBACK_TEXT.to_string());
        let title = title.unwrap_or_else(|| derive_title(&source_text));

        Self::new(title, source_text, resolve_visual(request.image_url.as_deref(), visual))
    }

    /// Job narrating `narration` for a fetched headline
    pub fn from_headline(headline: &Headline, narration: String, visual: &VisualConfig) -> Self {
        Self::new(
            headline.title.clone(),
            narration,
            resolve_visual(headline.url_to_image.as_deref(), visual),
        )
    }

    /// Short id used in file names and logs
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Explicit image, then configured background video, then the default image
fn resolve_visual(image_url: Option<&str>, config: &VisualConfig) -> VisualRef {
    if let Some(url) = non_blank(image_url) {
        return VisualRef::Image { url };
    }
    if let Some(path) = &config.background_video {
        return VisualRef::Video { path: path.clone() };
    }
    VisualRef::Image { url: config.default_image_url.clone() }
}

fn derive_title(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() <= DERIVED_TITLE_CHARS {
        return first_line.to_string();
    }

    let cut: String = first_line.chars().take(DERIVED_TITLE_CHARS).collect();
    match cut.rfind(' ') {
        Some(idx) if idx > 0 => format!("{}…", cut[..idx].trim_end()),
        _ => format!("{}…", cut),
    }
}

/// Response of a successful generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Local filesystem path of the MP4
    pub video_file_path: String,
    pub title: String,
    pub duration_secs: f64,
    pub file_size: u64,
    /// "image" or "video"
    pub visual: String,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

impl GenerationResult {
    pub const SUCCESS_MESSAGE: &'static str = "Video generated successfully!";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IMAGE_URL;

    fn request(title: Option<&str>, content: Option<&str>, image_url: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            title: title.map(String::from),
            content: content.map(String::from),
            image_url: image_url.map(String::from),
        }
    }

    #[test]
    fn test_content_wins_over_title() {
        let job = MediaJob::from_request(
            &request(Some("Headline"), Some("Full story text."), None),
            &VisualConfig::default(),
        );
        assert_eq!(job.source_text, "Full story text.");
        assert_eq!(job.title, "Headline");
        assert_eq!(job.visual, VisualRef::Image { url: DEFAULT_IMAGE_URL.to_string() });
        assert!(job.audio_path.is_none() && job.video_path.is_none());
    }

    #[test]
    fn test_title_used_when_content_blank() {
        let job = MediaJob::from_request(&request(Some("Headline"), Some("   "), None), &VisualConfig::default());
        assert_eq!(job.source_text, "Headline");
    }

    #[test]
    fn test_fallback_text() {
        let job = MediaJob::from_request(&GenerateRequest::default(), &VisualConfig::default());
        assert_eq!(job.source_text, FALLBACK_TEXT);
        assert_eq!(job.title, FALLBACK_TEXT);
    }

    #[test]
    fn test_visual_resolution_order() {
        let mut config = VisualConfig::default();
        config.background_video = Some(PathBuf::from("/srv/loop.mp4"));

        let job = MediaJob::from_request(&request(None, Some("x"), Some("https://img/a.jpg")), &config);
        assert_eq!(job.visual, VisualRef::Image { url: "https://img/a.jpg".to_string() });

        let job = MediaJob::from_request(&request(None, Some("x"), Some("")), &config);
        assert_eq!(job.visual, VisualRef::Video { path: PathBuf::from("/srv/loop.mp4") });
    }

    #[test]
    fn test_derived_title_is_cut_at_word() {
        let text = "word ".repeat(40);
        let job = MediaJob::from_request(&request(None, Some(&text), None), &VisualConfig::default());
        assert!(job.title.ends_with("word…"));
        assert!(job.title.chars().count() <= DERIVED_TITLE_CHARS + 1);
    }

    #[test]
    fn test_from_headline_uses_article_image() {
        let headline = Headline {
            title: "Rover finds ice".to_string(),
            url_to_image: Some("https://example.com/ice.jpg".to_string()),
            ..Headline::default()
        };
        let job = MediaJob::from_headline(&headline, "Narration.".to_string(), &VisualConfig::default());
        assert_eq!(job.title, "Rover finds ice");
        assert_eq!(job.visual, VisualRef::Image { url: "https://example.com/ice.jpg".to_string() });
    }

    #[test]
    fn test_short_flag_parsing() {
        let query = |v: Option<&str>| HeadlineQuery { short: v.map(String::from) };
        assert!(!query(None).is_short());
        assert!(query(Some("")).is_short());
        assert!(query(Some("TRUE")).is_short());
        assert!(query(Some("1")).is_short());
        assert!(!query(Some("false")).is_short());
        assert!(!query(Some("0")).is_short());
    }
}
