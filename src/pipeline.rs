//! Orchestrates one narrated video from text to MP4.
//!
//! Call order for every job:
//! 1. Resolve narration text (request body, or headline and article)
//! 2. Optionally summarize it
//! 3. Synthesize speech and persist the audio
//! 4. Acquire the visual asset
//! 5. Compose and encode the MP4
//! 6. Return the result; scratch files go away with the workspace

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::Client;
use tokio::task;
use tracing::{info, instrument, warn};

use crate::{
    audio::{AudioInfo, AudioLoader},
    composition::CompositionEngine,
    config::Config,
    error::{ConfigError, NewsReelError, Result},
    job::{GenerateRequest, GenerationResult, MediaJob, VisualRef},
    source::{Headline, NewsApiClient, NewsSource},
    speech::{ElevenLabsClient, SpeechSynthesizer},
    summarize::Summarizer,
    visual::{ImageDownloader, VisualLoader, VisualSource},
    workspace::JobWorkspace,
};

/// Everything needed to turn a request into a video
pub struct Pipeline {
    config: Config,
    news: Option<Arc<dyn NewsSource>>,
    speech: Arc<dyn SpeechSynthesizer>,
    images: ImageDownloader,
    engine: CompositionEngine,
    summarizer: Summarizer,
}

impl Pipeline {
    /// Wire the production clients from configuration
    ///
    /// The speech key is required. Without a news key the service still
    /// accepts caller-supplied text, but headline requests fail.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.server.upstream_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let speech: Arc<dyn SpeechSynthesizer> = Arc::new(ElevenLabsClient::new(client.clone(), &config.speech)?);
        let news: Option<Arc<dyn NewsSource>> = match NewsApiClient::new(client.clone(), &config.news) {
            Ok(news) => Some(Arc::new(news)),
            Err(e) => {
                warn!(error = %e, "Headline source disabled");
                None
            }
        };

        Ok(Self::new(config, news, speech, client))
    }

    /// Assemble a pipeline from explicit parts
    pub fn new(
        config: Config,
        news: Option<Arc<dyn NewsSource>>,
        speech: Arc<dyn SpeechSynthesizer>,
        client: Client,
    ) -> Self {
        Self {
            images: ImageDownloader::new(client, config.visual.target_height),
            engine: CompositionEngine::new(&config),
            summarizer: Summarizer::new(config.news.summary_sentences),
            config,
            news,
            speech,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a video from caller-supplied title/content/image
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerationResult> {
        let job = MediaJob::from_request(&request, &self.config.visual);
        self.run(job).await
    }

    /// Generate a video for the current top headline
    ///
    /// `short` narrates the headline alone; otherwise the article text is
    /// narrated, summarized to the configured number of sentences.
    pub async fn generate_from_headline(&self, short: bool) -> Result<GenerationResult> {
        let news = self.news.as_ref().ok_or_else(|| ConfigError::MissingKey {
            key: "news.api_key".to_string(),
        })?;

        let headline = news.top_headline().await?;
        let narration = if short {
            headline.title.clone()
        } else {
            self.article_narration(news.as_ref(), &headline).await
        };

        let job = MediaJob::from_headline(&headline, narration, &self.config.visual);
        self.run(job).await
    }

    async fn article_narration(&self, news: &dyn NewsSource, headline: &Headline) -> String {
        let mut text = headline.teaser().to_string();

        if self.config.news.scrape_articles {
            if let Some(url) = &headline.url {
                match news.article_text(url).await {
                    Ok(article) => text = article,
                    Err(e) => warn!(%url, error = %e, "Article scrape failed; narrating the API summary"),
                }
            }
        }

        if self.config.news.summary_sentences == 0 {
            return text;
        }
        let summary = self.summarizer.summarize(&text);
        if summary.is_empty() { text } else { summary }
    }

    #[instrument(level = "info", skip_all, fields(job = %job.short_id()))]
    async fn run(&self, mut job: MediaJob) -> Result<GenerationResult> {
        let started = Instant::now();
        info!(title = %job.title, chars = job.source_text.chars().count(), "Starting job");

        let workspace = JobWorkspace::create(&self.config.output.dir, &job.short_id())?;

        // Narration
        let audio_bytes = self.speech.synthesize(&job.source_text).await?;
        let audio_name = format!("audio_{}.{}", job.short_id(), self.speech.audio_extension());
        let audio_path = workspace.write_scratch(&audio_name, &audio_bytes)?;
        job.audio_path = Some(audio_path.clone());

        let audio: AudioInfo = task::spawn_blocking(move || AudioLoader::probe(&audio_path))
            .await
            .map_err(|e| NewsReelError::generic(format!("Audio probe worker failed: {}", e)))??;
        info!(backend = self.speech.name(), duration = audio.duration, "Narration ready");

        // Visual
        let visual = self.acquire_visual(&job.visual, &workspace).await?;

        // Composition
        let caption = self.engine.caption_for(&job.title);
        let encoded = self
            .engine
            .compose(&visual, &audio, caption.as_ref(), workspace.scratch_dir(), workspace.output_path())
            .await?;

        let video_path = workspace.commit();
        job.video_path = Some(video_path.clone());

        info!(
            path = %video_path.display(),
            duration = encoded.duration,
            bytes = encoded.file_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Job complete"
        );

        Ok(GenerationResult {
            video_file_path: video_path.display().to_string(),
            title: job.title,
            duration_secs: encoded.duration,
            file_size: encoded.file_size,
            visual: visual.kind().to_string(),
            created_at: Utc::now(),
            message: GenerationResult::SUCCESS_MESSAGE.to_string(),
        })
    }

    async fn acquire_visual(&self, visual: &VisualRef, workspace: &JobWorkspace) -> Result<VisualSource> {
        match visual {
            VisualRef::Image { url } => self.images.download(url, workspace.scratch_dir()).await,
            VisualRef::Video { path } => VisualLoader::open_background_video(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, SpeechError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records what it was asked to say, then fails like a rejected API call
    #[derive(Default)]
    struct RejectingSpeech {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for RejectingSpeech {
        fn name(&self) -> &str {
            "rejecting"
        }

        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            self.spoken.lock().unwrap().push(text.to_string());
            Err(SpeechError::Upstream { status: 500, body: "boom".to_string() }.into())
        }
    }

    struct FixedNews {
        headline: Headline,
        article: Option<String>,
    }

    #[async_trait]
    impl NewsSource for FixedNews {
        async fn top_headline(&self) -> Result<Headline> {
            Ok(self.headline.clone())
        }

        async fn article_text(&self, url: &str) -> Result<String> {
            self.article.clone().ok_or_else(|| {
                SourceError::Upstream { status: 404, message: format!("{} not found", url) }.into()
            })
        }
    }

    fn pipeline(
        output: &std::path::Path,
        news: Option<Arc<dyn NewsSource>>,
    ) -> (Pipeline, Arc<RejectingSpeech>) {
        let mut config = Config::default();
        config.output.dir = output.to_path_buf();
        config.news.summary_sentences = 1;
        let speech = Arc::new(RejectingSpeech::default());
        (Pipeline::new(config, news, speech.clone(), Client::new()), speech)
    }

    fn headline() -> Headline {
        Headline {
            title: "Rover finds ice".to_string(),
            description: Some("Water ice was found near the pole.".to_string()),
            url: Some("https://example.com/ice".to_string()),
            ..Headline::default()
        }
    }

    fn videos_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("video_"))
            .count()
    }

    /// Speaks a fixed-length tone as WAV
    struct ToneSpeech {
        seconds: f64,
    }

    #[async_trait]
    impl SpeechSynthesizer for ToneSpeech {
        fn name(&self) -> &str {
            "tone"
        }

        fn audio_extension(&self) -> &str {
            "wav"
        }

        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 16000,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut cursor = std::io::Cursor::new(Vec::new());
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..(self.seconds * 16000.0) as usize {
                writer.write_sample(((i % 64) as i16 - 32) * 200).unwrap();
            }
            writer.finalize().unwrap();
            Ok(cursor.into_inner())
        }
    }

    async fn serve_png() -> String {
        use axum::{http::header, routing::get, Router};

        let mut png = std::io::Cursor::new(Vec::new());
        image::RgbImage::from_pixel(400, 300, image::Rgb([200, 30, 30]))
            .write_to(&mut png, image::ImageOutputFormat::Png)
            .unwrap();
        let png = png.into_inner();

        let router = Router::new().route(
            "/still.png",
            get(move || async move { ([(header::CONTENT_TYPE, "image/png")], png) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/still.png", addr)
    }

    #[tokio::test]
    async fn test_video_duration_matches_narration() {
        let out = tempdir().unwrap();
        let mut config = Config::default();
        config.output.dir = out.path().to_path_buf();
        config.visual.target_height = 240;

        let speech = Arc::new(ToneSpeech { seconds: 3.0 });
        let pipeline = Pipeline::new(config, None, speech, Client::new());
        if !pipeline.engine.check_encoder_available() || !crate::ffmpeg::check_available("ffprobe") {
            eprintln!("skipping: ffmpeg with libx264 not available");
            return;
        }

        let request = GenerateRequest {
            title: Some("Tone".to_string()),
            content: Some("Three seconds of tone.".to_string()),
            image_url: Some(serve_png().await),
        };
        let result = pipeline.generate(request).await.unwrap();

        assert_eq!(result.message, GenerationResult::SUCCESS_MESSAGE);
        assert_eq!(result.visual, "image");
        assert!((result.duration_secs - 3.0).abs() < 1e-6);

        let path = std::path::PathBuf::from(&result.video_file_path);
        assert!(path.starts_with(out.path()));
        let probed = crate::ffmpeg::probe_video(&path).await.unwrap();
        assert!((probed.duration - 3.0).abs() < 0.25, "duration {}", probed.duration);
        assert_eq!(probed.height, 240);
        assert_eq!(videos_in(out.path()), 1);
    }

    #[tokio::test]
    async fn test_speech_failure_leaves_no_video() {
        let out = tempdir().unwrap();
        let (pipeline, speech) = pipeline(out.path(), None);

        let request = GenerateRequest {
            title: Some("Budget passes".to_string()),
            content: Some("The council passed the budget.".to_string()),
            image_url: None,
        };
        let err = pipeline.generate(request).await.unwrap_err();

        assert!(matches!(err, NewsReelError::Speech(SpeechError::Upstream { status: 500, .. })));
        assert_eq!(speech.spoken.lock().unwrap().as_slice(), ["The council passed the budget."]);
        assert_eq!(videos_in(out.path()), 0);
    }

    #[tokio::test]
    async fn test_headline_requires_news_source() {
        let out = tempdir().unwrap();
        let (pipeline, speech) = pipeline(out.path(), None);

        let err = pipeline.generate_from_headline(true).await.unwrap_err();
        assert!(matches!(err, NewsReelError::Config(ConfigError::MissingKey { ref key }) if key == "news.api_key"));
        assert!(speech.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_headline_narrates_title() {
        let out = tempdir().unwrap();
        let news: Arc<dyn NewsSource> = Arc::new(FixedNews { headline: headline(), article: None });
        let (pipeline, speech) = pipeline(out.path(), Some(news));

        assert!(pipeline.generate_from_headline(true).await.is_err());
        assert_eq!(speech.spoken.lock().unwrap().as_slice(), ["Rover finds ice"]);
    }

    #[tokio::test]
    async fn test_full_headline_narrates_summarized_article() {
        let out = tempdir().unwrap();
        let article = "The rover drilled into the crater floor. \
                       Ice was found below the rover drilling site. \
                       Officials thanked the team."
            .to_string();
        let news: Arc<dyn NewsSource> = Arc::new(FixedNews { headline: headline(), article: Some(article) });
        let (pipeline, speech) = pipeline(out.path(), Some(news));

        assert!(pipeline.generate_from_headline(false).await.is_err());
        let spoken = speech.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert!(spoken[0].contains("rover"));
        assert!(!spoken[0].contains("Officials"));
    }

    #[tokio::test]
    async fn test_scrape_failure_falls_back_to_teaser() {
        let out = tempdir().unwrap();
        let news: Arc<dyn NewsSource> = Arc::new(FixedNews { headline: headline(), article: None });
        let (pipeline, speech) = pipeline(out.path(), Some(news));

        assert!(pipeline.generate_from_headline(false).await.is_err());
        assert_eq!(speech.spoken.lock().unwrap().as_slice(), ["Water ice was found near the pole."]);
    }
}
