use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    audio::AudioInfo,
    composition::{caption::Caption, command::FfmpegCommand, plan::AlignmentPlan},
    config::{CompositionConfig, Config},
    error::{CompositionError, Result},
    ffmpeg,
    visual::{VideoParams, VisualSource},
};

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub file_size: u64,
    pub visual_loops: u32,
}

/// Muxes a visual and a narration track into an MP4
///
/// The engine follows a clear pipeline:
/// 1. Alignment - Decide how the visual is held or looped to the narration length
/// 2. Caption - Optionally write the caption text for `drawtext`
/// 3. Encoding - Run ffmpeg once, scaling, captioning and trimming in a single pass
/// 4. Verification - Confirm a non-empty file was written
pub struct CompositionEngine {
    params: VideoParams,
    target_height: u32,
    composition: CompositionConfig,
}

impl CompositionEngine {
    /// Create a new composition engine with the given configuration
    pub fn new(config: &Config) -> Self {
        Self {
            params: config.video.clone(),
            target_height: config.visual.target_height,
            composition: config.composition.clone(),
        }
    }

    /// Caption for `title`, if captions are enabled
    pub fn caption_for(&self, title: &str) -> Option<Caption> {
        Caption::from_title(title, &self.composition)
    }

    /// Whether ffmpeg and the configured encoder are installed
    pub fn check_encoder_available(&self) -> bool {
        ffmpeg::check_available("ffmpeg") && ffmpeg::has_encoder(&self.params.codec)
    }

    /// Compose `visual` under `audio` into `output_path`
    ///
    /// `scratch_dir` receives intermediate files (the caption text). The output
    /// file is not removed on failure; the caller owns it.
    pub async fn compose(
        &self,
        visual: &VisualSource,
        audio: &AudioInfo,
        caption: Option<&Caption>,
        scratch_dir: &Path,
        output_path: &Path,
    ) -> Result<EncodedVideo> {
        info!("🎬 Composing {} visual with {:.2}s narration", visual.kind(), audio.duration);

        // Step 1: Alignment
        let plan = AlignmentPlan::new(visual, audio.duration)?;
        if plan.needs_loop() {
            info!(
                clip_secs = plan.visual_duration.unwrap_or_default(),
                loops = plan.visual_loops,
                covered_secs = plan.covered_duration(),
                "Looping background video to cover narration"
            );
        }

        // Step 2: Caption
        let mut command = FfmpegCommand::new(
            visual,
            &audio.file_path,
            output_path,
            &plan,
            &self.params,
            self.target_height,
        );
        if let Some(caption) = caption {
            let text_file = caption.write_to(scratch_dir)?;
            debug!(text = %caption.text, "Adding caption overlay");
            command = command.with_caption_filter(caption.drawtext_filter(&text_file));
        }

        // Step 3: Encoding
        let output = ffmpeg::run("ffmpeg", command.args()).await?;
        if !output.status.success() {
            let stderr = ffmpeg::stderr_tail(&output);
            warn!(status = ?output.status.code(), %stderr, "ffmpeg failed");
            return Err(CompositionError::EncodingFailed {
                reason: format!("ffmpeg exited with {}: {}", output.status, stderr),
            }.into());
        }

        // Step 4: Verification
        let file_size = std::fs::metadata(output_path)
            .map(|m| m.len())
            .map_err(|e| CompositionError::OutputFailed {
                reason: format!("{} was not written: {}", output_path.display(), e),
            })?;
        if file_size == 0 {
            return Err(CompositionError::OutputFailed {
                reason: format!("{} is empty", output_path.display()),
            }.into());
        }

        info!("   ✅ Output generation complete:");
        info!("      File saved: {:?}", output_path);
        info!("      Duration: {:.1}s", plan.output_duration);
        info!("      File size: {:.1} MB", file_size as f64 / 1024.0 / 1024.0);

        Ok(EncodedVideo {
            path: output_path.to_path_buf(),
            duration: plan.output_duration,
            file_size,
            visual_loops: plan.visual_loops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;
    use tempfile::tempdir;

    fn narration(duration: f64) -> AudioInfo {
        AudioInfo {
            duration,
            sample_rate: 44100,
            channels: 1,
            file_path: PathBuf::from("narration.mp3"),
            format: AudioFormat {
                extension: "mp3".to_string(),
                bit_depth: None,
                compression: None,
            },
        }
    }

    #[tokio::test]
    async fn test_rejects_zero_length_narration() {
        let engine = CompositionEngine::new(&Config::default());
        let dir = tempdir().unwrap();
        let visual = VisualSource::StillImage {
            path: dir.path().join("still.png"),
            width: 1080,
            height: 720,
        };

        let result = engine
            .compose(&visual, &narration(0.0), None, dir.path(), &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(
            result,
            Err(crate::error::NewsReelError::Composition(CompositionError::InvalidParameters { .. }))
        ));
        assert!(!dir.path().join("out.mp4").exists());
    }

    fn encoder_ready(engine: &CompositionEngine) -> bool {
        engine.check_encoder_available() && ffmpeg::check_available("ffprobe")
    }

    fn write_wav(path: &Path, seconds: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..(seconds * 16000.0) as usize {
            let t = i as f32 / 16000.0;
            writer.write_sample(((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn test_still_image_output_matches_narration() {
        let engine = CompositionEngine::new(&Config::default());
        if !encoder_ready(&engine) {
            eprintln!("skipping: ffmpeg with libx264 not available");
            return;
        }

        let dir = tempdir().unwrap();
        let still = dir.path().join("still.png");
        image::RgbImage::from_pixel(320, 240, image::Rgb([20, 40, 90])).save(&still).unwrap();
        let wav = dir.path().join("narration.wav");
        write_wav(&wav, 2.5);

        let audio = crate::audio::AudioLoader::probe(&wav).unwrap();
        let visual = VisualSource::StillImage { path: still, width: 320, height: 240 };
        let output = dir.path().join("out.mp4");

        let encoded = engine.compose(&visual, &audio, None, dir.path(), &output).await.unwrap();
        assert!(encoded.file_size > 0);
        assert_eq!(encoded.visual_loops, 0);

        let probed = ffmpeg::probe_video(&output).await.unwrap();
        assert!((probed.duration - 2.5).abs() < 0.25, "duration {}", probed.duration);
    }

    #[test]
    fn test_caption_follows_config() {
        let mut config = Config::default();
        let engine = CompositionEngine::new(&config);
        assert!(engine.caption_for("Headline").is_none());

        config.composition.caption = true;
        let engine = CompositionEngine::new(&config);
        assert_eq!(engine.caption_for("Headline").unwrap().text, "Headline");
    }
}
