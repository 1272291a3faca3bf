use std::path::{Path, PathBuf};

use crate::composition::plan::AlignmentPlan;
use crate::visual::{VideoParams, VisualSource};

/// Argument list for the single ffmpeg invocation that muxes one job
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    visual: VisualSource,
    audio: PathBuf,
    output: PathBuf,
    plan: AlignmentPlan,
    params: VideoParams,
    target_height: u32,
    caption_filter: Option<String>,
}

impl FfmpegCommand {
    pub fn new(
        visual: &VisualSource,
        audio: &Path,
        output: &Path,
        plan: &AlignmentPlan,
        params: &VideoParams,
        target_height: u32,
    ) -> Self {
        Self {
            visual: visual.clone(),
            audio: audio.to_path_buf(),
            output: output.to_path_buf(),
            plan: plan.clone(),
            params: params.clone(),
            target_height,
            caption_filter: None,
        }
    }

    /// Append a `drawtext` filter after scaling
    pub fn with_caption_filter(mut self, filter: String) -> Self {
        self.caption_filter = Some(filter);
        self
    }

    /// The video filter chain: scale to the target height with an even width
    pub fn video_filter(&self) -> String {
        let mut filters = vec![
            format!("scale=-2:{}", self.target_height),
            "setsar=1".to_string(),
        ];
        if let Some(caption) = &self.caption_filter {
            filters.push(caption.clone());
        }
        filters.push(format!("format={}", self.params.pixel_format));
        filters.join(",")
    }

    pub fn args(&self) -> Vec<String> {
        let fps = format_number(self.params.fps);
        let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        match &self.visual {
            VisualSource::StillImage { path, .. } => {
                args.extend(["-loop".to_string(), "1".to_string()]);
                args.extend(["-framerate".to_string(), fps.clone()]);
                args.extend(["-i".to_string(), path.display().to_string()]);
            }
            VisualSource::BackgroundVideo { path, .. } => {
                if self.plan.needs_loop() {
                    args.extend(["-stream_loop".to_string(), self.plan.visual_loops.to_string()]);
                }
                args.extend(["-i".to_string(), path.display().to_string()]);
            }
        }

        args.extend(["-i".to_string(), self.audio.display().to_string()]);
        args.extend(["-map".to_string(), "0:v:0".to_string()]);
        args.extend(["-map".to_string(), "1:a:0".to_string()]);
        args.extend(["-vf".to_string(), self.video_filter()]);

        args.extend(["-c:v".to_string(), self.params.codec.clone()]);
        if matches!(self.visual, VisualSource::StillImage { .. }) && self.params.codec == "libx264" {
            args.extend(["-tune".to_string(), "stillimage".to_string()]);
        }
        args.extend(["-crf".to_string(), self.params.crf().to_string()]);
        args.extend(["-r".to_string(), fps]);
        args.extend(["-c:a".to_string(), self.params.audio_codec.clone()]);
        args.extend(["-b:a".to_string(), "192k".to_string()]);
        args.extend(["-t".to_string(), format!("{:.3}", self.plan.output_duration)]);
        args.extend(["-movflags".to_string(), "+faststart".to_string()]);
        args.push(self.output.display().to_string());

        args
    }
}

/// Render 24.0 as "24" and 29.97 as "29.97"
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
