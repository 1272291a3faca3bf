use crate::error::{CompositionError, Result};
use crate::visual::VisualSource;

/// How the visual track is stretched over the narration
///
/// The narration length always wins: the output is cut to exactly
/// `output_duration`, and a background video is repeated until its combined
/// length covers that much.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPlan {
    /// Final video length in seconds (the narration length)
    pub output_duration: f64,

    /// Extra passes of the background video after the first (ffmpeg `-stream_loop`)
    pub visual_loops: u32,

    /// Native length of the background video; `None` for stills
    pub visual_duration: Option<f64>,
}

impl AlignmentPlan {
    /// Plan the alignment of `visual` to a narration of `audio_duration` seconds
    pub fn new(visual: &VisualSource, audio_duration: f64) -> Result<Self> {
        if !(audio_duration.is_finite() && audio_duration > 0.0) {
            return Err(CompositionError::InvalidParameters {
                details: format!("narration duration must be positive, got {}", audio_duration)
            }.into());
        }

        let (visual_loops, visual_duration) = match visual.duration() {
            None => (0, None),
            Some(clip) if clip.is_finite() && clip > 0.0 => {
                let passes = (audio_duration / clip).ceil().max(1.0);
                (passes as u32 - 1, Some(clip))
            }
            Some(clip) => {
                return Err(CompositionError::InvalidParameters {
                    details: format!("background video duration must be positive, got {}", clip)
                }.into());
            }
        };

        Ok(Self {
            output_duration: audio_duration,
            visual_loops,
            visual_duration,
        })
    }

    /// Length of visual material available before trimming
    pub fn covered_duration(&self) -> f64 {
        match self.visual_duration {
            Some(clip) => clip * (self.visual_loops as f64 + 1.0),
            None => self.output_duration,
        }
    }

    /// Whether the background video has to be repeated
    pub fn needs_loop(&self) -> bool {
        self.visual_loops > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn video(duration: f64) -> VisualSource {
        VisualSource::BackgroundVideo {
            path: PathBuf::from("loop.mp4"),
            duration,
            width: 1280,
            height: 720,
        }
    }

    fn still() -> VisualSource {
        VisualSource::StillImage {
            path: PathBuf::from("still.png"),
            width: 1080,
            height: 720,
        }
    }

    #[test]
    fn test_still_matches_narration() {
        let plan = AlignmentPlan::new(&still(), 12.34).unwrap();
        assert_eq!(plan.output_duration, 12.34);
        assert_eq!(plan.visual_loops, 0);
        assert_eq!(plan.covered_duration(), 12.34);
        assert!(!plan.needs_loop());
    }

    #[test]
    fn test_short_video_loops_to_cover_narration() {
        for (clip, narration) in [(4.0, 10.0), (3.3, 9.9), (2.0, 8.0), (0.7, 31.0), (5.0, 5.01)] {
            let plan = AlignmentPlan::new(&video(clip), narration).unwrap();
            assert!(plan.needs_loop());
            assert!(plan.covered_duration() >= narration, "{clip}s clip does not cover {narration}s");
            // One fewer pass would fall short
            assert!(clip * plan.visual_loops as f64 <= narration);
            assert_eq!(plan.output_duration, narration);
        }
    }

    #[test]
    fn test_long_video_is_trimmed_not_looped() {
        let plan = AlignmentPlan::new(&video(60.0), 12.0).unwrap();
        assert_eq!(plan.visual_loops, 0);
        assert_eq!(plan.output_duration, 12.0);
        assert!(plan.covered_duration() >= 12.0);
    }

    #[test]
    fn test_exact_multiple() {
        let plan = AlignmentPlan::new(&video(4.0), 8.0).unwrap();
        assert_eq!(plan.visual_loops, 1);
        assert_eq!(plan.covered_duration(), 8.0);
    }

    #[test]
    fn test_invalid_durations() {
        assert!(AlignmentPlan::new(&still(), 0.0).is_err());
        assert!(AlignmentPlan::new(&still(), f64::NAN).is_err());
        assert!(AlignmentPlan::new(&video(0.0), 5.0).is_err());
    }
}
