use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::audio::types::{AudioFormat, AudioInfo};
use crate::error::{AudioError, Result};

/// Narration probe supporting the formats a TTS API may return
pub struct AudioLoader;

impl AudioLoader {
    /// Probe an audio file and return its duration and layout
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
        let path = path.as_ref();
        let extension = Self::detect_format(path).unwrap_or_default();

        let info = match extension.as_str() {
            "wav" => Self::probe_wav(path)?,
            "mp3" | "flac" | "ogg" | "m4a" | "aac" => Self::probe_with_symphonia(path)?,
            _ => return Err(AudioError::UnsupportedFormat {
                format: extension
            }.into()),
        };

        if !(info.duration.is_finite() && info.duration > 0.0) {
            return Err(AudioError::InvalidParameters {
                details: format!("{} has no measurable duration", path.display())
            }.into());
        }

        debug!(path = %path.display(), duration = info.duration,
               sample_rate = info.sample_rate, channels = info.channels, "Probed audio");
        Ok(info)
    }

    /// Probe WAV files using the hound crate (most reliable for WAV)
    fn probe_wav(path: &Path) -> Result<AudioInfo> {
        let reader = hound::WavReader::open(path)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string()
            })?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(AudioError::InvalidParameters {
                details: "WAV header reports a zero sample rate".to_string()
            }.into());
        }

        // `duration` counts frames, independent of channel count
        let duration = reader.duration() as f64 / spec.sample_rate as f64;

        Ok(AudioInfo {
            duration,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            file_path: path.to_path_buf(),
            format: AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(spec.bits_per_sample),
                compression: None,
            },
        })
    }

    /// Probe compressed formats with Symphonia, reading packet headers only
    pub(crate) fn probe_with_symphonia(path: &Path) -> Result<AudioInfo> {
        let load_failed = || AudioError::LoadFailed {
            path: path.display().to_string()
        };

        let file = File::open(path).map_err(|_| load_failed())?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a probe hint using the file extension
        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|_| load_failed())?;

        let mut format = probed.format;

        // Find the first audio track with a known (decodable) codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(load_failed)?;

        let track_id = track.id;
        let params = track.codec_params.clone();

        let sample_rate = params.sample_rate
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No sample rate found".to_string()
            })?;
        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

        let to_seconds = |ticks: u64| -> f64 {
            match params.time_base {
                Some(tb) => {
                    let time = tb.calc_time(ticks);
                    time.seconds as f64 + time.frac
                }
                None => ticks as f64 / sample_rate as f64,
            }
        };

        let duration = match params.n_frames {
            Some(frames) if frames > 0 => to_seconds(frames),
            _ => {
                // No frame count in the header (common for CBR MP3): add up packet durations
                let mut ticks = 0u64;
                loop {
                    match format.next_packet() {
                        Ok(packet) if packet.track_id() == track_id => ticks += packet.dur,
                        Ok(_) => continue,
                        Err(SymphoniaError::ResetRequired) => continue,
                        Err(_) => break,
                    }
                }
                to_seconds(ticks)
            }
        };

        Ok(AudioInfo {
            duration,
            sample_rate,
            channels,
            file_path: path.to_path_buf(),
            format: AudioFormat {
                extension: Self::detect_format(path).unwrap_or_else(|| "unknown".to_string()),
                bit_depth: params.bits_per_sample.map(|b| b as u16),
                compression: Some(format!("{:?}", params.codec)),
            },
        })
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_tone(path: &Path, seconds: f64, sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (seconds * sample_rate as f64) as u32;
        for i in 0..frames {
            let t = i as f64 / sample_rate as f64;
            let sample = ((t * 440.0 * std::f64::consts::TAU).sin() * 8000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioLoader::detect_format("narration.wav"), Some("wav".to_string()));
        assert_eq!(AudioLoader::detect_format("narration.MP3"), Some("mp3".to_string()));
        assert_eq!(AudioLoader::detect_format("narration"), None);
        assert!(AudioLoader::is_format_supported("FLAC"));
        assert!(!AudioLoader::is_format_supported("xyz"));
    }

    #[test]
    fn test_probe_wav_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 1.5, 16000, 2);

        let info = AudioLoader::probe(&path).unwrap();
        assert!((info.duration - 1.5).abs() < 1e-6);
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 16000);
    }

    #[test]
    fn test_symphonia_agrees_with_hound() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 2.0, 22050, 1);

        let info = AudioLoader::probe_with_symphonia(&path).unwrap();
        assert!((info.duration - 2.0).abs() < 0.01);
        assert_eq!(info.sample_rate, 22050);
    }

    #[test]
    fn test_unsupported_format() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("narration.xyz");
        File::create(&file_path).unwrap().write_all(b"dummy content").unwrap();

        let result = AudioLoader::probe(&file_path);
        if let Err(crate::error::NewsReelError::Audio(AudioError::UnsupportedFormat { format })) = result {
            assert_eq!(format, "xyz");
        } else {
            panic!("Expected UnsupportedFormat error");
        }
    }

    #[test]
    fn test_garbage_mp3_fails_to_load() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("narration.mp3");
        File::create(&file_path).unwrap().write_all(b"{\"detail\":\"quota exceeded\"}").unwrap();

        assert!(AudioLoader::probe(&file_path).is_err());
    }

    #[test]
    fn test_empty_wav_has_no_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_tone(&path, 0.0, 16000, 1);

        assert!(AudioLoader::probe(&path).is_err());
    }
}
