//! Thin wrappers around the `ffmpeg` and `ffprobe` executables.
//!
//! Both tools are blocking processes, so every invocation is moved onto the
//! blocking thread pool with [`tokio::task::spawn_blocking`].

use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde::Deserialize;
use tokio::task;
use tracing::debug;

use crate::error::{CompositionError, Result, VisualError};

/// Stderr lines kept when reporting a failed invocation
const STDERR_TAIL_LINES: usize = 12;

/// Check whether a tool can be executed at all
pub fn check_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Check whether the local ffmpeg build ships the named encoder
pub fn has_encoder(encoder: &str) -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
        .map(|output| {
            output.status.success()
                && String::from_utf8_lossy(&output.stdout)
                    .split_whitespace()
                    .any(|word| word == encoder)
        })
        .unwrap_or(false)
}

/// Run a tool with the given arguments on the blocking pool
pub async fn run(tool: &str, args: Vec<String>) -> Result<Output> {
    debug!(tool, args = %args.join(" "), "Running external tool");

    let mut cmd = Command::new(tool);
    cmd.args(&args).stdin(Stdio::null());

    let output = task::spawn_blocking(move || cmd.output()).await
        .map_err(|e| CompositionError::EncodingFailed {
            reason: format!("Failed to spawn {} process: {}", tool, e),
        })?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CompositionError::EncoderUnavailable {
                tool: tool.to_string(),
            },
            _ => CompositionError::EncodingFailed {
                reason: format!("{} execution failed: {}", tool, e),
            },
        })?;

    Ok(output)
}

/// Last few lines of a process's stderr, for error messages
pub fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream geometry and container duration reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe the first video stream of a media file
pub async fn probe_video(path: &Path) -> Result<ProbeInfo> {
    let path_str = path.display().to_string();
    let args = vec![
        "-v".to_string(), "error".to_string(),
        "-select_streams".to_string(), "v:0".to_string(),
        "-show_entries".to_string(), "stream=width,height,duration:format=duration".to_string(),
        "-of".to_string(), "json".to_string(),
        path_str.clone(),
    ];

    let output = run("ffprobe", args).await?;
    if !output.status.success() {
        return Err(VisualError::ProbeFailed {
            path: path_str,
            reason: stderr_tail(&output),
        }.into());
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
        .map_err(|reason| VisualError::ProbeFailed { path: path_str, reason }.into())
}

/// Parse ffprobe's JSON report; the container duration wins over the stream's
pub fn parse_probe_output(json: &str) -> std::result::Result<ProbeInfo, String> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let stream = parsed.streams.first().ok_or("no video stream")?;
    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err("video stream has no dimensions".to_string()),
    };

    // Fragmented or streamed files report "N/A" for the container
    let duration = [parsed.format.and_then(|f| f.duration), stream.duration.clone()]
        .into_iter()
        .flatten()
        .filter_map(|d| d.trim().parse::<f64>().ok())
        .find(|d| d.is_finite() && *d > 0.0)
        .ok_or("unknown duration")?;

    Ok(ProbeInfo { duration, width, height })
}
