//! # News-Reel
//!
//! Turn news text into short narrated MP4 clips.
//!
//! A job takes narration text (supplied by the caller, or fetched from a
//! headline API and the article behind it), synthesizes speech for it, puts a
//! still image or looping background video behind the narration, and encodes
//! the result with ffmpeg.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use news_reel::{config::Config, job::GenerateRequest, pipeline::Pipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default().with_api_keys(None, Some("elevenlabs-key".to_string()));
//! let pipeline = Pipeline::from_config(config)?;
//!
//! let result = pipeline
//!     .generate(GenerateRequest {
//!         title: Some("Council passes budget".to_string()),
//!         content: Some("The city council approved the transit budget on Monday.".to_string()),
//!         image_url: None,
//!     })
//!     .await?;
//! println!("{}", result.video_file_path);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`source`] - Headline and article retrieval
//! - [`summarize`] - Extractive summaries of article text
//! - [`speech`] - Text-to-speech synthesis
//! - [`audio`] - Narration duration probing
//! - [`visual`] - Still images and background videos
//! - [`composition`] - Alignment and MP4 encoding
//! - [`pipeline`] - Orchestration of one job
//! - [`server`] - HTTP endpoints
//! - [`config`] - Configuration management

pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod job;
pub mod pipeline;
pub mod server;
pub mod source;
pub mod speech;
pub mod summarize;
pub mod visual;
pub mod workspace;

// Re-export commonly used types for convenience
pub use crate::{
    composition::CompositionEngine,
    config::Config,
    error::{NewsReelError, Result},
    job::{GenerateRequest, GenerationResult, MediaJob},
    pipeline::Pipeline,
    source::NewsSource,
    speech::SpeechSynthesizer,
};
