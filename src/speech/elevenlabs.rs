use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::config::SpeechConfig;
use crate::error::{ConfigError, Result, SpeechError};
use crate::speech::{text::prepare_text_for_tts, SpeechSynthesizer};

/// Upstream error bodies longer than this are cut before being logged
const MAX_ERROR_BODY: usize = 300;

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech client
pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
}

impl std::fmt::Debug for ElevenLabsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsClient")
            .field("base_url", &self.base_url)
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl ElevenLabsClient {
    /// Build a client; fails when no API key is configured
    pub fn new(client: Client, config: &SpeechConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey { key: "speech.api_key".to_string() })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    #[instrument(level = "info", skip_all, fields(voice = %self.voice_id))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let text = prepare_text_for_tts(text);
        if text.is_empty() {
            return Err(SpeechError::EmptyText.into());
        }

        let t0 = Instant::now();
        let response = self.client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&SynthesisRequest { text: &text, model_id: &self.model_id })
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            error!(status = status.as_u16(), %body, "TTS request rejected");
            return Err(SpeechError::Upstream { status: status.as_u16(), body }.into());
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio.into());
        }

        info!(
            chars = text.chars().count(),
            bytes = audio.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Synthesized narration"
        );
        Ok(audio.to_vec())
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
