use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::SynthesisProviderConfig;
use crate::error::{StageError, StageResult};
use crate::language::LanguageCode;
use crate::providers::{http_client, SynthesisProvider};

/// OpenAI-compatible `/audio/speech` client. Voices are multilingual;
/// the spoken language follows the input text. Output is mp3.
pub struct OpenAiSpeechProvider {
    api_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
    client: reqwest::Client,
}

impl OpenAiSpeechProvider {
    pub fn new(config: &SynthesisProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            SynthesisProviderConfig::OpenAiSpeech {
                api_url,
                api_key,
                model,
                voice,
            } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                model: model.clone(),
                voice: voice.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "openai-speech provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl SynthesisProvider for OpenAiSpeechProvider {
    async fn synthesize(&self, text: &str, language: LanguageCode) -> StageResult<Vec<u8>> {
        let body = json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });

        let mut request = self
            .client
            .post(format!("{}/audio/speech", self.api_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StageError::SynthesisUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::SynthesisUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| StageError::SynthesisUnavailable(e.to_string()))?;

        debug!(
            bytes = audio.len(),
            language = %language,
            "speech synthesis complete"
        );
        Ok(audio.to_vec())
    }
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsProvider {
    api_url: String,
    api_key: String,
    voice_id: String,
    model: String,
    client: reqwest::Client,
}

impl ElevenLabsProvider {
    pub fn new(config: &SynthesisProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            SynthesisProviderConfig::Elevenlabs {
                api_url,
                api_key,
                voice_id,
                model,
            } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                voice_id: voice_id.clone(),
                model: model.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "elevenlabs provider built from mismatched config: {other:?}"
            ))),
        }
    }

    /// Monolingual models only ship an English voice; multilingual
    /// models cover the whole supported set.
    fn supports(&self, language: LanguageCode) -> bool {
        if self.model.starts_with("eleven_monolingual") {
            return language == LanguageCode::English;
        }
        true
    }
}

#[async_trait]
impl SynthesisProvider for ElevenLabsProvider {
    async fn synthesize(&self, text: &str, language: LanguageCode) -> StageResult<Vec<u8>> {
        if !self.supports(language) {
            return Err(StageError::UnsupportedLanguage(
                language.as_code().to_string(),
            ));
        }

        let body = json!({
            "text": text,
            "model_id": self.model,
        });

        let response = self
            .client
            .post(format!(
                "{}/v1/text-to-speech/{}",
                self.api_url, self.voice_id
            ))
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::SynthesisUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::SynthesisUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| StageError::SynthesisUnavailable(e.to_string()))?;
        Ok(audio.to_vec())
    }
}
