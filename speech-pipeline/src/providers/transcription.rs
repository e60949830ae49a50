use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;

use crate::config::TranscriptionProviderConfig;
use crate::error::{StageError, StageResult};
use crate::language::LanguageCode;
use crate::providers::{http_client, TranscriptionProvider, TranscriptOutcome};

/// OpenAI-compatible whisper transcription client. The same wire shape
/// is served by OpenAI, Groq, and self-hosted whisper servers.
pub struct WhisperApiProvider {
    api_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

/// Response shape of `response_format=verbose_json`, which carries the
/// detected language alongside the text.
#[derive(Debug, Deserialize)]
struct WhisperVerboseResponse {
    text: String,
    language: Option<String>,
}

impl WhisperApiProvider {
    pub fn new(config: &TranscriptionProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            TranscriptionProviderConfig::WhisperApi {
                api_url,
                api_key,
                model,
            } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                model: model.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "whisper-api provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

fn outcome_from_verbose(response: WhisperVerboseResponse) -> TranscriptOutcome {
    TranscriptOutcome {
        text: response.text.trim().to_string(),
        detected_language: response
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperApiProvider {
    async fn transcribe(
        &self,
        audio_wav: &[u8],
        hint: Option<LanguageCode>,
    ) -> StageResult<TranscriptOutcome> {
        let part = multipart::Part::bytes(audio_wav.to_vec())
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| StageError::TranscriptionUnavailable(e.to_string()))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        if let Some(language) = hint {
            // Whisper takes the primary subtag only ("zh", not "zh-CN").
            let primary = language.as_code().split('-').next().unwrap_or("en");
            form = form.text("language", primary.to_string());
        }

        let mut request = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StageError::TranscriptionUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::TranscriptionRejected(format!(
                "{status}: {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::TranscriptionUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let parsed: WhisperVerboseResponse = response
            .json()
            .await
            .map_err(|e| StageError::TranscriptionUnavailable(format!("malformed response: {e}")))?;

        let outcome = outcome_from_verbose(parsed);
        debug!(
            chars = outcome.text.len(),
            detected = outcome.detected_language.as_deref().unwrap_or("-"),
            "whisper transcription complete"
        );
        Ok(outcome)
    }
}

/// Deepgram speech-to-text client.
pub struct DeepgramProvider {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DeepgramResponse {
    results: Option<DeepgramResults>,
}

#[derive(Debug, Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(Debug, Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
    detected_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

impl DeepgramProvider {
    pub fn new(config: &TranscriptionProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            TranscriptionProviderConfig::Deepgram {
                api_url,
                api_key,
                model,
            } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
                model: model.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "deepgram provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

fn outcome_from_deepgram(response: DeepgramResponse) -> StageResult<TranscriptOutcome> {
    let channel = response
        .results
        .and_then(|r| r.channels.into_iter().next())
        .ok_or_else(|| {
            StageError::TranscriptionRejected("no transcription channel returned".to_string())
        })?;

    let detected_language = channel.detected_language.clone();
    let alternative = channel.alternatives.into_iter().next().ok_or_else(|| {
        StageError::TranscriptionRejected("no transcription hypothesis returned".to_string())
    })?;

    Ok(TranscriptOutcome {
        text: alternative.transcript.trim().to_string(),
        detected_language,
    })
}

#[async_trait]
impl TranscriptionProvider for DeepgramProvider {
    async fn transcribe(
        &self,
        audio_wav: &[u8],
        hint: Option<LanguageCode>,
    ) -> StageResult<TranscriptOutcome> {
        let mut query: Vec<(&str, String)> = vec![("model", self.model.clone())];
        match hint {
            Some(language) => {
                let primary = language.as_code().split('-').next().unwrap_or("en");
                query.push(("language", primary.to_string()));
            }
            None => query.push(("detect_language", "true".to_string())),
        }

        let response = self
            .client
            .post(format!("{}/v1/listen", self.api_url))
            .query(&query)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(audio_wav.to_vec())
            .send()
            .await
            .map_err(|e| StageError::TranscriptionUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::TranscriptionRejected(format!(
                "{status}: {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::TranscriptionUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let parsed: DeepgramResponse = response
            .json()
            .await
            .map_err(|e| StageError::TranscriptionUnavailable(format!("malformed response: {e}")))?;

        outcome_from_deepgram(parsed)
    }
}
