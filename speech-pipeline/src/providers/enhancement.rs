use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::EnhancementProviderConfig;
use crate::error::{StageError, StageResult};
use crate::language::LanguageCode;
use crate::medical_terms;
use crate::providers::{http_client, EnhancementProvider};

/// Generation settings for the correction call: low temperature so the
/// model corrects rather than rewrites, capped output length.
const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 1024;

fn system_instruction(language: Option<LanguageCode>) -> String {
    let mut instruction = String::from(
        "You are a clinical transcription expert. Correct and enhance medical terminology \
         in the user's text while preserving the original meaning. Do not translate; keep \
         the text in its original language and return only the corrected text.",
    );
    if let Some(language) = language {
        instruction.push_str(&format!(" The text is in {}.", language.english_name()));
    }
    instruction
}

/// Chat-completions compatible enhancement client (OpenAI, Groq).
pub struct OpenAiChatProvider {
    api_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

fn content_from_chat(response: ChatCompletionResponse) -> StageResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| StageError::EnhancementUnavailable("no completion returned".to_string()))
}

impl OpenAiChatProvider {
    pub fn new(config: &EnhancementProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            EnhancementProviderConfig::OpenAiChat {
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
                "openai-chat provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl EnhancementProvider for OpenAiChatProvider {
    async fn enhance(&self, text: &str, language: Option<LanguageCode>) -> StageResult<String> {
        let prepared = medical_terms::prepare(text, language);

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_instruction(language)},
                {"role": "user", "content": prepared},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StageError::EnhancementUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::EnhancementUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| StageError::EnhancementUnavailable(format!("malformed response: {e}")))?;

        let corrected = content_from_chat(parsed)?;
        debug!(chars = corrected.len(), "terminology enhancement complete");
        Ok(corrected)
    }
}

/// Ollama native chat client (self-hosted, fully private).
pub struct OllamaProvider {
    api_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaProvider {
    pub fn new(config: &EnhancementProviderConfig, timeout: Duration) -> StageResult<Self> {
        match config {
            EnhancementProviderConfig::Ollama { api_url, model } => Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                model: model.clone(),
                client: http_client(timeout)?,
            }),
            other => Err(StageError::Config(format!(
                "ollama provider built from mismatched config: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl EnhancementProvider for OllamaProvider {
    async fn enhance(&self, text: &str, language: Option<LanguageCode>) -> StageResult<String> {
        let prepared = medical_terms::prepare(text, language);

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_instruction(language)},
                {"role": "user", "content": prepared},
            ],
            "stream": false,
            "options": {"temperature": TEMPERATURE},
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::EnhancementUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::EnhancementUnavailable(format!(
                "{status}: {body}"
            )));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| StageError::EnhancementUnavailable(format!("malformed response: {e}")))?;

        Ok(parsed.message.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_completion_response() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": " Corrected text. "}}
            ]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(content_from_chat(parsed).unwrap(), "Corrected text.");
    }

    #[test]
    fn empty_choices_is_unavailable() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            content_from_chat(parsed),
            Err(StageError::EnhancementUnavailable(_))
        ));
    }

    #[test]
    fn parses_ollama_response() {
        let raw = r#"{"model":"llama3","message":{"role":"assistant","content":"fixed"},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message.content, "fixed");
    }

    #[test]
    fn instruction_names_the_language() {
        let instruction = system_instruction(Some(LanguageCode::Spanish));
        assert!(instruction.contains("The text is in Spanish."));
        assert!(instruction.contains("Do not translate"));

        let instruction = system_instruction(None);
        assert!(!instruction.contains("The text is in"));
    }
}
