use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};

/// Transcription provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TranscriptionProviderConfig {
    /// OpenAI-compatible `/audio/transcriptions` endpoint (OpenAI, Groq,
    /// self-hosted whisper servers).
    WhisperApi {
        api_url: String,
        api_key: Option<String>,
        model: String,
    },
    /// Deepgram `/v1/listen` endpoint.
    Deepgram {
        api_url: String,
        api_key: String,
        model: String,
    },
}

/// Terminology enhancement provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EnhancementProviderConfig {
    /// Chat-completions compatible endpoint (OpenAI, Groq).
    OpenAiChat {
        api_url: String,
        api_key: Option<String>,
        model: String,
    },
    /// Ollama native chat API (self-hosted, fully private).
    Ollama { api_url: String, model: String },
}

/// Translation provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TranslationProviderConfig {
    /// LibreTranslate-compatible `/translate` endpoint.
    Libretranslate {
        api_url: String,
        api_key: Option<String>,
    },
    /// DeepL `/v2/translate` endpoint.
    Deepl { api_url: String, api_key: String },
}

/// Speech synthesis provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SynthesisProviderConfig {
    /// OpenAI-compatible `/audio/speech` endpoint.
    OpenAiSpeech {
        api_url: String,
        api_key: Option<String>,
        model: String,
        voice: String,
    },
    /// ElevenLabs `/v1/text-to-speech/{voice}` endpoint.
    Elevenlabs {
        api_url: String,
        api_key: String,
        voice_id: String,
        model: String,
    },
}

/// Full pipeline configuration: one provider per stage plus the bound
/// on how long any single external call may run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub transcription: TranscriptionProviderConfig,
    pub enhancement: EnhancementProviderConfig,
    pub translation: TranslationProviderConfig,
    pub synthesis: SynthesisProviderConfig,
    pub stage_timeout_secs: u64,
}

impl PipelineConfig {
    /// Load pipeline configuration from environment variables.
    pub fn from_env() -> StageResult<Self> {
        let stage_timeout_secs = std::env::var("CARELINGO_STAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            transcription: Self::transcription_from_env()?,
            enhancement: Self::enhancement_from_env()?,
            translation: Self::translation_from_env()?,
            synthesis: Self::synthesis_from_env()?,
            stage_timeout_secs,
        })
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    fn transcription_from_env() -> StageResult<TranscriptionProviderConfig> {
        let provider = std::env::var("CARELINGO_TRANSCRIPTION_PROVIDER")
            .unwrap_or_else(|_| "whisper-api".to_string());
        Self::transcription_from_name(&provider)
    }

    fn transcription_from_name(provider: &str) -> StageResult<TranscriptionProviderConfig> {
        match provider.to_lowercase().as_str() {
            "whisper-api" => Ok(TranscriptionProviderConfig::WhisperApi {
                api_url: std::env::var("WHISPER_API_URL")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
                api_key: std::env::var("WHISPER_API_KEY").ok(),
                model: std::env::var("WHISPER_MODEL")
                    .unwrap_or_else(|_| "whisper-large-v3".to_string()),
            }),
            "deepgram" => Ok(TranscriptionProviderConfig::Deepgram {
                api_url: std::env::var("DEEPGRAM_API_URL")
                    .unwrap_or_else(|_| "https://api.deepgram.com".to_string()),
                api_key: std::env::var("DEEPGRAM_API_KEY").unwrap_or_default(),
                model: std::env::var("DEEPGRAM_MODEL").unwrap_or_else(|_| "nova-2".to_string()),
            }),
            other => Err(StageError::Config(format!(
                "unknown transcription provider: {other}"
            ))),
        }
    }

    fn enhancement_from_env() -> StageResult<EnhancementProviderConfig> {
        let provider = std::env::var("CARELINGO_ENHANCEMENT_PROVIDER")
            .unwrap_or_else(|_| "openai-chat".to_string());

        match provider.to_lowercase().as_str() {
            "openai-chat" => Ok(EnhancementProviderConfig::OpenAiChat {
                api_url: std::env::var("OPENAI_CHAT_API_URL")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
                api_key: std::env::var("OPENAI_CHAT_API_KEY").ok(),
                model: std::env::var("OPENAI_CHAT_MODEL")
                    .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            }),
            "ollama" => Ok(EnhancementProviderConfig::Ollama {
                api_url: std::env::var("OLLAMA_API_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3".to_string()),
            }),
            other => Err(StageError::Config(format!(
                "unknown enhancement provider: {other}"
            ))),
        }
    }

    fn translation_from_env() -> StageResult<TranslationProviderConfig> {
        let provider = std::env::var("CARELINGO_TRANSLATION_PROVIDER")
            .unwrap_or_else(|_| "libretranslate".to_string());

        match provider.to_lowercase().as_str() {
            "libretranslate" => Ok(TranslationProviderConfig::Libretranslate {
                api_url: std::env::var("LIBRETRANSLATE_API_URL")
                    .unwrap_or_else(|_| "http://localhost:5000".to_string()),
                api_key: std::env::var("LIBRETRANSLATE_API_KEY").ok(),
            }),
            "deepl" => Ok(TranslationProviderConfig::Deepl {
                api_url: std::env::var("DEEPL_API_URL")
                    .unwrap_or_else(|_| "https://api-free.deepl.com".to_string()),
                api_key: std::env::var("DEEPL_API_KEY").unwrap_or_default(),
            }),
            other => Err(StageError::Config(format!(
                "unknown translation provider: {other}"
            ))),
        }
    }

    fn synthesis_from_env() -> StageResult<SynthesisProviderConfig> {
        let provider = std::env::var("CARELINGO_SYNTHESIS_PROVIDER")
            .unwrap_or_else(|_| "openai-speech".to_string());

        match provider.to_lowercase().as_str() {
            "openai-speech" => Ok(SynthesisProviderConfig::OpenAiSpeech {
                api_url: std::env::var("OPENAI_TTS_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                api_key: std::env::var("OPENAI_TTS_API_KEY").ok(),
                model: std::env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
                voice: std::env::var("OPENAI_TTS_VOICE").unwrap_or_else(|_| "alloy".to_string()),
            }),
            "elevenlabs" => Ok(SynthesisProviderConfig::Elevenlabs {
                api_url: std::env::var("ELEVENLABS_API_URL")
                    .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
                api_key: std::env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
                voice_id: std::env::var("ELEVENLABS_VOICE_ID").unwrap_or_default(),
                model: std::env::var("ELEVENLABS_MODEL")
                    .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
            }),
            other => Err(StageError::Config(format!(
                "unknown synthesis provider: {other}"
            ))),
        }
    }
}
