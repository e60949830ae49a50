pub mod enhancement;
pub mod synthesis;
pub mod transcription;
pub mod translation;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{
    EnhancementProviderConfig, SynthesisProviderConfig, TranscriptionProviderConfig,
    TranslationProviderConfig,
};
use crate::error::StageResult;
use crate::language::LanguageCode;

/// Normalized transcription output, independent of provider response
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptOutcome {
    pub text: String,
    /// Language the service reported hearing, verbatim as the service
    /// spelled it ("es", "spanish", ...).
    pub detected_language: Option<String>,
}

/// Converts one recorded utterance into plain text.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(
        &self,
        audio_wav: &[u8],
        hint: Option<LanguageCode>,
    ) -> StageResult<TranscriptOutcome>;
}

/// Corrects medical terminology in a transcript without translating it.
#[async_trait]
pub trait EnhancementProvider: Send + Sync {
    async fn enhance(&self, text: &str, language: Option<LanguageCode>) -> StageResult<String>;
}

/// Translates text into a supported target language.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageCode>,
        target: LanguageCode,
    ) -> StageResult<String>;
}

/// Renders text as spoken audio in a given language.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    async fn synthesize(&self, text: &str, language: LanguageCode) -> StageResult<Vec<u8>>;
}

/// Create a transcription provider from configuration.
pub fn create_transcription_provider(
    config: &TranscriptionProviderConfig,
    timeout: Duration,
) -> StageResult<Box<dyn TranscriptionProvider>> {
    match config {
        TranscriptionProviderConfig::WhisperApi { .. } => Ok(Box::new(
            transcription::WhisperApiProvider::new(config, timeout)?,
        )),
        TranscriptionProviderConfig::Deepgram { .. } => Ok(Box::new(
            transcription::DeepgramProvider::new(config, timeout)?,
        )),
    }
}

/// Create an enhancement provider from configuration.
pub fn create_enhancement_provider(
    config: &EnhancementProviderConfig,
    timeout: Duration,
) -> StageResult<Box<dyn EnhancementProvider>> {
    match config {
        EnhancementProviderConfig::OpenAiChat { .. } => Ok(Box::new(
            enhancement::OpenAiChatProvider::new(config, timeout)?,
        )),
        EnhancementProviderConfig::Ollama { .. } => {
            Ok(Box::new(enhancement::OllamaProvider::new(config, timeout)?))
        }
    }
}

/// Create a translation provider from configuration.
pub fn create_translation_provider(
    config: &TranslationProviderConfig,
    timeout: Duration,
) -> StageResult<Box<dyn TranslationProvider>> {
    match config {
        TranslationProviderConfig::Libretranslate { .. } => Ok(Box::new(
            translation::LibreTranslateProvider::new(config, timeout)?,
        )),
        TranslationProviderConfig::Deepl { .. } => {
            Ok(Box::new(translation::DeepLProvider::new(config, timeout)?))
        }
    }
}

/// Create a synthesis provider from configuration.
pub fn create_synthesis_provider(
    config: &SynthesisProviderConfig,
    timeout: Duration,
) -> StageResult<Box<dyn SynthesisProvider>> {
    match config {
        SynthesisProviderConfig::OpenAiSpeech { .. } => Ok(Box::new(
            synthesis::OpenAiSpeechProvider::new(config, timeout)?,
        )),
        SynthesisProviderConfig::Elevenlabs { .. } => Ok(Box::new(
            synthesis::ElevenLabsProvider::new(config, timeout)?,
        )),
    }
}

pub(crate) fn http_client(timeout: Duration) -> StageResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| crate::error::StageError::Config(format!("failed to build HTTP client: {e}")))
}
