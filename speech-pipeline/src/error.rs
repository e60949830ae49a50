use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use secure_store::StoreError;

/// Stage-level failures. The string payloads carry provider detail for
/// logging; only the classified [`FailureKind`] ever reaches a caller.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("transcription service unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("audio rejected by transcription service: {0}")]
    TranscriptionRejected(String),

    #[error("enhancement service unavailable: {0}")]
    EnhancementUnavailable(String),

    #[error("translation service unavailable: {0}")]
    TranslationUnavailable(String),

    #[error("speech synthesis service unavailable: {0}")]
    SynthesisUnavailable(String),

    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("artifact payload is not valid UTF-8 text")]
    ArtifactEncoding,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StageResult<T> = Result<T, StageError>;

/// Pipeline stage identity, used when reporting where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Validation,
    Transcription,
    Enhancement,
    Translation,
    Synthesis,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Validation => "validation",
            StageKind::Transcription => "transcription",
            StageKind::Enhancement => "enhancement",
            StageKind::Translation => "translation",
            StageKind::Synthesis => "synthesis",
        }
    }
}

/// Caller-facing error classification. Raw provider detail is logged by
/// the orchestrator and never carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    KeyUnavailable,
    DecryptionFailed,
    TranscriptionUnavailable,
    TranscriptionRejected,
    TranslationUnavailable,
    UnsupportedLanguage,
    SynthesisUnavailable,
    Internal,
}

impl StageError {
    /// Collapse a stage error into its caller-facing classification.
    pub fn classify(&self) -> FailureKind {
        match self {
            StageError::TranscriptionUnavailable(_) => FailureKind::TranscriptionUnavailable,
            StageError::TranscriptionRejected(_) => FailureKind::TranscriptionRejected,
            StageError::TranslationUnavailable(_) => FailureKind::TranslationUnavailable,
            StageError::SynthesisUnavailable(_) => FailureKind::SynthesisUnavailable,
            StageError::UnsupportedLanguage(_) => FailureKind::UnsupportedLanguage,
            StageError::Store(StoreError::KeyUnavailable | StoreError::KeyRequired) => {
                FailureKind::KeyUnavailable
            }
            StageError::Store(StoreError::DecryptionFailed(_)) => FailureKind::DecryptionFailed,
            // Enhancement errors degrade inside the orchestrator and are
            // never surfaced; reaching this arm means an internal fault.
            StageError::EnhancementUnavailable(_)
            | StageError::ArtifactEncoding
            | StageError::Config(_)
            | StageError::Store(_) => FailureKind::Internal,
        }
    }
}

/// Terminal failure result of one pipeline run: which stage failed and
/// the classified reason. No partial artifacts accompany it.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub request_id: Uuid,
    pub stage: StageKind,
    pub kind: FailureKind,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pipeline run {} failed in {} stage ({:?})",
            self.request_id,
            self.stage.as_str(),
            self.kind
        )
    }
}

impl std::error::Error for RunFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_drops_detail() {
        let err = StageError::TranscriptionUnavailable("connection reset by peer".to_string());
        assert_eq!(err.classify(), FailureKind::TranscriptionUnavailable);

        let err = StageError::Store(StoreError::DecryptionFailed("auth tag".to_string()));
        assert_eq!(err.classify(), FailureKind::DecryptionFailed);

        let err = StageError::Store(StoreError::KeyUnavailable);
        assert_eq!(err.classify(), FailureKind::KeyUnavailable);
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::UnsupportedLanguage).unwrap();
        assert_eq!(json, "\"unsupported_language\"");
        let json = serde_json::to_string(&StageKind::Transcription).unwrap();
        assert_eq!(json, "\"transcription\"");
    }
}
