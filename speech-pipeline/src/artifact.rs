use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use secure_store::{SecureStore, StoreResult};

use crate::error::{StageError, StageResult};
use crate::language::LanguageCode;

/// What a sealed payload is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    RawAudio,
    Transcript,
    EnhancedTranscript,
    Translation,
    SynthesizedAudio,
}

/// An artifact in its encrypted-at-rest form. This is the only shape in
/// which pipeline output leaves a run; opening one requires the store
/// that sealed it.
#[derive(Debug, Clone)]
pub struct SealedArtifact {
    kind: ArtifactKind,
    ciphertext: Vec<u8>,
}

impl SealedArtifact {
    pub fn seal(store: &SecureStore, kind: ArtifactKind, payload: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            kind,
            ciphertext: store.encrypt(payload)?,
        })
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Decrypt the payload. Fails closed under a different key or after
    /// tampering; never yields corrupted bytes.
    pub fn open(&self, store: &SecureStore) -> StoreResult<Vec<u8>> {
        store.decrypt(&self.ciphertext)
    }

    /// Decrypt a text artifact.
    pub fn open_text(&self, store: &SecureStore) -> StageResult<String> {
        let bytes = self.open(store)?;
        String::from_utf8(bytes).map_err(|_| StageError::ArtifactEncoding)
    }
}

/// One end-to-end translation job: a single recorded utterance plus the
/// caller's language selection. Immutable once constructed and consumed
/// entirely by one orchestrator run.
#[derive(Debug)]
pub struct UtteranceRequest {
    pub id: Uuid,
    pub audio_wav: Vec<u8>,
    pub source_language: Option<LanguageCode>,
    pub target_language: LanguageCode,
    pub created_at: DateTime<Utc>,
}

impl UtteranceRequest {
    /// Build a request from caller-supplied language codes, validating
    /// them against the supported set before any external service is
    /// involved.
    pub fn new(
        audio_wav: Vec<u8>,
        source_language: Option<&str>,
        target_language: &str,
    ) -> StageResult<Self> {
        let target = LanguageCode::from_code(target_language)
            .ok_or_else(|| StageError::UnsupportedLanguage(target_language.to_string()))?;

        let source = match source_language {
            Some(code) => Some(
                LanguageCode::from_code(code)
                    .ok_or_else(|| StageError::UnsupportedLanguage(code.to_string()))?,
            ),
            None => None,
        };

        Ok(Self::with_languages(audio_wav, source, target))
    }

    /// Build a request from already-validated languages.
    pub fn with_languages(
        audio_wav: Vec<u8>,
        source_language: Option<LanguageCode>,
        target_language: LanguageCode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            audio_wav,
            source_language,
            target_language,
            created_at: Utc::now(),
        }
    }
}

/// The complete result of a successful run. Every artifact is sealed;
/// no plaintext payload crosses the bundle boundary.
#[derive(Debug)]
pub struct PipelineBundle {
    pub request_id: Uuid,
    pub target_language: LanguageCode,
    /// Language the transcription service reported hearing, verbatim.
    pub detected_language: Option<String>,
    /// Whether the detected language disagreed with the caller's source
    /// selection. Informational; never a failure.
    pub language_mismatch: bool,
    pub transcript: SealedArtifact,
    pub enhanced_transcript: SealedArtifact,
    pub translation: SealedArtifact,
    pub source_audio: SealedArtifact,
    pub translated_audio: SealedArtifact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secure_store::generate_key;

    #[test]
    fn sealed_artifact_roundtrip() {
        let store = SecureStore::new(generate_key()).unwrap();
        let sealed = SealedArtifact::seal(&store, ArtifactKind::Transcript, b"hello").unwrap();
        assert_eq!(sealed.kind(), ArtifactKind::Transcript);
        assert_eq!(sealed.open_text(&store).unwrap(), "hello");
    }

    #[test]
    fn sealed_artifact_needs_the_sealing_key() {
        let store_a = SecureStore::new(generate_key()).unwrap();
        let store_b = SecureStore::new(generate_key()).unwrap();
        let sealed = SealedArtifact::seal(&store_a, ArtifactKind::Translation, b"hola").unwrap();
        assert!(sealed.open(&store_b).is_err());
    }

    #[test]
    fn request_validates_target_language() {
        let err = UtteranceRequest::new(vec![0u8; 4], None, "xx").unwrap_err();
        assert!(matches!(err, StageError::UnsupportedLanguage(code) if code == "xx"));
    }

    #[test]
    fn request_validates_source_language() {
        let err = UtteranceRequest::new(vec![0u8; 4], Some("qq"), "es").unwrap_err();
        assert!(matches!(err, StageError::UnsupportedLanguage(code) if code == "qq"));
    }

    #[test]
    fn request_accepts_supported_pair() {
        let request = UtteranceRequest::new(vec![1, 2, 3], Some("en"), "es").unwrap();
        assert_eq!(request.source_language, Some(LanguageCode::English));
        assert_eq!(request.target_language, LanguageCode::Spanish);
        assert_eq!(request.audio_wav, vec![1, 2, 3]);
    }
}
