//! Orchestrator behavior against stub providers: stage ordering, fatal
//! vs. degrading failures, fail-fast validation, and sealing of every
//! bundle artifact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use secure_store::{generate_key, SecureStore};
use speech_pipeline::{
    EnhancementProvider, FailureKind, LanguageCode, PipelineOrchestrator, StageError, StageKind,
    StageResult, SynthesisProvider, TranscriptOutcome, TranscriptionProvider, TranslationProvider,
};

struct StubTranscription {
    calls: AtomicUsize,
    fail: bool,
    slow: bool,
    text: String,
    detected: Option<String>,
}

impl StubTranscription {
    fn returning(text: &str, detected: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            slow: false,
            text: text.to_string(),
            detected: Some(detected.to_string()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning("", "")
        }
    }

    fn hanging() -> Self {
        Self {
            slow: true,
            ..Self::returning("late", "en")
        }
    }
}

#[async_trait]
impl TranscriptionProvider for StubTranscription {
    async fn transcribe(
        &self,
        _audio_wav: &[u8],
        _hint: Option<LanguageCode>,
    ) -> StageResult<TranscriptOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.slow {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail {
            return Err(StageError::TranscriptionUnavailable(
                "stub offline".to_string(),
            ));
        }
        Ok(TranscriptOutcome {
            text: self.text.clone(),
            detected_language: self.detected.clone(),
        })
    }
}

struct StubEnhancement {
    calls: AtomicUsize,
    fail: bool,
    output: Option<String>,
}

impl StubEnhancement {
    fn echoing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            output: None,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::echoing()
        }
    }

    fn returning(output: &str) -> Self {
        Self {
            output: Some(output.to_string()),
            ..Self::echoing()
        }
    }
}

#[async_trait]
impl EnhancementProvider for StubEnhancement {
    async fn enhance(&self, text: &str, _language: Option<LanguageCode>) -> StageResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StageError::EnhancementUnavailable(
                "stub offline".to_string(),
            ));
        }
        Ok(self.output.clone().unwrap_or_else(|| text.to_string()))
    }
}

struct StubTranslation {
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
    fail: bool,
    output: String,
}

impl StubTranslation {
    fn returning(output: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
            fail: false,
            output: output.to_string(),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning("")
        }
    }

    fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for StubTranslation {
    async fn translate(
        &self,
        text: &str,
        _source: Option<LanguageCode>,
        _target: LanguageCode,
    ) -> StageResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(text.to_string());
        if self.fail {
            return Err(StageError::TranslationUnavailable(
                "stub offline".to_string(),
            ));
        }
        Ok(self.output.clone())
    }
}

struct StubSynthesis {
    calls: AtomicUsize,
    fail: bool,
}

impl StubSynthesis {
    fn speaking() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::speaking()
        }
    }
}

#[async_trait]
impl SynthesisProvider for StubSynthesis {
    async fn synthesize(&self, text: &str, language: LanguageCode) -> StageResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StageError::SynthesisUnavailable("stub offline".to_string()));
        }
        Ok(format!("AUDIO:{}:{}", language.as_code(), text).into_bytes())
    }
}

struct Harness {
    store: SecureStore,
    transcription: Arc<StubTranscription>,
    enhancement: Arc<StubEnhancement>,
    translation: Arc<StubTranslation>,
    synthesis: Arc<StubSynthesis>,
    orchestrator: PipelineOrchestrator,
}

fn harness(
    transcription: StubTranscription,
    enhancement: StubEnhancement,
    translation: StubTranslation,
    synthesis: StubSynthesis,
) -> Harness {
    harness_with_store(
        SecureStore::new(generate_key()).unwrap(),
        transcription,
        enhancement,
        translation,
        synthesis,
        Duration::from_secs(5),
    )
}

fn harness_with_store(
    store: SecureStore,
    transcription: StubTranscription,
    enhancement: StubEnhancement,
    translation: StubTranslation,
    synthesis: StubSynthesis,
    stage_timeout: Duration,
) -> Harness {
    let transcription = Arc::new(transcription);
    let enhancement = Arc::new(enhancement);
    let translation = Arc::new(translation);
    let synthesis = Arc::new(synthesis);
    let orchestrator = PipelineOrchestrator::new(
        store.clone(),
        transcription.clone(),
        enhancement.clone(),
        translation.clone(),
        synthesis.clone(),
        stage_timeout,
    );
    Harness {
        store,
        transcription,
        enhancement,
        translation,
        synthesis,
        orchestrator,
    }
}

fn wav_fixture() -> Vec<u8> {
    b"RIFF....WAVEfmt hello-world.wav".to_vec()
}

#[tokio::test]
async fn end_to_end_stub_run_completes() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
    );

    let bundle = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap();

    assert_eq!(bundle.target_language, LanguageCode::Spanish);
    assert_eq!(bundle.detected_language.as_deref(), Some("english"));
    assert!(!bundle.language_mismatch);

    assert_eq!(bundle.transcript.open_text(&h.store).unwrap(), "Hello world");
    assert_eq!(
        bundle.enhanced_transcript.open_text(&h.store).unwrap(),
        "Hello world"
    );
    assert_eq!(bundle.translation.open_text(&h.store).unwrap(), "Hola mundo");
    assert_eq!(
        bundle.source_audio.open(&h.store).unwrap(),
        b"AUDIO:en:Hello world"
    );
    assert_eq!(
        bundle.translated_audio.open(&h.store).unwrap(),
        b"AUDIO:es:Hola mundo"
    );

    assert_eq!(h.transcription.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.enhancement.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.translation.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.synthesis.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn enhancement_output_flows_downstream() {
    let h = harness(
        StubTranscription::returning("patient has hart failure", "english"),
        StubEnhancement::returning("patient has heart failure"),
        StubTranslation::returning("el paciente tiene insuficiencia cardiaca"),
        StubSynthesis::speaking(),
    );

    let bundle = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap();

    assert_eq!(
        bundle.transcript.open_text(&h.store).unwrap(),
        "patient has hart failure"
    );
    assert_eq!(
        bundle.enhanced_transcript.open_text(&h.store).unwrap(),
        "patient has heart failure"
    );
    assert_eq!(
        h.translation.last_input().as_deref(),
        Some("patient has heart failure")
    );
}

#[tokio::test]
async fn enhancement_failure_degrades_to_original_transcript() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::failing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
    );

    let bundle = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap();

    // The run reached translation with the unmodified transcript.
    assert_eq!(h.translation.last_input().as_deref(), Some("Hello world"));
    assert_eq!(
        bundle.enhanced_transcript.open_text(&h.store).unwrap(),
        "Hello world"
    );
    assert_eq!(h.synthesis.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn degenerate_enhancement_output_degrades() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::returning("   "),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
    );

    let bundle = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap();

    assert_eq!(
        bundle.enhanced_transcript.open_text(&h.store).unwrap(),
        "Hello world"
    );
    assert_eq!(h.translation.last_input().as_deref(), Some("Hello world"));
}

#[tokio::test]
async fn transcription_failure_is_fatal_with_no_downstream_calls() {
    let h = harness(
        StubTranscription::failing(),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
    );

    let failure = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap_err();

    assert_eq!(failure.stage, StageKind::Transcription);
    assert_eq!(failure.kind, FailureKind::TranscriptionUnavailable);

    assert_eq!(h.enhancement.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.translation.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.synthesis.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn translation_failure_is_fatal() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::echoing(),
        StubTranslation::failing(),
        StubSynthesis::speaking(),
    );

    let failure = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap_err();

    assert_eq!(failure.stage, StageKind::Translation);
    assert_eq!(failure.kind, FailureKind::TranslationUnavailable);
    assert_eq!(h.synthesis.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn synthesis_failure_is_fatal() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::failing(),
    );

    let failure = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap_err();

    assert_eq!(failure.stage, StageKind::Synthesis);
    assert_eq!(failure.kind, FailureKind::SynthesisUnavailable);
}

#[tokio::test]
async fn unsupported_target_language_fails_before_any_external_call() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
    );

    let failure = h
        .orchestrator
        .run_pipeline(wav_fixture(), None, "xx")
        .await
        .unwrap_err();

    assert_eq!(failure.stage, StageKind::Validation);
    assert_eq!(failure.kind, FailureKind::UnsupportedLanguage);
    assert_eq!(h.transcription.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hung_stage_times_out_as_unavailable() {
    let h = harness_with_store(
        SecureStore::new(generate_key()).unwrap(),
        StubTranscription::hanging(),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
        Duration::from_millis(50),
    );

    let failure = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap_err();

    assert_eq!(failure.stage, StageKind::Transcription);
    assert_eq!(failure.kind, FailureKind::TranscriptionUnavailable);
}

#[tokio::test]
async fn keyless_store_refuses_the_run() {
    let h = harness_with_store(
        SecureStore::keyless(),
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
        Duration::from_secs(5),
    );

    let failure = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap_err();

    assert_eq!(failure.stage, StageKind::Validation);
    assert_eq!(failure.kind, FailureKind::KeyUnavailable);
    assert_eq!(h.transcription.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn language_mismatch_is_reported_not_fatal() {
    let h = harness(
        StubTranscription::returning("Hola a todos", "spanish"),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hello everyone"),
        StubSynthesis::speaking(),
    );

    let bundle = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap();

    assert!(bundle.language_mismatch);
    assert_eq!(bundle.detected_language.as_deref(), Some("spanish"));
}

#[tokio::test]
async fn bundle_artifacts_are_sealed() {
    let h = harness(
        StubTranscription::returning("Hello world", "english"),
        StubEnhancement::echoing(),
        StubTranslation::returning("Hola mundo"),
        StubSynthesis::speaking(),
    );

    let bundle = h
        .orchestrator
        .run_pipeline(wav_fixture(), Some("en"), "es")
        .await
        .unwrap();

    // Ciphertext does not contain the plaintext.
    let ciphertext = bundle.translation.ciphertext();
    assert!(!ciphertext
        .windows(b"Hola mundo".len())
        .any(|w| w == b"Hola mundo"));

    // A different key cannot open the artifacts.
    let other_store = SecureStore::new(generate_key()).unwrap();
    assert!(bundle.translation.open(&other_store).is_err());
}
