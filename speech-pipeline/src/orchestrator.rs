use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use secure_store::SecureStore;

use crate::artifact::{ArtifactKind, PipelineBundle, SealedArtifact, UtteranceRequest};
use crate::config::PipelineConfig;
use crate::error::{FailureKind, RunFailure, StageError, StageKind, StageResult};
use crate::language::LanguageCode;
use crate::providers::{
    create_enhancement_provider, create_synthesis_provider, create_transcription_provider,
    create_translation_provider, EnhancementProvider, SynthesisProvider, TranscriptionProvider,
    TranslationProvider,
};

/// Where a run currently is. Transitions are strictly linear and
/// forward-only; `Failed` is terminal and reachable from every
/// non-terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Created,
    Transcribing,
    Enhancing,
    Translating,
    Synthesizing,
    Completed,
    Failed { stage: StageKind, kind: FailureKind },
}

/// State-machine instance for a single utterance. Created per
/// invocation, never shared or reused across requests.
pub struct PipelineRun {
    request_id: Uuid,
    state: RunState,
}

impl PipelineRun {
    fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            state: RunState::Created,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    fn advance(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "pipeline state transition");
        self.state = next;
    }

    /// Record a fatal stage failure. The raw error detail is logged
    /// here and only the classification travels onward.
    fn fail(&mut self, stage: StageKind, error: &StageError) -> RunFailure {
        let kind = error.classify();
        warn!(stage = stage.as_str(), error = %error, "pipeline stage failed");
        self.state = RunState::Failed { stage, kind };
        RunFailure {
            request_id: self.request_id,
            stage,
            kind,
        }
    }
}

/// Drives one utterance through transcription, terminology enhancement,
/// translation, and speech synthesis, sealing every artifact with the
/// injected [`SecureStore`].
///
/// The orchestrator holds no per-run state; a single instance serves
/// any number of concurrent runs.
pub struct PipelineOrchestrator {
    store: SecureStore,
    transcription: Arc<dyn TranscriptionProvider>,
    enhancement: Arc<dyn EnhancementProvider>,
    translation: Arc<dyn TranslationProvider>,
    synthesis: Arc<dyn SynthesisProvider>,
    stage_timeout: Duration,
}

impl PipelineOrchestrator {
    pub fn new(
        store: SecureStore,
        transcription: Arc<dyn TranscriptionProvider>,
        enhancement: Arc<dyn EnhancementProvider>,
        translation: Arc<dyn TranslationProvider>,
        synthesis: Arc<dyn SynthesisProvider>,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            store,
            transcription,
            enhancement,
            translation,
            synthesis,
            stage_timeout,
        }
    }

    /// Build the orchestrator and all four provider clients from
    /// configuration.
    pub fn from_config(config: &PipelineConfig, store: SecureStore) -> StageResult<Self> {
        let timeout = config.stage_timeout();
        Ok(Self::new(
            store,
            Arc::from(create_transcription_provider(&config.transcription, timeout)?),
            Arc::from(create_enhancement_provider(&config.enhancement, timeout)?),
            Arc::from(create_translation_provider(&config.translation, timeout)?),
            Arc::from(create_synthesis_provider(&config.synthesis, timeout)?),
            timeout,
        ))
    }

    /// The single caller-facing entry point: validate the language
    /// selection, then run the full pipeline on the recorded audio.
    ///
    /// An unsupported code fails here, before any external service is
    /// contacted.
    pub async fn run_pipeline(
        &self,
        audio_wav: Vec<u8>,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<PipelineBundle, RunFailure> {
        let request = match UtteranceRequest::new(audio_wav, source_language, target_language) {
            Ok(request) => request,
            Err(error) => {
                let request_id = Uuid::new_v4();
                warn!(request_id = %request_id, error = %error, "utterance request rejected");
                return Err(RunFailure {
                    request_id,
                    stage: StageKind::Validation,
                    kind: error.classify(),
                });
            }
        };
        self.run(request).await
    }

    /// Run the pipeline on an already-validated request.
    pub async fn run(&self, request: UtteranceRequest) -> Result<PipelineBundle, RunFailure> {
        let span = info_span!(
            "pipeline_run",
            request_id = %request.id,
            target = %request.target_language,
        );
        self.execute(request).instrument(span).await
    }

    async fn execute(&self, request: UtteranceRequest) -> Result<PipelineBundle, RunFailure> {
        let started = std::time::Instant::now();
        let mut run = PipelineRun::new(request.id);

        // The recording is sealed to encrypted scoped storage before any
        // stage runs; it exists in plaintext only inside this scope.
        let staged_audio = self
            .store
            .scoped_temp_file(&request.audio_wav)
            .map_err(|e| run.fail(StageKind::Validation, &StageError::Store(e)))?;

        run.advance(RunState::Transcribing);
        let audio = staged_audio
            .read()
            .map_err(|e| run.fail(StageKind::Transcription, &StageError::Store(e)))?;

        let outcome = self
            .bounded(
                StageKind::Transcription,
                self.transcription.transcribe(&audio, request.source_language),
            )
            .await
            .map_err(|e| run.fail(StageKind::Transcription, &e))?;

        if outcome.text.is_empty() {
            let error = StageError::TranscriptionRejected("empty transcript".to_string());
            return Err(run.fail(StageKind::Transcription, &error));
        }
        let transcript_text = outcome.text;
        let detected_language = outcome.detected_language;

        let language_mismatch = match (request.source_language, detected_language.as_deref()) {
            (Some(selected), Some(detected)) => !selected.matches_tag(detected),
            _ => false,
        };
        if language_mismatch {
            let selected = request.source_language.map_or("-", LanguageCode::as_code);
            info!(
                selected = %selected,
                detected = detected_language.as_deref().unwrap_or("-"),
                "detected language differs from caller's source selection"
            );
        }

        run.advance(RunState::Enhancing);
        let enhanced_text = match self
            .bounded(
                StageKind::Enhancement,
                self.enhancement
                    .enhance(&transcript_text, request.source_language),
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                info!("enhancement returned empty output; keeping original transcript");
                transcript_text.clone()
            }
            Err(error) => {
                info!(error = %error, "enhancement unavailable; keeping original transcript");
                transcript_text.clone()
            }
        };

        run.advance(RunState::Translating);
        let translated_text = self
            .bounded(
                StageKind::Translation,
                self.translation.translate(
                    &enhanced_text,
                    request.source_language,
                    request.target_language,
                ),
            )
            .await
            .map_err(|e| run.fail(StageKind::Translation, &e))?;

        run.advance(RunState::Synthesizing);
        let source_voice = request
            .source_language
            .or_else(|| detected_language.as_deref().and_then(LanguageCode::from_tag))
            .unwrap_or(LanguageCode::English);

        let source_audio_bytes = self
            .bounded(
                StageKind::Synthesis,
                self.synthesis.synthesize(&enhanced_text, source_voice),
            )
            .await
            .map_err(|e| run.fail(StageKind::Synthesis, &e))?;

        let translated_audio_bytes = self
            .bounded(
                StageKind::Synthesis,
                self.synthesis
                    .synthesize(&translated_text, request.target_language),
            )
            .await
            .map_err(|e| run.fail(StageKind::Synthesis, &e))?;

        let bundle = PipelineBundle {
            request_id: request.id,
            target_language: request.target_language,
            detected_language,
            language_mismatch,
            transcript: self.seal(
                &mut run,
                ArtifactKind::Transcript,
                transcript_text.as_bytes(),
            )?,
            enhanced_transcript: self.seal(
                &mut run,
                ArtifactKind::EnhancedTranscript,
                enhanced_text.as_bytes(),
            )?,
            translation: self.seal(
                &mut run,
                ArtifactKind::Translation,
                translated_text.as_bytes(),
            )?,
            source_audio: self.seal(
                &mut run,
                ArtifactKind::SynthesizedAudio,
                &source_audio_bytes,
            )?,
            translated_audio: self.seal(
                &mut run,
                ArtifactKind::SynthesizedAudio,
                &translated_audio_bytes,
            )?,
        };

        run.advance(RunState::Completed);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run completed"
        );
        Ok(bundle)
    }

    fn seal(
        &self,
        run: &mut PipelineRun,
        kind: ArtifactKind,
        payload: &[u8],
    ) -> Result<SealedArtifact, RunFailure> {
        SealedArtifact::seal(&self.store, kind, payload)
            .map_err(|e| run.fail(StageKind::Synthesis, &StageError::Store(e)))
    }

    /// Bound a stage invocation so one hung external call cannot stall
    /// the run; a timeout reads as that stage being unavailable.
    async fn bounded<T, F>(&self, stage: StageKind, fut: F) -> StageResult<T>
    where
        F: Future<Output = StageResult<T>>,
    {
        match tokio::time::timeout(self.stage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(timeout_error(stage)),
        }
    }
}

fn timeout_error(stage: StageKind) -> StageError {
    let detail = "stage timed out".to_string();
    match stage {
        StageKind::Transcription => StageError::TranscriptionUnavailable(detail),
        StageKind::Enhancement => StageError::EnhancementUnavailable(detail),
        StageKind::Translation => StageError::TranslationUnavailable(detail),
        StageKind::Synthesis => StageError::SynthesisUnavailable(detail),
        StageKind::Validation => StageError::Config("validation performs no external call".to_string()),
    }
}
