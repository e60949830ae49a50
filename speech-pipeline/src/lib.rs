//! Secure speech translation pipeline for CareLingo Engine
//!
//! One recorded utterance flows through four stages, strictly in order:
//!
//! 1. **Transcription** -- raw WAV audio to plain text
//! 2. **Enhancement** -- medical terminology correction, same language
//! 3. **Translation** -- corrected text into the caller's target language
//! 4. **Synthesis** -- spoken audio for both the source and target text
//!
//! Every stage talks to an external service through a narrow provider
//! trait, so the orchestrator never depends on a specific vendor's
//! response shape. Artifacts are sealed with the injected
//! [`secure_store::SecureStore`] whenever they rest anywhere; the caller
//! receives either a complete sealed bundle or a single classified
//! failure -- never a partial result.
//!
//! Enhancement is an optional quality improvement: when its service is
//! down or returns degenerate output, the run degrades to the unmodified
//! transcript instead of failing.

pub mod artifact;
pub mod config;
pub mod error;
pub mod language;
pub mod medical_terms;
pub mod orchestrator;
pub mod providers;

pub use artifact::{ArtifactKind, PipelineBundle, SealedArtifact, UtteranceRequest};
pub use config::{
    EnhancementProviderConfig, PipelineConfig, SynthesisProviderConfig,
    TranscriptionProviderConfig, TranslationProviderConfig,
};
pub use error::{FailureKind, RunFailure, StageError, StageKind, StageResult};
pub use language::LanguageCode;
pub use orchestrator::{PipelineOrchestrator, PipelineRun, RunState};
pub use providers::{
    EnhancementProvider, SynthesisProvider, TranscriptionProvider, TranscriptOutcome,
    TranslationProvider,
};
