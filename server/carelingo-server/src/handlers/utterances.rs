use axum::extract::State;
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use speech_pipeline::SealedArtifact;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::AppState;

/// One utterance to run through the pipeline.
#[derive(Debug, Deserialize)]
pub struct RunUtteranceRequest {
    /// WAV-encoded recording, base64.
    pub audio_wav_base64: String,
    /// Source language code; omitted means provider auto-detection.
    pub source_language: Option<String>,
    /// Target language code from the supported set.
    pub target_language: String,
}

/// The opened result bundle. Artifacts are decrypted here, at the
/// boundary of the caller that requested the run, and nowhere else.
#[derive(Debug, Serialize)]
pub struct RunUtteranceResponse {
    pub request_id: Uuid,
    pub target_language: String,
    pub detected_language: Option<String>,
    pub language_mismatch: bool,
    pub transcript: String,
    pub enhanced_transcript: String,
    pub translation: String,
    /// mp3 audio, base64.
    pub source_audio_base64: String,
    /// mp3 audio, base64.
    pub translated_audio_base64: String,
}

/// Run one utterance through the full pipeline.
pub async fn run_utterance(
    State(state): State<AppState>,
    Json(body): Json<RunUtteranceRequest>,
) -> Result<Json<ApiResponse<RunUtteranceResponse>>, ApiError> {
    let audio = BASE64
        .decode(&body.audio_wav_base64)
        .map_err(|_| ApiError::BadRequest("audio_wav_base64 is not valid base64".to_string()))?;
    if audio.is_empty() {
        return Err(ApiError::BadRequest("audio payload is empty".to_string()));
    }

    info!(
        audio_bytes = audio.len(),
        target = %body.target_language,
        "running utterance pipeline"
    );

    let bundle = state
        .orchestrator
        .run_pipeline(audio, body.source_language.as_deref(), &body.target_language)
        .await
        .map_err(ApiError::Pipeline)?;

    let open_text = |artifact: &SealedArtifact| {
        artifact
            .open_text(&state.store)
            .map_err(|e| ApiError::Internal(e.to_string()))
    };
    let open_audio = |artifact: &SealedArtifact| {
        artifact
            .open(&state.store)
            .map(|bytes| BASE64.encode(bytes))
            .map_err(|e| ApiError::Internal(e.to_string()))
    };

    let response = RunUtteranceResponse {
        request_id: bundle.request_id,
        target_language: bundle.target_language.as_code().to_string(),
        detected_language: bundle.detected_language.clone(),
        language_mismatch: bundle.language_mismatch,
        transcript: open_text(&bundle.transcript)?,
        enhanced_transcript: open_text(&bundle.enhanced_transcript)?,
        translation: open_text(&bundle.translation)?,
        source_audio_base64: open_audio(&bundle.source_audio)?,
        translated_audio_base64: open_audio(&bundle.translated_audio)?,
    };

    Ok(Json(api_success(response)))
}
