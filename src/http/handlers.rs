use super::state::AppState;
use crate::audio::{CaptureBackendFactory, CaptureSource};
use crate::error::Error;
use crate::session::{ModelConfig, SessionConfig, TranscriptionSession};
use crate::worker::WorkerChannel;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Optional model override (defaults come from service config)
    pub model: Option<ModelConfig>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct StartRecordingRequest {
    /// Path of an audio file to stream as the capture source; when absent
    /// the microphone backend is used
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub session_id: String,
    pub submitted_samples: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub session_id: String,
    pub submitted_samples: usize,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub transcript: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::SessionBusy { .. } | Error::ModelNotLoaded => StatusCode::CONFLICT,
        Error::EmptyAudio | Error::Decode(_) | Error::UnsupportedChannelLayout { .. } => {
            StatusCode::BAD_REQUEST
        }
        Error::DeviceUnavailable(_)
        | Error::Faulted
        | Error::ChannelClosed
        | Error::ChannelInit(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Create a transcription session and start loading the model
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    info!("Creating session: {}", session_id);

    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} already exists", session_id),
                }),
            )
                .into_response();
        }
    }

    let channel = match WorkerChannel::connect(&state.config.worker.nats_url, &session_id).await {
        Ok(channel) => channel,
        Err(e) => {
            error!("Failed to open worker channel: {}", e);
            return error_response(e).into_response();
        }
    };

    let config = SessionConfig {
        session_id: session_id.clone(),
        sample_rate: state.config.audio.sample_rate,
        model: req.model.unwrap_or_else(|| state.config.model.clone()),
    };

    let session = Arc::new(TranscriptionSession::new(channel, config));

    if let Err(e) = session.load_model().await {
        error!("Failed to start model load: {}", e);
        return error_response(e).into_response();
    }

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Session created: {}", session_id);

    (
        StatusCode::OK,
        Json(CreateSessionResponse {
            session_id,
            status: "model_loading".to_string(),
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/record/start
/// Begin capturing audio for a session
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    req: Option<Json<StartRecordingRequest>>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&session_id) else {
        return session_not_found(&session_id).into_response();
    };

    let source = match req.and_then(|Json(r)| r.source) {
        Some(path) => CaptureSource::File(PathBuf::from(path)),
        None => CaptureSource::Microphone,
    };

    let backend = match CaptureBackendFactory::create(source) {
        Ok(backend) => backend,
        Err(e) => return error_response(e).into_response(),
    };

    match session.start_recording(backend).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "recording" })))
            .into_response(),
        Err(e) => {
            error!("Failed to start recording: {}", e);
            error_response(e).into_response()
        }
    }
}

/// POST /sessions/:session_id/record/stop
/// Stop capturing and pipeline the capture into transcription
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&session_id) else {
        return session_not_found(&session_id).into_response();
    };

    match session.stop_recording().await {
        Ok(submitted_samples) => (
            StatusCode::OK,
            Json(StopRecordingResponse {
                session_id,
                submitted_samples,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop recording: {}", e);
            error_response(e).into_response()
        }
    }
}

/// POST /sessions/:session_id/transcribe
/// Transcribe an uploaded audio file (raw bytes in the body)
pub async fn transcribe(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&session_id) else {
        return session_not_found(&session_id).into_response();
    };

    match session.transcribe_bytes(&body).await {
        Ok(submitted_samples) => (
            StatusCode::OK,
            Json(TranscribeResponse {
                session_id,
                submitted_samples,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to submit audio: {}", e);
            error_response(e).into_response()
        }
    }
}

/// GET /sessions/:session_id/status
/// Snapshot of session phase, progress and errors
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => session_not_found(&session_id).into_response(),
    }
}

/// GET /sessions/:session_id/transcript
/// The most recent completed transcript, if any
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    match sessions.get(&session_id) {
        Some(session) => (
            StatusCode::OK,
            Json(TranscriptResponse {
                session_id,
                transcript: session.last_transcript().await,
            }),
        )
            .into_response(),
        None => session_not_found(&session_id).into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn session_not_found(session_id: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
}
