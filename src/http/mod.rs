//! HTTP API server for external control (UI layer)
//!
//! This module provides a REST API around transcription sessions:
//! - POST /sessions - Create a session and start loading the model
//! - POST /sessions/:id/record/start - Begin capturing audio
//! - POST /sessions/:id/record/stop - Stop capturing and transcribe
//! - POST /sessions/:id/transcribe - Transcribe uploaded file bytes
//! - GET /sessions/:id/status - Query phase, progress and errors
//! - GET /sessions/:id/transcript - Get the completed transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
