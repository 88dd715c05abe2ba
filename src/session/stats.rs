use super::phase::Phase;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time snapshot of a transcription session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Current lifecycle phase
    pub phase: Phase,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Seconds since the session was created
    pub uptime_secs: f64,

    /// Model load progress (0.0 to 1.0)
    pub load_progress: f32,

    /// Whether a completed transcript is available
    pub has_transcript: bool,

    /// Message of the most recent failure, if any
    pub last_error: Option<String>,
}
