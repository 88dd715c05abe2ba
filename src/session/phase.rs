use serde::Serialize;
use std::fmt;

/// Lifecycle phase of a transcription session.
///
/// Exactly one of `Recording` or `Transcribing` may be active at a time;
/// both require `Ready` (model loaded). Flags like "busy" or "recording"
/// are projections of this phase, never independent booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No model load has been requested yet.
    Uninitialized,
    /// A model load request is outstanding at the worker.
    ModelLoading,
    /// The last model load failed; `load_model` may be retried.
    LoadFailed,
    /// Model loaded, no operation outstanding.
    Ready,
    /// A capture is active.
    Recording,
    /// A transcription request is outstanding at the worker.
    Transcribing,
    /// The worker transport died. Terminal until the session is rebuilt.
    Faulted,
}

impl Phase {
    /// An operation is outstanding (worker request or active capture).
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::ModelLoading | Phase::Recording | Phase::Transcribing
        )
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Phase::Recording)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Faulted)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::ModelLoading => "model_loading",
            Phase::LoadFailed => "load_failed",
            Phase::Ready => "ready",
            Phase::Recording => "recording",
            Phase::Transcribing => "transcribing",
            Phase::Faulted => "faulted",
        };
        write!(f, "{name}")
    }
}
