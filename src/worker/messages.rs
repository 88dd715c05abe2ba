use crate::session::ModelConfig;
use serde::{Deserialize, Serialize};

/// Request sent to the transcription worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// Load (or reload) the model described by the config.
    LoadModel(ModelConfig),

    /// Transcribe a canonical mono 16kHz buffer.
    Transcribe {
        #[serde(flatten)]
        config: ModelConfig,
        audio: Vec<f32>,
    },
}

/// Event received from the transcription worker.
///
/// A closed set with exhaustive matching; an unknown `kind` on the wire is
/// a parse error at the channel boundary, not a silently ignored branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// Model-load progress, nominally in [0, 1].
    Progress { fraction: f32 },

    /// The model finished loading.
    Ready,

    /// Transcription of the outstanding request completed.
    Result { text: String },

    /// The outstanding request failed.
    Error { message: String },
}
