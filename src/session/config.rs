use serde::{Deserialize, Serialize};

/// What the worker should do with the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subtask {
    Transcribe,
    Translate,
}

/// Immutable model selection passed by value with every worker request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier resolved by the worker (e.g. "Xenova/whisper-tiny")
    pub model_id: String,

    /// Whether to load the multilingual variant
    pub multilingual: bool,

    /// Whether to load quantized weights
    pub quantized: bool,

    /// Transcribe in the source language or translate to English
    pub subtask: Subtask,

    /// Source language hint
    pub language: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: "Xenova/whisper-tiny".to_string(),
            multilingual: false,
            quantized: false,
            subtask: Subtask::Transcribe,
            language: "english".to_string(),
        }
    }
}

/// Configuration for a transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier, also used to derive worker subjects
    pub session_id: String,

    /// Canonical sample rate for submitted audio (the model expects 16kHz)
    pub sample_rate: u32,

    /// Model selection sent with every request
    pub model: ModelConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            sample_rate: 16000,
            model: ModelConfig::default(),
        }
    }
}
