use crate::session::Phase;
use thiserror::Error;

/// Errors surfaced by the audio pipeline and transcription session.
#[derive(Error, Debug)]
pub enum Error {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("unsupported channel layout: {channels} channels (expected 1 or 2)")]
    UnsupportedChannelLayout { channels: usize },

    #[error("empty audio buffer")]
    EmptyAudio,

    #[error("session busy: operation outstanding in phase {phase:?}")]
    SessionBusy { phase: Phase },

    #[error("model not loaded")]
    ModelNotLoaded,

    #[error("worker channel init failed: {0}")]
    ChannelInit(String),

    #[error("worker channel closed")]
    ChannelClosed,

    #[error("session faulted: worker transport is down")]
    Faulted,

    #[error("inference failed: {message}")]
    Inference { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
