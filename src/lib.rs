pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod worker;

pub use audio::{
    decode, downmix, CaptureBackend, CaptureBackendFactory, CaptureSource, CaptureState,
    DecodedPcm, FileCaptureBackend, PcmChunk, Recorder, TARGET_SAMPLE_RATE,
};
pub use config::Config;
pub use error::{Error, Result};
pub use http::{create_router, AppState};
pub use session::{
    ModelConfig, Phase, SessionConfig, SessionEvent, SessionStats, Subtask, TranscriptionSession,
};
pub use worker::{WorkerChannel, WorkerEvent, WorkerHarness, WorkerRequest};
