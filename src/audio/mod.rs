pub mod capture;
pub mod decode;
pub mod downmix;

pub use capture::{
    CaptureBackend, CaptureBackendFactory, CaptureSource, CaptureState, FileCaptureBackend,
    PcmChunk, Recorder,
};
pub use decode::{decode, DecodedPcm, TARGET_SAMPLE_RATE};
pub use downmix::downmix;
