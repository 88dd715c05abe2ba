use std::io::Cursor;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// A block of PCM samples delivered by a capture backend (16-bit,
/// interleaved).
#[derive(Debug, Clone)]
pub struct PcmChunk {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

/// Audio capture backend trait
///
/// Implementations deliver PCM chunks over the returned channel until
/// `stop` is called; `stop` must close the chunk stream so consumers can
/// drain to completion.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive PCM chunks. A failure
    /// to acquire the device surfaces as `DeviceUnavailable`.
    async fn start(&mut self) -> Result<mpsc::Receiver<PcmChunk>>;

    /// Stop capturing audio and close the chunk stream
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Microphone input
    Microphone,
    /// Stream an audio file as if it were a live capture (batch/demo use)
    File(PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source.
    pub fn create(source: CaptureSource) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::Microphone => Err(Error::DeviceUnavailable(
                "no microphone backend is built for this platform".to_string(),
            )),
            CaptureSource::File(path) => Ok(Box::new(FileCaptureBackend::new(path))),
        }
    }
}

/// State of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Stopped,
}

/// Transient capture session: accumulates chunks in arrival order while
/// recording, then finalizes them into one contiguous WAV byte buffer.
pub struct Recorder {
    state: CaptureState,
    backend: Option<Box<dyn CaptureBackend>>,
    drain: Option<JoinHandle<Vec<PcmChunk>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            backend: None,
            drain: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Start capturing from the given backend. Chunks accumulate in the
    /// background until `stop` is called.
    pub async fn start(&mut self, mut backend: Box<dyn CaptureBackend>) -> Result<()> {
        if self.state == CaptureState::Recording {
            warn!("Capture already started");
            return Ok(());
        }

        let mut rx = backend.start().await?;
        info!("Capture started ({})", backend.name());

        let drain = tokio::spawn(async move {
            let mut chunks = Vec::new();
            while let Some(chunk) = rx.recv().await {
                chunks.push(chunk);
            }
            chunks
        });

        self.backend = Some(backend);
        self.drain = Some(drain);
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Stop capturing and finalize all chunks collected since `start`, in
    /// arrival order, into a single in-memory WAV buffer.
    ///
    /// Stopping while not recording is a no-op returning an empty buffer.
    pub async fn stop(&mut self) -> Result<Vec<u8>> {
        if self.state != CaptureState::Recording {
            return Ok(Vec::new());
        }

        if let Some(mut backend) = self.backend.take() {
            backend.stop().await?;
        }

        let chunks = match self.drain.take() {
            Some(handle) => handle
                .await
                .map_err(|e| Error::DeviceUnavailable(format!("capture task failed: {e}")))?,
            None => Vec::new(),
        };
        self.state = CaptureState::Stopped;

        info!("Capture stopped: {} chunks collected", chunks.len());
        finalize_wav(&chunks)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenate chunks into one contiguous 16-bit PCM WAV byte buffer.
///
/// Zero chunks yield an empty buffer (not a headers-only file).
fn finalize_wav(chunks: &[PcmChunk]) -> Result<Vec<u8>> {
    let Some(first) = chunks.first() else {
        return Ok(Vec::new());
    };

    let spec = hound::WavSpec {
        channels: first.channels,
        sample_rate: first.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::Decode(format!("wav finalize: {e}")))?;
        for chunk in chunks {
            for &sample in &chunk.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| Error::Decode(format!("wav finalize: {e}")))?;
            }
        }
        writer
            .finalize()
            .map_err(|e| Error::Decode(format!("wav finalize: {e}")))?;
    }
    Ok(cursor.into_inner())
}

/// Streams an on-disk WAV file in fixed-duration chunks through the
/// capture interface, for batch processing and demos.
pub struct FileCaptureBackend {
    path: PathBuf,
    chunk_duration_ms: u64,
    capturing: bool,
    task: Option<JoinHandle<()>>,
}

impl FileCaptureBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_duration_ms: 100,
            capturing: false,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCaptureBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<PcmChunk>> {
        let reader = hound::WavReader::open(&self.path).map_err(|e| {
            Error::DeviceUnavailable(format!("cannot open {}: {e}", self.path.display()))
        })?;
        let spec = reader.spec();
        let samples = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                Error::DeviceUnavailable(format!("cannot read {}: {e}", self.path.display()))
            })?;

        info!(
            "Streaming {} as capture: {}Hz, {} channels, {} samples",
            self.path.display(),
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        let chunk_len = (u64::from(spec.sample_rate) * self.chunk_duration_ms / 1000) as usize
            * spec.channels as usize;
        let (tx, rx) = mpsc::channel(16);

        let task = tokio::spawn(async move {
            for block in samples.chunks(chunk_len.max(1)) {
                let chunk = PcmChunk {
                    samples: block.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                };
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });

        self.task = Some(task);
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        // The file is treated as one finite capture: let the stream run to
        // the end of the file before closing.
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "file"
    }
}
