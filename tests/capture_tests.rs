// Integration tests for the capture pipeline
//
// These tests verify chunk accumulation order, WAV finalization, and the
// documented no-op behavior of stopping an idle recorder.

use murmur::{
    decode, CaptureBackend, CaptureBackendFactory, CaptureSource, CaptureState, Error,
    FileCaptureBackend, PcmChunk, Recorder, TARGET_SAMPLE_RATE,
};
use tokio::sync::mpsc;

/// Delivers a fixed chunk list and closes the stream.
struct ScriptedBackend {
    chunks: Vec<PcmChunk>,
    capturing: bool,
}

impl ScriptedBackend {
    fn new(chunks: Vec<PcmChunk>) -> Self {
        Self {
            chunks,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn start(&mut self) -> murmur::Result<mpsc::Receiver<PcmChunk>> {
        let (tx, rx) = mpsc::channel(16);
        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> murmur::Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Always fails to acquire its device.
struct DeadBackend;

#[async_trait::async_trait]
impl CaptureBackend for DeadBackend {
    async fn start(&mut self) -> murmur::Result<mpsc::Receiver<PcmChunk>> {
        Err(Error::DeviceUnavailable("permission denied".to_string()))
    }

    async fn stop(&mut self) -> murmur::Result<()> {
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "dead"
    }
}

fn mono_chunk(samples: Vec<i16>) -> PcmChunk {
    PcmChunk {
        samples,
        sample_rate: 16000,
        channels: 1,
    }
}

#[tokio::test]
async fn test_recorder_concatenates_chunks_in_arrival_order() {
    let backend = Box::new(ScriptedBackend::new(vec![
        mono_chunk(vec![1000; 100]),
        mono_chunk(vec![8000; 100]),
    ]));

    let mut recorder = Recorder::new();
    recorder.start(backend).await.unwrap();
    assert_eq!(recorder.state(), CaptureState::Recording);

    let bytes = recorder.stop().await.unwrap();
    assert_eq!(recorder.state(), CaptureState::Stopped);
    assert!(!bytes.is_empty());

    // The finalized buffer decodes back to the same 200 samples, first
    // chunk before second.
    let pcm = decode(&bytes, TARGET_SAMPLE_RATE).unwrap();
    assert_eq!(pcm.channels, 1);
    assert_eq!(pcm.samples.len(), 200);
    assert!(pcm.samples[0] < pcm.samples[150]);
}

#[tokio::test]
async fn test_stop_while_idle_is_a_noop_returning_empty() {
    let mut recorder = Recorder::new();
    assert_eq!(recorder.state(), CaptureState::Idle);

    let bytes = recorder.stop().await.unwrap();
    assert!(bytes.is_empty());
    assert_eq!(recorder.state(), CaptureState::Idle);
}

#[tokio::test]
async fn test_capture_with_no_chunks_finalizes_empty() {
    let backend = Box::new(ScriptedBackend::new(Vec::new()));

    let mut recorder = Recorder::new();
    recorder.start(backend).await.unwrap();
    let bytes = recorder.stop().await.unwrap();

    assert!(bytes.is_empty(), "zero chunks should not produce a header");
}

#[tokio::test]
async fn test_device_failure_never_starts_recording() {
    let mut recorder = Recorder::new();
    let result = recorder.start(Box::new(DeadBackend)).await;

    assert!(matches!(result, Err(Error::DeviceUnavailable(_))));
    assert_eq!(recorder.state(), CaptureState::Idle);
}

#[tokio::test]
async fn test_finalized_capture_is_a_decodable_wav() {
    let samples: Vec<i16> = (0..1600).map(|i| (i % 500) as i16).collect();
    let backend = Box::new(ScriptedBackend::new(vec![mono_chunk(samples)]));

    let mut recorder = Recorder::new();
    recorder.start(backend).await.unwrap();
    let bytes = recorder.stop().await.unwrap();

    let pcm = decode(&bytes, TARGET_SAMPLE_RATE).unwrap();
    assert_eq!(pcm.sample_rate, 16000);
    assert_eq!(pcm.samples.len(), 1600);
}

#[tokio::test]
async fn test_file_backend_streams_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..4800i16 {
        writer.write_sample(i % 100).unwrap();
    }
    writer.finalize().unwrap();

    let mut backend = FileCaptureBackend::new(&path);
    let mut rx = backend.start().await.unwrap();
    assert!(backend.is_capturing());

    let mut total = 0;
    while let Some(chunk) = rx.recv().await {
        assert_eq!(chunk.sample_rate, 16000);
        assert_eq!(chunk.channels, 1);
        total += chunk.samples.len();
    }
    assert_eq!(total, 4800);

    backend.stop().await.unwrap();
    assert!(!backend.is_capturing());
}

#[tokio::test]
async fn test_file_backend_missing_file_is_device_unavailable() {
    let mut backend = FileCaptureBackend::new("/nonexistent/capture.wav");
    let result = backend.start().await;
    assert!(matches!(result, Err(Error::DeviceUnavailable(_))));
}

#[test]
fn test_factory_has_no_microphone_on_this_platform() {
    let result = CaptureBackendFactory::create(CaptureSource::Microphone);
    assert!(matches!(result, Err(Error::DeviceUnavailable(_))));
}
