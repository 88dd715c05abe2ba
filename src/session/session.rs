use super::config::SessionConfig;
use super::phase::Phase;
use super::stats::SessionStats;
use crate::audio::{decode, downmix, CaptureBackend, Recorder};
use crate::error::{Error, Result};
use crate::worker::{WorkerChannel, WorkerEvent, WorkerRequest};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Notification delivered to session observers.
///
/// One notification per phase or progress change, in the order the
/// underlying worker events were received.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    LoadProgress(f32),
    TranscriptReady(String),
    TranscriptionFailed(String),
}

struct SessionState {
    phase: Phase,
    load_progress: f32,
    last_transcript: Option<String>,
    last_error: Option<String>,
    observers: Vec<mpsc::UnboundedSender<SessionEvent>>,
    progress_tx: watch::Sender<f32>,
}

impl SessionState {
    fn notify(&mut self, event: SessionEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("Session phase: {} -> {}", self.phase, phase);
            self.phase = phase;
            self.notify(SessionEvent::PhaseChanged(phase));
        }
    }

    fn set_progress(&mut self, fraction: f32) {
        if fraction > self.load_progress {
            self.load_progress = fraction;
            let _ = self.progress_tx.send(fraction);
            self.notify(SessionEvent::LoadProgress(fraction));
        }
    }

    /// Apply one worker event. Called from the event pump only, one event
    /// at a time, in arrival order.
    fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Progress { fraction } => {
                // Stale or duplicate fractions dedupe to max-seen.
                if self.phase == Phase::ModelLoading {
                    self.set_progress(fraction.clamp(0.0, 1.0));
                }
            }
            WorkerEvent::Ready => {
                if self.phase == Phase::ModelLoading {
                    info!("Model ready");
                    self.set_progress(1.0);
                    self.set_phase(Phase::Ready);
                } else {
                    warn!("Ignoring ready event in phase {}", self.phase);
                }
            }
            WorkerEvent::Result { text } => {
                if self.phase == Phase::Transcribing {
                    info!("Transcription complete ({} chars)", text.len());
                    self.last_transcript = Some(text.clone());
                    self.set_phase(Phase::Ready);
                    self.notify(SessionEvent::TranscriptReady(text));
                } else {
                    warn!("Ignoring result event in phase {}", self.phase);
                }
            }
            WorkerEvent::Error { message } => match self.phase {
                Phase::ModelLoading => {
                    error!("Model load failed: {}", message);
                    self.last_error = Some(message);
                    self.set_phase(Phase::LoadFailed);
                }
                Phase::Transcribing => {
                    error!("Transcription failed: {}", message);
                    self.last_error = Some(message.clone());
                    self.set_phase(Phase::Ready);
                    self.notify(SessionEvent::TranscriptionFailed(message));
                }
                phase => {
                    warn!("Ignoring worker error in phase {}: {}", phase, message);
                }
            },
        }
    }

    /// The worker transport died.
    fn fault(&mut self) {
        if self.phase != Phase::Faulted {
            error!("Worker transport closed; session faulted");
            self.last_error = Some("worker channel closed".to_string());
            self.set_phase(Phase::Faulted);
        }
    }
}

/// Long-lived orchestrator for model load, recording and transcription.
///
/// Owns the single outstanding worker request: every operation is guarded
/// by the current [`Phase`], and at most one of recording or transcription
/// may be in flight. Operations return without waiting for the worker;
/// completion arrives as [`SessionEvent`]s.
pub struct TranscriptionSession {
    config: SessionConfig,
    requests: mpsc::UnboundedSender<WorkerRequest>,
    state: Arc<Mutex<SessionState>>,
    recorder: Mutex<Option<Recorder>>,
    progress_rx: watch::Receiver<f32>,
    started_at: DateTime<Utc>,
    pump: JoinHandle<()>,
}

impl TranscriptionSession {
    /// Build a session around an explicitly constructed worker channel.
    pub fn new(channel: WorkerChannel, config: SessionConfig) -> Self {
        info!("Creating transcription session: {}", config.session_id);

        let (requests, mut events) = channel.into_parts();
        let (progress_tx, progress_rx) = watch::channel(0.0f32);

        let state = Arc::new(Mutex::new(SessionState {
            phase: Phase::Uninitialized,
            load_progress: 0.0,
            last_transcript: None,
            last_error: None,
            observers: Vec::new(),
            progress_tx,
        }));

        // Single consumer of worker events: all event-driven state
        // mutation happens here, one event at a time, in arrival order.
        let pump_state = Arc::clone(&state);
        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                pump_state.lock().await.apply(event);
            }
            pump_state.lock().await.fault();
        });

        Self {
            config,
            requests,
            state,
            recorder: Mutex::new(None),
            progress_rx,
            started_at: Utc::now(),
            pump,
        }
    }

    /// Ask the worker to load the model. Returns immediately; progress and
    /// completion arrive as events. Allowed from `Uninitialized` and (as an
    /// explicit retry) from `LoadFailed`.
    pub async fn load_model(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Uninitialized | Phase::LoadFailed => {}
            Phase::Faulted => return Err(Error::Faulted),
            phase => return Err(Error::SessionBusy { phase }),
        }

        info!("Loading model {}", self.config.model.model_id);
        state.load_progress = 0.0;
        let _ = state.progress_tx.send(0.0);
        self.send_locked(&mut state, WorkerRequest::LoadModel(self.config.model.clone()))?;
        state.set_phase(Phase::ModelLoading);
        Ok(())
    }

    /// Begin capturing from the given backend.
    ///
    /// Requires a loaded model; a backend start failure (no device,
    /// permission denied) surfaces as `DeviceUnavailable` and never
    /// transitions into `Recording`.
    pub async fn start_recording(&self, backend: Box<dyn CaptureBackend>) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Ready => {}
            Phase::Uninitialized | Phase::LoadFailed => return Err(Error::ModelNotLoaded),
            Phase::Faulted => return Err(Error::Faulted),
            phase => return Err(Error::SessionBusy { phase }),
        }

        let mut slot = self.recorder.lock().await;
        let mut recorder = Recorder::new();
        recorder.start(backend).await?;
        *slot = Some(recorder);
        state.set_phase(Phase::Recording);
        Ok(())
    }

    /// Stop the active capture and immediately pipeline whatever was
    /// collected into transcription (decode, downmix, submit) — a stopped
    /// capture is never left stranded.
    ///
    /// Returns the number of mono samples submitted, or `None` if no
    /// capture was active (stopping while idle is a no-op).
    pub async fn stop_recording(&self) -> Result<Option<usize>> {
        let mut state = self.state.lock().await;
        if state.phase != Phase::Recording {
            warn!("stop_recording called while not recording");
            return Ok(None);
        }

        let recorder = self.recorder.lock().await.take();
        state.set_phase(Phase::Ready);

        let bytes = match recorder {
            Some(mut recorder) => recorder.stop().await?,
            None => Vec::new(),
        };
        if bytes.is_empty() {
            return Err(Error::EmptyAudio);
        }

        let mono = self.normalize(&bytes)?;
        self.submit_locked(&mut state, mono).map(Some)
    }

    /// Submit a canonical mono 16kHz buffer for transcription. An empty
    /// buffer fails synchronously and nothing reaches the worker.
    pub async fn submit(&self, mono: Vec<f32>) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Ready => {}
            Phase::Uninitialized | Phase::LoadFailed => return Err(Error::ModelNotLoaded),
            Phase::Faulted => return Err(Error::Faulted),
            phase => return Err(Error::SessionBusy { phase }),
        }
        self.submit_locked(&mut state, mono)?;
        Ok(())
    }

    /// Decode, downmix and submit raw container bytes — the file-upload
    /// path. Decode failures leave the session in `Ready`.
    pub async fn transcribe_bytes(&self, bytes: &[u8]) -> Result<usize> {
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Ready => {}
            Phase::Uninitialized | Phase::LoadFailed => return Err(Error::ModelNotLoaded),
            Phase::Faulted => return Err(Error::Faulted),
            phase => return Err(Error::SessionBusy { phase }),
        }
        if bytes.is_empty() {
            return Err(Error::EmptyAudio);
        }
        let mono = self.normalize(bytes)?;
        self.submit_locked(&mut state, mono)
    }

    fn normalize(&self, bytes: &[u8]) -> Result<Vec<f32>> {
        let pcm = decode(bytes, self.config.sample_rate)?;
        downmix(pcm)
    }

    fn submit_locked(&self, state: &mut SessionState, mono: Vec<f32>) -> Result<usize> {
        if mono.is_empty() {
            return Err(Error::EmptyAudio);
        }
        let len = mono.len();
        self.send_locked(
            state,
            WorkerRequest::Transcribe {
                config: self.config.model.clone(),
                audio: mono,
            },
        )?;
        state.set_phase(Phase::Transcribing);
        info!("Submitted {} samples for transcription", len);
        Ok(len)
    }

    fn send_locked(&self, state: &mut SessionState, request: WorkerRequest) -> Result<()> {
        if self.requests.send(request).is_err() {
            state.fault();
            return Err(Error::ChannelClosed);
        }
        Ok(())
    }

    /// Subscribe to ordered session notifications. Phase changes and
    /// completions are never dropped; the channel is unbounded.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().await.observers.push(tx);
        rx
    }

    /// Latest-value view of load progress. Intermediate fractions may be
    /// coalesced if the observer is slower than the producer.
    pub fn progress_watch(&self) -> watch::Receiver<f32> {
        self.progress_rx.clone()
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn load_progress(&self) -> f32 {
        self.state.lock().await.load_progress
    }

    pub async fn last_transcript(&self) -> Option<String> {
        self.state.lock().await.last_transcript.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    pub async fn stats(&self) -> SessionStats {
        let state = self.state.lock().await;
        let uptime = Utc::now().signed_duration_since(self.started_at);
        SessionStats {
            session_id: self.config.session_id.clone(),
            phase: state.phase,
            started_at: self.started_at,
            uptime_secs: uptime.num_milliseconds() as f64 / 1000.0,
            load_progress: state.load_progress,
            has_transcript: state.last_transcript.is_some(),
            last_error: state.last_error.clone(),
        }
    }
}

impl Drop for TranscriptionSession {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
