// Example: Drive the capture pipeline end to end
//
// Streams a WAV file through the capture interface as if it were a live
// microphone, then stops the recording, which finalizes the capture and
// pipelines it straight into transcription.
//
// Usage: cargo run --example record_session -- --file speech.wav --duration 5

use anyhow::{bail, Result};
use clap::Parser;
use murmur::{FileCaptureBackend, SessionConfig, SessionEvent, TranscriptionSession, WorkerChannel};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "record_session")]
#[command(about = "Record through the capture pipeline and transcribe")]
struct Args {
    /// WAV file streamed as the capture source
    #[arg(short, long)]
    file: String,

    /// Seconds to keep the capture open before stopping
    #[arg(short, long, default_value = "5")]
    duration: u64,

    /// NATS server URL
    #[arg(short, long, default_value = "nats://localhost:4222")]
    nats_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args = Args::parse();

    info!("murmur - Recording Session Example");
    info!("Capture source: {}", args.file);

    let config = SessionConfig::default();
    let channel = WorkerChannel::connect(&args.nats_url, &config.session_id).await?;
    let session = TranscriptionSession::new(channel, config);

    let mut events = session.subscribe().await;
    session.load_model().await?;

    info!("Waiting for model load...");
    loop {
        match events.recv().await {
            Some(SessionEvent::PhaseChanged(murmur::Phase::Ready)) => break,
            Some(SessionEvent::PhaseChanged(murmur::Phase::LoadFailed)) => {
                bail!("model load failed: {:?}", session.last_error().await);
            }
            Some(_) => {}
            None => bail!("session closed during model load"),
        }
    }

    let backend = Box::new(FileCaptureBackend::new(&args.file));
    session.start_recording(backend).await?;
    info!("Recording for {} seconds...", args.duration);
    sleep(Duration::from_secs(args.duration)).await;

    let submitted = session.stop_recording().await?;
    info!("Recording stopped, submitted {:?} samples", submitted);

    loop {
        match events.recv().await {
            Some(SessionEvent::TranscriptReady(text)) => {
                println!("{text}");
                break;
            }
            Some(SessionEvent::TranscriptionFailed(message)) => {
                return Err(murmur::Error::Inference { message }.into());
            }
            Some(_) => {}
            None => bail!("session closed while transcribing"),
        }
    }

    Ok(())
}
