// Example: Transcribe an audio file against a live worker
//
// This example demonstrates the complete file pipeline:
// 1. Connect a worker channel over NATS
// 2. Load the model and wait for the ready event
// 3. Decode + downmix the file and submit it
// 4. Print the transcript when it arrives
//
// Requirements: a NATS server and a transcription worker listening on
// asr.request.<session> / publishing to asr.event.<session>
//
// Usage: cargo run --example transcribe_file -- --file speech.wav

use anyhow::{bail, Result};
use clap::Parser;
use murmur::{SessionConfig, SessionEvent, TranscriptionSession, WorkerChannel};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "transcribe_file")]
#[command(about = "Transcribe an audio file via the worker pipeline")]
struct Args {
    /// Audio file to transcribe (any format the decoder understands)
    #[arg(short, long)]
    file: String,

    /// NATS server URL
    #[arg(short, long, default_value = "nats://localhost:4222")]
    nats_url: String,

    /// Model identifier
    #[arg(short, long, default_value = "Xenova/whisper-tiny")]
    model_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args = Args::parse();

    info!("murmur - File Transcription Example");
    info!("File: {}", args.file);

    let mut config = SessionConfig::default();
    config.model.model_id = args.model_id;

    let channel = WorkerChannel::connect(&args.nats_url, &config.session_id).await?;
    let session = TranscriptionSession::new(channel, config);

    let mut events = session.subscribe().await;
    session.load_model().await?;

    info!("Waiting for model load...");
    loop {
        match events.recv().await {
            Some(SessionEvent::LoadProgress(fraction)) => {
                info!("Model load: {:.0}%", fraction * 100.0);
            }
            Some(SessionEvent::PhaseChanged(murmur::Phase::Ready)) => break,
            Some(SessionEvent::PhaseChanged(murmur::Phase::LoadFailed)) => {
                bail!("model load failed: {:?}", session.last_error().await);
            }
            Some(_) => {}
            None => bail!("session closed during model load"),
        }
    }

    let bytes = std::fs::read(&args.file)?;
    let submitted = session.transcribe_bytes(&bytes).await?;
    info!("Submitted {} samples, waiting for transcript...", submitted);

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
