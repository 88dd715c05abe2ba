use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::messages::{WorkerEvent, WorkerRequest};
use crate::error::{Error, Result};

/// Asynchronous, message-based transport to the transcription worker.
///
/// Requests go out through [`send`](WorkerChannel::send); events come back
/// on an unbounded, ordered, single-consumer stream that the session takes
/// at construction. Channel death is observed as the event stream ending;
/// sends after death fail with `ChannelClosed`.
pub struct WorkerChannel {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    events: mpsc::UnboundedReceiver<WorkerEvent>,
}

/// The worker-facing half of an in-process channel, used by local workers
/// and test doubles.
pub struct WorkerHarness {
    /// Requests sent by the session, in send order.
    pub requests: mpsc::UnboundedReceiver<WorkerRequest>,
    /// Events to deliver back to the session.
    pub events: mpsc::UnboundedSender<WorkerEvent>,
}

impl WorkerChannel {
    /// Bridge the channel over NATS.
    ///
    /// Requests are published as JSON to `asr.request.<session>`; events
    /// are consumed from `asr.event.<session>`. A connection or
    /// subscription failure is fatal and surfaces as `ChannelInit`.
    pub async fn connect(url: &str, session_id: &str) -> Result<Self> {
        info!("Connecting to worker transport at {}", url);

        let client = async_nats::connect(url)
            .await
            .map_err(|e| Error::ChannelInit(format!("nats connect: {e}")))?;

        let request_subject = format!("asr.request.{session_id}");
        let event_subject = format!("asr.event.{session_id}");

        let mut subscriber = client
            .subscribe(event_subject.clone())
            .await
            .map_err(|e| Error::ChannelInit(format!("subscribe {event_subject}: {e}")))?;

        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<WorkerRequest>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<WorkerEvent>();

        // Outbound bridge: serialize and publish requests in send order.
        let publisher = client.clone();
        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let payload = match serde_json::to_vec(&request) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!("Failed to serialize worker request: {}", e);
                        continue;
                    }
                };
                if let Err(e) = publisher.publish(request_subject.clone(), payload.into()).await {
                    error!("Failed to publish worker request: {}", e);
                    break;
                }
            }
        });

        // Inbound bridge: parse events and forward them to the session.
        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<WorkerEvent>(&msg.payload) {
                    Ok(event) => {
                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Dropping malformed worker event: {}", e);
                    }
                }
            }
            info!("Worker event stream ended");
        });

        info!("Worker channel established for {}", session_id);

        Ok(Self {
            requests: request_tx,
            events: event_rx,
        })
    }

    /// In-process channel construction: returns the session half and the
    /// worker half. No singletons; each session gets its own pair.
    pub fn pair() -> (Self, WorkerHarness) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                requests: request_tx,
                events: event_rx,
            },
            WorkerHarness {
                requests: request_rx,
                events: event_tx,
            },
        )
    }

    /// Queue a request for the worker. Non-blocking; fails with
    /// `ChannelClosed` once the transport has died.
    pub fn send(&self, request: WorkerRequest) -> Result<()> {
        self.requests.send(request).map_err(|_| Error::ChannelClosed)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<WorkerRequest>,
        mpsc::UnboundedReceiver<WorkerEvent>,
    ) {
        (self.requests, self.events)
    }
}
