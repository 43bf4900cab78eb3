//! Recognition capability backed by an external STT service over NATS
//!
//! Start/stop are published as control messages on `stt.control.<session>`;
//! transcripts (`stt.text.partial`, `stt.text.final`) and errors
//! (`stt.error.*`) for the session are turned into engine events.
//!
//! Like a host engine, the bridge follows every error with an end, after
//! which the engine can be started again.

use super::{
    CapabilityProvider, EngineConfig, EngineEvent, EventReceiver, EventSender, RecognitionEngine,
    RecognitionErrorKind, RecognitionSegment,
};
use crate::nats::{ControlAction, NatsClient, RecognitionErrorMessage, TranscriptMessage};
use anyhow::{bail, Context, Result};
use futures::stream::{Stream, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// NATS-bridged recognition capability
#[derive(Clone)]
pub struct NatsCapability {
    client: Arc<NatsClient>,
}

impl NatsCapability {
    pub fn new(client: Arc<NatsClient>) -> Self {
        Self { client }
    }
}

impl CapabilityProvider for NatsCapability {
    fn is_available(&self) -> bool {
        self.client.is_connected()
    }

    fn create(&self, config: EngineConfig) -> Result<(Box<dyn RecognitionEngine>, EventReceiver)> {
        Handle::try_current().context("NATS recognition requires a Tokio runtime")?;

        let subscriber = Arc::clone(&self.client);
        let subscribe = async move {
            let transcripts = subscriber.subscribe_transcripts().await?.map(|m| m.payload);
            let errors = subscriber.subscribe_errors().await?.map(|m| m.payload);
            anyhow::Ok((transcripts, errors))
        };

        let publisher = Arc::clone(&self.client);
        let publish = move |action: ControlAction| {
            let client = Arc::clone(&publisher);
            async move { client.publish_control(action, &config).await }
        };

        Ok(spawn_bridge(
            self.client.session_id().to_string(),
            subscribe,
            publish,
        ))
    }
}

/// Spawn a bridge task and return the engine driving it
///
/// `subscribe` yields the transcript and error payload streams; `publish`
/// sends a control action to the STT service. Must be called inside a Tokio
/// runtime.
pub fn spawn_bridge<S, T, E, B, P, F>(
    session_id: String,
    subscribe: S,
    publish: P,
) -> (Box<dyn RecognitionEngine>, EventReceiver)
where
    S: Future<Output = Result<(T, E)>> + Send + 'static,
    T: Stream<Item = B> + Send + 'static,
    E: Stream<Item = B> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    P: FnMut(ControlAction) -> F + Send + 'static,
    F: Future<Output = Result<()>> + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let running = Arc::new(AtomicBool::new(false));

    let bridge = Bridge {
        session_id: session_id.clone(),
        events: event_tx,
        running: Arc::clone(&running),
        active: false,
    };
    tokio::spawn(bridge.run(subscribe, publish, command_rx));

    let engine = NatsEngine {
        name: format!("nats:{}", session_id),
        running,
        commands: command_tx,
    };

    (Box::new(engine), event_rx)
}

/// Engine handle for one bridge task. Dropping it ends the task.
struct NatsEngine {
    name: String,
    /// Shared with the bridge, which clears it when the remote session ends
    running: Arc<AtomicBool>,
    commands: mpsc::UnboundedSender<ControlAction>,
}

impl RecognitionEngine for NatsEngine {
    fn start(&mut self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            bail!("Recognition has already started");
        }

        if let Err(e) = self.commands.send(ControlAction::Start) {
            self.running.store(false, Ordering::SeqCst);
            return Err(e).context("NATS bridge task has exited");
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.commands
            .send(ControlAction::Stop)
            .context("NATS bridge task has exited")?;

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Map a transcript message to a result event
///
/// Each message carries one segment, so every event starts at index 0.
pub fn transcript_event(msg: TranscriptMessage) -> EngineEvent {
    let segment = RecognitionSegment {
        transcript: msg.text,
        is_final: !msg.partial,
        confidence: Some(msg.confidence),
    };

    EngineEvent::Result {
        result_index: 0,
        results: vec![segment],
    }
}

/// State of one bridge task
struct Bridge {
    session_id: String,
    events: EventSender,
    running: Arc<AtomicBool>,
    /// Remote session started and not yet ended; gates incoming messages
    active: bool,
}

impl Bridge {
    async fn run<S, T, E, B, P, F>(
        mut self,
        subscribe: S,
        mut publish: P,
        mut commands: mpsc::UnboundedReceiver<ControlAction>,
    ) where
        S: Future<Output = Result<(T, E)>>,
        T: Stream<Item = B>,
        E: Stream<Item = B>,
        B: AsRef<[u8]>,
        P: FnMut(ControlAction) -> F,
        F: Future<Output = Result<()>>,
    {
        let (transcripts, errors) = match subscribe.await {
            Ok(streams) => streams,
            Err(e) => {
                error!("NATS bridge could not subscribe: {:#}", e);
                self.running.store(false, Ordering::SeqCst);
                self.send(EngineEvent::Error {
                    error: RecognitionErrorKind::Network,
                });
                return;
            }
        };
        tokio::pin!(transcripts);
        tokio::pin!(errors);

        info!("NATS bridge started for session {}", self.session_id);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(action) = command else {
                        if self.active {
                            if let Err(e) = publish(ControlAction::Stop).await {
                                warn!("Failed to stop remote recognition: {:#}", e);
                            }
                        }
                        break;
                    };

                    match action {
                        ControlAction::Start => {
                            self.active = true;
                            if let Err(e) = publish(ControlAction::Start).await {
                                error!("Failed to start remote recognition: {:#}", e);
                                if !self.end_with_error(RecognitionErrorKind::Network) {
                                    break;
                                }
                            }
                        }
                        ControlAction::Stop => {
                            self.active = false;
                            if let Err(e) = publish(ControlAction::Stop).await {
                                warn!("Failed to stop remote recognition: {:#}", e);
                            }
                            if !self.send(EngineEvent::End) {
                                break;
                            }
                        }
                    }
                }
                Some(payload) = transcripts.next() => {
                    if !self.on_transcript(payload.as_ref()) {
                        break;
                    }
                }
                Some(payload) = errors.next() => {
                    if !self.on_error(payload.as_ref()) {
                        break;
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("NATS bridge stopped for session {}", self.session_id);
    }

    /// Returns false once the subscriber is gone
    fn send(&self, event: EngineEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// End the remote session from the engine side: error, then end
    fn end_with_error(&mut self, error: RecognitionErrorKind) -> bool {
        self.active = false;
        self.running.store(false, Ordering::SeqCst);
        self.send(EngineEvent::Error { error }) && self.send(EngineEvent::End)
    }

    fn on_transcript(&self, payload: &[u8]) -> bool {
        if !self.active {
            return true;
        }

        match serde_json::from_slice::<TranscriptMessage>(payload) {
            Ok(transcript) if transcript.session_id == self.session_id => {
                debug!("Transcript (partial={}): {}", transcript.partial, transcript.text);
                self.send(transcript_event(transcript))
            }
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to parse transcript message: {}", e);
                true
            }
        }
    }

    fn on_error(&mut self, payload: &[u8]) -> bool {
        if !self.active {
            return true;
        }

        match serde_json::from_slice::<RecognitionErrorMessage>(payload) {
            Ok(err) if err.session_id == self.session_id => {
                self.end_with_error(RecognitionErrorKind::from(err.error))
            }
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to parse recognition error message: {}", e);
                true
            }
        }
    }
}
