use super::state::{SessionPhase, SessionState};
use super::transcript::Transcript;
use crate::engine::{
    CapabilityProvider, EngineConfig, EngineEvent, EventReceiver, RecognitionEngine,
    RecognitionErrorKind, RecognitionSegment,
};
use crate::language::Language;
use crate::messages::MessageKey;
use crate::notify::{Notification, Notifier, Severity};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Live engine together with its event subscription
struct EngineHandle {
    engine: Box<dyn RecognitionEngine>,
    events: EventReceiver,
    events_closed: bool,
}

/// Recognition session controller
///
/// Owns one engine instance for the configured language, reconciles the
/// engine's own start/end cycle with what the caller asked for, and keeps the
/// transcript. Engine failures never reach the caller: they show up only as
/// state changes and notifications.
pub struct RecognitionController {
    provider: Arc<dyn CapabilityProvider>,
    notifier: Arc<dyn Notifier>,
    language: Language,

    /// `None` when the capability is missing or after teardown
    handle: Option<EngineHandle>,

    transcript: Transcript,

    /// Caller-visible listening flag
    is_listening: bool,

    /// Caller wants the engine kept running. Consulted when the engine ends on
    /// its own; must be cleared before the engine is asked to stop.
    should_listen: bool,

    phase: SessionPhase,
}

impl RecognitionController {
    /// Create a controller and construct an engine for `language`
    ///
    /// If the host has no recognition capability, an "unsupported"
    /// notification is emitted and the controller stays without an engine.
    pub fn new(
        provider: Arc<dyn CapabilityProvider>,
        notifier: Arc<dyn Notifier>,
        language: Language,
    ) -> Self {
        let mut controller = Self {
            provider,
            notifier,
            language,
            handle: None,
            transcript: Transcript::new(),
            is_listening: false,
            should_listen: false,
            phase: SessionPhase::Unsupported,
        };
        controller.initialize();
        controller
    }

    fn initialize(&mut self) {
        if !self.provider.is_available() {
            warn!("Speech recognition is not available (language={})", self.language);
            self.phase = SessionPhase::Unsupported;
            self.notify(Severity::Error, MessageKey::Unsupported);
            return;
        }

        match self.provider.create(EngineConfig::for_language(self.language)) {
            Ok((engine, events)) => {
                info!(
                    "Created recognition engine {} (language={})",
                    engine.name(),
                    self.language
                );
                self.handle = Some(EngineHandle {
                    engine,
                    events,
                    events_closed: false,
                });
                self.phase = SessionPhase::Idle;
            }
            Err(e) => {
                error!("Failed to create recognition engine: {:#}", e);
                self.phase = SessionPhase::Unsupported;
                self.notify(Severity::Error, MessageKey::Unsupported);
            }
        }
    }

    /// Start listening
    ///
    /// No-op without an engine. If the engine refuses to start (for example
    /// because it is already running) the failure is logged and state is left
    /// as it was.
    pub fn start_listening(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            warn!("Cannot start listening: no recognition engine");
            return;
        };

        if let Err(e) = handle.engine.start() {
            error!("Error starting recognition: {:#}", e);
            return;
        }

        self.is_listening = true;
        self.should_listen = true;
        self.phase = SessionPhase::Listening;
        info!("Listening started (language={})", self.language);
        self.notify(Severity::Success, MessageKey::ListeningStarted);
    }

    /// Stop listening
    ///
    /// The intent flag is cleared before the engine is stopped, so the end
    /// event that follows the stop does not restart it.
    pub fn stop_listening(&mut self) {
        if self.handle.is_none() {
            warn!("Cannot stop listening: no recognition engine");
            return;
        }

        self.should_listen = false;

        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.engine.stop() {
                error!("Error stopping recognition: {:#}", e);
            }
        }

        self.is_listening = false;
        self.phase = SessionPhase::Idle;
        info!("Listening stopped (language={})", self.language);
        self.notify(Severity::Info, MessageKey::ListeningStopped);
    }

    /// Empty the transcript. Engine state is untouched.
    pub fn clear_transcript(&mut self) {
        debug!("Clearing transcript");
        self.transcript.clear();
    }

    /// Switch recognition language
    ///
    /// Tears down the current engine and constructs a new one. Listening is
    /// not resumed; the transcript is kept.
    pub fn set_language(&mut self, language: Language) {
        if self.phase == SessionPhase::TornDown {
            warn!("Ignoring language change on a torn down session");
            return;
        }
        if language == self.language {
            return;
        }

        info!("Switching recognition language {} -> {}", self.language, language);

        self.release_engine();
        self.is_listening = false;
        self.language = language;
        self.initialize();
    }

    /// Stop and release the engine. The controller is inert afterwards.
    pub fn teardown(&mut self) {
        if self.phase == SessionPhase::TornDown {
            return;
        }

        self.release_engine();
        self.is_listening = false;
        self.phase = SessionPhase::TornDown;
        info!("Recognition session torn down");
    }

    fn release_engine(&mut self) {
        self.should_listen = false;

        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.engine.stop() {
                warn!("Error stopping recognition engine {}: {:#}", handle.engine.name(), e);
            }
            debug!("Released recognition engine {}", handle.engine.name());
        }
    }

    /// Wait for the next engine event
    ///
    /// Pends forever when there is no engine or its event channel has closed,
    /// which makes it safe to use as one branch of `tokio::select!`.
    pub async fn next_event(&mut self) -> EngineEvent {
        if let Some(handle) = self.handle.as_mut() {
            if !handle.events_closed {
                match handle.events.recv().await {
                    Some(event) => return event,
                    None => {
                        warn!("Recognition engine {} closed its event channel", handle.engine.name());
                        handle.events_closed = true;
                    }
                }
            }
        }

        std::future::pending().await
    }

    /// Handle every event already queued by the engine. Returns how many were
    /// handled.
    pub fn pump_pending(&mut self) -> usize {
        let mut handled = 0;

        loop {
            let event = match self.handle.as_mut() {
                Some(handle) => match handle.events.try_recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
                None => break,
            };

            self.handle_event(event);
            handled += 1;
        }

        handled
    }

    /// Apply one engine event to completion
    pub fn handle_event(&mut self, event: EngineEvent) {
        if self.handle.is_none() {
            debug!("Dropping engine event without a live engine: {:?}", event);
            return;
        }

        match event {
            EngineEvent::Result {
                result_index,
                results,
            } => self.on_result(result_index, &results),
            EngineEvent::Error { error } => self.on_error(error),
            EngineEvent::End => self.on_end(),
        }
    }

    fn on_result(&mut self, result_index: usize, results: &[RecognitionSegment]) {
        self.transcript.apply(result_index, results);
        debug!(
            "Transcript updated ({} segments from index {}): {:?}",
            results.len(),
            result_index,
            self.transcript.text()
        );
    }

    fn on_error(&mut self, error: RecognitionErrorKind) {
        error!("Speech recognition error: {}", error);

        match error {
            RecognitionErrorKind::NoSpeech => self.notify(Severity::Info, MessageKey::NoSpeech),
            RecognitionErrorKind::NotAllowed => {
                self.notify(Severity::Error, MessageKey::PermissionDenied)
            }
            _ => {}
        }

        // The intent flag is left alone: an end event after the error still
        // restarts the engine.
        self.is_listening = false;
        if self.phase == SessionPhase::Listening {
            self.phase = SessionPhase::Idle;
        }
    }

    fn on_end(&mut self) {
        if !self.should_listen {
            debug!("Recognition ended");
            if matches!(self.phase, SessionPhase::Listening | SessionPhase::Restarting) {
                self.phase = SessionPhase::Idle;
            }
            return;
        }

        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        info!("Recognition ended unexpectedly, restarting");
        self.phase = SessionPhase::Restarting;

        match handle.engine.start() {
            Ok(()) => {
                self.phase = SessionPhase::Listening;
            }
            Err(e) => {
                error!("Error restarting recognition: {:#}", e);
                self.is_listening = false;
                self.should_listen = false;
                self.phase = SessionPhase::Idle;
            }
        }
    }

    fn notify(&self, severity: Severity, key: MessageKey) {
        self.notifier
            .notify(Notification::new(severity, key, self.language));
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening
    }

    /// Whether an engine-initiated end would restart the engine
    pub fn intends_to_listen(&self) -> bool {
        self.should_listen
    }

    /// Finalized text followed by the current interim hypothesis
    pub fn transcript(&self) -> String {
        self.transcript.text()
    }

    pub fn finalized_transcript(&self) -> &str {
        self.transcript.finalized()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether an engine is currently held
    pub fn has_engine(&self) -> bool {
        self.handle.is_some()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            is_listening: self.is_listening,
            transcript: self.transcript.text(),
            language: self.language,
            phase: self.phase,
        }
    }
}

impl Drop for RecognitionController {
    fn drop(&mut self) {
        self.release_engine();
    }
}
