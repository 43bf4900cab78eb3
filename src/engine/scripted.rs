//! In-process recognition capability
//!
//! Engines created here produce no events of their own: events are pushed in
//! from outside through `ScriptedCapability::emit`, either by the `replay`
//! driver or by a test. Stopping an engine emits `EngineEvent::End`, the way a
//! real host engine does.

use super::{
    CapabilityProvider, EngineConfig, EngineEvent, EventReceiver, EventSender, RecognitionEngine,
};
use crate::language::Language;
use crate::session::RecognitionController;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug)]
struct EngineRecord {
    config: EngineConfig,
    sender: EventSender,
    running: bool,
    start_calls: usize,
    stop_calls: usize,
}

#[derive(Debug)]
struct ScriptedState {
    available: bool,
    /// Number of upcoming `start` calls that fail
    failing_starts: usize,
    engines: Vec<EngineRecord>,
}

/// Scripted recognition capability
///
/// Clones share state, so a clone kept by the caller observes and drives the
/// engines the controller creates.
#[derive(Debug, Clone)]
pub struct ScriptedCapability {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedCapability {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedState {
                available: true,
                failing_starts: 0,
                engines: Vec::new(),
            })),
        }
    }

    /// A capability the host does not expose
    pub fn unavailable() -> Self {
        let capability = Self::new();
        capability.set_available(false);
        capability
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Make the next `count` engine starts fail
    pub fn fail_next_starts(&self, count: usize) {
        self.lock().failing_starts = count;
    }

    /// Push an event to the most recently created engine's subscriber.
    /// Returns whether anyone received it.
    pub fn emit(&self, event: EngineEvent) -> bool {
        let index = match self.engine_count() {
            0 => return false,
            n => n - 1,
        };
        self.emit_to(index, event)
    }

    /// Push an event to the subscriber of engine `index`. An `End` event also
    /// marks the engine as no longer running.
    pub fn emit_to(&self, index: usize, event: EngineEvent) -> bool {
        let mut state = self.lock();
        match state.engines.get_mut(index) {
            Some(record) => {
                if event == EngineEvent::End {
                    record.running = false;
                }
                record.sender.send(event).is_ok()
            }
            None => false,
        }
    }

    /// End the latest engine's session from the engine side, as a host engine
    /// does after its silence timeout. Returns whether anyone received the end.
    pub fn end_session(&self) -> bool {
        self.emit(EngineEvent::End)
    }

    /// Number of engines created so far
    pub fn engine_count(&self) -> usize {
        self.lock().engines.len()
    }

    pub fn config(&self, index: usize) -> Option<EngineConfig> {
        self.lock().engines.get(index).map(|r| r.config)
    }

    pub fn is_running(&self, index: usize) -> bool {
        self.lock().engines.get(index).is_some_and(|r| r.running)
    }

    /// Whether engine `index` still has a live event subscriber
    pub fn is_subscribed(&self, index: usize) -> bool {
        self.lock()
            .engines
            .get(index)
            .is_some_and(|r| !r.sender.is_closed())
    }

    pub fn start_calls(&self, index: usize) -> usize {
        self.lock().engines.get(index).map_or(0, |r| r.start_calls)
    }

    pub fn stop_calls(&self, index: usize) -> usize {
        self.lock().engines.get(index).map_or(0, |r| r.stop_calls)
    }
}

impl Default for ScriptedCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityProvider for ScriptedCapability {
    fn is_available(&self) -> bool {
        self.lock().available
    }

    fn create(&self, config: EngineConfig) -> Result<(Box<dyn RecognitionEngine>, EventReceiver)> {
        let mut state = self.lock();
        if !state.available {
            bail!("Scripted recognition capability is not available");
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let index = state.engines.len();
        state.engines.push(EngineRecord {
            config,
            sender,
            running: false,
            start_calls: 0,
            stop_calls: 0,
        });

        debug!("Scripted engine #{} created ({})", index, config.language);

        let engine = ScriptedEngine {
            index,
            name: format!("scripted-{}", index),
            state: Arc::clone(&self.state),
        };

        Ok((Box::new(engine), receiver))
    }
}

/// Engine handed out by `ScriptedCapability`
struct ScriptedEngine {
    index: usize,
    name: String,
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedEngine {
    fn with_record<T>(&self, f: impl FnOnce(&mut usize, &mut EngineRecord) -> T) -> Result<T> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let state = &mut *state;
        let record = state
            .engines
            .get_mut(self.index)
            .context("Scripted engine record missing")?;
        Ok(f(&mut state.failing_starts, record))
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn start(&mut self) -> Result<()> {
        self.with_record(|failing_starts, record| {
            record.start_calls += 1;
            if *failing_starts > 0 {
                *failing_starts -= 1;
                bail!("Scripted start failure");
            }
            if record.running {
                bail!("Recognition has already started");
            }
            record.running = true;
            Ok(())
        })?
    }

    fn stop(&mut self) -> Result<()> {
        self.with_record(|_, record| {
            record.stop_calls += 1;
            if record.running {
                record.running = false;
                // Subscriber may already be gone during teardown
                let _ = record.sender.send(EngineEvent::End);
            }
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One step of a replay script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Caller starts listening
    Start,
    /// Caller stops listening
    Stop,
    /// Caller clears the transcript
    Clear,
    /// Caller switches language
    SetLanguage { language: Language },
    /// Engine delivers an event
    Emit { event: EngineEvent },
}

/// A replay script: optional starting language and an ordered list of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub language: Option<Language>,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Load a script from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse script {}", path.display()))?;
        Ok(script)
    }
}

/// Drive `controller` through `steps`, delivering emitted events to whichever
/// engine the capability created last
pub fn replay(
    steps: &[ScriptStep],
    capability: &ScriptedCapability,
    controller: &mut RecognitionController,
) {
    for (i, step) in steps.iter().enumerate() {
        debug!("Replay step {}: {:?}", i, step);

        match step {
            ScriptStep::Start => controller.start_listening(),
            ScriptStep::Stop => controller.stop_listening(),
            ScriptStep::Clear => controller.clear_transcript(),
            ScriptStep::SetLanguage { language } => controller.set_language(*language),
            ScriptStep::Emit { event } => {
                if !capability.emit(event.clone()) {
                    debug!("Replay step {} had no subscriber", i);
                }
            }
        }

        controller.pump_pending();
    }

    info!("Replayed {} steps", steps.len());
}
