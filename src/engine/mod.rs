//! Recognition capability boundary
//!
//! The host's speech engine is reached through two traits:
//! - `CapabilityProvider` probes availability and constructs engines
//! - `RecognitionEngine` is one live engine instance (the capability handle)
//!
//! Engines deliver result/error/end events on the channel returned from
//! `CapabilityProvider::create`. Dropping the receiver unsubscribes.
//!
//! Implementations:
//! - `ScriptedCapability`: in-process engine driven by a script or a test
//! - `NatsCapability`: bridge to an external STT service over NATS

pub mod nats;
pub mod scripted;

use crate::language::Language;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

pub use nats::NatsCapability;
pub use scripted::{replay, ScriptStep, ScriptedCapability};

/// Receiving end of an engine's event channel
pub type EventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Sending end of an engine's event channel
pub type EventSender = mpsc::UnboundedSender<EngineEvent>;

/// Settings applied to an engine at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Keep listening across utterances instead of stopping after one
    pub continuous: bool,
    /// Emit provisional hypotheses before they are finalized
    pub interim_results: bool,
    /// Recognition language
    pub language: Language,
}

impl EngineConfig {
    pub fn for_language(language: Language) -> Self {
        Self {
            continuous: true,
            interim_results: true,
            language,
        }
    }
}

/// One recognized span of speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSegment {
    /// Recognized text
    pub transcript: String,

    /// Whether the engine will no longer revise this segment
    #[serde(default)]
    pub is_final: bool,

    /// Confidence score (0.0 to 1.0), if the engine reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl RecognitionSegment {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            transcript: text.into(),
            is_final: true,
            confidence: None,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            transcript: text.into(),
            is_final: false,
            confidence: None,
        }
    }
}

/// Error classification reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecognitionErrorKind {
    /// Nothing was heard before the engine's silence timeout ("no-speech")
    NoSpeech,
    /// Microphone permission was refused ("not-allowed")
    NotAllowed,
    /// Session was aborted by the host ("aborted")
    Aborted,
    /// Audio capture failed ("audio-capture")
    AudioCapture,
    /// Recognition service unreachable ("network")
    Network,
    /// Recognition service refused the session ("service-not-allowed")
    ServiceNotAllowed,
    /// Requested language is not supported ("language-not-supported")
    LanguageNotSupported,
    /// Any other classification, kept verbatim
    Other(String),
}

impl RecognitionErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::NotAllowed => "not-allowed",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for RecognitionErrorKind {
    fn from(s: &str) -> Self {
        match s {
            "no-speech" => Self::NoSpeech,
            "not-allowed" => Self::NotAllowed,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RecognitionErrorKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RecognitionErrorKind> for String {
    fn from(kind: RecognitionErrorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered by a recognition engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// New or revised segments. Segments before `result_index` were already
    /// delivered in an earlier event.
    Result {
        #[serde(default)]
        result_index: usize,
        results: Vec<RecognitionSegment>,
    },
    /// Engine reported an error
    Error { error: RecognitionErrorKind },
    /// Engine ended the session on its own
    End,
}

/// A live recognition engine instance
pub trait RecognitionEngine: Send {
    /// Begin recognition. Fails if the engine is already running.
    fn start(&mut self) -> Result<()>;

    /// Stop recognition. The engine emits `EngineEvent::End` once stopped.
    fn stop(&mut self) -> Result<()>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Host-provided recognition capability
pub trait CapabilityProvider: Send + Sync {
    /// Whether the host exposes a recognition engine at all
    fn is_available(&self) -> bool;

    /// Construct a configured engine and subscribe to its events
    fn create(&self, config: EngineConfig) -> Result<(Box<dyn RecognitionEngine>, EventReceiver)>;
}
