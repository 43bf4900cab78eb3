pub mod config;
pub mod engine;
pub mod http;
pub mod language;
pub mod messages;
pub mod nats;
pub mod notify;
pub mod service;
pub mod session;

pub use config::Config;
pub use engine::{
    CapabilityProvider, EngineConfig, EngineEvent, NatsCapability, RecognitionEngine,
    RecognitionErrorKind, RecognitionSegment, ScriptedCapability,
};
pub use http::{create_router, AppState};
pub use language::Language;
pub use messages::MessageKey;
pub use nats::{NatsClient, TranscriptMessage};
pub use notify::{Notification, NotificationLog, Notifier, Severity, TracingNotifier};
pub use service::SessionHandle;
pub use session::{RecognitionController, SessionPhase, SessionState, Transcript};
