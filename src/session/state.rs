use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of a recognition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Host has no recognition capability; nothing can be started
    Unsupported,
    /// Engine constructed, not running
    Idle,
    /// Engine running
    Listening,
    /// Engine ended on its own and is being started again
    Restarting,
    /// Engine released; no further transitions
    TornDown,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Unsupported => "unsupported",
            SessionPhase::Idle => "idle",
            SessionPhase::Listening => "listening",
            SessionPhase::Restarting => "restarting",
            SessionPhase::TornDown => "torn_down",
        };
        f.write_str(s)
    }
}

/// Caller-visible snapshot of a recognition session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Whether the caller asked to listen and no stop or error happened since
    pub is_listening: bool,

    /// Finalized text followed by the current interim hypothesis
    pub transcript: String,

    /// Recognition language
    pub language: Language,

    /// Current lifecycle phase
    pub phase: SessionPhase,
}
