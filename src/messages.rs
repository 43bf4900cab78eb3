//! Localized user-facing messages
//!
//! Every notification the controller emits is looked up here by
//! (`MessageKey`, `Language`), so the state machine never carries literal text.

use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Which user-visible event a message describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    /// Host exposes no recognition capability
    Unsupported,
    /// Listening started at the caller's request
    ListeningStarted,
    /// Listening stopped at the caller's request
    ListeningStopped,
    /// Engine heard nothing before its silence timeout
    NoSpeech,
    /// Microphone permission was refused
    PermissionDenied,
}

/// Look up the message text for `key` in `language`
pub fn message(key: MessageKey, language: Language) -> &'static str {
    match (key, language) {
        (MessageKey::Unsupported, Language::Kazakh) => "Браузер дыбыс тануды қолдамайды",
        (MessageKey::Unsupported, Language::Russian) => "Браузер не поддерживает распознавание речи",
        (MessageKey::ListeningStarted, Language::Kazakh) => "Тыңдау басталды",
        (MessageKey::ListeningStarted, Language::Russian) => "Прослушивание начато",
        (MessageKey::ListeningStopped, Language::Kazakh) => "Тыңдау тоқтатылды",
        (MessageKey::ListeningStopped, Language::Russian) => "Прослушивание остановлено",
        (MessageKey::NoSpeech, Language::Kazakh) => "Дыбыс анықталмады",
        (MessageKey::NoSpeech, Language::Russian) => "Речь не обнаружена",
        (MessageKey::PermissionDenied, Language::Kazakh) => "Микрофонға рұқсат беріңіз",
        (MessageKey::PermissionDenied, Language::Russian) => "Разрешите доступ к микрофону",
    }
}
