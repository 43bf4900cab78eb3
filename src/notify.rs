//! Notification boundary
//!
//! The controller reports user-visible status through a `Notifier`. Delivery is
//! fire-and-forget: nothing the notifier does feeds back into session state.

use crate::language::Language;
use crate::messages::{self, MessageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A localized, user-visible notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub key: MessageKey,
    pub language: Language,
    /// Message text resolved from the catalog
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(severity: Severity, key: MessageKey, language: Language) -> Self {
        Self {
            severity,
            key,
            language,
            message: messages::message(key, language).to_string(),
            at: Utc::now(),
        }
    }
}

/// Receiver of user-visible notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Error => error!(key = ?n.key, language = %n.language, "{}", n.message),
            Severity::Success | Severity::Info => {
                info!(key = ?n.key, language = %n.language, "{}", n.message)
            }
        }
    }
}

/// Bounded in-memory log of recent notifications
///
/// Also forwards every notification to the log. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    capacity: usize,
    entries: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Snapshot of recorded notifications, oldest first
    pub fn recent(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    /// Keys of recorded notifications, oldest first
    pub fn keys(&self) -> Vec<MessageKey> {
        self.recent().into_iter().map(|n| n.key).collect()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());

        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}
