use crate::notify::NotificationLog;
use crate::service::SessionHandle;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Handle to the session service owning the recognition controller
    pub session: SessionHandle,

    /// Notifications emitted by the controller
    pub notifications: NotificationLog,
}

impl AppState {
    pub fn new(session: SessionHandle, notifications: NotificationLog) -> Self {
        Self {
            session,
            notifications,
        }
    }
}
