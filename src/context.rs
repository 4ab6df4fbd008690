//! Application context - owns the trackers of one client session

use crate::attendance::AttendanceTracker;
use crate::config::Config;
use crate::session::SessionTracker;
use chrono::Duration;

/// Explicit owner of the session-scoped state.
///
/// Created when a client session starts and consumed by [`end`](Self::end)
/// when it finishes; nothing outlives it.
#[derive(Debug)]
pub struct AppContext {
    pub session: SessionTracker,
    pub attendance: AttendanceTracker,
}

impl AppContext {
    /// Start a new session
    pub fn start(config: &Config) -> Self {
        let session = SessionTracker::new();
        tracing::info!(
            session_id = %session.session_id(),
            default_capacity = config.attendance.default_capacity,
            "Session context started"
        );
        Self {
            session,
            attendance: AttendanceTracker::with_default_capacity(config.attendance.default_capacity),
        }
    }

    /// End the session, dropping all state. Returns how long it lasted.
    pub fn end(self) -> Duration {
        let duration = self.session.session_duration();
        tracing::info!(
            session_id = %self.session.session_id(),
            events = self.attendance.get_all_events().len(),
            duration_secs = duration.num_seconds(),
            "Session context ended"
        );
        duration
    }
}
