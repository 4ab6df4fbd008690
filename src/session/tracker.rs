//! Session tracker - holds the state of one client session

use super::SessionData;
use crate::notify::{ChangeNotifier, Subscription};
use crate::EventId;
use chrono::{DateTime, Duration, Utc};
use std::any::Any;
use std::collections::HashSet;
use uuid::Uuid;

/// State of the current client session.
///
/// Every operation is total. Mutations fire the tracker's change
/// notification only when they actually changed something, except
/// [`set_session_data`](Self::set_session_data) and
/// [`clear_session`](Self::clear_session), which always notify.
#[derive(Debug)]
pub struct SessionTracker {
    /// Identifier used to correlate log lines of one session
    session_id: Uuid,

    user_id: Option<String>,

    user_name: Option<String>,

    /// Client-side mirror of attendance registrations
    registered_event_ids: HashSet<EventId>,

    data: SessionData,

    /// Fixed at construction, survives `clear_session`
    started_at: DateTime<Utc>,

    notifier: ChangeNotifier,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    /// Create a new, anonymous session
    pub fn new() -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!(%session_id, "Session started");
        Self {
            session_id,
            user_id: None,
            user_name: None,
            registered_event_ids: HashSet::new(),
            data: SessionData::new(),
            started_at: Utc::now(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe<F>(&mut self, observer: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        self.notifier.unsubscribe(subscription)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Set the user id. Returns false (and does not notify) if unchanged.
    pub fn set_user_id(&mut self, user_id: Option<&str>) -> bool {
        if self.user_id.as_deref() == user_id {
            return false;
        }
        self.user_id = user_id.map(String::from);
        tracing::debug!(session_id = %self.session_id, user_id = ?self.user_id, "User id changed");
        self.notifier.notify();
        true
    }

    /// Set the display name. Returns false (and does not notify) if unchanged.
    pub fn set_user_name(&mut self, user_name: Option<&str>) -> bool {
        if self.user_name.as_deref() == user_name {
            return false;
        }
        self.user_name = user_name.map(String::from);
        tracing::debug!(session_id = %self.session_id, user_name = ?self.user_name, "User name changed");
        self.notifier.notify();
        true
    }

    /// A session is authenticated once it carries a non-empty user id
    pub fn is_authenticated(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Record a registration. Returns true if the id was newly inserted.
    pub fn register_for_event(&mut self, event_id: EventId) -> bool {
        if !self.registered_event_ids.insert(event_id) {
            return false;
        }
        tracing::debug!(session_id = %self.session_id, event_id, "Registered for event");
        self.notifier.notify();
        true
    }

    /// Drop a registration. Returns true if the id was present.
    pub fn unregister_from_event(&mut self, event_id: EventId) -> bool {
        if !self.registered_event_ids.remove(&event_id) {
            return false;
        }
        tracing::debug!(session_id = %self.session_id, event_id, "Unregistered from event");
        self.notifier.notify();
        true
    }

    pub fn is_registered_for_event(&self, event_id: EventId) -> bool {
        self.registered_event_ids.contains(&event_id)
    }

    /// Registered event ids, sorted
    pub fn registered_event_ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.registered_event_ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Store a session value. Always notifies, even if the value is unchanged.
    pub fn set_session_data<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        tracing::debug!(session_id = %self.session_id, key = %key, "Session data set");
        self.data.insert(key, value);
        self.notifier.notify();
    }

    /// Read a session value, falling back to `T::default()` when the key is
    /// missing or holds a value of another type
    pub fn get_session_data<T>(&self, key: &str) -> T
    where
        T: Any + Clone + Default,
    {
        self.try_get_session_data(key).unwrap_or_default()
    }

    /// Read a session value; `None` when missing or of another type
    pub fn try_get_session_data<T>(&self, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        self.data.get::<T>(key).cloned()
    }

    pub fn has_session_data(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn session_data_keys(&self) -> Vec<String> {
        self.data.keys()
    }

    /// Remove a session value. Notifies only if the key existed.
    pub fn remove_session_data(&mut self, key: &str) -> bool {
        if !self.data.remove(key) {
            return false;
        }
        tracing::debug!(session_id = %self.session_id, key, "Session data removed");
        self.notifier.notify();
        true
    }

    /// Reset identity, registrations and data. Keeps the start time.
    pub fn clear_session(&mut self) {
        self.user_id = None;
        self.user_name = None;
        self.registered_event_ids.clear();
        self.data.clear();
        tracing::debug!(session_id = %self.session_id, "Session cleared");
        self.notifier.notify();
    }

    pub fn session_start_time(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time elapsed since the session started
    pub fn session_duration(&self) -> Duration {
        Utc::now() - self.started_at
    }
}
