//! Attendance tracker - owns every event roster of a session

use super::{
    AttendanceError, AttendanceStatus, AttendeeRecord, EventAttendance, EventConfig,
    EventStatistics, DEFAULT_CAPACITY,
};
use crate::notify::{ChangeNotifier, Subscription};
use crate::EventId;
use chrono::Utc;
use std::collections::BTreeMap;

/// Manages the attendance records of all events.
///
/// Operations that find an attendee by user id act on the *first* record of
/// that user, in registration order. A user who cancelled and registered
/// again therefore has check-in, cancellation and no-show applied to the
/// cancelled record. Cancelling never promotes a waitlisted attendee.
#[derive(Debug)]
pub struct AttendanceTracker {
    /// All events by id
    events: BTreeMap<EventId, EventAttendance>,

    /// Capacity for events created without one
    default_capacity: u32,

    notifier: ChangeNotifier,
}

impl Default for AttendanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AttendanceTracker {
    /// Create a tracker using [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self::with_default_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_default_capacity(default_capacity: u32) -> Self {
        Self {
            events: BTreeMap::new(),
            default_capacity,
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

    pub fn default_capacity(&self) -> u32 {
        self.default_capacity
    }

    /// Create an event. Returns false, without notifying, if the id exists.
    pub fn create_event(&mut self, config: EventConfig) -> bool {
        if self.events.contains_key(&config.event_id) {
            tracing::debug!(event_id = config.event_id, "Event already exists");
            return false;
        }

        let capacity = config.capacity.unwrap_or(self.default_capacity);
        tracing::info!(
            event_id = config.event_id,
            name = %config.name,
            capacity,
            "Event created"
        );

        self.events.insert(
            config.event_id,
            EventAttendance {
                event_id: config.event_id,
                event_name: config.name,
                event_date: config.date,
                capacity,
                attendees: Vec::new(),
            },
        );
        self.notifier.notify();
        true
    }

    pub fn get_event_attendance(&self, event_id: EventId) -> Option<&EventAttendance> {
        self.events.get(&event_id)
    }

    /// Snapshot of all events, ordered by id
    pub fn get_all_events(&self) -> Vec<EventAttendance> {
        self.events.values().cloned().collect()
    }

    /// Register a user for an event.
    ///
    /// The new record is `Registered` while seats remain and `Waitlisted`
    /// once capacity is exhausted. Returns the assigned status.
    pub fn register_attendee(
        &mut self,
        event_id: EventId,
        user_id: &str,
        user_name: &str,
        email: &str,
    ) -> Result<AttendanceStatus, AttendanceError> {
        let event = self.event_mut(event_id)?;

        if event.has_active_record(user_id) {
            tracing::debug!(event_id, user_id, "Duplicate registration rejected");
            return Err(AttendanceError::AlreadyRegistered {
                event_id,
                user_id: user_id.to_string(),
            });
        }

        let status = if event.available_spots() > 0 {
            AttendanceStatus::Registered
        } else {
            AttendanceStatus::Waitlisted
        };

        event.attendees.push(AttendeeRecord {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            email: email.to_string(),
            registration_date: Utc::now(),
            check_in_time: None,
            status,
            notes: None,
        });

        tracing::debug!(event_id, user_id, %status, "Attendee registered");
        self.notifier.notify();
        Ok(status)
    }

    /// Check a user in. Rejected for cancelled records.
    pub fn check_in_attendee(
        &mut self,
        event_id: EventId,
        user_id: &str,
    ) -> Result<(), AttendanceError> {
        let attendee = self.attendee_mut(event_id, user_id)?;

        if attendee.status == AttendanceStatus::Cancelled {
            tracing::debug!(event_id, user_id, "Check-in of cancelled attendee rejected");
            return Err(AttendanceError::AttendeeCancelled {
                event_id,
                user_id: user_id.to_string(),
            });
        }

        attendee.status = AttendanceStatus::CheckedIn;
        attendee.check_in_time = Some(Utc::now());

        tracing::debug!(event_id, user_id, "Attendee checked in");
        self.notifier.notify();
        Ok(())
    }

    /// Cancel a registration, whatever its current status
    pub fn cancel_registration(
        &mut self,
        event_id: EventId,
        user_id: &str,
    ) -> Result<(), AttendanceError> {
        let attendee = self.attendee_mut(event_id, user_id)?;
        attendee.status = AttendanceStatus::Cancelled;

        tracing::debug!(event_id, user_id, "Registration cancelled");
        self.notifier.notify();
        Ok(())
    }

    /// Mark a user as not having shown up. Rejected once checked in, and for
    /// cancelled records, which must stay inactive.
    pub fn mark_no_show(&mut self, event_id: EventId, user_id: &str) -> Result<(), AttendanceError> {
        let attendee = self.attendee_mut(event_id, user_id)?;

        if attendee.status == AttendanceStatus::Cancelled {
            tracing::debug!(event_id, user_id, "No-show of cancelled attendee rejected");
            return Err(AttendanceError::AttendeeCancelled {
                event_id,
                user_id: user_id.to_string(),
            });
        }

        if attendee.status == AttendanceStatus::CheckedIn {
            tracing::debug!(event_id, user_id, "No-show of checked-in attendee rejected");
            return Err(AttendanceError::AlreadyCheckedIn {
                event_id,
                user_id: user_id.to_string(),
            });
        }

        attendee.status = AttendanceStatus::NoShow;

        tracing::debug!(event_id, user_id, "Attendee marked as no-show");
        self.notifier.notify();
        Ok(())
    }

    /// Replace the free-form notes of an attendee record
    pub fn set_attendee_notes(
        &mut self,
        event_id: EventId,
        user_id: &str,
        notes: Option<String>,
    ) -> Result<(), AttendanceError> {
        let attendee = self.attendee_mut(event_id, user_id)?;
        attendee.notes = notes;

        tracing::debug!(event_id, user_id, "Attendee notes updated");
        self.notifier.notify();
        Ok(())
    }

    /// Attendees of an event in registration order, optionally filtered by
    /// status. Empty for unknown events.
    pub fn get_attendees(
        &self,
        event_id: EventId,
        status: Option<AttendanceStatus>,
    ) -> Vec<AttendeeRecord> {
        self.events
            .get(&event_id)
            .map(|event| {
                event
                    .attendees
                    .iter()
                    .filter(|a| status.map_or(true, |s| a.status == s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_event_statistics(&self, event_id: EventId) -> Option<EventStatistics> {
        self.events.get(&event_id).map(EventStatistics::from)
    }

    fn event_mut(&mut self, event_id: EventId) -> Result<&mut EventAttendance, AttendanceError> {
        self.events.get_mut(&event_id).ok_or_else(|| {
            tracing::debug!(event_id, "Unknown event");
            AttendanceError::EventNotFound(event_id)
        })
    }

    fn attendee_mut(
        &mut self,
        event_id: EventId,
        user_id: &str,
    ) -> Result<&mut AttendeeRecord, AttendanceError> {
        self.event_mut(event_id)?
            .find_attendee_mut(user_id)
            .ok_or_else(|| {
                tracing::debug!(event_id, user_id, "Unknown attendee");
                AttendanceError::AttendeeNotFound {
                    event_id,
                    user_id: user_id.to_string(),
                }
            })
    }
}
